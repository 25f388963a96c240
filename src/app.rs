use std::sync::mpsc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::api::{self, AnswerOutcome, ApiEvent, GameClient, GameResult, RankInfo};
use crate::config::Config;
use crate::event::AppEvent;
use crate::game::play::{Phase, PlayState, TickOutcome};
use crate::game::settings::GameSettings;
use crate::ui::components::start_menu;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Start,
    Playing,
    Results,
    Leaderboard,
}

pub enum LeaderboardState {
    Loading,
    Loaded(Vec<GameResult>),
    Failed(String),
}

/// Top-level state. Owns the screen router, the last-used settings, and
/// whichever of play state / result / rank is live for the current screen.
pub struct App {
    pub screen: Screen,
    pub settings: GameSettings,
    pub menu_selected: usize,
    pub play: Option<PlayState>,
    pub result: Option<GameResult>,
    pub rank: Option<RankInfo>,
    pub leaderboard: LeaderboardState,
    pub theme: &'static Theme,
    pub should_quit: bool,
    client: GameClient,
    tx: mpsc::Sender<AppEvent>,
    /// Bumped on every screen/session change. Worker responses tagged with
    /// an older epoch belong to a screen that no longer exists.
    epoch: u64,
}

impl App {
    pub fn new(config: &Config, client: GameClient, tx: mpsc::Sender<AppEvent>) -> Self {
        let loaded_theme = Theme::load(&config.theme).unwrap_or_default();
        let theme: &'static Theme = Box::leak(Box::new(loaded_theme));

        Self {
            screen: Screen::Start,
            settings: GameSettings::default(),
            menu_selected: 0,
            play: None,
            result: None,
            rank: None,
            leaderboard: LeaderboardState::Loading,
            theme,
            should_quit: false,
            client,
            tx,
            epoch: 0,
        }
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = Box::leak(Box::new(theme));
    }

    // --- screen transitions ---

    /// Enter the play screen and open a fresh session with the current
    /// settings. Used for both "start" and "play again".
    pub fn start_round(&mut self) {
        self.epoch += 1;
        self.result = None;
        self.rank = None;
        self.play = Some(PlayState::new(Instant::now()));
        self.screen = Screen::Playing;
        self.spawn_start();
    }

    pub fn go_to_menu(&mut self) {
        self.epoch += 1;
        self.screen = Screen::Start;
        self.play = None;
        self.result = None;
        self.rank = None;
        self.menu_selected = 0;
    }

    pub fn go_to_leaderboard(&mut self) {
        self.epoch += 1;
        self.screen = Screen::Leaderboard;
        self.leaderboard = LeaderboardState::Loading;
        self.spawn_leaderboard();
    }

    pub fn refresh_leaderboard(&mut self) {
        self.epoch += 1;
        self.leaderboard = LeaderboardState::Loading;
        self.spawn_leaderboard();
    }

    fn show_result(&mut self, result: GameResult) {
        self.epoch += 1;
        self.play = None;
        self.rank = None;
        self.screen = Screen::Results;
        self.spawn_rank(result.xp_earned);
        self.result = Some(result);
    }

    // --- start menu ---

    pub fn menu_next(&mut self) {
        self.menu_selected = (self.menu_selected + 1) % start_menu::ROW_COUNT;
    }

    pub fn menu_prev(&mut self) {
        self.menu_selected =
            (self.menu_selected + start_menu::ROW_COUNT - 1) % start_menu::ROW_COUNT;
    }

    pub fn menu_cycle(&mut self, forward: bool) {
        match self.menu_selected {
            start_menu::ROW_DIFFICULTY => {
                self.settings.difficulty = if forward {
                    self.settings.difficulty.next()
                } else {
                    self.settings.difficulty.prev()
                };
            }
            start_menu::ROW_OPERATION => {
                self.settings.operation = self.settings.operation.toggle();
            }
            _ => {}
        }
    }

    // --- play screen ---

    pub fn push_answer_char(&mut self, ch: char) {
        if let Some(play) = &mut self.play {
            play.push_char(ch);
        }
    }

    pub fn answer_backspace(&mut self) {
        if let Some(play) = &mut self.play {
            play.backspace();
        }
    }

    pub fn submit_answer(&mut self) {
        let Some(play) = &mut self.play else { return };
        let Some(session_id) = play.session_id.clone() else {
            return;
        };
        let Some(sub) = play.take_submission(Instant::now()) else {
            return;
        };

        let client = self.client.clone();
        api::spawn(self.tx.clone(), self.epoch, move || {
            ApiEvent::Answered(client.submit_answer(&session_id, sub.answer, sub.time_taken))
        });
    }

    /// Retry key on the play screen's failure state. A missing session id
    /// means the start call failed; otherwise the end call did.
    pub fn retry_play(&mut self) {
        let Some(play) = &mut self.play else { return };
        if !matches!(play.phase, Phase::Failed(_)) {
            return;
        }
        if play.session_id.is_none() {
            play.phase = Phase::Loading;
            self.spawn_start();
        } else {
            play.phase = Phase::Finishing;
            self.spawn_end();
        }
    }

    /// Drive the countdown and the feedback window from the UI tick.
    pub fn on_tick(&mut self) {
        if self.screen != Screen::Playing {
            return;
        }
        let Some(play) = &mut self.play else { return };
        if play.tick(Instant::now()) == TickOutcome::RoundOver {
            self.spawn_end();
        }
    }

    // --- worker spawns ---

    fn spawn_start(&self) {
        let client = self.client.clone();
        let settings = self.settings;
        api::spawn(self.tx.clone(), self.epoch, move || {
            ApiEvent::Started(client.start_game(settings))
        });
    }

    fn spawn_end(&self) {
        let Some(session_id) = self
            .play
            .as_ref()
            .and_then(|p| p.session_id.clone())
        else {
            return;
        };
        let client = self.client.clone();
        api::spawn(self.tx.clone(), self.epoch, move || {
            ApiEvent::Ended(client.end_game(&session_id))
        });
    }

    fn spawn_rank(&self, xp: u32) {
        let client = self.client.clone();
        api::spawn(self.tx.clone(), self.epoch, move || {
            ApiEvent::Rank(client.get_rank(xp))
        });
    }

    fn spawn_leaderboard(&self) {
        let client = self.client.clone();
        api::spawn(self.tx.clone(), self.epoch, move || {
            ApiEvent::Leaderboard(client.leaderboard())
        });
    }

    // --- API responses ---

    pub fn handle_api(&mut self, epoch: u64, event: ApiEvent) {
        if epoch != self.epoch {
            debug!(epoch, current = self.epoch, "dropping stale API response");
            return;
        }

        match event {
            ApiEvent::Started(Ok(resp)) => {
                if let Some(play) = &mut self.play {
                    play.on_started(resp, Instant::now());
                }
            }
            ApiEvent::Started(Err(err)) => {
                warn!(%err, "failed to start round");
                if let Some(play) = &mut self.play {
                    play.fail(err.to_string());
                }
            }
            ApiEvent::Answered(Ok(AnswerOutcome::Answer(resp))) => {
                let time_up = resp.time_remaining == 0;
                let mut end_round = false;
                if let Some(play) = &mut self.play {
                    play.on_answer(resp, Instant::now());
                    if time_up && play.phase == Phase::Active {
                        play.finish();
                        end_round = true;
                    }
                }
                if end_round {
                    self.spawn_end();
                }
            }
            ApiEvent::Answered(Ok(AnswerOutcome::TimeUp(result))) => {
                // Server-side clock expired before the submit landed.
                self.show_result(result);
            }
            ApiEvent::Answered(Err(err)) => {
                warn!(%err, "failed to submit answer");
                if let Some(play) = &mut self.play {
                    play.on_answer_failed("Submit failed, press Enter to retry".to_string());
                }
            }
            ApiEvent::Ended(Ok(result)) => {
                self.show_result(result);
            }
            ApiEvent::Ended(Err(err)) => {
                warn!(%err, "failed to end round");
                if let Some(play) = &mut self.play {
                    play.fail(err.to_string());
                }
            }
            ApiEvent::Rank(Ok(rank)) => {
                if self.screen == Screen::Results {
                    self.rank = Some(rank);
                }
            }
            ApiEvent::Rank(Err(err)) => {
                // Rank section simply does not render; no retry.
                warn!(%err, "failed to fetch rank");
            }
            ApiEvent::Leaderboard(Ok(rows)) => {
                self.leaderboard = LeaderboardState::Loaded(rows);
            }
            ApiEvent::Leaderboard(Err(err)) => {
                warn!(%err, "failed to fetch leaderboard");
                self.leaderboard = LeaderboardState::Failed(err.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{AnswerResponse, StartResponse};
    use crate::game::settings::{Difficulty, Operation};

    fn test_app() -> App {
        let (tx, _rx) = mpsc::channel();
        let client = GameClient::new("http://localhost:0/api").unwrap();
        App::new(&Config::default(), client, tx)
    }

    fn started_response() -> StartResponse {
        StartResponse {
            session_id: "s1".to_string(),
            problem: "3 + 4".to_string(),
            time_remaining: 120,
        }
    }

    #[test]
    fn starting_a_round_enters_playing_with_one_session() {
        let mut app = test_app();
        app.start_round();
        assert_eq!(app.screen, Screen::Playing);
        assert!(app.play.is_some());
        assert!(app.result.is_none());

        let epoch = app.epoch;
        app.handle_api(epoch, ApiEvent::Started(Ok(started_response())));
        let play = app.play.as_ref().unwrap();
        assert_eq!(play.phase, Phase::Active);
        assert_eq!(play.session_id.as_deref(), Some("s1"));
    }

    #[test]
    fn stale_responses_are_dropped() {
        let mut app = test_app();
        app.start_round();
        let old_epoch = app.epoch;

        // Player bails back to the menu before the response lands.
        app.go_to_menu();
        app.handle_api(old_epoch, ApiEvent::Started(Ok(started_response())));
        assert!(app.play.is_none());
        assert_eq!(app.screen, Screen::Start);
    }

    #[test]
    fn end_result_moves_router_to_results_and_fetches_rank() {
        let mut app = test_app();
        app.start_round();
        let epoch = app.epoch;
        app.handle_api(epoch, ApiEvent::Started(Ok(started_response())));
        app.handle_api(
            epoch,
            ApiEvent::Ended(Ok(GameResult {
                session_id: "s1".to_string(),
                score: 10,
                total_problems: 12,
                accuracy: 83.3,
                time_taken: 120,
                xp_earned: 130,
            })),
        );

        assert_eq!(app.screen, Screen::Results);
        assert!(app.play.is_none());
        assert_eq!(app.result.as_ref().unwrap().score, 10);

        // Rank arrives for the results epoch.
        let epoch = app.epoch;
        app.handle_api(
            epoch,
            ApiEvent::Rank(Ok(RankInfo {
                belt: crate::api::Belt::Green,
                level: 3,
            })),
        );
        assert!(app.rank.is_some());
    }

    #[test]
    fn main_menu_clears_result_and_rank() {
        let mut app = test_app();
        app.result = Some(GameResult {
            session_id: String::new(),
            score: 1,
            total_problems: 1,
            accuracy: 100.0,
            time_taken: 120,
            xp_earned: 10,
        });
        app.screen = Screen::Results;
        app.go_to_menu();
        assert_eq!(app.screen, Screen::Start);
        assert!(app.result.is_none());
        assert!(app.rank.is_none());
    }

    #[test]
    fn play_again_keeps_settings() {
        let mut app = test_app();
        app.settings = GameSettings {
            difficulty: Difficulty::Hard,
            operation: Operation::MultiplicationDivision,
        };
        app.start_round();
        let first_epoch = app.epoch;

        app.show_result(GameResult {
            session_id: String::new(),
            score: 0,
            total_problems: 0,
            accuracy: 0.0,
            time_taken: 120,
            xp_earned: 0,
        });
        app.start_round();

        assert_eq!(app.screen, Screen::Playing);
        assert_eq!(app.settings.difficulty, Difficulty::Hard);
        assert!(app.epoch > first_epoch);
    }

    #[test]
    fn start_failure_enters_failed_phase_with_retry() {
        let mut app = test_app();
        app.start_round();
        let epoch = app.epoch;
        app.handle_api(
            epoch,
            ApiEvent::Started(Err(crate::api::ApiError::Status {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                detail: "boom".to_string(),
            })),
        );
        let play = app.play.as_ref().unwrap();
        assert!(matches!(play.phase, Phase::Failed(_)));

        app.retry_play();
        let play = app.play.as_ref().unwrap();
        assert_eq!(play.phase, Phase::Loading);
    }

    #[test]
    fn answer_with_time_up_result_ends_the_round() {
        let mut app = test_app();
        app.start_round();
        let epoch = app.epoch;
        app.handle_api(epoch, ApiEvent::Started(Ok(started_response())));
        app.handle_api(
            epoch,
            ApiEvent::Answered(Ok(AnswerOutcome::TimeUp(GameResult {
                session_id: "s1".to_string(),
                score: 5,
                total_problems: 6,
                accuracy: 83.3,
                time_taken: 120,
                xp_earned: 60,
            }))),
        );
        assert_eq!(app.screen, Screen::Results);
    }

    #[test]
    fn answer_response_with_zero_time_finishes_the_round() {
        let mut app = test_app();
        app.start_round();
        let epoch = app.epoch;
        app.handle_api(epoch, ApiEvent::Started(Ok(started_response())));
        app.handle_api(
            epoch,
            ApiEvent::Answered(Ok(AnswerOutcome::Answer(AnswerResponse {
                is_correct: true,
                correct_answer: None,
                next_problem: "1 + 1".to_string(),
                score: 1,
                total_problems: 1,
                time_remaining: 0,
            }))),
        );
        let play = app.play.as_ref().unwrap();
        assert_eq!(play.phase, Phase::Finishing);
    }

    #[test]
    fn menu_cycle_changes_settings() {
        let mut app = test_app();
        app.menu_selected = start_menu::ROW_DIFFICULTY;
        app.menu_cycle(true);
        assert_eq!(app.settings.difficulty, Difficulty::Medium);

        app.menu_selected = start_menu::ROW_OPERATION;
        app.menu_cycle(true);
        assert_eq!(app.settings.operation, Operation::MultiplicationDivision);
    }
}
