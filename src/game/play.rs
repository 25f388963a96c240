use std::time::{Duration, Instant};

use crate::api::{AnswerResponse, StartResponse};

/// How long correctness feedback stays on screen. Input is ignored for the
/// whole window so the same problem cannot be submitted twice.
pub const FEEDBACK_WINDOW: Duration = Duration::from_millis(1500);

/// Fallback round length shown while the start request is in flight.
pub const DEFAULT_ROUND_SECS: u32 = 120;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Start request in flight; no session yet.
    Loading,
    Active,
    /// Countdown hit zero; exactly one end-game call has been issued.
    Finishing,
    /// A start or end call failed. The message is shown with a retry key.
    Failed(String),
}

#[derive(Clone, Copy, Debug)]
pub struct Feedback {
    pub correct: bool,
    pub correct_answer: Option<i64>,
    shown_at: Instant,
}

pub struct Submission {
    pub answer: i64,
    pub time_taken: f64,
}

#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    /// The local countdown just reached zero; the caller must issue the
    /// end-game call. Returned at most once per round.
    RoundOver,
}

/// Local state of one round. The server owns the session; everything here is
/// either a mirror of the last server response or pure UI state (countdown
/// estimate, answer buffer, transient feedback).
pub struct PlayState {
    pub phase: Phase,
    pub session_id: Option<String>,
    pub problem: String,
    pub score: u32,
    pub total_problems: u32,
    /// Optimistic local estimate, overwritten by every server response.
    pub time_remaining: u32,
    pub round_secs: u32,
    pub answer: String,
    pub feedback: Option<Feedback>,
    /// Transient notice for a failed submit; cleared on the next response.
    pub notice: Option<String>,
    problem_started_at: Instant,
    countdown_mark: Instant,
    submit_in_flight: bool,
}

impl PlayState {
    pub fn new(now: Instant) -> Self {
        Self {
            phase: Phase::Loading,
            session_id: None,
            problem: String::new(),
            score: 0,
            total_problems: 0,
            time_remaining: DEFAULT_ROUND_SECS,
            round_secs: DEFAULT_ROUND_SECS,
            answer: String::new(),
            feedback: None,
            notice: None,
            problem_started_at: now,
            countdown_mark: now,
            submit_in_flight: false,
        }
    }

    pub fn on_started(&mut self, resp: StartResponse, now: Instant) {
        self.session_id = Some(resp.session_id);
        self.problem = resp.problem;
        self.time_remaining = resp.time_remaining;
        self.round_secs = resp.time_remaining.max(1);
        self.phase = Phase::Active;
        self.problem_started_at = now;
        self.countdown_mark = now;
    }

    pub fn fail(&mut self, message: String) {
        self.phase = Phase::Failed(message);
    }

    /// Declarative focus rule: the answer buffer owns all digit/minus input
    /// exactly when the round is running and no feedback is on screen.
    pub fn accepts_input(&self) -> bool {
        self.phase == Phase::Active && self.feedback.is_none()
    }

    pub fn push_char(&mut self, ch: char) {
        if !self.accepts_input() {
            return;
        }
        // Minus only as a leading sign.
        if ch.is_ascii_digit() || (ch == '-' && self.answer.is_empty()) {
            self.answer.push(ch);
        }
    }

    pub fn backspace(&mut self) {
        if self.accepts_input() {
            self.answer.pop();
        }
    }

    /// Gate and consume a submit request. Returns `None` (a no-op) while
    /// feedback is showing, while a submit is already in flight, or when the
    /// buffer does not parse as an integer (empty or a lone `-`).
    pub fn take_submission(&mut self, now: Instant) -> Option<Submission> {
        if !self.accepts_input() || self.submit_in_flight {
            return None;
        }
        let answer: i64 = self.answer.trim().parse().ok()?;
        self.submit_in_flight = true;
        Some(Submission {
            answer,
            time_taken: now.duration_since(self.problem_started_at).as_secs_f64(),
        })
    }

    /// Install a normal answer response: next problem, server-side totals,
    /// and the authoritative clock. Shows feedback for [`FEEDBACK_WINDOW`].
    pub fn on_answer(&mut self, resp: AnswerResponse, now: Instant) {
        self.submit_in_flight = false;
        self.notice = None;
        self.problem = resp.next_problem;
        self.score = resp.score;
        self.total_problems = resp.total_problems;
        self.time_remaining = resp.time_remaining;
        self.countdown_mark = now;
        self.answer.clear();
        self.problem_started_at = now;
        self.feedback = Some(Feedback {
            correct: resp.is_correct,
            correct_answer: resp.correct_answer,
            shown_at: now,
        });
    }

    pub fn on_answer_failed(&mut self, message: String) {
        self.submit_in_flight = false;
        self.notice = Some(message);
    }

    /// Mark the round as over without a local countdown expiry (the server
    /// answered a submit with the final result).
    pub fn finish(&mut self) {
        self.phase = Phase::Finishing;
    }

    /// Drive time-based state: expire feedback and advance the 1 Hz
    /// countdown estimate. Called from the UI tick, which fires well more
    /// often than once a second.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        if let Some(fb) = self.feedback
            && now.duration_since(fb.shown_at) >= FEEDBACK_WINDOW
        {
            self.feedback = None;
        }

        if self.phase != Phase::Active {
            return TickOutcome::Idle;
        }

        while now.duration_since(self.countdown_mark) >= Duration::from_secs(1) {
            self.countdown_mark += Duration::from_secs(1);
            self.time_remaining = self.time_remaining.saturating_sub(1);
            if self.time_remaining == 0 {
                self.phase = Phase::Finishing;
                return TickOutcome::RoundOver;
            }
        }

        TickOutcome::Idle
    }

    pub fn accuracy_percent(&self) -> u32 {
        if self.total_problems == 0 {
            return 0;
        }
        (self.score as f64 / self.total_problems as f64 * 100.0).round() as u32
    }

    /// Fraction of the round elapsed, for the progress bar.
    pub fn elapsed_ratio(&self) -> f64 {
        let elapsed = self.round_secs.saturating_sub(self.time_remaining);
        elapsed as f64 / self.round_secs.max(1) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(now: Instant) -> PlayState {
        let mut play = PlayState::new(now);
        play.on_started(
            StartResponse {
                session_id: "s1".to_string(),
                problem: "3 + 4".to_string(),
                time_remaining: 120,
            },
            now,
        );
        play
    }

    fn answer(correct: bool, time_remaining: u32) -> AnswerResponse {
        AnswerResponse {
            is_correct: correct,
            correct_answer: if correct { None } else { Some(7) },
            next_problem: "5 - 2".to_string(),
            score: if correct { 1 } else { 0 },
            total_problems: 1,
            time_remaining,
        }
    }

    #[test]
    fn start_moves_loading_to_active() {
        let now = Instant::now();
        let play = started(now);
        assert_eq!(play.phase, Phase::Active);
        assert_eq!(play.session_id.as_deref(), Some("s1"));
        assert_eq!(play.problem, "3 + 4");
        assert_eq!(play.time_remaining, 120);
    }

    #[test]
    fn countdown_decrements_once_per_second_and_floors_at_zero() {
        let now = Instant::now();
        let mut play = started(now);

        assert_eq!(play.tick(now + Duration::from_millis(900)), TickOutcome::Idle);
        assert_eq!(play.time_remaining, 120);

        assert_eq!(play.tick(now + Duration::from_secs(1)), TickOutcome::Idle);
        assert_eq!(play.time_remaining, 119);

        // A late tick catches up on every whole second missed.
        assert_eq!(play.tick(now + Duration::from_secs(5)), TickOutcome::Idle);
        assert_eq!(play.time_remaining, 115);
    }

    #[test]
    fn countdown_expiry_reports_round_over_exactly_once() {
        let now = Instant::now();
        let mut play = started(now);

        let mut round_overs = 0;
        for i in 1..=200u64 {
            if play.tick(now + Duration::from_secs(i)) == TickOutcome::RoundOver {
                round_overs += 1;
            }
        }
        assert_eq!(round_overs, 1);
        assert_eq!(play.time_remaining, 0);
        assert_eq!(play.phase, Phase::Finishing);
    }

    #[test]
    fn empty_or_non_numeric_buffer_is_not_submittable() {
        let now = Instant::now();
        let mut play = started(now);
        assert!(play.take_submission(now).is_none());

        play.push_char('-');
        assert!(play.take_submission(now).is_none());
    }

    #[test]
    fn submission_carries_elapsed_time_and_parsed_answer() {
        let now = Instant::now();
        let mut play = started(now);
        play.push_char('-');
        play.push_char('7');

        let sub = play
            .take_submission(now + Duration::from_millis(2500))
            .unwrap();
        assert_eq!(sub.answer, -7);
        assert!((sub.time_taken - 2.5).abs() < 0.01);
    }

    #[test]
    fn second_submit_while_in_flight_is_a_no_op() {
        let now = Instant::now();
        let mut play = started(now);
        play.push_char('7');
        assert!(play.take_submission(now).is_some());
        assert!(play.take_submission(now).is_none());
    }

    #[test]
    fn feedback_blocks_input_and_expires_after_window() {
        let now = Instant::now();
        let mut play = started(now);
        play.push_char('7');
        play.take_submission(now).unwrap();
        play.on_answer(answer(true, 110), now);

        assert!(play.feedback.is_some());
        assert!(!play.accepts_input());
        play.push_char('9');
        assert!(play.answer.is_empty());
        assert!(play.take_submission(now).is_none());

        let _ = play.tick(now + FEEDBACK_WINDOW - Duration::from_millis(1));
        assert!(play.feedback.is_some());

        let _ = play.tick(now + FEEDBACK_WINDOW);
        assert!(play.feedback.is_none());
        assert!(play.accepts_input());
    }

    #[test]
    fn server_time_overwrites_local_estimate() {
        let now = Instant::now();
        let mut play = started(now);

        // Local estimate has drifted down.
        let _ = play.tick(now + Duration::from_secs(30));
        assert_eq!(play.time_remaining, 90);

        // Server response is authoritative and resets the tick clock.
        play.push_char('7');
        let t = now + Duration::from_secs(30);
        play.take_submission(t).unwrap();
        play.on_answer(answer(true, 95), t);
        assert_eq!(play.time_remaining, 95);

        let _ = play.tick(t + Duration::from_millis(999));
        assert_eq!(play.time_remaining, 95);
        let _ = play.tick(t + Duration::from_secs(1));
        assert_eq!(play.time_remaining, 94);
    }

    #[test]
    fn wrong_answer_keeps_score_and_exposes_correct_answer() {
        let now = Instant::now();
        let mut play = started(now);
        play.push_char('2');
        play.take_submission(now).unwrap();
        play.on_answer(answer(false, 100), now);

        assert_eq!(play.score, 0);
        assert_eq!(play.total_problems, 1);
        let fb = play.feedback.unwrap();
        assert!(!fb.correct);
        assert_eq!(fb.correct_answer, Some(7));
        assert_eq!(play.problem, "5 - 2");
        assert!(play.answer.is_empty());
    }

    #[test]
    fn submit_failure_clears_in_flight_and_sets_notice() {
        let now = Instant::now();
        let mut play = started(now);
        play.push_char('7');
        play.take_submission(now).unwrap();
        play.on_answer_failed("request failed".to_string());

        assert!(play.notice.is_some());
        // The same problem can be submitted again.
        assert!(play.take_submission(now).is_some());
    }

    #[test]
    fn minus_is_only_accepted_as_leading_sign() {
        let now = Instant::now();
        let mut play = started(now);
        play.push_char('4');
        play.push_char('-');
        assert_eq!(play.answer, "4");
    }

    #[test]
    fn no_countdown_while_loading_or_finishing() {
        let now = Instant::now();
        let mut play = PlayState::new(now);
        let _ = play.tick(now + Duration::from_secs(10));
        assert_eq!(play.time_remaining, DEFAULT_ROUND_SECS);

        let mut play = started(now);
        play.finish();
        let _ = play.tick(now + Duration::from_secs(10));
        assert_eq!(play.time_remaining, 120);
    }
}
