use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::event::AppEvent;
use crate::game::settings::GameSettings;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned {status}: {detail}")]
    Status {
        status: reqwest::StatusCode,
        detail: String,
    },
}

#[derive(Clone, Debug, Deserialize)]
pub struct StartResponse {
    pub session_id: String,
    pub problem: String,
    pub time_remaining: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct AnswerRequest<'a> {
    pub session_id: &'a str,
    pub answer: i64,
    pub time_taken: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AnswerResponse {
    pub is_correct: bool,
    /// Present only when the answer was wrong.
    pub correct_answer: Option<i64>,
    pub next_problem: String,
    pub score: u32,
    pub total_problems: u32,
    pub time_remaining: u32,
}

/// The answer endpoint replies with the end-of-round result instead of the
/// usual answer payload once the server-side clock has expired.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum AnswerOutcome {
    Answer(AnswerResponse),
    TimeUp(GameResult),
}

#[derive(Clone, Debug, Deserialize)]
pub struct GameResult {
    #[serde(default)]
    pub session_id: String,
    pub score: u32,
    pub total_problems: u32,
    pub accuracy: f64,
    pub time_taken: u32,
    pub xp_earned: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Belt {
    White,
    Yellow,
    Green,
    Brown,
    Black,
    Master,
}

impl Belt {
    pub fn label(self) -> &'static str {
        match self {
            Belt::White => "White Belt",
            Belt::Yellow => "Yellow Belt",
            Belt::Green => "Green Belt",
            Belt::Brown => "Brown Belt",
            Belt::Black => "Black Belt",
            Belt::Master => "Master",
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct RankInfo {
    pub belt: Belt,
    pub level: u32,
}

/// Thin wrapper over the backend REST surface. Each call is a single
/// blocking request/response exchange with no retry or caching; callers run
/// them on worker threads via [`spawn`].
#[derive(Clone)]
pub struct GameClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl GameClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn start_game(&self, settings: GameSettings) -> Result<StartResponse, ApiError> {
        let resp = self
            .http
            .post(format!("{}/game/start", self.base_url))
            .query(&[
                ("difficulty", settings.difficulty.as_str()),
                ("operation_type", settings.operation.as_str()),
            ])
            .send()?;
        read_json(resp)
    }

    pub fn submit_answer(
        &self,
        session_id: &str,
        answer: i64,
        time_taken: f64,
    ) -> Result<AnswerOutcome, ApiError> {
        let resp = self
            .http
            .post(format!("{}/game/answer", self.base_url))
            .json(&AnswerRequest {
                session_id,
                answer,
                time_taken,
            })
            .send()?;
        read_json(resp)
    }

    pub fn end_game(&self, session_id: &str) -> Result<GameResult, ApiError> {
        let resp = self
            .http
            .post(format!("{}/game/end/{session_id}", self.base_url))
            .send()?;
        read_json(resp)
    }

    pub fn get_rank(&self, xp: u32) -> Result<RankInfo, ApiError> {
        let resp = self
            .http
            .get(format!("{}/game/ninja-belt/{xp}", self.base_url))
            .send()?;
        read_json(resp)
    }

    pub fn leaderboard(&self) -> Result<Vec<GameResult>, ApiError> {
        let resp = self
            .http
            .get(format!("{}/game/leaderboard", self.base_url))
            .send()?;
        read_json(resp)
    }
}

fn read_json<T: DeserializeOwned>(resp: reqwest::blocking::Response) -> Result<T, ApiError> {
    let status = resp.status();
    if !status.is_success() {
        let detail = resp.text().unwrap_or_default();
        return Err(ApiError::Status { status, detail });
    }
    Ok(resp.json()?)
}

/// A completed backend call, delivered back into the main event loop.
#[derive(Debug)]
pub enum ApiEvent {
    Started(Result<StartResponse, ApiError>),
    Answered(Result<AnswerOutcome, ApiError>),
    Ended(Result<GameResult, ApiError>),
    Rank(Result<RankInfo, ApiError>),
    Leaderboard(Result<Vec<GameResult>, ApiError>),
}

/// Run a blocking API call on a worker thread and deliver the outcome as an
/// [`AppEvent::Api`] tagged with the epoch current at spawn time. The send
/// fails only during shutdown, when nobody is listening anymore.
pub fn spawn<F>(tx: mpsc::Sender<AppEvent>, epoch: u64, job: F)
where
    F: FnOnce() -> ApiEvent + Send + 'static,
{
    thread::spawn(move || {
        let event = job();
        let _ = tx.send(AppEvent::Api { epoch, event });
    });
}
