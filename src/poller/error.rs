use std::time::Duration;

use thiserror::Error;

/// Reasons a single poll can fail.
#[derive(Debug, Error)]
pub enum PollError {
    #[error("error sending request: {0}")]
    Transport(reqwest::Error),
    #[error("error reading response body: {0}")]
    Body(reqwest::Error),
    #[error("error parsing JSON: {0}")]
    Decode(serde_json::Error),
    #[error("poll interval of {}s cannot be scheduled", .0.as_secs())]
    Interval(Duration),
}

impl From<serde_json::Error> for PollError {
    fn from(e: serde_json::Error) -> Self {
        PollError::Decode(e)
    }
}

impl PollError {
    /// Transport and body failures only stop the poller; everything else takes
    /// the whole process down.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, PollError::Transport(_) | PollError::Body(_))
    }
}
