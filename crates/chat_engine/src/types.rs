use serde::{Deserialize, Serialize};

/// JSON body of `POST /ask`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AskRequest<'a> {
    pub query: &'a str,
    pub session_id: &'a str,
}

/// JSON body returned by `POST /ask`. `source` may be absent or null.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    #[serde(default)]
    pub source: Option<Vec<String>>,
}

/// JSON body returned by `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<String>,
}

impl From<AskResponse> for Answer {
    fn from(response: AskResponse) -> Self {
        Self {
            answer: response.answer,
            sources: response.source.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthReport {
    Running,
    NotRunning { status: String },
    Unreachable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AskError {
    #[error("invalid base url: {0}")]
    InvalidUrl(String),
    #[error("http status {0}")]
    HttpStatus(u16),
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response body: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    AskCompleted(Result<Answer, AskError>),
    Health(HealthReport),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Bot,
}

/// One rendered transcript entry, ready for export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub body_html: String,
    pub sources: Vec<String>,
}
