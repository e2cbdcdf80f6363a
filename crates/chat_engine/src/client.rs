use std::time::Duration;

use chat_logging::chat_debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;

use crate::{Answer, AskError, AskRequest, AskResponse, HealthReport, HealthResponse};

pub const DEFAULT_BASE_URL: &str =
    "https://onboardai-d0dab4frh4hhffaq.centralindia-01.azurewebsites.net";

/// Connection settings for the question-answering service.
///
/// Both timeouts default to `None`: a hung `/ask` keeps the widget busy until
/// the transport itself gives up.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Option<Duration>,
    pub request_timeout: Option<Duration>,
}

impl ClientSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: None,
            request_timeout: None,
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[async_trait::async_trait]
pub trait QaClient: Send + Sync {
    async fn ask(&self, query: &str, session_id: &str) -> Result<Answer, AskError>;

    async fn health(&self) -> HealthReport;
}

#[derive(Debug, Clone)]
pub struct ReqwestQaClient {
    client: reqwest::Client,
    ask_url: Url,
    health_url: Url,
}

impl ReqwestQaClient {
    pub fn new(settings: ClientSettings) -> Result<Self, AskError> {
        let base = settings.base_url.trim().trim_end_matches('/');
        let ask_url = parse_endpoint(base, "ask")?;
        let health_url = parse_endpoint(base, "")?;

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = settings.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| AskError::Network(err.to_string()))?;

        Ok(Self {
            client,
            ask_url,
            health_url,
        })
    }

    #[cfg(test)]
    fn ask_url(&self) -> &Url {
        &self.ask_url
    }

    #[cfg(test)]
    fn health_url(&self) -> &Url {
        &self.health_url
    }

    async fn fetch_health(&self) -> Result<HealthResponse, AskError> {
        // The status code is not inspected; only the body decides.
        let response = self
            .client
            .get(self.health_url.clone())
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&body).map_err(|err| AskError::Decode(err.to_string()))
    }
}

#[async_trait::async_trait]
impl QaClient for ReqwestQaClient {
    async fn ask(&self, query: &str, session_id: &str) -> Result<Answer, AskError> {
        let body = serde_json::to_vec(&AskRequest { query, session_id })
            .map_err(|err| AskError::Decode(err.to_string()))?;

        let response = self
            .client
            .post(self.ask_url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AskError::HttpStatus(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        let parsed: AskResponse =
            serde_json::from_slice(&bytes).map_err(|err| AskError::Decode(err.to_string()))?;
        chat_debug!(
            "ask answered answer_len={} sources={}",
            parsed.answer.len(),
            parsed.source.as_ref().map_or(0, Vec::len)
        );
        Ok(parsed.into())
    }

    async fn health(&self) -> HealthReport {
        match self.fetch_health().await {
            Ok(HealthResponse { status: Some(status) }) if status == "running" => {
                HealthReport::Running
            }
            Ok(HealthResponse { status }) => HealthReport::NotRunning {
                status: status.unwrap_or_default(),
            },
            Err(err) => HealthReport::Unreachable {
                reason: err.to_string(),
            },
        }
    }
}

fn parse_endpoint(base: &str, path: &str) -> Result<Url, AskError> {
    Url::parse(&format!("{base}/{path}")).map_err(|err| AskError::InvalidUrl(err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> AskError {
    if err.is_timeout() {
        return AskError::Timeout(err.to_string());
    }
    if err.is_decode() {
        return AskError::Decode(err.to_string());
    }
    AskError::Network(err.to_string())
}
