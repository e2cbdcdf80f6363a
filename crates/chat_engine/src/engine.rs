use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use chat_logging::{chat_debug, chat_info, chat_warn};
use tokio::runtime::Runtime;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::client::{ClientSettings, QaClient, ReqwestQaClient};
use crate::session::{KeyValueStore, SessionIdProvider};
use crate::{AskError, EngineEvent};

pub const DEFAULT_HEALTH_INTERVAL: Duration = Duration::from_secs(30);

pub struct EngineConfig {
    pub client: ClientSettings,
    pub health_interval: Duration,
    pub store: Box<dyn KeyValueStore>,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build http client: {0}")]
    Client(#[from] AskError),
}

enum EngineCommand {
    Ask { query: String },
    Shutdown,
}

/// Owns the IO thread. `/ask` requests and health polls run on its tokio
/// runtime; results come back through [`EngineHandle::try_recv`].
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    cancel: CancellationToken,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let client = Arc::new(ReqwestQaClient::new(config.client)?);
        Self::with_client(client, config.health_interval, config.store)
    }

    pub fn with_client(
        client: Arc<dyn QaClient>,
        health_interval: Duration,
        store: Box<dyn KeyValueStore>,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let cancel = CancellationToken::new();
        let runtime = Runtime::new()?;

        runtime.spawn(poll_health(
            client.clone(),
            health_interval,
            event_tx.clone(),
            cancel.clone(),
        ));

        let loop_cancel = cancel.clone();
        thread::spawn(move || {
            let mut sessions = SessionIdProvider::new(store);
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Ask { query } => {
                        let session_id = sessions.session_id();
                        let client = client.clone();
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            let result = client.ask(&query, &session_id).await;
                            let _ = event_tx.send(EngineEvent::AskCompleted(result));
                        });
                    }
                    EngineCommand::Shutdown => break,
                }
            }
            loop_cancel.cancel();
            runtime.shutdown_timeout(Duration::from_millis(250));
            chat_info!("Engine stopped");
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            cancel,
        })
    }

    pub fn ask(&self, query: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Ask {
            query: query.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    pub fn shutdown(&self) {
        self.cancel.cancel();
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// First tick fires immediately. Each poll runs as its own task so a hung
/// request never delays the next tick.
async fn poll_health(
    client: Arc<dyn QaClient>,
    interval: Duration,
    event_tx: mpsc::Sender<EngineEvent>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }
        let client = client.clone();
        let event_tx = event_tx.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            let report = tokio::select! {
                _ = cancel.cancelled() => return,
                report = client.health() => report,
            };
            chat_debug!("Health report: {:?}", report);
            if event_tx.send(EngineEvent::Health(report)).is_err() {
                chat_warn!("Health report dropped; receiver gone");
                cancel.cancel();
            }
        });
    }
}
