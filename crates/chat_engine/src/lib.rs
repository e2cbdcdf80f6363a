//! Chat engine: HTTP client, health polling, session storage and rendering.
mod client;
mod engine;
mod export;
mod persist;
mod project;
mod render;
mod session;
mod types;

pub use client::{ClientSettings, QaClient, ReqwestQaClient, DEFAULT_BASE_URL};
pub use engine::{EngineConfig, EngineError, EngineHandle, DEFAULT_HEALTH_INTERVAL};
pub use export::{build_transcript_document, export_transcript, ExportError, ExportOptions};
pub use persist::{ensure_dir, AtomicFileWriter, PersistError};
pub use project::{project_html, LineKind, TerminalLine};
pub use render::{attribution_line, HtmlPolicy, MarkdownRenderer, Renderer};
pub use session::{
    FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, SessionIdProvider, StoreError,
    SESSION_KEY,
};
pub use types::{
    Answer, AskError, AskRequest, AskResponse, EngineEvent, HealthReport, HealthResponse,
    Speaker, TranscriptEntry,
};
