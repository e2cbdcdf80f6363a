use crate::Message;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the trimmed user message to the remote `/ask` endpoint.
    Ask { query: String },
    /// Write the current transcript to disk as a standalone document.
    ExportTranscript { messages: Vec<Message> },
}
