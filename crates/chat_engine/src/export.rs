use std::path::PathBuf;

use crate::persist::{AtomicFileWriter, PersistError};
use crate::render::{attribution_line, escape_html};
use crate::{Speaker, TranscriptEntry};

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    pub output_filename: String,
    pub title: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            output_filename: "transcript.html".to_string(),
            title: "AI Assistant".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("transcript is empty")]
    Empty,
}

/// Standalone HTML page with one block per entry, using the same class
/// names as the live widget (`message`, `user-message`, `bot-message`,
/// `message-content`, `source-attribution`).
pub fn build_transcript_document(title: &str, entries: &[TranscriptEntry]) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    out.push_str("</head>\n<body>\n<div class=\"chat-messages\">\n");

    for entry in entries {
        let sender = match entry.speaker {
            Speaker::User => "user",
            Speaker::Bot => "bot",
        };
        out.push_str(&format!("<div class=\"message {sender}-message\">\n"));
        out.push_str("<div class=\"message-content\">\n");
        out.push_str(&entry.body_html);
        if let Some(line) = attribution_line(&entry.sources) {
            // Attribution is text, never markup.
            out.push_str(&format!(
                "<div class=\"source-attribution\"><span>{}</span></div>\n",
                escape_html(&line)
            ));
        }
        out.push_str("</div>\n</div>\n");
    }

    out.push_str("</div>\n</body>\n</html>\n");
    out
}

pub fn export_transcript(
    options: &ExportOptions,
    entries: &[TranscriptEntry],
) -> Result<PathBuf, ExportError> {
    if entries.is_empty() {
        return Err(ExportError::Empty);
    }
    let document = build_transcript_document(&options.title, entries);
    let writer = AtomicFileWriter::new(options.output_dir.clone());
    Ok(writer.write(&options.output_filename, &document)?)
}
