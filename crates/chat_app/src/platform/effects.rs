use std::sync::Arc;

use chat_core::{Effect, HealthReport, Message, Msg, Sender};
use chat_engine::{
    export_transcript, EngineEvent, EngineHandle, ExportOptions, MarkdownRenderer, Renderer,
    Speaker, TranscriptEntry,
};
use chat_logging::{chat_info, chat_warn};

pub struct EffectRunner {
    engine: EngineHandle,
    renderer: Arc<MarkdownRenderer>,
    export: ExportOptions,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, renderer: Arc<MarkdownRenderer>, export: ExportOptions) -> Self {
        Self {
            engine,
            renderer,
            export,
        }
    }

    /// Runs effects; synchronous ones report back through the returned messages.
    pub fn enqueue(&self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut follow_up = Vec::new();
        for effect in effects {
            match effect {
                Effect::Ask { query } => {
                    chat_info!("Ask query_len={}", query.chars().count());
                    self.engine.ask(query);
                }
                Effect::ExportTranscript { messages } => {
                    follow_up.push(Msg::ExportFinished(self.export(&messages)));
                }
            }
        }
        follow_up
    }

    /// Next engine event translated into a core message, if any is waiting.
    pub fn poll(&self) -> Option<Msg> {
        self.engine.try_recv().map(map_event)
    }

    pub fn shutdown(&self) {
        self.engine.shutdown();
    }

    fn export(&self, messages: &[Message]) -> Result<String, String> {
        let entries: Vec<TranscriptEntry> = messages
            .iter()
            .map(|message| TranscriptEntry {
                speaker: map_sender(message.sender),
                body_html: self.renderer.render(&message.content),
                sources: message.sources.clone(),
            })
            .collect();

        match export_transcript(&self.export, &entries) {
            Ok(path) => {
                chat_info!("Exported {} messages to {:?}", entries.len(), path);
                Ok(path.display().to_string())
            }
            Err(err) => {
                chat_warn!("Transcript export failed: {}", err);
                Err(err.to_string())
            }
        }
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::AskCompleted(Ok(answer)) => Msg::AnswerReceived {
            answer: answer.answer,
            sources: answer.sources,
        },
        EngineEvent::AskCompleted(Err(err)) => {
            chat_warn!("Ask failed: {}", err);
            Msg::AskFailed {
                reason: err.to_string(),
            }
        }
        EngineEvent::Health(report) => Msg::HealthChecked(map_health(report)),
    }
}

fn map_health(report: chat_engine::HealthReport) -> HealthReport {
    match report {
        chat_engine::HealthReport::Running => HealthReport::Running,
        chat_engine::HealthReport::NotRunning { status } => {
            chat_info!("Server reachable but reports status {:?}", status);
            HealthReport::NotRunning { status }
        }
        chat_engine::HealthReport::Unreachable { reason } => {
            chat_info!("Health check failed: {}", reason);
            HealthReport::Unreachable { reason }
        }
    }
}

fn map_sender(sender: Sender) -> Speaker {
    match sender {
        Sender::User => Speaker::User,
        Sender::Bot => Speaker::Bot,
    }
}
