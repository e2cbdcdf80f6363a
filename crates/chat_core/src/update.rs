use crate::{AppState, ConnectionStatus, Effect, Focus, HealthReport, Msg, Overlay, Sender};
use crate::CONNECTION_ERROR_MESSAGE;

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChanged(text) => {
            state.set_input(text);
            Vec::new()
        }
        Msg::SubmitPressed => {
            if state.is_busy() || state.overlay().is_some() {
                return (state, Vec::new());
            }
            let query = state.input().trim().to_string();
            if query.is_empty() {
                return (state, Vec::new());
            }

            // Order matters: the user entry lands before the request leaves.
            state.push_message(query.clone(), Sender::User, Vec::new());
            state.begin_request();
            vec![Effect::Ask { query }]
        }
        Msg::AnswerReceived { answer, sources } => {
            if !state.is_busy() {
                return (state, Vec::new());
            }
            state.push_message(answer, Sender::Bot, sources);
            state.finish_request();
            Vec::new()
        }
        Msg::AskFailed { .. } => {
            if !state.is_busy() {
                return (state, Vec::new());
            }
            state.set_overlay(Some(Overlay::Error {
                message: CONNECTION_ERROR_MESSAGE.to_string(),
            }));
            state.finish_request();
            Vec::new()
        }
        Msg::HealthChecked(report) => {
            match report {
                HealthReport::Running => state.set_status(ConnectionStatus::Online),
                HealthReport::Unreachable { .. } => state.set_status(ConnectionStatus::Offline),
                // A reachable server reporting another status leaves the indicator as is.
                HealthReport::NotRunning { .. } => {}
            }
            Vec::new()
        }
        Msg::ErrorDismissed => {
            if matches!(state.overlay(), Some(Overlay::Error { .. })) {
                state.set_overlay(None);
            }
            Vec::new()
        }
        Msg::ClearRequested => {
            if state.overlay().is_none() {
                state.set_overlay(Some(Overlay::ConfirmClear));
            }
            Vec::new()
        }
        Msg::ClearConfirmed => {
            if matches!(state.overlay(), Some(Overlay::ConfirmClear)) {
                state.reset_transcript();
                state.set_overlay(None);
            }
            Vec::new()
        }
        Msg::ClearCancelled => {
            if matches!(state.overlay(), Some(Overlay::ConfirmClear)) {
                state.set_overlay(None);
            }
            Vec::new()
        }
        Msg::FocusInputRequested => {
            state.set_focus(Focus::Input);
            Vec::new()
        }
        Msg::FocusToggled => {
            let next = match state.focus() {
                Focus::Input => Focus::Transcript,
                Focus::Transcript => Focus::Input,
            };
            state.set_focus(next);
            Vec::new()
        }
        Msg::ExportRequested => {
            vec![Effect::ExportTranscript {
                messages: state.transcript().to_vec(),
            }]
        }
        Msg::ExportFinished(result) => {
            let notice = match result {
                Ok(path) => format!("Transcript exported to {path}"),
                Err(reason) => format!("Export failed: {reason}"),
            };
            state.set_notice(Some(notice));
            Vec::new()
        }
    };

    (state, effects)
}
