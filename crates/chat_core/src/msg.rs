use crate::HealthReport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the message input (full text after the edit).
    InputChanged(String),
    /// User pressed Enter (without Shift) or the send control.
    SubmitPressed,
    /// The `/ask` request completed with an answer.
    AnswerReceived {
        answer: String,
        sources: Vec<String>,
    },
    /// The `/ask` request failed for any reason.
    AskFailed { reason: String },
    /// A health poll finished.
    HealthChecked(HealthReport),
    /// User dismissed the error overlay (Escape, close key or click outside).
    ErrorDismissed,
    /// Clear-transcript shortcut; opens the confirmation prompt.
    ClearRequested,
    /// User accepted the clear confirmation prompt.
    ClearConfirmed,
    /// User rejected the clear confirmation prompt.
    ClearCancelled,
    /// Focus-input shortcut.
    FocusInputRequested,
    /// Move focus between the input and the transcript.
    FocusToggled,
    /// Export shortcut.
    ExportRequested,
    /// Export finished; `Ok` carries the written path for display.
    ExportFinished(Result<String, String>),
}
