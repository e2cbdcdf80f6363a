use crate::view_model::{char_count_level, AppViewModel};

pub type MessageId = u64;

/// Bot message seeded at startup and after every confirmed clear.
pub const GREETING: &str = "Hello! I'm your AI assistant. How can I help you today?";

/// The only text ever shown for a failed `/ask` request.
pub const CONNECTION_ERROR_MESSAGE: &str =
    "Failed to connect to the server. Please check your connection and try again.";

pub const CLEAR_CONFIRM_PROMPT: &str = "Clear all messages?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub content: String,
    pub sender: Sender,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Online,
    Offline,
}

/// Outcome of one health poll as seen by the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthReport {
    /// The server answered with `status == "running"`.
    Running,
    /// The server answered with some other status value.
    NotRunning { status: String },
    /// The request failed or the body could not be decoded.
    Unreachable { reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Input,
    Transcript,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    Error { message: String },
    ConfirmClear,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    input: String,
    transcript: Vec<Message>,
    next_message_id: MessageId,
    busy: bool,
    typing_visible: bool,
    status: Option<ConnectionStatus>,
    overlay: Option<Overlay>,
    focus: Focus,
    notice: Option<String>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        let mut state = Self {
            input: String::new(),
            transcript: Vec::new(),
            next_message_id: 1,
            busy: false,
            typing_visible: false,
            status: None,
            overlay: None,
            focus: Focus::Input,
            notice: None,
            dirty: true,
        };
        state.push_message(GREETING.to_string(), Sender::Bot, Vec::new());
        state
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let char_count = self.input.chars().count();
        AppViewModel {
            messages: self.transcript.clone(),
            input: self.input.clone(),
            char_count,
            char_level: char_count_level(char_count),
            send_enabled: !self.busy,
            typing_visible: self.typing_visible,
            status: self.status,
            overlay: self.overlay.clone(),
            focus: self.focus,
            notice: self.notice.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether a redraw is pending and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub(crate) fn set_input(&mut self, text: String) {
        if self.input != text {
            self.input = text;
            self.mark_dirty();
        }
    }

    pub(crate) fn push_message(&mut self, content: String, sender: Sender, sources: Vec<String>) {
        let id = self.next_message_id;
        self.next_message_id += 1;
        self.transcript.push(Message {
            id,
            content,
            sender,
            sources,
        });
        self.mark_dirty();
    }

    /// Enters the `Sending` state. Callers check `busy` first.
    pub(crate) fn begin_request(&mut self) {
        self.input.clear();
        self.typing_visible = true;
        self.busy = true;
        self.mark_dirty();
    }

    /// Returns to `Idle` regardless of how the request ended.
    pub(crate) fn finish_request(&mut self) {
        self.typing_visible = false;
        self.busy = false;
        self.focus = Focus::Input;
        self.mark_dirty();
    }

    pub(crate) fn set_status(&mut self, status: ConnectionStatus) {
        if self.status != Some(status) {
            self.status = Some(status);
            self.mark_dirty();
        }
    }

    pub(crate) fn set_overlay(&mut self, overlay: Option<Overlay>) {
        self.overlay = overlay;
        self.mark_dirty();
    }

    pub(crate) fn set_focus(&mut self, focus: Focus) {
        if self.focus != focus {
            self.focus = focus;
            self.mark_dirty();
        }
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub(crate) fn reset_transcript(&mut self) {
        self.transcript.clear();
        self.push_message(GREETING.to_string(), Sender::Bot, Vec::new());
    }

    pub(crate) fn set_notice(&mut self, notice: Option<String>) {
        self.notice = notice;
        self.mark_dirty();
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
