//! Chat core: pure state machine and view-model helpers for the chat widget.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{
    AppState, ConnectionStatus, Focus, HealthReport, Message, MessageId, Overlay, Sender,
    CLEAR_CONFIRM_PROMPT, CONNECTION_ERROR_MESSAGE, GREETING,
};
pub use update::update;
pub use view_model::{
    char_count_level, AppViewModel, CharCountLevel, CHAR_ERROR_THRESHOLD, CHAR_WARNING_THRESHOLD,
};
