use chat_core::CharCountLevel;
use ratatui::style::Color;

pub const TITLE: &str = "AI Assistant";
pub const USER_LABEL: &str = "You";
pub const BOT_LABEL: &str = "Assistant";
pub const TYPING_TEXT: &str = "Assistant is typing…";
pub const HELP_TEXT: &str =
    "Enter send · Shift+Enter newline · Ctrl+K clear · Ctrl+/ focus · Ctrl+S export · Tab scroll · Ctrl+Q quit";

pub const INPUT_HEIGHT: u16 = 5;
pub const MODAL_WIDTH: u16 = 64;
pub const MODAL_HEIGHT: u16 = 7;
pub const PAGE_SCROLL: usize = 10;

pub const SECONDARY_TEXT: Color = Color::DarkGray;
pub const WARNING_COLOR: Color = Color::Yellow;
pub const ERROR_COLOR: Color = Color::Red;
pub const SUCCESS_COLOR: Color = Color::Green;
pub const ACCENT_COLOR: Color = Color::Cyan;

pub fn char_count_color(level: CharCountLevel) -> Color {
    match level {
        CharCountLevel::Normal => SECONDARY_TEXT,
        CharCountLevel::Warning => WARNING_COLOR,
        CharCountLevel::Error => ERROR_COLOR,
    }
}
