use crate::{ConnectionStatus, Focus, Message, Overlay};

/// Inputs at or above this many characters show the warning color.
pub const CHAR_WARNING_THRESHOLD: usize = 900;
/// Inputs at or above this many characters show the error color.
pub const CHAR_ERROR_THRESHOLD: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharCountLevel {
    #[default]
    Normal,
    Warning,
    Error,
}

/// Cosmetic only; the input is never truncated.
pub fn char_count_level(len: usize) -> CharCountLevel {
    if len >= CHAR_ERROR_THRESHOLD {
        CharCountLevel::Error
    } else if len >= CHAR_WARNING_THRESHOLD {
        CharCountLevel::Warning
    } else {
        CharCountLevel::Normal
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub messages: Vec<Message>,
    pub input: String,
    pub char_count: usize,
    pub char_level: CharCountLevel,
    pub send_enabled: bool,
    pub typing_visible: bool,
    /// `None` until the first health poll completes.
    pub status: Option<ConnectionStatus>,
    pub overlay: Option<Overlay>,
    pub focus: Focus,
    pub notice: Option<String>,
    pub dirty: bool,
}

#[cfg(test)]
mod tests {
    use super::{char_count_level, CharCountLevel};

    #[test]
    fn thresholds_are_inclusive_lower_bounds() {
        assert_eq!(char_count_level(0), CharCountLevel::Normal);
        assert_eq!(char_count_level(899), CharCountLevel::Normal);
        assert_eq!(char_count_level(900), CharCountLevel::Warning);
        assert_eq!(char_count_level(999), CharCountLevel::Warning);
        assert_eq!(char_count_level(1000), CharCountLevel::Error);
        assert_eq!(char_count_level(5000), CharCountLevel::Error);
    }
}
