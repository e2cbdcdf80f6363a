use ratatui::layout::{Constraint, Direction, Layout, Rect};

use super::constants::INPUT_HEIGHT;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenLayout {
    pub header: Rect,
    pub transcript: Rect,
    pub typing: Rect,
    pub input: Rect,
    pub footer: Rect,
}

pub fn split(area: Rect, typing_visible: bool) -> ScreenLayout {
    let typing_height = u16::from(typing_visible);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(typing_height),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(1),
        ])
        .split(area);

    ScreenLayout {
        header: chunks[0],
        transcript: chunks[1],
        typing: chunks[2],
        input: chunks[3],
        footer: chunks[4],
    }
}

/// A `width` x `height` rectangle centered in `area`, clamped to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

pub fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && column < rect.x.saturating_add(rect.width)
        && row >= rect.y
        && row < rect.y.saturating_add(rect.height)
}
