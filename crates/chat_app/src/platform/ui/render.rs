use chat_core::{AppViewModel, ConnectionStatus, Focus, Overlay, CLEAR_CONFIRM_PROMPT};
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use super::constants::*;
use super::layout::{centered, split};
use super::transcript::{transcript_paragraph, wrapped_rows, TranscriptView};

/// Draws one frame and returns the overlay rectangle, if one is shown.
pub fn draw(
    frame: &mut Frame,
    view: &AppViewModel,
    transcript: &mut TranscriptView,
) -> Option<Rect> {
    let layout = split(frame.size(), view.typing_visible);

    frame.render_widget(Paragraph::new(header_line(view)), layout.header);
    draw_transcript(frame, layout.transcript, view, transcript);

    if view.typing_visible {
        frame.render_widget(
            Paragraph::new(Span::styled(
                TYPING_TEXT,
                Style::default()
                    .fg(SECONDARY_TEXT)
                    .add_modifier(Modifier::ITALIC),
            )),
            layout.typing,
        );
    }

    draw_input(frame, layout.input, view);
    frame.render_widget(Paragraph::new(footer_line(view)), layout.footer);

    view.overlay
        .as_ref()
        .map(|overlay| draw_overlay(frame, overlay))
}

fn header_line(view: &AppViewModel) -> Line<'static> {
    let (dot_color, label) = match view.status {
        Some(ConnectionStatus::Online) => (SUCCESS_COLOR, "Online"),
        Some(ConnectionStatus::Offline) => (ERROR_COLOR, "Offline"),
        None => (SECONDARY_TEXT, "Connecting"),
    };
    Line::from(vec![
        Span::styled(TITLE, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  "),
        Span::styled("●", Style::default().fg(dot_color)),
        Span::raw(" "),
        Span::raw(label),
    ])
}

fn draw_transcript(
    frame: &mut Frame,
    area: Rect,
    view: &AppViewModel,
    transcript: &mut TranscriptView,
) {
    let border_style = focus_style(view.focus == Focus::Transcript);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title("Conversation");
    let inner = block.inner(area);

    transcript.sync(&view.messages);
    let paragraph = transcript_paragraph(transcript.lines(&view.messages));
    let total = wrapped_rows(&paragraph, inner.width);
    let top = transcript.top_row(total, usize::from(inner.height));
    let top = u16::try_from(top).unwrap_or(u16::MAX);

    frame.render_widget(paragraph.block(block).scroll((top, 0)), area);
}

fn draw_input(frame: &mut Frame, area: Rect, view: &AppViewModel) {
    let focused = view.focus == Focus::Input;
    let title = if view.send_enabled {
        "Message"
    } else {
        "Message (waiting for answer)"
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(focused))
        .title(title);
    let inner = block.inner(area);

    let lines: Vec<&str> = view.input.split('\n').collect();
    let visible = usize::from(inner.height.max(1));
    let first = lines.len().saturating_sub(visible);
    let shown: Vec<Line> = lines[first..]
        .iter()
        .map(|line| Line::from(line.to_string()))
        .collect();
    let cursor_row = shown.len().saturating_sub(1);
    let cursor_col = shown.last().map_or(0, Line::width);

    frame.render_widget(Paragraph::new(shown).block(block), area);

    if focused && view.overlay.is_none() {
        let max_col = inner.width.saturating_sub(1);
        let x = inner.x + u16::try_from(cursor_col).unwrap_or(max_col).min(max_col);
        let y = inner.y + u16::try_from(cursor_row).unwrap_or(0);
        frame.set_cursor(x, y);
    }
}

fn footer_line(view: &AppViewModel) -> Line<'static> {
    let send_style = if view.send_enabled {
        Style::default().fg(SUCCESS_COLOR)
    } else {
        Style::default().fg(SECONDARY_TEXT)
    };
    let mut spans = vec![
        Span::styled(
            view.char_count.to_string(),
            Style::default().fg(char_count_color(view.char_level)),
        ),
        Span::raw("  "),
        Span::styled("[Send]", send_style),
        Span::raw("  "),
    ];
    match &view.notice {
        Some(notice) => {
            spans.push(Span::styled(notice.clone(), Style::default().fg(ACCENT_COLOR)));
        }
        None => spans.push(Span::styled(HELP_TEXT, Style::default().fg(SECONDARY_TEXT))),
    }
    Line::from(spans)
}

fn draw_overlay(frame: &mut Frame, overlay: &Overlay) -> Rect {
    let area = centered(frame.size(), MODAL_WIDTH, MODAL_HEIGHT);
    let (title, color, body, hint) = match overlay {
        Overlay::Error { message } => ("Error", ERROR_COLOR, message.as_str(), "[Esc] Close"),
        Overlay::ConfirmClear => ("Confirm", WARNING_COLOR, CLEAR_CONFIRM_PROMPT, "[y] Yes  [n] No"),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(title);
    let text = vec![
        Line::from(body.to_string()),
        Line::default(),
        Line::from(Span::styled(hint, Style::default().fg(SECONDARY_TEXT))),
    ];

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
        area,
    );
    area
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(ACCENT_COLOR)
    } else {
        Style::default().fg(SECONDARY_TEXT)
    }
}
