use std::collections::HashMap;
use std::sync::Arc;

use chat_core::{Message, MessageId, Sender};
use chat_engine::{attribution_line, project_html, LineKind, MarkdownRenderer, Renderer, TerminalLine};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use super::constants::*;

struct RenderedMessage {
    lines: Vec<TerminalLine>,
    attribution: Option<String>,
}

/// Rendered transcript plus scroll position, kept across frames.
///
/// Markdown is rendered once per message id; ids that leave the transcript
/// are dropped on the next sync.
pub struct TranscriptView {
    renderer: Arc<MarkdownRenderer>,
    cache: HashMap<MessageId, RenderedMessage>,
    last_message_id: Option<MessageId>,
    offset_from_bottom: usize,
}

impl TranscriptView {
    pub fn new(renderer: Arc<MarkdownRenderer>) -> Self {
        Self {
            renderer,
            cache: HashMap::new(),
            last_message_id: None,
            offset_from_bottom: 0,
        }
    }

    pub fn sync(&mut self, messages: &[Message]) {
        for message in messages {
            if !self.cache.contains_key(&message.id) {
                let html = self.renderer.render(&message.content);
                self.cache.insert(
                    message.id,
                    RenderedMessage {
                        lines: project_html(&html),
                        attribution: attribution_line(&message.sources),
                    },
                );
            }
        }
        self.cache
            .retain(|id, _| messages.iter().any(|message| message.id == *id));

        let last = messages.last().map(|message| message.id);
        if last != self.last_message_id {
            self.last_message_id = last;
            self.scroll_to_bottom();
        }
    }

    pub fn lines(&self, messages: &[Message]) -> Vec<Line<'static>> {
        let mut out = Vec::new();
        for message in messages {
            let (label, label_style) = match message.sender {
                Sender::User => (USER_LABEL, Style::default().fg(ACCENT_COLOR)),
                Sender::Bot => (BOT_LABEL, Style::default().fg(SUCCESS_COLOR)),
            };
            out.push(Line::from(Span::styled(
                label,
                label_style.add_modifier(Modifier::BOLD),
            )));

            let Some(rendered) = self.cache.get(&message.id) else {
                out.push(Line::from(message.content.clone()));
                continue;
            };
            for line in &rendered.lines {
                out.push(style_line(line));
            }
            if let Some(attribution) = &rendered.attribution {
                out.push(Line::from(Span::styled(
                    format!("↪ {attribution}"),
                    Style::default()
                        .fg(SECONDARY_TEXT)
                        .add_modifier(Modifier::ITALIC),
                )));
            }
            out.push(Line::default());
        }
        out
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.offset_from_bottom = self.offset_from_bottom.saturating_add(rows);
    }

    pub fn scroll_down(&mut self, rows: usize) {
        self.offset_from_bottom = self.offset_from_bottom.saturating_sub(rows);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.offset_from_bottom = 0;
    }

    /// First visible row for a viewport of `height` rows over `total` wrapped
    /// rows. Clamps the stored offset so scrolling past the top sticks there.
    pub fn top_row(&mut self, total: usize, height: usize) -> usize {
        let max_offset = total.saturating_sub(height);
        self.offset_from_bottom = self.offset_from_bottom.min(max_offset);
        max_offset - self.offset_from_bottom
    }
}

/// Word-wrapped transcript body, without a block.
pub fn transcript_paragraph(lines: Vec<Line<'static>>) -> Paragraph<'static> {
    Paragraph::new(lines).wrap(Wrap { trim: false })
}

/// Rows `paragraph` occupies when drawn `width` columns wide.
pub fn wrapped_rows(paragraph: &Paragraph<'_>, width: u16) -> usize {
    paragraph.line_count(width.max(1))
}

fn style_line(line: &TerminalLine) -> Line<'static> {
    let style = match line.kind {
        LineKind::Text | LineKind::Bullet => Style::default(),
        LineKind::Heading => Style::default().add_modifier(Modifier::BOLD),
        LineKind::Code => Style::default().fg(WARNING_COLOR),
        LineKind::Quote => Style::default()
            .fg(SECONDARY_TEXT)
            .add_modifier(Modifier::ITALIC),
        LineKind::Rule => Style::default().fg(SECONDARY_TEXT),
    };
    let indent = if line.kind == LineKind::Code { "  " } else { "" };
    Line::from(Span::styled(format!("{indent}{}", line.text), style))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chat_core::{Message, Sender};
    use chat_engine::MarkdownRenderer;
    use ratatui::backend::TestBackend;
    use ratatui::text::Line;
    use ratatui::Terminal;

    use super::{transcript_paragraph, wrapped_rows, TranscriptView};

    fn message(id: u64, sender: Sender, content: &str, sources: &[&str]) -> Message {
        Message {
            id,
            content: content.to_string(),
            sender,
            sources: sources.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn plain(lines: &[Line<'_>]) -> Vec<String> {
        lines
            .iter()
            .map(|line| {
                line.spans
                    .iter()
                    .map(|span| span.content.as_ref())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn bot_answer_with_sources_shows_attribution() {
        let mut view = TranscriptView::new(Arc::new(MarkdownRenderer::default()));
        let messages = vec![
            message(1, Sender::User, "hello", &[]),
            message(2, Sender::Bot, "Hi", &["doc1"]),
        ];
        view.sync(&messages);

        assert_eq!(
            plain(&view.lines(&messages)),
            vec!["You", "hello", "", "Assistant", "Hi", "↪ Sources: doc1", ""]
        );
    }

    #[test]
    fn no_attribution_without_sources() {
        let mut view = TranscriptView::new(Arc::new(MarkdownRenderer::default()));
        let messages = vec![message(1, Sender::Bot, "Hi", &[])];
        view.sync(&messages);

        let text = plain(&view.lines(&messages));
        assert!(!text.iter().any(|line| line.contains("Sources")));
    }

    #[test]
    fn new_message_snaps_back_to_bottom() {
        let mut view = TranscriptView::new(Arc::new(MarkdownRenderer::default()));
        let mut messages = vec![message(1, Sender::Bot, "Hi", &[])];
        view.sync(&messages);
        view.scroll_up(5);
        assert_eq!(view.top_row(100, 10), 85);

        messages.push(message(2, Sender::User, "more", &[]));
        view.sync(&messages);
        assert_eq!(view.top_row(100, 10), 90);
    }

    #[test]
    fn scrolling_past_top_is_clamped() {
        let mut view = TranscriptView::new(Arc::new(MarkdownRenderer::default()));
        view.scroll_up(1_000);
        assert_eq!(view.top_row(30, 10), 0);
        view.scroll_down(1);
        assert_eq!(view.top_row(30, 10), 1);
    }

    #[test]
    fn wrapped_rows_counts_empty_lines_once() {
        let paragraph = transcript_paragraph(vec![Line::from(""), Line::from("x".repeat(25))]);
        assert_eq!(wrapped_rows(&paragraph, 10), 4);
    }

    #[test]
    fn wrapped_rows_follows_word_boundaries() {
        let paragraph = transcript_paragraph(vec![
            Line::from("aaaaaa bbbbbb cccccc"),
            Line::from("LAST"),
        ]);
        assert_eq!(wrapped_rows(&paragraph, 10), 4);
    }

    #[test]
    fn bottom_row_is_drawn_after_word_wrapping() {
        let lines = vec![Line::from("aaaaaa bbbbbb cccccc"), Line::from("LAST")];
        let paragraph = transcript_paragraph(lines);
        let total = wrapped_rows(&paragraph, 10);

        let mut view = TranscriptView::new(Arc::new(MarkdownRenderer::default()));
        let top = u16::try_from(view.top_row(total, 2)).unwrap();

        let mut terminal = Terminal::new(TestBackend::new(10, 2)).unwrap();
        terminal
            .draw(|frame| frame.render_widget(paragraph.scroll((top, 0)), frame.size()))
            .unwrap();

        let screen: String = terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert_eq!(screen, "cccccc    LAST      ");
    }
}
