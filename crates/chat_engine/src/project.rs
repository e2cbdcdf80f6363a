//! Projection of rendered message HTML onto plain terminal lines.

use ego_tree::NodeRef;
use scraper::{Html, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Text,
    Heading,
    Code,
    Quote,
    Bullet,
    Rule,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalLine {
    pub kind: LineKind,
    pub text: String,
}

impl TerminalLine {
    fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

pub fn project_html(html: &str) -> Vec<TerminalLine> {
    let fragment = Html::parse_fragment(html);
    let mut projector = Projector::default();
    projector.walk(fragment.tree.root());
    projector.flush();
    projector.finish()
}

struct Projector {
    lines: Vec<TerminalLine>,
    current: String,
    kind: LineKind,
    in_pre: bool,
    quote_depth: usize,
    list_depth: usize,
}

impl Default for Projector {
    fn default() -> Self {
        Self {
            lines: Vec::new(),
            current: String::new(),
            kind: LineKind::Text,
            in_pre: false,
            quote_depth: 0,
            list_depth: 0,
        }
    }
}

impl Projector {
    fn walk(&mut self, node: NodeRef<'_, Node>) {
        match node.value() {
            Node::Text(text) => self.push_text(text),
            Node::Element(element) => match element.name() {
                "br" => self.break_line(),
                "hr" => {
                    self.flush();
                    self.lines.push(TerminalLine::new(LineKind::Rule, "─".repeat(24)));
                }
                "pre" => {
                    self.flush();
                    self.in_pre = true;
                    self.kind = LineKind::Code;
                    self.walk_children(node);
                    // A trailing newline inside <pre> already flushed the last line.
                    if !self.current.is_empty() {
                        self.break_line();
                    }
                    self.in_pre = false;
                    self.kind = LineKind::Text;
                }
                "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => self.block(node, LineKind::Heading),
                "blockquote" => {
                    self.flush();
                    self.quote_depth += 1;
                    self.walk_children(node);
                    self.flush();
                    self.quote_depth -= 1;
                }
                "ul" | "ol" => {
                    self.flush();
                    self.list_depth += 1;
                    self.walk_children(node);
                    self.flush();
                    self.list_depth -= 1;
                }
                "li" => {
                    self.flush();
                    let indent = "  ".repeat(self.list_depth.saturating_sub(1));
                    self.current.push_str(&indent);
                    self.current.push_str("• ");
                    self.kind = LineKind::Bullet;
                    self.walk_children(node);
                    self.flush();
                    if self.current.trim() == "•" {
                        self.current.clear();
                        self.kind = LineKind::Text;
                    }
                }
                "td" | "th" => {
                    if !self.current.is_empty() {
                        self.current.push_str(" | ");
                    }
                    self.walk_children(node);
                }
                "p" | "div" | "tr" | "table" | "thead" | "tbody" => self.block(node, LineKind::Text),
                "script" | "style" => {}
                _ => self.walk_children(node),
            },
            _ => self.walk_children(node),
        }
    }

    fn walk_children(&mut self, node: NodeRef<'_, Node>) {
        for child in node.children() {
            self.walk(child);
        }
    }

    fn block(&mut self, node: NodeRef<'_, Node>, kind: LineKind) {
        self.flush();
        if self.kind != LineKind::Bullet {
            self.kind = kind;
        }
        self.walk_children(node);
        self.flush();
    }

    fn push_text(&mut self, text: &str) {
        if self.in_pre {
            let mut pieces = text.split('\n').peekable();
            while let Some(piece) = pieces.next() {
                self.current.push_str(piece);
                if pieces.peek().is_some() {
                    self.break_line();
                }
            }
            return;
        }

        for (index, word) in text.split_whitespace().enumerate() {
            let leading_space = index > 0 || text.starts_with(char::is_whitespace);
            if leading_space && !self.current.is_empty() && !self.current.ends_with(' ') {
                self.current.push(' ');
            }
            self.current.push_str(word);
        }
        if text.ends_with(char::is_whitespace) && !self.current.is_empty() {
            self.current.push(' ');
        }
    }

    fn break_line(&mut self) {
        let text = std::mem::take(&mut self.current);
        let text = if self.in_pre {
            text
        } else {
            text.trim_end().to_string()
        };
        self.emit(text);
    }

    /// Ends the current block; empty text outside code is dropped.
    fn flush(&mut self) {
        if self.current.trim() == "•" {
            // Bullet still waiting for the item's first block.
            return;
        }
        let text = std::mem::take(&mut self.current);
        let trimmed = text.trim_end();
        if !trimmed.trim_start().is_empty() {
            self.emit(trimmed.to_string());
        }
        if !self.in_pre {
            self.kind = LineKind::Text;
        }
    }

    fn emit(&mut self, text: String) {
        let (kind, text) = if self.quote_depth > 0 && !self.in_pre {
            (LineKind::Quote, format!("{}{}", "> ".repeat(self.quote_depth), text))
        } else {
            (self.kind, text)
        };
        self.lines.push(TerminalLine::new(kind, text));
        if kind == LineKind::Bullet {
            // Continuation lines of a list item are plain text.
            self.kind = LineKind::Text;
        }
    }

    fn finish(self) -> Vec<TerminalLine> {
        self.lines
    }
}
