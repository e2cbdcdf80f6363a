use pulldown_cmark::{html, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use pulldown_cmark_escape as escape;
use serde::{Deserialize, Serialize};
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

/// What happens to escaped markup after rendering.
///
/// `Faithful` un-escapes `&lt;`, `&gt;` and `&amp;`, so HTML contained in an
/// answer reaches the output as live markup. `Escaped` keeps the renderer's
/// escaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HtmlPolicy {
    #[default]
    Faithful,
    Escaped,
}

pub trait Renderer: Send + Sync {
    fn render(&self, markdown: &str) -> String;
}

/// Markdown to HTML with hard line breaks, GFM extensions and class-based
/// highlighting of fenced code in recognized languages.
pub struct MarkdownRenderer {
    policy: HtmlPolicy,
    syntaxes: SyntaxSet,
}

impl MarkdownRenderer {
    pub fn new(policy: HtmlPolicy) -> Self {
        Self {
            policy,
            syntaxes: SyntaxSet::load_defaults_newlines(),
        }
    }

    fn options() -> Options {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options
    }

    /// `None` when the language is unknown or highlighting fails.
    fn highlight(&self, code: &str, lang: &str) -> Option<String> {
        if lang.is_empty() {
            return None;
        }
        let syntax = self.syntaxes.find_syntax_by_token(lang)?;
        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, ClassStyle::Spaced);
        for line in LinesWithEndings::from(code) {
            generator
                .parse_html_for_line_which_includes_newline(line)
                .ok()?;
        }
        Some(generator.finalize())
    }

    fn code_block_html(&self, code: &str, lang: &str) -> String {
        let body = self
            .highlight(code, lang)
            .unwrap_or_else(|| escape_html(code));
        if lang.is_empty() {
            format!("<pre><code>{body}</code></pre>\n")
        } else {
            format!(
                "<pre><code class=\"language-{}\">{body}</code></pre>\n",
                escape_html(lang)
            )
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(HtmlPolicy::default())
    }
}

impl Renderer for MarkdownRenderer {
    fn render(&self, markdown: &str) -> String {
        let mut events = Vec::new();
        let mut code_block: Option<(String, String)> = None;

        for event in Parser::new_ext(markdown, Self::options()) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => {
                            info.split_whitespace().next().unwrap_or("").to_string()
                        }
                        CodeBlockKind::Indented => String::new(),
                    };
                    code_block = Some((lang, String::new()));
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((lang, code)) = code_block.take() {
                        events.push(Event::Html(self.code_block_html(&code, &lang).into()));
                    }
                }
                Event::Text(text) => match code_block.as_mut() {
                    Some((_, code)) => code.push_str(&text),
                    None => events.push(Event::Text(text)),
                },
                Event::SoftBreak => events.push(Event::HardBreak),
                other => events.push(other),
            }
        }

        let mut out = String::with_capacity(markdown.len() * 2);
        html::push_html(&mut out, events.into_iter());

        match self.policy {
            HtmlPolicy::Faithful => unescape_markup(&out),
            HtmlPolicy::Escaped => out,
        }
    }
}

/// `Sources: a, b` when there is at least one source.
pub fn attribution_line(sources: &[String]) -> Option<String> {
    if sources.is_empty() {
        None
    } else {
        Some(format!("Sources: {}", sources.join(", ")))
    }
}

// Order matters: `&amp;lt;` must end up as `&lt;`, not `<`.
fn unescape_markup(html: &str) -> String {
    html.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    // Writing into a String is infallible.
    let _ = escape::escape_html(&mut out, text);
    out
}

#[cfg(test)]
mod tests {
    use super::{attribution_line, escape_html, unescape_markup};

    #[test]
    fn unescape_runs_in_fixed_order() {
        assert_eq!(unescape_markup("&amp;lt;b&amp;gt;"), "&lt;b&gt;");
        assert_eq!(unescape_markup("&lt;i&gt;x&lt;/i&gt;"), "<i>x</i>");
    }

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(escape_html("<a href=\"x\">&</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&lt;/a&gt;");
    }

    #[test]
    fn attribution_joins_sources() {
        assert_eq!(attribution_line(&[]), None);
        assert_eq!(
            attribution_line(&["doc1".to_string(), "doc2".to_string()]).as_deref(),
            Some("Sources: doc1, doc2")
        );
    }
}
