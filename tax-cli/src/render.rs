//! Presentation of report lines as plain text or HTML.
//!
//! Both renderers keep the engine's emission order and only decide how each
//! kind of [`LineItem`] looks.

use clap::ValueEnum;
use tax_core::{LineItem, Reporter};

/// Output flavour selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Html,
}

impl OutputFormat {
    pub fn renderer(self) -> Box<dyn Renderer> {
        match self {
            Self::Text => Box::new(TextRenderer::default()),
            Self::Html => Box::new(HtmlRenderer::default()),
        }
    }
}

/// A reporter that accumulates a printable document.
pub trait Renderer: Reporter {
    fn finish(self: Box<Self>) -> String;
}

/// Console layout: totals as `label = amount`, sections indented beneath
/// their heading.
#[derive(Debug, Default)]
pub struct TextRenderer {
    out: String,
}

impl TextRenderer {
    pub fn into_string(self) -> String {
        self.out
    }
}

impl Reporter for TextRenderer {
    fn report(
        &mut self,
        item: LineItem,
    ) {
        let rendered = match item {
            LineItem::Aggregate { label, amount } | LineItem::SectionEnd { label, amount } => {
                format!("{label} = {amount}\n\n")
            }
            LineItem::SectionStart { label } => format!("{label}:\n"),
            LineItem::Detail { text } => format!("   {text}\n"),
            LineItem::Text { text } => format!("{text}\n"),
        };
        self.out.push_str(&rendered);
    }
}

impl Renderer for TextRenderer {
    fn finish(self: Box<Self>) -> String {
        self.into_string()
    }
}

/// HTML fragment with each section in a `seclist` block.
#[derive(Debug, Default)]
pub struct HtmlRenderer {
    out: String,
}

impl HtmlRenderer {
    pub fn into_string(self) -> String {
        self.out
    }
}

impl Reporter for HtmlRenderer {
    fn report(
        &mut self,
        item: LineItem,
    ) {
        let rendered = match item {
            LineItem::Aggregate { label, amount } => {
                format!("<p>{}: {}</p>\n", escape(&label), escape(&amount.to_string()))
            }
            LineItem::SectionStart { label } => {
                format!(
                    "<div class=\"seclist\"><p><strong>{}</strong><ul>\n",
                    escape(&label)
                )
            }
            LineItem::Detail { text } => format!("<li>{}</li>\n", escape(&text)),
            LineItem::SectionEnd { label, amount } => format!(
                "</ul><em>{}:</em> {}</p></div>\n",
                escape(&label),
                escape(&amount.to_string())
            ),
            LineItem::Text { text } => format!("<p>{}</p>\n", escape(&text)),
        };
        self.out.push_str(&rendered);
    }
}

impl Renderer for HtmlRenderer {
    fn finish(self: Box<Self>) -> String {
        self.into_string()
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
