use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;

pub const PARAGRAPH_SEPARATOR: &str = "\n\n";
const EXCERPT_LENGTH: usize = 160;

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub main_image: String,
    #[serde(default)]
    pub body: Vec<Block>,
    /// Plain-text body written by older versions of the site.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Block {
    #[serde(rename = "_type", default = "Block::default_type")]
    pub kind: String,
    #[serde(default = "Block::default_style")]
    pub style: String,
    #[serde(default)]
    pub children: Vec<Span>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Span {
    #[serde(rename = "_type", default = "Span::default_type")]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

impl Block {
    fn default_type() -> String {
        "block".to_string()
    }

    fn default_style() -> String {
        "normal".to_string()
    }

    /// A normal paragraph holding a single span.
    pub fn paragraph(text: &str) -> Block {
        Block {
            kind: Block::default_type(),
            style: Block::default_style(),
            children: vec![Span {
                kind: Span::default_type(),
                text: text.to_string(),
            }],
        }
    }

    pub fn text(&self) -> String {
        self.children.iter().map(|c| c.text.as_str()).collect()
    }
}

impl Span {
    fn default_type() -> String {
        "span".to_string()
    }
}

/// Splits plain text into one paragraph block per blank-line separated piece.
pub fn text_to_body(text: &str) -> Vec<Block> {
    text.split(PARAGRAPH_SEPARATOR).map(Block::paragraph).collect()
}

pub fn body_to_text(body: &[Block]) -> String {
    body.iter()
        .map(Block::text)
        .collect::<Vec<_>>()
        .join(PARAGRAPH_SEPARATOR)
}

fn escape_html(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}

impl Article {
    /// Body as editable text, falling back to the legacy `content` field.
    pub fn body_text(&self) -> String {
        match (&self.content, self.body.is_empty()) {
            (Some(content), true) => content.clone(),
            _ => body_to_text(&self.body),
        }
    }

    pub fn excerpt(&self) -> String {
        let text = self.body_text();
        if text.chars().count() <= EXCERPT_LENGTH {
            return text;
        }
        let cut: String = text.chars().take(EXCERPT_LENGTH).collect();
        format!("{}...", cut.trim())
    }

    pub fn body_html(&self) -> String {
        if self.body.is_empty() {
            return match &self.content {
                Some(content) => format!("<p>{}</p>", escape_html(content)),
                None => String::new(),
            };
        }
        self.body
            .iter()
            .map(|block| {
                let text = escape_html(&block.text());
                if block.style == "h2" {
                    format!("<h2>{text}</h2>")
                } else {
                    format!("<p>{text}</p>")
                }
            })
            .collect()
    }

    /// Ordering used when persisting: newest `publishedAt` first.
    pub fn newest_first(a: &Article, b: &Article) -> Ordering {
        b.published_at.cmp(&a.published_at)
    }
}
