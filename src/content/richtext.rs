//! Structured rich text and its conversion to HTML
//!
//! Conversion escapes every text fragment and attribute, drops unsafe URLs and
//! never embeds third-party markup (oEmbed HTML becomes a plain link). The
//! result is the only HTML the templates emit unescaped.

use serde::{Deserialize, Deserializer, Serialize};

use crate::helpers::{html_escape, image_tag, link_to, post_url};

/// An ordered sequence of rich-text blocks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText(pub Vec<RichTextBlock>);

/// One block of rich text: a paragraph, heading, list item, image...
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextBlock {
    #[serde(rename = "type")]
    pub kind: BlockKind,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub spans: Vec<Span>,
    /// Image source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Image alternative text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oembed: Option<Embed>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockKind {
    Heading1,
    Heading2,
    Heading3,
    Heading4,
    Heading5,
    Heading6,
    Paragraph,
    Preformatted,
    ListItem,
    OListItem,
    Image,
    Embed,
    #[serde(other)]
    Unknown,
}

/// Inline formatting over `[start, end)` of the block text
///
/// Offsets count UTF-16 code units, as the content API emits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: SpanKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SpanData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpanKind {
    Strong,
    Em,
    Hyperlink,
    Label,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpanData {
    #[serde(default)]
    pub url: Option<String>,
    /// Target document uid for links to other documents
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    /// Label name
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    #[serde(default)]
    pub embed_url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
}

/// Empty fields arrive as `null`; read them as the type's default
pub(super) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl RichText {
    pub fn blocks(&self) -> &[RichTextBlock] {
        &self.0
    }

    /// Plain text of all blocks, separated by spaces
    pub fn as_text(&self) -> String {
        self.0
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Render to sanitized HTML, grouping consecutive list items
    pub fn as_html(&self) -> String {
        let mut out = String::new();
        let mut open_list: Option<&'static str> = None;

        for block in &self.0 {
            let list = match block.kind {
                BlockKind::ListItem => Some("ul"),
                BlockKind::OListItem => Some("ol"),
                _ => None,
            };

            if list != open_list {
                if let Some(tag) = open_list {
                    out.push_str(&format!("</{}>", tag));
                }
                if let Some(tag) = list {
                    out.push_str(&format!("<{}>", tag));
                }
                open_list = list;
            }

            out.push_str(&block.as_html());
        }

        if let Some(tag) = open_list {
            out.push_str(&format!("</{}>", tag));
        }

        out
    }
}

impl RichTextBlock {
    pub fn paragraph(text: &str) -> Self {
        Self::new(BlockKind::Paragraph, text)
    }

    pub fn new(kind: BlockKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
            spans: Vec::new(),
            url: None,
            alt: None,
            oembed: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.spans.push(span);
        self
    }

    /// Render a single block; list items are not wrapped in their list
    pub fn as_html(&self) -> String {
        let inner = || render_spans(&self.text, &self.spans);

        match self.kind {
            BlockKind::Heading1 => format!("<h1>{}</h1>", inner()),
            BlockKind::Heading2 => format!("<h2>{}</h2>", inner()),
            BlockKind::Heading3 => format!("<h3>{}</h3>", inner()),
            BlockKind::Heading4 => format!("<h4>{}</h4>", inner()),
            BlockKind::Heading5 => format!("<h5>{}</h5>", inner()),
            BlockKind::Heading6 => format!("<h6>{}</h6>", inner()),
            BlockKind::Paragraph => format!("<p>{}</p>", inner()),
            BlockKind::Preformatted => format!("<pre>{}</pre>", inner()),
            BlockKind::ListItem | BlockKind::OListItem => format!("<li>{}</li>", inner()),
            BlockKind::Image => {
                let img = image_tag(self.url.as_deref().unwrap_or(""), self.alt.as_deref());
                if img.is_empty() {
                    String::new()
                } else {
                    format!(r#"<p class="block-img">{}</p>"#, img)
                }
            }
            BlockKind::Embed => self.embed_html(),
            BlockKind::Unknown => {
                tracing::debug!("Skipping unknown rich-text block");
                String::new()
            }
        }
    }

    fn embed_html(&self) -> String {
        let Some(embed) = &self.oembed else {
            return String::new();
        };
        let Some(url) = embed.embed_url.as_deref() else {
            return String::new();
        };

        let text = embed
            .title
            .as_deref()
            .or(embed.provider_name.as_deref())
            .unwrap_or(url);
        let link = link_to(url, &html_escape(text), true);
        format!(r#"<div class="block-embed">{}</div>"#, link)
    }
}

/// Maps UTF-16 offsets to byte offsets of a string
struct Utf16Index(Vec<usize>);

impl Utf16Index {
    fn new(text: &str) -> Self {
        let mut offsets = Vec::with_capacity(text.len() + 1);
        for (byte, c) in text.char_indices() {
            for _ in 0..c.len_utf16() {
                offsets.push(byte);
            }
        }
        offsets.push(text.len());
        Self(offsets)
    }

    fn len(&self) -> usize {
        self.0.len() - 1
    }

    fn slice<'a>(&self, text: &'a str, start: usize, end: usize) -> &'a str {
        &text[self.0[start]..self.0[end]]
    }
}

fn render_spans(text: &str, spans: &[Span]) -> String {
    let index = Utf16Index::new(text);
    let mut spans: Vec<&Span> = spans
        .iter()
        .filter(|s| s.start < s.end && s.end <= index.len())
        .collect();
    // Outer spans before the spans they contain
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut out = String::new();
    render_range(text, &index, 0, index.len(), &spans, &mut out);
    out
}

fn render_range(
    text: &str,
    index: &Utf16Index,
    start: usize,
    end: usize,
    spans: &[&Span],
    out: &mut String,
) {
    let mut cursor = start;
    let mut i = 0;

    while i < spans.len() {
        let span = spans[i];
        // Crosses a sibling that is already rendered
        if span.start < cursor {
            i += 1;
            continue;
        }

        let span_end = span.end.min(end);
        out.push_str(&escape_text(index.slice(text, cursor, span.start)));

        let mut j = i + 1;
        while j < spans.len() && spans[j].start < span_end {
            j += 1;
        }

        let mut inner = String::new();
        render_range(text, index, span.start, span_end, &spans[i + 1..j], &mut inner);
        out.push_str(&wrap_span(span, &inner));

        cursor = span_end;
        i = j;
    }

    out.push_str(&escape_text(index.slice(text, cursor, end)));
}

fn wrap_span(span: &Span, inner: &str) -> String {
    match span.kind {
        SpanKind::Strong => format!("<strong>{}</strong>", inner),
        SpanKind::Em => format!("<em>{}</em>", inner),
        SpanKind::Hyperlink => {
            let data = span.data.clone().unwrap_or_default();
            let href = match (data.url, data.uid) {
                (Some(url), _) => url,
                (None, Some(uid)) => post_url(&uid),
                (None, None) => return inner.to_string(),
            };
            let new_tab = data.target.as_deref() == Some("_blank");
            link_to(&href, inner, new_tab)
        }
        SpanKind::Label => match span.data.as_ref().and_then(|d| d.label.as_deref()) {
            Some(label) => format!(r#"<span class="{}">{}</span>"#, html_escape(label), inner),
            None => inner.to_string(),
        },
        SpanKind::Unknown => inner.to_string(),
    }
}

fn escape_text(s: &str) -> String {
    html_escape(s).replace('\n', "<br />")
}
