//! Content module - post models, rich text and reading time

mod post;
pub mod reading;
mod richtext;

pub use post::{summaries, Banner, ContentSection, PostDetail, PostSummary};
pub use richtext::{BlockKind, Embed, RichText, RichTextBlock, Span, SpanData, SpanKind};
