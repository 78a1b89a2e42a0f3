//! Post models and their shaping from API documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::richtext::null_as_default;
use super::RichText;
use crate::cms::Document;
use crate::error::{Error, Result};

/// A post as shown in the listing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostSummary {
    pub uid: String,
    pub first_publication_date: Option<DateTime<Utc>>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// A full post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostDetail {
    pub uid: String,
    pub first_publication_date: Option<DateTime<Utc>>,
    pub last_publication_date: Option<DateTime<Utc>>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner: Banner,
    pub content: Vec<ContentSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Banner {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

/// A titled group of rich-text blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub heading: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: RichText,
}

impl TryFrom<Document> for PostSummary {
    type Error = Error;

    fn try_from(doc: Document) -> Result<Self> {
        Ok(Self {
            uid: doc.require_uid()?.to_string(),
            first_publication_date: doc.first_published()?,
            title: required_text(&doc.data, "title", &doc.id)?,
            subtitle: text_field(&doc.data, "subtitle").unwrap_or_default(),
            author: text_field(&doc.data, "author").unwrap_or_default(),
        })
    }
}

impl TryFrom<Document> for PostDetail {
    type Error = Error;

    fn try_from(doc: Document) -> Result<Self> {
        let banner = match doc.data.get("banner") {
            Some(Value::Null) | None => Banner::default(),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| Error::shape(format!("{}: banner: {}", doc.id, e)))?,
        };

        let content = match doc.data.get("content") {
            Some(Value::Null) | None => Vec::new(),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| Error::shape(format!("{}: content: {}", doc.id, e)))?,
        };

        Ok(Self {
            uid: doc.require_uid()?.to_string(),
            first_publication_date: doc.first_published()?,
            last_publication_date: doc.last_published()?,
            title: required_text(&doc.data, "title", &doc.id)?,
            subtitle: text_field(&doc.data, "subtitle").unwrap_or_default(),
            author: text_field(&doc.data, "author").unwrap_or_default(),
            banner,
            content,
        })
    }
}

/// Shape a whole page of documents, failing on the first malformed one
pub fn summaries(docs: Vec<Document>) -> Result<Vec<PostSummary>> {
    docs.into_iter().map(PostSummary::try_from).collect()
}

/// Read a text field that is either a plain string or a rich-text array
fn text_field(data: &Value, key: &str) -> Option<String> {
    match data.get(key)? {
        Value::String(s) => Some(s.clone()),
        value @ Value::Array(_) => serde_json::from_value::<RichText>(value.clone())
            .ok()
            .map(|rt| rt.as_text()),
        _ => None,
    }
}

fn required_text(data: &Value, key: &str, id: &str) -> Result<String> {
    text_field(data, key).ok_or_else(|| Error::shape(format!("{}: missing data.{}", id, key)))
}
