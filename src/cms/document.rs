//! Wire types returned by the content API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One page of a paginated query
///
/// `next_page` is the cursor: the URL of the following page, or `None` on the
/// last one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiPage<T> {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub results_per_page: usize,
    #[serde(default)]
    pub total_results_size: usize,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub next_page: Option<String>,
    #[serde(default)]
    pub prev_page: Option<String>,
    pub results: Vec<T>,
}

fn first_page() -> u32 {
    1
}

/// A content document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type", default)]
    pub doc_type: String,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub last_publication_date: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Document {
    /// The document uid, required for anything that gets a URL
    pub fn require_uid(&self) -> Result<&str> {
        self.uid
            .as_deref()
            .filter(|uid| !uid.is_empty())
            .ok_or_else(|| Error::shape(format!("document {} has no uid", self.id)))
    }

    pub fn first_published(&self) -> Result<Option<DateTime<Utc>>> {
        self.first_publication_date
            .as_deref()
            .map(parse_api_date)
            .transpose()
    }

    pub fn last_published(&self) -> Result<Option<DateTime<Utc>>> {
        self.last_publication_date
            .as_deref()
            .map(parse_api_date)
            .transpose()
    }
}

/// API root, listing the repository refs
#[derive(Debug, Clone, Deserialize)]
pub struct ApiRoot {
    #[serde(default)]
    pub refs: Vec<ApiRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiRef {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "isMasterRef", default)]
    pub is_master: bool,
}

impl ApiRoot {
    pub fn master_ref(&self) -> Option<&str> {
        self.refs
            .iter()
            .find(|r| r.is_master)
            .map(|r| r.reference.as_str())
    }
}

/// Parse a publication timestamp
///
/// The API emits `2021-03-25T19:25:28+0000`; RFC 3339 is accepted as well.
pub fn parse_api_date(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z"))
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| Error::shape(format!("invalid date {:?}: {}", s, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_api_date() {
        let expected = Utc.with_ymd_and_hms(2021, 3, 25, 19, 25, 28).unwrap();
        assert_eq!(parse_api_date("2021-03-25T19:25:28+0000").unwrap(), expected);
        assert_eq!(parse_api_date("2021-03-25T19:25:28Z").unwrap(), expected);
        assert_eq!(
            parse_api_date("2021-03-25T16:25:28-0300").unwrap(),
            expected
        );
        assert!(parse_api_date("25/03/2021").is_err());
    }

    #[test]
    fn test_page_wire_contract() {
        let json = r#"{
            "page": 2,
            "next_page": null,
            "results": [
                {
                    "uid": "como-utilizar-hooks",
                    "first_publication_date": "2021-03-15T19:25:28+0000",
                    "data": {"title": "Como utilizar Hooks", "subtitle": "Pensando em sincronização", "author": "Joseph Oliveira"}
                }
            ]
        }"#;
        let page: ApiPage<Document> = serde_json::from_str(json).unwrap();
        assert_eq!(page.page, 2);
        assert!(page.next_page.is_none());
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].require_uid().unwrap(), "como-utilizar-hooks");
        assert_eq!(page.results[0].data["author"], "Joseph Oliveira");
    }

    #[test]
    fn test_page_defaults() {
        let page: ApiPage<Document> = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert_eq!(page.page, 1);
        assert!(page.next_page.is_none());
    }

    #[test]
    fn test_missing_uid() {
        let doc: Document = serde_json::from_str(r#"{"id": "YF1", "uid": ""}"#).unwrap();
        assert!(doc.require_uid().is_err());
    }

    #[test]
    fn test_master_ref() {
        let root: ApiRoot = serde_json::from_str(
            r#"{"refs": [
                {"id": "preview", "ref": "P1", "label": "Preview"},
                {"id": "master", "ref": "M1", "label": "Master", "isMasterRef": true}
            ]}"#,
        )
        .unwrap();
        assert_eq!(root.master_ref(), Some("M1"));
    }
}
