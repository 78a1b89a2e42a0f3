//! In-memory content client for tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{ApiPage, ContentClient, Document, Predicate, QueryOptions};
use crate::error::{Error, Result};

/// Serves a fixed chain of pages linked by `fake://page/N` cursors
pub struct FakeClient {
    pages: Vec<ApiPage<Document>>,
    failing: Mutex<Vec<String>>,
    fetched: Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn paged(pages: Vec<Vec<Document>>) -> Self {
        let total = pages.len() as u32;
        let total_docs = pages.iter().map(Vec::len).sum();
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, results)| {
                let page = i as u32 + 1;
                ApiPage {
                    page,
                    results_per_page: results.len(),
                    total_results_size: total_docs,
                    total_pages: total,
                    next_page: (page < total).then(|| cursor(page + 1)),
                    prev_page: (page > 1).then(|| cursor(page - 1)),
                    results,
                }
            })
            .collect();

        Self {
            pages,
            failing: Mutex::new(Vec::new()),
            fetched: Mutex::new(Vec::new()),
        }
    }

    /// Make every fetch of `cursor` fail until `recover` is called
    pub fn fail(&self, cursor: &str) {
        self.failing.lock().unwrap().push(cursor.to_string());
    }

    pub fn recover(&self) {
        self.failing.lock().unwrap().clear();
    }

    /// Cursors fetched so far, in order
    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    fn all_documents(&self) -> impl Iterator<Item = &Document> {
        self.pages.iter().flat_map(|p| p.results.iter())
    }
}

pub fn cursor(page: u32) -> String {
    format!("fake://page/{}", page)
}

#[async_trait]
impl ContentClient for FakeClient {
    async fn query_posts(
        &self,
        predicates: &[Predicate],
        _options: &QueryOptions,
    ) -> Result<ApiPage<Document>> {
        let uid = predicates
            .iter()
            .find(|p| p.path.ends_with(".uid"))
            .map(|p| p.value.clone());

        match uid {
            Some(uid) => Ok(ApiPage {
                page: 1,
                results_per_page: 1,
                total_results_size: 0,
                total_pages: 1,
                next_page: None,
                prev_page: None,
                results: self
                    .all_documents()
                    .filter(|d| d.uid.as_deref() == Some(uid.as_str()))
                    .cloned()
                    .collect(),
            }),
            None => self
                .pages
                .first()
                .cloned()
                .ok_or_else(|| Error::shape("no pages")),
        }
    }

    async fn fetch_page(&self, cursor: &str) -> Result<ApiPage<Document>> {
        self.fetched.lock().unwrap().push(cursor.to_string());
        if self.failing.lock().unwrap().iter().any(|c| c == cursor) {
            return Err(Error::Status {
                status: 500,
                url: cursor.to_string(),
            });
        }

        self.pages
            .iter()
            .find(|p| p.page.to_string() == cursor.trim_start_matches("fake://page/"))
            .cloned()
            .ok_or_else(|| Error::Status {
                status: 404,
                url: cursor.to_string(),
            })
    }
}

/// A post document with a single-paragraph section
pub fn post_doc(uid: &str, date: &str) -> Document {
    detail_doc(uid, date, vec![("Introduction", "A short body")])
}

pub fn detail_doc(uid: &str, date: &str, sections: Vec<(&str, &str)>) -> Document {
    let content: Vec<Value> = sections
        .into_iter()
        .map(|(heading, text)| {
            json!({
                "heading": heading,
                "body": [{"type": "paragraph", "text": text, "spans": []}]
            })
        })
        .collect();

    serde_json::from_value(json!({
        "id": format!("id-{}", uid),
        "uid": uid,
        "type": "posts",
        "first_publication_date": date,
        "last_publication_date": date,
        "data": {
            "title": format!("Post {}", uid),
            "subtitle": format!("About {}", uid),
            "author": "Joseph Oliveira",
            "banner": {"url": format!("https://images.prismic.io/{}.png", uid)},
            "content": content
        }
    }))
    .unwrap()
}
