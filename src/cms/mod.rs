//! Content repository client
//!
//! The content API is an external collaborator: this module only shapes the
//! requests and decodes the responses. It does not cache, retry or rate-limit.

mod client;
mod document;
#[cfg(test)]
pub mod fake;
mod predicate;

pub use client::PrismicClient;
pub use document::{parse_api_date, ApiPage, ApiRef, ApiRoot, Document};
pub use predicate::{query_string, Predicate};

use async_trait::async_trait;

use crate::error::Result;

/// Options for a document query
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    pub page_size: Option<usize>,
    pub page: Option<u32>,
    pub orderings: Option<String>,
    pub fetch: Vec<String>,
}

impl QueryOptions {
    /// Query-string parameters, excluding `ref` and `q`
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(size) = self.page_size {
            params.push(("pageSize", size.to_string()));
        }
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(orderings) = &self.orderings {
            params.push(("orderings", orderings.clone()));
        }
        if !self.fetch.is_empty() {
            params.push(("fetch", self.fetch.join(",")));
        }
        params
    }
}

/// Access to the content repository
#[async_trait]
pub trait ContentClient: Send + Sync {
    /// Query documents matching every predicate
    async fn query_posts(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<ApiPage<Document>>;

    /// Follow a pagination cursor
    async fn fetch_page(&self, cursor: &str) -> Result<ApiPage<Document>>;

    /// Look a document up by its uid
    async fn get_by_uid(&self, doc_type: &str, uid: &str) -> Result<Option<Document>> {
        let options = QueryOptions {
            page_size: Some(1),
            ..Default::default()
        };
        let page = self
            .query_posts(&[Predicate::uid(doc_type, uid)], &options)
            .await?;
        Ok(page.results.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_options_params() {
        let options = QueryOptions {
            page_size: Some(1),
            page: None,
            orderings: Some("[document.last_publication_date desc]".to_string()),
            fetch: vec!["posts.title".to_string(), "posts.author".to_string()],
        };
        assert_eq!(
            options.to_params(),
            vec![
                ("pageSize", "1".to_string()),
                (
                    "orderings",
                    "[document.last_publication_date desc]".to_string()
                ),
                ("fetch", "posts.title,posts.author".to_string()),
            ]
        );
        assert!(QueryOptions::default().to_params().is_empty());
    }
}
