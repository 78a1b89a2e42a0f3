//! HTTP implementation of the content client

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::{query_string, ApiPage, ApiRoot, ContentClient, Document, Predicate, QueryOptions};
use crate::config::CmsConfig;
use crate::error::{Error, Result};

/// Client for a Prismic-style REST content API
pub struct PrismicClient {
    client: Client,
    endpoint: String,
    access_token: Option<String>,
}

impl PrismicClient {
    /// Create a client for an API endpoint such as
    /// `https://repo.cdn.prismic.io/api/v2`
    pub fn new(endpoint: &str, access_token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            access_token,
        }
    }

    pub fn from_config(config: &CmsConfig) -> Result<Self> {
        if config.endpoint.is_empty() {
            return Err(Error::Config("cms.endpoint is empty".to_string()));
        }
        Ok(Self::new(&config.endpoint, config.access_token.clone()))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Resolve the ref of the published content
    async fn master_ref(&self) -> Result<String> {
        let root: ApiRoot = self.get_json(&self.endpoint, &[]).await?;
        root.master_ref()
            .map(str::to_string)
            .ok_or_else(|| Error::shape("API root has no master ref"))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let mut request = self.client.get(url).query(params);
        if let Some(token) = &self.access_token {
            if !url.contains("access_token=") {
                request = request.query(&[("access_token", token)]);
            }
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| Error::shape(format!("{}: {}", url, e)))
    }
}

#[async_trait]
impl ContentClient for PrismicClient {
    async fn query_posts(
        &self,
        predicates: &[Predicate],
        options: &QueryOptions,
    ) -> Result<ApiPage<Document>> {
        let reference = self.master_ref().await?;

        let mut params = vec![("ref", reference), ("q", query_string(predicates))];
        params.extend(options.to_params());

        let url = format!("{}/documents/search", self.endpoint);
        tracing::debug!("Querying {} with {:?}", url, predicates);
        self.get_json(&url, &params).await
    }

    async fn fetch_page(&self, cursor: &str) -> Result<ApiPage<Document>> {
        tracing::debug!("Fetching page {}", cursor);
        self.get_json(cursor, &[]).await
    }
}
