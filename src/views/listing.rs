//! Listing view: an append-only list of post summaries with a cursor

use serde::Serialize;

use crate::cms::{ApiPage, ContentClient, Document};
use crate::content::{summaries, PostSummary};
use crate::error::Result;
use crate::helpers::{date_xml, format_publication_date, post_url, DateStyle};

/// A post summary shaped for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListedPost {
    pub uid: String,
    pub url: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    /// Display date, empty when unpublished
    pub date: String,
    /// Machine-readable date for `<time datetime>`
    pub datetime: Option<String>,
}

impl ListedPost {
    pub fn new(summary: PostSummary, style: &DateStyle) -> Self {
        Self {
            url: post_url(&summary.uid),
            date: format_publication_date(summary.first_publication_date.as_ref(), style),
            datetime: summary.first_publication_date.as_ref().map(date_xml),
            uid: summary.uid,
            title: summary.title,
            subtitle: summary.subtitle,
            author: summary.author,
        }
    }
}

/// Result of a `load_more` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and this many posts were appended
    Loaded(usize),
    /// There is no cursor; nothing was fetched
    Exhausted,
}

/// State of one listing view
///
/// Posts are only ever appended, in the order the API delivers them; the
/// listing never reorders or deduplicates. Once the cursor is gone no further
/// request is issued.
#[derive(Debug, Clone)]
pub struct PostListing {
    posts: Vec<ListedPost>,
    next_page: Option<String>,
    page: u32,
    last_error: Option<String>,
    date_style: DateStyle,
}

impl PostListing {
    /// Build the listing from the first page of a query
    pub fn from_page(page: ApiPage<Document>, date_style: DateStyle) -> Result<Self> {
        let posts = summaries(page.results)?
            .into_iter()
            .map(|s| ListedPost::new(s, &date_style))
            .collect();

        Ok(Self {
            posts,
            next_page: page.next_page,
            page: page.page,
            last_error: None,
            date_style,
        })
    }

    pub fn posts(&self) -> &[ListedPost] {
        &self.posts
    }

    /// Cursor of the next page
    pub fn next_page(&self) -> Option<&str> {
        self.next_page.as_deref()
    }

    /// Page number of the last page loaded, as reported by the API
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn has_more(&self) -> bool {
        self.next_page.is_some()
    }

    /// Message of the last failed load, cleared by the next successful one
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Fetch the next page and append its posts
    ///
    /// Without a cursor this is a no-op. On failure the listing is left
    /// exactly as it was apart from `last_error`.
    pub async fn load_more(&mut self, client: &dyn ContentClient) -> Result<LoadOutcome> {
        let Some(cursor) = self.next_page.clone() else {
            tracing::debug!("No next page, skipping load");
            return Ok(LoadOutcome::Exhausted);
        };

        match self.fetch(client, &cursor).await {
            Ok((page, posts)) => {
                let count = posts.len();
                self.posts.extend(posts);
                self.next_page = page.next_page;
                self.page = page.page;
                self.last_error = None;
                tracing::debug!("Loaded page {} ({} posts)", self.page, count);
                Ok(LoadOutcome::Loaded(count))
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", cursor, e);
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    async fn fetch(
        &self,
        client: &dyn ContentClient,
        cursor: &str,
    ) -> Result<(ApiPage<Document>, Vec<ListedPost>)> {
        let mut page = client.fetch_page(cursor).await?;
        let posts = summaries(std::mem::take(&mut page.results))?
            .into_iter()
            .map(|s| ListedPost::new(s, &self.date_style))
            .collect();
        Ok((page, posts))
    }
}
