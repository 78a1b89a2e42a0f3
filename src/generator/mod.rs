//! Generator module - renders pages with the built-in Tera templates
//!
//! Output layout under the public directory:
//!
//! * `index.html` - first page of the listing
//! * `page/{n}/index.html` - the listing after `n - 1` "load more" steps
//! * `post/{uid}/index.html` - one page per post
//! * `404.html`

use std::fs;
use std::path::PathBuf;

use crate::cms::{ContentClient, Predicate, QueryOptions};
use crate::content::PostDetail;
use crate::error::{Error, Result};
use crate::helpers::{listing_url, DateStyle};
use crate::i18n::Labels;
use crate::templates::{SiteData, TemplateRenderer, ASSETS};
use crate::views::{PostListing, PostView};
use crate::SpaceTraveling;

/// Page size used when enumerating every post
const PATHS_PAGE_SIZE: usize = 100;

/// Counts reported by a full generation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateSummary {
    pub listing_pages: u32,
    pub posts: usize,
    pub skipped: usize,
}

/// Static site generator
pub struct Generator {
    site: SpaceTraveling,
    renderer: TemplateRenderer,
    date_style: DateStyle,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &SpaceTraveling) -> anyhow::Result<Self> {
        let labels = Labels::load(&site.base_dir, &site.config.language)?;
        let renderer = TemplateRenderer::new(
            SiteData {
                title: site.config.title.clone(),
                lang: site
                    .config
                    .language
                    .split('_')
                    .next()
                    .unwrap_or("en")
                    .to_string(),
            },
            labels,
        )?;
        let date_style = DateStyle::from_config(&site.config)?;

        Ok(Self {
            site: site.clone(),
            renderer,
            date_style,
        })
    }

    pub fn site(&self) -> &SpaceTraveling {
        &self.site
    }

    /// Generate the entire site
    pub async fn generate(&self, client: &dyn ContentClient) -> Result<GenerateSummary> {
        fs::create_dir_all(&self.site.public_dir)?;
        self.write_assets()?;

        let mut summary = GenerateSummary {
            listing_pages: self.generate_listing_pages(client).await?,
            ..Default::default()
        };

        for uid in self.post_uids(client).await? {
            match self.render_post(client, &uid).await {
                Ok(html) => {
                    self.write_page(&post_page_path(&uid)?, &html)?;
                    summary.posts += 1;
                }
                Err(e) if e.is_not_found() || matches!(e, Error::Shape(_)) => {
                    tracing::warn!("Skipping post {}: {}", uid, e);
                    summary.skipped += 1;
                }
                Err(e) => return Err(e),
            }
        }

        self.write_page("404.html", &self.renderer.render_not_found()?)?;

        tracing::info!(
            "Generated {} listing pages and {} posts",
            summary.listing_pages,
            summary.posts
        );
        Ok(summary)
    }

    /// Write every listing page, driving one listing forward page by page
    async fn generate_listing_pages(&self, client: &dyn ContentClient) -> Result<u32> {
        let mut listing = self.first_page(client).await?;
        let mut pages = 1;

        loop {
            let next = listing_url(pages + 1);
            let html = self.renderer.render_listing(&listing, Some(&next))?;
            self.write_page(&listing_page_path(pages), &html)?;

            if !listing.has_more() {
                break;
            }
            listing.load_more(client).await?;
            pages += 1;
        }

        Ok(pages)
    }

    fn listing_options(&self) -> QueryOptions {
        let cms = &self.site.config.cms;
        QueryOptions {
            page_size: Some(cms.page_size),
            page: None,
            orderings: Some(cms.orderings.clone()).filter(|o| !o.is_empty()),
            fetch: cms.fetch.clone(),
        }
    }

    /// Query the first page of the listing
    pub async fn first_page(&self, client: &dyn ContentClient) -> Result<PostListing> {
        let predicates = [Predicate::document_type(&self.site.config.cms.document_type)];
        let page = client
            .query_posts(&predicates, &self.listing_options())
            .await?;
        PostListing::from_page(page, self.date_style.clone())
    }

    /// Render the listing as it looks after `pages` pages were loaded
    ///
    /// Returns `None` when the listing has fewer pages. A failed load renders
    /// what was accumulated so far together with the error notice.
    pub async fn render_listing_page(
        &self,
        client: &dyn ContentClient,
        pages: u32,
    ) -> Result<Option<String>> {
        if pages == 0 {
            return Ok(None);
        }

        let mut listing = self.first_page(client).await?;
        let mut loaded = 1;
        while loaded < pages {
            if !listing.has_more() {
                return Ok(None);
            }
            if listing.load_more(client).await.is_err() {
                break;
            }
            loaded += 1;
        }

        let next = listing_url(loaded + 1);
        self.renderer
            .render_listing(&listing, Some(&next))
            .map(Some)
    }

    /// Fetch and render one post
    pub async fn render_post(&self, client: &dyn ContentClient, uid: &str) -> Result<String> {
        check_uid(uid)?;
        let doc_type = &self.site.config.cms.document_type;
        let doc = client
            .get_by_uid(doc_type, uid)
            .await?
            .ok_or_else(|| Error::NotFound(uid.to_string()))?;

        let post = PostDetail::try_from(doc)?;
        let view = PostView::new(&post, &self.date_style, self.site.config.words_per_minute);
        self.renderer.render_post(&view)
    }

    pub fn render_loading(&self, refresh_secs: u32) -> Result<String> {
        self.renderer.render_loading(refresh_secs)
    }

    pub fn render_not_found(&self) -> Result<String> {
        self.renderer.render_not_found()
    }

    /// Uid of every post, following cursors to the last page
    async fn post_uids(&self, client: &dyn ContentClient) -> Result<Vec<String>> {
        let predicates = [Predicate::document_type(&self.site.config.cms.document_type)];
        let options = QueryOptions {
            page_size: Some(PATHS_PAGE_SIZE),
            ..Default::default()
        };

        let mut page = client.query_posts(&predicates, &options).await?;
        let mut uids = Vec::new();
        loop {
            for doc in &page.results {
                match doc.require_uid() {
                    Ok(uid) => uids.push(uid.to_string()),
                    Err(e) => tracing::warn!("{}", e),
                }
            }
            match page.next_page.take() {
                Some(cursor) => page = client.fetch_page(&cursor).await?,
                None => break,
            }
        }

        Ok(uids)
    }

    /// Write the embedded stylesheet and images
    pub fn write_assets(&self) -> Result<()> {
        for (path, content) in ASSETS {
            self.write_page(path, content)?;
        }
        Ok(())
    }

    /// Write a file relative to the public directory
    pub fn write_page(&self, rel_path: &str, content: &str) -> Result<PathBuf> {
        let path = self.site.public_dir.join(rel_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        tracing::debug!("Generated: {:?}", path);
        Ok(path)
    }
}

/// Output path of a listing page
pub fn listing_page_path(pages: u32) -> String {
    if pages <= 1 {
        "index.html".to_string()
    } else {
        format!("page/{}/index.html", pages)
    }
}

/// Output path of a post page
pub fn post_page_path(uid: &str) -> Result<String> {
    check_uid(uid)?;
    Ok(format!("post/{}/index.html", uid))
}

/// Reject uids that cannot be used as a single path segment
fn check_uid(uid: &str) -> Result<()> {
    if uid.is_empty() || uid == "." || uid == ".." || uid.contains(['/', '\\']) {
        return Err(Error::NotFound(uid.to_string()));
    }
    Ok(())
}
