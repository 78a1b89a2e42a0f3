//! Built-in templates using the Tera template engine
//!
//! Templates and static assets are embedded in the binary. Autoescaping is on
//! for every template; the sanitized rich-text markup is the only value marked
//! `safe`.

use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::error::Result;
use crate::helpers::html_escape;
use crate::i18n::Labels;
use crate::views::{ListedPost, PostListing, PostView};

/// Static files written next to the generated pages
pub const ASSETS: &[(&str, &str)] = &[
    ("css/style.css", include_str!("theme/style.css")),
    ("images/logo.svg", include_str!("theme/logo.svg")),
];

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
    site: SiteData,
    labels: Labels,
}

/// Site-wide values available to every template
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub lang: String,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new(site: SiteData, labels: Labels) -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("index.html", include_str!("theme/index.html")),
            ("post.html", include_str!("theme/post.html")),
            ("loading.html", include_str!("theme/loading.html")),
            ("404.html", include_str!("theme/404.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("theme/partials/header.html"),
            ),
            (
                "partials/post_meta.html",
                include_str!("theme/partials/post_meta.html"),
            ),
        ])?;

        // Same escaping as the rich-text renderer; keeps '/' readable in URLs
        tera.set_escape_fn(html_escape);
        tera.register_filter("minutes", minutes_filter);

        Ok(Self { tera, site, labels })
    }

    /// Listing page with the posts accumulated so far
    ///
    /// `next_url` is the "load more" target, shown only while the listing has
    /// a cursor.
    pub fn render_listing(&self, listing: &PostListing, next_url: Option<&str>) -> Result<String> {
        let mut context = self.base_context();
        let posts: &[ListedPost] = listing.posts();
        context.insert("posts", posts);
        context.insert("next_url", &next_url.filter(|_| listing.has_more()));
        context.insert("error", &listing.last_error().is_some());
        context.insert("error_message", &self.labels.load_error);
        self.render("index.html", &context)
    }

    pub fn render_post(&self, post: &PostView) -> Result<String> {
        let mut context = self.base_context();
        context.insert("post", post);
        self.render("post.html", &context)
    }

    /// Placeholder shown while a page is generated on demand
    pub fn render_loading(&self, refresh_secs: u32) -> Result<String> {
        let mut context = self.base_context();
        context.insert("refresh_secs", &refresh_secs);
        self.render("loading.html", &context)
    }

    pub fn render_not_found(&self) -> Result<String> {
        self.render("404.html", &self.base_context())
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context.insert("generator_version", env!("CARGO_PKG_VERSION"));
        context.insert("load_more_label", &self.labels.load_more);
        context.insert("loading_label", &self.labels.loading);
        context.insert("not_found_label", &self.labels.not_found);
        context.insert("back_label", &self.labels.back);
        context
    }

    fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: `4 | minutes` -> `4 min`
fn minutes_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let minutes = tera::try_get_value!("minutes", "value", u64, value);
    Ok(tera::Value::String(format!("{} min", minutes)))
}
