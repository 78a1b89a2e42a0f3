//! spacetraveling: a static blog front-end rendered from a headless CMS
//!
//! Posts are fetched from a Prismic-style content API and rendered with
//! embedded Tera templates into a listing page (with "load more" pagination)
//! and one detail page per post.

pub mod cms;
pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod i18n;
pub mod server;
pub mod templates;
pub mod views;

pub use error::{Error, Result};

use std::path::{Path, PathBuf};

/// The site: configuration plus the directories it works in
#[derive(Debug, Clone)]
pub struct SpaceTraveling {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Public (output) directory
    pub public_dir: PathBuf,
}

impl SpaceTraveling {
    /// Load the site in a directory, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> anyhow::Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let mut config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };
        config.apply_env();

        Ok(Self::with_config(base_dir, config))
    }

    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let public_dir = base_dir.join(&config.public_dir);

        Self {
            config,
            base_dir,
            public_dir,
        }
    }

    /// HTTP client for the configured content repository
    pub fn client(&self) -> Result<cms::PrismicClient> {
        cms::PrismicClient::from_config(&self.config.cms)
    }
}
