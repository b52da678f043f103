//! miswag-blog: a static technical blog renderer
//!
//! Content lives in JSON collections and per-article Markdown bodies, read
//! from a directory or over HTTP. Pages are rendered with embedded Tera
//! templates, written out as a static site or served by a development
//! server with live reload.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod markdown;
pub mod pages;
pub mod server;
pub mod templates;
pub mod watch;

use anyhow::Result;
use std::path::{Path, PathBuf};

use content::{ContentSource, ContentStore};
use helpers::AssetResolver;
use markdown::MarkdownRenderer;

/// Name of the blog configuration file
pub const CONFIG_FILE: &str = "_config.yml";

/// The main blog application
#[derive(Debug, Clone)]
pub struct Blog {
    /// Blog configuration
    pub config: config::BlogConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Source directory (`content/`, `data/`, `avatars/`)
    pub source_dir: PathBuf,
    /// Output directory for generated files
    pub output_dir: PathBuf,
}

impl Blog {
    /// Create a new Blog instance from a directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join(CONFIG_FILE);

        let mut config = if config_path.exists() {
            config::BlogConfig::load(&config_path)?
        } else {
            config::BlogConfig::default()
        };
        config.apply_env();

        Ok(Self::with_config(base_dir, config))
    }

    /// Create a Blog from an already loaded configuration
    pub fn with_config(base_dir: PathBuf, config: config::BlogConfig) -> Self {
        let source_dir = base_dir.join(&config.source_dir);
        let output_dir = base_dir.join(&config.output_dir);

        Self {
            config,
            base_dir,
            source_dir,
            output_dir,
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE)
    }

    /// Whether content is fetched over HTTP rather than read from `source_dir`
    pub fn is_remote(&self) -> bool {
        self.config.source_url.is_some()
    }

    /// Resolver for the configured base path
    pub fn assets(&self) -> AssetResolver {
        AssetResolver::new(&self.config.base_path)
    }

    /// Content store over the configured source
    pub fn store(&self) -> Result<ContentStore> {
        let source = match &self.config.source_url {
            Some(url) => ContentSource::http(url)?,
            None => ContentSource::filesystem(&self.source_dir),
        };
        tracing::debug!("Content source: {}", source.describe());

        Ok(if self.config.cache_collections {
            ContentStore::with_cache(source)
        } else {
            ContentStore::new(source)
        })
    }

    /// Markdown renderer with the configured highlighting options
    pub fn markdown(&self) -> MarkdownRenderer {
        MarkdownRenderer::with_options(
            self.assets(),
            &self.config.highlight.theme,
            self.config.highlight.line_number,
        )
    }

    /// Initialize a new blog
    pub fn init(&self) -> Result<()> {
        commands::init::run(self)
    }

    /// Generate the static site
    pub async fn generate(&self) -> Result<()> {
        commands::generate::run(self).await
    }

    /// Clean the output directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
