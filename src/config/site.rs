//! Blog configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable overriding `base_path`
pub const BASE_PATH_ENV: &str = "BLOG_BASE_PATH";

/// Environment variable selecting an HTTP content source
pub const SITE_URL_ENV: &str = "BLOG_SITE_URL";

/// Main blog configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogConfig {
    // URL
    /// Path segment the site is deployed under (e.g. `/miswag-tech-blog`)
    pub base_path: String,

    // Directory
    /// Directory holding `content/`, `data/` and `avatars/`
    pub source_dir: String,
    /// Fetch content from this base URL instead of `source_dir`
    pub source_url: Option<String>,
    pub output_dir: String,

    // Content
    pub cache_collections: bool,
    pub latest_articles: usize,
    pub keyword_preview: usize,

    // Branding
    pub logo: String,
    pub favicon: String,

    // Writing
    #[serde(default)]
    pub highlight: HighlightConfig,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            base_path: "/miswag-tech-blog".to_string(),

            source_dir: "public".to_string(),
            source_url: None,
            output_dir: "out".to_string(),

            cache_collections: true,
            latest_articles: 3,
            keyword_preview: 2,

            logo: "/logo.png".to_string(),
            favicon: "/favicon.png".to_string(),

            highlight: HighlightConfig::default(),
        }
    }
}

impl BlogConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let config: BlogConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        Ok(config)
    }

    /// Apply `BLOG_BASE_PATH` / `BLOG_SITE_URL` overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(BASE_PATH_ENV).ok(),
            std::env::var(SITE_URL_ENV).ok(),
        );
    }

    fn apply_overrides(&mut self, base_path: Option<String>, site_url: Option<String>) {
        if let Some(base_path) = base_path {
            tracing::debug!("Base path overridden from environment: {}", base_path);
            self.base_path = base_path;
        }
        if let Some(url) = site_url.filter(|u| !u.trim().is_empty()) {
            tracing::debug!("Content source overridden from environment: {}", url);
            self.source_url = Some(url);
        }
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// syntect theme name
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BlogConfig::default();
        assert_eq!(config.base_path, "/miswag-tech-blog");
        assert_eq!(config.source_dir, "public");
        assert_eq!(config.latest_articles, 3);
        assert_eq!(config.keyword_preview, 2);
        assert!(config.source_url.is_none());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
base_path: /blog
source_dir: site
latest_articles: 6
highlight:
  theme: InspiredGitHub
"#;
        let config: BlogConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.base_path, "/blog");
        assert_eq!(config.source_dir, "site");
        assert_eq!(config.latest_articles, 6);
        assert_eq!(config.highlight.theme, "InspiredGitHub");
        assert!(!config.highlight.line_number);
        assert_eq!(config.output_dir, "out");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = BlogConfig::default();
        config.apply_overrides(
            Some("/docs".to_string()),
            Some("https://cdn.example.com".to_string()),
        );
        assert_eq!(config.base_path, "/docs");
        assert_eq!(
            config.source_url.as_deref(),
            Some("https://cdn.example.com")
        );
    }

    #[test]
    fn test_blank_site_url_is_ignored() {
        let mut config = BlogConfig::default();
        config.apply_overrides(None, Some("  ".to_string()));
        assert!(config.source_url.is_none());
        assert_eq!(config.base_path, "/miswag-tech-blog");
    }
}
