//! Generator module - writes the static site using the built-in templates

use anyhow::{Context as _, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::content::ContentStore;
use crate::pages::SiteRenderer;
use crate::Blog;

/// Static site generator
pub struct Generator {
    blog: Blog,
    store: ContentStore,
    pages: SiteRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            blog: blog.clone(),
            store: blog.store()?,
            pages: SiteRenderer::new(blog)?,
        })
    }

    /// Generate the entire site, returning the number of pages written
    pub async fn generate(&self) -> Result<usize> {
        let output_dir = &self.blog.output_dir;
        fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {:?}", output_dir))?;

        // Copy images, avatars and content files alongside the pages
        if self.blog.is_remote() {
            tracing::info!("Remote content source, skipping asset copy");
        } else {
            let copied = self.copy_source_assets()?;
            tracing::info!("Copied {} asset files", copied);
        }

        let snapshot = self.store.snapshot().await.with_context(|| {
            format!(
                "Failed to load content from {}",
                self.store.source().describe()
            )
        })?;

        tracing::info!(
            "Loaded {} articles, {} categories and {} team members",
            snapshot.articles.len(),
            snapshot.categories.len(),
            snapshot.team.len()
        );

        let mut written = 0;

        self.write_page("index.html", &self.pages.home(&snapshot)?)?;
        self.write_page("articles/index.html", &self.pages.static_articles(&snapshot)?)?;
        self.write_page("team/index.html", &self.pages.team(&snapshot)?)?;
        self.write_page("about/index.html", &self.pages.about(&snapshot)?)?;
        self.write_page("404.html", &self.pages.not_found(Some(&snapshot))?)?;
        written += 5;

        let mut seen = HashSet::new();
        for article in &snapshot.articles {
            // Lookups resolve to the first article with an id
            if !seen.insert(article.article_id.as_str()) {
                continue;
            }
            let Some(segment) = output_segment(&article.article_id) else {
                tracing::warn!(
                    "Skipping article with unusable id {:?}",
                    article.article_id
                );
                continue;
            };

            let body = self
                .store
                .load_body(&article.article_directory)
                .await
                .with_context(|| {
                    format!("Failed to load body of article {}", article.article_id)
                })?;
            let html = self.pages.article(&snapshot, article, &body)?;
            self.write_page(&format!("articles/{}/index.html", segment), &html)?;
            written += 1;
        }

        Ok(written)
    }

    fn write_page(&self, relative: &str, html: &str) -> Result<()> {
        let output_path = self.blog.output_dir.join(relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
        }
        fs::write(&output_path, html)
            .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }

    /// Copy the source tree into the output directory
    fn copy_source_assets(&self) -> Result<usize> {
        let source_dir = &self.blog.source_dir;
        let output_dir = &self.blog.output_dir;
        if !source_dir.exists() {
            tracing::warn!("Source directory {:?} does not exist", source_dir);
            return Ok(0);
        }

        let mut copied = 0;
        for entry in WalkDir::new(source_dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| !is_inside(e.path(), output_dir))
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(source_dir)?;
            let dest = output_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest).with_context(|| format!("Failed to copy {:?}", path))?;
            copied += 1;
        }

        Ok(copied)
    }
}

/// Directory name for an article id, if it is a single safe path segment
fn output_segment(article_id: &str) -> Option<&str> {
    let unsafe_id = article_id.is_empty()
        || article_id == "."
        || article_id == ".."
        || article_id.contains(['/', '\\']);
    (!unsafe_id).then_some(article_id)
}

fn is_inside(path: &Path, dir: &Path) -> bool {
    match (path.canonicalize(), dir.canonicalize()) {
        (Ok(path), Ok(dir)) => path.starts_with(dir),
        _ => false,
    }
}
