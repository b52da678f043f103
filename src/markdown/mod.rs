//! Markdown rendering pipeline
//!
//! Article bodies are parsed into a [`Node`] tree, then each node is
//! rendered by its presentation rule. Fenced code blocks with a language
//! tag go through syntect; images are resolved against the article's data
//! directory and the deployment base path.

mod highlight;
mod render;
mod tree;

pub use highlight::{Highlighter, DEFAULT_THEME};
pub use render::{resolve_image_src, PLACEHOLDER_IMAGE};
pub use tree::{fence_language, parse, Node};

use crate::helpers::AssetResolver;
use render::{render_nodes, RenderContext};

/// Turns article Markdown into HTML
pub struct MarkdownRenderer {
    highlighter: Highlighter,
    assets: AssetResolver,
}

impl MarkdownRenderer {
    pub fn new(assets: AssetResolver) -> Self {
        Self {
            highlighter: Highlighter::default(),
            assets,
        }
    }

    pub fn with_options(assets: AssetResolver, theme: &str, line_numbers: bool) -> Self {
        Self {
            highlighter: Highlighter::new(theme, line_numbers),
            assets,
        }
    }

    pub fn assets(&self) -> &AssetResolver {
        &self.assets
    }

    /// Render a Markdown document
    ///
    /// `article_dir` is the article's directory under `data/`; relative
    /// image sources are placed inside it.
    pub fn render(&self, markdown: &str, article_dir: Option<&str>) -> String {
        let nodes = parse(markdown);
        self.render_tree(&nodes, article_dir)
    }

    pub fn render_tree(&self, nodes: &[Node], article_dir: Option<&str>) -> String {
        let ctx = RenderContext {
            assets: &self.assets,
            highlighter: &self.highlighter,
            article_dir,
        };
        let mut out = String::with_capacity(nodes.len() * 64);
        render_nodes(nodes, &ctx, &mut out);
        out
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(AssetResolver::default())
    }
}
