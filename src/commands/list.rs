//! List site content

use anyhow::{anyhow, Result};

use crate::content::{
    articles_by_author, articles_in_category, query, resolve_author, resolve_category,
    CategoryFilter, ContentSnapshot, SortKey,
};
use crate::helpers::{pluralize, short_date};
use crate::Blog;

/// Listing options for `list articles`
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
}

/// List site content by type
pub async fn run(blog: &Blog, content_type: &str, options: &ListOptions) -> Result<()> {
    let store = blog.store()?;
    let snapshot = store.snapshot().await?;
    print!("{}", render(&snapshot, content_type, options)?);
    Ok(())
}

/// Format a listing; invalid filter values are errors here
pub fn render(snapshot: &ContentSnapshot, content_type: &str, options: &ListOptions) -> Result<String> {
    let mut out = String::new();

    match content_type {
        "article" | "articles" => {
            let category: CategoryFilter = match options.category.as_deref() {
                Some(raw) => raw.parse().map_err(|e: String| anyhow!(e))?,
                None => CategoryFilter::All,
            };
            let sort: SortKey = match options.sort.as_deref() {
                Some(raw) => raw.parse().map_err(|e: String| anyhow!(e))?,
                None => SortKey::default(),
            };
            let search = options.search.as_deref().unwrap_or("");

            let results = query(&snapshot.articles, search, category, sort);
            out.push_str(&format!(
                "Articles ({} of {}):\n",
                results.len(),
                snapshot.articles.len()
            ));
            for article in results {
                out.push_str(&format!(
                    "  {} - {} [{}] by {} in {}\n",
                    short_date(&article.article_created_at),
                    article.article_title,
                    article.article_id,
                    resolve_author(article, &snapshot.team).name(),
                    resolve_category(article, &snapshot.categories).name()
                ));
            }
        }
        "category" | "categories" => {
            out.push_str(&format!("Categories ({}):\n", snapshot.categories.len()));
            for category in &snapshot.categories {
                let count = articles_in_category(&snapshot.articles, category.category_id);
                out.push_str(&format!(
                    "  {} {} ({})\n",
                    category.category_id,
                    category.category_name,
                    pluralize(count, "article", "articles")
                ));
            }
        }
        "team" | "member" | "members" => {
            out.push_str(&format!("Team ({}):\n", snapshot.team.len()));
            for member in &snapshot.team {
                let count = articles_by_author(&snapshot.articles, member.team_id);
                out.push_str(&format!(
                    "  {} - {} ({})\n",
                    member.team_member_name,
                    member.team_member_position,
                    pluralize(count, "article", "articles")
                ));
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: articles, categories, team",
                content_type
            );
        }
    }

    Ok(out)
}
