//! Built-in site templates using the Tera template engine
//!
//! Every page template is embedded in the binary. Templates only format
//! data: links and asset paths arrive already resolved against the base
//! path, and Markdown bodies arrive as rendered HTML.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::helpers::{date_xml, full_date, html_escape, pluralize, short_date};

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all site templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Content strings are untrusted; escape everything not marked `safe`
        tera.autoescape_on(vec![".html"]);
        // Leave `/` alone so resolved paths stay readable
        tera.set_escape_fn(html_escape);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("macros.html", include_str!("site/macros.html")),
            ("home.html", include_str!("site/home.html")),
            ("articles.html", include_str!("site/articles.html")),
            ("article.html", include_str!("site/article.html")),
            ("team.html", include_str!("site/team.html")),
            ("about.html", include_str!("site/about.html")),
            ("not_found.html", include_str!("site/not_found.html")),
            ("error.html", include_str!("site/error.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("site/partials/header.html"),
            ),
            (
                "partials/footer.html",
                include_str!("site/partials/footer.html"),
            ),
        ])?;

        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("date_format", date_format_filter);
        tera.register_filter("pluralize", pluralize_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 160,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Tera filter: format an article timestamp
///
/// `short` gives `Jan 5, 2025`, `long` gives `January 5, 2025` and `xml`
/// gives a machine-readable timestamp for `<time datetime>`.
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "short".to_string(),
    };

    let formatted = match format.as_str() {
        "short" => short_date(&s),
        "long" => full_date(&s),
        "xml" => date_xml(&s),
        other => {
            return Err(tera::Error::msg(format!(
                "Filter `date_format` got unknown format `{}`",
                other
            )))
        }
    };
    Ok(tera::Value::String(formatted))
}

/// Tera filter: `3 | pluralize(singular="article", plural="articles")` -> `3 articles`
fn pluralize_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let count = tera::try_get_value!("pluralize", "value", usize, value);
    let singular = match args.get("singular") {
        Some(val) => tera::try_get_value!("pluralize", "singular", String, val),
        None => String::new(),
    };
    let plural = match args.get("plural") {
        Some(val) => tera::try_get_value!("pluralize", "plural", String, val),
        None => format!("{}s", singular),
    };
    Ok(tera::Value::String(pluralize(count, &singular, &plural)))
}

// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub bio: String,
    pub logo: String,
    pub favicon: String,
    pub nav: NavData,
}

/// Resolved navigation targets
#[derive(Debug, Clone, Serialize)]
pub struct NavData {
    pub home: String,
    pub articles: String,
    pub team: String,
    pub about: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FooterData {
    pub copyright: String,
    pub links: Vec<LinkData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkData {
    pub name: String,
    pub url: String,
}

/// One entry of an article listing
#[derive(Debug, Clone, Serialize)]
pub struct ArticleCardData {
    pub id: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub created_at: String,
    pub image: Option<String>,
    pub category: String,
    pub author: String,
    pub keywords: Vec<String>,
    /// Set on listings that filter in the browser
    pub filter: Option<CardFilterData>,
}

/// Values a card is searched, filtered and sorted on client-side
#[derive(Debug, Clone, Serialize)]
pub struct CardFilterData {
    /// Position in the source collection, the tie-break of every sort
    pub index: usize,
    pub category_id: u32,
    pub search: String,
    pub date_rank: usize,
    pub title_rank: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryTileData {
    pub id: u32,
    pub name: String,
    pub url: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberData {
    pub id: u32,
    pub name: String,
    pub position: String,
    pub avatar: String,
    pub bio: Option<String>,
    pub linkedin: Option<String>,
    pub article_count: usize,
}

/// A full article page
#[derive(Debug, Clone, Serialize)]
pub struct ArticleDetailData {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_at: String,
    /// Present only when the category reference resolves
    pub category: Option<String>,
    /// Present only when the author reference resolves
    pub author: Option<AuthorData>,
    pub image: Option<String>,
    pub body: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorData {
    pub name: String,
    pub position: String,
    pub avatar: String,
    pub team_url: String,
}

/// State of the article listing controls
#[derive(Debug, Clone, Serialize)]
pub struct FilterData {
    pub action: String,
    pub search: String,
    pub categories: Vec<OptionData>,
    pub sorts: Vec<OptionData>,
    pub total: usize,
    pub shown: usize,
    pub filtered: bool,
    pub clear_url: String,
    /// Static pages carry every article and filter them with a script
    pub client_side: bool,
}

/// An `<option>` of a select control
#[derive(Debug, Clone, Serialize)]
pub struct OptionData {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, tera::Value)]) -> HashMap<String, tera::Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_templates_compile() {
        assert!(TemplateRenderer::new().is_ok());
    }

    #[test]
    fn test_truncate_chars() {
        let value = tera::Value::String("abcdefghij".into());
        let out = truncate_chars_filter(&value, &args(&[("length", 4.into())])).unwrap();
        assert_eq!(out, tera::Value::String("abcd...".into()));

        let out = truncate_chars_filter(&value, &HashMap::new()).unwrap();
        assert_eq!(out, tera::Value::String("abcdefghij".into()));
    }

    #[test]
    fn test_date_format() {
        let value = tera::Value::String("2025-01-05T10:00:00Z".into());
        let short = date_format_filter(&value, &HashMap::new()).unwrap();
        assert_eq!(short, tera::Value::String("Jan 5, 2025".into()));

        let long = date_format_filter(&value, &args(&[("format", "long".into())])).unwrap();
        assert_eq!(long, tera::Value::String("January 5, 2025".into()));

        assert!(date_format_filter(&value, &args(&[("format", "LL".into())])).is_err());
    }

    #[test]
    fn test_pluralize() {
        let a = args(&[("singular", "article".into()), ("plural", "articles".into())]);
        let one = pluralize_filter(&tera::Value::from(1), &a).unwrap();
        let many = pluralize_filter(&tera::Value::from(4), &a).unwrap();
        assert_eq!(one, tera::Value::String("1 article".into()));
        assert_eq!(many, tera::Value::String("4 articles".into()));
    }
}
