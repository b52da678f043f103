//! Content records as they appear in the JSON files
//!
//! Field names are the wire contract shared with every consumer of the
//! `content/*.json` files, so they are kept verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::helpers::parse_timestamp;

/// Site-wide title and bio (`content/site.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    pub title: String,
    pub bio: String,
}

/// Footer copy and social links (`content/footer.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FooterContent {
    pub copyright: String,

    #[serde(rename = "socialLinks", default)]
    pub social_links: Vec<SocialLink>,
}

impl Default for FooterContent {
    fn default() -> Self {
        Self {
            copyright: "© 2025 Miswag. All rights reserved.".to_string(),
            social_links: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    pub name: String,
    pub url: String,
}

/// An article category (`content/categories.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: u32,
    pub category_name: String,
}

/// A team member (`content/team.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub team_id: u32,
    pub team_member_name: String,
    pub team_member_position: String,

    /// Empty strings in the source are treated as absent
    #[serde(default, deserialize_with = "non_empty")]
    pub team_member_linkedin: Option<String>,

    /// Avatar file name under `avatars/`
    pub team_member_avatar: String,

    #[serde(default, deserialize_with = "non_empty")]
    pub team_member_bio: Option<String>,
}

/// An article entry (`content/articles.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub article_id: String,
    pub article_title: String,

    /// References `TeamMember::team_id`; may dangle
    pub author_team_id: u32,

    /// References `Category::category_id`; may dangle
    pub category_id: u32,

    /// ISO-8601 creation timestamp
    pub article_created_at: String,

    #[serde(default)]
    pub article_keywords: Vec<String>,

    pub article_description: String,

    /// Key of the per-article folder under `data/`
    pub article_directory: String,

    /// Image file name inside the article folder
    #[serde(default)]
    pub featured_image: String,
}

impl Article {
    /// Parsed creation time, `None` when the timestamp is malformed
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.article_created_at)
    }

    /// Leading keywords for compact display
    pub fn keyword_preview(&self, limit: usize) -> &[String] {
        let end = limit.min(self.article_keywords.len());
        &self.article_keywords[..end]
    }

    /// Source-relative path of the featured image
    pub fn featured_image_path(&self) -> Option<String> {
        if self.featured_image.trim().is_empty() {
            None
        } else {
            Some(format!(
                "/data/{}/{}",
                self.article_directory.trim_matches('/'),
                self.featured_image.trim_start_matches("./")
            ))
        }
    }
}

fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|v| !v.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article_json() -> &'static str {
        r#"{
            "article_id": "kafka-101",
            "article_title": "Kafka 101",
            "author_team_id": 2,
            "category_id": 1,
            "article_created_at": "2025-02-01T09:00:00Z",
            "article_keywords": ["kafka", "streaming", "data"],
            "article_description": "Getting started",
            "article_directory": "kafka-101",
            "featured_image": "cover.png"
        }"#
    }

    #[test]
    fn test_parse_article() {
        let article: Article = serde_json::from_str(article_json()).unwrap();
        assert_eq!(article.article_id, "kafka-101");
        assert_eq!(article.author_team_id, 2);
        assert!(article.created_at().is_some());
        assert_eq!(
            article.featured_image_path().as_deref(),
            Some("/data/kafka-101/cover.png")
        );
    }

    #[test]
    fn test_keyword_preview_keeps_order() {
        let article: Article = serde_json::from_str(article_json()).unwrap();
        assert_eq!(article.keyword_preview(2), ["kafka", "streaming"]);
        assert_eq!(article.keyword_preview(10).len(), 3);
        assert_eq!(article.article_keywords.len(), 3);
    }

    #[test]
    fn test_team_member_optional_fields() {
        let json = r#"{
            "team_id": 1,
            "team_member_name": "Sara",
            "team_member_position": "Data Engineer",
            "team_member_linkedin": "",
            "team_member_avatar": "sara.png"
        }"#;
        let member: TeamMember = serde_json::from_str(json).unwrap();
        assert!(member.team_member_linkedin.is_none());
        assert!(member.team_member_bio.is_none());
    }

    #[test]
    fn test_footer_wire_names() {
        let json = r#"{
            "copyright": "© 2025 Example",
            "socialLinks": [{"name": "GitHub", "url": "https://github.com"}]
        }"#;
        let footer: FooterContent = serde_json::from_str(json).unwrap();
        assert_eq!(footer.social_links.len(), 1);
        assert_eq!(footer.social_links[0].name, "GitHub");
    }

    #[test]
    fn test_missing_required_field_fails() {
        let json = r#"{"category_id": 1}"#;
        assert!(serde_json::from_str::<Category>(json).is_err());
    }
}
