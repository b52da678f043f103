//! Article → author / category lookups with display fallbacks

use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;

use super::{Article, Category, TeamMember};

/// Display name used when an article's author is missing
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Display name used when an article's category is missing
pub const UNCATEGORIZED: &str = "Uncategorized";

/// An article's resolved author
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Author<'a> {
    Member(&'a TeamMember),
    Unknown,
}

impl<'a> Author<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            Author::Member(member) => &member.team_member_name,
            Author::Unknown => UNKNOWN_AUTHOR,
        }
    }

    pub fn member(&self) -> Option<&'a TeamMember> {
        match self {
            Author::Member(member) => Some(member),
            Author::Unknown => None,
        }
    }
}

/// An article's resolved category
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CategoryRef<'a> {
    Known(&'a Category),
    Uncategorized,
}

impl<'a> CategoryRef<'a> {
    pub fn name(&self) -> &'a str {
        match self {
            CategoryRef::Known(category) => &category.category_name,
            CategoryRef::Uncategorized => UNCATEGORIZED,
        }
    }

    pub fn category(&self) -> Option<&'a Category> {
        match self {
            CategoryRef::Known(category) => Some(category),
            CategoryRef::Uncategorized => None,
        }
    }
}

/// Find the article's author; the first member with a matching id wins
pub fn resolve_author<'a>(article: &Article, members: &'a [TeamMember]) -> Author<'a> {
    members
        .iter()
        .find(|m| m.team_id == article.author_team_id)
        .map(Author::Member)
        .unwrap_or(Author::Unknown)
}

/// Find the article's category; the first category with a matching id wins
pub fn resolve_category<'a>(article: &Article, categories: &'a [Category]) -> CategoryRef<'a> {
    categories
        .iter()
        .find(|c| c.category_id == article.category_id)
        .map(CategoryRef::Known)
        .unwrap_or(CategoryRef::Uncategorized)
}

/// Look up an article by id
pub fn find_article<'a>(articles: &'a [Article], id: &str) -> Option<&'a Article> {
    articles.iter().find(|a| a.article_id == id)
}

/// Number of articles filed under a category
pub fn articles_in_category(articles: &[Article], category_id: u32) -> usize {
    articles
        .iter()
        .filter(|a| a.category_id == category_id)
        .count()
}

/// Number of articles written by a team member
pub fn articles_by_author(articles: &[Article], team_id: u32) -> usize {
    articles
        .iter()
        .filter(|a| a.author_team_id == team_id)
        .count()
}

/// Ids that occur more than once, in order of their second occurrence
pub fn duplicate_ids<T, I>(ids: I) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    T: Eq + Hash + Display + Clone,
{
    let mut seen = HashSet::new();
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();
    for id in ids {
        if !seen.insert(id.clone()) && reported.insert(id.clone()) {
            duplicates.push(id);
        }
    }
    duplicates
}
