//! Content module - records, loading, lookups and listing queries

mod join;
mod model;
pub mod query;
pub mod store;

pub use join::{
    articles_by_author, articles_in_category, duplicate_ids, find_article, resolve_author,
    resolve_category, Author, CategoryRef, UNCATEGORIZED, UNKNOWN_AUTHOR,
};
pub use model::{Article, Category, FooterContent, SiteConfig, SocialLink, TeamMember};
pub use query::{
    latest, query, search_text, sort_ranks, ArticleQuery, CategoryFilter, QueryParams, SortKey,
    SortRanks,
};
pub use store::{ContentKind, ContentSnapshot, ContentSource, ContentStore};
