//! Search, category filter and sort over an in-memory article list

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::Article;

/// Article ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Newest first
    #[default]
    DateDesc,
    DateAsc,
    TitleAsc,
    TitleDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::DateDesc,
        SortKey::DateAsc,
        SortKey::TitleAsc,
        SortKey::TitleDesc,
    ];

    /// Wire value used in query strings and the CLI
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::DateDesc => "date-desc",
            SortKey::DateAsc => "date-asc",
            SortKey::TitleAsc => "title-asc",
            SortKey::TitleDesc => "title-desc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::DateDesc => "Newest First",
            SortKey::DateAsc => "Oldest First",
            SortKey::TitleAsc => "Title (A-Z)",
            SortKey::TitleDesc => "Title (Z-A)",
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "Unknown sort: {}. Available: date-desc, date-asc, title-asc, title-desc",
                    s
                )
            })
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category restriction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Id(u32),
}

impl CategoryFilter {
    fn accepts(self, article: &Article) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Id(id) => article.category_id == id,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(CategoryFilter::All);
        }
        s.parse::<u32>()
            .map(CategoryFilter::Id)
            .map_err(|_| format!("Unknown category: {}. Use \"all\" or a category id", s))
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Id(id) => write!(f, "{}", id),
        }
    }
}

/// The three listing parameters together
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleQuery {
    pub search: String,
    pub category: CategoryFilter,
    pub sort: SortKey,
}

impl ArticleQuery {
    /// Build from raw query-string values; unrecognized values fall back to defaults
    pub fn from_params(params: &QueryParams) -> Self {
        let category = params
            .category
            .as_deref()
            .map(|raw| {
                raw.parse().unwrap_or_else(|e| {
                    tracing::debug!("{}", e);
                    CategoryFilter::All
                })
            })
            .unwrap_or_default();
        let sort = params
            .sort
            .as_deref()
            .map(|raw| {
                raw.parse().unwrap_or_else(|e| {
                    tracing::debug!("{}", e);
                    SortKey::default()
                })
            })
            .unwrap_or_default();

        Self {
            search: params.q.clone().unwrap_or_default(),
            category,
            sort,
        }
    }

    pub fn apply<'a>(&self, articles: &'a [Article]) -> Vec<&'a Article> {
        query(articles, &self.search, self.category, self.sort)
    }

    /// Whether any narrowing is in effect
    pub fn is_filtered(&self) -> bool {
        !self.search.is_empty() || self.category != CategoryFilter::All
    }
}

/// Raw `?q=&category=&sort=` values of the articles page
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
}

/// Filter and order articles
///
/// Returns references into `articles` in display order. The input is never
/// modified; equal sort keys keep their input order.
pub fn query<'a>(
    articles: &'a [Article],
    search: &str,
    category: CategoryFilter,
    sort: SortKey,
) -> Vec<&'a Article> {
    let needle = search.to_lowercase();

    let filtered = articles
        .iter()
        .filter(|a| matches_search(a, &needle))
        .filter(|a| category.accepts(a));

    match sort {
        SortKey::DateDesc | SortKey::DateAsc => {
            let mut keyed: Vec<(Option<DateTime<Utc>>, &Article)> =
                filtered.map(|a| (a.created_at(), a)).collect();
            if sort == SortKey::DateDesc {
                keyed.sort_by(|a, b| b.0.cmp(&a.0));
            } else {
                keyed.sort_by(|a, b| a.0.cmp(&b.0));
            }
            keyed.into_iter().map(|(_, a)| a).collect()
        }
        SortKey::TitleAsc | SortKey::TitleDesc => {
            let mut sorted: Vec<&Article> = filtered.collect();
            if sort == SortKey::TitleAsc {
                sorted.sort_by(|a, b| locale_cmp(&a.article_title, &b.article_title));
            } else {
                sorted.sort_by(|a, b| locale_cmp(&b.article_title, &a.article_title));
            }
            sorted
        }
    }
}

/// The newest `limit` articles
pub fn latest(articles: &[Article], limit: usize) -> Vec<&Article> {
    let mut newest = query(articles, "", CategoryFilter::All, SortKey::DateDesc);
    newest.truncate(limit);
    newest
}

/// Position of every article under the date and title orderings
///
/// Ranks are dense: articles that compare equal share a rank. Ordering by
/// `(rank, input index)`, or `(-rank, input index)` for the descending sorts,
/// reproduces [`query`] exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortRanks {
    pub date: usize,
    pub title: usize,
}

/// [`SortRanks`] for each article, indexed like the input
pub fn sort_ranks(articles: &[Article]) -> Vec<SortRanks> {
    let dates: Vec<Option<DateTime<Utc>>> = articles.iter().map(Article::created_at).collect();
    let date = dense_ranks(articles.len(), |a, b| dates[a].cmp(&dates[b]));
    let title = dense_ranks(articles.len(), |a, b| {
        locale_cmp(&articles[a].article_title, &articles[b].article_title)
    });

    date.into_iter()
        .zip(title)
        .map(|(date, title)| SortRanks { date, title })
        .collect()
}

fn dense_ranks(len: usize, cmp: impl Fn(usize, usize) -> Ordering) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.sort_by(|&a, &b| cmp(a, b));

    let mut ranks = vec![0; len];
    let mut rank = 0;
    for (pos, &index) in order.iter().enumerate() {
        if pos > 0 && cmp(order[pos - 1], index) != Ordering::Equal {
            rank += 1;
        }
        ranks[index] = rank;
    }
    ranks
}

/// Lowercased text that search terms are matched against, one field per line
pub fn search_text(article: &Article) -> String {
    std::iter::once(article.article_title.as_str())
        .chain(std::iter::once(article.article_description.as_str()))
        .chain(article.article_keywords.iter().map(String::as_str))
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Case-insensitive substring match on title, description or any keyword
fn matches_search(article: &Article, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    article.article_title.to_lowercase().contains(needle)
        || article.article_description.to_lowercase().contains(needle)
        || article
            .article_keywords
            .iter()
            .any(|k| k.to_lowercase().contains(needle))
}

/// Dictionary-style title comparison
///
/// Letters compare case-insensitively first; among strings equal up to case,
/// lowercase sorts before uppercase.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let primary = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));

    primary.then_with(|| {
        a.chars()
            .zip(b.chars())
            .find(|(x, y)| x != y)
            .map(|(x, y)| match (x.is_lowercase(), y.is_lowercase()) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => x.cmp(&y),
            })
            .unwrap_or_else(|| a.len().cmp(&b.len()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article(id: &str, title: &str, created: &str, category: u32, keywords: &[&str]) -> Article {
        Article {
            article_id: id.to_string(),
            article_title: title.to_string(),
            author_team_id: 1,
            category_id: category,
            article_created_at: created.to_string(),
            article_keywords: keywords.iter().map(|k| k.to_string()).collect(),
            article_description: format!("About {}", title),
            article_directory: id.to_string(),
            featured_image: String::new(),
        }
    }

    fn fixture() -> Vec<Article> {
        vec![
            article("a", "Kafka Streams", "2025-03-01T10:00:00Z", 1, &["kafka", "jvm"]),
            article("b", "gRPC in Go", "2025-01-15T10:00:00Z", 2, &["go", "rpc"]),
            article("c", "Airflow DAGs", "2025-02-10T10:00:00Z", 1, &["Python"]),
            article("d", "Zero-downtime deploys", "2024-12-01T10:00:00Z", 3, &[]),
        ]
    }

    fn ids(articles: &[&Article]) -> Vec<String> {
        articles.iter().map(|a| a.article_id.clone()).collect()
    }

    #[test]
    fn test_default_is_newest_first() {
        let articles = fixture();
        let result = ArticleQuery::default().apply(&articles);
        assert_eq!(ids(&result), ["a", "c", "b", "d"]);
    }

    #[test]
    fn test_search_is_case_insensitive_subsequence() {
        let articles = fixture();
        for needle in ["KAFKA", "go", "python", "about", "", "nothing-matches"] {
            let result = query(&articles, needle, CategoryFilter::All, SortKey::DateAsc);
            let lowered = needle.to_lowercase();
            for a in &articles {
                let hit = a.article_title.to_lowercase().contains(&lowered)
                    || a.article_description.to_lowercase().contains(&lowered)
                    || a
                        .article_keywords
                        .iter()
                        .any(|k| k.to_lowercase().contains(&lowered));
                assert_eq!(
                    result.iter().any(|r| r.article_id == a.article_id),
                    hit,
                    "needle {:?} article {}",
                    needle,
                    a.article_id
                );
            }
        }
    }

    #[test]
    fn test_search_matches_keywords() {
        let articles = fixture();
        let result = query(&articles, "RPC", CategoryFilter::All, SortKey::DateDesc);
        assert_eq!(ids(&result), ["b"]);
    }

    #[test]
    fn test_category_filter() {
        let articles = fixture();
        let result = query(&articles, "", CategoryFilter::Id(1), SortKey::DateDesc);
        assert_eq!(ids(&result), ["a", "c"]);
        assert!(query(&articles, "", CategoryFilter::Id(42), SortKey::DateDesc).is_empty());
    }

    #[test]
    fn test_date_orders_are_reversed() {
        let articles = fixture();
        let desc = ids(&query(&articles, "", CategoryFilter::All, SortKey::DateDesc));
        let mut asc = ids(&query(&articles, "", CategoryFilter::All, SortKey::DateAsc));
        asc.reverse();
        assert_eq!(desc, asc);
    }

    #[test]
    fn test_title_sorts() {
        let articles = fixture();
        let asc = query(&articles, "", CategoryFilter::All, SortKey::TitleAsc);
        assert_eq!(ids(&asc), ["c", "b", "a", "d"]);
        let desc = query(&articles, "", CategoryFilter::All, SortKey::TitleDesc);
        assert_eq!(ids(&desc), ["d", "a", "b", "c"]);
    }

    #[test]
    fn test_sort_ranks_reproduce_query() {
        let mut articles = fixture();
        articles.push(article("e", "kafka streams", "2025-03-01T10:00:00Z", 1, &[]));
        articles.push(article("f", "Undated", "someday", 2, &[]));
        let ranks = sort_ranks(&articles);

        for sort in SortKey::ALL {
            let mut order: Vec<usize> = (0..articles.len()).collect();
            order.sort_by_key(|&i| {
                let rank = match sort {
                    SortKey::DateDesc | SortKey::DateAsc => ranks[i].date as i64,
                    SortKey::TitleAsc | SortKey::TitleDesc => ranks[i].title as i64,
                };
                match sort {
                    SortKey::DateDesc | SortKey::TitleDesc => (-rank, i),
                    SortKey::DateAsc | SortKey::TitleAsc => (rank, i),
                }
            });
            let by_rank: Vec<String> = order
                .iter()
                .map(|&i| articles[i].article_id.clone())
                .collect();
            let expected = ids(&query(&articles, "", CategoryFilter::All, sort));
            assert_eq!(by_rank, expected, "sort {}", sort);
        }

        // same timestamp shares a rank, undated is oldest
        assert_eq!(ranks[0].date, ranks[4].date);
        assert_eq!(ranks[5].date, 0);
    }

    #[test]
    fn test_search_text() {
        let articles = fixture();
        assert_eq!(
            search_text(&articles[1]),
            "grpc in go\nabout grpc in go\ngo\nrpc"
        );
    }

    #[test]
    fn test_ties_keep_input_order() {
        let articles = vec![
            article("x", "Same", "2025-01-01", 1, &[]),
            article("y", "Same", "2025-01-01", 1, &[]),
            article("z", "Same", "2025-01-01", 1, &[]),
        ];
        for sort in SortKey::ALL {
            let result = query(&articles, "", CategoryFilter::All, sort);
            assert_eq!(ids(&result), ["x", "y", "z"], "sort {}", sort);
        }
    }

    #[test]
    fn test_idempotent_and_pure() {
        let articles = fixture();
        let before = articles.clone();
        let q = ArticleQuery {
            search: "a".to_string(),
            category: CategoryFilter::Id(1),
            sort: SortKey::TitleDesc,
        };
        let first = ids(&q.apply(&articles));
        let second = ids(&q.apply(&articles));
        assert_eq!(first, second);
        assert_eq!(articles, before);
    }

    #[test]
    fn test_unparseable_dates_sort_oldest() {
        let articles = vec![
            article("bad", "Bad", "sometime", 1, &[]),
            article("good", "Good", "2025-01-01", 1, &[]),
        ];
        let desc = query(&articles, "", CategoryFilter::All, SortKey::DateDesc);
        assert_eq!(ids(&desc), ["good", "bad"]);
    }

    #[test]
    fn test_latest() {
        let articles = fixture();
        assert_eq!(ids(&latest(&articles, 2)), ["a", "c"]);
        assert_eq!(latest(&articles, 10).len(), 4);
    }

    #[test]
    fn test_parse_params() {
        assert_eq!("all".parse::<CategoryFilter>(), Ok(CategoryFilter::All));
        assert_eq!("3".parse::<CategoryFilter>(), Ok(CategoryFilter::Id(3)));
        assert!("three".parse::<CategoryFilter>().is_err());
        assert_eq!("title-asc".parse::<SortKey>(), Ok(SortKey::TitleAsc));
        assert!("newest".parse::<SortKey>().is_err());

        let q = ArticleQuery::from_params(&QueryParams {
            q: Some("Go".to_string()),
            category: Some("bogus".to_string()),
            sort: Some("date-asc".to_string()),
        });
        assert_eq!(q.search, "Go");
        assert_eq!(q.category, CategoryFilter::All);
        assert_eq!(q.sort, SortKey::DateAsc);
        assert!(q.is_filtered());
    }

    #[test]
    fn test_locale_cmp() {
        assert_eq!(locale_cmp("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_cmp("apple", "Apple"), Ordering::Less);
        assert_eq!(locale_cmp("Zebra", "alpha"), Ordering::Greater);
        assert_eq!(locale_cmp("same", "same"), Ordering::Equal);
        assert_eq!(locale_cmp("abc", "abcd"), Ordering::Less);
    }
}
