//! Content store - loads JSON collections and Markdown bodies from a source

use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{Article, Category, FooterContent, SiteConfig, TeamMember};
use crate::error::ContentError;

/// Per-request timeout for the HTTP source
const HTTP_TIMEOUT_SECONDS: u64 = 30;

/// Directory (under the source root) holding per-article folders
pub const DATA_DIR: &str = "data";

/// Directory (under the source root) holding team avatars
pub const AVATAR_DIR: &str = "avatars";

/// The structured resources a source provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    SiteConfig,
    Footer,
    Categories,
    TeamMembers,
    Articles,
}

impl ContentKind {
    /// Path of the resource relative to the source root
    pub fn path(self) -> &'static str {
        match self {
            ContentKind::SiteConfig => "content/site.json",
            ContentKind::Footer => "content/footer.json",
            ContentKind::Categories => "content/categories.json",
            ContentKind::TeamMembers => "content/team.json",
            ContentKind::Articles => "content/articles.json",
        }
    }

    /// Articles are always read fresh
    pub fn cacheable(self) -> bool {
        !matches!(self, ContentKind::Articles)
    }
}

/// Where content is read from
#[derive(Debug, Clone)]
pub enum ContentSource {
    /// A directory laid out as `content/`, `data/`, `avatars/`
    Filesystem(PathBuf),
    /// A base URL serving the same layout
    Http {
        base_url: String,
        client: reqwest::Client,
    },
}

impl ContentSource {
    /// Filesystem source rooted at `root`
    pub fn filesystem<P: AsRef<Path>>(root: P) -> Self {
        ContentSource::Filesystem(root.as_ref().to_path_buf())
    }

    /// HTTP source rooted at `base_url`
    pub fn http(base_url: &str) -> Result<Self, ContentError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECONDS))
            .build()
            .map_err(|source| ContentError::Http {
                resource: base_url.to_string(),
                source,
            })?;
        Ok(ContentSource::Http {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Human-readable description for logs
    pub fn describe(&self) -> String {
        match self {
            ContentSource::Filesystem(root) => format!("{}", root.display()),
            ContentSource::Http { base_url, .. } => base_url.clone(),
        }
    }

    /// Fetch the raw text of a resource
    async fn fetch_text(&self, resource: &str) -> Result<String, ContentError> {
        match self {
            ContentSource::Filesystem(root) => {
                let path = root.join(resource);
                match tokio::fs::read_to_string(&path).await {
                    Ok(text) => Ok(text),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        Err(ContentError::NotFound(resource.to_string()))
                    }
                    Err(source) => Err(ContentError::Io {
                        resource: resource.to_string(),
                        source,
                    }),
                }
            }
            ContentSource::Http { base_url, client } => {
                let url = format!("{}/{}", base_url, resource);
                let http_err = |source: reqwest::Error| ContentError::Http {
                    resource: resource.to_string(),
                    source,
                };

                let resp = client.get(&url).send().await.map_err(http_err)?;
                let status = resp.status();
                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(ContentError::NotFound(resource.to_string()));
                }
                if !status.is_success() {
                    return Err(ContentError::Status {
                        resource: resource.to_string(),
                        status: status.as_u16(),
                    });
                }
                resp.text().await.map_err(http_err)
            }
        }
    }
}

/// Typed access to the content of one source
///
/// Collections other than articles are cached for the lifetime of the store
/// when caching is enabled; the cache only ever holds raw text, so every load
/// still hands out freshly deserialized records.
#[derive(Debug)]
pub struct ContentStore {
    source: ContentSource,
    cache: Option<Mutex<HashMap<ContentKind, Arc<str>>>>,
}

impl ContentStore {
    /// Create a store without collection caching
    pub fn new(source: ContentSource) -> Self {
        Self {
            source,
            cache: None,
        }
    }

    /// Create a store that caches non-article collections
    pub fn with_cache(source: ContentSource) -> Self {
        Self {
            source,
            cache: Some(Mutex::new(HashMap::new())),
        }
    }

    pub fn source(&self) -> &ContentSource {
        &self.source
    }

    /// Drop cached collections so the next load reads the source again
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            lock(cache).clear();
            tracing::debug!("Content cache cleared");
        }
    }

    /// Load and deserialize one structured resource
    pub async fn load<T: DeserializeOwned>(&self, kind: ContentKind) -> Result<T, ContentError> {
        let text = self.fetch(kind).await?;
        serde_json::from_str(&text).map_err(|source| ContentError::Parse {
            resource: kind.path().to_string(),
            source,
        })
    }

    pub async fn site_config(&self) -> Result<SiteConfig, ContentError> {
        self.load(ContentKind::SiteConfig).await
    }

    pub async fn footer(&self) -> Result<FooterContent, ContentError> {
        self.load(ContentKind::Footer).await
    }

    /// Footer content, falling back to the default copy when unavailable
    pub async fn footer_or_default(&self) -> FooterContent {
        match self.footer().await {
            Ok(footer) => footer,
            Err(e) => {
                tracing::warn!("Failed to load footer, using defaults: {}", e);
                FooterContent::default()
            }
        }
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ContentError> {
        self.load(ContentKind::Categories).await
    }

    pub async fn team_members(&self) -> Result<Vec<TeamMember>, ContentError> {
        self.load(ContentKind::TeamMembers).await
    }

    pub async fn articles(&self) -> Result<Vec<Article>, ContentError> {
        self.load(ContentKind::Articles).await
    }

    /// Load the Markdown body stored at `data/<directory>/index.md`
    pub async fn load_body(&self, directory: &str) -> Result<String, ContentError> {
        let resource = body_path(directory)?;
        self.source.fetch_text(&resource).await
    }

    /// Load every collection concurrently
    pub async fn snapshot(&self) -> Result<ContentSnapshot, ContentError> {
        let (site, categories, team, articles, footer) = tokio::try_join!(
            self.site_config(),
            self.categories(),
            self.team_members(),
            self.articles(),
            async { Ok::<_, ContentError>(self.footer_or_default().await) },
        )?;

        let snapshot = ContentSnapshot {
            site,
            footer,
            categories,
            team,
            articles,
        };
        snapshot.report_integrity();
        Ok(snapshot)
    }

    async fn fetch(&self, kind: ContentKind) -> Result<Arc<str>, ContentError> {
        let cache = self.cache.as_ref().filter(|_| kind.cacheable());

        if let Some(cache) = cache {
            if let Some(hit) = lock(cache).get(&kind) {
                tracing::debug!("Content cache hit: {}", kind.path());
                return Ok(hit.clone());
            }
        }

        let text: Arc<str> = self.source.fetch_text(kind.path()).await?.into();

        if let Some(cache) = cache {
            lock(cache).insert(kind, text.clone());
        }
        Ok(text)
    }
}

fn lock<'a>(
    cache: &'a Mutex<HashMap<ContentKind, Arc<str>>>,
) -> std::sync::MutexGuard<'a, HashMap<ContentKind, Arc<str>>> {
    // The map holds plain text; a poisoned guard is still consistent.
    cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Resource path of an article body, rejecting keys that escape `data/`
fn body_path(directory: &str) -> Result<String, ContentError> {
    let directory = directory.trim_end_matches('/');
    let escapes = directory.is_empty()
        || directory.starts_with('/')
        || directory.contains('\\')
        || directory.split('/').any(|seg| seg == ".." || seg.is_empty());
    if escapes {
        return Err(ContentError::NotFound(format!(
            "{}/{}/index.md",
            DATA_DIR, directory
        )));
    }
    Ok(format!("{}/{}/index.md", DATA_DIR, directory))
}

/// Every collection of a source, loaded together
#[derive(Debug, Clone)]
pub struct ContentSnapshot {
    pub site: SiteConfig,
    pub footer: FooterContent,
    pub categories: Vec<Category>,
    pub team: Vec<TeamMember>,
    pub articles: Vec<Article>,
}

impl ContentSnapshot {
    /// Log duplicate ids; lookups still resolve to the first match
    pub fn report_integrity(&self) {
        for id in super::duplicate_ids(self.categories.iter().map(|c| c.category_id)) {
            tracing::warn!("Duplicate category_id {} in categories.json", id);
        }
        for id in super::duplicate_ids(self.team.iter().map(|m| m.team_id)) {
            tracing::warn!("Duplicate team_id {} in team.json", id);
        }
        for id in super::duplicate_ids(self.articles.iter().map(|a| a.article_id.as_str())) {
            tracing::warn!("Duplicate article_id {} in articles.json", id);
        }
    }
}
