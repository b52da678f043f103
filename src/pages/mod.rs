//! Page assembly shared by the generator and the development server
//!
//! Each page joins the loaded collections, resolves every outbound path and
//! hands plain view data to the templates.

use anyhow::Result;
use tera::Context;

use crate::content::{
    articles_by_author, articles_in_category, latest, resolve_author, resolve_category,
    search_text, sort_ranks, Article, ArticleQuery, CategoryFilter, ContentSnapshot,
    FooterContent, SortKey,
};
use crate::content::store::AVATAR_DIR;
use crate::helpers::{encode_segment, AssetResolver};
use crate::markdown::MarkdownRenderer;
use crate::templates::{
    ArticleCardData, ArticleDetailData, AuthorData, CardFilterData, CategoryTileData, FilterData,
    FooterData, LinkData, MemberData, NavData, OptionData, SiteData, TemplateRenderer,
};
use crate::Blog;

/// Title used when the site configuration itself could not be loaded
pub const FALLBACK_TITLE: &str = "Miswag Tech Blog";

/// Renders complete HTML pages from a content snapshot
pub struct SiteRenderer {
    templates: TemplateRenderer,
    markdown: MarkdownRenderer,
    assets: AssetResolver,
    logo: String,
    favicon: String,
    latest_articles: usize,
    keyword_preview: usize,
}

impl SiteRenderer {
    pub fn new(blog: &Blog) -> Result<Self> {
        Ok(Self {
            templates: TemplateRenderer::new()?,
            markdown: blog.markdown(),
            assets: blog.assets(),
            logo: blog.config.logo.clone(),
            favicon: blog.config.favicon.clone(),
            latest_articles: blog.config.latest_articles,
            keyword_preview: blog.config.keyword_preview,
        })
    }

    pub fn assets(&self) -> &AssetResolver {
        &self.assets
    }

    /// Link to an article page
    pub fn article_url(&self, article_id: &str) -> String {
        self.assets
            .resolve(&format!("/articles/{}", encode_segment(article_id)))
    }

    /// Landing page: hero, newest articles and category tiles
    pub fn home(&self, snapshot: &ContentSnapshot) -> Result<String> {
        let latest: Vec<ArticleCardData> = latest(&snapshot.articles, self.latest_articles)
            .into_iter()
            .map(|article| self.card(article, snapshot))
            .collect();

        let categories: Vec<CategoryTileData> = snapshot
            .categories
            .iter()
            .map(|category| CategoryTileData {
                id: category.category_id,
                name: category.category_name.clone(),
                url: format!(
                    "{}?category={}",
                    self.assets.resolve("/articles"),
                    category.category_id
                ),
                count: articles_in_category(&snapshot.articles, category.category_id),
            })
            .collect();

        let mut context = self.base_context(Some(snapshot), "home", "");
        context.insert("latest", &latest);
        context.insert("categories", &categories);
        self.templates.render("home.html", &context)
    }

    /// Article listing narrowed by `query`
    pub fn articles(&self, snapshot: &ContentSnapshot, query: &ArticleQuery) -> Result<String> {
        let cards = query
            .apply(&snapshot.articles)
            .into_iter()
            .map(|article| self.card(article, snapshot))
            .collect();
        self.articles_page(snapshot, query, cards, false)
    }

    /// Articles listing for static hosting: every article, filtered in the browser
    pub fn static_articles(&self, snapshot: &ContentSnapshot) -> Result<String> {
        let query = ArticleQuery::default();
        let ranks = sort_ranks(&snapshot.articles);
        let cards = query
            .apply(&snapshot.articles)
            .into_iter()
            .map(|article| {
                let index = snapshot
                    .articles
                    .iter()
                    .position(|a| std::ptr::eq(a, article))
                    .unwrap_or_default();
                let mut card = self.card(article, snapshot);
                card.filter = Some(CardFilterData {
                    index,
                    category_id: article.category_id,
                    search: search_text(article),
                    date_rank: ranks[index].date,
                    title_rank: ranks[index].title,
                });
                card
            })
            .collect();
        self.articles_page(snapshot, &query, cards, true)
    }

    fn articles_page(
        &self,
        snapshot: &ContentSnapshot,
        query: &ArticleQuery,
        cards: Vec<ArticleCardData>,
        client_side: bool,
    ) -> Result<String> {
        let selected_category = query.category.to_string();
        let mut categories = vec![OptionData {
            value: CategoryFilter::All.to_string(),
            label: "All Categories".to_string(),
            selected: query.category == CategoryFilter::All,
        }];
        categories.extend(snapshot.categories.iter().map(|category| {
            let value = category.category_id.to_string();
            OptionData {
                selected: value == selected_category,
                value,
                label: category.category_name.clone(),
            }
        }));

        let sorts = SortKey::ALL
            .iter()
            .map(|key| OptionData {
                value: key.as_str().to_string(),
                label: key.label().to_string(),
                selected: *key == query.sort,
            })
            .collect();

        let action = self.assets.resolve("/articles");
        let filter = FilterData {
            search: query.search.clone(),
            categories,
            sorts,
            total: snapshot.articles.len(),
            shown: cards.len(),
            filtered: query.is_filtered(),
            clear_url: action.clone(),
            action,
            client_side,
        };

        let mut context = self.base_context(Some(snapshot), "articles", "Articles");
        context.insert("articles", &cards);
        context.insert("filter", &filter);
        self.templates.render("articles.html", &context)
    }

    /// Full article page around an already loaded Markdown body
    pub fn article(
        &self,
        snapshot: &ContentSnapshot,
        article: &Article,
        body: &str,
    ) -> Result<String> {
        let author = resolve_author(article, &snapshot.team)
            .member()
            .map(|member| AuthorData {
                name: member.team_member_name.clone(),
                position: member.team_member_position.clone(),
                avatar: self.avatar_url(&member.team_member_avatar),
                team_url: self.assets.resolve("/team"),
            });
        let category = resolve_category(article, &snapshot.categories)
            .category()
            .map(|category| category.category_name.clone());

        let detail = ArticleDetailData {
            id: article.article_id.clone(),
            title: article.article_title.clone(),
            description: article.article_description.clone(),
            created_at: article.article_created_at.clone(),
            category,
            author,
            image: article
                .featured_image_path()
                .map(|path| self.assets.resolve(&path)),
            body: self
                .markdown
                .render(body, Some(&article.article_directory)),
            keywords: article.article_keywords.clone(),
        };

        let mut context =
            self.base_context(Some(snapshot), "article", &article.article_title);
        context.insert("description", &article.article_description);
        context.insert("article", &detail);
        self.templates.render("article.html", &context)
    }

    /// Every team member with their article count
    pub fn team(&self, snapshot: &ContentSnapshot) -> Result<String> {
        let members: Vec<MemberData> = snapshot
            .team
            .iter()
            .map(|member| MemberData {
                id: member.team_id,
                name: member.team_member_name.clone(),
                position: member.team_member_position.clone(),
                avatar: self.avatar_url(&member.team_member_avatar),
                bio: member.team_member_bio.clone(),
                linkedin: member.team_member_linkedin.clone(),
                article_count: articles_by_author(&snapshot.articles, member.team_id),
            })
            .collect();

        let mut context = self.base_context(Some(snapshot), "team", "Team");
        context.insert("members", &members);
        self.templates.render("team.html", &context)
    }

    pub fn about(&self, snapshot: &ContentSnapshot) -> Result<String> {
        let context = self.base_context(Some(snapshot), "about", "About");
        self.templates.render("about.html", &context)
    }

    /// Not-found page; renders without content when none could be loaded
    pub fn not_found(&self, snapshot: Option<&ContentSnapshot>) -> Result<String> {
        let context = self.base_context(snapshot, "not-found", "Not Found");
        self.templates.render("not_found.html", &context)
    }

    /// Generic failure page, never dependent on content
    pub fn error(&self) -> Result<String> {
        let context = self.base_context(None, "error", "Error");
        self.templates.render("error.html", &context)
    }

    fn card(&self, article: &Article, snapshot: &ContentSnapshot) -> ArticleCardData {
        ArticleCardData {
            id: article.article_id.clone(),
            url: self.article_url(&article.article_id),
            title: article.article_title.clone(),
            description: article.article_description.clone(),
            created_at: article.article_created_at.clone(),
            image: article
                .featured_image_path()
                .map(|path| self.assets.resolve(&path)),
            category: resolve_category(article, &snapshot.categories)
                .name()
                .to_string(),
            author: resolve_author(article, &snapshot.team).name().to_string(),
            keywords: article.keyword_preview(self.keyword_preview).to_vec(),
            filter: None,
        }
    }

    fn avatar_url(&self, avatar: &str) -> String {
        self.assets.resolve(&format!("/{}/{}", AVATAR_DIR, avatar))
    }

    fn base_context(
        &self,
        snapshot: Option<&ContentSnapshot>,
        page_kind: &str,
        page_title: &str,
    ) -> Context {
        let (title, bio) = match snapshot {
            Some(s) => (s.site.title.clone(), s.site.bio.clone()),
            None => (FALLBACK_TITLE.to_string(), String::new()),
        };
        let default_footer = FooterContent::default();
        let footer = snapshot.map(|s| &s.footer).unwrap_or(&default_footer);

        let site = SiteData {
            title,
            bio,
            logo: self.assets.resolve(&self.logo),
            favicon: self.assets.resolve(&self.favicon),
            nav: NavData {
                home: self.assets.resolve("/"),
                articles: self.assets.resolve("/articles"),
                team: self.assets.resolve("/team"),
                about: self.assets.resolve("/about"),
            },
        };
        let footer = FooterData {
            copyright: footer.copyright.clone(),
            links: footer
                .social_links
                .iter()
                .map(|link| LinkData {
                    name: link.name.clone(),
                    url: link.url.clone(),
                })
                .collect(),
        };

        let mut context = Context::new();
        context.insert("description", &site.bio);
        context.insert("site", &site);
        context.insert("footer", &footer);
        context.insert("page_kind", page_kind);
        context.insert("page_title", page_title);
        context
    }
}
