//! Development server with live reload
//!
//! Pages are rendered per request from a fresh content snapshot, so query
//! parameters on `/articles` are applied server-side. Everything else under
//! the base path is served from the source directory.

mod error;

pub use error::PageError;

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        Path, Query, State, WebSocketUpgrade,
    },
    http::{Request, StatusCode, Uri},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::content::{find_article, ArticleQuery, ContentSnapshot, ContentStore, QueryParams};
use crate::pages::SiteRenderer;
use crate::watch::ChangeWatcher;
use crate::{Blog, CONFIG_FILE};

/// Path of the live reload socket, relative to the base path
pub const LIVE_RELOAD_PATH: &str = "/__livereload";

/// Where non-page requests are answered from
enum AssetOrigin {
    /// Files under the local source directory
    Local(PathBuf),
    /// Redirect to the remote content host
    Remote(String),
}

/// Server state
pub struct AppState {
    store: ContentStore,
    pages: SiteRenderer,
    assets: AssetOrigin,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

impl AppState {
    pub fn new(blog: &Blog, reload_tx: broadcast::Sender<()>, live_reload: bool) -> Result<Self> {
        let assets = match &blog.config.source_url {
            Some(url) => AssetOrigin::Remote(url.trim_end_matches('/').to_string()),
            None => AssetOrigin::Local(blog.source_dir.clone()),
        };

        Ok(Self {
            store: blog.store()?,
            pages: SiteRenderer::new(blog)?,
            assets,
            reload_tx,
            live_reload,
        })
    }

    fn base_path(&self) -> &str {
        self.pages.assets().base_path()
    }

    /// Wrap rendered HTML in a response, adding the reload hook when enabled
    fn html(&self, status: StatusCode, html: String) -> Response {
        let html = if self.live_reload {
            inject_live_reload(&html, self.base_path())
        } else {
            html
        };
        (status, Html(html)).into_response()
    }

    /// Render a page, or the themed error page for whatever went wrong
    async fn respond(&self, result: Result<String, PageError>) -> Response {
        match result {
            Ok(html) => self.html(StatusCode::OK, html),
            Err(err) => self.error_page(err).await,
        }
    }

    async fn error_page(&self, err: PageError) -> Response {
        let status = err.status();
        let rendered = if status == StatusCode::NOT_FOUND {
            tracing::debug!("{}", err);
            let snapshot = self.store.snapshot().await.ok();
            self.pages.not_found(snapshot.as_ref())
        } else {
            tracing::error!(error = %err, "page request failed");
            self.pages.error()
        };

        match rendered {
            Ok(html) => self.html(status, html),
            Err(e) => {
                tracing::error!("Failed to render error page: {}", e);
                err.into_response()
            }
        }
    }

    async fn snapshot(&self) -> Result<ContentSnapshot, PageError> {
        Ok(self.store.snapshot().await?)
    }
}

/// Start the development server
pub async fn start(blog: &Blog, ip: &str, port: u16, watch: bool, open: bool) -> Result<()> {
    // Create broadcast channel for live reload notifications
    let (reload_tx, _) = broadcast::channel::<()>(16);

    let state = Arc::new(AppState::new(blog, reload_tx, watch)?);
    let app = router(state.clone());

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}{}/", ip, port, state.base_path());
    println!("Server running at {}", url);
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    // Open browser if requested
    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    // Start file watcher if watch mode is enabled
    if watch {
        let paths = vec![blog.source_dir.clone(), blog.config_path()];
        let state = state.clone();

        tokio::spawn(async move {
            if let Err(e) = watch_and_reload(paths, state).await {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router, with every route under the base path
pub fn router(state: Arc<AppState>) -> Router {
    let base_path = state.base_path().to_string();
    let at = |path: &str| format!("{}{}", base_path, path);

    let mut app = Router::new()
        .route(&at("/"), get(home_handler))
        .route(&at("/articles"), get(articles_handler))
        .route(&at("/articles/:id"), get(article_handler))
        .route(&at("/team"), get(team_handler))
        .route(&at("/about"), get(about_handler))
        .route(&at(LIVE_RELOAD_PATH), get(livereload_handler));

    if !base_path.is_empty() {
        let target = at("/");
        app = app.route(&base_path, get(home_handler)).route(
            "/",
            get(move || {
                let target = target.clone();
                async move { Redirect::temporary(&target) }
            }),
        );
    }

    app.fallback(fallback_handler)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Watch for content changes, drop cached collections and trigger reload
async fn watch_and_reload(paths: Vec<PathBuf>, state: Arc<AppState>) -> Result<()> {
    let mut watcher = ChangeWatcher::new(&paths)?;

    while let Some(changed) = watcher.next_change().await {
        println!();
        for path in &changed {
            println!("📝 File changed: {}", path.display());
        }
        if changed.iter().any(|p| p.ends_with(CONFIG_FILE)) {
            tracing::warn!("Configuration changed; restart the server to apply it");
        }

        state.store.clear_cache();
        // Notify all connected clients to reload
        let _ = state.reload_tx.send(());
    }

    Ok(())
}

async fn home_handler(State(state): State<Arc<AppState>>) -> Response {
    let result = render_home(&state).await;
    state.respond(result).await
}

async fn articles_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<QueryParams>,
) -> Response {
    let query = ArticleQuery::from_params(&params);
    let result = render_articles(&state, &query).await;
    state.respond(result).await
}

async fn article_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let result = render_article(&state, &id).await;
    state.respond(result).await
}

async fn team_handler(State(state): State<Arc<AppState>>) -> Response {
    let result = render_team(&state).await;
    state.respond(result).await
}

async fn about_handler(State(state): State<Arc<AppState>>) -> Response {
    let result = render_about(&state).await;
    state.respond(result).await
}

async fn render_home(state: &AppState) -> Result<String, PageError> {
    let snapshot = state.snapshot().await?;
    Ok(state.pages.home(&snapshot)?)
}

async fn render_articles(state: &AppState, query: &ArticleQuery) -> Result<String, PageError> {
    let snapshot = state.snapshot().await?;
    Ok(state.pages.articles(&snapshot, query)?)
}

async fn render_article(state: &AppState, id: &str) -> Result<String, PageError> {
    let snapshot = state.snapshot().await?;
    let article = find_article(&snapshot.articles, id)
        .ok_or_else(|| PageError::ArticleNotFound(id.to_string()))?;

    let body = state
        .store
        .load_body(&article.article_directory)
        .await
        .map_err(|e| {
            if e.is_not_found() {
                PageError::BodyNotFound(article.article_directory.clone())
            } else {
                PageError::Content(e)
            }
        })?;

    Ok(state.pages.article(&snapshot, article, &body)?)
}

async fn render_team(state: &AppState) -> Result<String, PageError> {
    let snapshot = state.snapshot().await?;
    Ok(state.pages.team(&snapshot)?)
}

async fn render_about(state: &AppState) -> Result<String, PageError> {
    let snapshot = state.snapshot().await?;
    Ok(state.pages.about(&snapshot)?)
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            // Wait for reload signal
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            // Handle incoming messages (ping/pong)
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Serve images, avatars and content files; unknown paths get the 404 page
async fn fallback_handler(State(state): State<Arc<AppState>>, request: Request<Body>) -> Response {
    let path = request.uri().path().to_string();
    let Some(relative) = state.pages.assets().strip_base(&path) else {
        return state.error_page(PageError::NotFound(path)).await;
    };

    match &state.assets {
        AssetOrigin::Local(dir) => {
            let (mut parts, body) = request.into_parts();
            parts.uri = match relative.parse::<Uri>() {
                Ok(uri) => uri,
                Err(_) => return state.error_page(PageError::NotFound(path)).await,
            };

            let mut service = ServeDir::new(dir);
            match service.try_call(Request::from_parts(parts, body)).await {
                Ok(response) if response.status() != StatusCode::NOT_FOUND => {
                    response.into_response()
                }
                Ok(_) => state.error_page(PageError::NotFound(path)).await,
                Err(e) => state.error_page(PageError::Internal(e.into())).await,
            }
        }
        AssetOrigin::Remote(base_url) => {
            let target = format!("{}{}", base_url, relative);
            Redirect::temporary(&target).into_response()
        }
    }
}

/// Live reload script injected into HTML pages
fn live_reload_script(base_path: &str) -> String {
    format!(
        r#"
<script>
(function() {{
    var ws = new WebSocket((location.protocol === 'https:' ? 'wss://' : 'ws://') + location.host + '{}{}');
    ws.onmessage = function(msg) {{
        if (msg.data === 'reload') {{
            location.reload();
        }}
    }};
    ws.onclose = function() {{
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() {{ location.reload(); }}, 1000);
    }};
}})();
</script>
</body>
"#,
        base_path, LIVE_RELOAD_PATH
    )
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str, base_path: &str) -> String {
    let script = live_reload_script(base_path);
    if html.contains("</body>") {
        html.replacen("</body>", &script, 1)
    } else {
        // If no </body> tag, append to end
        format!("{}{}", html, script)
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BlogConfig;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &std::path::Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn seed(root: &std::path::Path) {
        write(root, "public/content/site.json", r#"{"title": "Tech", "bio": "Notes"}"#);
        write(
            root,
            "public/content/categories.json",
            r#"[{"category_id": 1, "category_name": "Data"}]"#,
        );
        write(root, "public/content/team.json", "[]");
        write(
            root,
            "public/content/articles.json",
            r#"[{"article_id": "a1", "article_title": "Pipelines", "author_team_id": 1,
                 "category_id": 1, "article_created_at": "2025-01-01",
                 "article_keywords": [], "article_description": "d",
                 "article_directory": "first", "featured_image": ""},
                {"article_id": "a2", "article_title": "Orphan", "author_team_id": 1,
                 "category_id": 1, "article_created_at": "2025-01-02",
                 "article_keywords": [], "article_description": "d",
                 "article_directory": "gone", "featured_image": ""}]"#,
        );
        write(root, "public/data/first/index.md", "Hello **world**\n");
    }

    fn state(root: &std::path::Path, live_reload: bool) -> Arc<AppState> {
        let config = BlogConfig {
            base_path: "/blog".to_string(),
            ..Default::default()
        };
        let blog = Blog::with_config(root.to_path_buf(), config);
        let (tx, _) = broadcast::channel(4);
        Arc::new(AppState::new(&blog, tx, live_reload).unwrap())
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_article_page() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());
        let state = state(dir.path(), false);

        let response = article_handler(State(state), Path("a1".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("<strong>world</strong>"));
    }

    #[tokio::test]
    async fn test_unknown_article_is_404() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());
        let state = state(dir.path(), false);

        let response = article_handler(State(state), Path("nope".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("404"));
    }

    #[tokio::test]
    async fn test_missing_body_is_404() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());
        let state = state(dir.path(), false);

        let response = article_handler(State(state), Path("a2".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_missing_content_is_500() {
        let dir = TempDir::new().unwrap();
        let state = state(dir.path(), false);

        let response = home_handler(State(state)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_text(response).await.contains("Something went wrong"));
    }

    #[tokio::test]
    async fn test_articles_query_params() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());
        let state = state(dir.path(), false);

        let params = QueryParams {
            q: Some("pipe".to_string()),
            category: Some("bogus".to_string()),
            sort: None,
        };
        let response = articles_handler(State(state), Query(params)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Showing 1 of 2 articles"));
    }

    #[tokio::test]
    async fn test_live_reload_injected() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());
        let state = state(dir.path(), true);

        let html = body_text(about_handler(State(state)).await).await;
        assert!(html.contains("'/blog/__livereload'"));
    }

    async fn serve(state: Arc<AppState>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn client() -> reqwest::Client {
        reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_routes_under_base_path() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());
        write(dir.path(), "public/data/first/pic.png", "png");
        let origin = serve(state(dir.path(), false)).await;
        let client = client();

        let root = client.get(format!("{}/", origin)).send().await.unwrap();
        assert_eq!(root.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(root.headers()["location"], "/blog/");

        for path in ["/blog", "/blog/"] {
            let response = client.get(format!("{}{}", origin, path)).send().await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{}", path);
            assert!(response.text().await.unwrap().contains("Browse Articles"));
        }

        for path in ["/blog/articles", "/blog/articles/a1", "/blog/team", "/blog/about"] {
            let response = client.get(format!("{}{}", origin, path)).send().await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{}", path);
        }

        let asset = client
            .get(format!("{}/blog/data/first/pic.png", origin))
            .send()
            .await
            .unwrap();
        assert_eq!(asset.status(), StatusCode::OK);
        assert_eq!(asset.text().await.unwrap(), "png");
    }

    #[tokio::test]
    async fn test_unknown_paths_get_themed_404() {
        let dir = TempDir::new().unwrap();
        seed(dir.path());
        let origin = serve(state(dir.path(), false)).await;
        let client = client();

        for path in ["/blog/nope.png", "/elsewhere", "/blogroll"] {
            let response = client.get(format!("{}{}", origin, path)).send().await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", path);
            assert!(response.text().await.unwrap().contains("404"));
        }
    }

    #[test]
    fn test_inject_live_reload() {
        let html = inject_live_reload("<html><body>hi</body></html>", "");
        assert!(html.contains("'/__livereload'"));
        assert!(html.ends_with("</body>\n</html>"));

        let bare = inject_live_reload("hi", "/blog");
        assert!(bare.starts_with("hi"));
        assert!(bare.contains("</script>"));
    }
}
