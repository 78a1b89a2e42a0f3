//! Server for the generated site with on-demand generation
//!
//! Files in the public directory are served as they are. Post pages that were
//! not generated at build time are handled per [`FallbackMode`]; listing pages
//! past the generated ones are rendered on each request.

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::cms::ContentClient;
use crate::config::FallbackMode;
use crate::generator::{listing_page_path, post_page_path, Generator};

/// Seconds between reloads of the loading placeholder
const LOADING_REFRESH_SECS: u32 = 1;
/// Most posts tracked at once in placeholder mode
const MAX_PENDING: usize = 256;
/// How long a settled outcome waits for the next request
const SETTLED_TTL: Duration = Duration::from_secs(60);

/// Server state
pub struct ServerState {
    generator: Generator,
    client: Arc<dyn ContentClient>,
    public_dir: PathBuf,
    fallback: FallbackMode,
    pending: Mutex<HashMap<String, Pending>>,
    max_pending: usize,
}

/// Post being generated in the background (placeholder mode)
///
/// `Missing` and `Failed` are answered once, by the next request for the
/// post, then dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    InFlight,
    Missing(Instant),
    Failed(Instant),
}

impl Pending {
    fn is_expired(&self) -> bool {
        match self {
            Pending::InFlight => false,
            Pending::Missing(at) | Pending::Failed(at) => at.elapsed() > SETTLED_TTL,
        }
    }
}

impl ServerState {
    pub fn new(generator: Generator, client: Arc<dyn ContentClient>) -> Self {
        let site = generator.site();
        Self {
            public_dir: site.public_dir.clone(),
            fallback: site.config.fallback,
            generator,
            client,
            pending: Mutex::new(HashMap::new()),
            max_pending: MAX_PENDING,
        }
    }

    fn pending(&self) -> std::sync::MutexGuard<'_, HashMap<String, Pending>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Build the router
pub fn router(state: Arc<ServerState>) -> Router {
    let serve_dir = ServeDir::new(&state.public_dir)
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new(state.public_dir.join("404.html")));

    Router::new()
        .route("/post/:slug", get(post_handler))
        .route("/post/:slug/", get(post_handler))
        .route("/page/:pages", get(listing_handler))
        .route("/page/:pages/", get(listing_handler))
        .fallback_service(serve_dir)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(
    generator: Generator,
    client: Arc<dyn ContentClient>,
    ip: &str,
    port: u16,
    open: bool,
) -> Result<()> {
    let fallback = generator.site().config.fallback;
    let state = Arc::new(ServerState::new(generator, client));
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Post fallback: {:?}", fallback);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve a post, generating it on demand when allowed
async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    let Ok(rel_path) = post_page_path(&slug) else {
        return not_found(&state);
    };

    if let Ok(html) = tokio::fs::read_to_string(state.public_dir.join(&rel_path)).await {
        return Html(html).into_response();
    }

    match state.fallback {
        FallbackMode::Disabled => not_found(&state),
        FallbackMode::Blocking => match generate_post(&state, &slug).await {
            Ok(html) => Html(html).into_response(),
            Err(e) if e.is_not_found() => not_found(&state),
            Err(e) => bad_gateway(&e),
        },
        FallbackMode::Placeholder => placeholder(state, slug),
    }
}

/// Respond with the loading page while the post is generated in a task
fn placeholder(state: Arc<ServerState>, slug: String) -> Response {
    {
        let mut pending = state.pending();
        pending.retain(|_, p| !p.is_expired());

        match pending.get(&slug).copied() {
            Some(Pending::Missing(_)) => {
                pending.remove(&slug);
                drop(pending);
                return not_found(&state);
            }
            Some(Pending::Failed(_)) => {
                pending.remove(&slug);
                return upstream_failed();
            }
            Some(Pending::InFlight) => {}
            None => {
                if pending.len() >= state.max_pending {
                    pending.retain(|_, p| *p == Pending::InFlight);
                }
                if pending.len() >= state.max_pending {
                    tracing::warn!("Too many posts generating, refusing {}", slug);
                    return (StatusCode::SERVICE_UNAVAILABLE, "Server busy").into_response();
                }

                pending.insert(slug.clone(), Pending::InFlight);
                let task_state = state.clone();
                let task_slug = slug.clone();
                tokio::spawn(async move {
                    background_generate(task_state, task_slug).await;
                });
            }
        }
    }

    match state.generator.render_loading(LOADING_REFRESH_SECS) {
        Ok(html) => Html(html).into_response(),
        Err(e) => internal_error(&e),
    }
}

async fn background_generate(state: Arc<ServerState>, slug: String) {
    let result = generate_post(&state, &slug).await;

    let mut pending = state.pending();
    match result {
        Ok(_) => {
            pending.remove(&slug);
        }
        Err(e) if e.is_not_found() => {
            tracing::info!("Post {} does not exist", slug);
            pending.insert(slug, Pending::Missing(Instant::now()));
        }
        Err(e) => {
            tracing::error!("Failed to generate post {}: {}", slug, e);
            pending.insert(slug, Pending::Failed(Instant::now()));
        }
    }
}

/// Render a post and write it to the public directory
async fn generate_post(state: &ServerState, slug: &str) -> crate::Result<String> {
    tracing::info!("Generating post {} on demand", slug);
    let html = state
        .generator
        .render_post(state.client.as_ref(), slug)
        .await?;
    state.generator.write_page(&post_page_path(slug)?, &html)?;
    Ok(html)
}

/// Serve a listing page, rendering it when it was not generated
async fn listing_handler(
    State(state): State<Arc<ServerState>>,
    Path(pages): Path<u32>,
) -> Response {
    let generated = state.public_dir.join(listing_page_path(pages));
    if pages > 1 {
        if let Ok(html) = tokio::fs::read_to_string(&generated).await {
            return Html(html).into_response();
        }
    }

    match state
        .generator
        .render_listing_page(state.client.as_ref(), pages)
        .await
    {
        Ok(Some(html)) => Html(html).into_response(),
        Ok(None) => not_found(&state),
        Err(e) => bad_gateway(&e),
    }
}

fn not_found(state: &ServerState) -> Response {
    match state.generator.render_not_found() {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => internal_error(&e),
    }
}

fn bad_gateway(e: &crate::Error) -> Response {
    tracing::error!("Content API error: {}", e);
    upstream_failed()
}

fn upstream_failed() -> Response {
    (StatusCode::BAD_GATEWAY, "Content API error").into_response()
}

fn internal_error(e: &crate::Error) -> Response {
    tracing::error!("Render error: {}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
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
    use crate::cms::fake::{post_doc, FakeClient};
    use crate::cms::Document;
    use crate::config::SiteConfig;
    use crate::SpaceTraveling;

    fn state(dir: &std::path::Path, fallback: FallbackMode) -> Arc<ServerState> {
        state_with(
            dir,
            fallback,
            vec![
                vec![post_doc("b", "2021-03-19T00:00:00+0000")],
                vec![post_doc("a", "2021-03-18T00:00:00+0000")],
            ],
        )
    }

    fn state_with(
        dir: &std::path::Path,
        fallback: FallbackMode,
        pages: Vec<Vec<Document>>,
    ) -> Arc<ServerState> {
        let mut config = SiteConfig::default();
        config.fallback = fallback;
        let site = SpaceTraveling::with_config(dir, config);
        let generator = Generator::new(&site).unwrap();
        Arc::new(ServerState::new(generator, Arc::new(FakeClient::paged(pages))))
    }

    async fn wait_until_settled(state: &ServerState, slug: &str) {
        for _ in 0..50 {
            if !matches!(state.pending().get(slug), Some(Pending::InFlight)) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("{} still generating", slug);
    }

    async fn get_post(state: &Arc<ServerState>, slug: &str) -> Response {
        post_handler(State(state.clone()), Path(slug.to_string())).await
    }

    #[tokio::test]
    async fn test_disabled_fallback_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path(), FallbackMode::Disabled);
        assert_eq!(get_post(&state, "a").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_generated_post_is_served() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path(), FallbackMode::Disabled);
        state
            .generator
            .write_page("post/a/index.html", "<p>built</p>")
            .unwrap();
        assert_eq!(get_post(&state, "a").await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_blocking_fallback_generates() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path(), FallbackMode::Blocking);

        assert_eq!(get_post(&state, "a").await.status(), StatusCode::OK);
        assert!(state.public_dir.join("post/a/index.html").exists());

        assert_eq!(
            get_post(&state, "nope").await.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(get_post(&state, "..").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_placeholder_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path(), FallbackMode::Placeholder);

        // first request gets the loading page
        assert_eq!(get_post(&state, "a").await.status(), StatusCode::OK);

        let path = state.public_dir.join("post/a/index.html");
        for _ in 0..50 {
            if path.exists() && state.pending().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(path.exists());
        assert!(state.pending().is_empty());
    }

    #[tokio::test]
    async fn test_placeholder_missing_post() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path(), FallbackMode::Placeholder);

        assert_eq!(get_post(&state, "nope").await.status(), StatusCode::OK);
        wait_until_settled(&state, "nope").await;
        assert!(matches!(
            state.pending().get("nope"),
            Some(Pending::Missing(_))
        ));
        assert_eq!(
            get_post(&state, "nope").await.status(),
            StatusCode::NOT_FOUND
        );
        assert!(state.pending().is_empty());
    }

    #[tokio::test]
    async fn test_placeholder_failed_post_is_answered_once() {
        let dir = tempfile::tempdir().unwrap();
        let mut bad = post_doc("bad", "2021-03-19T00:00:00+0000");
        bad.data = serde_json::json!({"author": "no title"});
        let state = state_with(dir.path(), FallbackMode::Placeholder, vec![vec![bad]]);

        assert_eq!(get_post(&state, "bad").await.status(), StatusCode::OK);
        wait_until_settled(&state, "bad").await;

        // the refresh gets the error instead of another loading page
        assert_eq!(
            get_post(&state, "bad").await.status(),
            StatusCode::BAD_GATEWAY
        );
        assert!(state.pending().is_empty());
        assert!(!state.public_dir.join("post/bad/index.html").exists());
    }

    #[tokio::test]
    async fn test_placeholder_pending_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state(dir.path(), FallbackMode::Placeholder);
        Arc::get_mut(&mut state).unwrap().max_pending = 8;

        for i in 0..100 {
            let slug = format!("unknown-{}", i);
            get_post(&state, &slug).await;
            wait_until_settled(&state, &slug).await;
            assert!(state.pending().len() <= 8);
        }
    }

    #[test]
    fn test_settled_entries_expire() {
        if let Some(old) = Instant::now().checked_sub(SETTLED_TTL + Duration::from_secs(1)) {
            assert!(Pending::Missing(old).is_expired());
            assert!(Pending::Failed(old).is_expired());
        }
        assert!(!Pending::Missing(Instant::now()).is_expired());
        assert!(!Pending::InFlight.is_expired());
    }

    #[tokio::test]
    async fn test_listing_rendered_on_demand() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path(), FallbackMode::Disabled);

        let ok = listing_handler(State(state.clone()), Path(2)).await;
        assert_eq!(ok.status(), StatusCode::OK);

        let past_end = listing_handler(State(state.clone()), Path(3)).await;
        assert_eq!(past_end.status(), StatusCode::NOT_FOUND);
    }
}
