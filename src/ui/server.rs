//! HTTP server: connection endpoint, admin API and static assets

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::Request,
    http::Uri,
    middleware::map_request,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::config::UiConfig;
use crate::relay::RelaySettings;
use crate::tenant::TenantRegistry;
use crate::ui::{handlers, websocket};

/// State shared by every request handler
pub struct AppState {
    pub tenants: Arc<TenantRegistry>,
    pub relay: RelaySettings,
}

/// Build the application router
pub fn router(state: Arc<AppState>, assets_dir: &Path) -> Router {
    Router::new()
        .route("/websocket", get(websocket::upgrade))
        .route("/api/servers", get(handlers::list_servers))
        .route(
            "/api/server",
            get(handlers::get_server)
                .put(handlers::create_server)
                .delete(handlers::delete_server),
        )
        .fallback_service(assets(assets_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Static files, with `/name` resolving to `name.html`
fn assets(dir: &Path) -> Router {
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(map_request(with_html_extension))
}

async fn with_html_extension(mut request: Request) -> Request {
    if let Some(uri) = html_uri(request.uri()) {
        *request.uri_mut() = uri;
    }
    request
}

/// `uri` with `.html` appended if its last path segment has no extension.
///
/// Paths ending in `/` are left for the directory index.
fn html_uri(uri: &Uri) -> Option<Uri> {
    let path = uri.path();
    let last = path.rsplit('/').next().unwrap_or_default();
    if last.is_empty() || last.contains('.') {
        return None;
    }

    let rewritten = match uri.query() {
        Some(query) => format!("{}.html?{}", path, query),
        None => format!("{}.html", path),
    };
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(rewritten.parse().ok()?);
    Uri::from_parts(parts).ok()
}

pub struct WebServer {
    config: UiConfig,
    state: Arc<AppState>,
}

impl WebServer {
    pub fn new(config: UiConfig, tenants: Arc<TenantRegistry>, relay: RelaySettings) -> Self {
        Self {
            config,
            state: Arc::new(AppState { tenants, relay }),
        }
    }

    /// Bind and serve until the listener fails
    pub async fn serve(self) -> std::io::Result<()> {
        let addr = format!("{}:{}", self.config.bind_address, self.config.http_port);
        let listener = TcpListener::bind(&addr).await?;
        tracing::info!("Web server listening on {}", addr);

        let app = router(self.state, &self.config.assets_dir);
        axum::serve(listener, app).await
    }

    pub fn start_background(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(e) = self.serve().await {
                tracing::error!("Web server error: {}", e);
            }
        })
    }
}
