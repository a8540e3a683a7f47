//! HTTP API handlers

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::error::TenantError;
use crate::tenant::TenantConfig;
use crate::ui::server::AppState;

/// Header carrying the tenant name
pub const NAME_HEADER: &str = "x-name";

/// Header carrying the tenant password
pub const PASSWORD_HEADER: &str = "x-password";

/// API response wrapper
#[derive(Debug, serde::Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

type ApiResult<T> = (StatusCode, Json<ApiResponse<T>>);

fn failure<T>(e: TenantError) -> ApiResult<T> {
    let status = match e {
        TenantError::NotFound(_) => StatusCode::NOT_FOUND,
        TenantError::Unauthorized => StatusCode::UNAUTHORIZED,
        TenantError::AlreadyExists(_) | TenantError::MissingName | TenantError::InvalidConfig(_) => {
            StatusCode::BAD_REQUEST
        }
    };
    (status, Json(ApiResponse::error(e.to_string())))
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

/// List every tenant with its credentials masked
pub async fn list_servers(
    State(state): State<Arc<AppState>>,
) -> Json<ApiResponse<BTreeMap<String, TenantConfig>>> {
    Json(ApiResponse::ok(state.tenants.list()))
}

/// Get one tenant's configuration
pub async fn get_server(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<TenantConfig> {
    let name = header(&headers, NAME_HEADER);
    match state.tenants.get(name, header(&headers, PASSWORD_HEADER)) {
        Ok(config) => (StatusCode::OK, Json(ApiResponse::ok(config))),
        Err(e) => {
            tracing::warn!(tenant = %name, "Tenant lookup refused: {}", e);
            failure(e)
        }
    }
}

/// Create a tenant
pub async fn create_server(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<TenantConfig>, JsonRejection>,
) -> ApiResult<()> {
    let name = header(&headers, NAME_HEADER);

    let Json(config) = match body {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!(tenant = %name, "Rejected tenant body: {}", e);
            return (StatusCode::BAD_REQUEST, Json(ApiResponse::error(e.body_text())));
        }
    };

    match state.tenants.create(name, config) {
        Ok(_) => (StatusCode::CREATED, Json(ApiResponse::ok(()))),
        Err(e) => {
            tracing::warn!(tenant = %name, "Tenant creation refused: {}", e);
            failure(e)
        }
    }
}

/// Delete a tenant, closing its console and every session
pub async fn delete_server(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let name = header(&headers, NAME_HEADER);
    match state.tenants.delete(name, header(&headers, PASSWORD_HEADER)).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => {
            tracing::warn!(tenant = %name, "Tenant deletion refused: {}", e);
            failure::<()>(e).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relay::RelaySettings;
    use crate::tenant::TenantRegistry;
    use crate::ui::server::router;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request};
    use axum::Router;
    use tower::ServiceExt;

    fn app() -> (Router, Arc<TenantRegistry>) {
        let tenants = Arc::new(TenantRegistry::new());
        tenants
            .create("alpha", TenantConfig::new("localhost:25575", "0000"))
            .unwrap();
        let state = Arc::new(AppState {
            tenants: tenants.clone(),
            relay: RelaySettings::default(),
        });
        (router(state, std::path::Path::new("./assets")), tenants)
    }

    fn request(method: Method, uri: &str, name: &str, password: &str, body: Body) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(NAME_HEADER, name)
            .header(PASSWORD_HEADER, password)
            .header("content-type", "application/json")
            .body(body)
            .unwrap()
    }

    async fn json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_list_servers_masks_credentials() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::get("/api/servers").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["alpha"]["pass"], "****");
        assert_eq!(body["data"]["alpha"]["address"], "*".repeat(15));
        assert_eq!(body["data"]["alpha"]["mute"], 15.0);
    }

    #[tokio::test]
    async fn test_get_server() {
        let (app, _) = app();

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/api/server", "alpha", "0000", Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json(response).await["data"]["pass"], "0000");

        let response = app
            .clone()
            .oneshot(request(Method::GET, "/api/server", "alpha", "bad", Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = app
            .oneshot(request(Method::GET, "/api/server", "beta", "0000", Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_create_server() {
        let (app, tenants) = app();
        let body = r#"{"address":"10.0.0.2:25575","pass":"pw","fadeout":4.0,"mute":20.0}"#;

        let response = app
            .clone()
            .oneshot(request(Method::PUT, "/api/server", "beta", "", Body::from(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let beta = tenants.resolve("beta").unwrap();
        assert_eq!(beta.config().mute, 20.0);

        let response = app
            .clone()
            .oneshot(request(Method::PUT, "/api/server", "beta", "", Body::from(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .clone()
            .oneshot(request(Method::PUT, "/api/server", "", "", Body::from(body)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(request(Method::PUT, "/api/server", "gamma", "", Body::from("not json")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(tenants.resolve("gamma").is_none());
    }

    #[tokio::test]
    async fn test_delete_server() {
        let (app, tenants) = app();
        let alpha = tenants.resolve("alpha").unwrap();

        let response = app
            .clone()
            .oneshot(request(Method::DELETE, "/api/server", "alpha", "bad", Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(tenants.resolve("alpha").is_some());

        let response = app
            .clone()
            .oneshot(request(Method::DELETE, "/api/server", "alpha", "0000", Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(tenants.resolve("alpha").is_none());
        assert!(alpha.is_shut_down());

        let response = app
            .oneshot(request(Method::DELETE, "/api/server", "alpha", "0000", Body::empty()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
