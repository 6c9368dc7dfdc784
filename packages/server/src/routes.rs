use axum::{
    Json, Router,
    http::{HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::{AppConfig, CorsConfig};
use crate::error::AppError;
use crate::handlers;
use crate::state::AppState;

pub fn api_routes(config: &AppConfig) -> Router<AppState> {
    let upload = Router::new()
        .route("/upload/{category}", post(handlers::storage::upload_file))
        .layer(handlers::storage::upload_body_limit(config));

    Router::new()
        .route("/health", get(health))
        .route("/download/{*key}", get(handlers::storage::download_file))
        .route("/delete/{*key}", delete(handlers::storage::delete_file))
        .route("/usage", get(handlers::storage::usage_report))
        .merge(upload)
        .fallback(unknown_route)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(build_cors(&config.server.cors))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Answers requests whose path matches no route.
///
/// Bare OPTIONS requests carry no preflight headers, so the CORS layer
/// passes them through; they get 200 regardless of path.
async fn unknown_route(method: Method, uri: Uri) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    AppError::NotFound(format!("Unknown route: {}", uri.path())).into_response()
}

/// Answers requests whose path matched but whose verb did not.
async fn method_not_allowed(method: Method) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    AppError::MethodNotAllowed.into_response()
}

fn build_cors(cors: &CorsConfig) -> CorsLayer {
    let layer = if cors.allow_origins.iter().any(|val| val == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let list = cors
            .allow_origins
            .iter()
            .filter_map(|val| HeaderValue::from_str(val).ok())
            .collect::<Vec<_>>();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(list))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    layer.max_age(std::time::Duration::from_secs(cors.max_age))
}
