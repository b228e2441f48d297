use axum::{
    extract::State,
    http::{header::ALLOW, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error};

use crate::cache::token::TokenRecord;
use crate::cache::token_manager::TokenManager;
use crate::helpers::time::now_millis;
use crate::observability::metrics::get_metrics;
use crate::server::server::AppState;

static FETCH_FAILED_MSG: &str = "token_fetch_failed";
static METHOD_NOT_ALLOWED_MSG: &str = "Method not allowed";

#[derive(Clone)]
pub struct TokenRouteState {
    token_manager: TokenManager,
}

impl TokenRouteState {
    pub fn new(token_manager: TokenManager) -> Self {
        Self { token_manager }
    }

    /// Every method is routed here so that non-GET requests get the JSON 405.
    pub fn router(&self, path: &str) -> Router<AppState> {
        Router::new().route(path, any(handle_token_request))
    }
}

#[derive(Debug, Serialize)]
struct TokenResponse {
    access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_type: Option<String>,
    expires_at: i64,
    issued_at: i64,
}

impl From<TokenRecord> for TokenResponse {
    fn from(record: TokenRecord) -> Self {
        Self {
            access_token: record.access_token,
            token_type: record.token_type,
            expires_at: record.expires_at,
            issued_at: record.issued_at.unwrap_or_else(now_millis),
        }
    }
}

async fn handle_token_request(State(state): State<AppState>, method: Method) -> Response {
    let metrics = get_metrics().await;

    let response = if method != Method::GET {
        debug!("rejecting {} on token endpoint", method);
        let mut response = (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(json!({ "error": METHOD_NOT_ALLOWED_MSG })),
        )
            .into_response();
        response
            .headers_mut()
            .insert(ALLOW, HeaderValue::from_static("GET"));
        response
    } else {
        match state.token_state.token_manager.get_token().await {
            Ok(record) => (StatusCode::OK, Json(TokenResponse::from(record))).into_response(),
            Err(e) => {
                error!("serving token failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": FETCH_FAILED_MSG, "detail": e.to_string() })),
                )
                    .into_response()
            }
        }
    };

    metrics
        .endpoint_requests
        .with_label_values(&[method.as_str(), response.status().as_str()])
        .inc();
    response
}
