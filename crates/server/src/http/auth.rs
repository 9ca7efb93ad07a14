use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use services::services::identity::IdentityError;
use utils::response::ApiResponse;

use crate::{AppState, error::ApiError};

fn parse_authorization_bearer(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    let (scheme, rest) = trimmed.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = rest.trim();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn extract_bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_authorization_bearer)
}

fn log_unauthorized(req: &Request, reason: &'static str) {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|connect_info| connect_info.0.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    tracing::warn!(
        path = %req.uri().path(),
        method = %req.method(),
        peer = %peer,
        reason,
        "Unauthorized request"
    );
}

fn unauthorized_response() -> Response {
    let response = ApiResponse::<()>::error("Unauthorized");
    (StatusCode::UNAUTHORIZED, Json(response)).into_response()
}

/// Gates every protected route. Each request is verified against the
/// identity provider independently; on success the caller's identity is
/// attached as a request extension for the handlers.
pub async fn require_auth(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let Some(token) = extract_bearer_token(&req).map(str::to_string) else {
        log_unauthorized(&req, "missing_token");
        return unauthorized_response();
    };

    match state.identity().verify(&token).await {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(IdentityError::InvalidToken) => {
            log_unauthorized(&req, "invalid_token");
            unauthorized_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "Token verification failed upstream");
            ApiError::Identity(err).into_response()
        }
    }
}
