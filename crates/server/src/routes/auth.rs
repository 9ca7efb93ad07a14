use axum::{
    Extension, Router, extract::State, response::Json as ResponseJson, routing::post,
};
use db::models::user::{User, UserClaims};
use serde::Serialize;
use services::services::identity::AuthenticatedUser;

use crate::{AppState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub success: bool,
}

/// The auth gate has already verified the credential; this endpoint's only
/// job is to make sure the local user record exists.
pub async fn verify(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<ResponseJson<VerifyResponse>, ApiError> {
    let claims = UserClaims {
        subject_id: user.subject_id,
        email: user.email,
        name: user.name,
    };
    User::ensure(&state.db().pool, &claims).await?;

    Ok(ResponseJson(VerifyResponse { success: true }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/auth/verify", post(verify))
}
