use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use super::{config::IdentityConfig, parse_provider_error};

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid or expired credential")]
    InvalidToken,
    #[error("Identity provider request failed: {0}")]
    Upstream(#[from] reqwest::Error),
    #[error("Identity provider returned status {0}")]
    ProviderStatus(reqwest::StatusCode),
    #[error("Identity provider returned an unusable response")]
    MalformedResponse,
}

/// The caller's identity as attested by the provider for one request.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub subject_id: String,
    pub email: String,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
struct LookupUser {
    #[serde(rename = "localId")]
    local_id: String,
    email: Option<String>,
    #[serde(rename = "displayName")]
    display_name: Option<String>,
}

/// Verifies bearer credentials against the identity provider's lookup
/// endpoint. Stateless: every call is an independent round-trip.
#[derive(Clone)]
pub struct IdentityService {
    client: reqwest::Client,
    api_base: String,
    api_key: SecretString,
}

impl IdentityService {
    pub fn new(client: reqwest::Client, config: IdentityConfig) -> Self {
        Self {
            client,
            api_base: config.api_base,
            api_key: config.api_key,
        }
    }

    pub async fn verify(&self, token: &str) -> Result<AuthenticatedUser, IdentityError> {
        let url = lookup_url(&self.api_base, self.api_key.expose_secret());
        let response = self
            .client
            .post(url)
            .json(&serde_json::json!({ "idToken": token }))
            .send()
            .await?;

        let status = response.status();
        if status.is_client_error() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(
                status = %status,
                reason = %parse_provider_error(&body).unwrap_or_default(),
                "Token verification rejected"
            );
            return Err(IdentityError::InvalidToken);
        }
        if !status.is_success() {
            return Err(IdentityError::ProviderStatus(status));
        }

        let data = response
            .json::<LookupResponse>()
            .await
            .map_err(|_| IdentityError::MalformedResponse)?;

        authenticated_from(data).ok_or(IdentityError::InvalidToken)
    }
}

fn lookup_url(api_base: &str, api_key: &str) -> String {
    format!(
        "{}/v1/accounts:lookup?key={}",
        api_base.trim_end_matches('/'),
        api_key
    )
}

fn authenticated_from(data: LookupResponse) -> Option<AuthenticatedUser> {
    let user = data.users.into_iter().next()?;
    Some(AuthenticatedUser {
        subject_id: user.local_id,
        email: user.email.unwrap_or_default(),
        name: user.display_name.filter(|name| !name.trim().is_empty()),
    })
}

#[cfg(test)]
mod tests {
    use super::{authenticated_from, lookup_url, LookupResponse};

    #[test]
    fn lookup_url_joins_base_and_key() {
        assert_eq!(
            lookup_url("https://identitytoolkit.googleapis.com", "k123"),
            "https://identitytoolkit.googleapis.com/v1/accounts:lookup?key=k123"
        );
        assert_eq!(
            lookup_url("http://127.0.0.1:9099/", "k123"),
            "http://127.0.0.1:9099/v1/accounts:lookup?key=k123"
        );
    }

    #[test]
    fn authenticated_from_takes_the_first_user() {
        let data: LookupResponse = serde_json::from_str(
            r#"{"users": [{"localId": "subject-1", "email": "dev@example.com", "displayName": "Dev"}]}"#,
        )
        .unwrap();

        let user = authenticated_from(data).unwrap();
        assert_eq!(user.subject_id, "subject-1");
        assert_eq!(user.email, "dev@example.com");
        assert_eq!(user.name.as_deref(), Some("Dev"));
    }

    #[test]
    fn authenticated_from_blanks_missing_profile_fields() {
        let data: LookupResponse =
            serde_json::from_str(r#"{"users": [{"localId": "subject-1"}]}"#).unwrap();

        let user = authenticated_from(data).unwrap();
        assert_eq!(user.email, "");
        assert_eq!(user.name, None);
    }

    #[test]
    fn authenticated_from_rejects_empty_user_lists() {
        let data: LookupResponse = serde_json::from_str(r#"{"users": []}"#).unwrap();
        assert!(authenticated_from(data).is_none());

        let data: LookupResponse = serde_json::from_str("{}").unwrap();
        assert!(authenticated_from(data).is_none());
    }
}
