//! Identity Toolkit REST client — the production `IdentityGateway`.
//!
//! Every operation is one POST to `{endpoint}/accounts:<method>?key=<api key>`.
//! Sign-in style calls return tokens only, so they are followed by an
//! `accounts:lookup` to fill in provider and creation time.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};
use url::form_urlencoded;

use super::{AuthError, AuthProvider, AuthSession, Identity, IdentityGateway, ProviderCredential};

pub const DEFAULT_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct IdentityToolkitClient {
    client: Client,
    endpoint: String,
    api_key: String,
    request_uri: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest<'a> {
    post_body: String,
    request_uri: &'a str,
    return_idp_credential: bool,
    return_secure_token: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IdTokenRequest<'a> {
    id_token: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileRequest<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    id_token: String,
    #[serde(default)]
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<ToolkitUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolkitUser {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    provider_user_info: Vec<ProviderUserInfo>,
    /// Milliseconds since the epoch, as a decimal string.
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderUserInfo {
    provider_id: String,
}

#[derive(Debug, Deserialize)]
struct ToolkitErrorEnvelope {
    error: ToolkitErrorBody,
}

#[derive(Debug, Deserialize)]
struct ToolkitErrorBody {
    message: String,
}

impl From<ToolkitUser> for Identity {
    fn from(user: ToolkitUser) -> Self {
        let provider = user
            .provider_user_info
            .first()
            .map(|p| AuthProvider::from_provider_id(&p.provider_id))
            .unwrap_or_default();
        Identity {
            uid: user.local_id,
            display_name: user.display_name.filter(|n| !n.is_empty()),
            email: user.email.filter(|e| !e.is_empty()),
            provider,
            created_at: user.created_at.as_deref().and_then(parse_epoch_millis),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Client
// ────────────────────────────────────────────────────────────────────────────

impl IdentityToolkitClient {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, request_uri: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            request_uri: request_uri.into(),
        }
    }

    fn url(&self, method: &str) -> String {
        format!("{}/accounts:{}?key={}", self.endpoint, method, self.api_key)
    }

    /// One request, no retries. Non-2xx bodies are mapped through `map_error_code`.
    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, AuthError> {
        let response = self
            .client
            .post(self.url(method))
            .timeout(REQUEST_TIMEOUT)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!("Identity Toolkit {method} request failed: {e}");
                AuthError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let code = serde_json::from_str::<ToolkitErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            debug!("Identity Toolkit {method} returned {status}: {code}");
            return Err(map_error_code(&code));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| AuthError::Rejected(format!("malformed {method} response: {e}")))
    }

    async fn lookup(&self, id_token: &str) -> Result<Identity, AuthError> {
        let response: LookupResponse = self
            .post("lookup", &IdTokenRequest { id_token })
            .await?;
        response
            .users
            .into_iter()
            .next()
            .map(Identity::from)
            .ok_or(AuthError::InvalidToken)
    }

    async fn session(&self, tokens: TokenResponse) -> Result<AuthSession, AuthError> {
        let identity = self.lookup(&tokens.id_token).await?;
        Ok(AuthSession {
            identity,
            expires_in: tokens.expires_in.as_deref().and_then(|s| s.parse().ok()),
            id_token: tokens.id_token,
            refresh_token: tokens.refresh_token,
        })
    }
}

#[async_trait]
impl IdentityGateway for IdentityToolkitClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let tokens: TokenResponse = self
            .post(
                "signInWithPassword",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        self.session(tokens).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let tokens: TokenResponse = self
            .post(
                "signUp",
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        self.session(tokens).await
    }

    async fn sign_in_with_provider(
        &self,
        provider: AuthProvider,
        credential: &ProviderCredential,
    ) -> Result<AuthSession, AuthError> {
        let provider_id = provider
            .provider_id()
            .ok_or_else(|| AuthError::ProviderFailed("email is not an OAuth provider".to_string()))?;
        let post_body = idp_post_body(provider_id, credential).ok_or(AuthError::ProviderCancelled)?;

        let tokens: TokenResponse = self
            .post(
                "signInWithIdp",
                &IdpRequest {
                    post_body,
                    request_uri: &self.request_uri,
                    return_idp_credential: true,
                    return_secure_token: true,
                },
            )
            .await
            .map_err(|e| match e {
                AuthError::Rejected(msg) => AuthError::ProviderFailed(msg),
                other => other,
            })?;
        self.session(tokens).await
    }

    async fn sign_out(&self, _id_token: &str) -> Result<(), AuthError> {
        Ok(())
    }

    async fn resolve(&self, id_token: &str) -> Result<Identity, AuthError> {
        if id_token.is_empty() {
            return Err(AuthError::MissingToken);
        }
        self.lookup(id_token).await
    }

    async fn set_display_name(
        &self,
        id_token: &str,
        display_name: &str,
    ) -> Result<Identity, AuthError> {
        let _: serde_json::Value = self
            .post(
                "update",
                &UpdateProfileRequest {
                    id_token,
                    display_name,
                    return_secure_token: false,
                },
            )
            .await?;
        self.lookup(id_token).await
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Error messages look like `WEAK_PASSWORD : Password should be at least 6 characters`;
/// only the code before the colon is significant.
fn map_error_code(message: &str) -> AuthError {
    let code = message.split(':').next().unwrap_or(message).trim();
    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "USER_DISABLED" => {
            AuthError::InvalidCredentials
        }
        "EMAIL_EXISTS" => AuthError::EmailInUse,
        "WEAK_PASSWORD" => AuthError::WeakPassword,
        "INVALID_EMAIL" | "MISSING_EMAIL" => AuthError::InvalidEmail,
        "INVALID_ID_TOKEN" | "TOKEN_EXPIRED" | "USER_NOT_FOUND" | "MISSING_ID_TOKEN" => {
            AuthError::InvalidToken
        }
        "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthError::TooManyAttempts,
        "INVALID_IDP_RESPONSE" | "FEDERATED_USER_ID_ALREADY_LINKED" => {
            AuthError::ProviderFailed(code.to_string())
        }
        "" => AuthError::Rejected("empty error response".to_string()),
        other => AuthError::Rejected(other.to_string()),
    }
}

fn idp_post_body(provider_id: &str, credential: &ProviderCredential) -> Option<String> {
    let (key, token) = match (&credential.access_token, &credential.id_token) {
        (Some(token), _) if !token.is_empty() => ("access_token", token),
        (_, Some(token)) if !token.is_empty() => ("id_token", token),
        _ => return None,
    };
    Some(
        form_urlencoded::Serializer::new(String::new())
            .append_pair(key, token)
            .append_pair("providerId", provider_id)
            .finish(),
    )
}

fn parse_epoch_millis(raw: &str) -> Option<DateTime<Utc>> {
    let millis: i64 = raw.parse().ok()?;
    Utc.timestamp_millis_opt(millis).single()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        assert_eq!(map_error_code("EMAIL_EXISTS"), AuthError::EmailInUse);
        assert_eq!(
            map_error_code("WEAK_PASSWORD : Password should be at least 6 characters"),
            AuthError::WeakPassword
        );
        assert_eq!(map_error_code("INVALID_LOGIN_CREDENTIALS"), AuthError::InvalidCredentials);
        assert_eq!(map_error_code("TOKEN_EXPIRED"), AuthError::InvalidToken);
        assert_eq!(
            map_error_code("SOMETHING_NEW"),
            AuthError::Rejected("SOMETHING_NEW".to_string())
        );
    }

    #[test]
    fn test_idp_post_body_prefers_access_token() {
        let credential = ProviderCredential {
            access_token: Some("at".to_string()),
            id_token: Some("it".to_string()),
        };
        assert_eq!(
            idp_post_body("github.com", &credential).as_deref(),
            Some("access_token=at&providerId=github.com")
        );
        let credential = ProviderCredential {
            access_token: None,
            id_token: Some("it".to_string()),
        };
        assert_eq!(
            idp_post_body("google.com", &credential).as_deref(),
            Some("id_token=it&providerId=google.com")
        );
        assert_eq!(idp_post_body("google.com", &ProviderCredential::default()), None);
    }

    #[test]
    fn test_idp_post_body_encodes_token() {
        let credential = ProviderCredential {
            access_token: Some("a&b=c+d e".to_string()),
            id_token: None,
        };
        assert_eq!(
            idp_post_body("github.com", &credential).as_deref(),
            Some("access_token=a%26b%3Dc%2Bd+e&providerId=github.com")
        );
    }

    #[test]
    fn test_lookup_user_becomes_identity() {
        let body = r#"{"users":[{"localId":"abc","email":"a@b.co","displayName":"",
            "providerUserInfo":[{"providerId":"github.com"}],"createdAt":"1700000000000"}]}"#;
        let lookup: LookupResponse = serde_json::from_str(body).unwrap();
        let identity: Identity = lookup.users.into_iter().next().unwrap().into();
        assert_eq!(identity.uid, "abc");
        assert_eq!(identity.email.as_deref(), Some("a@b.co"));
        assert_eq!(identity.display_name, None);
        assert_eq!(identity.provider, AuthProvider::GitHub);
        assert_eq!(identity.created_at.unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_url_building() {
        let client = IdentityToolkitClient::new("http://localhost:9099/v1/", "key123", "http://localhost");
        assert_eq!(
            client.url("signUp"),
            "http://localhost:9099/v1/accounts:signUp?key=key123"
        );
    }

    #[tokio::test]
    async fn test_provider_sign_in_without_credential_is_cancelled() {
        let client = IdentityToolkitClient::new(DEFAULT_ENDPOINT, "k", "http://localhost");
        let err = client
            .sign_in_with_provider(AuthProvider::Google, &ProviderCredential::default())
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::ProviderCancelled);
    }
}
