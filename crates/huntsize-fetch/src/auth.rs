//! OAuth2 client-credentials token acquisition.

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Default token authority.
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Default scope for the security hunting API.
pub const DEFAULT_SCOPE: &str = "https://api.security.microsoft.com/.default";

/// Longest token lifetime honoured from a token response, in seconds.
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

/// Credentials and endpoint for the client-credentials grant.
#[derive(Clone)]
pub struct AuthConfig {
    /// Directory (tenant) identifier.
    pub tenant_id: String,
    /// Application (client) identifier.
    pub client_id: String,
    /// Client secret.
    pub client_secret: String,
    /// Authority base URL.
    pub authority: String,
    /// Requested scope.
    pub scope: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl AuthConfig {
    /// Creates a configuration against the default authority and scope.
    #[must_use]
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authority: DEFAULT_AUTHORITY.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Returns the token endpoint for the configured tenant.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/token",
            self.authority.trim_end_matches('/'),
            self.tenant_id
        )
    }

    fn check_complete(&self) -> Result<(), AuthError> {
        let missing = [
            ("tenant_id", &self.tenant_id),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());

        match missing {
            Some((name, _)) => Err(AuthError::MissingCredential(name)),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("authority", &self.authority)
            .field("scope", &self.scope)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Errors that can occur while acquiring a token.
#[derive(Error, Debug)]
pub enum AuthError {
    /// A credential was not configured.
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The authority refused the grant.
    #[error("Token request rejected ({status}): {error}: {description}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// OAuth2 error code.
        error: String,
        /// Human-readable description from the authority.
        description: String,
    },
}

/// Bearer token for the hunting API.
#[derive(Clone)]
pub struct AccessToken {
    secret: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Creates a token.
    #[must_use]
    pub fn new(secret: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            secret: secret.into(),
            expires_at,
        }
    }

    /// Returns the raw bearer value.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Returns when the token stops being accepted.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns true if the token has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("secret", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Computes when a token issued at `now` with `expires_in` seconds expires.
///
/// The lifetime is clamped into `[0, MAX_TOKEN_LIFETIME_SECS]`.
fn expiry_after(now: DateTime<Utc>, expires_in: i64) -> DateTime<Utc> {
    TimeDelta::try_seconds(expires_in.clamp(0, MAX_TOKEN_LIFETIME_SECS))
        .and_then(|lifetime| now.checked_add_signed(lifetime))
        .unwrap_or(now)
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: i64,
}

#[derive(Deserialize, Default)]
struct TokenErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
}

/// Acquires access tokens with the client-credentials grant.
#[derive(Debug, Clone)]
pub struct TokenProvider {
    client: Client,
    config: AuthConfig,
}

impl TokenProvider {
    /// Creates a token provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: AuthConfig) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("huntsize/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    /// Returns the provider configuration.
    #[must_use]
    pub const fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Requests a new access token.
    ///
    /// # Errors
    ///
    /// Returns an error if a credential is missing, the request fails, or the
    /// authority rejects the grant.
    pub async fn acquire(&self) -> Result<AccessToken, AuthError> {
        self.config.check_complete()?;

        let url = self.config.token_url();
        debug!(url = %url, client_id = %self.config.client_id, "Requesting access token");

        let params = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("scope", self.config.scope.as_str()),
        ];
        let response = self.client.post(&url).form(&params).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body: TokenErrorResponse = response.json().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                error: body.error,
                description: body.error_description,
            });
        }

        let token: TokenResponse = response.json().await?;
        let expires_at = expiry_after(Utc::now(), token.expires_in);
        info!(expires_at = %expires_at, "Acquired access token");

        Ok(AccessToken::new(token.access_token, expires_at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_url() {
        let mut config = AuthConfig::new("contoso-tenant", "client", "secret");
        assert_eq!(
            config.token_url(),
            "https://login.microsoftonline.com/contoso-tenant/oauth2/v2.0/token"
        );

        config.authority = "https://login.example.test/".to_string();
        assert_eq!(
            config.token_url(),
            "https://login.example.test/contoso-tenant/oauth2/v2.0/token"
        );
    }

    #[test]
    fn test_missing_credentials_detected() {
        let config = AuthConfig::new("tenant", "", "secret");
        assert!(matches!(
            config.check_complete(),
            Err(AuthError::MissingCredential("client_id"))
        ));

        let config = AuthConfig::new("tenant", "client", "  ");
        assert!(matches!(
            config.check_complete(),
            Err(AuthError::MissingCredential("client_secret"))
        ));

        assert!(AuthConfig::new("t", "c", "s").check_complete().is_ok());
    }

    #[tokio::test]
    async fn test_acquire_fails_fast_without_credentials() {
        let provider = TokenProvider::new(AuthConfig::new("", "client", "secret")).unwrap();
        let err = provider.acquire().await.unwrap_err();
        assert!(matches!(err, AuthError::MissingCredential("tenant_id")));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = AuthConfig::new("tenant", "client", "hunter2");
        assert!(!format!("{config:?}").contains("hunter2"));

        let token = AccessToken::new("eyJ0eXAi", Utc::now());
        assert!(!format!("{token:?}").contains("eyJ0eXAi"));
    }

    #[test]
    fn test_token_expiry() {
        let now = Utc::now();
        let token = AccessToken::new("t", now + TimeDelta::seconds(60));
        assert!(!token.is_expired_at(now));
        assert!(token.is_expired_at(now + TimeDelta::seconds(60)));
    }

    #[test]
    fn test_expiry_is_bounded() {
        let now = Utc::now();
        assert_eq!(expiry_after(now, 3_599), now + TimeDelta::seconds(3_599));
        assert_eq!(expiry_after(now, -5), now);
        assert_eq!(
            expiry_after(now, i64::MAX),
            now + TimeDelta::seconds(MAX_TOKEN_LIFETIME_SECS)
        );
    }
}
