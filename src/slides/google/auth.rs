//! Service-account authentication using the OAuth 2.0 JWT bearer grant.

use std::{
    fmt,
    time::{Duration, Instant, SystemTime, UNIX_EPOCH},
};

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::slides::{ProviderError, ProviderResult};

/// Read-only scope granted to the service account.
pub const PRESENTATIONS_READONLY_SCOPE: &str =
    "https://www.googleapis.com/auth/presentations.readonly";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME: Duration = Duration::from_secs(3600);
/// Tokens are refreshed this long before Google says they expire.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Fields of a Google service account JSON key used for signing.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Issuer of the signed assertion.
    pub client_email: String,
    /// PEM encoded RSA key.
    pub private_key: String,
    /// Sent as the JWT `kid` header when present.
    #[serde(default)]
    pub private_key_id: Option<String>,
    /// OAuth token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Parse the JSON document downloaded from the cloud console.
    pub fn from_json(raw: &str) -> ProviderResult<Self> {
        serde_json::from_str(raw).map_err(|err| ProviderError::Credential {
            message: err.to_string(),
        })
    }
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.into()
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Mints and caches access tokens for a service account.
pub struct TokenSource {
    client: Client,
    key: ServiceAccountKey,
    signing_key: EncodingKey,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenSource {
    /// Validate the private key up front so a bad credential fails at start-up.
    pub fn new(client: Client, key: ServiceAccountKey) -> ProviderResult<Self> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|err| {
            ProviderError::Credential {
                message: err.to_string(),
            }
        })?;

        Ok(Self {
            client,
            key,
            signing_key,
            cached: RwLock::new(None),
        })
    }

    /// Return a valid bearer token, exchanging a fresh assertion when the cached one is stale.
    pub async fn access_token(&self) -> ProviderResult<String> {
        {
            let guard = self.cached.read().await;
            if let Some(token) = guard.as_ref() {
                if token.expires_at > Instant::now() + EXPIRY_MARGIN {
                    return Ok(token.value.clone());
                }
            }
        }

        let mut guard = self.cached.write().await;
        // Another request may have refreshed while we waited for the lock.
        if let Some(token) = guard.as_ref() {
            if token.expires_at > Instant::now() + EXPIRY_MARGIN {
                return Ok(token.value.clone());
            }
        }

        let fresh = self.exchange().await?;
        let value = fresh.value.clone();
        *guard = Some(fresh);
        Ok(value)
    }

    fn assertion(&self) -> ProviderResult<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: PRESENTATIONS_READONLY_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME.as_secs(),
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        encode(&header, &claims, &self.signing_key).map_err(|err| ProviderError::Credential {
            message: err.to_string(),
        })
    }

    async fn exchange(&self) -> ProviderResult<CachedToken> {
        let assertion = self.assertion()?;
        let path = self.key.token_uri.clone();

        let response = self
            .client
            .post(&path)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|source| ProviderError::RequestSend {
                path: path.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(ProviderError::RequestStatus {
                path,
                status: response.status(),
            });
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|source| ProviderError::DecodeResponse {
                path: path.clone(),
                source,
            })?;

        let lifetime = Duration::from_secs(token.expires_in.unwrap_or(ASSERTION_LIFETIME.as_secs()));
        debug!(
            client_email = %self.key.client_email,
            expires_in_secs = lifetime.as_secs(),
            "obtained slides access token"
        );

        Ok(CachedToken {
            value: token.access_token,
            expires_at: Instant::now() + lifetime,
        })
    }
}
