//! Google ID token verification against Google's published signing keys

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use cinema_common::{AppError, GoogleConfig};
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::external_identity::{ExternalIdentity, ExternalIdentityVerifier};
use crate::services::ServiceResult;

pub const GOOGLE_CERTS_URL: &str = "https://www.googleapis.com/oauth2/v3/certs";
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

#[derive(Debug, Deserialize)]
struct GoogleClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// Verifies RS256 ID tokens issued for one OAuth client.
///
/// Signing keys are fetched on first use and refetched whenever a token
/// names a key id that is not cached, which covers Google's key rotation.
pub struct GoogleIdTokenVerifier {
    client_id: String,
    certs_url: String,
    http: Client,
    keys: RwLock<HashMap<String, DecodingKey>>,
}

impl std::fmt::Debug for GoogleIdTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleIdTokenVerifier")
            .field("client_id", &self.client_id)
            .field("certs_url", &self.certs_url)
            .finish()
    }
}

impl GoogleIdTokenVerifier {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn new(client_id: impl Into<String>) -> Result<Self, AppError> {
        Self::with_certs_url(client_id, GOOGLE_CERTS_URL)
    }

    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn with_certs_url(
        client_id: impl Into<String>,
        certs_url: impl Into<String>,
    ) -> Result<Self, AppError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::internal(anyhow::anyhow!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client_id: client_id.into(),
            certs_url: certs_url.into(),
            http,
            keys: RwLock::new(HashMap::new()),
        })
    }

    /// `None` when no client id is configured
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built
    pub fn from_config(config: &GoogleConfig) -> Result<Option<Self>, AppError> {
        config.client_id.as_deref().map(Self::new).transpose()
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.client_id]);
        validation.set_issuer(&GOOGLE_ISSUERS);
        validation
    }

    async fn cached_key(&self, kid: &str) -> Option<DecodingKey> {
        self.keys.read().await.get(kid).cloned()
    }

    async fn refresh_keys(&self) -> Result<(), AppError> {
        let set: JwkSet = self
            .http
            .get(&self.certs_url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| AppError::ExternalService(format!("failed to fetch Google certs: {e}")))?
            .json()
            .await
            .map_err(|e| AppError::ExternalService(format!("malformed Google certs: {e}")))?;

        let keys = index_keys(&set);
        debug!(count = keys.len(), "Refreshed Google signing keys");
        *self.keys.write().await = keys;
        Ok(())
    }

    async fn key_for(&self, kid: &str) -> ServiceResult<DecodingKey> {
        if let Some(key) = self.cached_key(kid).await {
            return Ok(key);
        }
        self.refresh_keys().await?;
        self.cached_key(kid)
            .await
            .ok_or_else(|| AppError::InvalidToken.into())
    }
}

/// Usable keys by key id; entries without a kid or with bad parameters are skipped
fn index_keys(set: &JwkSet) -> HashMap<String, DecodingKey> {
    set.keys
        .iter()
        .filter_map(|jwk| {
            let kid = jwk.common.key_id.clone()?;
            match DecodingKey::from_jwk(jwk) {
                Ok(key) => Some((kid, key)),
                Err(e) => {
                    warn!(kid = %kid, error = %e, "Skipping unusable Google signing key");
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl ExternalIdentityVerifier for GoogleIdTokenVerifier {
    async fn verify(&self, id_token: &str) -> ServiceResult<ExternalIdentity> {
        let header = decode_header(id_token).map_err(|_| AppError::InvalidToken)?;
        let kid = header.kid.ok_or(AppError::InvalidToken)?;
        let key = self.key_for(&kid).await?;

        let data = decode::<GoogleClaims>(id_token, &key, &self.validation()).map_err(|e| {
            debug!(error = %e, "Google ID token rejected");
            AppError::InvalidToken
        })?;

        Ok(ExternalIdentity {
            subject: data.claims.sub,
            email: data.claims.email,
            name: data.claims.name,
        })
    }
}
