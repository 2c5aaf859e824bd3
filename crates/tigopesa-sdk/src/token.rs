//! Bearer-token cache.
//!
//! One [`TokenCache`] per client holds at most one [`AuthToken`]. The
//! token is refreshed lazily on the call path — never by a timer — when
//! there is none yet or it expires within [`REFRESH_MARGIN`]. The cache
//! lock is held across the refresh, so concurrent callers wait for a
//! single in-flight token request and then share its result.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Method;
use tigopesa_models::{PayloadKind, TokenResponse};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::Credentials;
use crate::error::SdkError;
use crate::request::RequestDescriptor;
use crate::transport::HttpTransport;

/// A token is refreshed once less than this much validity remains.
pub const REFRESH_MARGIN: TimeDelta = TimeDelta::seconds(60);

/// Bearer token and its absolute expiry.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AuthToken {
    /// A token valid until `expires_at`.
    pub fn new(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at,
        }
    }

    /// The bearer string.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Absolute expiry.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// `true` when less than [`REFRESH_MARGIN`] remains at `now`.
    pub fn needs_refresh_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now < REFRESH_MARGIN
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("value", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// TokenCache
// ---------------------------------------------------------------------------

/// Lazily refreshed, single-flight token cache for one token endpoint.
pub struct TokenCache {
    url: String,
    credentials: Credentials,
    slot: Mutex<Option<AuthToken>>,
}

impl TokenCache {
    /// An empty cache for the token endpoint at `url`.
    pub fn new(url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            url: url.into(),
            credentials,
            slot: Mutex::new(None),
        }
    }

    /// Token endpoint URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// A bearer string valid for at least [`REFRESH_MARGIN`], refreshing
    /// the cached token first when needed.
    ///
    /// A failed refresh leaves the cached token as it was and aborts the
    /// caller; stale tokens are never handed out.
    pub async fn get_token(&self, transport: &HttpTransport) -> Result<String, SdkError> {
        let mut slot = self.slot.lock().await;
        if let Some(token) = slot.as_ref() {
            if !token.needs_refresh_at(Utc::now()) {
                return Ok(token.value.clone());
            }
            debug!(expires_at = %token.expires_at, "access token near expiry, refreshing");
        }

        let token = self.request_token(transport).await?;
        let value = token.value.clone();
        *slot = Some(token);
        Ok(value)
    }

    /// Request a new token regardless of the cached one.
    pub async fn refresh(&self, transport: &HttpTransport) -> Result<AuthToken, SdkError> {
        let mut slot = self.slot.lock().await;
        let token = self.request_token(transport).await?;
        *slot = Some(token.clone());
        Ok(token)
    }

    /// The cached token, if any.
    pub async fn current(&self) -> Option<AuthToken> {
        self.slot.lock().await.clone()
    }

    #[cfg(test)]
    pub(crate) async fn prime(&self, token: AuthToken) {
        *self.slot.lock().await = Some(token);
    }

    async fn request_token(&self, transport: &HttpTransport) -> Result<AuthToken, SdkError> {
        let request = RequestDescriptor::builder(Method::POST, &self.url, PayloadKind::Form)
            .payload(&self.credentials.token_request())
            .build()?;

        let response = transport
            .send::<TokenResponse>(request)
            .await
            .map_err(|e| SdkError::TokenUnavailable(Box::new(e)))?;
        let body = response.payload;

        if body.is_error() {
            warn!(
                status = %response.status,
                error = %body.error,
                "token endpoint returned an error"
            );
            return Err(SdkError::Auth {
                code: body.error,
                description: body.error_description,
            });
        }
        if body.access_token.is_empty() {
            warn!(status = %response.status, "token response carried no access_token");
            return Err(SdkError::Auth {
                code: response.status.as_str().to_string(),
                description: "token response carried no access_token".into(),
            });
        }

        let now = Utc::now();
        let lifetime = TimeDelta::try_seconds(body.expires_in).unwrap_or_else(TimeDelta::zero);
        let expires_at = now
            .checked_add_signed(lifetime)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        info!(expires_in = body.expires_in, "access token acquired");

        Ok(AuthToken::new(body.access_token, expires_at))
    }
}

impl fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCache")
            .field("url", &self.url)
            .field("credentials", &self.credentials)
            .finish_non_exhaustive()
    }
}
