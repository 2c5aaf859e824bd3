//! Client configuration.
//!
//! Endpoint families are configured separately ([`DisburseConfig`],
//! [`PushConfig`], [`InboundConfig`]) and bundled into a [`Config`]
//! built from environment variables at startup. Runtime behaviour
//! (timeout, debug dumps, HTTP client, cancellation) lives in
//! [`ClientOptions`], fixed when a client is constructed.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tigopesa_models::{TokenRequest, PASSWORD_GRANT};

use crate::cancel::CancelScope;
use crate::debug::{DebugSink, TracingSink};

/// Per-call timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Provider base URL used when none is configured (the local mock provider).
pub const DEFAULT_PROVIDER_URL: &str = "http://localhost:4100";

const REDACTED: &str = "<redacted>";

// ---------------------------------------------------------------------------
// Endpoint families
// ---------------------------------------------------------------------------

/// Password-grant credentials used to mint bearer tokens.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// API user name.
    pub username: String,
    /// API password.
    pub password: String,
    /// OAuth grant type, normally `password`.
    pub grant_type: String,
}

impl Credentials {
    /// Password-grant credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            grant_type: PASSWORD_GRANT.into(),
        }
    }

    /// Form body of the token request.
    pub(crate) fn token_request(&self) -> TokenRequest {
        TokenRequest {
            username: self.username.clone(),
            password: self.password.clone(),
            grant_type: self.grant_type.clone(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &REDACTED)
            .field("grant_type", &self.grant_type)
            .finish()
    }
}

/// Merchant → subscriber disbursement endpoint.
#[derive(Clone, Default)]
pub struct DisburseConfig {
    /// Sender name shown to recipients.
    pub account_name: String,
    /// Merchant account MSISDN.
    pub account_msisdn: String,
    /// Brand identifier issued by the provider.
    pub brand_id: String,
    /// Merchant account PIN.
    pub pin: String,
    /// Disbursement endpoint URL.
    pub url: String,
}

impl fmt::Debug for DisburseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisburseConfig")
            .field("account_name", &self.account_name)
            .field("account_msisdn", &self.account_msisdn)
            .field("brand_id", &self.brand_id)
            .field("pin", &REDACTED)
            .field("url", &self.url)
            .finish()
    }
}

/// Push-pay (bill-pay) API family.
#[derive(Clone, Default)]
pub struct PushConfig {
    /// Token credentials.
    pub credentials: Credentials,
    /// Merchant (biller) MSISDN.
    pub biller_msisdn: String,
    /// Biller code; used as the prefix of generated references.
    pub biller_code: String,
    /// Channel PIN required by refunds.
    pub channel_pin: String,
    /// Token endpoint URL.
    pub token_url: String,
    /// Bill-pay endpoint URL.
    pub billpay_url: String,
    /// Refund endpoint URL.
    pub refund_url: String,
    /// Health-check endpoint URL.
    pub health_check_url: String,
}

impl fmt::Debug for PushConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PushConfig")
            .field("credentials", &self.credentials)
            .field("biller_msisdn", &self.biller_msisdn)
            .field("biller_code", &self.biller_code)
            .field("channel_pin", &REDACTED)
            .field("token_url", &self.token_url)
            .field("billpay_url", &self.billpay_url)
            .field("refund_url", &self.refund_url)
            .field("health_check_url", &self.health_check_url)
            .finish()
    }
}

/// Paths of the provider-initiated routes served by [`crate::TigoClient::router`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundConfig {
    /// Name-check route.
    pub name_check_path: String,
    /// Wallet-to-account payment route.
    pub payment_path: String,
    /// Push-pay callback route.
    pub callback_path: String,
}

impl Default for InboundConfig {
    fn default() -> Self {
        Self {
            name_check_path: "/tigopesa/namecheck".into(),
            payment_path: "/tigopesa/payment".into(),
            callback_path: "/tigopesa/callback".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Complete SDK configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Disbursement endpoint.
    pub disburse: DisburseConfig,
    /// Push-pay API family.
    pub push: PushConfig,
    /// Inbound route paths.
    pub inbound: InboundConfig,
    /// Per-call timeout.
    pub timeout: Option<Duration>,
    /// Dump outbound/inbound traffic to the debug sink.
    pub debug: bool,
}

impl Config {
    /// Build the configuration from environment variables.
    ///
    /// | Variable                      | Default                          |
    /// |-------------------------------|----------------------------------|
    /// | `TIGO_DISBURSE_ACCOUNT_NAME`  | *(empty)*                        |
    /// | `TIGO_DISBURSE_ACCOUNT_MSISDN`| *(empty)*                        |
    /// | `TIGO_DISBURSE_BRAND_ID`      | *(empty)*                        |
    /// | `TIGO_DISBURSE_PIN`           | *(empty)*                        |
    /// | `TIGO_DISBURSE_URL`           | `{TIGO_PROVIDER_URL}/disburse`   |
    /// | `TIGO_PUSH_USERNAME`          | *(empty)*                        |
    /// | `TIGO_PUSH_PASSWORD`          | *(empty)*                        |
    /// | `TIGO_PUSH_GRANT_TYPE`        | `password`                       |
    /// | `TIGO_PUSH_BILLER_MSISDN`     | *(empty)*                        |
    /// | `TIGO_PUSH_BILLER_CODE`       | *(empty)*                        |
    /// | `TIGO_PUSH_CHANNEL_PIN`       | *(empty)*                        |
    /// | `TIGO_PUSH_TOKEN_URL`         | `{TIGO_PROVIDER_URL}/token`      |
    /// | `TIGO_PUSH_BILLPAY_URL`       | `{TIGO_PROVIDER_URL}/billpay`    |
    /// | `TIGO_PUSH_REFUND_URL`        | `{TIGO_PROVIDER_URL}/refund`     |
    /// | `TIGO_PUSH_HEALTH_CHECK_URL`  | `{TIGO_PROVIDER_URL}/healthcheck`|
    /// | `TIGO_NAME_CHECK_PATH`        | `/tigopesa/namecheck`            |
    /// | `TIGO_PAYMENT_PATH`           | `/tigopesa/payment`              |
    /// | `TIGO_CALLBACK_PATH`          | `/tigopesa/callback`             |
    /// | `TIGO_TIMEOUT_SECS`           | `60`                             |
    /// | `TIGO_DEBUG`                  | `false` (`1`/`true`/`yes` enable)|
    ///
    /// `TIGO_PROVIDER_URL` defaults to [`DEFAULT_PROVIDER_URL`].
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).unwrap_or_default();
        let base = lookup("TIGO_PROVIDER_URL")
            .unwrap_or_else(|| DEFAULT_PROVIDER_URL.to_string());
        let base = base.trim_end_matches('/');
        let url = |key: &str, path: &str| lookup(key).unwrap_or_else(|| format!("{base}{path}"));

        let disburse = DisburseConfig {
            account_name: var("TIGO_DISBURSE_ACCOUNT_NAME"),
            account_msisdn: var("TIGO_DISBURSE_ACCOUNT_MSISDN"),
            brand_id: var("TIGO_DISBURSE_BRAND_ID"),
            pin: var("TIGO_DISBURSE_PIN"),
            url: url("TIGO_DISBURSE_URL", "/disburse"),
        };

        let push = PushConfig {
            credentials: Credentials {
                username: var("TIGO_PUSH_USERNAME"),
                password: var("TIGO_PUSH_PASSWORD"),
                grant_type: lookup("TIGO_PUSH_GRANT_TYPE")
                    .unwrap_or_else(|| PASSWORD_GRANT.to_string()),
            },
            biller_msisdn: var("TIGO_PUSH_BILLER_MSISDN"),
            biller_code: var("TIGO_PUSH_BILLER_CODE"),
            channel_pin: var("TIGO_PUSH_CHANNEL_PIN"),
            token_url: url("TIGO_PUSH_TOKEN_URL", "/token"),
            billpay_url: url("TIGO_PUSH_BILLPAY_URL", "/billpay"),
            refund_url: url("TIGO_PUSH_REFUND_URL", "/refund"),
            health_check_url: url("TIGO_PUSH_HEALTH_CHECK_URL", "/healthcheck"),
        };

        let defaults = InboundConfig::default();
        let inbound = InboundConfig {
            name_check_path: lookup("TIGO_NAME_CHECK_PATH").unwrap_or(defaults.name_check_path),
            payment_path: lookup("TIGO_PAYMENT_PATH").unwrap_or(defaults.payment_path),
            callback_path: lookup("TIGO_CALLBACK_PATH").unwrap_or(defaults.callback_path),
        };

        let timeout = lookup("TIGO_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs);

        let debug = lookup("TIGO_DEBUG").is_some_and(|v| {
            matches!(
                v.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            )
        });

        Self {
            disburse,
            push,
            inbound,
            timeout,
            debug,
        }
    }

    /// Client options derived from this configuration.
    pub fn options(&self) -> ClientOptions {
        let options = ClientOptions::new().debug(self.debug);
        match self.timeout {
            Some(timeout) => options.timeout(timeout),
            None => options,
        }
    }
}

// ---------------------------------------------------------------------------
// ClientOptions
// ---------------------------------------------------------------------------

/// Runtime options recognised by every client, fixed at construction.
///
/// ```
/// use std::time::Duration;
/// use tigopesa_sdk::{CancelScope, ClientOptions};
///
/// let scope = CancelScope::new();
/// let options = ClientOptions::new()
///     .timeout(Duration::from_secs(15))
///     .debug(true)
///     .cancel_scope(scope.clone());
/// assert_eq!(options.timeout_duration(), Duration::from_secs(15));
/// ```
#[derive(Clone)]
pub struct ClientOptions {
    timeout: Duration,
    debug: bool,
    http_client: Option<reqwest::Client>,
    debug_sink: Arc<dyn DebugSink>,
    cancel: CancelScope,
}

impl ClientOptions {
    /// Defaults: 60 s timeout, debug off, a fresh HTTP client, dumps to `tracing`.
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            debug: false,
            http_client: None,
            debug_sink: Arc::new(TracingSink),
            cancel: CancelScope::new(),
        }
    }

    /// Per-call timeout for outbound calls and inbound handlers.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable traffic dumps.
    #[must_use]
    pub fn debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    /// Use a caller-built HTTP client (proxies, TLS roots, pools…).
    #[must_use]
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Destination of traffic dumps when debug mode is on.
    #[must_use]
    pub fn debug_sink(mut self, sink: impl DebugSink) -> Self {
        self.debug_sink = Arc::new(sink);
        self
    }

    /// Cancellation scope raced by every call.
    #[must_use]
    pub fn cancel_scope(mut self, scope: CancelScope) -> Self {
        self.cancel = scope;
        self
    }

    /// Configured per-call timeout.
    pub fn timeout_duration(&self) -> Duration {
        self.timeout
    }

    /// Whether traffic dumps are enabled.
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    pub(crate) fn custom_http_client(&self) -> Option<reqwest::Client> {
        self.http_client.clone()
    }

    pub(crate) fn sink(&self) -> Arc<dyn DebugSink> {
        Arc::clone(&self.debug_sink)
    }

    pub(crate) fn scope(&self) -> &CancelScope {
        &self.cancel
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("timeout", &self.timeout)
            .field("debug", &self.debug)
            .field("custom_http_client", &self.http_client.is_some())
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_local_provider() {
        let cfg = Config::from_lookup(lookup(&[]));
        assert_eq!(cfg.disburse.url, "http://localhost:4100/disburse");
        assert_eq!(cfg.push.token_url, "http://localhost:4100/token");
        assert_eq!(cfg.push.health_check_url, "http://localhost:4100/healthcheck");
        assert_eq!(cfg.push.credentials.grant_type, PASSWORD_GRANT);
        assert_eq!(cfg.inbound, InboundConfig::default());
        assert!(!cfg.debug);
        assert_eq!(cfg.options().timeout_duration(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn provider_url_and_overrides() {
        let cfg = Config::from_lookup(lookup(&[
            ("TIGO_PROVIDER_URL", "https://api.example.test/"),
            ("TIGO_PUSH_REFUND_URL", "https://refunds.example.test/v2"),
            ("TIGO_DISBURSE_PIN", "1234"),
        ]));
        assert_eq!(cfg.push.billpay_url, "https://api.example.test/billpay");
        assert_eq!(cfg.push.refund_url, "https://refunds.example.test/v2");
        assert_eq!(cfg.disburse.pin, "1234");
    }

    #[test]
    fn debug_and_timeout_toggles() {
        let cfg = Config::from_lookup(lookup(&[
            ("TIGO_DEBUG", "TRUE"),
            ("TIGO_TIMEOUT_SECS", "5"),
        ]));
        assert!(cfg.debug);
        let options = cfg.options();
        assert!(options.is_debug());
        assert_eq!(options.timeout_duration(), Duration::from_secs(5));

        let cfg = Config::from_lookup(lookup(&[
            ("TIGO_DEBUG", "0"),
            ("TIGO_TIMEOUT_SECS", "soon"),
        ]));
        assert!(!cfg.debug);
        assert_eq!(cfg.timeout, None);
    }

    #[test]
    fn secrets_are_not_printed() {
        let cfg = Config::from_lookup(lookup(&[
            ("TIGO_PUSH_PASSWORD", "hunter2"),
            ("TIGO_DISBURSE_PIN", "9876"),
            ("TIGO_PUSH_CHANNEL_PIN", "5555"),
        ]));
        let printed = format!("{cfg:?}");
        assert!(!printed.contains("hunter2"), "{printed}");
        assert!(!printed.contains("9876"), "{printed}");
        assert!(!printed.contains("5555"), "{printed}");
    }

    #[test]
    fn token_request_uses_credentials() {
        let request = Credentials::new("merchant", "s3cret").token_request();
        assert_eq!(request.username, "merchant");
        assert_eq!(request.grant_type, "password");
    }
}
