//! # Mock Tigo Pesa provider
//!
//! An in-process stand-in for the provider side of every outbound
//! endpoint, used by the SDK tests and for local demos:
//!
//! | Route          | Body           | Auth                         |
//! |----------------|----------------|------------------------------|
//! | `POST /token`       | form → JSON | username / password (form)   |
//! | `POST /disburse`    | XML → XML   | PIN in body (not checked)    |
//! | `POST /billpay`     | JSON → JSON | bearer + `username`/`password` headers |
//! | `POST /refund`      | JSON → JSON | bearer                       |
//! | `POST /healthcheck` | JSON → JSON | bearer                       |
//!
//! Behaviour knobs: token lifetime, artificial latency and token-error
//! injection. Every route counts its requests and keeps the last one it
//! received for inspection.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::extract::{Form, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use tigopesa_models::{
    codec, DisburseRequest, DisburseResponse, HealthCheckRequest, HealthCheckResponse,
    PayRequest, PayResponse, PayloadKind, RefundRequest, RefundResponse, TokenRequest,
    TokenResponse, PASSWORD_GRANT,
};
use tracing::{info, warn};

/// Token lifetime when none is configured.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 3600;

/// Disbursements above this amount fail with `TXNSTATUS` 410.
pub const DISBURSE_LIMIT: f64 = 10_000_000.0;

/// Response code of accepted push-pay calls.
pub const ACCEPTED_CODE: &str = "BILLER-18-0000-S";
/// Response code of push-pay calls with an invalid amount.
pub const INVALID_AMOUNT_CODE: &str = "BILLER-18-3011-E";
/// Response code of calls without a valid bearer token.
pub const UNAUTHORIZED_CODE: &str = "BILLER-18-3001-E";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Recorded requests
// ---------------------------------------------------------------------------

/// A request as received by the mock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedRequest {
    /// Headers in arrival order.
    pub headers: Vec<(String, String)>,
    /// Raw body.
    pub body: String,
}

impl RecordedRequest {
    fn capture(headers: &HeaderMap, body: &str) -> Self {
        Self {
            headers: headers
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect(),
            body: body.to_string(),
        }
    }

    /// First value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

// ---------------------------------------------------------------------------
// MockProvider
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Counters {
    token: AtomicUsize,
    disburse: AtomicUsize,
    billpay: AtomicUsize,
    refund: AtomicUsize,
    health: AtomicUsize,
}

#[derive(Default)]
struct Shared {
    counters: Counters,
    sequence: AtomicU64,
    token_failure: Mutex<Option<(String, String)>>,
    issued: Mutex<HashSet<String>>,
    last: Mutex<HashMap<&'static str, RecordedRequest>>,
}

/// Stub provider. Clones share counters, issued tokens and recordings.
#[derive(Clone)]
pub struct MockProvider {
    username: String,
    password: String,
    token_ttl_secs: i64,
    latency: Duration,
    shared: Arc<Shared>,
}

impl MockProvider {
    /// A provider accepting the given API credentials.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
            latency: Duration::ZERO,
            shared: Arc::default(),
        }
    }

    /// Lifetime of issued tokens (`expires_in`).
    #[must_use]
    pub fn with_token_ttl(mut self, seconds: i64) -> Self {
        self.token_ttl_secs = seconds;
        self
    }

    /// Delay applied before answering any request.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Answer every token request with `200 OK` and this error pair.
    pub fn fail_token_requests(&self, code: impl Into<String>, description: impl Into<String>) {
        *lock(&self.shared.token_failure) = Some((code.into(), description.into()));
    }

    /// Stop injecting token errors.
    pub fn clear_token_failure(&self) {
        *lock(&self.shared.token_failure) = None;
    }

    /// Number of `/token` requests received.
    pub fn token_requests(&self) -> usize {
        self.shared.counters.token.load(Ordering::SeqCst)
    }

    /// Number of `/disburse` requests received.
    pub fn disburse_requests(&self) -> usize {
        self.shared.counters.disburse.load(Ordering::SeqCst)
    }

    /// Number of `/billpay` requests received.
    pub fn billpay_requests(&self) -> usize {
        self.shared.counters.billpay.load(Ordering::SeqCst)
    }

    /// Number of `/refund` requests received.
    pub fn refund_requests(&self) -> usize {
        self.shared.counters.refund.load(Ordering::SeqCst)
    }

    /// Number of `/healthcheck` requests received.
    pub fn health_requests(&self) -> usize {
        self.shared.counters.health.load(Ordering::SeqCst)
    }

    /// Last request received on `route` (e.g. `"/billpay"`).
    pub fn last_request(&self, route: &str) -> Option<RecordedRequest> {
        lock(&self.shared.last).get(route).cloned()
    }

    /// The provider's routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/token", post(token))
            .route("/disburse", post(disburse))
            .route("/billpay", post(billpay))
            .route("/refund", post(refund))
            .route("/healthcheck", post(health_check))
            .with_state(self.clone())
    }

    /// Serve on an ephemeral local port; returns the base URL.
    pub async fn spawn(&self) -> std::io::Result<String> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = self.router();
        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                warn!(error = %e, "mock provider stopped");
            }
        });
        Ok(format!("http://{addr}"))
    }

    fn next_sequence(&self) -> u64 {
        self.shared.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn record(&self, route: &'static str, headers: &HeaderMap, body: &str) {
        lock(&self.shared.last).insert(route, RecordedRequest::capture(headers, body));
    }

    async fn pause(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn bearer_valid(&self, headers: &HeaderMap) -> bool {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| {
                value
                    .strip_prefix("bearer ")
                    .or_else(|| value.strip_prefix("Bearer "))
            })
            .is_some_and(|token| lock(&self.shared.issued).contains(token))
    }

    fn credential_headers_valid(&self, headers: &HeaderMap) -> bool {
        let get = |name: &str| headers.get(name).and_then(|value| value.to_str().ok());
        get("username") == Some(self.username.as_str())
            && get("password") == Some(self.password.as_str())
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

fn unauthorized(reference_id: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "ResponseCode": UNAUTHORIZED_CODE,
            "ResponseStatus": false,
            "ResponseDescription": "Invalid or expired access token",
            "ReferenceID": reference_id,
        })),
    )
        .into_response()
}

fn bad_request(error: impl std::fmt::Display) -> Response {
    (StatusCode::BAD_REQUEST, format!("invalid request body: {error}")).into_response()
}

fn xml(status: StatusCode, value: &impl serde::Serialize) -> Response {
    match codec::encode(PayloadKind::Xml, value) {
        Ok(body) => (
            status,
            [(header::CONTENT_TYPE, PayloadKind::Xml.content_type())],
            body,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn token(State(mock): State<MockProvider>, Form(req): Form<TokenRequest>) -> Response {
    mock.shared.counters.token.fetch_add(1, Ordering::SeqCst);
    mock.pause().await;
    info!(username = %req.username, "token request");

    let injected = lock(&mock.shared.token_failure).clone();
    if let Some((error, error_description)) = injected {
        return Json(TokenResponse {
            error,
            error_description,
            ..TokenResponse::default()
        })
        .into_response();
    }

    if req.grant_type != PASSWORD_GRANT {
        return (
            StatusCode::BAD_REQUEST,
            Json(TokenResponse {
                error: "unsupported_grant_type".into(),
                error_description: format!("grant type {:?} is not supported", req.grant_type),
                ..TokenResponse::default()
            }),
        )
            .into_response();
    }
    if req.username != mock.username || req.password != mock.password {
        return (
            StatusCode::BAD_REQUEST,
            Json(TokenResponse {
                error: "invalid_grant".into(),
                error_description: "Provided username and password is incorrect".into(),
                ..TokenResponse::default()
            }),
        )
            .into_response();
    }

    let access_token = format!("mock-{}", uuid::Uuid::new_v4().simple());
    lock(&mock.shared.issued).insert(access_token.clone());
    Json(TokenResponse {
        access_token,
        expires_in: mock.token_ttl_secs,
        token_type: "bearer".into(),
        ..TokenResponse::default()
    })
    .into_response()
}

async fn disburse(State(mock): State<MockProvider>, headers: HeaderMap, body: String) -> Response {
    mock.shared.counters.disburse.fetch_add(1, Ordering::SeqCst);
    mock.record("/disburse", &headers, &body);
    mock.pause().await;

    let req: DisburseRequest = match codec::decode(PayloadKind::Xml, body.as_bytes()) {
        Ok(req) => req,
        Err(e) => return bad_request(e),
    };
    info!(reference = %req.reference_id, amount = req.amount, "disbursement request");

    let (txn_status, message) = if req.msisdn1.trim().is_empty() {
        ("100", "Invalid recipient MSISDN")
    } else if req.amount > DISBURSE_LIMIT {
        ("410", "Amount exceeds the maximum transaction limit")
    } else {
        ("0", "Transaction successful")
    };

    xml(
        StatusCode::OK,
        &DisburseResponse {
            response_type: "RMFCI".into(),
            reference_id: req.reference_id,
            txn_id: format!("MP{:08}", mock.next_sequence()),
            txn_status: txn_status.into(),
            message: message.into(),
        },
    )
}

async fn billpay(State(mock): State<MockProvider>, headers: HeaderMap, body: String) -> Response {
    mock.shared.counters.billpay.fetch_add(1, Ordering::SeqCst);
    mock.record("/billpay", &headers, &body);
    mock.pause().await;

    let req: PayRequest = match codec::decode(PayloadKind::Json, body.as_bytes()) {
        Ok(req) => req,
        Err(e) => return bad_request(e),
    };
    if !mock.bearer_valid(&headers) || !mock.credential_headers_valid(&headers) {
        return unauthorized(&req.reference_id);
    }
    info!(reference = %req.reference_id, amount = req.amount, "bill-pay request");

    if req.amount <= 0.0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(PayResponse {
                response_code: INVALID_AMOUNT_CODE.into(),
                response_status: false,
                response_description: "Invalid amount".into(),
                reference_id: req.reference_id,
                message: String::new(),
            }),
        )
            .into_response();
    }

    Json(PayResponse {
        response_code: ACCEPTED_CODE.into(),
        response_status: true,
        response_description: "Bill pay request accepted, awaiting customer confirmation".into(),
        reference_id: req.reference_id,
        message: "Success".into(),
    })
    .into_response()
}

async fn refund(State(mock): State<MockProvider>, headers: HeaderMap, body: String) -> Response {
    mock.shared.counters.refund.fetch_add(1, Ordering::SeqCst);
    mock.record("/refund", &headers, &body);
    mock.pause().await;

    let req: RefundRequest = match codec::decode(PayloadKind::Json, body.as_bytes()) {
        Ok(req) => req,
        Err(e) => return bad_request(e),
    };
    if !mock.bearer_valid(&headers) {
        return unauthorized(&req.reference_id);
    }
    info!(reference = %req.reference_id, amount = req.amount, "refund request");

    Json(RefundResponse {
        response_code: ACCEPTED_CODE.into(),
        response_status: true,
        response_description: "Refund successful".into(),
        reference_id: req.reference_id,
        dm_reference_id: format!("DM{:08}", mock.next_sequence()),
        message: "Success".into(),
    })
    .into_response()
}

async fn health_check(
    State(mock): State<MockProvider>,
    headers: HeaderMap,
    body: String,
) -> Response {
    mock.shared.counters.health.fetch_add(1, Ordering::SeqCst);
    mock.record("/healthcheck", &headers, &body);
    mock.pause().await;

    let req: HealthCheckRequest = match codec::decode(PayloadKind::Json, body.as_bytes()) {
        Ok(req) => req,
        Err(e) => return bad_request(e),
    };
    if !mock.bearer_valid(&headers) {
        return unauthorized(&req.reference_id);
    }

    Json(HealthCheckResponse {
        reference_id: req.reference_id,
        description: "OK".into(),
    })
    .into_response()
}
