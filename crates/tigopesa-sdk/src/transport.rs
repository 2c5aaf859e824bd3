//! HTTP transport.
//!
//! [`HttpTransport`] executes a [`RequestDescriptor`] and decodes the
//! response body by its `Content-Type`, whatever the status code:
//! providers report business errors inside 4xx/5xx bodies too. Nothing
//! is retried.
//!
//! Each call gets a fresh deadline of the configured timeout and races
//! the client's [`CancelScope`]; dropping the returned future aborts the
//! request as well.

use std::future::Future;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tigopesa_models::codec;
use tracing::debug;

use crate::cancel::CancelScope;
use crate::config::ClientOptions;
use crate::debug::{header_pairs, render_request, render_response, DebugEntry, DebugLog};
use crate::error::SdkError;
use crate::request::{RequestDescriptor, AUTHORIZATION};
use crate::token::TokenCache;

/// A received response with its decoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEnvelope<T> {
    /// HTTP status code.
    pub status: StatusCode,
    /// `Content-Type` of the response, as received.
    pub content_type: Option<String>,
    /// Decoded body, or `T::default()` when the body was empty or its
    /// content type unrecognised.
    pub payload: T,
}

/// Shared HTTP client with timeout, cancellation and debug dumps.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    timeout: Duration,
    debug: DebugLog,
    cancel: CancelScope,
}

impl HttpTransport {
    /// Build a transport from client options.
    pub fn new(options: &ClientOptions) -> Result<Self, SdkError> {
        let http = match options.custom_http_client() {
            Some(client) => client,
            None => reqwest::Client::builder()
                .build()
                .map_err(|e| SdkError::Config(format!("could not build HTTP client: {e}")))?,
        };
        let debug = if options.is_debug() {
            DebugLog::new(options.sink())
        } else {
            DebugLog::disabled()
        };
        Ok(Self {
            http,
            timeout: options.timeout_duration(),
            debug,
            cancel: options.scope().clone(),
        })
    }

    /// Per-call timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Debug log shared with inbound dispatchers.
    pub fn debug_log(&self) -> &DebugLog {
        &self.debug
    }

    /// Cancellation scope raced by every call.
    pub fn cancel_scope(&self) -> &CancelScope {
        &self.cancel
    }

    /// Execute `request` and decode the response into `T`.
    pub async fn send<T>(&self, request: RequestDescriptor) -> Result<ResponseEnvelope<T>, SdkError>
    where
        T: DeserializeOwned + Default,
    {
        self.bounded(self.execute(request)).await
    }

    /// Execute `request` with an `Authorization: bearer <token>` header,
    /// obtaining or refreshing the token from `tokens` first.
    pub async fn send_authenticated<T>(
        &self,
        tokens: &TokenCache,
        request: RequestDescriptor,
    ) -> Result<ResponseEnvelope<T>, SdkError>
    where
        T: DeserializeOwned + Default,
    {
        let token = tokens.get_token(self).await?;
        let request = request.with_header(AUTHORIZATION, format!("bearer {token}"));
        self.send(request).await
    }

    async fn bounded<F, R>(&self, call: F) -> Result<R, SdkError>
    where
        F: Future<Output = Result<R, SdkError>>,
    {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => Err(SdkError::Cancelled),
            result = tokio::time::timeout(self.timeout, call) => {
                result.unwrap_or_else(|_| Err(SdkError::Timeout(self.timeout)))
            }
        }
    }

    async fn execute<T>(&self, request: RequestDescriptor) -> Result<ResponseEnvelope<T>, SdkError>
    where
        T: DeserializeOwned + Default,
    {
        let body = request.body().unwrap_or_default();
        if self.debug.is_enabled() {
            let headers = request
                .headers()
                .iter()
                .map(|(name, value)| (name.as_str(), value.as_str()));
            self.debug.log(DebugEntry::new(
                "outbound request",
                render_request(request.method().as_str(), request.url(), headers, body),
            ));
        }

        let mut builder = self.http.request(request.method().clone(), request.url());
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if request.body().is_some() {
            builder = builder.body(body.to_vec());
        }

        let response = builder.send().await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let headers = self.debug.is_enabled().then(|| response.headers().clone());
        let bytes = response.bytes().await?;

        if let Some(headers) = headers {
            self.debug.log(DebugEntry::new(
                "outbound response",
                render_response(status.as_u16(), header_pairs(&headers), &bytes),
            ));
        }
        debug!(
            method = %request.method(),
            url = request.url(),
            %status,
            bytes = bytes.len(),
            "provider responded"
        );

        let payload = codec::decode_response(content_type.as_deref(), &bytes)?;
        Ok(ResponseEnvelope {
            status,
            content_type,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::DebugSink;
    use axum::http::header;
    use axum::routing::post;
    use axum::Router;
    use reqwest::Method;
    use serde::Deserialize;
    use std::sync::{Arc, Mutex};
    use tigopesa_models::{HealthCheckRequest, HealthCheckResponse, PayloadKind};

    #[derive(Deserialize, Debug, Default, PartialEq)]
    #[serde(default)]
    struct Status {
        #[serde(rename = "ResponseCode")]
        code: String,
    }

    #[derive(Clone, Default)]
    struct Collect(Arc<Mutex<Vec<DebugEntry>>>);

    impl DebugSink for Collect {
        fn write(&self, entry: &DebugEntry) {
            self.0.lock().unwrap().push(entry.clone());
        }
    }

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    fn json_post(url: String) -> RequestDescriptor {
        RequestDescriptor::builder(Method::POST, url, PayloadKind::Json)
            .payload(&HealthCheckRequest {
                reference_id: "HC1".into(),
            })
            .build()
            .unwrap()
    }

    fn transport() -> HttpTransport {
        HttpTransport::new(&ClientOptions::new()).unwrap()
    }

    #[tokio::test]
    async fn health_check_roundtrip_against_stub() {
        let app = Router::new().route(
            "/hc",
            post(|body: String| async move {
                assert_eq!(body, r#"{"ReferenceID":"HC1"}"#);
                (
                    [(header::CONTENT_TYPE, "application/json")],
                    r#"{"ReferenceID":"HC1","Description":"OK"}"#,
                )
            }),
        );
        let base = serve(app).await;

        let response = transport()
            .send::<HealthCheckResponse>(json_post(format!("{base}/hc")))
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.payload,
            HealthCheckResponse {
                reference_id: "HC1".into(),
                description: "OK".into(),
            }
        );
    }

    #[tokio::test]
    async fn error_status_bodies_are_decoded() {
        let app = Router::new().route(
            "/fail",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
                    r#"{"ResponseCode":"BILLER-18-3019-E"}"#,
                )
            }),
        );
        let base = serve(app).await;

        let response = transport()
            .send::<Status>(json_post(format!("{base}/fail")))
            .await
            .unwrap();
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.payload.code, "BILLER-18-3019-E");
    }

    #[tokio::test]
    async fn unknown_content_type_skips_decode() {
        let app = Router::new().route(
            "/html",
            post(|| async { ([(header::CONTENT_TYPE, "text/html")], "<html>not json</html>") }),
        );
        let base = serve(app).await;

        let response = transport()
            .send::<Status>(json_post(format!("{base}/html")))
            .await
            .unwrap();
        assert_eq!(response.payload, Status::default());
        assert_eq!(response.content_type.as_deref(), Some("text/html"));
    }

    #[tokio::test]
    async fn empty_body_is_not_an_error() {
        let app = Router::new().route(
            "/empty",
            post(|| async { [(header::CONTENT_TYPE, "application/json")] }),
        );
        let base = serve(app).await;

        let response = transport()
            .send::<Status>(json_post(format!("{base}/empty")))
            .await
            .unwrap();
        assert_eq!(response.payload, Status::default());
    }

    #[tokio::test]
    async fn malformed_body_is_a_codec_error() {
        let app = Router::new().route(
            "/bad",
            post(|| async { ([(header::CONTENT_TYPE, "application/json")], "{not json") }),
        );
        let base = serve(app).await;

        let err = transport()
            .send::<Status>(json_post(format!("{base}/bad")))
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Codec(_)), "{err:?}");
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let app = Router::new().route(
            "/slow",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
        let base = serve(app).await;
        let transport =
            HttpTransport::new(&ClientOptions::new().timeout(Duration::from_millis(100))).unwrap();

        let err = transport
            .send::<Status>(json_post(format!("{base}/slow")))
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Timeout(_)), "{err:?}");
    }

    #[tokio::test]
    async fn cancellation_aborts_in_flight_call() {
        let app = Router::new().route(
            "/slow",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
        let base = serve(app).await;
        let scope = CancelScope::new();
        let transport = HttpTransport::new(&ClientOptions::new().cancel_scope(scope.clone())).unwrap();

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            scope.cancel();
        });
        let err = transport
            .send::<Status>(json_post(format!("{base}/slow")))
            .await
            .unwrap_err();
        canceller.await.unwrap();
        assert!(matches!(err, SdkError::Cancelled), "{err:?}");
    }

    #[tokio::test]
    async fn connection_failure_is_http_error() {
        let err = transport()
            .send::<Status>(json_post("http://127.0.0.1:9/nothing".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Http(_)), "{err:?}");
    }

    #[tokio::test]
    async fn debug_mode_dumps_without_altering_body() {
        let app = Router::new().route(
            "/echo",
            post(|body: String| async move { ([(header::CONTENT_TYPE, "application/json")], body) }),
        );
        let base = serve(app).await;
        let sink = Collect::default();
        let transport =
            HttpTransport::new(&ClientOptions::new().debug(true).debug_sink(sink.clone())).unwrap();

        let response = transport
            .send::<HealthCheckResponse>(json_post(format!("{base}/echo")))
            .await
            .unwrap();
        assert_eq!(response.payload.reference_id, "HC1");

        for _ in 0..50 {
            if sink.0.lock().unwrap().len() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let entries = sink.0.lock().unwrap().clone();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].label, "outbound request");
        assert!(entries[0].dump.contains(r#"{"ReferenceID":"HC1"}"#));
        assert_eq!(entries[1].label, "outbound response");
        assert!(entries[1].dump.starts_with("HTTP/1.1 200"));
    }
}
