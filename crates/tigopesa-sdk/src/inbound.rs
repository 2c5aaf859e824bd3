//! Provider-initiated routes.
//!
//! A [`Dispatcher`] serves one route: it decodes the body into the
//! route's request type, runs the caller's handler under the client
//! timeout and encodes the handler's answer with the route's payload
//! kind. Decode errors, handler errors and timeouts become HTTP 500 with
//! a plain-text body (see [`InboundError`]); the handler is never called
//! for a body that does not decode.
//!
//! Handlers are registered with [`InboundHandlers`] and mounted by
//! [`crate::TigoClient::router`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::http::{header, HeaderMap, Method, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{post, MethodRouter};
use futures::future::BoxFuture;
use futures::{FutureExt, TryFutureExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tigopesa_models::{
    codec, CallbackRequest, CallbackResponse, NameRequest, NameResponse, PayloadKind,
    PaymentRequest, PaymentResponse,
};
use tracing::debug;

use crate::cancel::CancelScope;
use crate::config::DEFAULT_TIMEOUT;
use crate::debug::{header_pairs, render_request, render_response, DebugEntry, DebugLog};
use crate::error::{HandlerError, InboundError};
use crate::transport::HttpTransport;

/// Boxed future returned by a [`HandlerFn`].
pub type HandlerFuture<Resp> = BoxFuture<'static, Result<Resp, HandlerError>>;

/// Type-erased inbound handler.
pub type HandlerFn<Req, Resp> = Arc<dyn Fn(Req) -> HandlerFuture<Resp> + Send + Sync>;

/// Erase an async closure into a [`HandlerFn`].
pub fn handler_fn<Req, Resp, F, Fut, E>(handler: F) -> HandlerFn<Req, Resp>
where
    Req: 'static,
    Resp: 'static,
    F: Fn(Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Resp, E>> + Send + 'static,
    E: Into<HandlerError> + 'static,
{
    Arc::new(move |request: Req| -> HandlerFuture<Resp> {
        handler(request).map_err(Into::into).boxed()
    })
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Decode → handle → encode for one inbound route.
pub struct Dispatcher<Req, Resp> {
    route: &'static str,
    kind: PayloadKind,
    handler: HandlerFn<Req, Resp>,
    timeout: Duration,
    debug: DebugLog,
    cancel: CancelScope,
}

impl<Req, Resp> Dispatcher<Req, Resp>
where
    Req: DeserializeOwned + Send + 'static,
    Resp: Serialize + Send + 'static,
{
    /// A dispatcher for `route` exchanging `kind` payloads.
    ///
    /// Uses the default timeout, no debug dumps and a private
    /// cancellation scope until configured otherwise.
    pub fn new(route: &'static str, kind: PayloadKind, handler: HandlerFn<Req, Resp>) -> Self {
        Self {
            route,
            kind,
            handler,
            timeout: DEFAULT_TIMEOUT,
            debug: DebugLog::disabled(),
            cancel: CancelScope::new(),
        }
    }

    /// Share timeout, debug log and cancellation scope with `transport`.
    #[must_use]
    pub fn bound_to(mut self, transport: &HttpTransport) -> Self {
        self.timeout = transport.timeout();
        self.debug = transport.debug_log().clone();
        self.cancel = transport.cancel_scope().clone();
        self
    }

    /// Handler deadline.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Serve one request.
    pub async fn dispatch(
        &self,
        method: &Method,
        uri: &Uri,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Response {
        if self.debug.is_enabled() {
            self.debug.log(DebugEntry::new(
                "inbound request",
                render_request(method.as_str(), &uri.to_string(), header_pairs(headers), &body),
            ));
        }

        match self.process(&body).await {
            Ok(encoded) => {
                let content_type = self.kind.content_type();
                if self.debug.is_enabled() {
                    self.debug.log(DebugEntry::new(
                        "inbound response",
                        render_response(200, [("Content-Type", content_type)], &encoded),
                    ));
                }
                debug!(route = self.route, bytes = encoded.len(), "inbound request handled");
                ([(header::CONTENT_TYPE, content_type)], encoded).into_response()
            }
            Err(err) => err.into_response(),
        }
    }

    async fn process(&self, body: &[u8]) -> Result<Vec<u8>, InboundError> {
        let request: Req = codec::decode(self.kind, body).map_err(InboundError::Decode)?;
        let call = (self.handler)(request);

        let response = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Err(InboundError::Cancelled),
            result = tokio::time::timeout(self.timeout, call) => result
                .map_err(|_| InboundError::Timeout(self.timeout))?
                .map_err(InboundError::Handler)?,
        };

        codec::encode(self.kind, &response).map_err(InboundError::Encode)
    }

    /// Mount as a `POST` route.
    pub fn into_route<S>(self) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let dispatcher = Arc::new(self);
        post(move |method: Method, uri: Uri, headers: HeaderMap, body: Bytes| {
            let dispatcher = Arc::clone(&dispatcher);
            async move { dispatcher.dispatch(&method, &uri, &headers, body).await }
        })
    }
}

// ---------------------------------------------------------------------------
// InboundHandlers
// ---------------------------------------------------------------------------

/// Handlers for the provider-initiated routes; unregistered routes are not mounted.
///
/// ```
/// use tigopesa_sdk::{CallbackResponse, InboundHandlers};
///
/// let handlers = InboundHandlers::new().callback(|cb| async move {
///     Ok::<_, std::convert::Infallible>(CallbackResponse::acknowledged(cb.reference_id))
/// });
/// assert!(handlers.has_callback());
/// assert!(!handlers.has_name_check());
/// ```
#[derive(Clone, Default)]
pub struct InboundHandlers {
    pub(crate) name_check: Option<HandlerFn<NameRequest, NameResponse>>,
    pub(crate) payment: Option<HandlerFn<PaymentRequest, PaymentResponse>>,
    pub(crate) callback: Option<HandlerFn<CallbackRequest, CallbackResponse>>,
}

impl InboundHandlers {
    /// No handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle name-check lookups (XML).
    #[must_use]
    pub fn name_check<F, Fut, E>(mut self, handler: F) -> Self
    where
        F: Fn(NameRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<NameResponse, E>> + Send + 'static,
        E: Into<HandlerError> + 'static,
    {
        self.name_check = Some(handler_fn(handler));
        debug!("name-check handler registered");
        self
    }

    /// Handle wallet-to-account payments (XML).
    #[must_use]
    pub fn payment<F, Fut, E>(mut self, handler: F) -> Self
    where
        F: Fn(PaymentRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<PaymentResponse, E>> + Send + 'static,
        E: Into<HandlerError> + 'static,
    {
        self.payment = Some(handler_fn(handler));
        debug!("payment handler registered");
        self
    }

    /// Handle push-pay callbacks (JSON).
    #[must_use]
    pub fn callback<F, Fut, E>(mut self, handler: F) -> Self
    where
        F: Fn(CallbackRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<CallbackResponse, E>> + Send + 'static,
        E: Into<HandlerError> + 'static,
    {
        self.callback = Some(handler_fn(handler));
        debug!("callback handler registered");
        self
    }

    /// Whether a name-check handler is registered.
    pub fn has_name_check(&self) -> bool {
        self.name_check.is_some()
    }

    /// Whether a payment handler is registered.
    pub fn has_payment(&self) -> bool {
        self.payment.is_some()
    }

    /// Whether a callback handler is registered.
    pub fn has_callback(&self) -> bool {
        self.callback.is_some()
    }
}

impl std::fmt::Debug for InboundHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InboundHandlers")
            .field("name_check", &self.has_name_check())
            .field("payment", &self.has_payment())
            .field("callback", &self.has_callback())
            .finish()
    }
}
