//! # Tigo Pesa SDK
//!
//! Client/server SDK for the **Tigo Pesa** mobile-money gateway.
//!
//! The SDK provides:
//!
//! * [`TigoClient`] — one handle over every endpoint family: disbursement,
//!   push-pay (bill-pay, refund, health check) and the inbound wallet
//!   routes the provider calls back into.
//! * [`HttpTransport`] — executes [`RequestDescriptor`]s with a per-call
//!   deadline, decodes bodies by content type and optionally dumps
//!   traffic for debugging.
//! * [`TokenCache`] — bearer-token cache refreshed lazily, at most one
//!   refresh in flight.
//! * [`Dispatcher`] — decodes a provider request, runs a caller-supplied
//!   handler and encodes its answer; shared by every inbound route.
//! * [`SdkError`] — unified error type for outbound operations.
//!
//! Wire types from [`tigopesa_models`] are re-exported for convenience.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use tigopesa_sdk::{Config, DisbursementOrder, Disburser, InboundHandlers, NameResponse, TigoClient};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let handlers = InboundHandlers::new().name_check(|req| async move {
//!     Ok::<_, std::convert::Infallible>(NameResponse::accepted(&req, "Jane Doe"))
//! });
//! let client = TigoClient::new(Config::from_env(), handlers)?;
//!
//! // Provider-bound call
//! let receipt = client
//!     .disburse(DisbursementOrder::new("REF-001", "255765000000", 1000.0))
//!     .await?;
//! println!("disbursement status: {}", receipt.status_description());
//!
//! // Provider callbacks
//! let app = client.router();
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3001").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

pub mod cancel;
pub mod client;
pub mod config;
pub mod debug;
pub mod disburse;
pub mod error;
pub mod inbound;
pub mod push;
pub mod request;
pub mod service;
pub mod token;
pub mod transport;
pub mod wallet;

pub use cancel::CancelScope;
pub use client::TigoClient;
pub use config::{ClientOptions, Config, Credentials, DisburseConfig, InboundConfig, PushConfig};
pub use debug::{DebugEntry, DebugLog, DebugSink, TracingSink};
pub use disburse::DisburseClient;
pub use error::{HandlerError, InboundError, SdkError};
pub use inbound::{handler_fn, Dispatcher, HandlerFn, InboundHandlers};
pub use push::PushClient;
pub use request::{Headers, RequestBuilder, RequestDescriptor};
pub use service::{BillPayer, DisbursementOrder, Disburser, PaymentOrder, RefundOrder, TokenSource};
pub use token::{AuthToken, TokenCache};
pub use transport::{HttpTransport, ResponseEnvelope};
pub use wallet::WalletAccount;

// Re-export wire types from tigopesa-models for ergonomic usage.
pub use tigopesa_models::{
    CallbackRequest, CallbackResponse, DisburseResponse, HealthCheckResponse, NameRequest,
    NameResponse, PayResponse, PayloadKind, PaymentRequest, PaymentResponse, RefundResponse,
};
