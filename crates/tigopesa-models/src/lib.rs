#![deny(missing_docs)]

//! # Tigo Pesa Models
//!
//! Wire-level message types for the Tigo Pesa mobile-money gateway and the
//! codec that turns them into bytes.
//!
//! ## Message families
//!
//! ```text
//! SDK → provider
//! ├── TokenRequest (form)        → TokenResponse (JSON)
//! ├── DisburseRequest (XML)      → DisburseResponse (XML)
//! ├── PayRequest (JSON)          → PayResponse (JSON)
//! ├── RefundRequest (JSON)       → RefundResponse (JSON)
//! └── HealthCheckRequest (JSON)  → HealthCheckResponse (JSON)
//!
//! provider → SDK
//! ├── NameRequest (XML)          → NameResponse (XML)
//! ├── PaymentRequest (XML)       → PaymentResponse (XML)
//! └── CallbackRequest (JSON)     → CallbackResponse (JSON)
//! ```
//!
//! ## Module layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`codec`] | `PayloadKind`, `encode`, `decode`, `decode_response` |
//! | [`token`] | Password-grant token exchange |
//! | [`disburse`] | Merchant → subscriber disbursement |
//! | [`push`] | Push-pay (bill-pay), refund, health check, payment callback |
//! | [`wallet`] | Name-check and wallet-to-account payment notifications |
//! | [`status`] | Result flags, error codes and `TXNSTATUS` descriptions |

pub mod amount;
pub mod codec;
pub mod disburse;
pub mod error;
pub mod push;
pub mod status;
pub mod token;
pub mod wallet;

// Re-export all public types at crate root for convenience.
pub use codec::*;
pub use disburse::*;
pub use error::*;
pub use push::*;
pub use status::*;
pub use token::*;
pub use wallet::*;
