//! Capability traits and the orders they accept.
//!
//! Instead of one client type per endpoint variant, each capability is a
//! trait: [`Disburser`] for PIN-authenticated disbursement, [`BillPayer`]
//! for the bearer-token push-pay family and [`TokenSource`] for raw
//! token access. [`crate::DisburseClient`], [`crate::PushClient`] and
//! [`crate::TigoClient`] implement the ones they support.

use std::future::Future;

use tigopesa_models::{DisburseResponse, HealthCheckResponse, PayResponse, RefundResponse};

use crate::error::SdkError;

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Funds to send from the merchant account to a subscriber.
#[derive(Debug, Clone, PartialEq)]
pub struct DisbursementOrder {
    /// Merchant-generated reference.
    pub reference_id: String,
    /// Recipient MSISDN.
    pub msisdn: String,
    /// Amount to send.
    pub amount: f64,
}

impl DisbursementOrder {
    /// A disbursement of `amount` to `msisdn`.
    pub fn new(reference_id: impl Into<String>, msisdn: impl Into<String>, amount: f64) -> Self {
        Self {
            reference_id: reference_id.into(),
            msisdn: msisdn.into(),
            amount,
        }
    }
}

/// Funds to collect from a subscriber through a push prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentOrder {
    /// Merchant-generated reference.
    pub reference_id: String,
    /// Subscriber to charge.
    pub customer_msisdn: String,
    /// Amount to collect.
    pub amount: f64,
    /// Text shown on the subscriber's handset.
    pub remarks: String,
}

impl PaymentOrder {
    /// A push payment of `amount` from `customer_msisdn`.
    pub fn new(
        reference_id: impl Into<String>,
        customer_msisdn: impl Into<String>,
        amount: f64,
    ) -> Self {
        Self {
            reference_id: reference_id.into(),
            customer_msisdn: customer_msisdn.into(),
            amount,
            remarks: String::new(),
        }
    }

    /// Set the remarks shown to the subscriber.
    #[must_use]
    pub fn remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = remarks.into();
        self
    }
}

/// Refund of an earlier push payment.
#[derive(Debug, Clone, PartialEq)]
pub struct RefundOrder {
    /// Reference of this refund.
    pub reference_id: String,
    /// Subscriber being refunded.
    pub customer_msisdn: String,
    /// Amount to refund.
    pub amount: f64,
    /// Provider transaction id of the original payment.
    pub mfs_transaction_id: String,
    /// Reference of the original payment.
    pub purchase_reference_id: String,
}

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// PIN-authenticated disbursement.
pub trait Disburser {
    /// Send funds to a subscriber.
    ///
    /// A decoded response may still report a failed transaction; check
    /// [`DisburseResponse::is_success`].
    fn disburse(
        &self,
        order: DisbursementOrder,
    ) -> impl Future<Output = Result<DisburseResponse, SdkError>> + Send;
}

/// Bearer-token push-pay operations.
pub trait BillPayer {
    /// Prompt a subscriber to pay.
    fn pay(&self, order: PaymentOrder)
        -> impl Future<Output = Result<PayResponse, SdkError>> + Send;

    /// Refund an earlier payment.
    fn refund(
        &self,
        order: RefundOrder,
    ) -> impl Future<Output = Result<RefundResponse, SdkError>> + Send;

    /// Check that the push-pay service is up.
    fn health_check(
        &self,
        reference_id: String,
    ) -> impl Future<Output = Result<HealthCheckResponse, SdkError>> + Send;
}

/// Access to the bearer token itself.
pub trait TokenSource {
    /// A token valid for at least the refresh margin.
    fn token(&self) -> impl Future<Output = Result<String, SdkError>> + Send;
}
