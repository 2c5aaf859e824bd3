//! Push-pay (bill-pay) API messages (JSON).
//!
//! The merchant asks the provider to pull funds from a subscriber wallet
//! ([`PayRequest`]); the subscriber confirms on their handset and the
//! provider later reports the outcome through a [`CallbackRequest`].
//! The same API family also offers refunds and a health check.
//!
//! Business failures are reported inside successfully-decoded bodies
//! (`ResponseStatus: false`), never as transport errors.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Bill pay
// ---------------------------------------------------------------------------

/// Push-pay request.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PayRequest {
    /// Subscriber to be charged.
    #[serde(rename = "CustomerMSISDN")]
    pub customer_msisdn: String,
    /// Merchant (biller) MSISDN receiving the funds.
    #[serde(rename = "BillerMSISDN")]
    pub biller_msisdn: String,
    /// Amount to collect.
    #[serde(rename = "Amount", with = "crate::amount::json")]
    pub amount: f64,
    /// Text shown to the subscriber.
    #[serde(rename = "Remarks")]
    pub remarks: String,
    /// Merchant-generated reference.
    #[serde(rename = "ReferenceID")]
    pub reference_id: String,
}

/// Push-pay response.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PayResponse {
    /// Provider response code.
    #[serde(rename = "ResponseCode")]
    pub response_code: String,
    /// `true` when the push was accepted.
    #[serde(rename = "ResponseStatus")]
    pub response_status: bool,
    /// Description of the response code.
    #[serde(rename = "ResponseDescription")]
    pub response_description: String,
    /// The request's reference.
    #[serde(rename = "ReferenceID")]
    pub reference_id: String,
    /// Free-text message.
    #[serde(rename = "Message")]
    pub message: String,
}

// ---------------------------------------------------------------------------
// Refund
// ---------------------------------------------------------------------------

/// Refund of an earlier push payment.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct RefundRequest {
    /// Subscriber being refunded.
    #[serde(rename = "CustomerMSISDN")]
    pub customer_msisdn: String,
    /// Merchant channel MSISDN.
    #[serde(rename = "ChannelMSISDN")]
    pub channel_msisdn: String,
    /// Merchant channel PIN.
    #[serde(rename = "ChannelPIN")]
    pub channel_pin: String,
    /// Amount to refund.
    #[serde(rename = "Amount", with = "crate::amount::json")]
    pub amount: f64,
    /// Provider transaction id of the payment being refunded.
    #[serde(rename = "MFSTransactionID")]
    pub mfs_transaction_id: String,
    /// Reference for this refund.
    #[serde(rename = "ReferenceID")]
    pub reference_id: String,
    /// Reference of the original purchase.
    #[serde(rename = "PurchaseReferenceID")]
    pub purchase_reference_id: String,
}

/// Refund response.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RefundResponse {
    /// Provider response code.
    #[serde(rename = "ResponseCode")]
    pub response_code: String,
    /// `true` when the refund was accepted.
    #[serde(rename = "ResponseStatus")]
    pub response_status: bool,
    /// Description of the response code.
    #[serde(rename = "ResponseDescription")]
    pub response_description: String,
    /// The request's reference.
    #[serde(rename = "ReferenceID")]
    pub reference_id: String,
    /// Provider-side reference of the refund.
    #[serde(rename = "DMReferenceID")]
    pub dm_reference_id: String,
    /// Free-text message.
    #[serde(rename = "Message")]
    pub message: String,
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Health-check request.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct HealthCheckRequest {
    /// Caller reference echoed back.
    #[serde(rename = "ReferenceID")]
    pub reference_id: String,
}

/// Health-check response.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct HealthCheckResponse {
    /// Echo of the request reference.
    #[serde(rename = "ReferenceID")]
    pub reference_id: String,
    /// Service state.
    #[serde(rename = "Description")]
    pub description: String,
}

// ---------------------------------------------------------------------------
// Payment callback (provider → merchant)
// ---------------------------------------------------------------------------

/// Outcome of a push payment, posted by the provider to the merchant.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct CallbackRequest {
    /// `true` when the subscriber paid.
    #[serde(rename = "Status")]
    pub status: bool,
    /// Provider description of the outcome.
    #[serde(rename = "Description")]
    pub description: String,
    /// Provider transaction id.
    #[serde(rename = "MFSTransactionID")]
    pub mfs_transaction_id: String,
    /// Merchant reference of the original push.
    #[serde(rename = "ReferenceID")]
    pub reference_id: String,
    /// Amount paid.
    #[serde(rename = "Amount", with = "crate::amount::json")]
    pub amount: f64,
}

/// Merchant acknowledgement of a [`CallbackRequest`].
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct CallbackResponse {
    /// Merchant response code.
    #[serde(rename = "ResponseCode")]
    pub response_code: String,
    /// `true` when the callback was processed.
    #[serde(rename = "ResponseStatus")]
    pub response_status: bool,
    /// Description of the response code.
    #[serde(rename = "ResponseDescription")]
    pub response_description: String,
    /// Echo of the callback's reference.
    #[serde(rename = "ReferenceID")]
    pub reference_id: String,
}

/// Response code used when acknowledging a callback.
pub const CALLBACK_SUCCESS_CODE: &str = "BILLER-18-0000-S";

/// Response code used when a callback could not be processed.
pub const CALLBACK_FAILURE_CODE: &str = "BILLER-18-3020-E";

impl CallbackResponse {
    /// Positive acknowledgement for the callback carrying `reference_id`.
    pub fn acknowledged(reference_id: impl Into<String>) -> Self {
        Self {
            response_code: CALLBACK_SUCCESS_CODE.into(),
            response_status: true,
            response_description: "Callback successful".into(),
            reference_id: reference_id.into(),
        }
    }

    /// Negative acknowledgement with a reason.
    pub fn rejected(reference_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            response_code: CALLBACK_FAILURE_CODE.into(),
            response_status: false,
            response_description: reason.into(),
            reference_id: reference_id.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
