//! Provider-initiated wallet/account messages (XML).
//!
//! Two synchronous calls arrive from the provider:
//!
//! * **Name check** — resolve a customer reference before the subscriber
//!   confirms a payment ([`NameRequest`] → [`NameResponse`]).
//! * **Wallet-to-account payment** — the subscriber has paid into the
//!   merchant account and the merchant must acknowledge it
//!   ([`PaymentRequest`] → [`PaymentResponse`]).

use serde::{Deserialize, Serialize};

use crate::status::{ResultFlag, YesNo, ERROR_SUCCESS};

/// `TYPE` of an inbound name-check request.
pub const NAME_CHECK_REQUEST_TYPE: &str = "SYNC_LOOKUP_REQUEST";
/// `TYPE` of a name-check response.
pub const NAME_CHECK_RESPONSE_TYPE: &str = "SYNC_LOOKUP_RESPONSE";
/// `TYPE` of an inbound wallet-to-account payment request.
pub const PAYMENT_REQUEST_TYPE: &str = "SYNC_BILLPAY_REQUEST";
/// `TYPE` of a wallet-to-account payment response.
pub const PAYMENT_RESPONSE_TYPE: &str = "SYNC_BILLPAY_RESPONSE";

// ---------------------------------------------------------------------------
// Name check
// ---------------------------------------------------------------------------

/// Name-check request from the provider.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct NameRequest {
    /// Normally [`NAME_CHECK_REQUEST_TYPE`].
    #[serde(rename = "TYPE")]
    pub request_type: String,
    /// Subscriber MSISDN.
    #[serde(rename = "MSISDN")]
    pub msisdn: String,
    /// Merchant name registered with the provider.
    #[serde(rename = "COMPANYNAME")]
    pub company_name: String,
    /// Reference entered by the subscriber.
    #[serde(rename = "CUSTOMERREFERENCEID")]
    pub customer_reference_id: String,
}

/// Merchant answer to a [`NameRequest`].
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct NameResponse {
    /// Normally [`NAME_CHECK_RESPONSE_TYPE`].
    #[serde(rename = "TYPE")]
    pub response_type: String,
    /// `TS` or `TF`.
    #[serde(rename = "RESULT")]
    pub result: String,
    /// Merchant error code (`error000` on success).
    #[serde(rename = "ERRORCODE")]
    pub error_code: String,
    /// Merchant error description.
    #[serde(rename = "ERRORDESC")]
    pub error_desc: String,
    /// Echo of the subscriber MSISDN.
    #[serde(rename = "MSISDN")]
    pub msisdn: String,
    /// `Y` when the reference is valid.
    #[serde(rename = "FLAG")]
    pub flag: String,
    /// Text shown to the subscriber (usually the resolved name).
    #[serde(rename = "CONTENT")]
    pub content: String,
}

impl NameResponse {
    /// A successful lookup showing `content` to the subscriber.
    pub fn accepted(request: &NameRequest, content: impl Into<String>) -> Self {
        Self {
            response_type: NAME_CHECK_RESPONSE_TYPE.into(),
            result: ResultFlag::Success.to_string(),
            error_code: ERROR_SUCCESS.into(),
            error_desc: String::new(),
            msisdn: request.msisdn.clone(),
            flag: YesNo::Yes.to_string(),
            content: content.into(),
        }
    }

    /// A failed lookup with an error code and description.
    pub fn rejected(
        request: &NameRequest,
        error_code: impl Into<String>,
        error_desc: impl Into<String>,
    ) -> Self {
        let error_desc = error_desc.into();
        Self {
            response_type: NAME_CHECK_RESPONSE_TYPE.into(),
            result: ResultFlag::Failure.to_string(),
            error_code: error_code.into(),
            content: error_desc.clone(),
            error_desc,
            msisdn: request.msisdn.clone(),
            flag: YesNo::No.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Wallet-to-account payment
// ---------------------------------------------------------------------------

/// Wallet-to-account payment notification from the provider.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct PaymentRequest {
    /// Normally [`PAYMENT_REQUEST_TYPE`].
    #[serde(rename = "TYPE")]
    pub request_type: String,
    /// Provider transaction id.
    #[serde(rename = "TXNID")]
    pub txn_id: String,
    /// Paying subscriber.
    #[serde(rename = "MSISDN")]
    pub msisdn: String,
    /// Amount paid.
    #[serde(rename = "AMOUNT", with = "crate::amount::xml")]
    pub amount: f64,
    /// Merchant name registered with the provider.
    #[serde(rename = "COMPANYNAME")]
    pub company_name: String,
    /// Reference entered by the subscriber.
    #[serde(rename = "CUSTOMERREFERENCEID")]
    pub customer_reference_id: String,
    /// Name of the paying subscriber.
    #[serde(rename = "SENDERNAME")]
    pub sender_name: String,
}

/// Merchant acknowledgement of a [`PaymentRequest`].
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct PaymentResponse {
    /// Normally [`PAYMENT_RESPONSE_TYPE`].
    #[serde(rename = "TYPE")]
    pub response_type: String,
    /// Echo of the provider transaction id.
    #[serde(rename = "TXNID")]
    pub txn_id: String,
    /// Merchant-side reference for the receipt.
    #[serde(rename = "REFID")]
    pub ref_id: String,
    /// `TS` or `TF`.
    #[serde(rename = "RESULT")]
    pub result: String,
    /// Merchant error code (`error000` on success).
    #[serde(rename = "ERRORCODE")]
    pub error_code: String,
    /// Short error description, only sent when set.
    #[serde(rename = "ERRORDESC", skip_serializing_if = "String::is_empty")]
    pub error_desc: String,
    /// Merchant error description.
    #[serde(rename = "ERRORDESCRIPTION")]
    pub error_description: String,
    /// Echo of the subscriber MSISDN.
    #[serde(rename = "MSISDN")]
    pub msisdn: String,
    /// `Y` when the payment was accepted.
    #[serde(rename = "FLAG")]
    pub flag: String,
    /// Text shown to the subscriber.
    #[serde(rename = "CONTENT")]
    pub content: String,
}

impl PaymentResponse {
    /// Accept the payment, issuing the merchant receipt `ref_id`.
    pub fn accepted(
        request: &PaymentRequest,
        ref_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            response_type: PAYMENT_RESPONSE_TYPE.into(),
            txn_id: request.txn_id.clone(),
            ref_id: ref_id.into(),
            result: ResultFlag::Success.to_string(),
            error_code: ERROR_SUCCESS.into(),
            error_desc: String::new(),
            error_description: String::new(),
            msisdn: request.msisdn.clone(),
            flag: YesNo::Yes.to_string(),
            content: content.into(),
        }
    }

    /// Reject the payment with an error code and description.
    pub fn rejected(
        request: &PaymentRequest,
        error_code: impl Into<String>,
        error_description: impl Into<String>,
    ) -> Self {
        let error_description = error_description.into();
        Self {
            response_type: PAYMENT_RESPONSE_TYPE.into(),
            txn_id: request.txn_id.clone(),
            ref_id: String::new(),
            result: ResultFlag::Failure.to_string(),
            error_code: error_code.into(),
            error_desc: String::new(),
            content: error_description.clone(),
            error_description,
            msisdn: request.msisdn.clone(),
            flag: YesNo::No.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
