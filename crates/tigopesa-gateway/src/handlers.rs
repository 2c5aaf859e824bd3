//! Sample merchant logic behind the inbound routes.

use std::convert::Infallible;

use tigopesa_models::{ERROR_INVALID_AMOUNT, ERROR_INVALID_CUSTOMER_REF};
use tigopesa_sdk::{
    CallbackRequest, CallbackResponse, InboundHandlers, NameRequest, NameResponse,
    PaymentRequest, PaymentResponse,
};
use tracing::{info, warn};

const MIN_REFERENCE_LEN: usize = 4;
const MAX_REFERENCE_LEN: usize = 20;

/// Customer references are 4 to 20 ASCII digits.
pub fn valid_reference(reference: &str) -> bool {
    (MIN_REFERENCE_LEN..=MAX_REFERENCE_LEN).contains(&reference.len())
        && reference.bytes().all(|b| b.is_ascii_digit())
}

pub fn name_check(req: &NameRequest) -> NameResponse {
    if valid_reference(&req.customer_reference_id) {
        info!(msisdn = %req.msisdn, reference = %req.customer_reference_id, "name check accepted");
        NameResponse::accepted(req, format!("Account {}", req.customer_reference_id))
    } else {
        warn!(msisdn = %req.msisdn, reference = %req.customer_reference_id, "unknown customer reference");
        NameResponse::rejected(req, ERROR_INVALID_CUSTOMER_REF, "Invalid customer reference")
    }
}

pub fn payment(req: &PaymentRequest) -> PaymentResponse {
    if !valid_reference(&req.customer_reference_id) {
        return PaymentResponse::rejected(req, ERROR_INVALID_CUSTOMER_REF, "Invalid customer reference");
    }
    if req.amount <= 0.0 {
        return PaymentResponse::rejected(req, ERROR_INVALID_AMOUNT, "Invalid amount");
    }
    let receipt = uuid::Uuid::new_v4().to_string();
    info!(
        txn_id = %req.txn_id,
        reference = %req.customer_reference_id,
        amount = req.amount,
        receipt = %receipt,
        "payment received"
    );
    PaymentResponse::accepted(req, receipt, "Payment received")
}

pub fn callback(cb: &CallbackRequest) -> CallbackResponse {
    if cb.status {
        info!(reference = %cb.reference_id, mfs_txn = %cb.mfs_transaction_id, amount = cb.amount, "push payment completed");
    } else {
        warn!(reference = %cb.reference_id, description = %cb.description, "push payment failed");
    }
    CallbackResponse::acknowledged(cb.reference_id.clone())
}

/// Handler set registered with the client.
pub fn handlers() -> InboundHandlers {
    InboundHandlers::new()
        .name_check(|req| async move { Ok::<_, Infallible>(name_check(&req)) })
        .payment(|req| async move { Ok::<_, Infallible>(payment(&req)) })
        .callback(|cb| async move { Ok::<_, Infallible>(callback(&cb)) })
}
