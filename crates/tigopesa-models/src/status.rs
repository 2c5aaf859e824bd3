//! Result flags, error codes and transaction status descriptions.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

/// Transaction result flag carried in `RESULT`.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString,
)]
pub enum ResultFlag {
    /// `TS`
    #[serde(rename = "TS")]
    #[strum(serialize = "TS")]
    Success,
    /// `TF`
    #[serde(rename = "TF")]
    #[strum(serialize = "TF")]
    Failure,
}

/// Boolean flag carried in `FLAG`.
#[derive(
    Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString,
)]
pub enum YesNo {
    /// `Y`
    #[serde(rename = "Y")]
    #[strum(serialize = "Y")]
    Yes,
    /// `N`
    #[serde(rename = "N")]
    #[strum(serialize = "N")]
    No,
}

impl From<bool> for YesNo {
    fn from(value: bool) -> Self {
        if value {
            YesNo::Yes
        } else {
            YesNo::No
        }
    }
}

// ---------------------------------------------------------------------------
// Merchant error codes (name check / wallet-to-account)
// ---------------------------------------------------------------------------

/// Request processed successfully.
pub const ERROR_SUCCESS: &str = "error000";
/// The customer reference is unknown to the merchant.
pub const ERROR_INVALID_CUSTOMER_REF: &str = "error010";
/// The amount does not match what the merchant expects.
pub const ERROR_INVALID_AMOUNT: &str = "error011";
/// Any other merchant-side failure.
pub const ERROR_GENERAL_FAILURE: &str = "error100";

// ---------------------------------------------------------------------------
// Disbursement TXNSTATUS
// ---------------------------------------------------------------------------

/// `TXNSTATUS` of a successful disbursement.
pub const TXN_STATUS_SUCCESS: &str = "0";

/// Fixed descriptions of the provider's disbursement status codes.
const TXN_STATUS_TABLE: &[(&str, &str)] = &[
    ("0", "Success"),
    ("6", "Transaction is pending"),
    ("7", "Transaction is in progress"),
    ("11", "Invalid PIN"),
    ("12", "Account is locked"),
    ("60", "Duplicate reference id"),
    ("100", "Invalid recipient MSISDN"),
    ("101", "Recipient is not a registered subscriber"),
    ("102", "Recipient account is barred"),
    ("200", "Insufficient funds in merchant account"),
    ("410", "Amount exceeds the maximum transaction limit"),
    ("411", "Amount is below the minimum transaction limit"),
    ("412", "Recipient wallet balance limit exceeded"),
    ("413", "Daily transaction limit exceeded"),
    ("500", "Internal provider error"),
    ("503", "Service temporarily unavailable"),
];

/// Human-readable description of a disbursement `TXNSTATUS` code.
///
/// ```
/// use tigopesa_models::describe_txn_status;
///
/// assert_eq!(describe_txn_status("0"), "Success");
/// assert_eq!(describe_txn_status("9999"), "Unknown transaction status");
/// ```
pub fn describe_txn_status(code: &str) -> &'static str {
    let code = code.trim();
    TXN_STATUS_TABLE
        .iter()
        .find(|&&(c, _)| c == code)
        .map_or("Unknown transaction status", |&(_, description)| description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_display_wire_values() {
        assert_eq!(ResultFlag::Success.to_string(), "TS");
        assert_eq!(ResultFlag::Failure.to_string(), "TF");
        assert_eq!(YesNo::Yes.to_string(), "Y");
        assert_eq!(YesNo::No.to_string(), "N");
    }

    #[test]
    fn flags_parse_wire_values() {
        assert_eq!("TS".parse::<ResultFlag>().unwrap(), ResultFlag::Success);
        assert_eq!("N".parse::<YesNo>().unwrap(), YesNo::No);
        assert!("X".parse::<YesNo>().is_err());
    }

    #[test]
    fn yes_no_from_bool() {
        assert_eq!(YesNo::from(true), YesNo::Yes);
        assert_eq!(YesNo::from(false), YesNo::No);
    }

    #[test]
    fn known_status_codes() {
        assert_eq!(describe_txn_status(TXN_STATUS_SUCCESS), "Success");
        assert_eq!(
            describe_txn_status("410"),
            "Amount exceeds the maximum transaction limit"
        );
        assert_eq!(describe_txn_status(" 410 "), describe_txn_status("410"));
    }

    #[test]
    fn status_codes_are_unique() {
        let mut codes: Vec<&str> = TXN_STATUS_TABLE.iter().map(|(c, _)| *c).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), TXN_STATUS_TABLE.len());
    }
}
