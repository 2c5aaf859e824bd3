//! Merchant → subscriber disbursement (XML).
//!
//! A disbursement moves funds from the merchant account (`MSISDN` + `PIN`)
//! to a subscriber wallet (`MSISDN1`). The request `TYPE` is always
//! [`DISBURSE_REQUEST_TYPE`] and the language always [`DISBURSE_LANGUAGE`].

use serde::{Deserialize, Serialize};

/// `TYPE` of every disbursement request.
pub const DISBURSE_REQUEST_TYPE: &str = "REQMFCI";

/// `LANGUAGE1` of every disbursement request.
pub const DISBURSE_LANGUAGE: &str = "EN";

/// Disbursement request, sent as `<COMMAND>…</COMMAND>`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct DisburseRequest {
    /// Always [`DISBURSE_REQUEST_TYPE`].
    #[serde(rename = "TYPE")]
    pub request_type: String,
    /// Merchant-generated reference.
    #[serde(rename = "REFERENCEID")]
    pub reference_id: String,
    /// Merchant account MSISDN.
    #[serde(rename = "MSISDN")]
    pub msisdn: String,
    /// Merchant account PIN.
    #[serde(rename = "PIN")]
    pub pin: String,
    /// Recipient MSISDN.
    #[serde(rename = "MSISDN1")]
    pub msisdn1: String,
    /// Amount to disburse.
    #[serde(rename = "AMOUNT", with = "crate::amount::xml")]
    pub amount: f64,
    /// Sender name shown to the recipient.
    #[serde(rename = "SENDERNAME")]
    pub sender_name: String,
    /// Always [`DISBURSE_LANGUAGE`].
    #[serde(rename = "LANGUAGE1")]
    pub language1: String,
    /// Brand identifier issued by the provider.
    #[serde(rename = "BRAND_ID")]
    pub brand_id: String,
}

/// Disbursement response.
///
/// A decoded response is not necessarily a successful one: inspect
/// [`DisburseResponse::is_success`] or [`crate::describe_txn_status`].
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct DisburseResponse {
    /// Response type echoed by the provider.
    #[serde(rename = "TYPE")]
    pub response_type: String,
    /// The request's reference.
    #[serde(rename = "REFERENCEID")]
    pub reference_id: String,
    /// Provider transaction id.
    #[serde(rename = "TXNID")]
    pub txn_id: String,
    /// Numeric transaction status code.
    #[serde(rename = "TXNSTATUS")]
    pub txn_status: String,
    /// Free-text message.
    #[serde(rename = "MESSAGE")]
    pub message: String,
}

impl DisburseResponse {
    /// `true` when `TXNSTATUS` is the success code.
    pub fn is_success(&self) -> bool {
        self.txn_status.trim() == crate::status::TXN_STATUS_SUCCESS
    }

    /// Human-readable description of `TXNSTATUS`.
    pub fn status_description(&self) -> &'static str {
        crate::status::describe_txn_status(&self.txn_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode, encode, PayloadKind};

    fn sample_request() -> DisburseRequest {
        DisburseRequest {
            request_type: DISBURSE_REQUEST_TYPE.into(),
            reference_id: "R1".into(),
            msisdn: "255650000000".into(),
            pin: "1234".into(),
            msisdn1: "0765000000".into(),
            amount: 1000.0,
            sender_name: "ACME".into(),
            language1: DISBURSE_LANGUAGE.into(),
            brand_id: "2019".into(),
        }
    }

    #[test]
    fn request_tags_are_exact() {
        let xml = String::from_utf8(encode(PayloadKind::Xml, &sample_request()).unwrap()).unwrap();
        for tag in [
            "<TYPE>REQMFCI</TYPE>",
            "<REFERENCEID>R1</REFERENCEID>",
            "<MSISDN>255650000000</MSISDN>",
            "<PIN>1234</PIN>",
            "<MSISDN1>0765000000</MSISDN1>",
            "<AMOUNT>1000</AMOUNT>",
            "<SENDERNAME>ACME</SENDERNAME>",
            "<LANGUAGE1>EN</LANGUAGE1>",
            "<BRAND_ID>2019</BRAND_ID>",
        ] {
            assert!(xml.contains(tag), "missing {tag} in {xml}");
        }
    }

    #[test]
    fn request_xml_roundtrip() {
        let request = sample_request();
        let bytes = encode(PayloadKind::Xml, &request).unwrap();
        let back: DisburseRequest = decode(PayloadKind::Xml, &bytes).unwrap();
        assert_eq!(back, request);
    }

    #[test]
    fn response_xml_roundtrip() {
        let response = DisburseResponse {
            response_type: "RMFCI".into(),
            reference_id: "R1".into(),
            txn_id: "MP210601.1234.A00001".into(),
            txn_status: "0".into(),
            message: "Sent 1,000.50 to Jane & John <0765>".into(),
        };
        crate::codec::assert_roundtrip(PayloadKind::Xml, &response);
    }

    #[test]
    fn response_parses_provider_document() {
        let xml = "<?xml version=\"1.0\"?>\n<COMMAND>\n<TYPE>RMFCI</TYPE>\n\
                   <REFERENCEID>R1</REFERENCEID>\n<TXNID>MP2001.1234.A00001</TXNID>\n\
                   <TXNSTATUS>0</TXNSTATUS>\n<MESSAGE>Success</MESSAGE>\n</COMMAND>";
        let resp: DisburseResponse = decode(PayloadKind::Xml, xml.as_bytes()).unwrap();
        assert_eq!(resp.txn_id, "MP2001.1234.A00001");
        assert!(resp.is_success());
        assert_eq!(resp.status_description(), "Success");
    }

    #[test]
    fn failed_response_is_not_success() {
        let resp = DisburseResponse {
            txn_status: "410".into(),
            ..Default::default()
        };
        assert!(!resp.is_success());
        assert!(resp.status_description().contains("limit"));
    }
}
