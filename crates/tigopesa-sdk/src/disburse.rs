//! Disbursement facade.

use reqwest::Method;
use tigopesa_models::{
    DisburseRequest, DisburseResponse, PayloadKind, DISBURSE_LANGUAGE, DISBURSE_REQUEST_TYPE,
};
use tracing::{info, warn};

use crate::config::DisburseConfig;
use crate::error::SdkError;
use crate::request::RequestDescriptor;
use crate::service::{DisbursementOrder, Disburser};
use crate::transport::HttpTransport;

/// Sends XML disbursement commands authenticated by the merchant PIN.
#[derive(Debug, Clone)]
pub struct DisburseClient {
    config: DisburseConfig,
    transport: HttpTransport,
}

impl DisburseClient {
    /// A client for the configured disbursement endpoint.
    pub fn new(config: DisburseConfig, transport: HttpTransport) -> Self {
        Self { config, transport }
    }

    /// Endpoint configuration.
    pub fn config(&self) -> &DisburseConfig {
        &self.config
    }

    /// The `<COMMAND>` request for `order`.
    pub fn build_request(&self, order: &DisbursementOrder) -> Result<RequestDescriptor, SdkError> {
        let command = DisburseRequest {
            request_type: DISBURSE_REQUEST_TYPE.into(),
            reference_id: order.reference_id.clone(),
            msisdn: self.config.account_msisdn.clone(),
            pin: self.config.pin.clone(),
            msisdn1: order.msisdn.clone(),
            amount: order.amount,
            sender_name: self.config.account_name.clone(),
            language1: DISBURSE_LANGUAGE.into(),
            brand_id: self.config.brand_id.clone(),
        };
        Ok(
            RequestDescriptor::builder(Method::POST, &self.config.url, PayloadKind::Xml)
                .payload(&command)
                .build()?,
        )
    }
}

impl Disburser for DisburseClient {
    async fn disburse(&self, order: DisbursementOrder) -> Result<DisburseResponse, SdkError> {
        let request = self.build_request(&order)?;
        let response = self.transport.send::<DisburseResponse>(request).await?;
        let body = response.payload;

        if body.is_success() {
            info!(reference = %order.reference_id, txn_id = %body.txn_id, "disbursement completed");
        } else {
            warn!(
                reference = %order.reference_id,
                status = %body.txn_status,
                description = body.status_description(),
                "disbursement not completed"
            );
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientOptions;
    use mock_tigopesa::MockProvider;

    fn client(url: String) -> DisburseClient {
        let config = DisburseConfig {
            account_name: "ACME Ltd".into(),
            account_msisdn: "255650000000".into(),
            brand_id: "1234".into(),
            pin: "4321".into(),
            url,
        };
        DisburseClient::new(config, HttpTransport::new(&ClientOptions::new()).unwrap())
    }

    #[test]
    fn command_carries_fixed_literals() {
        let client = client("http://provider.test/disburse".into());
        let request = client
            .build_request(&DisbursementOrder::new("R1", "0765000000", 1000.0))
            .unwrap();
        let body = String::from_utf8(request.body().unwrap().to_vec()).unwrap();

        assert!(body.contains("<TYPE>REQMFCI</TYPE>"), "{body}");
        assert!(body.contains("<LANGUAGE1>EN</LANGUAGE1>"), "{body}");
        assert!(body.contains("<REFERENCEID>R1</REFERENCEID>"), "{body}");
        assert!(body.contains("<MSISDN1>0765000000</MSISDN1>"), "{body}");
        assert!(body.contains("<AMOUNT>1000</AMOUNT>"), "{body}");
        assert!(body.contains("<PIN>4321</PIN>"), "{body}");
        assert!(body.starts_with("<COMMAND>"), "{body}");
        assert_eq!(request.header("Content-Type"), Some("application/xml"));
        assert_eq!(request.header("Authorization"), None);
    }

    #[tokio::test]
    async fn disburse_against_mock() {
        let provider = MockProvider::new("merchant", "s3cret");
        let base = provider.spawn().await.unwrap();
        let client = client(format!("{base}/disburse"));

        let response = client
            .disburse(DisbursementOrder::new("R1", "0765000000", 1000.0))
            .await
            .unwrap();
        assert!(response.is_success(), "{response:?}");
        assert_eq!(response.reference_id, "R1");
        assert!(!response.txn_id.is_empty());
        assert_eq!(provider.disburse_requests(), 1);
        assert_eq!(provider.token_requests(), 0);

        let sent = provider.last_request("/disburse").unwrap();
        assert!(sent.body.contains("<SENDERNAME>ACME Ltd</SENDERNAME>"), "{}", sent.body);
    }

    #[tokio::test]
    async fn business_failure_is_returned_as_data() {
        let provider = MockProvider::new("merchant", "s3cret");
        let base = provider.spawn().await.unwrap();
        let client = client(format!("{base}/disburse"));

        let response = client
            .disburse(DisbursementOrder::new("R2", "0765000000", 50_000_000.0))
            .await
            .unwrap();
        assert!(!response.is_success());
        assert_eq!(response.txn_status, "410");
        assert_eq!(
            response.status_description(),
            "Amount exceeds the maximum transaction limit"
        );
    }
}
