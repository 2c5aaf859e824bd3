//! Push-pay facade: bill-pay, refund, health check and the token they share.
//!
//! Every call here is bearer-authenticated through the client's
//! [`TokenCache`]. Bill-pay additionally carries the API credentials as
//! `username` / `password` headers, as the provider requires for that
//! endpoint.

use std::sync::Arc;

use reqwest::Method;
use tigopesa_models::{
    HealthCheckRequest, HealthCheckResponse, PayRequest, PayResponse, PayloadKind, RefundRequest,
    RefundResponse,
};
use tracing::{info, warn};

use crate::config::PushConfig;
use crate::error::SdkError;
use crate::request::RequestDescriptor;
use crate::service::{BillPayer, PaymentOrder, RefundOrder, TokenSource};
use crate::token::TokenCache;
use crate::transport::HttpTransport;

/// Client for the push-pay API family.
#[derive(Debug, Clone)]
pub struct PushClient {
    config: PushConfig,
    transport: HttpTransport,
    tokens: Arc<TokenCache>,
}

impl PushClient {
    /// A client with an empty token cache.
    pub fn new(config: PushConfig, transport: HttpTransport) -> Self {
        let tokens = Arc::new(TokenCache::new(
            config.token_url.clone(),
            config.credentials.clone(),
        ));
        Self {
            config,
            transport,
            tokens,
        }
    }

    /// API family configuration.
    pub fn config(&self) -> &PushConfig {
        &self.config
    }

    /// The token cache shared by all clones of this client.
    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    /// A fresh reference: the biller code followed by ten random hex digits.
    pub fn new_reference(&self) -> String {
        let random = uuid::Uuid::new_v4().simple().to_string();
        format!(
            "{}{}",
            self.config.biller_code,
            random[..10].to_ascii_uppercase()
        )
    }

    /// The bill-pay request for `order`, without the bearer header.
    pub fn pay_request(&self, order: &PaymentOrder) -> Result<RequestDescriptor, SdkError> {
        let body = PayRequest {
            customer_msisdn: order.customer_msisdn.clone(),
            biller_msisdn: self.config.biller_msisdn.clone(),
            amount: order.amount,
            remarks: order.remarks.clone(),
            reference_id: order.reference_id.clone(),
        };
        let credentials = &self.config.credentials;
        Ok(
            RequestDescriptor::builder(Method::POST, &self.config.billpay_url, PayloadKind::Json)
                .payload(&body)
                .credentials(&credentials.username, &credentials.password)
                .build()?,
        )
    }

    /// The refund request for `order`, without the bearer header.
    pub fn refund_request(&self, order: &RefundOrder) -> Result<RequestDescriptor, SdkError> {
        let body = RefundRequest {
            customer_msisdn: order.customer_msisdn.clone(),
            channel_msisdn: self.config.biller_msisdn.clone(),
            channel_pin: self.config.channel_pin.clone(),
            amount: order.amount,
            mfs_transaction_id: order.mfs_transaction_id.clone(),
            reference_id: order.reference_id.clone(),
            purchase_reference_id: order.purchase_reference_id.clone(),
        };
        Ok(
            RequestDescriptor::builder(Method::POST, &self.config.refund_url, PayloadKind::Json)
                .payload(&body)
                .build()?,
        )
    }

    /// The health-check request, without the bearer header.
    pub fn health_check_request(&self, reference_id: String) -> Result<RequestDescriptor, SdkError> {
        Ok(RequestDescriptor::builder(
            Method::POST,
            &self.config.health_check_url,
            PayloadKind::Json,
        )
        .payload(&HealthCheckRequest { reference_id })
        .build()?)
    }
}

impl BillPayer for PushClient {
    async fn pay(&self, order: PaymentOrder) -> Result<PayResponse, SdkError> {
        let request = self.pay_request(&order)?;
        let response = self
            .transport
            .send_authenticated::<PayResponse>(&self.tokens, request)
            .await?;
        let body = response.payload;

        if body.response_status {
            info!(reference = %order.reference_id, code = %body.response_code, "push payment accepted");
        } else {
            warn!(
                reference = %order.reference_id,
                status = %response.status,
                code = %body.response_code,
                description = %body.response_description,
                "push payment rejected"
            );
        }
        Ok(body)
    }

    async fn refund(&self, order: RefundOrder) -> Result<RefundResponse, SdkError> {
        let request = self.refund_request(&order)?;
        let response = self
            .transport
            .send_authenticated::<RefundResponse>(&self.tokens, request)
            .await?;
        let body = response.payload;

        if body.response_status {
            info!(reference = %order.reference_id, dm_reference = %body.dm_reference_id, "refund accepted");
        } else {
            warn!(
                reference = %order.reference_id,
                code = %body.response_code,
                "refund rejected"
            );
        }
        Ok(body)
    }

    async fn health_check(&self, reference_id: String) -> Result<HealthCheckResponse, SdkError> {
        let request = self.health_check_request(reference_id)?;
        let response = self
            .transport
            .send_authenticated::<HealthCheckResponse>(&self.tokens, request)
            .await?;
        Ok(response.payload)
    }
}

impl TokenSource for PushClient {
    async fn token(&self) -> Result<String, SdkError> {
        self.tokens.get_token(&self.transport).await
    }
}
