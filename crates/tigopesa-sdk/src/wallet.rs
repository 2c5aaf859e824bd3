//! Wallet-account facade: the XML routes the provider calls on the merchant.

use axum::Router;
use tigopesa_models::{NameRequest, NameResponse, PayloadKind, PaymentRequest, PaymentResponse};

use crate::config::InboundConfig;
use crate::inbound::{Dispatcher, HandlerFn};
use crate::transport::HttpTransport;

/// Serves name-check and wallet-to-account payment requests.
#[derive(Clone)]
pub struct WalletAccount {
    config: InboundConfig,
    transport: HttpTransport,
    name_check: Option<HandlerFn<NameRequest, NameResponse>>,
    payment: Option<HandlerFn<PaymentRequest, PaymentResponse>>,
}

impl WalletAccount {
    /// A facade with no handlers; see [`WalletAccount::with_name_check`]
    /// and [`WalletAccount::with_payment`].
    pub fn new(config: InboundConfig, transport: HttpTransport) -> Self {
        Self {
            config,
            transport,
            name_check: None,
            payment: None,
        }
    }

    /// Serve name checks with `handler`.
    #[must_use]
    pub fn with_name_check(mut self, handler: HandlerFn<NameRequest, NameResponse>) -> Self {
        self.name_check = Some(handler);
        self
    }

    /// Serve wallet-to-account payments with `handler`.
    #[must_use]
    pub fn with_payment(mut self, handler: HandlerFn<PaymentRequest, PaymentResponse>) -> Self {
        self.payment = Some(handler);
        self
    }

    /// Route paths.
    pub fn config(&self) -> &InboundConfig {
        &self.config
    }

    /// Routes for every registered handler.
    pub fn router<S>(&self) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        let mut router = Router::new();
        if let Some(handler) = &self.name_check {
            let dispatcher = Dispatcher::new("name-check", PayloadKind::Xml, handler.clone())
                .bound_to(&self.transport);
            router = router.route(&self.config.name_check_path, dispatcher.into_route());
        }
        if let Some(handler) = &self.payment {
            let dispatcher = Dispatcher::new("payment", PayloadKind::Xml, handler.clone())
                .bound_to(&self.transport);
            router = router.route(&self.config.payment_path, dispatcher.into_route());
        }
        router
    }
}

impl std::fmt::Debug for WalletAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletAccount")
            .field("config", &self.config)
            .field("name_check", &self.name_check.is_some())
            .field("payment", &self.payment.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientOptions;
    use crate::inbound::handler_fn;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use std::convert::Infallible;
    use tigopesa_models::ERROR_INVALID_AMOUNT;

    fn account() -> WalletAccount {
        WalletAccount::new(
            InboundConfig::default(),
            HttpTransport::new(&ClientOptions::new()).unwrap(),
        )
    }

    #[tokio::test]
    async fn payment_route_acknowledges() {
        let wallet = account().with_payment(handler_fn(|req: PaymentRequest| async move {
            if req.amount <= 0.0 {
                return Ok::<_, Infallible>(PaymentResponse::rejected(
                    &req,
                    ERROR_INVALID_AMOUNT,
                    "Amount must be positive",
                ));
            }
            Ok(PaymentResponse::accepted(&req, "RCPT-1", "Payment received"))
        }));
        let server = TestServer::new(wallet.router::<()>()).unwrap();

        let response = server
            .post("/tigopesa/payment")
            .text(
                "<COMMAND><TYPE>SYNC_BILLPAY_REQUEST</TYPE><TXNID>MP1.2</TXNID>\
                 <MSISDN>255765000000</MSISDN><AMOUNT>2500</AMOUNT>\
                 <COMPANYNAME>ACME</COMPANYNAME><CUSTOMERREFERENCEID>INV-9</CUSTOMERREFERENCEID>\
                 <SENDERNAME>Jane</SENDERNAME></COMMAND>",
            )
            .await;
        response.assert_status_ok();
        let body = response.text();
        assert!(body.contains("<TXNID>MP1.2</TXNID>"), "{body}");
        assert!(body.contains("<REFID>RCPT-1</REFID>"), "{body}");
        assert!(body.contains("<RESULT>TS</RESULT>"), "{body}");
    }

    #[tokio::test]
    async fn unregistered_routes_are_not_mounted() {
        let server = TestServer::new(account().router::<()>()).unwrap();
        server
            .post("/tigopesa/namecheck")
            .text("<COMMAND/>")
            .expect_failure()
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
