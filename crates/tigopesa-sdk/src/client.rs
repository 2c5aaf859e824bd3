//! Aggregate client.

use axum::Router;
use tigopesa_models::{
    CallbackRequest, CallbackResponse, DisburseResponse, HealthCheckResponse, PayResponse,
    PayloadKind, RefundResponse,
};
use tracing::info;

use crate::config::{ClientOptions, Config, InboundConfig};
use crate::disburse::DisburseClient;
use crate::error::SdkError;
use crate::inbound::{Dispatcher, HandlerFn, InboundHandlers};
use crate::push::PushClient;
use crate::service::{
    BillPayer, DisbursementOrder, Disburser, PaymentOrder, RefundOrder, TokenSource,
};
use crate::transport::HttpTransport;
use crate::wallet::WalletAccount;

/// One handle over every endpoint family, sharing a single transport.
///
/// Cheap to clone; clones share the HTTP connection pool, the token
/// cache and the debug log.
#[derive(Clone)]
pub struct TigoClient {
    transport: HttpTransport,
    disburse: DisburseClient,
    push: PushClient,
    wallet: WalletAccount,
    inbound: InboundConfig,
    callback: Option<HandlerFn<CallbackRequest, CallbackResponse>>,
}

impl TigoClient {
    /// Build a client from `config`, with options derived from it.
    pub fn new(config: Config, handlers: InboundHandlers) -> Result<Self, SdkError> {
        let options = config.options();
        Self::with_options(config, &options, handlers)
    }

    /// Build a client with explicit runtime options.
    pub fn with_options(
        config: Config,
        options: &ClientOptions,
        handlers: InboundHandlers,
    ) -> Result<Self, SdkError> {
        let transport = HttpTransport::new(options)?;
        let InboundHandlers {
            name_check,
            payment,
            callback,
        } = handlers;

        let mut wallet = WalletAccount::new(config.inbound.clone(), transport.clone());
        if let Some(handler) = name_check {
            wallet = wallet.with_name_check(handler);
        }
        if let Some(handler) = payment {
            wallet = wallet.with_payment(handler);
        }

        info!(
            timeout = ?options.timeout_duration(),
            debug = options.is_debug(),
            "tigo pesa client ready"
        );
        Ok(Self {
            disburse: DisburseClient::new(config.disburse, transport.clone()),
            push: PushClient::new(config.push, transport.clone()),
            wallet,
            inbound: config.inbound,
            callback,
            transport,
        })
    }

    /// Shared transport.
    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    /// Disbursement facade.
    pub fn disbursements(&self) -> &DisburseClient {
        &self.disburse
    }

    /// Push-pay facade.
    pub fn push(&self) -> &PushClient {
        &self.push
    }

    /// Wallet-account facade.
    pub fn wallet(&self) -> &WalletAccount {
        &self.wallet
    }

    /// Routes for every registered inbound handler.
    pub fn router(&self) -> Router {
        let mut router = self.wallet.router();
        if let Some(handler) = &self.callback {
            let dispatcher = Dispatcher::new("callback", PayloadKind::Json, handler.clone())
                .bound_to(&self.transport);
            router = router.route(&self.inbound.callback_path, dispatcher.into_route());
        }
        router
    }
}

impl std::fmt::Debug for TigoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TigoClient")
            .field("disburse", &self.disburse)
            .field("push", &self.push)
            .field("wallet", &self.wallet)
            .field("callback", &self.callback.is_some())
            .finish_non_exhaustive()
    }
}

impl Disburser for TigoClient {
    async fn disburse(&self, order: DisbursementOrder) -> Result<DisburseResponse, SdkError> {
        self.disburse.disburse(order).await
    }
}

impl BillPayer for TigoClient {
    async fn pay(&self, order: PaymentOrder) -> Result<PayResponse, SdkError> {
        self.push.pay(order).await
    }

    async fn refund(&self, order: RefundOrder) -> Result<RefundResponse, SdkError> {
        self.push.refund(order).await
    }

    async fn health_check(&self, reference_id: String) -> Result<HealthCheckResponse, SdkError> {
        self.push.health_check(reference_id).await
    }
}

impl TokenSource for TigoClient {
    async fn token(&self) -> Result<String, SdkError> {
        self.push.token().await
    }
}
