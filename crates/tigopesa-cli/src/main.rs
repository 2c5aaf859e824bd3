//! `tigopesa` — call the Tigo Pesa APIs from the command line.
//!
//! Configuration comes from the same `TIGO_*` environment variables the
//! SDK reads; `--debug` and `--timeout` override them.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tigopesa_sdk::{
    BillPayer, CancelScope, Config, DebugEntry, DisbursementOrder, Disburser, InboundHandlers,
    PaymentOrder, RefundOrder, TigoClient, TokenSource,
};
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "tigopesa", about = "Tigo Pesa API client", version)]
struct Cli {
    /// Print every request and response to stderr.
    #[arg(long, global = true)]
    debug: bool,

    /// Per-call timeout in seconds.
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch (or reuse) a push-pay access token.
    Token,
    /// Send money from the merchant account to a subscriber.
    Disburse {
        /// Recipient MSISDN.
        #[arg(long)]
        msisdn: String,
        #[arg(long)]
        amount: f64,
        /// Merchant reference; generated when omitted.
        #[arg(long)]
        reference: Option<String>,
    },
    /// Ask a subscriber to approve a bill payment.
    Pay {
        /// Customer MSISDN.
        #[arg(long)]
        msisdn: String,
        #[arg(long)]
        amount: f64,
        #[arg(long, default_value = "")]
        remarks: String,
        /// Merchant reference; generated when omitted.
        #[arg(long)]
        reference: Option<String>,
    },
    /// Refund a completed push payment.
    Refund {
        /// Customer MSISDN.
        #[arg(long)]
        msisdn: String,
        #[arg(long)]
        amount: f64,
        /// Provider transaction id of the original payment.
        #[arg(long)]
        mfs_transaction_id: String,
        /// Merchant reference of the original payment.
        #[arg(long)]
        purchase_reference: String,
        /// Refund reference; generated when omitted.
        #[arg(long)]
        reference: Option<String>,
    },
    /// Check that the push-pay API is reachable.
    Health {
        /// Reference echoed by the provider; generated when omitted.
        #[arg(long)]
        reference: Option<String>,
    },
}

fn print_json(value: &impl Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn client(cli: &Cli) -> Result<TigoClient> {
    let mut config = Config::from_env();
    if cli.debug {
        config.debug = true;
    }
    if let Some(secs) = cli.timeout {
        if secs == 0 {
            bail!("--timeout must be at least one second");
        }
        config.timeout = Some(Duration::from_secs(secs));
    }

    let scope = CancelScope::new();
    let on_interrupt = scope.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling in-flight call");
            on_interrupt.cancel();
        }
    });

    let options = config
        .options()
        .cancel_scope(scope)
        .debug_sink(|entry: &DebugEntry| eprintln!("--- {} ---\n{}", entry.label, entry.dump));
    TigoClient::with_options(config, &options, InboundHandlers::new())
        .context("failed to build Tigo Pesa client")
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let client = client(&cli)?;

    match cli.command {
        Command::Token => {
            let token = client.token().await?;
            print_json(&serde_json::json!({ "access_token": token }))?;
        }
        Command::Disburse {
            msisdn,
            amount,
            reference,
        } => {
            let reference = reference.unwrap_or_else(|| client.push().new_reference());
            let response = client
                .disburse(DisbursementOrder::new(reference, msisdn, amount))
                .await?;
            print_json(&response)?;
        }
        Command::Pay {
            msisdn,
            amount,
            remarks,
            reference,
        } => {
            let reference = reference.unwrap_or_else(|| client.push().new_reference());
            let response = client
                .pay(PaymentOrder::new(reference, msisdn, amount).remarks(remarks))
                .await?;
            print_json(&response)?;
        }
        Command::Refund {
            msisdn,
            amount,
            mfs_transaction_id,
            purchase_reference,
            reference,
        } => {
            let response = client
                .refund(RefundOrder {
                    reference_id: reference.unwrap_or_else(|| client.push().new_reference()),
                    customer_msisdn: msisdn,
                    amount,
                    mfs_transaction_id,
                    purchase_reference_id: purchase_reference,
                })
                .await?;
            print_json(&response)?;
        }
        Command::Health { reference } => {
            let reference = reference.unwrap_or_else(|| client.push().new_reference());
            let response = client.health_check(reference).await?;
            print_json(&response)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "tigopesa", "pay", "--msisdn", "255765000000", "--amount", "1500", "--debug",
            "--timeout", "5",
        ])
        .unwrap();
        assert!(cli.debug);
        assert_eq!(cli.timeout, Some(5));
        match cli.command {
            Command::Pay {
                amount, remarks, reference, ..
            } => {
                assert!((amount - 1500.0).abs() < f64::EPSILON);
                assert!(remarks.is_empty());
                assert!(reference.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn refund_requires_original_transaction() {
        let err = Cli::try_parse_from([
            "tigopesa", "refund", "--msisdn", "255765000000", "--amount", "10",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }
}
