//! Payments CLI
//!
//! Command-line interface for the consumer payments API.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use payments_client::PaymentsClient;
use payments_types::{AccountId, PaymentRequest, UserId};

#[derive(Parser)]
#[command(name = "payments")]
#[command(author, version, about = "Consumer payments API CLI client", long_about = None)]
struct Cli {
    /// Base URL of the Payments API
    #[arg(
        long,
        env = "PAYMENTS_API_URL",
        default_value = "http://localhost:3000"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the API is up
    Health,
    /// Credit an account through the payment provider
    Credit(PaymentArgs),
    /// Debit an account through the payment provider
    Debit(PaymentArgs),
    /// Compare the local ledger with the provider for a reference
    Lookup {
        /// External payment reference
        reference: String,
    },
}

#[derive(Args)]
struct PaymentArgs {
    #[arg(long)]
    user: String,
    #[arg(long)]
    account: String,
    /// External payment reference
    #[arg(long)]
    reference: String,
    /// Decimal amount, e.g. 10 or 0.50
    #[arg(long)]
    amount: Decimal,
}

impl From<PaymentArgs> for PaymentRequest {
    fn from(args: PaymentArgs) -> Self {
        PaymentRequest {
            user_id: UserId::new(args.user),
            account_id: AccountId::new(args.account),
            reference: args.reference,
            amount: args.amount,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = PaymentsClient::new(&cli.api_url);

    match cli.command {
        Commands::Health => {
            let healthy = client.health().await?;
            if healthy {
                println!("✓ API is up");
            } else {
                println!("✗ API is not responding");
                std::process::exit(1);
            }
        }

        Commands::Credit(args) => {
            let request = PaymentRequest::from(args);
            request.validate()?;
            client.credit(&request).await?;
            println!("✓ Credited {} to {}", request.amount, request.account_id);
        }

        Commands::Debit(args) => {
            let request = PaymentRequest::from(args);
            request.validate()?;
            client.debit(&request).await?;
            println!("✓ Debited {} from {}", request.amount, request.account_id);
        }

        Commands::Lookup { reference } => {
            let report = client.lookup(&reference).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_debit_arguments() {
        let cli = Cli::try_parse_from([
            "payments",
            "--api-url",
            "http://localhost:4000",
            "debit",
            "--user",
            "usr-001",
            "--account",
            "acc_001",
            "--reference",
            "ref-002",
            "--amount",
            "0.50",
        ])
        .unwrap();

        assert_eq!(cli.api_url, "http://localhost:4000");
        match cli.command {
            Commands::Debit(args) => {
                let request = PaymentRequest::from(args);
                assert_eq!(request.amount, dec!(0.50));
                assert_eq!(request.account_id.as_str(), "acc_001");
            }
            _ => panic!("expected debit"),
        }
    }

    #[test]
    fn test_rejects_non_numeric_amount() {
        let result = Cli::try_parse_from([
            "payments", "credit", "--user", "u", "--account", "a", "--reference", "r",
            "--amount", "ten",
        ]);

        assert!(result.is_err());
    }
}
