//! devnet-faucet command line.
//!
//! ```text
//! devnet-faucet [--config faucet.toml] keys
//! devnet-faucet balance --account a --block latest
//! devnet-faucet fund --to-account a --amount-wei 1000000000000000000
//! ```

use std::path::PathBuf;
use std::time::Duration;

use alloy::primitives::U256;
use clap::{Parser, Subcommand};

use devnet_faucet::blockchain::keystore::{self, Account};
use devnet_faucet::blockchain::{BlockNumber, ConfirmationResult};
use devnet_faucet::config;
use devnet_faucet::lifecycle::{signals, startup, Shutdown};
use devnet_faucet::observability::logging;

#[derive(Parser, Debug)]
#[command(name = "devnet-faucet", version, about = "Fund and inspect devnet accounts")]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the keys folder and any missing account keys.
    Keys,
    /// Print the balance of an account.
    Balance {
        #[arg(long, value_enum, default_value = "faucet")]
        account: Account,
        /// Block tag or 0x-prefixed number.
        #[arg(long, default_value = "latest")]
        block: BlockNumber,
    },
    /// Send value from the faucet and wait for confirmation.
    Fund {
        #[arg(long, value_enum, default_value = "a")]
        to_account: Account,
        #[arg(long, default_value_t = startup::ONE_ETHER)]
        amount_wei: U256,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = config::load(cli.config.as_deref())?;
    logging::init_logging(&config.observability);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "devnet-faucet starting");

    let shutdown = Shutdown::new();
    let signal_task = signals::install(shutdown.clone());

    let result = run(cli.command, &config, &shutdown).await;
    signal_task.abort();

    if let Err(e) = &result {
        tracing::error!(error = %e, "Command failed");
    }
    result
}

async fn run(
    command: Command,
    config: &config::FaucetConfig,
    shutdown: &Shutdown,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Keys => {
            let created = keystore::ensure_keys_exist(&config.keys)?;
            println!("{} key file(s) created in {}", created.len(), config.keys.folder.display());
        }
        Command::Balance { account, block } => {
            let address = keystore::require_credential(&config.keys.path_of(account))?.address();
            let client = startup::connect(&config.blockchain).await?;
            let timeout = Duration::from_secs(config.race.timeout_secs);

            match startup::check_balance(client, address, block, timeout, shutdown.subscribe()).await? {
                Some(balance) => println!("{} {} wei at {}", address, balance, block),
                None => println!("{} balance unavailable (timed out or cancelled)", address),
            }
        }
        Command::Fund { to_account, amount_wei } => {
            let client = startup::connect(&config.blockchain).await?;
            let report = startup::run_transfer(
                config,
                client,
                to_account,
                amount_wei,
                shutdown.subscribe(),
            )
            .await?;

            println!("tx {}", report.submission.tx_hash);
            println!(
                "before: faucet {} wei, recipient {} wei",
                report.before.faucet, report.before.recipient
            );
            match (report.confirmation, report.after) {
                (ConfirmationResult::Confirmed { block_number }, Some(after)) => {
                    if let Some(block) = block_number {
                        println!("confirmed in block {}", block);
                    } else {
                        println!("confirmed");
                    }
                    println!("after: faucet {} wei, recipient {} wei", after.faucet, after.recipient);
                }
                _ => println!("not confirmed"),
            }
        }
    }
    Ok(())
}
