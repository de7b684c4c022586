use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use genius_core::crypto::Address;
use genius_core::token_id::TokenId;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

mod core;
use core::Core;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the wallet's hex-encoded private key (generated on first use)
    #[arg(short, long, value_name = "FILE", env = "WALLET_KEY_FILE", default_value = "wallet.key")]
    key_file: PathBuf,

    /// Network id override (defaults to GENIUS_NET_ID, see `AssemblyConfig`)
    #[arg(long, env = "WALLET_NET_ID")]
    net_id: Option<u32>,

    /// Token id to operate on, as hex bytes (defaults to the native token)
    #[arg(long, env = "WALLET_TOKEN_ID")]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print this wallet's address.
    Address,
    /// Print the balance held in the given token.
    Balance,
    /// Mint new tokens into this wallet's own account (testing/bootstrap only).
    Mint {
        amount: u64,
        #[arg(long, default_value_t = 1)]
        chain_id: u64,
    },
    /// Transfer tokens to another address.
    Transfer {
        amount: u64,
        /// Destination address, as a 0x-prefixed hex string.
        destination: String,
    },
    /// Hold funds in escrow for a job, paid out once results are reported.
    HoldEscrow {
        amount: u64,
        job_id: String,
    },
}

fn parse_token(token: &Option<String>) -> Result<Option<TokenId>> {
    match token {
        None => Ok(None),
        Some(hex_bytes) => {
            let bytes = hex::decode(hex_bytes.trim_start_matches("0x"))?;
            Ok(Some(TokenId::from_bytes(&bytes)))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let token_id = parse_token(&cli.token)?;
    let core = Core::load(&cli.key_file, cli.net_id).await?;

    match cli.command {
        Commands::Address => {
            println!("{}", core.address().await);
        }
        Commands::Balance => {
            println!("{}", core.balance(token_id).await);
        }
        Commands::Mint { amount, chain_id } => {
            let tx_hash = core.mint(amount, chain_id, token_id).await?;
            info!(%tx_hash, "mint submitted");
            if !core.wait_for_outgoing(&tx_hash, Duration::from_secs(2)).await {
                return Err(anyhow!("mint {tx_hash} did not settle before timing out"));
            }
            println!("{tx_hash}");
        }
        Commands::Transfer { amount, destination } => {
            let destination = Address::from_hex(&destination)?;
            let tx_hash = core.transfer(amount, destination, token_id).await?;
            info!(%tx_hash, "transfer submitted");
            if !core.wait_for_outgoing(&tx_hash, Duration::from_secs(2)).await {
                return Err(anyhow!("transfer {tx_hash} did not settle before timing out"));
            }
            println!("{tx_hash}");
        }
        Commands::HoldEscrow { amount, job_id } => {
            let (tx_hash, escrow_address) = core.hold_escrow(amount, job_id).await?;
            info!(%tx_hash, %escrow_address, "escrow held");
            if !core.wait_for_outgoing(&tx_hash, Duration::from_secs(2)).await {
                return Err(anyhow!("escrow {tx_hash} did not settle before timing out"));
            }
            println!("{tx_hash} {escrow_address}");
        }
    }

    core.shutdown().await;
    Ok(())
}
