//! Chain client demo - exercises a node's RPC surface end to end
//!
//! Connects to a running node, lists its accounts, queries a balance,
//! unlocks the sending account, then walks through the transaction
//! kinds: a plain transfer, a record confirmation carrying a text
//! payload, a record ownership transfer, and an origin lookup.

use anyhow::{Context, Result};
use chain_client::{kind, ChainClient, ClientConfig, TxDraft};
use clap::Parser;
use std::time::Duration;
use tracing::{info, warn};

/// Chain client demo CLI
#[derive(Parser)]
#[command(name = "chain-client-demo")]
#[command(about = "Exercise a blockchain node's RPC surface", long_about = None)]
struct Cli {
    /// Node RPC endpoint (host:port)
    #[arg(long, default_value = "127.0.0.1:1546")]
    endpoint: String,

    /// Sending account; defaults to the node's first account
    #[arg(long)]
    from: Option<String>,

    /// Recipient for the transfer steps
    #[arg(long, default_value = "0xabeaf76b84de7ee516daa558ec3a91fcc56221c7")]
    to: String,

    /// Passphrase for unlocking the sending account
    #[arg(long, default_value = "123456")]
    passphrase: String,

    /// Transfer amount
    #[arg(long, default_value_t = 1_000_000_000)]
    value: u128,

    /// Unlock window in seconds
    #[arg(long, default_value_t = 300)]
    unlock_secs: u64,

    /// Record content for the payload-tagged submissions
    #[arg(long, default_value = "text content")]
    content: String,

    /// Per-call timeout in seconds
    #[arg(long, default_value_t = 30)]
    call_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let cli = Cli::parse();

    let config = ClientConfig {
        call_timeout: Duration::from_secs(cli.call_timeout),
        ..ClientConfig::default()
    };

    info!("Connecting to node at {}", cli.endpoint);
    let client = ChainClient::connect(cli.endpoint.clone(), config)
        .await
        .with_context(|| format!("could not reach node at {}", cli.endpoint))?;

    // Account discovery
    let accounts = client.list_accounts().await?;
    info!("Node manages {} account(s)", accounts.len());
    for account in &accounts {
        info!("  {}", account);
    }

    let from = match cli.from {
        Some(from) => from,
        None => accounts
            .first()
            .context("node has no accounts and --from was not given")?
            .to_string(),
    };

    let balance = client.get_balance(&from).await?;
    info!("Balance of {}: {}", from, balance);

    // Unlock before any signing-dependent submission
    client
        .unlock_account(&from, &cli.passphrase, cli.unlock_secs)
        .await
        .context("unlock rejected; check the passphrase")?;
    info!("Unlocked {} for {}s", from, cli.unlock_secs);

    // Plain value transfer
    let transfer = TxDraft::transfer(&from, &cli.to, cli.value);
    match client.send_transaction(&transfer).await {
        Ok(hash) => info!("Transfer submitted: {}", hash),
        Err(e) => warn!("Transfer failed: {}", e),
    }

    // Record confirmation: payload only, no recipient
    let payload = client.encode_text(&cli.content);
    info!("Record payload: {}", payload);
    let confirmation = TxDraft::record(&from, kind::RECORD_CONFIRMATION, &cli.content);
    match client.send_transaction(&confirmation).await {
        Ok(hash) => info!("Record confirmation submitted: {}", hash),
        Err(e) => warn!("Record confirmation failed: {}", e),
    }

    // Record ownership transfer to the recipient
    let record_transfer =
        TxDraft::record(&from, kind::RECORD_TRANSFER, &cli.content).with_to(&cli.to);
    match client.send_transaction(&record_transfer).await {
        Ok(hash) => info!("Record transfer submitted: {}", hash),
        Err(e) => warn!("Record transfer failed: {}", e),
    }

    // Origin lookup for the recorded content
    match client.get_origin(&cli.content).await {
        Ok(origin) => info!("Origin of the content: {}", origin),
        Err(e) => warn!("Origin lookup failed: {}", e),
    }

    Ok(())
}
