//! Crosschat CLI
//!
//! Parses, routes, executes and monitors natural-language transfer
//! instructions.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin crosschat -- --config config/crosschat.toml parse "转 0.01 ETH 从 ZetaChain 到 BSC Testnet"
//! cargo run --bin crosschat -- route "send 0.1 ETH from bsc testnet to zetachain" --wallet 0x...
//! cargo run --bin crosschat -- watch 0xabc... --chain-id 7001
//! cargo run --bin crosschat -- chat
//! ```
//!
//! Or set the config path via environment variable:
//!
//! ```bash
//! CROSSCHAT_CONFIG_PATH=crosschat.toml cargo run --bin crosschat -- chat
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crosschat::{
    chains::{BlockscoutClient, Eip1193Client, StaticAddressBook, WalletProvider},
    config::Config,
    intent::{classify, parse},
    network::ZETACHAIN_CHAIN_ID,
    service::{
        ChatSession, DisplayEvent, LayeredStatusSource, MonitorSubscription, ReceiptStatusSource,
        StatusSource, TransactionMonitor, TransactionRecord,
    },
    TransactionRouter,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "crosschat")]
#[command(about = "Natural-language cross-chain transfers over ZetaChain")]
struct Args {
    /// Path to configuration file (default: config/crosschat.toml or CROSSCHAT_CONFIG_PATH env var)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse an instruction and print the intent and its classification
    Parse { text: String },
    /// Print the execution plan for an instruction
    Route {
        text: String,
        /// Address that would sign the transaction
        #[arg(long)]
        wallet: String,
    },
    /// Monitor a transaction until it reaches a terminal state
    Watch {
        hash: String,
        #[arg(long, default_value_t = ZETACHAIN_CHAIN_ID)]
        chain_id: u64,
    },
    /// Look up an address balance on the explorer
    Balance { address: String },
    /// Interactive session over stdin
    Chat,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn load_config(path: Option<&str>) -> Result<Config> {
    match path {
        Some(path) => info!("Loading configuration from: {}", path),
        None => info!("Loading configuration from default location"),
    }
    Config::load_from_path(path)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments first (before initializing logging)
    let args = Args::parse();

    tracing_subscriber::fmt::init();

    match args.command {
        Command::Parse { text } => {
            let Some(intent) = parse(&text) else {
                anyhow::bail!("Instruction not understood: {}", text);
            };
            let classification = classify(&intent);
            print_json(&serde_json::json!({
                "intent": intent,
                "classification": classification,
            }))
        }
        Command::Route { text, wallet } => {
            let config = load_config(args.config.as_deref())?;
            let intent = parse(&text).with_context(|| format!("Instruction not understood: {}", text))?;
            let router = TransactionRouter::new(Arc::new(StaticAddressBook::from_config(&config.contracts)));
            let plan = router.route(&intent, &wallet)?;
            print_json(&plan)
        }
        Command::Watch { hash, chain_id } => {
            let config = load_config(args.config.as_deref())?;
            let explorer: Arc<dyn StatusSource> = Arc::new(BlockscoutClient::new(&config.explorer)?);
            let wallet: Arc<dyn WalletProvider> = Arc::new(Eip1193Client::new(&config.wallet)?);
            let receipts: Arc<dyn StatusSource> = Arc::new(ReceiptStatusSource::new(wallet));
            let source = LayeredStatusSource::new(vec![explorer, receipts]);
            let monitor = TransactionMonitor::new(Arc::new(source), config.monitor.clone());
            let subscription = monitor.watch(TransactionRecord { hash, chain_id });
            print_events(subscription).await
        }
        Command::Balance { address } => {
            let config = load_config(args.config.as_deref())?;
            let explorer = BlockscoutClient::new(&config.explorer)?;
            let balance = explorer.get_balance(&address).await?;
            println!("{}", balance.formatted);
            Ok(())
        }
        Command::Chat => {
            let config = load_config(args.config.as_deref())?;
            run_chat(config).await
        }
    }
}

async fn print_events(mut subscription: MonitorSubscription) -> Result<()> {
    while let Some(status) = subscription.next().await {
        print_json(&DisplayEvent::from(status))?;
    }
    let state = subscription.join().await?;
    info!("Monitor finished in state {:?}", state);
    Ok(())
}

async fn run_chat(config: Config) -> Result<()> {
    let wallet: Arc<dyn WalletProvider> = Arc::new(Eip1193Client::new(&config.wallet)?);
    let session = ChatSession::from_config(&config, wallet)?;
    let account = session.connect().await.context("Failed to connect wallet")?;
    info!("Chat session ready for {}", account);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line.to_lowercase().as_str() {
            "yes" | "y" | "确认" => {
                let outcome = tokio::select! {
                    result = session.confirm() => Some(result),
                    _ = signal::ctrl_c() => None,
                };
                match outcome {
                    Some(Ok(submission)) => {
                        print_json(&submission.event)?;
                        tokio::spawn(async move {
                            if let Err(e) = print_events(submission.subscription).await {
                                warn!("Monitor output failed: {:#}", e);
                            }
                        });
                    }
                    Some(Err(e)) => print_json(&DisplayEvent::from(&e))?,
                    None => print_json(&DisplayEvent::Cancelled)?,
                }
            }
            "no" | "n" | "取消" => print_json(&session.cancel())?,
            "quit" | "exit" => break,
            _ => print_json(&session.submit(line).await)?,
        }
    }

    session.monitor().cancel_all();
    Ok(())
}
