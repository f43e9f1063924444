//! Flash swap arbitrage engine
//!
//! Main entry point. Resolves the pair on both venues, then reacts to
//! Swap events on either pool:
//!
//! - WS `eth_subscribe` logs on both pair addresses
//! - each event: fresh reserves -> spread -> direction -> router quotes
//! - opportunity: one `testFlashSwap` call, nothing else while it runs
//! - failed execution or dropped subscription: backoff, resubscribe
//!
//! Dry run unless `LIVE_MODE=true`.
//!
//! Created: 2026-10-17

use alloy::providers::{DynProvider, Provider, ProviderBuilder, WsConnect};
use alloy::signers::local::PrivateKeySigner;
use anyhow::{bail, Context, Result};
use clap::Parser;
use dexarb_flash::arbitrage::{
    ContractExecutor, DryRunExecutor, ExecutionController, FlashExecutor, ProfitabilityEstimator,
};
use dexarb_flash::config::{load_config_from_file, load_config_toml, EngineConfig};
use dexarb_flash::pool::resolve_venue;
use dexarb_flash::types::{TokenPair, VenueId};
use dexarb_flash::venue::{load_token, RpcVenue, VenueClient, VenuePair};
use dexarb_flash::Monitor;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Two-venue V2 flash swap arbitrage
#[derive(Parser)]
#[command(name = "dexarb-flash")]
struct Args {
    /// dotenv file with engine settings
    #[arg(short, long, env = "ENV_FILE", default_value = ".env")]
    env_file: String,

    /// TOML config file, used instead of the env file when given
    #[arg(short, long, env = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, env = "JSON_LOGS")]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if args.json_logs {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
    }

    let config = match &args.config {
        Some(path) => {
            let config = load_config_toml(path)?;
            info!("Configuration loaded from {}", path.display());
            config
        }
        None => load_config_from_file(&args.env_file)?,
    };

    info!("Flash swap arbitrage engine starting (chain_id: {})...", config.chain_id);
    info!("RPC URL: {}", &config.rpc_url[..40.min(config.rpc_url.len())]);
    info!(
        "Venues: {} vs {} | threshold {}% | size {} bps",
        config.venue_a.label, config.venue_b.label, config.diff_threshold, config.trade_size_bps
    );

    let provider = connect(&config).await?;
    let chain_id = provider.get_chain_id().await.context("eth_chainId failed")?;
    if chain_id != config.chain_id {
        bail!("RPC reports chain {} but CHAIN_ID is {}", chain_id, config.chain_id);
    }
    let block = provider.get_block_number().await?;
    info!("Connected! Current block: {}", block);

    let pair = TokenPair::new(
        load_token(&provider, config.base_token).await?,
        load_token(&provider, config.quote_token).await?,
    );
    info!("Pair: {} (base {:?})", pair.symbol(), pair.base.address);

    let client_a: Arc<dyn VenueClient> = Arc::new(RpcVenue::new(
        provider.clone(),
        config.venue_a.factory,
        config.venue_a.router,
    ));
    let client_b: Arc<dyn VenueClient> = Arc::new(RpcVenue::new(
        provider.clone(),
        config.venue_b.factory,
        config.venue_b.router,
    ));
    let venues = VenuePair::new(
        resolve_venue(VenueId::A, &config.venue_a.label, client_a, &pair).await?,
        resolve_venue(VenueId::B, &config.venue_b.label, client_b, &pair).await?,
    );

    let executor: Arc<dyn FlashExecutor> = if config.live_mode {
        Arc::new(ContractExecutor::new(
            provider.clone(),
            config.flash_swap_address,
            config.gas_limit,
            u128::from(config.gas_price),
            config.execution_timeout(),
        ))
    } else {
        Arc::new(DryRunExecutor::new(config.flash_swap_address))
    };

    let (signal_tx, signal_rx) = mpsc::unbounded_channel();
    let controller = ExecutionController::new(
        venues,
        pair,
        config.threshold()?,
        ProfitabilityEstimator::new(config.trade_size_bps),
        executor,
        signal_tx,
    )
    .with_require_profit(config.require_profit);

    let monitor = Monitor::new(Arc::new(controller), signal_rx, config.restart_config());
    info!("Engine initialized, waiting for Swap events...");

    tokio::select! {
        result = monitor.run() => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutdown requested, exiting"),
    }
    Ok(())
}

/// WebSocket provider, with the signing wallet attached in live mode
async fn connect(config: &EngineConfig) -> Result<DynProvider> {
    info!("Connecting via WebSocket...");
    let ws = WsConnect::new(config.rpc_url.clone());

    if !config.live_mode {
        let provider = ProviderBuilder::new()
            .connect_ws(ws)
            .await
            .context("WebSocket connection failed")?;
        return Ok(provider.erased());
    }

    let key = config
        .private_key
        .as_ref()
        .context("LIVE_MODE requires PRIVATE_KEY")?;
    let signer: PrivateKeySigner = key
        .expose()
        .trim()
        .parse()
        .context("PRIVATE_KEY is not a valid secp256k1 key")?;
    info!("Wallet loaded: {:?}", signer.address());

    let provider = ProviderBuilder::new()
        .wallet(signer)
        .connect_ws(ws)
        .await
        .context("WebSocket connection failed")?;
    Ok(provider.erased())
}
