use anyhow::Result;
use clap::Parser;
use core_logic::{log_failure, log_info, setup_logger, TokioPacer, WalletManager};
use dotenv::dotenv;
use somnia_bot::task::t05_auto_swap::DEFAULT_SWAP_COUNT;
use somnia_bot::{BatchDriver, BatchPolicy, EthersSessionFactory, HttpFaucet, SomniaConfig};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Optional TOML file; environment variables override it
    #[arg(short, long, default_value = "somnia.toml")]
    config: String,
    /// One private key per line
    #[arg(short, long, default_value = WalletManager::DEFAULT_KEY_FILE)]
    keys: String,
    /// Swap rounds per wallet
    #[arg(short, long, default_value_t = DEFAULT_SWAP_COUNT)]
    swaps: u32,
    /// Abort the whole batch when one wallet fails
    #[arg(long)]
    fail_fast: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let log_guard = setup_logger();
    dotenv().ok();

    let args = Args::parse();

    log_info!("=================== SOMNIA AUTO SWAP BATCH MODE ===================");

    let settings = SomniaConfig::load(&args.config)?.resolve()?;
    log_info!(
        "Network: {} ({})",
        settings.network_name(),
        settings.chain.rpc_endpoint
    );
    let settings = Arc::new(settings);

    let manager = match WalletManager::from_file(&args.keys) {
        Ok(m) => m,
        Err(e) => {
            log_failure!("Cannot read {}: {}", args.keys, e);
            drop(log_guard);
            std::process::exit(1);
        }
    };

    let sessions = EthersSessionFactory::connect(settings.clone()).await?;
    log_info!("Chain id: {}", sessions.chain_id());

    let faucet = HttpFaucet::new(&settings)?;
    let policy = if args.fail_fast {
        BatchPolicy::FailFast
    } else {
        BatchPolicy::Isolate
    };

    let driver = BatchDriver::new(
        settings,
        Arc::new(sessions),
        Arc::new(faucet),
        Arc::new(TokioPacer),
        args.swaps,
    )
    .with_policy(policy);

    if let Err(e) = driver.run(manager.credentials()).await {
        log_failure!("Batch failed: {:#}", e);
        drop(log_guard);
        std::process::exit(1);
    }

    Ok(())
}
