use crate::task::TaskContext;
use crate::utils::{format_token_amount, short_address};
use anyhow::Result;
use core_logic::log_info;
use ethers::types::Address;

/// Point-in-time balances of one wallet, already formatted for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletSnapshot {
    pub address: Address,
    pub native: String,
    pub ping: String,
    pub pong: String,
    pub network: String,
}

/// Reads native, Ping and Pong balances one after another and logs them.
///
/// Errors are not caught here; the caller decides what a failed read means.
pub async fn report_balances(ctx: &TaskContext) -> Result<WalletSnapshot> {
    let session = &ctx.session;
    let settings = &ctx.settings;
    let address = session.address();

    let native = session.native_balance().await?;
    let ping = session.token_balance(settings.ping.address).await?;
    let pong = session.token_balance(settings.pong.address).await?;

    let snapshot = WalletSnapshot {
        address,
        native: format_token_amount(native),
        ping: format_token_amount(ping),
        pong: format_token_amount(pong),
        network: settings.network_name().to_string(),
    };

    log_info!(
        "{} Wallet - Address: {}, Native: {}, {}: {}, {}: {}, Network: {}",
        ctx.progress,
        short_address(&snapshot.address),
        snapshot.native,
        settings.ping.name,
        snapshot.ping,
        settings.pong.name,
        snapshot.pong,
        snapshot.network
    );

    Ok(snapshot)
}
