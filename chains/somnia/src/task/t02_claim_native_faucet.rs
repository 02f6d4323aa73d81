use crate::faucet::FaucetStatus;
use crate::task::{Task, TaskContext, TaskResult};
use crate::utils::short_address;
use anyhow::Result;
use async_trait::async_trait;
use core_logic::{log_failure, log_info, log_success, NetworkError};
use std::time::Duration;

/// Wait after a granted claim so the funds are visible to the next balance read.
pub const SETTLE_DELAY: Duration = Duration::from_secs(10);

/// Requests native currency from the HTTP faucet. Never fails: every outcome
/// is logged and reported in the returned [`TaskResult`].
pub struct ClaimNativeFaucetTask;

#[async_trait]
impl Task<TaskContext> for ClaimNativeFaucetTask {
    fn name(&self) -> &str {
        "02_claimNativeFaucet"
    }

    async fn run(&self, ctx: TaskContext) -> Result<TaskResult> {
        let address = ctx.session.address();
        let endpoint = ctx.settings.faucet_url.as_str();

        if let Some(proxy) = ctx.faucet.proxy() {
            log_info!("{} Using proxy: {}", ctx.progress, proxy.url);
        }
        log_info!(
            "{} Requesting native faucet for {}...",
            ctx.progress,
            short_address(&address)
        );

        let reply = match ctx.faucet.request(address).await {
            Ok(reply) => reply,
            Err(e) => {
                log_failure!("{} Native faucet claim failed: {:#}", ctx.progress, e);
                return Ok(TaskResult::failed(format!("Native faucet claim failed: {:#}", e)));
            }
        };

        match FaucetStatus::classify(&reply, endpoint) {
            FaucetStatus::Granted => {
                log_success!(
                    "{} Native faucet claim succeeded. Response: {}",
                    ctx.progress,
                    reply.body
                );
                log_info!("{} Waiting for network confirmation...", ctx.progress);
                ctx.pacer.pause(SETTLE_DELAY).await;
                Ok(TaskResult::ok("Native faucet claimed", None))
            }
            FaucetStatus::RateLimited => {
                log_info!("{} Faucet rate-limited or already claimed", ctx.progress);
                Ok(TaskResult::failed("Rate-limited or already claimed"))
            }
            FaucetStatus::Rejected(NetworkError::HttpError {
                status_code, body, ..
            }) => {
                log_failure!(
                    "{} Native faucet claim failed: status {}, error: {}",
                    ctx.progress,
                    status_code,
                    body
                );
                Ok(TaskResult::failed(format!(
                    "Unexpected faucet status {}",
                    status_code
                )))
            }
            FaucetStatus::Rejected(other) => {
                log_failure!("{} Native faucet claim failed: {}", ctx.progress, other);
                Ok(TaskResult::failed(other.to_string()))
            }
        }
    }
}
