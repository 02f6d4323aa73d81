use crate::config::TokenDescriptor;
use crate::task::{Task, TaskContext, TaskResult};
use crate::utils::{short_hash, whole_tokens};
use anyhow::Result;
use async_trait::async_trait;
use core_logic::{log_failure, log_info, log_success};
use std::time::Duration;

/// Whole tokens requested per mint.
pub const CLAIM_AMOUNT: u64 = 1000;
pub const POST_CLAIM_DELAY: Duration = Duration::from_secs(5);

/// Mints test tokens to the wallet through the token's public `mint`.
/// Failures are logged and reported, never propagated.
pub struct ClaimTokenFaucetTask {
    token: TokenDescriptor,
    name: String,
}

impl ClaimTokenFaucetTask {
    pub fn new(token: TokenDescriptor) -> Self {
        let name = format!("03_claim{}Faucet", token.name);
        Self { token, name }
    }

    async fn claim(&self, ctx: &TaskContext) -> Result<String> {
        let address = ctx.session.address();
        let tx_hash = ctx
            .session
            .mint(self.token.address, address, whole_tokens(CLAIM_AMOUNT))
            .await?;
        log_info!(
            "{} Transaction sent. Hash: {}",
            ctx.progress,
            short_hash(&tx_hash)
        );

        ctx.session.wait_for_inclusion(tx_hash).await?;
        Ok(format!("{:?}", tx_hash))
    }
}

#[async_trait]
impl Task<TaskContext> for ClaimTokenFaucetTask {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: TaskContext) -> Result<TaskResult> {
        let token = &self.token.name;
        log_info!("{} Requesting {} faucet...", ctx.progress, token);

        match self.claim(&ctx).await {
            Ok(tx_hash) => {
                log_success!("{} {} faucet claim succeeded!", ctx.progress, token);
                ctx.pacer.pause(POST_CLAIM_DELAY).await;
                Ok(TaskResult::ok(
                    format!("Minted {} {}", CLAIM_AMOUNT, token),
                    Some(tx_hash),
                ))
            }
            Err(e) => {
                log_failure!("{} {} faucet claim failed: {:#}", ctx.progress, token, e);
                Ok(TaskResult::failed(format!(
                    "{} faucet claim failed: {:#}",
                    token, e
                )))
            }
        }
    }
}
