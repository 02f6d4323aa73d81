use crate::task::TaskContext;
use crate::utils::{format_token_amount, short_address, short_hash};
use anyhow::Result;
use core_logic::{log_info, log_success};
use ethers::types::{Address, H256, U256};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalOutcome {
    AlreadyApproved,
    Approved(H256),
}

/// Makes sure `spender` may move at least `amount` of `token`.
///
/// When the allowance is short, approves `U256::MAX` so later swaps in the
/// same direction need no further approval. Errors propagate.
pub async fn ensure_allowance(
    ctx: &TaskContext,
    token: Address,
    spender: Address,
    amount: U256,
) -> Result<ApprovalOutcome> {
    let current = ctx.session.allowance(token, spender).await?;

    if current >= amount {
        log_info!("{} Token already approved.", ctx.progress);
        return Ok(ApprovalOutcome::AlreadyApproved);
    }

    log_info!(
        "{} Approval needed for token {}. Current allowance: {}",
        ctx.progress,
        short_address(&token),
        format_token_amount(current)
    );

    let tx_hash = ctx.session.approve(token, spender, U256::MAX).await?;
    log_info!(
        "{} Approval transaction sent: {}",
        ctx.progress,
        short_hash(&tx_hash)
    );

    ctx.session.wait_for_inclusion(tx_hash).await?;
    log_success!("{} Approval succeeded.", ctx.progress);

    Ok(ApprovalOutcome::Approved(tx_hash))
}
