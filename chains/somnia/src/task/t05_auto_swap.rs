use crate::client::SwapRequest;
use crate::task::{ensure_allowance, report_balances, Task, TaskContext, TaskResult};
use crate::utils::{short_hash, whole_tokens};
use anyhow::Result;
use async_trait::async_trait;
use core_logic::{log_failure, log_info, log_success};
use ethers::types::{Address, U256};
use rand::Rng;
use std::ops::RangeInclusive;
use std::time::Duration;

/// Router fee tier (0.05%).
pub const FEE_TIER: u32 = 500;
/// Whole tokens a side needs before it can be swapped from.
pub const MIN_SWAP_BALANCE: u64 = 100;
/// Whole-token range the swap input is drawn from.
pub const SWAP_AMOUNT_RANGE: RangeInclusive<u64> = 100..=500;
/// Pause between swaps, in milliseconds.
pub const SWAP_DELAY_MS: RangeInclusive<u64> = 2000..=5000;
pub const DEFAULT_SWAP_COUNT: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapDirection {
    PingToPong,
    PongToPing,
}

impl SwapDirection {
    /// Picks the direction from current balances.
    ///
    /// Both sides funded: fair coin. One side funded: drain it into the other.
    /// Neither: `None`, the loop stops.
    pub fn choose<R: Rng + ?Sized>(
        ping: U256,
        pong: U256,
        threshold: U256,
        rng: &mut R,
    ) -> Option<Self> {
        match (ping >= threshold, pong >= threshold) {
            (true, true) => Some(if rng.gen_bool(0.5) {
                SwapDirection::PongToPing
            } else {
                SwapDirection::PingToPong
            }),
            (false, true) => Some(SwapDirection::PongToPing),
            (true, false) => Some(SwapDirection::PingToPong),
            (false, false) => None,
        }
    }

    /// `(token_in, token_out)` for this direction.
    pub fn tokens(self, ping: Address, pong: Address) -> (Address, Address) {
        match self {
            SwapDirection::PingToPong => (ping, pong),
            SwapDirection::PongToPing => (pong, ping),
        }
    }
}

/// Whole-token swap input, uniform over [`SWAP_AMOUNT_RANGE`].
pub fn random_swap_amount<R: Rng + ?Sized>(rng: &mut R) -> u64 {
    rng.gen_range(SWAP_AMOUNT_RANGE)
}

pub fn random_swap_delay<R: Rng + ?Sized>(rng: &mut R) -> Duration {
    Duration::from_millis(rng.gen_range(SWAP_DELAY_MS))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapStop {
    Completed,
    /// Neither token had enough balance; not an error.
    InsufficientBalance,
    /// An error ended the sequence; remaining swaps were skipped.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapReport {
    pub executed: u32,
    pub planned: u32,
    pub stop: SwapStop,
}

/// Swaps back and forth between Ping and Pong `swaps` times.
pub struct AutoSwapTask {
    swaps: u32,
}

impl AutoSwapTask {
    pub fn new(swaps: u32) -> Self {
        Self { swaps }
    }

    /// Runs the whole sequence. The first error is logged once and ends it.
    pub async fn execute(&self, ctx: &TaskContext) -> SwapReport {
        log_info!("{} Starting auto swap, {} rounds.", ctx.progress, self.swaps);

        let mut executed = 0;
        let stop = match self.swap_loop(ctx, &mut executed).await {
            Ok(stop) => {
                log_info!("{} Auto swap finished.", ctx.progress);
                stop
            }
            Err(e) => {
                log_failure!("{} Auto swap failed: {:#}", ctx.progress, e);
                SwapStop::Failed(format!("{:#}", e))
            }
        };

        SwapReport {
            executed,
            planned: self.swaps,
            stop,
        }
    }

    async fn swap_loop(&self, ctx: &TaskContext, executed: &mut u32) -> Result<SwapStop> {
        let session = &ctx.session;
        let settings = &ctx.settings;
        let threshold = whole_tokens(MIN_SWAP_BALANCE);

        for round in 1..=self.swaps {
            let ping_balance = session.token_balance(settings.ping.address).await?;
            let pong_balance = session.token_balance(settings.pong.address).await?;

            let picked = SwapDirection::choose(
                ping_balance,
                pong_balance,
                threshold,
                &mut rand::thread_rng(),
            );
            let Some(direction) = picked else {
                log_info!(
                    "{} Both {} and {} balances are too low, stopping swaps.",
                    ctx.progress,
                    settings.ping.name,
                    settings.pong.name
                );
                return Ok(SwapStop::InsufficientBalance);
            };

            let (token_in, token_out) =
                direction.tokens(settings.ping.address, settings.pong.address);
            let amount = random_swap_amount(&mut rand::thread_rng());
            let amount_in = whole_tokens(amount);

            log_info!(
                "{} Swap {}/{}: {} -> {}, amount {}",
                ctx.progress,
                round,
                self.swaps,
                settings.token_name(token_in),
                settings.token_name(token_out),
                amount
            );

            ensure_allowance(ctx, token_in, settings.swap_router, amount_in).await?;

            let request = SwapRequest {
                token_in,
                token_out,
                fee: FEE_TIER,
                recipient: session.address(),
                amount_in,
                amount_out_minimum: U256::zero(),
                sqrt_price_limit_x96: U256::zero(),
            };
            let tx_hash = session
                .exact_input_single(settings.swap_router, &request)
                .await?;
            log_info!(
                "{} Swap {}/{} transaction sent: {}",
                ctx.progress,
                round,
                self.swaps,
                short_hash(&tx_hash)
            );

            session.wait_for_inclusion(tx_hash).await?;
            *executed += 1;
            log_success!("{} Swap {}/{} succeeded.", ctx.progress, round, self.swaps);

            report_balances(ctx).await?;

            if round < self.swaps {
                let delay = random_swap_delay(&mut rand::thread_rng());
                log_info!(
                    "{} Waiting {:.1}s before the next swap...",
                    ctx.progress,
                    delay.as_secs_f64()
                );
                ctx.pacer.pause(delay).await;
            }
        }

        Ok(SwapStop::Completed)
    }
}

#[async_trait]
impl Task<TaskContext> for AutoSwapTask {
    fn name(&self) -> &str {
        "05_autoSwap"
    }

    async fn run(&self, ctx: TaskContext) -> Result<TaskResult> {
        let report = self.execute(&ctx).await;
        let message = format!("Executed {}/{} swaps", report.executed, report.planned);

        Ok(match report.stop {
            SwapStop::Failed(reason) => TaskResult::failed(format!("{} ({})", message, reason)),
            _ => TaskResult::ok(message, None),
        })
    }
}
