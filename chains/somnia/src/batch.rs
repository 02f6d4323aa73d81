//! Batch driver - runs the per-wallet pipeline over every key, in file order.

use crate::client::SessionFactory;
use crate::config::Settings;
use crate::faucet::FaucetApi;
use crate::task::{
    report_balances, AutoSwapTask, ClaimNativeFaucetTask, ClaimTokenFaucetTask, Progress,
    SomniaTask, SwapReport, TaskContext,
};
use anyhow::{Context, Result};
use core_logic::{log_failure, log_info, log_success, Pacer, WalletCredential};
use std::sync::Arc;
use std::time::Duration;

pub const INTER_WALLET_DELAY: Duration = Duration::from_secs(2);

/// What happens when a wallet's pipeline fails outside the guarded steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    /// Log the failure and move on to the next wallet.
    #[default]
    Isolate,
    /// Abort the whole batch on the first such failure.
    FailFast,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
}

pub struct BatchDriver {
    settings: Arc<Settings>,
    sessions: Arc<dyn SessionFactory>,
    faucet: Arc<dyn FaucetApi>,
    pacer: Arc<dyn Pacer>,
    faucet_tasks: Vec<Box<SomniaTask>>,
    swap_task: AutoSwapTask,
    policy: BatchPolicy,
}

impl BatchDriver {
    pub fn new(
        settings: Arc<Settings>,
        sessions: Arc<dyn SessionFactory>,
        faucet: Arc<dyn FaucetApi>,
        pacer: Arc<dyn Pacer>,
        swaps: u32,
    ) -> Self {
        let faucet_tasks: Vec<Box<SomniaTask>> = vec![
            Box::new(ClaimNativeFaucetTask),
            Box::new(ClaimTokenFaucetTask::new(settings.ping.clone())),
            Box::new(ClaimTokenFaucetTask::new(settings.pong.clone())),
        ];

        Self {
            settings,
            sessions,
            faucet,
            pacer,
            faucet_tasks,
            swap_task: AutoSwapTask::new(swaps),
            policy: BatchPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: BatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Processes every wallet strictly one after another.
    pub async fn run(&self, credentials: &[WalletCredential]) -> Result<BatchSummary> {
        let mut summary = BatchSummary {
            total: credentials.len(),
            ..Default::default()
        };
        log_info!("Detected {} wallets.", summary.total);

        for (i, credential) in credentials.iter().enumerate() {
            let progress = Progress {
                current: i + 1,
                total: summary.total,
            };

            match self.process_wallet(credential, progress).await {
                Ok(_) => summary.completed += 1,
                Err(e) => {
                    summary.failed += 1;
                    log_failure!("{} Wallet pipeline failed: {:#}", progress, e);
                    if self.policy == BatchPolicy::FailFast {
                        return Err(e.context(format!("Batch aborted at wallet {}", progress)));
                    }
                }
            }

            log_info!(
                "{} Wallet done, waiting {}s before the next one...",
                progress,
                INTER_WALLET_DELAY.as_secs()
            );
            self.pacer.pause(INTER_WALLET_DELAY).await;
        }

        log_success!(
            "All wallets processed. Success: {} | Failed: {} | Total: {}",
            summary.completed,
            summary.failed,
            summary.total
        );

        Ok(summary)
    }

    /// Snapshot, three faucet claims, snapshot, swaps.
    ///
    /// Session creation and balance snapshots are unguarded and propagate;
    /// faucet claims and the swap sequence absorb their own failures.
    pub async fn process_wallet(
        &self,
        credential: &WalletCredential,
        progress: Progress,
    ) -> Result<SwapReport> {
        let session = self
            .sessions
            .open(credential)
            .await
            .context("Failed to open wallet session")?;

        let ctx = TaskContext {
            session,
            settings: self.settings.clone(),
            faucet: self.faucet.clone(),
            pacer: self.pacer.clone(),
            progress,
        };

        report_balances(&ctx).await?;

        for task in &self.faucet_tasks {
            let result = task.run(ctx.clone()).await?;
            tracing::debug!("{} {} -> {:?}", progress, task.name(), result);
        }

        report_balances(&ctx).await?;

        Ok(self.swap_task.execute(&ctx).await)
    }
}
