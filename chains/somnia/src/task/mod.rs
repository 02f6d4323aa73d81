use crate::client::ChainClient;
use crate::config::Settings;
use crate::faucet::FaucetApi;
use core_logic::Pacer;
use std::fmt;
use std::sync::Arc;

pub mod t01_check_balance;
pub mod t02_claim_native_faucet;
pub mod t03_claim_token_faucet;
pub mod t04_approve_token;
pub mod t05_auto_swap;

pub use self::t01_check_balance::{report_balances, WalletSnapshot};
pub use self::t02_claim_native_faucet::ClaimNativeFaucetTask;
pub use self::t03_claim_token_faucet::ClaimTokenFaucetTask;
pub use self::t04_approve_token::{ensure_allowance, ApprovalOutcome};
pub use self::t05_auto_swap::{AutoSwapTask, SwapDirection, SwapReport, SwapStop};

pub use core_logic::traits::{Task, TaskResult};

/// Position of the wallet in the batch, rendered as `[current/total]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}/{}]", self.current, self.total)
    }
}

#[derive(Clone)]
pub struct TaskContext {
    pub session: Arc<dyn ChainClient>,
    pub settings: Arc<Settings>,
    pub faucet: Arc<dyn FaucetApi>,
    pub pacer: Arc<dyn Pacer>,
    pub progress: Progress,
}

// Trait alias
pub type SomniaTask = dyn Task<TaskContext> + Send + Sync;
