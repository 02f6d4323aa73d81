//! # Core Logic - Shared Utilities for Testnet Automation
//!
//! Chain-agnostic pieces shared by the chain crates: typed errors,
//! configuration primitives, key loading, proxy parsing, the console/file
//! logger and the task/pacing traits.
//!
//! ## Modules
//!
//! - [`config`] - Configuration structures shared by chain crates
//! - [`error`] - Typed error handling with thiserror
//! - [`traits`] - Core trait definitions
//! - `utils` - Logger, key loading, proxy parsing, pacing

pub mod config;
pub mod error;
pub mod traits;
pub(crate) mod utils;

// Used by the log_* macros.
#[doc(hidden)]
pub use tracing;

pub use config::{ChainConfig, ProxyConfig};
pub use error::{ChainError, ConfigError, CoreError, NetworkError, WalletError};
pub use traits::{Pacer, Task, TaskResult};

pub use utils::{
    setup_logger, ProxyManager, Severity, TokioPacer, WalletCredential, WalletManager,
    TASK_RESULT_TARGET,
};
