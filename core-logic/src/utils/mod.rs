//! # Utilities Module
//!
//! Internal utility modules for the core-logic crate.
//! These modules are marked as `pub(crate)` to enforce API boundaries.

pub(crate) mod logger;
pub(crate) mod pacing;
pub(crate) mod proxy_manager;
pub(crate) mod wallet_manager;

pub use logger::{setup_logger, Severity, TASK_RESULT_TARGET};
pub use pacing::TokioPacer;
pub use proxy_manager::ProxyManager;
pub use wallet_manager::{WalletCredential, WalletManager};
