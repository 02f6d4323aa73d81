//! # Somnia Bot
//!
//! Batch automation for the Somnia testnet: balance reports, native and
//! token faucet claims, and repeated Ping/Pong swaps through the router,
//! one wallet after another.

pub mod batch;
pub mod client;
pub mod config;
pub mod faucet;
pub mod task;
pub mod utils;

pub use batch::{BatchDriver, BatchPolicy, BatchSummary};
pub use client::{ChainClient, EthersSessionFactory, SessionFactory, SwapRequest, TxInclusion};
pub use self::config::{Settings, SomniaConfig, TokenDescriptor};
pub use faucet::{FaucetApi, FaucetReply, HttpFaucet};
