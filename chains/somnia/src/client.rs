//! Wallet session - signing access to the chain for one wallet.
//!
//! [`ChainClient`] is the seam the tasks talk to. [`WalletSession`] implements
//! it on top of `ethers` (HTTP provider + local signer), and
//! [`EthersSessionFactory`] opens one session per private key while sharing a
//! single provider.

use crate::config::Settings;
use anyhow::{Context, Result};
use async_trait::async_trait;
use core_logic::{ChainError, WalletCredential};
use ethers::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

ethers::contract::abigen!(
    FaucetToken,
    r#"[
        function mint(address to, uint256 amount) payable
        function balanceOf(address owner) view returns (uint256)
        function allowance(address owner, address spender) view returns (uint256)
        function approve(address spender, uint256 amount) returns (bool)
    ]"#
);

ethers::contract::abigen!(
    SwapRouter,
    r#"[
        struct ExactInputSingleParams { address tokenIn; address tokenOut; uint24 fee; address recipient; uint256 amountIn; uint256 amountOutMinimum; uint160 sqrtPriceLimitX96; }
        function exactInputSingle(ExactInputSingleParams params) payable returns (uint256 amountOut)
    ]"#
);

/// Parameters for one `exactInputSingle` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRequest {
    pub token_in: Address,
    pub token_out: Address,
    pub fee: u32,
    pub recipient: Address,
    pub amount_in: U256,
    /// Zero: any output is accepted.
    pub amount_out_minimum: U256,
    /// Zero: no price limit.
    pub sqrt_price_limit_x96: U256,
}

impl From<&SwapRequest> for ExactInputSingleParams {
    fn from(req: &SwapRequest) -> Self {
        ExactInputSingleParams {
            token_in: req.token_in,
            token_out: req.token_out,
            fee: req.fee,
            recipient: req.recipient,
            amount_in: req.amount_in,
            amount_out_minimum: req.amount_out_minimum,
            sqrt_price_limit_x96: req.sqrt_price_limit_x96,
        }
    }
}

/// A transaction that made it into a block with a success status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxInclusion {
    pub tx_hash: H256,
    pub block_number: Option<u64>,
}

#[async_trait]
pub trait ChainClient: Send + Sync {
    fn address(&self) -> Address;

    async fn native_balance(&self) -> Result<U256>;

    async fn token_balance(&self, token: Address) -> Result<U256>;

    async fn allowance(&self, token: Address, spender: Address) -> Result<U256>;

    /// Submits `approve(spender, amount)` and returns the transaction hash.
    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<H256>;

    /// Submits `mint(to, amount)` with zero value and returns the transaction hash.
    async fn mint(&self, token: Address, to: Address, amount: U256) -> Result<H256>;

    async fn exact_input_single(&self, router: Address, request: &SwapRequest) -> Result<H256>;

    /// Waits until `tx_hash` is mined. Fails with a [`ChainError`] on timeout or revert.
    async fn wait_for_inclusion(&self, tx_hash: H256) -> Result<TxInclusion>;
}

/// Opens a [`ChainClient`] for a private key.
#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn open(&self, credential: &WalletCredential) -> Result<Arc<dyn ChainClient>>;
}

type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

pub struct WalletSession {
    client: Arc<SignerClient>,
    tx_timeout: Duration,
    receipt_poll: Duration,
}

impl WalletSession {
    pub fn new(
        provider: Provider<Http>,
        wallet: LocalWallet,
        chain_id: u64,
        settings: &Settings,
    ) -> Self {
        let client = SignerMiddleware::new(provider, wallet.with_chain_id(chain_id));
        Self {
            client: Arc::new(client),
            tx_timeout: settings.tx_timeout,
            receipt_poll: settings.receipt_poll,
        }
    }

    fn token(&self, token: Address) -> FaucetToken<SignerClient> {
        FaucetToken::new(token, self.client.clone())
    }
}

#[async_trait]
impl ChainClient for WalletSession {
    fn address(&self) -> Address {
        self.client.address()
    }

    async fn native_balance(&self) -> Result<U256> {
        self.client
            .get_balance(self.address(), None)
            .await
            .context("Failed to get native balance")
    }

    async fn token_balance(&self, token: Address) -> Result<U256> {
        self.token(token)
            .balance_of(self.address())
            .call()
            .await
            .with_context(|| format!("Failed to get balance of token {:?}", token))
    }

    async fn allowance(&self, token: Address, spender: Address) -> Result<U256> {
        self.token(token)
            .allowance(self.address(), spender)
            .call()
            .await
            .with_context(|| format!("Failed to get allowance of token {:?}", token))
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<H256> {
        let contract = self.token(token);
        let call = contract.approve(spender, amount);
        let pending = call.send().await.context("Approve submission rejected")?;
        Ok(pending.tx_hash())
    }

    async fn mint(&self, token: Address, to: Address, amount: U256) -> Result<H256> {
        let contract = self.token(token);
        let call = contract.mint(to, amount).value(U256::zero());
        let pending = call.send().await.context("Mint submission rejected")?;
        Ok(pending.tx_hash())
    }

    async fn exact_input_single(&self, router: Address, request: &SwapRequest) -> Result<H256> {
        let contract = SwapRouter::new(router, self.client.clone());
        let call = contract.exact_input_single(request.into());
        let pending = call.send().await.context("Swap submission rejected")?;
        Ok(pending.tx_hash())
    }

    async fn wait_for_inclusion(&self, tx_hash: H256) -> Result<TxInclusion> {
        let pending =
            PendingTransaction::new(tx_hash, self.client.provider()).interval(self.receipt_poll);

        let receipt = match tokio::time::timeout(self.tx_timeout, pending).await {
            Ok(res) => res.context("Failed to poll transaction receipt")?,
            Err(_) => {
                return Err(ChainError::InclusionTimeout {
                    tx_hash: format!("{:?}", tx_hash),
                    timeout_secs: self.tx_timeout.as_secs(),
                }
                .into())
            }
        };

        let receipt = receipt.ok_or_else(|| ChainError::Dropped {
            tx_hash: format!("{:?}", tx_hash),
        })?;

        debug!(
            "Receipt for {:?}: status {:?}, block {:?}",
            tx_hash, receipt.status, receipt.block_number
        );

        if receipt.status != Some(U64::from(1)) {
            return Err(ChainError::Reverted {
                tx_hash: format!("{:?}", tx_hash),
            }
            .into());
        }

        Ok(TxInclusion {
            tx_hash,
            block_number: receipt.block_number.map(|b| b.as_u64()),
        })
    }
}

/// Shares one HTTP provider and chain id across all wallet sessions.
pub struct EthersSessionFactory {
    provider: Provider<Http>,
    chain_id: u64,
    settings: Arc<Settings>,
}

impl EthersSessionFactory {
    /// Connects to the configured endpoint. The chain id is taken from the
    /// settings, or read from the endpoint once when absent.
    pub async fn connect(settings: Arc<Settings>) -> Result<Self> {
        let provider = Provider::<Http>::try_from(settings.chain.rpc_endpoint.as_str())
            .context("Invalid RPC URL")?
            .interval(settings.receipt_poll);

        let chain_id = match settings.chain.chain_id {
            Some(id) => id,
            None => provider
                .get_chainid()
                .await
                .context("Failed to read chain id from RPC")?
                .as_u64(),
        };

        debug!("Connected to {} (chain id {})", settings.chain.rpc_endpoint, chain_id);

        Ok(Self {
            provider,
            chain_id,
            settings,
        })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }
}

#[async_trait]
impl SessionFactory for EthersSessionFactory {
    async fn open(&self, credential: &WalletCredential) -> Result<Arc<dyn ChainClient>> {
        credential.validate()?;
        let wallet: LocalWallet = credential
            .expose()
            .parse()
            .context("Failed to parse private key")?;

        Ok(Arc::new(WalletSession::new(
            self.provider.clone(),
            wallet,
            self.chain_id,
            &self.settings,
        )))
    }
}
