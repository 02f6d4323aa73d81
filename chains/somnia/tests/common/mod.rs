#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use core_logic::{ChainError, Pacer, WalletCredential};
use ethers::types::{Address, H256, U256};
use somnia_bot::client::{ChainClient, SessionFactory, SwapRequest, TxInclusion};
use somnia_bot::faucet::{FaucetApi, FaucetReply};
use somnia_bot::task::{Progress, TaskContext};
use somnia_bot::utils::whole_tokens;
use somnia_bot::{Settings, SomniaConfig};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    NativeBalance,
    TokenBalance(Address),
    Allowance {
        token: Address,
        spender: Address,
    },
    Approve {
        token: Address,
        spender: Address,
        amount: U256,
    },
    Mint {
        token: Address,
        to: Address,
        amount: U256,
    },
    Swap(SwapRequest),
    Wait(H256),
}

pub type Journal = Arc<Mutex<Vec<(Address, Call)>>>;

#[derive(Debug, Default, Clone)]
pub struct Failures {
    pub balance_reads: bool,
    pub mint: bool,
    /// Swap submission fails from this 1-based attempt on.
    pub swap_from_attempt: Option<u32>,
    pub inclusion_timeout: bool,
}

#[derive(Default)]
struct MockState {
    native: U256,
    balances: HashMap<Address, U256>,
    allowances: HashMap<(Address, Address), U256>,
    next_hash: u64,
    swap_attempts: u32,
}

/// In-memory chain for one wallet. Swaps convert 1:1.
pub struct MockChain {
    address: Address,
    state: Mutex<MockState>,
    failures: Failures,
    journal: Journal,
}

impl MockChain {
    pub fn new(address: Address, journal: Journal) -> Self {
        Self {
            address,
            state: Mutex::new(MockState {
                native: whole_tokens(1),
                next_hash: address.to_low_u64_be() << 16,
                ..Default::default()
            }),
            failures: Failures::default(),
            journal,
        }
    }

    pub fn with_failures(mut self, failures: Failures) -> Self {
        self.failures = failures;
        self
    }

    pub fn with_balance(self, token: Address, whole: u64) -> Self {
        self.state
            .lock()
            .unwrap()
            .balances
            .insert(token, whole_tokens(whole));
        self
    }

    pub fn balance(&self, token: Address) -> U256 {
        self.state
            .lock()
            .unwrap()
            .balances
            .get(&token)
            .copied()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.journal
            .lock()
            .unwrap()
            .iter()
            .filter(|(addr, _)| *addr == self.address)
            .map(|(_, c)| c.clone())
            .collect()
    }

    fn record(&self, call: Call) {
        self.journal.lock().unwrap().push((self.address, call));
    }

    fn next_hash(&self) -> H256 {
        let mut state = self.state.lock().unwrap();
        state.next_hash += 1;
        H256::from_low_u64_be(state.next_hash)
    }
}

#[async_trait]
impl ChainClient for MockChain {
    fn address(&self) -> Address {
        self.address
    }

    async fn native_balance(&self) -> Result<U256> {
        self.record(Call::NativeBalance);
        if self.failures.balance_reads {
            return Err(anyhow!("connection reset by peer"));
        }
        Ok(self.state.lock().unwrap().native)
    }

    async fn token_balance(&self, token: Address) -> Result<U256> {
        self.record(Call::TokenBalance(token));
        if self.failures.balance_reads {
            return Err(anyhow!("connection reset by peer"));
        }
        Ok(self.balance(token))
    }

    async fn allowance(&self, token: Address, spender: Address) -> Result<U256> {
        self.record(Call::Allowance { token, spender });
        Ok(self
            .state
            .lock()
            .unwrap()
            .allowances
            .get(&(token, spender))
            .copied()
            .unwrap_or_default())
    }

    async fn approve(&self, token: Address, spender: Address, amount: U256) -> Result<H256> {
        self.record(Call::Approve {
            token,
            spender,
            amount,
        });
        self.state
            .lock()
            .unwrap()
            .allowances
            .insert((token, spender), amount);
        Ok(self.next_hash())
    }

    async fn mint(&self, token: Address, to: Address, amount: U256) -> Result<H256> {
        self.record(Call::Mint { token, to, amount });
        if self.failures.mint {
            return Err(anyhow!("execution reverted: cooldown"));
        }
        let mut state = self.state.lock().unwrap();
        let entry = state.balances.entry(token).or_default();
        *entry += amount;
        drop(state);
        Ok(self.next_hash())
    }

    async fn exact_input_single(&self, router: Address, request: &SwapRequest) -> Result<H256> {
        self.record(Call::Swap(request.clone()));
        let mut state = self.state.lock().unwrap();
        state.swap_attempts += 1;
        if let Some(from) = self.failures.swap_from_attempt {
            if state.swap_attempts >= from {
                return Err(anyhow!("swap rejected by node"));
            }
        }

        let allowance = state
            .allowances
            .get(&(request.token_in, router))
            .copied()
            .unwrap_or_default();
        if allowance < request.amount_in {
            return Err(anyhow!("STF: allowance too low"));
        }
        let have = state
            .balances
            .get(&request.token_in)
            .copied()
            .unwrap_or_default();
        if have < request.amount_in {
            return Err(anyhow!("STF: balance too low"));
        }

        state.balances.insert(request.token_in, have - request.amount_in);
        *state.balances.entry(request.token_out).or_default() += request.amount_in;
        drop(state);
        Ok(self.next_hash())
    }

    async fn wait_for_inclusion(&self, tx_hash: H256) -> Result<TxInclusion> {
        self.record(Call::Wait(tx_hash));
        if self.failures.inclusion_timeout {
            return Err(ChainError::InclusionTimeout {
                tx_hash: format!("{:?}", tx_hash),
                timeout_secs: 180,
            }
            .into());
        }
        Ok(TxInclusion {
            tx_hash,
            block_number: Some(1),
        })
    }
}

/// Hands out pre-built mock chains by private key.
#[derive(Default)]
pub struct MockSessions {
    chains: HashMap<String, Arc<MockChain>>,
}

impl MockSessions {
    pub fn insert(&mut self, credential: &WalletCredential, chain: Arc<MockChain>) {
        self.chains.insert(credential.expose().to_string(), chain);
    }
}

#[async_trait]
impl SessionFactory for MockSessions {
    async fn open(&self, credential: &WalletCredential) -> Result<Arc<dyn ChainClient>> {
        let chain: Arc<MockChain> = self
            .chains
            .get(credential.expose())
            .cloned()
            .ok_or_else(|| anyhow!("unknown key"))?;
        Ok(chain as Arc<dyn ChainClient>)
    }
}

pub enum FaucetBehavior {
    Status(u16, &'static str),
    Transport,
}

pub struct MockFaucet {
    behavior: FaucetBehavior,
    pub requests: Mutex<Vec<Address>>,
}

impl MockFaucet {
    pub fn new(behavior: FaucetBehavior) -> Self {
        Self {
            behavior,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<Address> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl FaucetApi for MockFaucet {
    async fn request(&self, address: Address) -> Result<FaucetReply> {
        self.requests.lock().unwrap().push(address);
        match self.behavior {
            FaucetBehavior::Status(status, body) => Ok(FaucetReply {
                status,
                body: body.to_string(),
            }),
            FaucetBehavior::Transport => Err(anyhow!("dns error: no such host")),
        }
    }
}

/// Records every pause instead of sleeping.
#[derive(Default)]
pub struct RecordingPacer {
    pauses: Mutex<Vec<Duration>>,
}

impl RecordingPacer {
    pub fn pauses(&self) -> Vec<Duration> {
        self.pauses.lock().unwrap().clone()
    }
}

#[async_trait]
impl Pacer for RecordingPacer {
    async fn pause(&self, duration: Duration) {
        self.pauses.lock().unwrap().push(duration);
    }
}

pub fn settings() -> Arc<Settings> {
    Arc::new(
        SomniaConfig::default()
            .resolve()
            .expect("default settings resolve"),
    )
}

pub fn credential(n: u8) -> WalletCredential {
    WalletCredential::new(&format!("{:064x}", n))
}

pub fn new_journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn context(
    chain: Arc<MockChain>,
    faucet: Arc<MockFaucet>,
    pacer: Arc<RecordingPacer>,
) -> TaskContext {
    TaskContext {
        session: chain,
        settings: settings(),
        faucet,
        pacer,
        progress: Progress {
            current: 1,
            total: 1,
        },
    }
}
