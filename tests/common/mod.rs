//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use alloy::primitives::{Address, Bytes, TxHash, U256};
use async_trait::async_trait;

use devnet_faucet::blockchain::{BlockSummary, LedgerRpc, Receipt, RpcError, RpcResult};

/// Anvil's first development key.
pub const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// A sequence of scripted answers. The last answer repeats forever.
struct Script<T>(Mutex<VecDeque<T>>);

impl<T: Clone> Script<T> {
    fn new(first: T) -> Self {
        Self(Mutex::new(VecDeque::from([first])))
    }

    fn set(&self, answers: Vec<T>) {
        assert!(!answers.is_empty(), "script needs at least one answer");
        *self.0.lock().unwrap() = answers.into();
    }

    fn next(&self) -> T {
        let mut queue = self.0.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap()
        }
    }
}

/// Scripted in-memory ledger that counts calls and records broadcasts.
pub struct MockLedger {
    balances: Mutex<HashMap<Address, U256>>,
    pending_nonce: Script<RpcResult<u64>>,
    nonce: Script<RpcResult<u64>>,
    gas: Script<RpcResult<u64>>,
    gas_price: Script<RpcResult<u128>>,
    chain_id: Script<RpcResult<u64>>,
    broadcast: Script<RpcResult<()>>,
    receipt: Script<RpcResult<Option<Receipt>>>,
    latest_block: Script<RpcResult<BlockSummary>>,
    broadcasts: Mutex<Vec<Bytes>>,
    /// Accepted broadcasts, added to the scripted pending nonce.
    accepted: AtomicU64,
    stall_receipts: AtomicBool,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLedger {
    /// Pending nonce 5, gas 21000, price 20 wei, chain 10, no receipt yet.
    pub fn new() -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
            pending_nonce: Script::new(Ok(5)),
            nonce: Script::new(Ok(5)),
            gas: Script::new(Ok(21_000)),
            gas_price: Script::new(Ok(20)),
            chain_id: Script::new(Ok(10)),
            broadcast: Script::new(Ok(())),
            receipt: Script::new(Ok(None)),
            latest_block: Script::new(Ok(BlockSummary {
                number: 1,
                transaction_count: 0,
            })),
            broadcasts: Mutex::new(Vec::new()),
            accepted: AtomicU64::new(0),
            stall_receipts: AtomicBool::new(false),
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_balance(self, address: Address, balance: U256) -> Self {
        self.balances.lock().unwrap().insert(address, balance);
        self
    }

    pub fn with_pending_nonce(self, answer: RpcResult<u64>) -> Self {
        self.pending_nonce.set(vec![answer]);
        self
    }

    pub fn with_nonces(self, answers: Vec<RpcResult<u64>>) -> Self {
        self.nonce.set(answers);
        self
    }

    pub fn with_gas(self, answer: RpcResult<u64>) -> Self {
        self.gas.set(vec![answer]);
        self
    }

    pub fn with_gas_price(self, answer: RpcResult<u128>) -> Self {
        self.gas_price.set(vec![answer]);
        self
    }

    pub fn with_chain_id(self, answer: RpcResult<u64>) -> Self {
        self.chain_id.set(vec![answer]);
        self
    }

    pub fn with_broadcast(self, answer: RpcResult<()>) -> Self {
        self.broadcast.set(vec![answer]);
        self
    }

    pub fn with_receipts(self, answers: Vec<RpcResult<Option<Receipt>>>) -> Self {
        self.receipt.set(answers);
        self
    }

    pub fn with_latest_block(self, answer: RpcResult<BlockSummary>) -> Self {
        self.latest_block.set(vec![answer]);
        self
    }

    /// Receipt lookups never resolve.
    pub fn with_stalled_receipts(self) -> Self {
        self.stall_receipts.store(true, Ordering::SeqCst);
        self
    }

    /// Number of times `method` was called.
    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().get(method).copied().unwrap_or(0)
    }

    /// Raw transactions received, in order.
    pub fn broadcasts(&self) -> Vec<Bytes> {
        self.broadcasts.lock().unwrap().clone()
    }

    fn record(&self, method: &'static str) {
        *self.calls.lock().unwrap().entry(method).or_insert(0) += 1;
    }
}

#[async_trait]
impl LedgerRpc for MockLedger {
    async fn get_balance(&self, address: Address) -> RpcResult<U256> {
        self.record("get_balance");
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(&address)
            .copied()
            .unwrap_or_default())
    }

    /// Suspends once before answering, like a real round trip, so
    /// concurrent callers interleave here.
    async fn get_pending_nonce(&self, _address: Address) -> RpcResult<u64> {
        self.record("get_pending_nonce");
        tokio::task::yield_now().await;
        self.pending_nonce
            .next()
            .map(|nonce| nonce + self.accepted.load(Ordering::SeqCst))
    }

    async fn get_nonce(&self, _address: Address) -> RpcResult<u64> {
        self.record("get_nonce");
        self.nonce.next()
    }

    async fn estimate_gas(
        &self,
        _from: Address,
        _to: Address,
        _value: U256,
        _data: Bytes,
    ) -> RpcResult<u64> {
        self.record("estimate_gas");
        self.gas.next()
    }

    async fn suggest_gas_price(&self) -> RpcResult<u128> {
        self.record("suggest_gas_price");
        self.gas_price.next()
    }

    async fn get_chain_id(&self) -> RpcResult<u64> {
        self.record("get_chain_id");
        self.chain_id.next()
    }

    async fn broadcast_transaction(&self, raw: Bytes) -> RpcResult<()> {
        self.record("broadcast_transaction");
        self.broadcasts.lock().unwrap().push(raw);
        let answer = self.broadcast.next();
        if answer.is_ok() {
            self.accepted.fetch_add(1, Ordering::SeqCst);
        }
        answer
    }

    async fn get_receipt(&self, _tx_hash: TxHash) -> RpcResult<Option<Receipt>> {
        self.record("get_receipt");
        if self.stall_receipts.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.receipt.next()
    }

    async fn get_latest_block(&self) -> RpcResult<BlockSummary> {
        self.record("get_latest_block");
        self.latest_block.next()
    }
}

pub fn receipt(block_number: u64) -> Receipt {
    Receipt {
        block_number: Some(block_number),
        success: true,
    }
}

pub fn node_error(message: &str) -> RpcError {
    RpcError::Node(message.to_string())
}

pub fn transport_error() -> RpcError {
    RpcError::Transport("connection refused".to_string())
}
