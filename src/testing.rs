//! In-memory lock contract used by the unit tests

use crate::contract::LockReader;
use crate::validation::ContractCallError;
use async_trait::async_trait;
use ethers::types::{Address, U256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub(crate) struct StaticLock {
    has_valid_key: Result<bool, ContractCallError>,
    balance: Result<U256, ContractCallError>,
    expiration: Result<U256, ContractCallError>,
    delays: HashMap<Address, Duration>,
    has_valid_key_calls: AtomicUsize,
    balance_calls: AtomicUsize,
    expiration_calls: AtomicUsize,
}

impl StaticLock {
    pub fn new() -> Self {
        Self {
            has_valid_key: Ok(false),
            balance: Ok(U256::zero()),
            expiration: Ok(U256::zero()),
            delays: HashMap::new(),
            has_valid_key_calls: AtomicUsize::new(0),
            balance_calls: AtomicUsize::new(0),
            expiration_calls: AtomicUsize::new(0),
        }
    }

    pub fn has_valid_key(mut self, reply: Result<bool, ContractCallError>) -> Self {
        self.has_valid_key = reply;
        self
    }

    pub fn balance(mut self, reply: Result<U256, ContractCallError>) -> Self {
        self.balance = reply;
        self
    }

    pub fn expiration(mut self, reply: Result<U256, ContractCallError>) -> Self {
        self.expiration = reply;
        self
    }

    /// Hold the primary check for `owner` before answering
    pub fn delay_for(mut self, owner: Address, delay: Duration) -> Self {
        self.delays.insert(owner, delay);
        self
    }

    /// (getHasValidKey, balanceOf, keyExpirationTimestampFor) call counts
    pub fn calls(&self) -> (usize, usize, usize) {
        (
            self.has_valid_key_calls.load(Ordering::SeqCst),
            self.balance_calls.load(Ordering::SeqCst),
            self.expiration_calls.load(Ordering::SeqCst),
        )
    }

    pub fn total_calls(&self) -> usize {
        let (a, b, c) = self.calls();
        a + b + c
    }
}

#[async_trait]
impl LockReader for StaticLock {
    async fn get_has_valid_key(&self, owner: Address) -> Result<bool, ContractCallError> {
        self.has_valid_key_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delays.get(&owner) {
            tokio::time::sleep(*delay).await;
        }
        self.has_valid_key.clone()
    }

    async fn balance_of(&self, _owner: Address) -> Result<U256, ContractCallError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        self.balance.clone()
    }

    async fn key_expiration_timestamp_for(
        &self,
        _owner: Address,
    ) -> Result<U256, ContractCallError> {
        self.expiration_calls.fetch_add(1, Ordering::SeqCst);
        self.expiration.clone()
    }
}
