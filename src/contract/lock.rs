//! Lock Contract Reader
//!
//! Read-only access to a lock-style ticket contract. The validator only talks
//! to the contract through [`LockReader`], which keeps the network out of its
//! tests.
//!
//! # Methods Queried
//! - **getHasValidKey**: whether the owner holds a currently valid key
//! - **balanceOf**: number of keys held by the owner
//! - **keyExpirationTimestampFor**: unix timestamp at which the key expires

use crate::config::{ContractConfig, RpcConfig};
use crate::validation::{CallErrorKind, ContractCallError, WalletAddress};
use async_trait::async_trait;
use ethers::contract::{abigen, ContractError};
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::{Address, U256};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

pub const HAS_VALID_KEY_METHOD: &str = "getHasValidKey";
pub const BALANCE_METHOD: &str = "balanceOf";
pub const EXPIRATION_METHOD: &str = "keyExpirationTimestampFor";

abigen!(
    PublicLock,
    r#"[
        function getHasValidKey(address _keyOwner) external view returns (bool)
        function balanceOf(address _keyOwner) external view returns (uint256)
        function keyExpirationTimestampFor(address _keyOwner) external view returns (uint256)
    ]"#
);

/// Read-only view of the lock contract
///
/// Each method performs exactly one call; implementations must not retry.
#[async_trait]
pub trait LockReader: Send + Sync {
    async fn get_has_valid_key(&self, owner: Address) -> Result<bool, ContractCallError>;

    async fn balance_of(&self, owner: Address) -> Result<U256, ContractCallError>;

    async fn key_expiration_timestamp_for(&self, owner: Address)
        -> Result<U256, ContractCallError>;
}

/// Failure to set up the contract binding
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("invalid RPC url {url}: {reason}")]
    InvalidRpcUrl { url: String, reason: String },
    #[error("invalid contract address {address}: {reason}")]
    InvalidContractAddress { address: String, reason: String },
}

/// [`LockReader`] backed by an ethers middleware, an HTTP JSON-RPC provider
/// unless stated otherwise
pub struct RpcLockReader<M = Provider<Http>> {
    contract: PublicLock<M>,
}

impl<M: Middleware + 'static> RpcLockReader<M> {
    /// Bind the lock contract at `address` on an existing client
    pub fn new(address: Address, client: Arc<M>) -> Self {
        Self {
            contract: PublicLock::new(address, client),
        }
    }
}

impl RpcLockReader<Provider<Http>> {
    /// Bind the lock contract at the configured address
    ///
    /// No network traffic happens here; the provider connects lazily on the
    /// first call.
    pub fn connect(rpc: &RpcConfig, contract: &ContractConfig) -> Result<Self, ConnectError> {
        let provider = Provider::<Http>::try_from(rpc.url.as_str()).map_err(|e| {
            ConnectError::InvalidRpcUrl {
                url: rpc.url.clone(),
                reason: e.to_string(),
            }
        })?;

        let address = WalletAddress::parse(&contract.address).map_err(|e| {
            ConnectError::InvalidContractAddress {
                address: contract.address.clone(),
                reason: e.to_string(),
            }
        })?;

        info!("Lock contract {} bound via {}", address, rpc.url);
        Ok(Self::new(address.address(), Arc::new(provider)))
    }
}

#[async_trait]
impl<M: Middleware + 'static> LockReader for RpcLockReader<M> {
    async fn get_has_valid_key(&self, owner: Address) -> Result<bool, ContractCallError> {
        debug!("{}({:?})", HAS_VALID_KEY_METHOD, owner);
        self.contract
            .get_has_valid_key(owner)
            .call()
            .await
            .map_err(call_error)
    }

    async fn balance_of(&self, owner: Address) -> Result<U256, ContractCallError> {
        debug!("{}({:?})", BALANCE_METHOD, owner);
        self.contract
            .balance_of(owner)
            .call()
            .await
            .map_err(call_error)
    }

    async fn key_expiration_timestamp_for(
        &self,
        owner: Address,
    ) -> Result<U256, ContractCallError> {
        debug!("{}({:?})", EXPIRATION_METHOD, owner);
        self.contract
            .key_expiration_timestamp_for(owner)
            .call()
            .await
            .map_err(call_error)
    }
}

/// Decoded reverts are tagged directly; everything else goes through the
/// message classifier.
fn call_error<M: Middleware>(err: ContractError<M>) -> ContractCallError {
    if matches!(err, ContractError::Revert(_)) {
        ContractCallError::new(CallErrorKind::Revert, err.to_string())
    } else {
        ContractCallError::from_message(err.to_string())
    }
}
