//! Lock Contract Module
//!
//! This module handles read access to the lock contract that issues tickets:
//! - Defines the `LockReader` seam used by the validator
//! - Binds the three view methods over an HTTP JSON-RPC provider

mod lock;
pub use lock::{
    LockReader, PublicLock, RpcLockReader, ConnectError, BALANCE_METHOD, EXPIRATION_METHOD,
    HAS_VALID_KEY_METHOD,
};
