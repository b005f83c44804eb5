//! Wallet address normalization
//!
//! Turns user input into a canonical EIP-55 checksummed address before any
//! contract call is made. Input is accepted when it is 40 hex digits with an
//! optional `0x` prefix. All-lowercase and all-uppercase input carries no
//! checksum and is accepted as-is; mixed-case input must match its checksum.

use ethers::types::Address;
use ethers::utils::{hex, to_checksum};
use std::fmt;
use thiserror::Error;

const ADDRESS_HEX_LEN: usize = 40;

/// Reasons an input string is not a usable wallet address
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,
    #[error("address must be 40 hex digits, got {0}")]
    InvalidLength(usize),
    #[error("address contains non-hex characters")]
    InvalidHex,
    #[error("address checksum mismatch, expected {expected}")]
    BadChecksum { expected: String },
}

/// A wallet address in canonical form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletAddress {
    address: Address,
    checksummed: String,
}

impl WalletAddress {
    /// Normalize raw user input
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AddressError::Empty);
        }

        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(AddressError::InvalidHex);
        }
        if digits.len() != ADDRESS_HEX_LEN {
            return Err(AddressError::InvalidLength(digits.len()));
        }

        let bytes = hex::decode(digits).map_err(|_| AddressError::InvalidHex)?;
        let address = Address::from_slice(&bytes);
        let checksummed = to_checksum(&address, None);

        let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper && digits != &checksummed[2..] {
            return Err(AddressError::BadChecksum {
                expected: checksummed,
            });
        }

        Ok(Self {
            address,
            checksummed,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn checksummed(&self) -> &str {
        &self.checksummed
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.checksummed)
    }
}
