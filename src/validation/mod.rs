//! Ticket Validation Module
//!
//! This module decides whether a wallet holds a valid ticket.
//! Performs address normalization, the three-step contract check
//! (valid key, balance, expiration) and error classification.

mod address;
mod classifier;
mod validator;


pub use address::{AddressError, WalletAddress};
pub use classifier::{
    CallErrorKind, ContractCallError, classify, unclassified_diagnostic, NETWORK_DIAGNOSTIC,
    REVERT_DIAGNOSTIC, UNKNOWN_ERROR_DIAGNOSTIC,
};
pub use validator::{
    TicketValidator, EXPIRATION_ERROR_DIAGNOSTIC, EXPIRED_DIAGNOSTIC, INCONSISTENT_KEY_DIAGNOSTIC,
    INVALID_ADDRESS_DIAGNOSTIC, NO_TICKET_DIAGNOSTIC, OWNERSHIP_ERROR_DIAGNOSTIC,
};
