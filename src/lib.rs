//! This crate checks whether a wallet holds a valid event ticket issued by an
//! on-chain lock contract. It includes modules for data types, address
//! validation, contract access, session state, the JSON-RPC API, and
//! configuration.

pub mod types; // Outcome, ticket details and contract info shared across modules.
pub mod api; // JSON-RPC endpoint consumed by the presentation layer.
pub mod validation; // Address normalization, the contract check sequence, error classification.
pub mod contract; // Read-only binding of the lock contract.
pub mod session; // Event-driven presentation state per user session.
pub mod config; // Defines and loads service configuration.

#[cfg(test)]
mod testing;

// Re-export commonly used types and configurations for easier access.
pub use types::*;
pub use config::Config;
pub use validation::TicketValidator;
