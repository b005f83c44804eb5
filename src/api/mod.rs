//! API Module
//!
//! This module handles the JSON-RPC API in front of the validator.
//! It provides the HTTP endpoint a presentation layer uses to check tickets.

mod server;
pub use server::{router, AppState, Server};
