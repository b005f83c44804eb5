//! Session State Module
//!
//! This module holds the presentation state of a validation session
//! (typed address, loading flag, outcome, overlay visibility) as an
//! immutable value driven by events, plus the shared stores around it.

mod reducer;
mod store;

pub use reducer::{reduce, RequestToken, SessionEvent, SessionState};
pub use store::{SessionRegistry, SessionStore};
