//! Session state machine
//!
//! The presentation state of one user session is an immutable value. Every
//! change goes through [`reduce`], so a validation result can only land if it
//! belongs to the request that is still pending.

use crate::ValidationOutcome;
use serde::{Deserialize, Serialize};

/// Identifies one validation request within a session
pub type RequestToken = u64;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Address exactly as typed by the user
    pub address: String,
    pub loading: bool,
    pub outcome: Option<ValidationOutcome>,
    pub overlay_open: bool,
    /// Token of the request whose result will be accepted, if any
    pub pending_token: Option<RequestToken>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    InputChanged(String),
    ValidationStarted(RequestToken),
    ValidationResolved {
        token: RequestToken,
        outcome: ValidationOutcome,
    },
    Reset,
    OverlayToggled,
}

/// Apply one event to a session state
pub fn reduce(state: &SessionState, event: SessionEvent) -> SessionState {
    match event {
        SessionEvent::InputChanged(address) => {
            if address == state.address {
                return state.clone();
            }
            SessionState {
                address,
                loading: false,
                outcome: None,
                pending_token: None,
                overlay_open: state.overlay_open,
            }
        }
        SessionEvent::ValidationStarted(token) => SessionState {
            loading: true,
            outcome: None,
            pending_token: Some(token),
            ..state.clone()
        },
        SessionEvent::ValidationResolved { token, outcome } => {
            if state.pending_token != Some(token) {
                // stale: input changed, reset, or a newer request started
                return state.clone();
            }
            SessionState {
                loading: false,
                outcome: Some(outcome),
                pending_token: None,
                ..state.clone()
            }
        }
        SessionEvent::Reset => SessionState::default(),
        SessionEvent::OverlayToggled => SessionState {
            overlay_open: !state.overlay_open,
            ..state.clone()
        },
    }
}
