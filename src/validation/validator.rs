use crate::{
    config::TicketConfig,
    contract::{LockReader, BALANCE_METHOD, EXPIRATION_METHOD, HAS_VALID_KEY_METHOD},
    validation::{AddressError, ContractCallError, WalletAddress},
    TicketDetails, ValidationOutcome,
};
use chrono::Utc;
use ethers::types::U256;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const INVALID_ADDRESS_DIAGNOSTIC: &str = "Invalid wallet address format";
pub const NO_TICKET_DIAGNOSTIC: &str = "No ticket found for this address";
pub const OWNERSHIP_ERROR_DIAGNOSTIC: &str = "Error checking key ownership";
pub const EXPIRED_DIAGNOSTIC: &str = "Your key has expired";
pub const INCONSISTENT_KEY_DIAGNOSTIC: &str = "You own a key but it appears to be invalid";
pub const EXPIRATION_ERROR_DIAGNOSTIC: &str = "Error checking key expiration";

/// Checks whether a wallet holds a valid ticket on the lock contract
///
/// Every contract call is attempted exactly once. Errors never escape
/// `validate`; they are folded into the returned outcome.
pub struct TicketValidator {
    reader: Arc<dyn LockReader>,
    details: TicketDetails,
}

impl TicketValidator {
    pub fn new(reader: Arc<dyn LockReader>, ticket: &TicketConfig) -> Self {
        Self {
            reader,
            details: TicketDetails::from(ticket),
        }
    }

    /// Validate a wallet address against the current wall clock
    pub async fn validate(&self, input: &str) -> ValidationOutcome {
        let now = Utc::now().timestamp().max(0) as u64;
        self.validate_at(input, now).await
    }

    /// Validate a wallet address, treating `now` (unix seconds) as the
    /// current time for the expiration check
    pub async fn validate_at(&self, input: &str, now: u64) -> ValidationOutcome {
        // 1. Normalize before touching the network
        let wallet = match WalletAddress::parse(input) {
            Ok(wallet) => wallet,
            Err(e) => return self.reject_input(input, e),
        };
        debug!("Validating ticket for {}", wallet);

        // 2. Primary check
        let outcome = match self.reader.get_has_valid_key(wallet.address()).await {
            Ok(true) => ValidationOutcome::valid(wallet.to_string(), self.details.clone()),
            Ok(false) => {
                let diagnostic = self.explain_missing_key(&wallet, now).await;
                ValidationOutcome::invalid(wallet.to_string(), diagnostic)
            }
            Err(e) => {
                warn!("{} failed for {}: {}", HAS_VALID_KEY_METHOD, wallet, e);
                ValidationOutcome::invalid(wallet.to_string(), e.diagnostic())
            }
        };

        info!(
            "Ticket check for {}: {:?} ({})",
            wallet,
            outcome.status,
            outcome.diagnostic.as_deref().unwrap_or("ok")
        );
        outcome
    }

    fn reject_input(&self, input: &str, error: AddressError) -> ValidationOutcome {
        debug!("Rejected address input {:?}: {}", input, error);
        ValidationOutcome::unknown(INVALID_ADDRESS_DIAGNOSTIC)
    }

    /// Secondary and tertiary checks, only reached once the primary check
    /// answered `false`
    async fn explain_missing_key(&self, wallet: &WalletAddress, now: u64) -> &'static str {
        // 3. Balance
        let balance = match self.reader.balance_of(wallet.address()).await {
            Ok(balance) => balance,
            Err(e) => {
                return self.call_failed(BALANCE_METHOD, wallet, &e, OWNERSHIP_ERROR_DIAGNOSTIC)
            }
        };
        if balance.is_zero() {
            return NO_TICKET_DIAGNOSTIC;
        }

        // 4. Expiration
        let expiration = match self.reader.key_expiration_timestamp_for(wallet.address()).await {
            Ok(expiration) => expiration,
            Err(e) => {
                return self.call_failed(EXPIRATION_METHOD, wallet, &e, EXPIRATION_ERROR_DIAGNOSTIC)
            }
        };

        if expiration < U256::from(now) {
            EXPIRED_DIAGNOSTIC
        } else {
            // positive balance, unexpired key, yet not valid per the contract
            warn!(
                "Inconsistent key state for {}: balance {} expires {}",
                wallet, balance, expiration
            );
            INCONSISTENT_KEY_DIAGNOSTIC
        }
    }

    fn call_failed(
        &self,
        method: &str,
        wallet: &WalletAddress,
        error: &ContractCallError,
        diagnostic: &'static str,
    ) -> &'static str {
        warn!("{} failed for {}: {}", method, wallet, error);
        diagnostic
    }
}
