use crate::config::{Config, TicketConfig};
use serde::{Deserialize, Serialize};

/// Tri-state result of a ticket check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    /// The wallet holds a key the contract considers valid
    Valid,
    /// The address was well formed but no valid key was confirmed
    Invalid,
    /// The input could not be checked at all
    Unknown,
}

/// Static descriptive metadata shown for a valid ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDetails {
    pub contract_name: String,
    pub event_name: String,
    pub key_expiration: String,
}

impl From<&TicketConfig> for TicketDetails {
    fn from(config: &TicketConfig) -> Self {
        Self {
            contract_name: config.contract_name.clone(),
            event_name: config.event_name.clone(),
            key_expiration: config.key_expiration.clone(),
        }
    }
}

/// Outcome of a single validation call
///
/// `details` is only ever populated for [`OutcomeStatus::Valid`].
/// `address` carries the checksummed form when normalization succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub status: OutcomeStatus,
    pub address: Option<String>,
    pub diagnostic: Option<String>,
    pub details: Option<TicketDetails>,
}

impl ValidationOutcome {
    pub fn valid(address: String, details: TicketDetails) -> Self {
        Self {
            status: OutcomeStatus::Valid,
            address: Some(address),
            diagnostic: None,
            details: Some(details),
        }
    }

    pub fn invalid(address: String, diagnostic: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Invalid,
            address: Some(address),
            diagnostic: Some(diagnostic.into()),
            details: None,
        }
    }

    pub fn unknown(diagnostic: impl Into<String>) -> Self {
        Self {
            status: OutcomeStatus::Unknown,
            address: None,
            diagnostic: Some(diagnostic.into()),
            details: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.status == OutcomeStatus::Valid
    }
}

/// Contract details surfaced by the info overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractInfo {
    pub contract_address: String,
    pub rpc_url: String,
    pub network: String,
    pub support_email: String,
}

impl From<&Config> for ContractInfo {
    fn from(config: &Config) -> Self {
        Self {
            contract_address: config.contract.address.clone(),
            rpc_url: config.rpc.url.clone(),
            network: config.rpc.network.clone(),
            support_email: config.support.email.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_outcome_serializes_for_presentation() {
        let outcome = ValidationOutcome::valid(
            "0x52908400098527886E0F7030069857D2E4169EE7".to_string(),
            TicketDetails::from(&TicketConfig::default()),
        );

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["status"], json!("valid"));
        assert_eq!(value["diagnostic"], json!(null));
        assert_eq!(value["details"]["eventName"], json!("DappCon 2025"));
        assert_eq!(value["details"]["keyExpiration"], json!("16th-18th June, 2025"));
    }

    #[test]
    fn test_unknown_has_no_address_or_details() {
        let outcome = ValidationOutcome::unknown("Invalid wallet address format");
        assert_eq!(outcome.status, OutcomeStatus::Unknown);
        assert!(outcome.address.is_none());
        assert!(outcome.details.is_none());
        assert!(!outcome.is_valid());
    }
}
