//! Tunables of the topology transform.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::AdminState;

/// Default delay before the confirming pass after a status change.
pub const DEFAULT_REQUEUE_AFTER_SECS: u64 = 30;

/// Serial number given to derived nodes.
pub const DEFAULT_SERIAL_NUMBER: &str = "dummy";

/// Manufacturer given to derived nodes.
pub const DEFAULT_MANUFACTURER: &str = "Nokia";

/// The configuration is invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("topology.{field} must not be empty")]
    EmptyField { field: &'static str },
}

/// Configuration of the topology transform.
///
/// Deserialisable from the `[topology]` table of the host configuration file;
/// every field is optional there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TopologyConfig {
    /// Seconds to wait before the pass that confirms a status change.
    pub requeue_after_secs: u64,

    /// Serial number for nodes that do not declare one.
    pub serial_number: String,

    /// Manufacturer for nodes that do not declare one.
    pub manufacturer: String,

    /// Administrative state of derived nodes and links.
    pub admin_state: AdminState,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            requeue_after_secs: DEFAULT_REQUEUE_AFTER_SECS,
            serial_number: DEFAULT_SERIAL_NUMBER.to_owned(),
            manufacturer: DEFAULT_MANUFACTURER.to_owned(),
            admin_state: AdminState::Enable,
        }
    }
}

impl TopologyConfig {
    /// Returns the requeue delay as a [`Duration`].
    pub fn requeue_after(&self) -> Duration {
        Duration::from_secs(self.requeue_after_secs)
    }

    /// Checks that the configuration can produce valid derived resources.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.serial_number.trim().is_empty() {
            return Err(ConfigError::EmptyField {
                field: "serial_number",
            });
        }
        if self.manufacturer.trim().is_empty() {
            return Err(ConfigError::EmptyField {
                field: "manufacturer",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = TopologyConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.requeue_after(), Duration::from_secs(30));
    }

    #[test]
    fn partial_tables_keep_defaults() {
        let config: TopologyConfig =
            serde_json::from_str(r#"{"manufacturer":"Acme","admin_state":"standby"}"#).unwrap();
        assert_eq!(config.manufacturer, "Acme");
        assert_eq!(config.admin_state, AdminState::Standby);
        assert_eq!(config.serial_number, "dummy");
    }

    #[test]
    fn blank_manufacturer_is_rejected() {
        let config = TopologyConfig {
            manufacturer: "  ".into(),
            ..TopologyConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyField {
                field: "manufacturer"
            })
        );
    }
}
