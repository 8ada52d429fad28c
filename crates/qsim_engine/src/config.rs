//! Simulation settings for QSIM
//!
//! Gantree: L5_Integration → SimulationConfig
//!
//! Settings that sit next to the configuration table: how elements map onto
//! qubits and drive channels, and how shots are post-processed.

use qsim_core::{ChannelMap, QsimError, QsimResult, QuaConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

fn default_true() -> bool {
    true
}

/// Simulation settings
/// Gantree: SimulationConfig // channels + shot handling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Element -> qubit / drive channel; derived from the table when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<ChannelMap>,

    /// Drop the empty shot left behind by a final measurement
    #[serde(default = "default_true")]
    pub drop_empty_trailing_shot: bool,

    /// Log each pipeline stage at info level
    #[serde(default)]
    pub verbose: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            channels: None,
            drop_empty_trailing_shot: true,
            verbose: false,
        }
    }
}

impl SimulationConfig {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a JSON value
    pub fn from_json(value: &serde_json::Value) -> QsimResult<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> QsimResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&text)?)
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Set an explicit channel map
    pub fn with_channels(mut self, channels: ChannelMap) -> Self {
        self.channels = Some(channels);
        self
    }

    /// Set trailing shot handling
    pub fn with_drop_empty_trailing_shot(mut self, drop: bool) -> Self {
        self.drop_empty_trailing_shot = drop;
        self
    }

    /// Set verbose stage logging
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Channel map to compile with
    pub fn channel_map(&self, config: &QuaConfig) -> ChannelMap {
        match &self.channels {
            Some(channels) => channels.clone(),
            None => ChannelMap::from_config(config),
        }
    }

    /// Validate against a configuration table.
    ///
    /// Every configured element needs a mapping, mappings must name known
    /// elements, and no two elements may share a drive channel.
    pub fn validate(&self, config: &QuaConfig) -> QsimResult<()> {
        let Some(channels) = &self.channels else {
            return Ok(());
        };

        channels.validate_against(config)?;

        let mut drive_owner: BTreeMap<usize, &str> = BTreeMap::new();
        for (element, spec) in channels.iter() {
            if !config.elements.contains_key(element) {
                return Err(QsimError::UnknownElement(element.to_string()));
            }
            if let Some(other) = drive_owner.insert(spec.drive_channel, element) {
                return Err(QsimError::ConfigError(format!(
                    "elements '{}' and '{}' share drive channel {}",
                    other, element, spec.drive_channel
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for SimulationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let channels = match &self.channels {
            Some(channels) => format!("{} explicit", channels.len()),
            None => "derived".to_string(),
        };
        write!(
            f,
            "SimulationConfig(channels={}, drop_empty_trailing_shot={})",
            channels, self.drop_empty_trailing_shot
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use qsim_core::ChannelSpec;
    use serde_json::json;

    fn table() -> QuaConfig {
        QuaConfig::from_json(&json!({
            "elements": {
                "q0": {"operations": {}},
                "rr0": {"operations": {}}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults_from_empty_json() {
        let config = SimulationConfig::from_json(&json!({})).unwrap();
        assert_eq!(config, SimulationConfig::default());
        assert!(config.drop_empty_trailing_shot);
        assert!(config.validate(&table()).is_ok());
    }

    #[test]
    fn test_parse_channels() {
        let config = SimulationConfig::from_json(&json!({
            "channels": {
                "q0": {"qubit_index": 0, "drive_channel": 0},
                "rr0": {"qubit_index": 0, "drive_channel": 1}
            },
            "drop_empty_trailing_shot": false
        }))
        .unwrap();

        let channels = config.channel_map(&table());
        assert_eq!(channels.get("rr0").unwrap(), ChannelSpec::new(0, 1));
        assert!(!config.drop_empty_trailing_shot);
        assert!(config.validate(&table()).is_ok());
    }

    #[test]
    fn test_derived_channels() {
        let channels = SimulationConfig::new().channel_map(&table());
        assert_eq!(channels.get("q0").unwrap(), ChannelSpec::new(0, 0));
        assert_eq!(channels.get("rr0").unwrap(), ChannelSpec::new(0, 1));
    }

    #[test]
    fn test_validate_rejects_missing_mapping() {
        let config = SimulationConfig::new()
            .with_channels(ChannelMap::new().with_channel("q0", ChannelSpec::new(0, 0)));
        assert!(config.validate(&table()).unwrap_err().is_config_error());
    }

    #[test]
    fn test_validate_rejects_shared_drive_channel() {
        let channels = ChannelMap::new()
            .with_channel("q0", ChannelSpec::new(0, 0))
            .with_channel("rr0", ChannelSpec::new(0, 0));
        let err = SimulationConfig::new()
            .with_channels(channels)
            .validate(&table())
            .unwrap_err();
        assert!(matches!(err, QsimError::ConfigError(_)));
    }

    #[test]
    fn test_validate_rejects_unknown_element() {
        let channels = ChannelMap::from_config(&table()).with_channel("q9", ChannelSpec::new(9, 9));
        let err = SimulationConfig::new()
            .with_channels(channels)
            .validate(&table())
            .unwrap_err();
        assert_eq!(err, QsimError::UnknownElement("q9".into()));
    }
}
