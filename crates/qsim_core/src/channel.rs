//! Element → channel mapping
//!
//! Gantree: L0_Foundation → ChannelMap
//!
//! Tells the timeline compiler which qubit and drive channel each element
//! plays on. Elements sharing a qubit start new shots together.

use crate::config::QuaConfig;
use crate::error::{QsimError, QsimResult};
use crate::types::QubitIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Qubit / drive channel pair of one element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelSpec {
    /// Qubit the element acts on
    pub qubit_index: QubitIndex,
    /// Drive channel index in the pulse schedule
    pub drive_channel: usize,
}

impl ChannelSpec {
    /// Create a new channel spec
    pub fn new(qubit_index: QubitIndex, drive_channel: usize) -> Self {
        Self {
            qubit_index,
            drive_channel,
        }
    }
}

/// Element name -> channel
/// Gantree: ChannelMap // BTreeMap<ElementName, ChannelSpec>
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelMap {
    channels: BTreeMap<String, ChannelSpec>,
}

impl ChannelMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Default mapping for a table: every element on qubit 0, drive channel
    /// `i` in name order.
    ///
    /// A shared qubit means a measurement on any element starts a new shot
    /// for all of them, so every element keeps the same shot count. Programs
    /// driving several independent qubits need an explicit map.
    pub fn from_config(config: &QuaConfig) -> Self {
        let channels = config
            .elements
            .keys()
            .enumerate()
            .map(|(i, name)| (name.clone(), ChannelSpec::new(0, i)))
            .collect();
        Self { channels }
    }

    /// Add or replace a mapping
    pub fn with_channel(mut self, element: &str, spec: ChannelSpec) -> Self {
        self.insert(element, spec);
        self
    }

    /// Add or replace a mapping
    pub fn insert(&mut self, element: &str, spec: ChannelSpec) {
        self.channels.insert(element.to_string(), spec);
    }

    /// Channel of an element
    pub fn get(&self, element: &str) -> QsimResult<ChannelSpec> {
        self.channels
            .get(element)
            .copied()
            .ok_or_else(|| QsimError::UnknownElement(element.to_string()))
    }

    /// Mapped element names in order
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    /// Iterate mappings in element order
    pub fn iter(&self) -> impl Iterator<Item = (&str, ChannelSpec)> {
        self.channels.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of mapped elements
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Check if map is empty
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Check every element is mapped.
    pub fn validate_against(&self, config: &QuaConfig) -> QsimResult<()> {
        for name in config.elements.keys() {
            if !self.channels.contains_key(name) {
                return Err(QsimError::ConfigError(format!(
                    "element '{}' has no channel mapping",
                    name
                )));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ElementConfig;

    fn two_element_config() -> QuaConfig {
        QuaConfig::new()
            .with_element("rr0", ElementConfig::default())
            .with_element("q0", ElementConfig::default())
    }

    #[test]
    fn test_from_config_sorted() {
        let map = ChannelMap::from_config(&two_element_config());
        assert_eq!(map.get("q0").unwrap(), ChannelSpec::new(0, 0));
        assert_eq!(map.get("rr0").unwrap(), ChannelSpec::new(0, 1));
    }

    #[test]
    fn test_unknown_element() {
        let map = ChannelMap::new();
        assert_eq!(
            map.get("q0").unwrap_err(),
            QsimError::UnknownElement("q0".into())
        );
    }

    #[test]
    fn test_validate_against() {
        let config = two_element_config();
        let partial = ChannelMap::new().with_channel("q0", ChannelSpec::new(0, 0));
        assert!(partial.validate_against(&config).is_err());

        let full = partial.with_channel("rr0", ChannelSpec::new(0, 1));
        assert!(full.validate_against(&config).is_ok());
    }

    #[test]
    fn test_serde_transparent() {
        let map = ChannelMap::new().with_channel("q0", ChannelSpec::new(2, 5));
        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json["q0"]["qubit_index"], 2);
        let back: ChannelMap = serde_json::from_value(json).unwrap();
        assert_eq!(back, map);
    }
}
