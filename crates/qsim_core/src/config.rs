//! Pulse and waveform configuration table
//!
//! Gantree: L0_Foundation → QuaConfig
//!
//! Read-only model of the controller configuration shared across the whole
//! toolchain: elements name their operations, operations point at pulses,
//! pulses point at waveforms. Fields the compiler does not use (ports,
//! mixers, controllers) are ignored on load.

use crate::error::{QsimError, QsimResult};
use crate::types::Duration;
use crate::waveform::PulseShape;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

// ============================================================================
// Table Entries
// ============================================================================

/// How an element is wired to the controller outputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputKind {
    /// I/Q pair through a mixer
    MixInputs,
    /// Single real output
    SingleInput,
}

/// Element entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementConfig {
    /// Mixer-driven I/Q inputs (opaque)
    #[serde(rename = "mixInputs", default, skip_serializing_if = "Option::is_none")]
    pub mix_inputs: Option<serde_json::Value>,

    /// Single real input (opaque)
    #[serde(rename = "singleInput", default, skip_serializing_if = "Option::is_none")]
    pub single_input: Option<serde_json::Value>,

    /// Intermediate frequency in Hz
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediate_frequency: Option<f64>,

    /// Operation name -> pulse name
    #[serde(default)]
    pub operations: BTreeMap<String, String>,
}

impl ElementConfig {
    /// Input wiring, if declared
    pub fn input_kind(&self) -> Option<InputKind> {
        if self.mix_inputs.is_some() {
            Some(InputKind::MixInputs)
        } else if self.single_input.is_some() {
            Some(InputKind::SingleInput)
        } else {
            None
        }
    }
}

/// Pulse entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PulseConfig {
    /// `control` or `measurement`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,

    /// Pulse length in time units
    pub length: Duration,

    /// Waveform slot (`I`, `Q` or `single`) -> waveform name
    #[serde(default)]
    pub waveforms: BTreeMap<String, String>,
}

/// Waveform entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WaveformConfig {
    /// Constant sample
    Constant {
        /// Sample value
        sample: f64,
    },
    /// Explicit sample list
    Arbitrary {
        /// Sample values
        samples: Vec<f64>,
    },
}

/// Pulse resolved for one element operation
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPulse {
    /// Pulse name
    pub name: String,
    /// Pulse length in time units
    pub length: Duration,
    /// Envelope
    pub shape: PulseShape,
}

// ============================================================================
// QuaConfig
// ============================================================================

/// Configuration table
/// Gantree: QuaConfig // elements / pulses / waveforms
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuaConfig {
    /// Element name -> entry
    #[serde(default)]
    pub elements: BTreeMap<String, ElementConfig>,

    /// Pulse name -> entry
    #[serde(default)]
    pub pulses: BTreeMap<String, PulseConfig>,

    /// Waveform name -> entry
    #[serde(default)]
    pub waveforms: BTreeMap<String, WaveformConfig>,
}

impl QuaConfig {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a JSON value
    pub fn from_json(value: &serde_json::Value) -> QsimResult<Self> {
        Ok(serde_json::from_value(value.clone())?)
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> QsimResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    // ========================================================================
    // Builder Methods
    // ========================================================================

    /// Add an element
    pub fn with_element(mut self, name: &str, element: ElementConfig) -> Self {
        self.elements.insert(name.to_string(), element);
        self
    }

    /// Add a pulse
    pub fn with_pulse(mut self, name: &str, pulse: PulseConfig) -> Self {
        self.pulses.insert(name.to_string(), pulse);
        self
    }

    /// Add a waveform
    pub fn with_waveform(mut self, name: &str, waveform: WaveformConfig) -> Self {
        self.waveforms.insert(name.to_string(), waveform);
        self
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Element entry
    pub fn element(&self, name: &str) -> QsimResult<&ElementConfig> {
        self.elements
            .get(name)
            .ok_or_else(|| QsimError::UnknownElement(name.to_string()))
    }

    /// Pulse entry
    pub fn pulse(&self, name: &str) -> QsimResult<&PulseConfig> {
        self.pulses
            .get(name)
            .ok_or_else(|| QsimError::UnknownPulse(name.to_string()))
    }

    /// Waveform entry
    pub fn waveform(&self, name: &str) -> QsimResult<&WaveformConfig> {
        self.waveforms
            .get(name)
            .ok_or_else(|| QsimError::UnknownWaveform(name.to_string()))
    }

    /// Pulse name bound to an element operation
    pub fn pulse_name(&self, element: &str, operation: &str) -> QsimResult<&str> {
        self.element(element)?
            .operations
            .get(operation)
            .map(String::as_str)
            .ok_or_else(|| QsimError::UnknownOperation {
                element: element.to_string(),
                operation: operation.to_string(),
            })
    }

    /// Resolve `element.operation` down to a pulse envelope
    /// Gantree: resolve_pulse(element,operation) -> ResolvedPulse // 펄스 해석
    pub fn resolve_pulse(&self, element: &str, operation: &str) -> QsimResult<ResolvedPulse> {
        let pulse_name = self.pulse_name(element, operation)?;
        let pulse = self.pulse(pulse_name)?;
        let shape = self.pulse_shape(pulse_name, pulse)?;
        log::trace!(
            "{}.{} -> pulse '{}' ({}, length {})",
            element,
            operation,
            pulse_name,
            shape,
            pulse.length
        );

        Ok(ResolvedPulse {
            name: pulse_name.to_string(),
            length: pulse.length,
            shape,
        })
    }

    fn pulse_shape(&self, pulse_name: &str, pulse: &PulseConfig) -> QsimResult<PulseShape> {
        if let Some(single) = pulse.waveforms.get("single") {
            return Ok(match self.waveform(single)? {
                WaveformConfig::Constant { sample } => {
                    PulseShape::constant(Complex64::new(*sample, 0.0))
                }
                WaveformConfig::Arbitrary { samples } => PulseShape::arbitrary(
                    samples.iter().map(|&s| Complex64::new(s, 0.0)).collect(),
                ),
            });
        }

        let (Some(i_name), Some(q_name)) = (pulse.waveforms.get("I"), pulse.waveforms.get("Q"))
        else {
            return Err(QsimError::ConfigError(format!(
                "pulse '{}' needs either a 'single' waveform or an 'I'/'Q' pair",
                pulse_name
            )));
        };

        match (self.waveform(i_name)?, self.waveform(q_name)?) {
            (WaveformConfig::Constant { sample: i }, WaveformConfig::Constant { sample: q }) => {
                Ok(PulseShape::constant(Complex64::new(*i, *q)))
            }
            (i_wf, q_wf) => {
                let len = Self::sample_count(i_wf)
                    .or_else(|| Self::sample_count(q_wf))
                    .unwrap_or(0);
                let i_samples = Self::expand(i_wf, len);
                let q_samples = Self::expand(q_wf, len);
                if i_samples.len() != q_samples.len() {
                    return Err(QsimError::ConfigError(format!(
                        "pulse '{}' has I/Q waveforms of different lengths ({} vs {})",
                        pulse_name,
                        i_samples.len(),
                        q_samples.len()
                    )));
                }
                Ok(PulseShape::arbitrary(
                    i_samples
                        .into_iter()
                        .zip(q_samples)
                        .map(|(i, q)| Complex64::new(i, q))
                        .collect(),
                ))
            }
        }
    }

    fn sample_count(waveform: &WaveformConfig) -> Option<usize> {
        match waveform {
            WaveformConfig::Constant { .. } => None,
            WaveformConfig::Arbitrary { samples } => Some(samples.len()),
        }
    }

    fn expand(waveform: &WaveformConfig, len: usize) -> Vec<f64> {
        match waveform {
            WaveformConfig::Constant { sample } => vec![*sample; len],
            WaveformConfig::Arbitrary { samples } => samples.clone(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
