//! # QSIM Engine
//!
//! Staged driver for the QSIM pulse-program compiler plus the `qsim`
//! command-line tool.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qsim_engine // L5: Integration
//!     SimulationConfig // channel map + shot handling
//!     Pipeline // Initial → Parsed → Lowered → Scheduled
//!     qsim // CLI (clap + env_logger)
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qsim_engine::prelude::*;
//! use qsim_core::QuaConfig;
//! use serde_json::json;
//!
//! let config = QuaConfig::from_json(&json!({
//!     "elements": {"q0": {"operations": {"x90": "x90_pulse"}}},
//!     "pulses": {"x90_pulse": {"length": 220, "waveforms": {"single": "wf"}}},
//!     "waveforms": {"wf": {"type": "constant", "sample": 0.2}}
//! })).unwrap();
//!
//! let mut pipeline = Pipeline::new(config, SimulationConfig::default()).unwrap();
//! let schedules = pipeline.run(&json!({"statements": [
//!     {"play": {"qe": "q0", "namedPulse": {"name": "x90"}}},
//!     {"wait": {"time": {"literal": {"value": "100"}}, "qe": "q0"}}
//! ]})).unwrap();
//!
//! assert_eq!(schedules[0].duration(), 320);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Simulation settings (Gantree: L5_Integration → SimulationConfig)
pub mod config;

/// Staged pipeline (Gantree: L5_Integration → Pipeline)
pub mod pipeline;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::SimulationConfig;
pub use pipeline::{Pipeline, PipelineStage, PipelineState};

pub use qsim_core;
pub use qsim_program;
pub use qsim_pulse;
pub use qsim_timeline;

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for running the whole pipeline
    //!
    //! ```rust
    //! use qsim_engine::prelude::*;
    //! ```

    pub use crate::config::SimulationConfig;
    pub use crate::pipeline::{Pipeline, PipelineStage, PipelineState};

    pub use qsim_core::prelude::*;
    pub use qsim_program::prelude::*;
    pub use qsim_pulse::prelude::*;
    pub use qsim_timeline::prelude::*;
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get version string
pub fn version() -> String {
    format!("{} v{}", NAME, VERSION)
}

// ============================================================================
// Integration Tests
// ============================================================================
