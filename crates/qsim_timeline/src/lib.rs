//! # QSIM Timeline
//!
//! Lowers the statement AST into per-element instruction timelines with a
//! virtual clock, alignment barriers and simultaneous groups.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qsim_timeline // L3: AST → Timelines
//!     Instruction // Play | Delay | Measure | PhaseOffset | Simultaneous
//!     Timeline // instructions + current_time + frame phase
//!         SimultaneousScope // delta bookkeeping on the parent clock
//!         align(timelines) // barrier
//!     Timelines // element -> shot history
//!     StatementCompiler // visit(Statement) over Context
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qsim_timeline::prelude::*;
//! use qsim_core::{ChannelMap, Expression, QuaConfig, Statement};
//! use serde_json::json;
//!
//! let config = QuaConfig::from_json(&json!({
//!     "elements": {"q0": {"operations": {"x90": "x90_pulse"}}},
//!     "pulses": {"x90_pulse": {"length": 220, "waveforms": {"single": "wf"}}},
//!     "waveforms": {"wf": {"type": "constant", "sample": 0.2}}
//! })).unwrap();
//! let channels = ChannelMap::from_config(&config);
//!
//! let program = vec![
//!     Statement::play("x90", "q0"),
//!     Statement::wait(Expression::literal("100"), vec!["q0".into()]),
//! ];
//!
//! let timelines = StatementCompiler::compile(&program, &config, &channels).unwrap();
//! assert_eq!(timelines.active("q0").unwrap().current_time(), 320);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Instructions (Gantree: L3_Timeline → Instruction)
pub mod instruction;

/// Timelines and alignment (Gantree: L3_Timeline → Timeline)
pub mod timeline;

/// AST lowering (Gantree: L3_Timeline → StatementCompiler)
pub mod compiler;

// ============================================================================
// Re-exports
// ============================================================================

pub use compiler::StatementCompiler;
pub use instruction::{Instruction, Simultaneous};
pub use timeline::{align, SimultaneousScope, Timeline, Timelines};

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for timeline construction
    //!
    //! ```rust
    //! use qsim_timeline::prelude::*;
    //! ```

    pub use crate::compiler::StatementCompiler;
    pub use crate::instruction::{Instruction, Simultaneous};
    pub use crate::timeline::{align, Timeline, Timelines};
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Integration Tests
// ============================================================================
