//! # QSIM Pulse
//!
//! Turns per-element instruction timelines into per-shot pulse schedules for
//! a downstream pulse-level simulator.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qsim_pulse // L4: Timelines → Schedules
//!     ScheduleBlock // align_left | align_sequential tree
//!     InstructionVisitors // Play | Delay | Measure | PhaseOffset | Simultaneous
//!     TimelineCompiler // shot-count check + per-shot layout
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qsim_pulse::prelude::*;
//! use qsim_core::{ChannelMap, ChannelSpec, PulseShape};
//! use qsim_timeline::Timelines;
//! use num_complex::Complex64;
//!
//! let channels = ChannelMap::new().with_channel("q0", ChannelSpec::new(0, 0));
//! let mut timelines = Timelines::from_channels(&channels);
//! let q0 = timelines.active_mut("q0").unwrap();
//! q0.play(220, PulseShape::constant(Complex64::new(0.2, 0.0)), 0.0, true);
//! q0.delay(100);
//!
//! let schedules = TimelineCompiler::new().compile(&timelines).unwrap();
//! assert_eq!(schedules[0].duration(), 320);
//! println!("{}", schedules[0]);
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Schedule model (Gantree: L4_Pulse → ScheduleBlock)
pub mod schedule;

/// Instruction visitors (Gantree: L4_Pulse → InstructionVisitors)
pub mod visitors;

/// Per-shot schedule compiler (Gantree: L4_Pulse → TimelineCompiler)
pub mod compiler;

// ============================================================================
// Re-exports
// ============================================================================

pub use compiler::TimelineCompiler;
pub use schedule::{Alignment, DriveChannel, ScheduleBlock, ScheduleNode};
pub use visitors::InstructionVisitor;

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for schedule generation
    //!
    //! ```rust
    //! use qsim_pulse::prelude::*;
    //! ```

    pub use crate::compiler::TimelineCompiler;
    pub use crate::schedule::{Alignment, DriveChannel, ScheduleBlock, ScheduleNode};
    pub use crate::visitors::InstructionVisitor;
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Integration Tests
// ============================================================================
