//! Pulse schedule model
//!
//! Gantree: L4_Pulse → ScheduleBlock
//!
//! A schedule is a tree of blocks. A left-aligned block starts every child
//! at the block's start; a sequential block plays its children back to back.

use num_complex::Complex64;
use qsim_core::{Duration, Phase, PulseShape, QubitIndex};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Drive channel index
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DriveChannel(pub usize);

impl fmt::Display for DriveChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.0)
    }
}

/// Child placement inside a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    /// Every child starts at the block start
    Left,
    /// Children follow one another
    Sequential,
}

// ============================================================================
// Schedule Node
// ============================================================================

/// Schedule tree node
/// Gantree: ScheduleNode // Play | Delay | ShiftPhase | Measure | PhaseOffset | Block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScheduleNode {
    /// Play an envelope on a channel
    Play {
        /// Length in time units
        duration: Duration,
        /// Envelope
        shape: PulseShape,
        /// Target channel
        channel: DriveChannel,
        /// Clip to unit amplitude
        limit_amplitude: bool,
    },

    /// Idle a channel
    Delay {
        /// Length in time units
        duration: Duration,
        /// Target channel
        channel: DriveChannel,
    },

    /// Persistent frame shift
    ShiftPhase {
        /// Shift in radians
        phase: Phase,
        /// Target channel
        channel: DriveChannel,
    },

    /// Acquire a qubit
    Measure {
        /// Measured qubit
        qubit_index: QubitIndex,
    },

    /// Frame shifted for the body only
    PhaseOffset {
        /// Shift in radians
        phase: Phase,
        /// Target channel
        channel: DriveChannel,
        /// Scoped instructions
        body: ScheduleBlock,
    },

    /// Nested block
    Block(ScheduleBlock),
}

impl ScheduleNode {
    /// Time the node occupies
    pub fn duration(&self) -> Duration {
        match self {
            ScheduleNode::Play { duration, .. } | ScheduleNode::Delay { duration, .. } => *duration,
            ScheduleNode::ShiftPhase { .. } | ScheduleNode::Measure { .. } => 0,
            ScheduleNode::PhaseOffset { body, .. } | ScheduleNode::Block(body) => body.duration(),
        }
    }

    /// Node kind name
    pub fn name(&self) -> &'static str {
        match self {
            ScheduleNode::Play { .. } => "play",
            ScheduleNode::Delay { .. } => "delay",
            ScheduleNode::ShiftPhase { .. } => "shift_phase",
            ScheduleNode::Measure { .. } => "measure",
            ScheduleNode::PhaseOffset { .. } => "phase_offset",
            ScheduleNode::Block(_) => "block",
        }
    }

    /// Materialized samples of a play, with the frame applied
    pub fn samples(&self) -> Option<Vec<Complex64>> {
        match self {
            ScheduleNode::Play {
                duration, shape, ..
            } => Some(shape.samples(*duration as usize)),
            ScheduleNode::PhaseOffset { phase, body, .. } => {
                let rotation = Complex64::from_polar(1.0, *phase);
                body.children()
                    .iter()
                    .find_map(ScheduleNode::samples)
                    .map(|samples| samples.into_iter().map(|s| s * rotation).collect())
            }
            _ => None,
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        match self {
            ScheduleNode::Play {
                duration,
                shape,
                channel,
                ..
            } => writeln!(f, "{}play({}, {}) @ {}", pad, shape, duration, channel),
            ScheduleNode::Delay { duration, channel } => {
                writeln!(f, "{}delay({}) @ {}", pad, duration, channel)
            }
            ScheduleNode::ShiftPhase { phase, channel } => {
                writeln!(f, "{}shift_phase({:.4}) @ {}", pad, phase, channel)
            }
            ScheduleNode::Measure { qubit_index } => writeln!(f, "{}measure(q{})", pad, qubit_index),
            ScheduleNode::PhaseOffset {
                phase,
                channel,
                body,
            } => {
                writeln!(f, "{}phase_offset({:.4}) @ {}:", pad, phase, channel)?;
                body.fmt_children(f, indent + 1)
            }
            ScheduleNode::Block(block) => block.fmt_indented(f, indent),
        }
    }
}

// ============================================================================
// Schedule Block
// ============================================================================

/// Aligned group of schedule nodes
/// Gantree: ScheduleBlock // alignment + children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleBlock {
    alignment: Alignment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    children: Vec<ScheduleNode>,
}

impl ScheduleBlock {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create an empty block
    pub fn new(alignment: Alignment) -> Self {
        Self {
            alignment,
            name: None,
            children: Vec::new(),
        }
    }

    /// Empty left-aligned block
    pub fn align_left() -> Self {
        Self::new(Alignment::Left)
    }

    /// Empty sequential block
    pub fn align_sequential() -> Self {
        Self::new(Alignment::Sequential)
    }

    /// Set block name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append a child
    pub fn with_child(mut self, node: ScheduleNode) -> Self {
        self.push(node);
        self
    }

    /// Append a child
    pub fn push(&mut self, node: ScheduleNode) {
        self.children.push(node);
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Child placement
    pub fn alignment(&self) -> Alignment {
        self.alignment
    }

    /// Block name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Children in insertion order
    pub fn children(&self) -> &[ScheduleNode] {
        &self.children
    }

    /// Check if block has no children
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Total block length: the longest child when left-aligned, the sum
    /// when sequential
    /// Gantree: duration(&self) -> Duration // 블록 길이
    pub fn duration(&self) -> Duration {
        let durations = self.children.iter().map(ScheduleNode::duration);
        match self.alignment {
            Alignment::Left => durations.max().unwrap_or(0),
            Alignment::Sequential => durations.sum(),
        }
    }

    /// Number of leaf nodes in the tree
    pub fn leaf_count(&self) -> usize {
        self.children
            .iter()
            .map(|node| match node {
                ScheduleNode::PhaseOffset { body, .. } | ScheduleNode::Block(body) => {
                    body.leaf_count()
                }
                _ => 1,
            })
            .sum()
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        let kind = match self.alignment {
            Alignment::Left => "align_left",
            Alignment::Sequential => "align_sequential",
        };
        match &self.name {
            Some(name) => writeln!(f, "{}{} '{}' [{}]:", pad, kind, name, self.duration())?,
            None => writeln!(f, "{}{} [{}]:", pad, kind, self.duration())?,
        }
        self.fmt_children(f, indent + 1)
    }

    fn fmt_children(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        for child in &self.children {
            child.fmt_indented(f, indent)?;
        }
        Ok(())
    }
}

impl fmt::Display for ScheduleBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

// ============================================================================
// Tests
// ============================================================================
