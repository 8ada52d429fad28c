//! Timeline instructions
//!
//! Gantree: L3_Timeline → Instruction
//!
//! Instructions are immutable once appended. A [`Simultaneous`] group is a
//! plain tree node: its members start together and it lasts as long as its
//! longest member.

use qsim_core::{Duration, Phase, PulseShape, QubitIndex};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timeline instruction
/// Gantree: Instruction // Play | Delay | Measure | PhaseOffset | Simultaneous
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    /// Play an envelope
    Play {
        /// Length in time units
        duration: Duration,
        /// Envelope
        shape: PulseShape,
        /// Frame phase in radians at play time
        phase: Phase,
        /// Clip the envelope to unit amplitude downstream
        limit_amplitude: bool,
    },

    /// Idle
    Delay {
        /// Length in time units
        duration: Duration,
    },

    /// Acquisition marker
    Measure {
        /// Measured qubit
        qubit_index: QubitIndex,
    },

    /// Frame shift in radians
    PhaseOffset {
        /// Shift in radians
        phase: Phase,
    },

    /// Concurrent group
    Simultaneous(Simultaneous),
}

impl Instruction {
    /// Time the instruction occupies on its timeline
    pub fn duration(&self) -> Duration {
        match self {
            Instruction::Play { duration, .. } | Instruction::Delay { duration } => *duration,
            Instruction::Measure { .. } | Instruction::PhaseOffset { .. } => 0,
            Instruction::Simultaneous(group) => group.duration(),
        }
    }

    /// Instruction kind name
    pub fn name(&self) -> &'static str {
        match self {
            Instruction::Play { .. } => "play",
            Instruction::Delay { .. } => "delay",
            Instruction::Measure { .. } => "measure",
            Instruction::PhaseOffset { .. } => "phase_offset",
            Instruction::Simultaneous(_) => "simultaneous",
        }
    }

    /// Check if instruction takes time
    pub fn is_timed(&self) -> bool {
        self.duration() > 0
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Play {
                duration,
                shape,
                phase,
                ..
            } => {
                write!(f, "Play({}, {}", duration, shape)?;
                if *phase != 0.0 {
                    write!(f, ", phase={:.4}", phase)?;
                }
                write!(f, ")")
            }
            Instruction::Delay { duration } => write!(f, "Delay({})", duration),
            Instruction::Measure { qubit_index } => write!(f, "Measure(q{})", qubit_index),
            Instruction::PhaseOffset { phase } => write!(f, "PhaseOffset({:.4})", phase),
            Instruction::Simultaneous(group) => {
                let members: Vec<String> = group.iter().map(|i| i.to_string()).collect();
                write!(f, "Simultaneous[{}]", members.join(" | "))
            }
        }
    }
}

// ============================================================================
// Simultaneous
// ============================================================================

/// Instructions that start at the same time
/// Gantree: Simultaneous // members + running max
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Simultaneous {
    instructions: Vec<Instruction>,
    duration: Duration,
}

impl Simultaneous {
    /// Create an empty group
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a member.
    ///
    /// Returns how far the group's duration grew.
    pub fn push(&mut self, instruction: Instruction) -> Duration {
        let length = instruction.duration();
        let grown = length.saturating_sub(self.duration);
        self.duration += grown;
        self.instructions.push(instruction);
        grown
    }

    /// Longest member duration
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Members in insertion order
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Iterate over members
    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Check if group has no members
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;

    fn play(duration: Duration) -> Instruction {
        Instruction::Play {
            duration,
            shape: PulseShape::constant(Complex64::new(0.2, 0.0)),
            phase: 0.0,
            limit_amplitude: true,
        }
    }

    #[test]
    fn test_durations() {
        assert_eq!(play(40).duration(), 40);
        assert_eq!(Instruction::Delay { duration: 12 }.duration(), 12);
        assert_eq!(Instruction::Measure { qubit_index: 0 }.duration(), 0);
        assert_eq!(Instruction::PhaseOffset { phase: 1.0 }.duration(), 0);
        assert!(!Instruction::PhaseOffset { phase: 1.0 }.is_timed());
    }

    #[test]
    fn test_simultaneous_running_max() {
        let mut group = Simultaneous::new();
        assert_eq!(group.push(play(100)), 100);
        assert_eq!(group.push(Instruction::Delay { duration: 30 }), 0);
        assert_eq!(group.push(play(160)), 60);
        assert_eq!(group.push(Instruction::Measure { qubit_index: 1 }), 0);

        assert_eq!(group.duration(), 160);
        assert_eq!(group.len(), 4);
        assert_eq!(Instruction::Simultaneous(group).duration(), 160);
    }

    #[test]
    fn test_display() {
        let mut group = Simultaneous::new();
        group.push(play(20));
        group.push(Instruction::Measure { qubit_index: 2 });
        let text = Instruction::Simultaneous(group).to_string();
        assert_eq!(
            text,
            "Simultaneous[Play(20, constant(0.2000+0.0000j)) | Measure(q2)]"
        );
    }
}
