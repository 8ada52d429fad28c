//! Instruction → schedule node visitors
//!
//! Gantree: L4_Pulse → InstructionVisitors
//!
//! One visitor per instruction kind. Dispatch is a match over the closed
//! [`Instruction`] enum, so every kind has exactly one visitor.

use crate::schedule::{DriveChannel, ScheduleBlock, ScheduleNode};
use qsim_core::{Duration, Phase, PulseShape, QubitIndex};
use qsim_timeline::{Instruction, Simultaneous, Timeline};

/// Dispatch an instruction to its visitor
/// Gantree: InstructionVisitor // visit(Instruction, channel) -> ScheduleNode
pub struct InstructionVisitor;

impl InstructionVisitor {
    /// Convert one instruction
    pub fn visit(instruction: &Instruction, channel: DriveChannel) -> ScheduleNode {
        match instruction {
            Instruction::Play {
                duration,
                shape,
                phase,
                limit_amplitude,
            } => PlayVisitor::visit(*duration, shape, *phase, *limit_amplitude, channel),
            Instruction::Delay { duration } => DelayVisitor::visit(*duration, channel),
            Instruction::Measure { qubit_index } => MeasureVisitor::visit(*qubit_index),
            Instruction::PhaseOffset { phase } => PhaseOffsetVisitor::visit(*phase, channel),
            Instruction::Simultaneous(group) => SimultaneousVisitor::visit(group, channel),
        }
    }

    /// Convert a whole timeline into a sequential block on its drive channel
    pub fn visit_timeline(timeline: &Timeline) -> ScheduleBlock {
        let channel = DriveChannel(timeline.drive_channel());
        timeline
            .instructions()
            .iter()
            .fold(ScheduleBlock::align_sequential(), |block, instruction| {
                block.with_child(Self::visit(instruction, channel))
            })
    }
}

/// `Play`; wrapped in a phase-offset scope only for a non-zero phase
pub struct PlayVisitor;

impl PlayVisitor {
    /// Convert a play
    pub fn visit(
        duration: Duration,
        shape: &PulseShape,
        phase: Phase,
        limit_amplitude: bool,
        channel: DriveChannel,
    ) -> ScheduleNode {
        let play = ScheduleNode::Play {
            duration,
            shape: shape.clone(),
            channel,
            limit_amplitude,
        };

        if phase == 0.0 {
            return play;
        }

        ScheduleNode::PhaseOffset {
            phase,
            channel,
            body: ScheduleBlock::align_sequential().with_child(play),
        }
    }
}

/// `Delay`
pub struct DelayVisitor;

impl DelayVisitor {
    /// Convert a delay
    pub fn visit(duration: Duration, channel: DriveChannel) -> ScheduleNode {
        ScheduleNode::Delay { duration, channel }
    }
}

/// `Measure`
pub struct MeasureVisitor;

impl MeasureVisitor {
    /// Convert an acquisition marker
    pub fn visit(qubit_index: QubitIndex) -> ScheduleNode {
        ScheduleNode::Measure { qubit_index }
    }
}

/// `PhaseOffset` → persistent frame shift
pub struct PhaseOffsetVisitor;

impl PhaseOffsetVisitor {
    /// Convert a frame shift
    pub fn visit(phase: Phase, channel: DriveChannel) -> ScheduleNode {
        ScheduleNode::ShiftPhase { phase, channel }
    }
}

/// `Simultaneous` → left-aligned block of its members
pub struct SimultaneousVisitor;

impl SimultaneousVisitor {
    /// Convert a simultaneous group
    pub fn visit(group: &Simultaneous, channel: DriveChannel) -> ScheduleNode {
        let block = group
            .iter()
            .fold(ScheduleBlock::align_left(), |block, member| {
                block.with_child(InstructionVisitor::visit(member, channel))
            });
        ScheduleNode::Block(block)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Alignment;
    use num_complex::Complex64;
    use qsim_core::ChannelSpec;

    fn shape() -> PulseShape {
        PulseShape::constant(Complex64::new(0.3, 0.0))
    }

    #[test]
    fn test_play_without_phase_is_bare() {
        let node = PlayVisitor::visit(40, &shape(), 0.0, true, DriveChannel(1));
        assert!(matches!(
            node,
            ScheduleNode::Play {
                duration: 40,
                channel: DriveChannel(1),
                ..
            }
        ));
    }

    #[test]
    fn test_play_with_phase_is_scoped() {
        let node = PlayVisitor::visit(40, &shape(), 0.7, false, DriveChannel(0));
        match node {
            ScheduleNode::PhaseOffset { phase, body, .. } => {
                assert_eq!(phase, 0.7);
                assert_eq!(body.children().len(), 1);
                assert_eq!(body.duration(), 40);
            }
            other => panic!("expected a phase offset scope, got {:?}", other),
        }
    }

    #[test]
    fn test_phase_offset_becomes_shift() {
        let node = InstructionVisitor::visit(&Instruction::PhaseOffset { phase: 0.2 }, DriveChannel(3));
        assert_eq!(
            node,
            ScheduleNode::ShiftPhase {
                phase: 0.2,
                channel: DriveChannel(3)
            }
        );
    }

    #[test]
    fn test_simultaneous_is_left_aligned() {
        let mut timeline = Timeline::new(ChannelSpec::new(0, 2));
        {
            let mut group = timeline.simultaneous();
            group.play(400, shape(), 0.0, true);
            group.measure();
        }

        let block = InstructionVisitor::visit_timeline(&timeline);
        assert_eq!(block.alignment(), Alignment::Sequential);
        assert_eq!(block.duration(), 400);

        match &block.children()[0] {
            ScheduleNode::Block(inner) => {
                assert_eq!(inner.alignment(), Alignment::Left);
                assert_eq!(inner.children()[1], ScheduleNode::Measure { qubit_index: 0 });
            }
            other => panic!("expected a block, got {:?}", other),
        }
    }

    #[test]
    fn test_timeline_duration_matches_clock() {
        let mut timeline = Timeline::new(ChannelSpec::new(0, 0));
        timeline.play(220, shape(), 0.4, true);
        timeline.phase_offset(1.0);
        timeline.delay(100);
        timeline.measure();

        let block = InstructionVisitor::visit_timeline(&timeline);
        assert_eq!(block.duration(), timeline.current_time());
        assert_eq!(block.children().len(), 4);
    }
}
