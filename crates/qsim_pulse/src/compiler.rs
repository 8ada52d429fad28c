//! Timelines → per-shot pulse schedules
//!
//! Gantree: L4_Pulse → TimelineCompiler
//!
//! Shot `i` of every element is gathered into one schedule: a left-aligned
//! block holding one sequential block per channel.

use crate::schedule::ScheduleBlock;
use crate::schedule::ScheduleNode;
use crate::visitors::InstructionVisitor;
use qsim_core::{QsimError, QsimResult};
use qsim_timeline::Timelines;

/// Timelines → schedules
/// Gantree: TimelineCompiler // compile(Timelines) -> Vec<ScheduleBlock>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimelineCompiler {
    drop_empty_trailing_shot: bool,
}

impl Default for TimelineCompiler {
    fn default() -> Self {
        Self {
            drop_empty_trailing_shot: true,
        }
    }
}

impl TimelineCompiler {
    /// Create with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the last shot when no element recorded anything in it.
    ///
    /// A measurement always opens a new shot, so a program ending in a
    /// measurement leaves one empty shot behind.
    pub fn with_drop_empty_trailing_shot(mut self, drop: bool) -> Self {
        self.drop_empty_trailing_shot = drop;
        self
    }

    /// Check that every element recorded the same number of shots
    pub fn shot_count(timelines: &Timelines) -> QsimResult<usize> {
        let mut counts = timelines.iter().map(|(name, shots)| (name, shots.len()));
        let Some((_, expected)) = counts.next() else {
            return Ok(0);
        };

        for (element, found) in counts {
            if found != expected {
                return Err(QsimError::ShotCountMismatch {
                    element: element.to_string(),
                    expected,
                    found,
                });
            }
        }
        Ok(expected)
    }

    /// One schedule per shot
    /// Gantree: compile(timelines) -> Vec<ScheduleBlock> // 샷별 스케줄
    pub fn compile(&self, timelines: &Timelines) -> QsimResult<Vec<ScheduleBlock>> {
        let mut shots = Self::shot_count(timelines)?;

        if self.drop_empty_trailing_shot && shots > 0 && Self::shot_is_empty(timelines, shots - 1)
        {
            log::debug!("Dropping empty trailing shot {}", shots - 1);
            shots -= 1;
        }

        let schedules: Vec<ScheduleBlock> = (0..shots)
            .map(|shot| Self::compile_shot(timelines, shot))
            .collect();

        log::debug!(
            "Compiled {} element timeline(s) into {} schedule(s)",
            timelines.len(),
            schedules.len()
        );
        Ok(schedules)
    }

    /// Schedule of one shot index
    fn compile_shot(timelines: &Timelines, shot: usize) -> ScheduleBlock {
        let mut block = ScheduleBlock::align_left().with_name(format!("shot{}", shot));
        for (_, history) in timelines.iter() {
            if let Some(timeline) = history.get(shot) {
                block.push(ScheduleNode::Block(InstructionVisitor::visit_timeline(
                    timeline,
                )));
            }
        }
        block
    }

    fn shot_is_empty(timelines: &Timelines, shot: usize) -> bool {
        timelines
            .iter()
            .all(|(_, history)| history.get(shot).map_or(true, |t| t.is_empty()))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64;
    use qsim_core::{ChannelMap, ChannelSpec, PulseShape};

    fn shape() -> PulseShape {
        PulseShape::constant(Complex64::new(0.2, 0.1))
    }

    fn channels() -> ChannelMap {
        ChannelMap::new()
            .with_channel("q0", ChannelSpec::new(0, 0))
            .with_channel("rr0", ChannelSpec::new(0, 1))
    }

    #[test]
    fn test_single_shot_layout() {
        let mut timelines = Timelines::from_channels(&channels());
        timelines.active_mut("q0").unwrap().play(220, shape(), 0.0, true);
        timelines.active_mut("q0").unwrap().delay(100);
        timelines.active_mut("rr0").unwrap().delay(50);

        let schedules = TimelineCompiler::new().compile(&timelines).unwrap();
        assert_eq!(schedules.len(), 1);

        let shot = &schedules[0];
        assert_eq!(shot.name(), Some("shot0"));
        assert_eq!(shot.children().len(), 2);
        // longest channel clock
        assert_eq!(shot.duration(), 320);
    }

    #[test]
    fn test_trailing_empty_shot() {
        let mut timelines = Timelines::from_channels(&channels());
        timelines.active_mut("rr0").unwrap().delay(10);
        timelines.restart_qubit_timelines("rr0").unwrap();

        assert_eq!(TimelineCompiler::new().compile(&timelines).unwrap().len(), 1);

        let kept = TimelineCompiler::new()
            .with_drop_empty_trailing_shot(false)
            .compile(&timelines)
            .unwrap();
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1].duration(), 0);
    }

    #[test]
    fn test_shot_count_mismatch() {
        let channels = channels().with_channel("q1", ChannelSpec::new(1, 2));
        let mut timelines = Timelines::from_channels(&channels);
        timelines.restart_qubit_timelines("q1").unwrap();

        let err = TimelineCompiler::new().compile(&timelines).unwrap_err();
        assert_eq!(
            err,
            QsimError::ShotCountMismatch {
                element: "q1".into(),
                expected: 1,
                found: 2,
            }
        );
    }

    #[test]
    fn test_no_elements() {
        let schedules = TimelineCompiler::new().compile(&Timelines::new()).unwrap();
        assert!(schedules.is_empty());
    }
}
