//! Per-channel timelines
//!
//! Gantree: L3_Timeline → Timeline
//!
//! A [`Timeline`] appends instructions against a virtual clock.
//! [`Timelines`] keeps one shot history per element; the last timeline of a
//! history is the active shot.
//!
//! Clock invariant: `current_time` is the sum of the durations of the
//! appended instructions, a simultaneous group counting as its longest
//! member.

use crate::instruction::{Instruction, Simultaneous};
use qsim_core::{
    ChannelMap, ChannelSpec, Duration, ElementName, Phase, PulseShape, QsimError, QsimResult,
    QubitIndex,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Instruction list with a virtual clock
/// Gantree: Timeline // instructions + current_time + channel + frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    /// Gantree: qubit_index: QubitIndex // 큐비트
    qubit_index: QubitIndex,

    /// Gantree: drive_channel: usize // 드라이브 채널
    drive_channel: usize,

    /// Gantree: current_time: Duration // 가상 시계
    current_time: Duration,

    /// Frame phase baked into the next plays, radians
    frame_phase: Phase,

    instructions: Vec<Instruction>,
}

impl Timeline {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create an empty timeline at clock 0
    pub fn new(channel: ChannelSpec) -> Self {
        Self {
            qubit_index: channel.qubit_index,
            drive_channel: channel.drive_channel,
            current_time: 0,
            frame_phase: 0.0,
            instructions: Vec::new(),
        }
    }

    /// Fresh timeline on the same channel for the next shot.
    ///
    /// Clock and instructions start over; the frame phase carries over, since
    /// a rotation holds until `reset_frame`.
    pub fn restarted(&self) -> Self {
        Self {
            frame_phase: self.frame_phase,
            ..Self::new(self.channel())
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Virtual clock
    pub fn current_time(&self) -> Duration {
        self.current_time
    }

    /// Qubit this timeline drives
    pub fn qubit_index(&self) -> QubitIndex {
        self.qubit_index
    }

    /// Drive channel index
    pub fn drive_channel(&self) -> usize {
        self.drive_channel
    }

    /// Qubit and drive channel
    pub fn channel(&self) -> ChannelSpec {
        ChannelSpec::new(self.qubit_index, self.drive_channel)
    }

    /// Appended instructions
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Number of appended instructions
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Check if nothing was appended
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    // ========================================================================
    // Frame
    // ========================================================================

    /// Pending frame phase in radians
    pub fn frame_phase(&self) -> Phase {
        self.frame_phase
    }

    /// Rotate the frame by `radians`
    pub fn rotate_frame(&mut self, radians: Phase) {
        self.frame_phase += radians;
    }

    /// Zero the frame
    pub fn reset_frame(&mut self) {
        self.frame_phase = 0.0;
    }

    // ========================================================================
    // Appending
    // ========================================================================

    /// Append an instruction and advance the clock by its duration
    pub fn push(&mut self, instruction: Instruction) {
        self.current_time += instruction.duration();
        self.instructions.push(instruction);
    }

    /// Append a play
    pub fn play(
        &mut self,
        duration: Duration,
        shape: PulseShape,
        phase: Phase,
        limit_amplitude: bool,
    ) {
        self.push(Instruction::Play {
            duration,
            shape,
            phase,
            limit_amplitude,
        });
    }

    /// Append a delay
    pub fn delay(&mut self, duration: Duration) {
        self.push(Instruction::Delay { duration });
    }

    /// Append a frame shift
    pub fn phase_offset(&mut self, phase: Phase) {
        self.push(Instruction::PhaseOffset { phase });
    }

    /// Append an acquisition marker for this timeline's qubit
    pub fn measure(&mut self) {
        self.push(Instruction::Measure {
            qubit_index: self.qubit_index,
        });
    }

    /// Open a simultaneous group.
    ///
    /// Members added through the scope start together. The clock advances
    /// only when a member outlasts the group so far; the group itself is
    /// appended when the scope is dropped.
    pub fn simultaneous(&mut self) -> SimultaneousScope<'_> {
        SimultaneousScope {
            timeline: self,
            group: Simultaneous::new(),
        }
    }
}

impl fmt::Display for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[q{} d{} t={}]",
            self.qubit_index, self.drive_channel, self.current_time
        )?;
        for instruction in &self.instructions {
            write!(f, " {}", instruction)?;
        }
        Ok(())
    }
}

// ============================================================================
// Simultaneous Scope
// ============================================================================

/// Open simultaneous group on a timeline
/// Gantree: SimultaneousScope // &mut Timeline + group
pub struct SimultaneousScope<'a> {
    timeline: &'a mut Timeline,
    group: Simultaneous,
}

impl SimultaneousScope<'_> {
    /// Add a member; the parent clock advances by the growth of the group
    pub fn push(&mut self, instruction: Instruction) {
        let grown = self.group.push(instruction);
        self.timeline.current_time += grown;
    }

    /// Add a play
    pub fn play(
        &mut self,
        duration: Duration,
        shape: PulseShape,
        phase: Phase,
        limit_amplitude: bool,
    ) {
        self.push(Instruction::Play {
            duration,
            shape,
            phase,
            limit_amplitude,
        });
    }

    /// Add a delay
    pub fn delay(&mut self, duration: Duration) {
        self.push(Instruction::Delay { duration });
    }

    /// Add an acquisition marker for the parent timeline's qubit
    pub fn measure(&mut self) {
        let qubit_index = self.timeline.qubit_index;
        self.push(Instruction::Measure { qubit_index });
    }

    /// Longest member so far
    pub fn duration(&self) -> Duration {
        self.group.duration()
    }
}

impl Drop for SimultaneousScope<'_> {
    fn drop(&mut self) {
        let group = std::mem::take(&mut self.group);
        self.timeline
            .instructions
            .push(Instruction::Simultaneous(group));
    }
}

// ============================================================================
// Align
// ============================================================================

/// Pad every timeline with a delay up to the latest clock
/// Gantree: align(timelines) // barrier
pub fn align(timelines: &mut [&mut Timeline]) {
    let latest = timelines
        .iter()
        .map(|t| t.current_time())
        .max()
        .unwrap_or(0);

    for timeline in timelines.iter_mut() {
        let gap = latest - timeline.current_time();
        if gap > 0 {
            timeline.delay(gap);
        }
    }
}

// ============================================================================
// Timelines
// ============================================================================

/// Element -> shot history
/// Gantree: Timelines // BTreeMap<ElementName, Vec<Timeline>>
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timelines {
    elements: BTreeMap<ElementName, Vec<Timeline>>,
}

impl Timelines {
    /// Create with no elements
    pub fn new() -> Self {
        Self::default()
    }

    /// One empty shot per mapped element
    pub fn from_channels(channels: &ChannelMap) -> Self {
        let elements = channels
            .iter()
            .map(|(name, spec)| (name.to_string(), vec![Timeline::new(spec)]))
            .collect();
        Self { elements }
    }

    /// Add an element with one empty shot, replacing any history
    pub fn insert(&mut self, element: &str, channel: ChannelSpec) {
        self.elements
            .insert(element.to_string(), vec![Timeline::new(channel)]);
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Active shot of an element
    pub fn active(&self, element: &str) -> QsimResult<&Timeline> {
        self.elements
            .get(element)
            .and_then(|shots| shots.last())
            .ok_or_else(|| QsimError::UnknownElement(element.to_string()))
    }

    /// Active shot of an element, mutably
    pub fn active_mut(&mut self, element: &str) -> QsimResult<&mut Timeline> {
        self.elements
            .get_mut(element)
            .and_then(|shots| shots.last_mut())
            .ok_or_else(|| QsimError::UnknownElement(element.to_string()))
    }

    /// Every shot of an element
    pub fn shots(&self, element: &str) -> QsimResult<&[Timeline]> {
        self.elements
            .get(element)
            .map(Vec::as_slice)
            .ok_or_else(|| QsimError::UnknownElement(element.to_string()))
    }

    /// Element names in order
    pub fn elements(&self) -> impl Iterator<Item = &str> {
        self.elements.keys().map(String::as_str)
    }

    /// Iterate over (element, shots)
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Timeline])> {
        self.elements
            .iter()
            .map(|(name, shots)| (name.as_str(), shots.as_slice()))
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Check if there are no elements
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Largest shot count over all elements
    pub fn max_shot_count(&self) -> usize {
        self.elements.values().map(Vec::len).max().unwrap_or(0)
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Align the active shots of `elements`; an empty list aligns every
    /// element
    pub fn align(&mut self, elements: &[ElementName]) -> QsimResult<()> {
        if let Some(unknown) = elements.iter().find(|e| !self.elements.contains_key(*e)) {
            return Err(QsimError::UnknownElement(unknown.clone()));
        }

        let mut active: Vec<&mut Timeline> = self
            .elements
            .iter_mut()
            .filter(|(name, _)| elements.is_empty() || elements.contains(*name))
            .filter_map(|(_, shots)| shots.last_mut())
            .collect();

        align(&mut active);
        Ok(())
    }

    /// Start a new shot on every element that shares `element`'s qubit
    pub fn restart_qubit_timelines(&mut self, element: &str) -> QsimResult<()> {
        let qubit = self.active(element)?.qubit_index();

        let mut restarted = 0;
        for shots in self.elements.values_mut() {
            let fresh = match shots.last() {
                Some(active) if active.qubit_index() == qubit => active.restarted(),
                _ => continue,
            };
            shots.push(fresh);
            restarted += 1;
        }

        log::trace!(
            "Restarted {} timeline(s) on qubit {} after measuring {}",
            restarted,
            qubit,
            element
        );
        Ok(())
    }
}

impl fmt::Display for Timelines {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, shots) in &self.elements {
            writeln!(f, "{}:", name)?;
            for (shot, timeline) in shots.iter().enumerate() {
                writeln!(f, "  #{} {}", shot, timeline)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
