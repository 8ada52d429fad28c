//! Staged compilation pipeline
//!
//! Gantree: L5_Integration → Pipeline
//!
//! Runs dictionary → AST → timelines → schedules one stage at a time and
//! keeps every intermediate result.

use crate::config::SimulationConfig;
use qsim_core::{ChannelMap, QsimError, QsimResult, QuaConfig, Statement};
use qsim_program::ProgramVisitor;
use qsim_pulse::{ScheduleBlock, TimelineCompiler};
use qsim_timeline::{StatementCompiler, Timelines};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PipelineStage {
    /// Nothing compiled yet
    Initial,
    /// Program dictionary compiled to an AST
    Parsed,
    /// AST lowered to timelines
    Lowered,
    /// Timelines compiled to schedules
    Scheduled,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Initial => "initial",
            PipelineStage::Parsed => "parsed",
            PipelineStage::Lowered => "lowered",
            PipelineStage::Scheduled => "scheduled",
        };
        write!(f, "{}", name)
    }
}

/// Intermediate results
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    /// Statement AST
    pub ast: Option<Vec<Statement>>,

    /// Per-element timelines
    pub timelines: Option<Timelines>,

    /// Per-shot schedules
    pub schedules: Option<Vec<ScheduleBlock>>,
}

impl PipelineState {
    /// Latest completed stage
    pub fn stage(&self) -> PipelineStage {
        if self.schedules.is_some() {
            PipelineStage::Scheduled
        } else if self.timelines.is_some() {
            PipelineStage::Lowered
        } else if self.ast.is_some() {
            PipelineStage::Parsed
        } else {
            PipelineStage::Initial
        }
    }
}

/// QSIM compilation pipeline
/// Gantree: Pipeline // 단계별 컴파일
pub struct Pipeline {
    config: QuaConfig,
    simulation: SimulationConfig,
    channels: ChannelMap,
    state: PipelineState,
}

impl Pipeline {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a pipeline; fails if the simulation settings do not fit the table
    pub fn new(config: QuaConfig, simulation: SimulationConfig) -> QsimResult<Self> {
        simulation.validate(&config)?;
        let channels = simulation.channel_map(&config);
        Ok(Self {
            config,
            simulation,
            channels,
            state: PipelineState::default(),
        })
    }

    /// Create with default simulation settings
    pub fn with_config(config: QuaConfig) -> QsimResult<Self> {
        Self::new(config, SimulationConfig::default())
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Latest completed stage
    pub fn stage(&self) -> PipelineStage {
        self.state.stage()
    }

    /// Intermediate results
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Configuration table
    pub fn config(&self) -> &QuaConfig {
        &self.config
    }

    /// Simulation settings
    pub fn simulation(&self) -> &SimulationConfig {
        &self.simulation
    }

    /// Channel map in use
    pub fn channels(&self) -> &ChannelMap {
        &self.channels
    }

    // ========================================================================
    // Pipeline Stages
    // ========================================================================

    /// Stage 1: program dictionary → AST
    ///
    /// Discards results of any earlier run.
    pub fn parse(&mut self, program: &serde_json::Value) -> QsimResult<&[Statement]> {
        self.announce(PipelineStage::Parsed);
        self.state = PipelineState::default();

        let ast = ProgramVisitor::new().visit(program)?;
        Ok(self.state.ast.insert(ast).as_slice())
    }

    /// Stage 2: AST → timelines
    pub fn lower(&mut self) -> QsimResult<&Timelines> {
        self.announce(PipelineStage::Lowered);

        let ast = self.state.ast.as_deref().ok_or_else(|| QsimError::StageOrder {
            stage: PipelineStage::Lowered.to_string(),
            requires: PipelineStage::Parsed.to_string(),
        })?;

        let timelines = StatementCompiler::compile(ast, &self.config, &self.channels)?;
        self.state.schedules = None;
        Ok(&*self.state.timelines.insert(timelines))
    }

    /// Stage 3: timelines → schedules
    pub fn schedule(&mut self) -> QsimResult<&[ScheduleBlock]> {
        if self.state.timelines.is_none() {
            self.lower()?;
        }
        self.announce(PipelineStage::Scheduled);

        let timelines = self.state.timelines.as_ref().ok_or_else(|| QsimError::StageOrder {
            stage: PipelineStage::Scheduled.to_string(),
            requires: PipelineStage::Lowered.to_string(),
        })?;

        let schedules = TimelineCompiler::new()
            .with_drop_empty_trailing_shot(self.simulation.drop_empty_trailing_shot)
            .compile(timelines)?;
        Ok(self.state.schedules.insert(schedules).as_slice())
    }

    /// Run every stage on a program
    pub fn run(&mut self, program: &serde_json::Value) -> QsimResult<&[ScheduleBlock]> {
        self.parse(program)?;
        self.lower()?;
        self.schedule()
    }

    /// Drop all intermediate results
    pub fn reset(&mut self) {
        self.state = PipelineState::default();
    }

    fn announce(&self, stage: PipelineStage) {
        if self.simulation.verbose {
            log::info!("Pipeline: {} -> {}", self.stage(), stage);
        } else {
            log::debug!("Pipeline: {} -> {}", self.stage(), stage);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
