//! Statement AST → timelines
//!
//! Gantree: L3_Timeline → StatementCompiler
//!
//! Walks the program tree once, evaluating expressions against a
//! [`Context`] and appending instructions to the active shot of each
//! element. Control flow is unrolled: loops run until their condition is
//! false, with no iteration cap.

use crate::timeline::Timelines;
use qsim_core::{
    ChannelMap, Context, Duration, ElementName, Evaluator, Expression, PulseShape, QsimError,
    QsimResult, QuaConfig, Statement, Value,
};
use std::f64::consts::TAU;

/// AST → per-element timelines
/// Gantree: StatementCompiler // visit(Statement) over Context + Timelines
pub struct StatementCompiler<'a> {
    config: &'a QuaConfig,
    context: Context,
    timelines: Timelines,
    visited: usize,
}

impl<'a> StatementCompiler<'a> {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a compiler with one empty shot per mapped element
    pub fn new(config: &'a QuaConfig, channels: &ChannelMap) -> Self {
        Self {
            config,
            context: Context::new(),
            timelines: Timelines::from_channels(channels),
            visited: 0,
        }
    }

    /// Start from pre-set variables
    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    /// Compile a whole program
    /// Gantree: compile(statements,config,channels) -> Timelines // 전체 컴파일
    pub fn compile(
        statements: &[Statement],
        config: &QuaConfig,
        channels: &ChannelMap,
    ) -> QsimResult<Timelines> {
        let mut compiler = StatementCompiler::new(config, channels);
        compiler.run(statements)?;
        Ok(compiler.finish().0)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Variables assigned so far
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Timelines built so far
    pub fn timelines(&self) -> &Timelines {
        &self.timelines
    }

    /// Statements executed so far (loop bodies count once per iteration)
    pub fn visited(&self) -> usize {
        self.visited
    }

    /// Consume the compiler
    pub fn finish(self) -> (Timelines, Context) {
        log::debug!(
            "Lowered {} statement(s) into {} element timeline(s), {} shot(s) max",
            self.visited,
            self.timelines.len(),
            self.timelines.max_shot_count()
        );
        (self.timelines, self.context)
    }

    // ========================================================================
    // Visiting
    // ========================================================================

    /// Execute a statement list in order
    pub fn run(&mut self, statements: &[Statement]) -> QsimResult<()> {
        for statement in statements {
            self.visit(statement)?;
        }
        Ok(())
    }

    /// Execute one statement
    pub fn visit(&mut self, statement: &Statement) -> QsimResult<()> {
        self.visited += 1;
        log::trace!("visit {}", statement.name());

        match statement {
            Statement::Assign { target, value } => {
                let value = self.eval(value)?;
                self.context.set(target.as_str(), value);
            }
            Statement::Play {
                operation,
                element,
                amp,
                duration,
            } => self.play(operation, element, amp.as_ref(), duration.as_ref())?,
            Statement::Measure {
                operation,
                element,
                amp,
            } => self.measure(operation, element, amp.as_ref())?,
            Statement::Wait { time, elements } => {
                let duration = self.eval(time)?.to_duration()?;
                for element in elements {
                    self.timelines.active_mut(element)?.delay(duration);
                }
            }
            Statement::Align { elements } => self.timelines.align(elements)?,
            Statement::FrameRotation2Pi { phase, elements } => {
                let radians = TAU * self.eval(phase)?.as_f64();
                for element in elements {
                    self.timelines.active_mut(element)?.rotate_frame(radians);
                }
            }
            Statement::ResetPhase { elements } | Statement::ResetFrame { elements } => {
                self.reset_frames(elements)?
            }
            Statement::For { body, cond } => {
                let mut iterations = 0usize;
                while self.eval(cond)?.is_truthy() {
                    self.run(body)?;
                    iterations += 1;
                }
                log::trace!("loop finished after {} iteration(s)", iterations);
            }
            Statement::If { body, cond } => {
                if self.eval(cond)?.is_truthy() {
                    self.run(body)?;
                }
            }
        }
        Ok(())
    }

    fn eval(&self, expression: &Expression) -> QsimResult<Value> {
        Evaluator::visit(expression, &self.context)
    }

    /// Envelope, default length and amplitude limiting for `element.operation`.
    ///
    /// An explicit amplitude scale turns limiting off.
    fn resolve(
        &self,
        element: &str,
        operation: &str,
        amp: Option<&Expression>,
    ) -> QsimResult<(PulseShape, Duration, bool)> {
        let pulse = self.config.resolve_pulse(element, operation)?;
        match amp {
            None => Ok((pulse.shape, pulse.length, true)),
            Some(expr) => {
                let factor = self.eval(expr)?.as_f64();
                Ok((pulse.shape.scaled(factor), pulse.length, false))
            }
        }
    }

    fn play(
        &mut self,
        operation: &str,
        element: &str,
        amp: Option<&Expression>,
        duration: Option<&Expression>,
    ) -> QsimResult<()> {
        let (shape, length, limit_amplitude) = self.resolve(element, operation, amp)?;
        let duration = match duration {
            Some(expr) => self.eval(expr)?.to_duration()?,
            None => length,
        };
        // Sampled envelopes cannot be stretched.
        if duration != length && !shape.is_constant() {
            return Err(QsimError::InvalidDuration(format!(
                "'{}' on '{}' has a sampled envelope of length {}, cannot play it for {}",
                operation, element, length, duration
            )));
        }

        let timeline = self.timelines.active_mut(element)?;
        let phase = timeline.frame_phase();
        timeline.play(duration, shape, phase, limit_amplitude);
        Ok(())
    }

    /// Readout and acquisition run together, then the measured qubit
    /// moves on to its next shot
    fn measure(
        &mut self,
        operation: &str,
        element: &str,
        amp: Option<&Expression>,
    ) -> QsimResult<()> {
        let (shape, length, limit_amplitude) = self.resolve(element, operation, amp)?;

        let timeline = self.timelines.active_mut(element)?;
        let phase = timeline.frame_phase();
        {
            let mut group = timeline.simultaneous();
            group.play(length, shape, phase, limit_amplitude);
            group.measure();
        }

        self.timelines.restart_qubit_timelines(element)
    }

    fn reset_frames(&mut self, elements: &[ElementName]) -> QsimResult<()> {
        for element in elements {
            self.timelines.active_mut(element)?.reset_frame();
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Instruction;
    use approx::assert_relative_eq;
    use num_complex::Complex64;
    use qsim_core::{BinaryOp, ChannelSpec};
    use serde_json::json;

    fn config() -> QuaConfig {
        QuaConfig::from_json(&json!({
            "elements": {
                "q0": {
                    "mixInputs": {"I": ["con1", 1], "Q": ["con1", 2]},
                    "intermediate_frequency": 50e6,
                    "operations": {"x90": "x90_pulse", "const": "const_pulse"}
                },
                "rr0": {
                    "mixInputs": {"I": ["con1", 3], "Q": ["con1", 4]},
                    "operations": {"readout": "readout_pulse"}
                },
                "q1": {
                    "singleInput": {"port": ["con1", 5]},
                    "operations": {"x90": "x90_pulse"}
                }
            },
            "pulses": {
                "x90_pulse": {
                    "operation": "control",
                    "length": 220,
                    "waveforms": {"I": "x90_wf", "Q": "zero_wf"}
                },
                "const_pulse": {
                    "operation": "control",
                    "length": 100,
                    "waveforms": {"I": "const_wf", "Q": "zero_wf"}
                },
                "readout_pulse": {
                    "operation": "measurement",
                    "length": 400,
                    "waveforms": {"I": "const_wf", "Q": "zero_wf"}
                }
            },
            "waveforms": {
                "x90_wf": {"type": "arbitrary", "samples": [0.0, 0.1, 0.2, 0.1]},
                "const_wf": {"type": "constant", "sample": 0.3},
                "zero_wf": {"type": "constant", "sample": 0.0}
            }
        }))
        .unwrap()
    }

    fn channels() -> ChannelMap {
        ChannelMap::new()
            .with_channel("q0", ChannelSpec::new(0, 0))
            .with_channel("rr0", ChannelSpec::new(0, 1))
            .with_channel("q1", ChannelSpec::new(1, 2))
    }

    fn lit(text: &str) -> Expression {
        Expression::literal(text)
    }

    fn compile(statements: &[Statement]) -> QsimResult<Timelines> {
        StatementCompiler::compile(statements, &config(), &channels())
    }

    #[test]
    fn test_play_then_wait() {
        let timelines = compile(&[
            Statement::play("x90", "q0"),
            Statement::wait(lit("100"), vec!["q0".into()]),
        ])
        .unwrap();

        let q0 = timelines.active("q0").unwrap();
        assert_eq!(q0.current_time(), 320);

        let durations: Vec<_> = q0
            .instructions()
            .iter()
            .map(|i| (i.name(), i.duration()))
            .collect();
        assert_eq!(durations, vec![("play", 220), ("delay", 100)]);

        // untouched elements stay empty
        assert!(timelines.active("q1").unwrap().is_empty());
    }

    #[test]
    fn test_play_overrides() {
        let timelines = compile(&[
            Statement::assign("t", lit("48")),
            Statement::Play {
                operation: "const".into(),
                element: "q0".into(),
                amp: Some(lit("0.5")),
                duration: Some(Expression::reference("t")),
            },
        ])
        .unwrap();

        match &timelines.active("q0").unwrap().instructions()[0] {
            Instruction::Play {
                duration,
                shape,
                limit_amplitude,
                ..
            } => {
                assert_eq!(*duration, 48);
                assert!(!*limit_amplitude);
                assert_eq!(*shape, PulseShape::constant(Complex64::new(0.15, 0.0)));
            }
            other => panic!("expected a play, got {}", other),
        }
    }

    #[test]
    fn test_frame_rotation_baked_into_play() {
        let timelines = compile(&[
            Statement::FrameRotation2Pi {
                phase: lit("0.25"),
                elements: vec!["q0".into()],
            },
            Statement::play("x90", "q0"),
            Statement::ResetFrame {
                elements: vec!["q0".into()],
            },
            Statement::play("x90", "q0"),
        ])
        .unwrap();

        let phases: Vec<f64> = timelines
            .active("q0")
            .unwrap()
            .instructions()
            .iter()
            .filter_map(|i| match i {
                Instruction::Play { phase, .. } => Some(*phase),
                _ => None,
            })
            .collect();
        assert_relative_eq!(phases[0], std::f64::consts::FRAC_PI_2);
        assert_eq!(phases[1], 0.0);
    }

    #[test]
    fn test_measure_starts_new_shot() {
        let timelines = compile(&[
            Statement::play("x90", "q0"),
            Statement::align(vec!["q0".into(), "rr0".into()]),
            Statement::measure("readout", "rr0"),
        ])
        .unwrap();

        let rr0 = timelines.shots("rr0").unwrap();
        assert_eq!(rr0.len(), 2);
        assert_eq!(rr0[0].current_time(), 220 + 400);
        match rr0[0].instructions().last() {
            Some(Instruction::Simultaneous(group)) => {
                assert_eq!(group.duration(), 400);
                assert_eq!(group.instructions()[1], Instruction::Measure { qubit_index: 0 });
            }
            other => panic!("expected a simultaneous group, got {:?}", other),
        }

        // q0 shares the qubit, q1 does not
        assert_eq!(timelines.shots("q0").unwrap().len(), 2);
        assert_eq!(timelines.shots("q1").unwrap().len(), 1);
    }

    #[test]
    fn test_for_loop_unrolls() {
        let n = || Expression::reference("n");
        let timelines = compile(&[
            Statement::assign("n", lit("0")),
            Statement::For {
                body: vec![
                    Statement::play("x90", "q1"),
                    Statement::assign("n", Expression::operation(n(), lit("1"), BinaryOp::Add)),
                ],
                cond: Expression::operation(n(), lit("3"), BinaryOp::Lt),
            },
        ])
        .unwrap();

        let q1 = timelines.active("q1").unwrap();
        assert_eq!(q1.len(), 3);
        assert_eq!(q1.current_time(), 660);
    }

    #[test]
    fn test_if_branch() {
        let program = |flag: &str| {
            vec![Statement::If {
                body: vec![Statement::wait(lit("16"), vec!["q0".into()])],
                cond: lit(flag),
            }]
        };
        assert_eq!(
            compile(&program("true")).unwrap().active("q0").unwrap().current_time(),
            16
        );
        assert!(compile(&program("false")).unwrap().active("q0").unwrap().is_empty());
    }

    #[test]
    fn test_duration_override_on_sampled_envelope() {
        let stretched = Statement::Play {
            operation: "x90".into(),
            element: "q0".into(),
            amp: None,
            duration: Some(lit("440")),
        };
        let err = compile(&[stretched]).unwrap_err();
        assert!(matches!(err, QsimError::InvalidDuration(_)));

        let same_length = Statement::Play {
            operation: "x90".into(),
            element: "q0".into(),
            amp: None,
            duration: Some(lit("220")),
        };
        let timelines = compile(&[same_length]).unwrap();
        assert_eq!(timelines.active("q0").unwrap().current_time(), 220);
    }

    #[test]
    fn test_context_is_kept() {
        let config = config();
        let mut compiler = StatementCompiler::new(&config, &channels());
        compiler
            .run(&[Statement::assign("a", lit("7"))])
            .unwrap();
        assert_eq!(compiler.context().get("a").unwrap(), Value::Int(7));
        assert_eq!(compiler.visited(), 1);

        let (_, context) = compiler.finish();
        assert_eq!(context.len(), 1);
    }

    #[test]
    fn test_errors_abort() {
        let err = compile(&[Statement::wait(Expression::reference("t"), vec!["q0".into()])])
            .unwrap_err();
        assert_eq!(err, QsimError::UndefinedVariable("t".into()));

        let err = compile(&[Statement::play("x180", "q0")]).unwrap_err();
        assert!(err.is_config_error());

        let err = compile(&[Statement::wait(lit("-4"), vec!["q0".into()])]).unwrap_err();
        assert!(matches!(err, QsimError::InvalidDuration(_)));
    }
}
