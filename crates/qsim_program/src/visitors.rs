//! Per-statement visitors
//!
//! Gantree: L2_Program → StatementVisitors
//!
//! One visitor per wire tag. A visitor turns a statement body into zero or
//! more AST nodes; control-flow visitors recurse through the
//! [`StatementsVisitor`] registry that dispatched them.

use crate::elements::{extract_elements, extract_single_element};
use crate::expression::ExpressionVisitor;
use crate::statements::StatementsVisitor;
use crate::wire::{as_object, field, named, optional};
use qsim_core::{Expression, QsimError, QsimResult, Statement};
use serde_json::Value;

/// Converts one statement body into AST nodes
/// Gantree: StatementVisitor // trait
pub trait StatementVisitor: Send + Sync {
    /// Wire tag this visitor handles
    fn tag(&self) -> &'static str;

    /// Convert the body of a `{tag: body}` statement
    fn visit(&self, body: &Value, statements: &StatementsVisitor) -> QsimResult<Vec<Statement>>;
}

// ============================================================================
// Element-only Statements
// ============================================================================

/// `align`
pub struct AlignVisitor;

impl StatementVisitor for AlignVisitor {
    fn tag(&self) -> &'static str {
        "align"
    }

    fn visit(&self, body: &Value, _: &StatementsVisitor) -> QsimResult<Vec<Statement>> {
        Ok(vec![Statement::Align {
            elements: extract_elements(body)?,
        }])
    }
}

/// `wait`
pub struct WaitVisitor;

impl StatementVisitor for WaitVisitor {
    fn tag(&self) -> &'static str {
        "wait"
    }

    fn visit(&self, body: &Value, _: &StatementsVisitor) -> QsimResult<Vec<Statement>> {
        let time = ExpressionVisitor::visit(field(body, "time", self.tag())?)?;
        Ok(vec![Statement::Wait {
            time,
            elements: extract_elements(body)?,
        }])
    }
}

/// `frameRotation` (phase in full turns)
pub struct FrameRotationVisitor;

impl StatementVisitor for FrameRotationVisitor {
    fn tag(&self) -> &'static str {
        "frameRotation"
    }

    fn visit(&self, body: &Value, _: &StatementsVisitor) -> QsimResult<Vec<Statement>> {
        let phase = ExpressionVisitor::visit(field(body, "value", self.tag())?)?;
        Ok(vec![Statement::FrameRotation2Pi {
            phase,
            elements: extract_elements(body)?,
        }])
    }
}

/// `resetPhase`
pub struct ResetPhaseVisitor;

impl StatementVisitor for ResetPhaseVisitor {
    fn tag(&self) -> &'static str {
        "resetPhase"
    }

    fn visit(&self, body: &Value, _: &StatementsVisitor) -> QsimResult<Vec<Statement>> {
        Ok(vec![Statement::ResetPhase {
            elements: extract_elements(body)?,
        }])
    }
}

/// `resetFrame`
pub struct ResetFrameVisitor;

impl StatementVisitor for ResetFrameVisitor {
    fn tag(&self) -> &'static str {
        "resetFrame"
    }

    fn visit(&self, body: &Value, _: &StatementsVisitor) -> QsimResult<Vec<Statement>> {
        Ok(vec![Statement::ResetFrame {
            elements: extract_elements(body)?,
        }])
    }
}

// ============================================================================
// Assignment
// ============================================================================

/// `assign`
pub struct AssignVisitor;

impl StatementVisitor for AssignVisitor {
    fn tag(&self) -> &'static str {
        "assign"
    }

    fn visit(&self, body: &Value, _: &StatementsVisitor) -> QsimResult<Vec<Statement>> {
        let target = field(body, "target", self.tag())?;
        let target = named(target, "variable", self.tag())?;
        let value = ExpressionVisitor::visit(field(body, "expression", self.tag())?)?;
        Ok(vec![Statement::Assign { target, value }])
    }
}

// ============================================================================
// Pulse Statements
// ============================================================================

/// Keys a play statement may carry
pub const PLAY_KEYS: [&str; 5] = ["loc", "qe", "namedPulse", "amp", "duration"];

/// Read the scalar `v0` component of an `amp` field.
///
/// Amplitude matrices (`v1`..`v3`) are rejected.
fn amplitude(body: &Value) -> QsimResult<Option<Expression>> {
    let Some(amp) = optional(body, "amp") else {
        return Ok(None);
    };
    let components = as_object(amp, "amp")?;
    if let Some(key) = components
        .iter()
        .find(|(k, v)| k.as_str() != "v0" && !v.is_null())
        .map(|(k, _)| k)
    {
        return Err(QsimError::UnsupportedExpression(format!("amp.{}", key)));
    }
    ExpressionVisitor::visit_optional(amp, "v0")
}

/// `play`
pub struct PlayVisitor;

impl StatementVisitor for PlayVisitor {
    fn tag(&self) -> &'static str {
        "play"
    }

    fn visit(&self, body: &Value, _: &StatementsVisitor) -> QsimResult<Vec<Statement>> {
        let keys = as_object(body, self.tag())?.keys();
        if let Some(unknown) = keys.into_iter().find(|k| !PLAY_KEYS.contains(&k.as_str())) {
            return Err(QsimError::UnsupportedPlayKey(unknown.clone()));
        }

        Ok(vec![Statement::Play {
            operation: named(body, "namedPulse", self.tag())?,
            element: extract_single_element(body, self.tag())?,
            amp: amplitude(body)?,
            duration: ExpressionVisitor::visit_optional(body, "duration")?,
        }])
    }
}

/// `measure`
pub struct MeasureVisitor;

impl StatementVisitor for MeasureVisitor {
    fn tag(&self) -> &'static str {
        "measure"
    }

    fn visit(&self, body: &Value, _: &StatementsVisitor) -> QsimResult<Vec<Statement>> {
        let operation = if optional(body, "pulse").is_some() {
            named(body, "pulse", self.tag())?
        } else {
            named(body, "namedPulse", self.tag())?
        };

        Ok(vec![Statement::Measure {
            operation,
            element: extract_single_element(body, self.tag())?,
            amp: amplitude(body)?,
        }])
    }
}

/// `save`; saving a result has no effect on the pulse timeline
pub struct SaveVisitor;

impl StatementVisitor for SaveVisitor {
    fn tag(&self) -> &'static str {
        "save"
    }

    fn visit(&self, _: &Value, _: &StatementsVisitor) -> QsimResult<Vec<Statement>> {
        log::debug!("Dropping save statement");
        Ok(Vec::new())
    }
}

// ============================================================================
// Control Flow
// ============================================================================

/// `if` (no else branch)
pub struct IfVisitor;

impl StatementVisitor for IfVisitor {
    fn tag(&self) -> &'static str {
        "if"
    }

    fn visit(&self, body: &Value, statements: &StatementsVisitor) -> QsimResult<Vec<Statement>> {
        for branch in ["else", "elseifs"] {
            if Self::has_content(optional(body, branch)) {
                return Err(QsimError::UnsupportedStatement(format!("if.{}", branch)));
            }
        }

        let cond = ExpressionVisitor::visit(field(body, "condition", self.tag())?)?;
        let branch = statements.visit(field(body, "body", self.tag())?)?;
        Ok(vec![Statement::If { body: branch, cond }])
    }
}

impl IfVisitor {
    fn has_content(branch: Option<&Value>) -> bool {
        match branch {
            None => false,
            Some(Value::Array(items)) => !items.is_empty(),
            Some(Value::Object(block)) => block
                .get("statements")
                .and_then(Value::as_array)
                .map(|s| !s.is_empty())
                .unwrap_or(!block.is_empty()),
            Some(_) => true,
        }
    }
}

/// `for`: `for(init; cond; update) body` becomes
/// `init; while(cond) { body; update }`
pub struct ForVisitor;

impl StatementVisitor for ForVisitor {
    fn tag(&self) -> &'static str {
        "for"
    }

    fn visit(&self, body: &Value, statements: &StatementsVisitor) -> QsimResult<Vec<Statement>> {
        let mut nodes = match optional(body, "init") {
            Some(init) => statements.visit(init)?,
            None => Vec::new(),
        };

        let cond = ExpressionVisitor::visit(field(body, "condition", self.tag())?)?;

        let mut loop_body = statements.visit(field(body, "body", self.tag())?)?;
        if let Some(update) = optional(body, "update") {
            loop_body.extend(statements.visit(update)?);
        }

        nodes.push(Statement::For {
            body: loop_body,
            cond,
        });
        Ok(nodes)
    }
}

// ============================================================================
// Tests
// ============================================================================
