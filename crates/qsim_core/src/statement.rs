//! Statement AST for QSIM
//!
//! Gantree: L1_Ast → Statement
//!
//! The program tree produced from the program dictionary. Built once by the
//! dictionary visitors and read-only afterwards.

use crate::expression::Expression;
use crate::types::ElementName;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Statement node
/// Gantree: Statement // program tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// `target = value`
    Assign {
        /// Variable name
        target: String,
        /// Right-hand side
        value: Expression,
    },

    /// Play a named operation on an element
    Play {
        /// Operation name in the element's operation table
        operation: String,
        /// Target element
        element: ElementName,
        /// Optional amplitude scale factor
        amp: Option<Expression>,
        /// Optional duration override
        duration: Option<Expression>,
    },

    /// Measure an element with a readout operation
    Measure {
        /// Readout operation name
        operation: String,
        /// Target element
        element: ElementName,
        /// Optional amplitude scale factor
        amp: Option<Expression>,
    },

    /// Idle the named elements
    Wait {
        /// Wait duration
        time: Expression,
        /// Elements to idle
        elements: Vec<ElementName>,
    },

    /// Synchronization barrier; empty means every element
    Align {
        /// Elements to align
        elements: Vec<ElementName>,
    },

    /// Rotate the frame by `2π · phase`
    FrameRotation2Pi {
        /// Rotation in units of full turns
        phase: Expression,
        /// Elements whose frame rotates
        elements: Vec<ElementName>,
    },

    /// Reset the oscillator phase
    ResetPhase {
        /// Affected elements
        elements: Vec<ElementName>,
    },

    /// Reset the accumulated frame
    ResetFrame {
        /// Affected elements
        elements: Vec<ElementName>,
    },

    /// Loop while `cond` holds; init/update are already desugared
    For {
        /// Loop body, update statements at the tail
        body: Vec<Statement>,
        /// Loop condition
        cond: Expression,
    },

    /// Run `body` once if `cond` holds
    If {
        /// Branch body
        body: Vec<Statement>,
        /// Branch condition
        cond: Expression,
    },
}

impl Statement {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create an assignment
    pub fn assign(target: impl Into<String>, value: Expression) -> Self {
        Statement::Assign {
            target: target.into(),
            value,
        }
    }

    /// Create a play with no amplitude or duration override
    pub fn play(operation: impl Into<String>, element: impl Into<String>) -> Self {
        Statement::Play {
            operation: operation.into(),
            element: element.into(),
            amp: None,
            duration: None,
        }
    }

    /// Create a measurement
    pub fn measure(operation: impl Into<String>, element: impl Into<String>) -> Self {
        Statement::Measure {
            operation: operation.into(),
            element: element.into(),
            amp: None,
        }
    }

    /// Create a wait
    pub fn wait(time: Expression, elements: Vec<ElementName>) -> Self {
        Statement::Wait { time, elements }
    }

    /// Create an align
    pub fn align(elements: Vec<ElementName>) -> Self {
        Statement::Align { elements }
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Statement kind name
    pub fn name(&self) -> &'static str {
        match self {
            Statement::Assign { .. } => "assign",
            Statement::Play { .. } => "play",
            Statement::Measure { .. } => "measure",
            Statement::Wait { .. } => "wait",
            Statement::Align { .. } => "align",
            Statement::FrameRotation2Pi { .. } => "frame_rotation_2pi",
            Statement::ResetPhase { .. } => "reset_phase",
            Statement::ResetFrame { .. } => "reset_frame",
            Statement::For { .. } => "for",
            Statement::If { .. } => "if",
        }
    }

    /// Nested statements for control flow, empty otherwise
    pub fn children(&self) -> &[Statement] {
        match self {
            Statement::For { body, .. } | Statement::If { body, .. } => body,
            _ => &[],
        }
    }

    /// Check if statement contains nested statements
    pub fn is_control_flow(&self) -> bool {
        matches!(self, Statement::For { .. } | Statement::If { .. })
    }

    /// Number of statements in this subtree, including itself
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Statement::node_count).sum::<usize>()
    }

    /// Elements the statement names directly (not its children)
    pub fn elements(&self) -> Vec<&str> {
        match self {
            Statement::Play { element, .. } | Statement::Measure { element, .. } => {
                vec![element.as_str()]
            }
            Statement::Wait { elements, .. }
            | Statement::Align { elements }
            | Statement::FrameRotation2Pi { elements, .. }
            | Statement::ResetPhase { elements }
            | Statement::ResetFrame { elements } => elements.iter().map(String::as_str).collect(),
            Statement::Assign { .. } | Statement::For { .. } | Statement::If { .. } => Vec::new(),
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        match self {
            Statement::Assign { target, value } => writeln!(f, "{}{} = {}", pad, target, value),
            Statement::Play {
                operation,
                element,
                amp,
                duration,
            } => {
                write!(f, "{}play({}, {}", pad, operation, element)?;
                if let Some(amp) = amp {
                    write!(f, ", amp={}", amp)?;
                }
                if let Some(duration) = duration {
                    write!(f, ", duration={}", duration)?;
                }
                writeln!(f, ")")
            }
            Statement::Measure {
                operation,
                element,
                amp,
            } => {
                write!(f, "{}measure({}, {}", pad, operation, element)?;
                if let Some(amp) = amp {
                    write!(f, ", amp={}", amp)?;
                }
                writeln!(f, ")")
            }
            Statement::Wait { time, elements } => {
                writeln!(f, "{}wait({}, {})", pad, time, elements.join(", "))
            }
            Statement::Align { elements } => writeln!(f, "{}align({})", pad, elements.join(", ")),
            Statement::FrameRotation2Pi { phase, elements } => {
                writeln!(f, "{}frame_rotation_2pi({}, {})", pad, phase, elements.join(", "))
            }
            Statement::ResetPhase { elements } => {
                writeln!(f, "{}reset_phase({})", pad, elements.join(", "))
            }
            Statement::ResetFrame { elements } => {
                writeln!(f, "{}reset_frame({})", pad, elements.join(", "))
            }
            Statement::For { body, cond } => {
                writeln!(f, "{}while {}:", pad, cond)?;
                for stmt in body {
                    stmt.fmt_indented(f, indent + 1)?;
                }
                Ok(())
            }
            Statement::If { body, cond } => {
                writeln!(f, "{}if {}:", pad, cond)?;
                for stmt in body {
                    stmt.fmt_indented(f, indent + 1)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

// ============================================================================
// Tests
// ============================================================================
