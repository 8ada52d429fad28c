//! # QSIM Program
//!
//! Compiles the program dictionary emitted by the pulse-program SDK into the
//! statement AST of [`qsim_core`].
//!
//! ## Gantree Architecture
//!
//! ```text
//! qsim_program // L2: Dictionary → AST
//!     Wire // tagged-union JSON access
//!     ExpressionVisitor // literal / variable / scalar / binaryOperation / libFunction
//!     extract_elements // qe normalization
//!     StatementVisitors // one visitor per wire tag
//!     StatementsVisitor // tag -> visitor registry
//!     ProgramVisitor // full program or statement block entry point
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qsim_program::prelude::*;
//! use qsim_core::{Expression, Statement};
//! use serde_json::json;
//!
//! let program = json!({"statements": [
//!     {"play": {"qe": "q0", "namedPulse": {"name": "x90"}}},
//!     {"wait": {"time": {"literal": {"value": "100"}}, "qe": "q0"}}
//! ]});
//!
//! let ast = ProgramVisitor::new().visit(&program).unwrap();
//! assert_eq!(ast[0], Statement::play("x90", "q0"));
//! assert_eq!(ast[1], Statement::wait(Expression::literal("100"), vec!["q0".into()]));
//! ```

#![warn(missing_docs)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Tagged-union access helpers (Gantree: L2_Program → Wire)
pub mod wire;

/// Expression visitor (Gantree: L2_Program → ExpressionVisitor)
pub mod expression;

/// Element reference normalization (Gantree: L2_Program → extract_elements)
pub mod elements;

/// Per-tag statement visitors (Gantree: L2_Program → StatementVisitors)
pub mod visitors;

/// Statement registry and program entry point (Gantree: L2_Program → StatementsVisitor)
pub mod statements;

// ============================================================================
// Re-exports
// ============================================================================

pub use elements::extract_elements;
pub use expression::ExpressionVisitor;
pub use statements::{ProgramVisitor, StatementsVisitor};
pub use visitors::StatementVisitor;

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for dictionary compilation
    //!
    //! ```rust
    //! use qsim_program::prelude::*;
    //! ```

    pub use crate::elements::extract_elements;
    pub use crate::expression::ExpressionVisitor;
    pub use crate::statements::{ProgramVisitor, StatementsVisitor};
    pub use crate::visitors::StatementVisitor;
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use qsim_core::{BinaryOp, Expression, QsimError, Statement};
    use serde_json::{json, Value};

    fn averaging_program() -> Value {
        json!({"statements": [
            {"for": {
                "init": {"statements": [{"assign": {
                    "target": {"variable": {"name": "n"}},
                    "expression": {"literal": {"value": "0"}}
                }}]},
                "condition": {"binaryOperation": {
                    "left": {"variable": {"name": "n"}},
                    "right": {"literal": {"value": "10"}},
                    "op": "LT"
                }},
                "update": {"statements": [{"assign": {
                    "target": {"variable": {"name": "n"}},
                    "expression": {"binaryOperation": {
                        "left": {"variable": {"name": "n"}},
                        "right": {"literal": {"value": "1"}},
                        "op": "ADD"
                    }}
                }}]},
                "body": {"statements": [
                    {"play": {"qe": {"name": "q0"}, "namedPulse": {"name": "x90"}}},
                    {"align": {"qe": [{"name": "q0"}, {"name": "rr0"}]}},
                    {"measure": {"qe": {"name": "rr0"}, "pulse": {"name": "readout"}}},
                    {"save": {"source": {"variable": {"name": "I"}}, "tag": "I"}},
                    {"if": {
                        "condition": {"binaryOperation": {
                            "left": {"variable": {"name": "n"}},
                            "right": {"literal": {"value": "5"}},
                            "op": "EQ"
                        }},
                        "body": {"statements": [{"frameRotation": {
                            "value": {"literal": {"value": "0.5"}},
                            "qe": "q0"
                        }}]}
                    }}
                ]}
            }}
        ]})
    }

    #[test]
    fn test_end_to_end_ast() {
        let program = json!({"statements": [
            {"play": {"qe": "q0", "namedPulse": {"name": "x90"}}},
            {"wait": {"time": {"literal": {"value": "100"}}, "qe": "q0"}}
        ]});
        let ast = ProgramVisitor::new().visit(&program).unwrap();
        assert_eq!(
            ast,
            vec![
                Statement::Play {
                    operation: "x90".into(),
                    element: "q0".into(),
                    amp: None,
                    duration: None,
                },
                Statement::Wait {
                    time: Expression::literal("100"),
                    elements: vec!["q0".into()],
                },
            ]
        );
    }

    #[test]
    fn test_nested_program_structure() {
        let ast = ProgramVisitor::new().visit(&averaging_program()).unwrap();

        // init hoisted before the loop
        assert_eq!(ast.len(), 2);
        assert_eq!(ast[0], Statement::assign("n", Expression::literal("0")));

        let Statement::For { body, cond } = &ast[1] else {
            panic!("expected a for loop, got {}", ast[1]);
        };
        assert_eq!(
            *cond,
            Expression::operation(
                Expression::reference("n"),
                Expression::literal("10"),
                BinaryOp::Lt
            )
        );
        // play, align, measure, if, update (save dropped)
        let kinds: Vec<_> = body.iter().map(Statement::name).collect();
        assert_eq!(kinds, vec!["play", "align", "measure", "if", "assign"]);
        assert_eq!(ast[1].node_count(), 7);
    }

    #[test]
    fn test_deterministic() {
        let visitor = ProgramVisitor::new();
        let a = visitor.visit(&averaging_program()).unwrap();
        let b = visitor.visit(&averaging_program()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_nested_error_propagates() {
        let program = json!({"statements": [{"if": {
            "condition": {"literal": {"value": "true"}},
            "body": {"statements": [{"rampToZero": {"qe": "q0"}}]}
        }}]});
        assert_eq!(
            ProgramVisitor::new().visit(&program).unwrap_err(),
            QsimError::UnsupportedStatement("rampToZero".into())
        );
    }
}
