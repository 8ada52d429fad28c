//! # QSIM Core
//!
//! Program AST, expression evaluation, and configuration tables for the
//! QSIM pulse-program compiler.
//!
//! ## Gantree Architecture
//!
//! ```text
//! qsim_core // L0+L1: Foundation + AST
//!     L0_Foundation // 기반 타입/에러/설정
//!         CoreTypes // Value, Duration, Phase
//!         Errors // QsimError
//!         QuaConfig // elements / pulses / waveforms
//!         ChannelMap // element -> (qubit, drive channel)
//!         PulseShape // constant / arbitrary envelopes
//!     L1_Ast // 프로그램 트리
//!         Expression // Literal | Reference | Operation | Function
//!         Statement // Assign | Play | Measure | Wait | Align | ...
//!         Evaluator // visit(Expression, Context) -> Value
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use qsim_core::prelude::*;
//!
//! let mut ctx = Context::new();
//! ctx.set("n", Value::Int(4));
//!
//! let expr = Expression::operation(
//!     Expression::reference("n"),
//!     Expression::literal("2"),
//!     BinaryOp::Shr,
//! );
//!
//! assert_eq!(Evaluator::visit(&expr, &ctx).unwrap(), Value::Int(1));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// ============================================================================
// Module Declarations
// ============================================================================

/// Core types (Gantree: L0_Foundation → CoreTypes)
pub mod types;

/// Error types (Gantree: L0_Foundation → Errors)
pub mod error;

/// Pulse envelopes (Gantree: L0_Foundation → PulseShape)
pub mod waveform;

/// Configuration table (Gantree: L0_Foundation → QuaConfig)
pub mod config;

/// Element channel mapping (Gantree: L0_Foundation → ChannelMap)
pub mod channel;

/// Expression AST (Gantree: L1_Ast → Expression)
pub mod expression;

/// Statement AST (Gantree: L1_Ast → Statement)
pub mod statement;

/// Expression evaluator (Gantree: L1_Ast → Evaluator)
pub mod evaluator;

// ============================================================================
// Re-exports
// ============================================================================

pub use channel::{ChannelMap, ChannelSpec};
pub use config::{QuaConfig, ResolvedPulse};
pub use error::{QsimError, QsimResult};
pub use evaluator::{Context, Evaluator};
pub use expression::{BinaryOp, Expression};
pub use statement::Statement;
pub use types::{Duration, ElementName, Phase, QubitIndex, Value};
pub use waveform::PulseShape;

// ============================================================================
// Prelude
// ============================================================================

pub mod prelude {
    //! Convenient imports for common use cases
    //!
    //! ```rust
    //! use qsim_core::prelude::*;
    //! ```

    pub use crate::channel::{ChannelMap, ChannelSpec};
    pub use crate::config::{
        ElementConfig, InputKind, PulseConfig, QuaConfig, ResolvedPulse, WaveformConfig,
    };
    pub use crate::error::{QsimError, QsimResult};
    pub use crate::evaluator::{Context, Evaluator};
    pub use crate::expression::{BinaryOp, Expression};
    pub use crate::statement::Statement;
    pub use crate::types::{Duration, ElementName, Phase, QubitIndex, Value};
    pub use crate::waveform::PulseShape;
}

// ============================================================================
// Version Information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

// ============================================================================
// Integration Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_loop_condition_evaluation() {
        // n < 3, with n bumped by an assignment-like rebinding
        let cond = Expression::operation(
            Expression::reference("n"),
            Expression::literal("3"),
            BinaryOp::Lt,
        );
        let mut ctx = Context::new();
        let mut iterations = 0;
        ctx.set("n", Value::Int(0));

        while Evaluator::visit(&cond, &ctx).unwrap().is_truthy() {
            let next = Evaluator::apply(BinaryOp::Add, ctx.get("n").unwrap(), Value::Int(1));
            ctx.set("n", next.unwrap());
            iterations += 1;
        }

        assert_eq!(iterations, 3);
        assert_eq!(ctx.get("n").unwrap(), Value::Int(3));
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let expr = Expression::function(
            vec![
                Expression::literal("0.125"),
                Expression::operation(
                    Expression::literal("6"),
                    Expression::literal("1"),
                    BinaryOp::Shr,
                ),
            ],
            "mul_fixed_by_int",
            "util",
        );
        let ctx = Context::new();
        let a = Evaluator::visit(&expr, &ctx).unwrap();
        let b = Evaluator::visit(&expr, &ctx).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, Value::Float(0.375));
    }

    #[test]
    fn test_statement_serde() {
        let stmt = Statement::For {
            body: vec![Statement::play("x90", "q0")],
            cond: Expression::literal("false"),
        };
        let json = serde_json::to_string(&stmt).unwrap();
        let back: Statement = serde_json::from_str(&json).unwrap();
        assert_eq!(stmt, back);
    }
}
