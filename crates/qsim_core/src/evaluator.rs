//! Expression evaluation for QSIM
//!
//! Gantree: L1_Ast → Evaluator
//!
//! Computes the runtime [`Value`] of an [`Expression`] against a [`Context`]
//! of variable bindings. The context is always passed explicitly; there is
//! no process-wide binding table.

use crate::error::{QsimError, QsimResult};
use crate::expression::{BinaryOp, Expression};
use crate::types::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Context
// ============================================================================

/// Variable bindings for one compilation pass
/// Gantree: Context // vars: name -> Value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Context {
    vars: BTreeMap<String, Value>,
}

impl Context {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a variable
    pub fn get(&self, name: &str) -> QsimResult<Value> {
        self.vars
            .get(name)
            .copied()
            .ok_or_else(|| QsimError::UndefinedVariable(name.to_string()))
    }

    /// Bind or rebind a variable
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.vars.insert(name.into(), value);
    }

    /// Check if a variable is bound
    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Number of bound variables
    pub fn len(&self) -> usize {
        self.vars.len()
    }

    /// Check if no variable is bound
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Iterate bindings in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

// ============================================================================
// Evaluator
// ============================================================================

/// Library function multiplying a fixed-point value by an integer
pub const MUL_FIXED_BY_INT: &str = "mul_fixed_by_int";

/// Recursive expression evaluator
/// Gantree: Evaluator // visit(Expression, Context) -> Value
pub struct Evaluator;

impl Evaluator {
    /// Evaluate an expression.
    ///
    /// `0 * x` returns 0 without evaluating `x`. This relies on every
    /// expression in the grammar being free of side effects.
    pub fn visit(expression: &Expression, context: &Context) -> QsimResult<Value> {
        match expression {
            Expression::Literal(text) => Value::parse_literal(text),
            Expression::Reference(name) => context.get(name),
            Expression::Operation { left, right, op } => {
                let lhs = Self::visit(left, context)?;
                if *op == BinaryOp::Mult && lhs.is_zero() {
                    log::trace!("MULT short-circuit, skipping {}", right);
                    return Ok(Value::Int(0));
                }
                let rhs = Self::visit(right, context)?;
                Self::apply(*op, lhs, rhs)
            }
            Expression::Function {
                arguments,
                function_name,
                library_name,
            } => Self::call(arguments, function_name, library_name, context),
        }
    }

    /// Apply a binary operator to two evaluated operands
    pub fn apply(op: BinaryOp, lhs: Value, rhs: Value) -> QsimResult<Value> {
        let (lhs, rhs) = (lhs.numeric(), rhs.numeric());

        match op {
            BinaryOp::Add => Self::arithmetic(op, lhs, rhs, i64::checked_add, |a, b| a + b),
            BinaryOp::Sub => Self::arithmetic(op, lhs, rhs, i64::checked_sub, |a, b| a - b),
            BinaryOp::Mult => Self::arithmetic(op, lhs, rhs, i64::checked_mul, |a, b| a * b),
            BinaryOp::Div => {
                let divisor = rhs.as_f64();
                if divisor == 0.0 {
                    return Err(QsimError::DivisionByZero);
                }
                Ok(Value::Float(lhs.as_f64() / divisor))
            }
            BinaryOp::Shr => Self::shift_right(lhs, rhs),
            BinaryOp::Gt => Ok(Value::Bool(Self::compare(lhs, rhs, |o| o.is_gt()))),
            BinaryOp::Get => Ok(Value::Bool(Self::compare(lhs, rhs, |o| o.is_ge()))),
            BinaryOp::Lt => Ok(Value::Bool(Self::compare(lhs, rhs, |o| o.is_lt()))),
            BinaryOp::Let => Ok(Value::Bool(Self::compare(lhs, rhs, |o| o.is_le()))),
            BinaryOp::Eq => Ok(Value::Bool(Self::compare(lhs, rhs, |o| o.is_eq()))),
        }
    }

    fn arithmetic(
        op: BinaryOp,
        lhs: Value,
        rhs: Value,
        int_op: fn(i64, i64) -> Option<i64>,
        float_op: fn(f64, f64) -> f64,
    ) -> QsimResult<Value> {
        match (lhs, rhs) {
            (Value::Int(a), Value::Int(b)) => int_op(a, b)
                .map(Value::Int)
                .ok_or_else(|| QsimError::ArithmeticOverflow(op.wire_name().to_string())),
            _ => Ok(Value::Float(float_op(lhs.as_f64(), rhs.as_f64()))),
        }
    }

    fn shift_right(lhs: Value, rhs: Value) -> QsimResult<Value> {
        let (Some(value), Some(amount)) = (lhs.as_i64(), rhs.as_i64()) else {
            return Err(QsimError::TypeMismatch {
                operation: "SHR".into(),
                message: format!(
                    "operands must be integers, got {} and {}",
                    lhs.type_name(),
                    rhs.type_name()
                ),
            });
        };
        if amount < 0 {
            return Err(QsimError::TypeMismatch {
                operation: "SHR".into(),
                message: format!("negative shift count {}", amount),
            });
        }
        // i64 >> 63 already saturates to 0 or -1
        Ok(Value::Int(value >> amount.min(63)))
    }

    fn compare(lhs: Value, rhs: Value, test: fn(std::cmp::Ordering) -> bool) -> bool {
        let ordering = match (lhs, rhs) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(&b)),
            _ => lhs.as_f64().partial_cmp(&rhs.as_f64()),
        };
        ordering.map(test).unwrap_or(false)
    }

    fn call(
        arguments: &[Expression],
        function_name: &str,
        library_name: &str,
        context: &Context,
    ) -> QsimResult<Value> {
        match function_name {
            MUL_FIXED_BY_INT => {
                let [left, right] = arguments else {
                    return Err(QsimError::malformed(
                        "libFunction",
                        format!(
                            "{} expects 2 arguments, got {}",
                            MUL_FIXED_BY_INT,
                            arguments.len()
                        ),
                    ));
                };
                let lhs = Self::visit(left, context)?;
                let rhs = Self::visit(right, context)?;
                Self::apply(BinaryOp::Mult, lhs, rhs)
            }
            other => Err(QsimError::UnsupportedFunction {
                library: library_name.to_string(),
                function: other.to_string(),
            }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn lit(text: &str) -> Expression {
        Expression::literal(text)
    }

    fn op(left: Expression, right: Expression, op: BinaryOp) -> Expression {
        Expression::operation(left, right, op)
    }

    #[test]
    fn test_literal_and_reference() {
        let mut ctx = Context::new();
        ctx.set("a", Value::Int(7));

        assert_eq!(Evaluator::visit(&lit("100"), &ctx).unwrap(), Value::Int(100));
        assert_eq!(
            Evaluator::visit(&Expression::reference("a"), &ctx).unwrap(),
            Value::Int(7)
        );
    }

    #[test]
    fn test_undefined_reference() {
        let ctx = Context::new();
        let result = Evaluator::visit(&Expression::reference("missing"), &ctx);
        assert_eq!(
            result.unwrap_err(),
            QsimError::UndefinedVariable("missing".into())
        );
    }

    #[test]
    fn test_mult_by_zero_skips_right_operand() {
        let ctx = Context::new();
        // Right operand would fail with UndefinedVariable if it were evaluated
        let expr = op(lit("0"), Expression::reference("undefined"), BinaryOp::Mult);
        assert_eq!(Evaluator::visit(&expr, &ctx).unwrap(), Value::Int(0));

        let expr = op(lit("0.0"), Expression::reference("undefined"), BinaryOp::Mult);
        assert_eq!(Evaluator::visit(&expr, &ctx).unwrap(), Value::Int(0));
    }

    #[test]
    fn test_mult_by_zero_on_right_still_evaluates() {
        let ctx = Context::new();
        let expr = op(Expression::reference("undefined"), lit("0"), BinaryOp::Mult);
        assert!(Evaluator::visit(&expr, &ctx).is_err());
    }

    #[test]
    fn test_arithmetic() {
        let ctx = Context::new();
        assert_eq!(
            Evaluator::visit(&op(lit("3"), lit("4"), BinaryOp::Add), &ctx).unwrap(),
            Value::Int(7)
        );
        assert_eq!(
            Evaluator::visit(&op(lit("3"), lit("4"), BinaryOp::Sub), &ctx).unwrap(),
            Value::Int(-1)
        );
        assert_eq!(
            Evaluator::visit(&op(lit("3"), lit("4"), BinaryOp::Mult), &ctx).unwrap(),
            Value::Int(12)
        );

        let mixed = Evaluator::visit(&op(lit("3"), lit("0.5"), BinaryOp::Add), &ctx).unwrap();
        assert_relative_eq!(mixed.as_f64(), 3.5);
    }

    #[test]
    fn test_division() {
        let ctx = Context::new();
        let quotient = Evaluator::visit(&op(lit("7"), lit("2"), BinaryOp::Div), &ctx).unwrap();
        assert_relative_eq!(quotient.as_f64(), 3.5);

        assert_eq!(
            Evaluator::visit(&op(lit("1"), lit("0"), BinaryOp::Div), &ctx).unwrap_err(),
            QsimError::DivisionByZero
        );
    }

    #[test]
    fn test_shift_right() {
        let ctx = Context::new();
        assert_eq!(
            Evaluator::visit(&op(lit("16"), lit("2"), BinaryOp::Shr), &ctx).unwrap(),
            Value::Int(4)
        );
        // Arithmetic shift keeps the sign
        assert_eq!(
            Evaluator::visit(&op(lit("-16"), lit("2"), BinaryOp::Shr), &ctx).unwrap(),
            Value::Int(-4)
        );
        assert!(matches!(
            Evaluator::visit(&op(lit("1.5"), lit("1"), BinaryOp::Shr), &ctx),
            Err(QsimError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_comparisons() {
        let ctx = Context::new();
        let cases = [
            (BinaryOp::Gt, "3", "2", true),
            (BinaryOp::Gt, "2", "2", false),
            (BinaryOp::Get, "2", "2", true),
            (BinaryOp::Lt, "1", "2.5", true),
            (BinaryOp::Let, "3", "2", false),
            (BinaryOp::Eq, "2", "2.0", true),
        ];
        for (operator, a, b, expected) in cases {
            let result = Evaluator::visit(&op(lit(a), lit(b), operator), &ctx).unwrap();
            assert_eq!(result, Value::Bool(expected), "{} {} {}", a, operator, b);
        }
    }

    #[test]
    fn test_overflow() {
        let ctx = Context::new();
        let expr = op(lit("9223372036854775807"), lit("1"), BinaryOp::Add);
        assert!(matches!(
            Evaluator::visit(&expr, &ctx),
            Err(QsimError::ArithmeticOverflow(_))
        ));
    }

    #[test]
    fn test_mul_fixed_by_int() {
        let mut ctx = Context::new();
        ctx.set("k", Value::Int(3));
        let call = Expression::function(
            vec![lit("0.25"), Expression::reference("k")],
            MUL_FIXED_BY_INT,
            "util",
        );
        let value = Evaluator::visit(&call, &ctx).unwrap();
        assert_relative_eq!(value.as_f64(), 0.75);
    }

    #[test]
    fn test_unknown_function() {
        let ctx = Context::new();
        let call = Expression::function(vec![lit("1")], "cos2pi", "math");
        let err = Evaluator::visit(&call, &ctx).unwrap_err();
        assert!(err.is_unsupported());
    }

    #[test]
    fn test_function_arity() {
        let ctx = Context::new();
        let call = Expression::function(vec![lit("1")], MUL_FIXED_BY_INT, "util");
        assert!(matches!(
            Evaluator::visit(&call, &ctx),
            Err(QsimError::MalformedNode { .. })
        ));
    }

    #[test]
    fn test_context_rebind() {
        let mut ctx = Context::new();
        ctx.set("n", Value::Int(0));
        ctx.set("n", Value::Int(1));
        assert_eq!(ctx.len(), 1);
        assert_eq!(ctx.get("n").unwrap(), Value::Int(1));
    }
}
