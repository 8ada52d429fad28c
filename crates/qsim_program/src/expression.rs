//! Expression visitor
//!
//! Gantree: L2_Program → ExpressionVisitor
//!
//! Parses one tagged expression node into an [`Expression`]. Exactly five
//! tags are understood; anything else is rejected.

use crate::wire::{field, optional, str_field, tagged};
use qsim_core::{BinaryOp, Expression, QsimError, QsimResult};
use serde_json::Value;

/// Literal tag
pub const LITERAL: &str = "literal";
/// Variable reference tag
pub const VARIABLE: &str = "variable";
/// Scalar reference tag
pub const SCALAR: &str = "scalar";
/// Binary operation tag
pub const BINARY_OPERATION: &str = "binaryOperation";
/// Library function tag
pub const LIB_FUNCTION: &str = "libFunction";

/// Tagged expression → [`Expression`]
/// Gantree: ExpressionVisitor // visit(dict) -> Expression
pub struct ExpressionVisitor;

impl ExpressionVisitor {
    /// Parse one expression node
    pub fn visit(value: &Value) -> QsimResult<Expression> {
        let (tag, body) = tagged(value, "expression")?;

        match tag {
            LITERAL => Ok(Expression::Literal(Self::literal_text(body)?)),
            VARIABLE | SCALAR => Ok(Expression::Reference(
                str_field(body, "name", tag)?.to_string(),
            )),
            BINARY_OPERATION => {
                let left = Self::visit(field(body, "left", tag)?)?;
                let right = Self::visit(field(body, "right", tag)?)?;
                let op = BinaryOp::from_wire(str_field(body, "op", tag)?)?;
                Ok(Expression::operation(left, right, op))
            }
            LIB_FUNCTION => {
                let function_name = str_field(body, "functionName", tag)?.to_string();
                let library_name = optional(body, "libraryName")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let arguments = match optional(body, "arguments") {
                    None => Vec::new(),
                    Some(Value::Array(items)) => {
                        items.iter().map(Self::visit).collect::<QsimResult<_>>()?
                    }
                    Some(other) => {
                        return Err(QsimError::malformed(
                            tag,
                            format!("'arguments' must be a list, got {}", other),
                        ))
                    }
                };
                Ok(Expression::Function {
                    arguments,
                    function_name,
                    library_name,
                })
            }
            other => Err(QsimError::UnsupportedExpression(other.to_string())),
        }
    }

    /// Parse an optional expression field
    pub fn visit_optional(body: &Value, key: &str) -> QsimResult<Option<Expression>> {
        optional(body, key).map(Self::visit).transpose()
    }

    fn literal_text(body: &Value) -> QsimResult<String> {
        match field(body, "value", LITERAL)? {
            Value::String(text) => Ok(text.clone()),
            Value::Number(number) => Ok(number.to_string()),
            Value::Bool(flag) => Ok(flag.to_string()),
            other => Err(QsimError::InvalidLiteral(other.to_string())),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
