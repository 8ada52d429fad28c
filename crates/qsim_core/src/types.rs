//! Core types for QSIM
//!
//! Gantree: L0_Foundation → CoreTypes
//!
//! Type aliases shared by every stage of the pipeline and the runtime
//! [`Value`] produced by expression evaluation.

use crate::error::{QsimError, QsimResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// Name of a hardware element (channel), e.g. `"q0"` or `"rr0"`
pub type ElementName = String;

/// Virtual-clock duration in program time units
/// Gantree: Duration // pub type Duration = u64
pub type Duration = u64;

/// Phase in radians
pub type Phase = f64;

/// Qubit identifier (0-indexed)
pub type QubitIndex = usize;

// ============================================================================
// Value
// ============================================================================

/// Runtime value of an evaluated expression
/// Gantree: Value // Int | Float | Bool
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Integer value
    Int(i64),
    /// Fixed-point / floating value
    Float(f64),
    /// Boolean value
    Bool(bool),
}

impl Value {
    /// Parse the text of a literal node.
    ///
    /// Accepts integers, finite floats and `true`/`false` (any case).
    /// Anything else is rejected rather than guessed.
    pub fn parse_literal(text: &str) -> QsimResult<Self> {
        let trimmed = text.trim();

        if trimmed.eq_ignore_ascii_case("true") {
            return Ok(Value::Bool(true));
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Ok(Value::Bool(false));
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Ok(Value::Int(i));
        }
        match trimmed.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Value::Float(f)),
            _ => Err(QsimError::InvalidLiteral(text.to_string())),
        }
    }

    /// Booleans participate in arithmetic as 0 / 1
    pub fn numeric(self) -> Self {
        match self {
            Value::Bool(b) => Value::Int(i64::from(b)),
            other => other,
        }
    }

    /// Truthiness used by loop and branch conditions
    pub fn is_truthy(&self) -> bool {
        match *self {
            Value::Bool(b) => b,
            Value::Int(i) => i != 0,
            Value::Float(f) => f != 0.0,
        }
    }

    /// Check if value compares equal to zero
    pub fn is_zero(&self) -> bool {
        !self.is_truthy()
    }

    /// Value as f64
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Bool(b) => f64::from(u8::from(b)),
            Value::Int(i) => i as f64,
            Value::Float(f) => f,
        }
    }

    /// Value as an integer, if it is one (booleans count as 0 / 1)
    pub fn as_i64(&self) -> Option<i64> {
        match self.numeric() {
            Value::Int(i) => Some(i),
            _ => None,
        }
    }

    /// Interpret value as a non-negative whole duration
    pub fn to_duration(&self) -> QsimResult<Duration> {
        match *self {
            Value::Int(i) => {
                Duration::try_from(i).map_err(|_| QsimError::InvalidDuration(i.to_string()))
            }
            Value::Float(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 => Ok(f as Duration),
            other => Err(QsimError::InvalidDuration(other.to_string())),
        }
    }

    /// Type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "fixed",
            Value::Bool(_) => "bool",
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Int(0)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

// ============================================================================
// Tests
// ============================================================================
