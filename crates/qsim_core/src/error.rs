//! Error types for QSIM
//!
//! Gantree: L0_Foundation → Errors
//!
//! Every stage of the compilation pipeline (dictionary → AST → timelines →
//! pulse schedules) reports failures through [`QsimError`]. Nothing in the
//! pipeline recovers from an error: an unknown wire shape or an undefined
//! variable aborts the whole compilation.

// Error variant fields are self-documenting via error messages
#![allow(missing_docs)]

use thiserror::Error;

/// Main error type for QSIM
/// Gantree: QsimError // enum
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QsimError {
    // ========================================================================
    // Unsupported Wire Shapes
    // ========================================================================
    /// Statement tag with no registered visitor
    /// Gantree: UnsupportedStatement(String) // 미지원 구문
    #[error("Unsupported statement type '{0}'")]
    UnsupportedStatement(String),

    /// Expression tag outside the supported set
    #[error("Unsupported expression type '{0}'")]
    UnsupportedExpression(String),

    /// Library function with no implementation
    #[error("Unsupported library function '{library}.{function}'")]
    UnsupportedFunction { library: String, function: String },

    /// Binary operator outside the supported set
    #[error("Unsupported binary operator '{0}'")]
    UnsupportedOperator(String),

    /// `qe` field with an unrecognized shape
    #[error("Unsupported element reference shape: {0}")]
    UnsupportedElementShape(String),

    /// Key outside the play statement whitelist
    #[error("Unsupported key '{0}' in play statement")]
    UnsupportedPlayKey(String),

    // ========================================================================
    // Malformed Input
    // ========================================================================
    /// Required field missing or of the wrong JSON type
    #[error("Malformed '{node}' node: {message}")]
    MalformedNode { node: String, message: String },

    /// Literal text that is not a number or boolean
    #[error("Invalid literal '{0}'")]
    InvalidLiteral(String),

    /// Value that cannot be used as a duration
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    // ========================================================================
    // Evaluation Errors
    // ========================================================================
    /// Reference to a variable that was never assigned
    /// Gantree: UndefinedVariable(String) // 미정의 변수
    #[error("Undefined variable '{0}'")]
    UndefinedVariable(String),

    /// Operand types incompatible with the operator
    #[error("Type mismatch in {operation}: {message}")]
    TypeMismatch { operation: String, message: String },

    /// Division by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Integer overflow during evaluation
    #[error("Arithmetic overflow in {0}")]
    ArithmeticOverflow(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Element missing from the configuration or channel map
    #[error("Unknown element '{0}'")]
    UnknownElement(String),

    /// Operation not defined on an element
    #[error("Element '{element}' has no operation '{operation}'")]
    UnknownOperation { element: String, operation: String },

    /// Pulse missing from the configuration
    #[error("Unknown pulse '{0}'")]
    UnknownPulse(String),

    /// Waveform missing from the configuration
    #[error("Unknown waveform '{0}'")]
    UnknownWaveform(String),

    /// Inconsistent configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // ========================================================================
    // Schedule Errors
    // ========================================================================
    /// Elements recorded different numbers of shots
    /// Gantree: ShotCountMismatch{{element,expected,found}} // 샷 수 불일치
    #[error("Shot count mismatch: element '{element}' has {found} shots, expected {expected}")]
    ShotCountMismatch {
        element: String,
        expected: usize,
        found: usize,
    },

    /// Pipeline stage run before the stage it depends on
    #[error("Pipeline stage '{stage}' requires '{requires}' first")]
    StageOrder { stage: String, requires: String },

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(String),

    /// File I/O error
    #[error("File error: {0}")]
    FileError(String),
}

/// Result type alias for QSIM operations
/// Gantree: QsimResult<T> // type alias
pub type QsimResult<T> = Result<T, QsimError>;

// ============================================================================
// Error Conversion Helpers
// ============================================================================

impl From<serde_json::Error> for QsimError {
    fn from(err: serde_json::Error) -> Self {
        QsimError::JsonError(err.to_string())
    }
}

impl From<std::io::Error> for QsimError {
    fn from(err: std::io::Error) -> Self {
        QsimError::FileError(err.to_string())
    }
}

// ============================================================================
// Error Helpers
// ============================================================================

impl QsimError {
    /// Shorthand for [`QsimError::MalformedNode`]
    pub fn malformed(node: &str, message: impl Into<String>) -> Self {
        QsimError::MalformedNode {
            node: node.to_string(),
            message: message.into(),
        }
    }

    /// Check if error reports a wire shape outside the supported set
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            QsimError::UnsupportedStatement(_)
                | QsimError::UnsupportedExpression(_)
                | QsimError::UnsupportedFunction { .. }
                | QsimError::UnsupportedOperator(_)
                | QsimError::UnsupportedElementShape(_)
                | QsimError::UnsupportedPlayKey(_)
        )
    }

    /// Check if error was raised while evaluating an expression
    pub fn is_evaluation_error(&self) -> bool {
        matches!(
            self,
            QsimError::UndefinedVariable(_)
                | QsimError::TypeMismatch { .. }
                | QsimError::DivisionByZero
                | QsimError::ArithmeticOverflow(_)
                | QsimError::InvalidLiteral(_)
        )
    }

    /// Check if error comes from a configuration lookup
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            QsimError::UnknownElement(_)
                | QsimError::UnknownOperation { .. }
                | QsimError::UnknownPulse(_)
                | QsimError::UnknownWaveform(_)
                | QsimError::ConfigError(_)
        )
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QsimError::UnsupportedStatement("unknownStatementType".into());
        assert!(err.to_string().contains("unknownStatementType"));
    }

    #[test]
    fn test_shot_count_mismatch() {
        let err = QsimError::ShotCountMismatch {
            element: "q1".into(),
            expected: 3,
            found: 2,
        };
        assert!(err.to_string().contains("q1"));
        assert!(err.to_string().contains('3'));
    }

    #[test]
    fn test_is_unsupported() {
        assert!(QsimError::UnsupportedPlayKey("chirp".into()).is_unsupported());
        assert!(!QsimError::UndefinedVariable("a".into()).is_unsupported());
    }

    #[test]
    fn test_is_evaluation_error() {
        assert!(QsimError::UndefinedVariable("a".into()).is_evaluation_error());
        assert!(QsimError::DivisionByZero.is_evaluation_error());
        assert!(!QsimError::UnknownPulse("x90".into()).is_evaluation_error());
    }

    #[test]
    fn test_is_config_error() {
        assert!(QsimError::UnknownElement("q9".into()).is_config_error());
        assert!(!QsimError::DivisionByZero.is_config_error());
    }

    #[test]
    fn test_from_json_error() {
        let err: QsimError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, QsimError::JsonError(_)));
    }
}
