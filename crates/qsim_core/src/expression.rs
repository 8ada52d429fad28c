//! Expression AST for QSIM
//!
//! Gantree: L1_Ast → Expression
//!
//! Scalar expressions drawn from the program dictionary. Nodes are immutable
//! once built and own their children, so an expression is always a tree.

use crate::error::{QsimError, QsimResult};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Binary Operators
// ============================================================================

/// Binary operator of an [`Expression::Operation`]
/// Gantree: BinaryOp // ADD|SUB|MULT|DIV|SHR|GT|GET|LT|LET|EQ
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Addition
    Add,
    /// Subtraction
    Sub,
    /// Multiplication
    Mult,
    /// True division
    Div,
    /// Arithmetic right shift
    Shr,
    /// Greater than
    Gt,
    /// Greater than or equal
    Get,
    /// Less than
    Lt,
    /// Less than or equal
    Let,
    /// Equality
    Eq,
}

impl BinaryOp {
    /// All supported operators
    pub const ALL: [BinaryOp; 10] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mult,
        BinaryOp::Div,
        BinaryOp::Shr,
        BinaryOp::Gt,
        BinaryOp::Get,
        BinaryOp::Lt,
        BinaryOp::Let,
        BinaryOp::Eq,
    ];

    /// Parse the wire-format operator name
    pub fn from_wire(name: &str) -> QsimResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.wire_name() == name)
            .ok_or_else(|| QsimError::UnsupportedOperator(name.to_string()))
    }

    /// Wire-format operator name
    pub fn wire_name(&self) -> &'static str {
        match self {
            BinaryOp::Add => "ADD",
            BinaryOp::Sub => "SUB",
            BinaryOp::Mult => "MULT",
            BinaryOp::Div => "DIV",
            BinaryOp::Shr => "SHR",
            BinaryOp::Gt => "GT",
            BinaryOp::Get => "GET",
            BinaryOp::Lt => "LT",
            BinaryOp::Let => "LET",
            BinaryOp::Eq => "EQ",
        }
    }

    /// Infix symbol used when printing
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mult => "*",
            BinaryOp::Div => "/",
            BinaryOp::Shr => ">>",
            BinaryOp::Gt => ">",
            BinaryOp::Get => ">=",
            BinaryOp::Lt => "<",
            BinaryOp::Let => "<=",
            BinaryOp::Eq => "==",
        }
    }

    /// Check if operator yields a boolean
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Gt | BinaryOp::Get | BinaryOp::Lt | BinaryOp::Let | BinaryOp::Eq
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

// ============================================================================
// Expression
// ============================================================================

/// Expression node
/// Gantree: Expression // Literal | Reference | Operation | Function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Literal, kept as the text found on the wire
    Literal(String),

    /// Reference to a program variable
    Reference(String),

    /// Binary operation
    Operation {
        /// Left operand (always evaluated first)
        left: Box<Expression>,
        /// Right operand
        right: Box<Expression>,
        /// Operator
        op: BinaryOp,
    },

    /// Library function call
    Function {
        /// Call arguments
        arguments: Vec<Expression>,
        /// Function name, e.g. `mul_fixed_by_int`
        function_name: String,
        /// Library the function belongs to
        library_name: String,
    },
}

impl Expression {
    /// Create a literal
    pub fn literal(value: impl Into<String>) -> Self {
        Expression::Literal(value.into())
    }

    /// Create a variable reference
    pub fn reference(name: impl Into<String>) -> Self {
        Expression::Reference(name.into())
    }

    /// Create a binary operation
    pub fn operation(left: Expression, right: Expression, op: BinaryOp) -> Self {
        Expression::Operation {
            left: Box::new(left),
            right: Box::new(right),
            op,
        }
    }

    /// Create a library function call
    pub fn function(
        arguments: Vec<Expression>,
        function_name: impl Into<String>,
        library_name: impl Into<String>,
    ) -> Self {
        Expression::Function {
            arguments,
            function_name: function_name.into(),
            library_name: library_name.into(),
        }
    }

    /// Names of every variable the expression reads
    pub fn references(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_references(&mut names);
        names
    }

    fn collect_references<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expression::Literal(_) => {}
            Expression::Reference(name) => names.push(name),
            Expression::Operation { left, right, .. } => {
                left.collect_references(names);
                right.collect_references(names);
            }
            Expression::Function { arguments, .. } => {
                for arg in arguments {
                    arg.collect_references(names);
                }
            }
        }
    }

    /// Tree depth (a leaf has depth 1)
    pub fn depth(&self) -> usize {
        match self {
            Expression::Literal(_) | Expression::Reference(_) => 1,
            Expression::Operation { left, right, .. } => 1 + left.depth().max(right.depth()),
            Expression::Function { arguments, .. } => {
                1 + arguments.iter().map(Expression::depth).max().unwrap_or(0)
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(value) => write!(f, "{}", value),
            Expression::Reference(name) => write!(f, "{}", name),
            Expression::Operation { left, right, op } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expression::Function {
                arguments,
                function_name,
                library_name,
            } => {
                write!(f, "{}.{}(", library_name, function_name)?;
                for (i, arg) in arguments.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
