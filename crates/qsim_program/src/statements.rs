//! Statement dispatch
//!
//! Gantree: L2_Program → StatementsVisitor
//!
//! Registry from wire tag to [`StatementVisitor`]. Visiting a statement
//! block dispatches every entry and concatenates the resulting nodes, so one
//! wire statement may expand to zero, one, or several AST nodes.

use crate::visitors::{
    AlignVisitor, AssignVisitor, ForVisitor, FrameRotationVisitor, IfVisitor, MeasureVisitor,
    PlayVisitor, ResetFrameVisitor, ResetPhaseVisitor, SaveVisitor, StatementVisitor, WaitVisitor,
};
use crate::wire::{field, statement_list, tagged};
use qsim_core::{QsimError, QsimResult, Statement};
use serde_json::Value;
use std::collections::BTreeMap;

/// Tag → visitor registry
/// Gantree: StatementsVisitor // registry + dispatch
pub struct StatementsVisitor {
    visitors: BTreeMap<&'static str, Box<dyn StatementVisitor>>,
}

impl StatementsVisitor {
    /// Registry with every supported statement visitor
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(AlignVisitor));
        registry.register(Box::new(AssignVisitor));
        registry.register(Box::new(ForVisitor));
        registry.register(Box::new(IfVisitor));
        registry.register(Box::new(MeasureVisitor));
        registry.register(Box::new(PlayVisitor));
        registry.register(Box::new(ResetPhaseVisitor));
        registry.register(Box::new(ResetFrameVisitor));
        registry.register(Box::new(SaveVisitor));
        registry.register(Box::new(WaitVisitor));
        registry.register(Box::new(FrameRotationVisitor));
        registry
    }

    /// Registry with no visitors
    pub fn empty() -> Self {
        Self {
            visitors: BTreeMap::new(),
        }
    }

    /// Register a visitor, replacing any visitor for the same tag
    pub fn register(&mut self, visitor: Box<dyn StatementVisitor>) {
        self.visitors.insert(visitor.tag(), visitor);
    }

    /// Registered tags in order
    pub fn tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.visitors.keys().copied()
    }

    /// Check if a tag has a visitor
    pub fn supports(&self, tag: &str) -> bool {
        self.visitors.contains_key(tag)
    }

    /// Compile a `{statements: [...]}` block
    pub fn visit(&self, block: &Value) -> QsimResult<Vec<Statement>> {
        let mut nodes = Vec::new();
        for entry in statement_list(block, "statements")? {
            nodes.extend(self.visit_statement(entry)?);
        }
        Ok(nodes)
    }

    /// Compile a single `{tag: body}` statement
    pub fn visit_statement(&self, entry: &Value) -> QsimResult<Vec<Statement>> {
        let (tag, body) = tagged(entry, "statement")?;
        let visitor = self
            .visitors
            .get(tag)
            .ok_or_else(|| QsimError::UnsupportedStatement(tag.to_string()))?;

        let nodes = visitor.visit(body, self)?;
        log::trace!("{} -> {} node(s)", tag, nodes.len());
        Ok(nodes)
    }
}

impl Default for StatementsVisitor {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Program Visitor
// ============================================================================

/// Entry point accepting either a statement block or a full program
/// (`{script: {body: {statements: [...]}}}`)
/// Gantree: ProgramVisitor // visit(program) -> Vec<Statement>
pub struct ProgramVisitor {
    statements: StatementsVisitor,
}

impl ProgramVisitor {
    /// Create with the default registry
    pub fn new() -> Self {
        Self {
            statements: StatementsVisitor::new(),
        }
    }

    /// Create with a custom registry
    pub fn with_registry(statements: StatementsVisitor) -> Self {
        Self { statements }
    }

    /// Compile a program dictionary into statement nodes
    pub fn visit(&self, program: &Value) -> QsimResult<Vec<Statement>> {
        let block = Self::statement_block(program)?;
        let nodes = self.statements.visit(block)?;
        log::debug!(
            "Compiled program dictionary into {} top-level statement(s)",
            nodes.len()
        );
        Ok(nodes)
    }

    /// Parse program text (JSON) and compile it
    pub fn visit_str(&self, text: &str) -> QsimResult<Vec<Statement>> {
        let program: Value = serde_json::from_str(text)?;
        self.visit(&program)
    }

    fn statement_block(program: &Value) -> QsimResult<&Value> {
        match program.get("script") {
            Some(script) => field(script, "body", "script"),
            None => Ok(program),
        }
    }
}

impl Default for ProgramVisitor {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
