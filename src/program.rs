use crate::ast::Statement;

/// The executable artifact produced by a successful compile: the ordered
/// statement sequence of the shader's entry point.
///
/// A program is immutable after construction and shared read-only across
/// all pixel evaluations of a pass. Its entry inputs, bound fresh for every
/// pixel, are the normalized screen coordinate (`uv`), the elapsed clock
/// (`time`), the mutable output-color slot and the built-in registry.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledProgram {
    statements: Vec<Statement>,
}

impl CompiledProgram {
    /// Assemble a program from classified statements in source order.
    /// Construction never fails on its own; any compile failure originates
    /// in statement parsing.
    pub fn new(statements: Vec<Statement>) -> Self {
        CompiledProgram { statements }
    }

    /// The statements in source order.
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }
}
