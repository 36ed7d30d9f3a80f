// ~~~~~~~~~~~~~~~~~~~~~~~~~~~ DEFINE THE ABSTRACT SYNTAX TREE ~~~~~~~~~~~~~~~~~~~~~~~~~~

/// AST Node representing an input the rasterizer binds for every pixel
/// evaluation: the normalized screen coordinate or the animation clock.
///
/// This is an atom of an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Uniform {
    /// `uv`, the normalized screen coordinate, range `[0, 1)` per axis with
    /// a bottom-left origin.
    Uv,
    /// `time`, the elapsed clock in seconds. `0` outside animated mode.
    Time,
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ OPERATORS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// AST Node representing a binary operator in infix notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixBinaryOperator {
    /// Addition between values of equal arity
    Add,
    /// Subtraction between values of equal arity
    Subtract,
    /// Component-wise multiplication between vectors, between scalars
    /// or the product of a vector and scalar, depending on the operands.
    Multiply,
    Divide,
}

/// AST Node representing a unary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    // prefix operators
    Negate,

    // postfix component projections
    ProjectX,
    ProjectY,
    ProjectZ,
    ProjectW,
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ EXPRESSIONS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// AST Node representing an expression that can be evaluated to yield a
/// [`Value`].
///
/// The atoms of an expression are literal numbers, identifiers, uniforms
/// and function calls. Other expressions are built from these recursively
/// by applying operators; precedence is defined in the Pratt parser.
///
/// Call names are left unresolved here and looked up in the built-in
/// registry at evaluation time, so an unknown function is a per-pixel
/// computation fault rather than a compile fault.
///
/// [`Value`]: crate::Value
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Number(f64),
    Identifier(String),
    Uniform(Uniform),
    Call {
        name: String,
        args: Vec<Expression>,
    },
    UnaryOp {
        op: UnaryOperator,
        val: Box<Expression>,
    },
    BinaryOp {
        lhs: Box<Expression>,
        op: InfixBinaryOperator,
        rhs: Box<Expression>,
    },
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ STATEMENTS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// The declared type in front of a declaration, e.g. `vec3` in
/// `vec3 color = ...`.
///
/// Hints are informational only: the bound value's type is whatever the
/// right-hand side evaluates to, and no static checking is performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeHint {
    Float,
    Int,
    Vec2,
    Vec3,
    Vec4,
}

/// AST Node representing one executable statement of a compiled program.
///
/// Each variant records the 1-based source line it came from so that
/// diagnostics can point back into the editor's text.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// Binds a local name to an evaluated expression. A missing hint is a
    /// plain `name = expr` rebinding.
    Declaration {
        name: String,
        hint: Option<TypeHint>,
        expr: Expression,
        line: usize,
    },
    /// Evaluates the expression and copies it into the shared output-color
    /// slot in place.
    OutputAssignment { expr: Expression, line: usize },
    /// Evaluates the expression and discards the result.
    Expression { expr: Expression, line: usize },
}

impl Statement {
    /// The 1-based source line this statement was parsed from.
    pub fn line(&self) -> usize {
        match self {
            Statement::Declaration { line, .. }
            | Statement::OutputAssignment { line, .. }
            | Statement::Expression { line, .. } => *line,
        }
    }
}
