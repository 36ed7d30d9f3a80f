// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ DEFINE CUSTOM ERROR ENUMS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// A failure to turn source text into a usable [`CompiledProgram`].
///
/// No partial program is ever produced: the first statement that fails to
/// parse or classify aborts the whole compile.
///
/// [`CompiledProgram`]: crate::CompiledProgram
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// A statement fragment was rejected by the grammar.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A token matched the grammar but had an unexpected shape. This
    /// indicates a bug in the grammar rather than bad input.
    #[error("internal parse error: {0}")]
    Internal(String),
}

impl CompileError {
    /// Returns a [`CompileError::Parse`], tagging the message with the
    /// 1-based source line of the offending statement fragment.
    pub fn throw_parse(line: usize, message: impl Into<String>) -> Self {
        CompileError::Parse {
            line,
            message: message.into(),
        }
    }

    /// Returns a [`CompileError::Internal`], naming the construct that was
    /// expected at the current token.
    pub fn throw_internal(expected: &str) -> Self {
        CompileError::Internal(format!("expected {}", expected))
    }
}

/// A runtime evaluation failure for one specific pixel.
///
/// These never escape past the pixel boundary: the rasterizer catches them
/// per pixel and paints the sentinel error color instead.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    /// An identifier was read before any declaration bound it.
    #[error("undefined identifier '{0}'")]
    UndefinedIdentifier(String),

    /// A call named a function that is not a built-in.
    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    /// A built-in was called with the wrong number or kinds of arguments.
    #[error("invalid arguments to '{name}': {message}")]
    InvalidArguments { name: &'static str, message: String },

    /// A binary operator was applied to operands of incompatible arity.
    #[error("cannot apply '{op}' to {lhs} and {rhs}")]
    OperandMismatch {
        op: &'static str,
        lhs: &'static str,
        rhs: &'static str,
    },

    /// A component projection was applied to a value that is too narrow,
    /// e.g. `.z` on a vec2.
    #[error("no component '{component}' on {value}")]
    MissingComponent { component: char, value: &'static str },

    /// A numeric domain fault such as division by zero.
    #[error("domain fault: {0}")]
    Domain(&'static str),
}

impl EvalError {
    /// Build an [`EvalError::InvalidArguments`] value.
    pub fn invalid_arguments(name: &'static str, message: impl Into<String>) -> Self {
        EvalError::InvalidArguments {
            name,
            message: message.into(),
        }
    }
}
