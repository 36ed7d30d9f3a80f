//! A miniature shading-language compiler and CPU rasterizer.
//!
//! The crate compiles a GLSL-like fragment-shader subset into an executable
//! statement sequence and evaluates it once per pixel over a raster
//! surface, optionally driven by an external animation clock. Compile
//! failures fault the driver without tearing it down; evaluation failures
//! are recovered per pixel with a sentinel color.

use crate::lex::split_statements;
use crate::parse::parse_statement;

mod ast;
mod builtins;
mod error;
mod eval;
mod lex;
mod parse;
mod program;
mod render;
mod value;

pub use ast::{Expression, InfixBinaryOperator, Statement, TypeHint, UnaryOperator, Uniform};
pub use builtins::BuiltIn;
pub use error::{CompileError, EvalError};
pub use eval::{run_pixel, Inputs};
pub use program::CompiledProgram;
pub use render::{FrameClock, PixelBuffer, PresentTarget, Renderer, SourceProvider, ERROR_PIXEL};
pub use value::{OutColor, Value};

/// Compiles shader source into a [`CompiledProgram`], returning the program
/// on success and a [`CompileError`] otherwise. No partial program is ever
/// produced.
///
/// This is the main entry point of the library; [`Renderer`] wraps it with
/// the surface-level state machine.
pub fn compile(source: &str) -> Result<CompiledProgram, CompileError> {
    // split the input into statement candidates, discarding comments and
    // structural boilerplate
    let fragments = split_statements(source);
    // classify each fragment, building the executable statement sequence
    let mut statements = Vec::with_capacity(fragments.len());
    for fragment in &fragments {
        statements.push(parse_statement(fragment)?);
    }
    let program = CompiledProgram::new(statements);
    tracing::debug!(statements = program.statements().len(), "compiled program");
    Ok(program)
}
