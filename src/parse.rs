use std::sync::OnceLock;

use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::PrattParser;
use pest::Parser;

use crate::ast::{Expression, InfixBinaryOperator, Statement, TypeHint, UnaryOperator, Uniform};
use crate::error::CompileError;
use crate::lex::Fragment;

// ~~~~~~~~~~~~~~~~~~~~~~~~ DEFINE A PRATT PARSER WITH PRECEDENCES ~~~~~~~~~~~~~~~~~~~~~~

#[derive(pest_derive::Parser)]
#[grammar = "fraglet.pest"]
pub struct FragletParser;
static PRATT_PARSER: OnceLock<PrattParser<Rule>> = OnceLock::new();

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ PARSE EXPRESSIONS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// Parse an expression token, yielding an AST node representing the
/// expression.
pub fn parse_expr(pairs: Pairs<Rule>) -> Result<Expression, CompileError> {
    PRATT_PARSER
        .get_or_init(|| {
            use pest::pratt_parser::{Assoc::*, Op};
            use Rule::*;
            // Add operators to the pratt parser in increasing order of precedence
            PrattParser::new()
                .op(Op::infix(add, Left) | Op::infix(sub, Left))
                .op(Op::infix(mul, Left) | Op::infix(div, Left))
                .op(Op::prefix(neg))
                .op(Op::postfix(x) | Op::postfix(y) | Op::postfix(z) | Op::postfix(w))
        })
        // primaries
        .map_primary(|primary: Pair<'_, Rule>| match primary.as_rule() {
            Rule::num => primary
                .as_str()
                .parse::<f64>()
                .map(Expression::Number)
                .map_err(|_| CompileError::throw_internal("number literal")),
            Rule::uniform => match primary.as_str() {
                "uv" => Ok(Expression::Uniform(Uniform::Uv)),
                "time" => Ok(Expression::Uniform(Uniform::Time)),
                _ => Err(CompileError::throw_internal("uniform")),
            },
            Rule::ident => Ok(Expression::Identifier(primary.as_str().to_owned())),
            Rule::call => parse_call(primary),
            Rule::expr => parse_expr(primary.into_inner()),
            _ => Err(CompileError::throw_internal("expression atom")),
        })
        // prefix operators
        .map_prefix(|op, rhs| match op.as_rule() {
            Rule::neg => Ok(Expression::UnaryOp {
                op: UnaryOperator::Negate,
                val: Box::new(rhs?),
            }),
            _ => Err(CompileError::throw_internal("unary prefix operator")),
        })
        // postfix component projections
        .map_postfix(|lhs, op| {
            let operator = match op.as_rule() {
                Rule::x => UnaryOperator::ProjectX,
                Rule::y => UnaryOperator::ProjectY,
                Rule::z => UnaryOperator::ProjectZ,
                Rule::w => UnaryOperator::ProjectW,
                _ => return Err(CompileError::throw_internal("unary postfix operator")),
            };
            Ok(Expression::UnaryOp {
                op: operator,
                val: Box::new(lhs?),
            })
        })
        // infix operators
        .map_infix(|lhs, op, rhs| {
            let operator = match op.as_rule() {
                Rule::add => InfixBinaryOperator::Add,
                Rule::sub => InfixBinaryOperator::Subtract,
                Rule::mul => InfixBinaryOperator::Multiply,
                Rule::div => InfixBinaryOperator::Divide,
                _ => return Err(CompileError::throw_internal("binary infix operator")),
            };
            Ok(Expression::BinaryOp {
                lhs: Box::new(lhs?),
                op: operator,
                rhs: Box::new(rhs?),
            })
        })
        .parse(pairs)
}

/// Parse a call token into a call expression. The call name is kept as
/// text and resolved against the built-in registry at evaluation time.
fn parse_call(pair: Pair<'_, Rule>) -> Result<Expression, CompileError> {
    // the first component of a call token must be the function identifier
    let mut pairs = pair.into_inner();
    let name = pairs
        .next()
        .ok_or_else(|| CompileError::throw_internal("function call identifier"))?
        .as_str()
        .to_owned();
    // all other components of the call token are argument expressions
    let mut args = vec![];
    for component in pairs {
        match component.as_rule() {
            Rule::expr => args.push(parse_expr(component.into_inner())?),
            _ => return Err(CompileError::throw_internal("function call argument")),
        }
    }
    Ok(Expression::Call { name, args })
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ PARSE STATEMENTS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// Parse one statement fragment and classify it as an output assignment,
/// a declaration or a bare expression statement.
pub fn parse_statement(fragment: &Fragment) -> Result<Statement, CompileError> {
    let mut pairs = match FragletParser::parse(Rule::statement, &fragment.text) {
        Ok(pairs) => pairs,
        Err(e) => {
            return Err(CompileError::throw_parse(
                fragment.line,
                e.variant.message().into_owned(),
            ))
        }
    };
    let statement = pairs
        .next()
        .ok_or_else(|| CompileError::throw_internal("statement"))?;
    let form = statement
        .into_inner()
        .next()
        .ok_or_else(|| CompileError::throw_internal("statement form"))?;

    match form.as_rule() {
        Rule::output => {
            let mut inner = form.into_inner();
            // skip the reserved output identifier
            inner.next();
            let expr = parse_expr(
                inner
                    .next()
                    .ok_or_else(|| CompileError::throw_internal("output expression"))?
                    .into_inner(),
            )?;
            Ok(Statement::OutputAssignment {
                expr,
                line: fragment.line,
            })
        }
        Rule::declaration => {
            let mut inner = form.into_inner();
            let mut next = inner
                .next()
                .ok_or_else(|| CompileError::throw_internal("declaration name"))?;
            let hint = if next.as_rule() == Rule::type_hint {
                let hint = parse_type_hint(next.as_str())?;
                next = inner
                    .next()
                    .ok_or_else(|| CompileError::throw_internal("declaration name"))?;
                Some(hint)
            } else {
                None
            };
            let name = next.as_str().to_owned();
            let expr = parse_expr(
                inner
                    .next()
                    .ok_or_else(|| CompileError::throw_internal("declaration expression"))?
                    .into_inner(),
            )?;
            Ok(Statement::Declaration {
                name,
                hint,
                expr,
                line: fragment.line,
            })
        }
        Rule::expr_stmt => {
            let expr = parse_expr(
                form.into_inner()
                    .next()
                    .ok_or_else(|| CompileError::throw_internal("expression"))?
                    .into_inner(),
            )?;
            Ok(Statement::Expression {
                expr,
                line: fragment.line,
            })
        }
        _ => Err(CompileError::throw_internal("statement form")),
    }
}

fn parse_type_hint(text: &str) -> Result<TypeHint, CompileError> {
    match text {
        "float" => Ok(TypeHint::Float),
        "int" => Ok(TypeHint::Int),
        "vec2" => Ok(TypeHint::Vec2),
        "vec3" => Ok(TypeHint::Vec3),
        "vec4" => Ok(TypeHint::Vec4),
        _ => Err(CompileError::throw_internal("type hint")),
    }
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ TESTS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
