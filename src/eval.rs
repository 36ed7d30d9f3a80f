use ahash::AHashMap;

use crate::ast::{Expression, InfixBinaryOperator, Statement, UnaryOperator, Uniform};
use crate::builtins::BuiltIn;
use crate::error::EvalError;
use crate::program::CompiledProgram;
use crate::value::{OutColor, Value};

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ PER-PIXEL EXECUTION ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// The inputs bound for one pixel evaluation: the normalized screen
/// coordinate and the elapsed animation clock in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Inputs {
    pub uv: (f64, f64),
    pub time: f64,
}

/// Execute the program's statement sequence for one pixel.
///
/// Declarations bind into a scope local to this evaluation; output
/// assignments copy into `out` in place, so the caller observes the final
/// color through the reference it passed. Any error aborts this pixel only.
pub fn run_pixel(
    program: &CompiledProgram,
    inputs: &Inputs,
    out: &mut OutColor,
) -> Result<(), EvalError> {
    let mut scope: AHashMap<String, Value> = AHashMap::new();
    for statement in program.statements() {
        match statement {
            Statement::Declaration { name, expr, .. } => {
                // the type hint, if any, is informational and not enforced
                let value = eval_expr(expr, inputs, &scope)?;
                scope.insert(name.clone(), value);
            }
            Statement::OutputAssignment { expr, .. } => {
                let value = eval_expr(expr, inputs, &scope)?;
                out.replace(&value)?;
            }
            Statement::Expression { expr, .. } => {
                eval_expr(expr, inputs, &scope)?;
            }
        }
    }
    Ok(())
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ EVALUATE EXPRESSIONS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// Evaluate an expression AST node recursively to a [`Value`].
fn eval_expr(
    expr: &Expression,
    inputs: &Inputs,
    scope: &AHashMap<String, Value>,
) -> Result<Value, EvalError> {
    match expr {
        Expression::Number(n) => Ok(Value::Scalar(*n)),
        Expression::Uniform(Uniform::Uv) => Ok(Value::Vec2(inputs.uv.0, inputs.uv.1)),
        Expression::Uniform(Uniform::Time) => Ok(Value::Scalar(inputs.time)),
        Expression::Identifier(name) => scope
            .get(name)
            .copied()
            .ok_or_else(|| EvalError::UndefinedIdentifier(name.clone())),
        Expression::Call { name, args } => {
            // call names resolve here, not at compile time: an unknown
            // function is a per-pixel fault
            let built_in =
                BuiltIn::lookup(name).ok_or_else(|| EvalError::UnknownFunction(name.clone()))?;
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval_expr(arg, inputs, scope)?);
            }
            built_in.call(&values)
        }
        Expression::UnaryOp { op, val } => {
            let value = eval_expr(val, inputs, scope)?;
            match op {
                UnaryOperator::Negate => Ok(value.map(|c| -c)),
                UnaryOperator::ProjectX => project(value, 0, 'x'),
                UnaryOperator::ProjectY => project(value, 1, 'y'),
                UnaryOperator::ProjectZ => project(value, 2, 'z'),
                UnaryOperator::ProjectW => project(value, 3, 'w'),
            }
        }
        Expression::BinaryOp { lhs, op, rhs } => {
            let lhs = eval_expr(lhs, inputs, scope)?;
            let rhs = eval_expr(rhs, inputs, scope)?;
            match op {
                InfixBinaryOperator::Add => lhs.try_add(rhs),
                InfixBinaryOperator::Subtract => lhs.try_sub(rhs),
                InfixBinaryOperator::Multiply => lhs.try_mul(rhs),
                InfixBinaryOperator::Divide => lhs.try_div(rhs),
            }
        }
    }
}

fn project(value: Value, index: usize, component: char) -> Result<Value, EvalError> {
    value
        .component(index)
        .map(Value::Scalar)
        .ok_or(EvalError::MissingComponent {
            component,
            value: value.type_name(),
        })
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ TESTS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;

    fn run(source: &str, uv: (f64, f64), time: f64) -> Result<OutColor, EvalError> {
        let program = compile(source).expect("source should compile");
        let mut out = OutColor::new();
        run_pixel(&program, &Inputs { uv, time }, &mut out)?;
        Ok(out)
    }

    #[test]
    fn declarations_bind_the_evaluated_expression() {
        // the `int` hint does not constrain the bound value
        let out = run(
            "int x = 0.5;\ngl_FragColor = vec4(x, x, x, 1.0);",
            (0.0, 0.0),
            0.0,
        )
        .unwrap();
        assert_eq!(out.to_rgba8(), [127, 127, 127, 255]);
    }

    #[test]
    fn later_statements_see_earlier_bindings() {
        let out = run(
            "float half = 0.5;\nfloat quarter = half * 0.5;\ngl_FragColor = vec4(quarter, half, quarter, 1.0);",
            (0.0, 0.0),
            0.0,
        )
        .unwrap();
        assert_eq!(out.to_rgba8(), [63, 127, 63, 255]);
    }

    #[test]
    fn hintless_rebinding_updates_the_scope() {
        let out = run(
            "float x = 0.25;\nx = 1.0;\ngl_FragColor = vec4(x, 0.0, 0.0, 1.0);",
            (0.0, 0.0),
            0.0,
        )
        .unwrap();
        assert_eq!(out.to_rgba8(), [255, 0, 0, 255]);
    }

    #[test]
    fn output_assignment_is_idempotent() {
        let once = run(
            "gl_FragColor = vec4(0.25, 0.5, 0.75, 1.0);",
            (0.0, 0.0),
            0.0,
        )
        .unwrap();
        let twice = run(
            "gl_FragColor = vec4(0.25, 0.5, 0.75, 1.0);\ngl_FragColor = vec4(0.25, 0.5, 0.75, 1.0);",
            (0.0, 0.0),
            0.0,
        )
        .unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn uniforms_are_bound_per_pixel() {
        let out = run(
            "vec3 color = vec3(uv.x, uv.y, 0.5);\ngl_FragColor = vec4(color, 1.0);",
            (0.0, 0.75),
            0.0,
        )
        .unwrap();
        assert_eq!(out.to_rgba8(), [0, 191, 127, 255]);
    }

    #[test]
    fn clock_is_bound_to_time() {
        let out = run(
            "gl_FragColor = vec4(cos(time), cos(time), cos(time), 1.0);",
            (0.0, 0.0),
            0.0,
        )
        .unwrap();
        assert_eq!(out.to_rgba8(), [255, 255, 255, 255]);
        let out = run(
            "gl_FragColor = vec4(cos(time), cos(time), cos(time), 1.0);",
            (0.0, 0.0),
            std::f64::consts::PI,
        )
        .unwrap();
        // cos(pi) = -1 saturates to 0 at the byte conversion
        assert_eq!(out.to_rgba8(), [0, 0, 0, 255]);
    }

    #[test]
    fn undefined_identifiers_fault() {
        let err = run("gl_FragColor = vec4(missing, 0.0, 0.0, 1.0);", (0.0, 0.0), 0.0).unwrap_err();
        assert_eq!(err, EvalError::UndefinedIdentifier("missing".to_owned()));
    }

    #[test]
    fn unknown_functions_compile_but_fault_at_evaluation() {
        let program = compile("gl_FragColor = texture2D(uv);").expect("should compile");
        let mut out = OutColor::new();
        let err = run_pixel(
            &program,
            &Inputs {
                uv: (0.0, 0.0),
                time: 0.0,
            },
            &mut out,
        )
        .unwrap_err();
        assert_eq!(err, EvalError::UnknownFunction("texture2D".to_owned()));
    }

    #[test]
    fn expression_statements_are_discarded() {
        let out = run("sin(time);", (0.0, 0.0), 0.0).unwrap();
        // nothing assigned: the slot keeps its fresh (0, 0, 0, 1)
        assert_eq!(out.to_rgba8(), [0, 0, 0, 255]);
    }
}
