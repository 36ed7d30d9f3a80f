use std::sync::OnceLock;

use ahash::AHashMap;
use strum::{EnumIter, IntoEnumIterator};

use crate::error::EvalError;
use crate::value::Value;

/// An enum containing all built-in functions of the shading-language subset.
///
/// In order to leverage Rust's type system when implementing new built-in
/// functions, they are represented by an enum that has methods implemented
/// on it, using exhaustive `match` patterns. This way, a new enum variant
/// can be added and the compiler will gently guide the developer to all the
/// places that need implementing.
///
/// All built-ins are pure functions of their arguments. The registry is
/// stateless and shared read-only across all pixel evaluations.
#[derive(EnumIter, PartialEq, Eq, Hash, Debug, Copy, Clone)]
pub enum BuiltIn {
    // constructors
    Vec2,
    Vec3,
    Vec4,
    // component-wise math
    Sin,
    Cos,
    Pow,
    Sqrt,
    Abs,
    Floor,
    Ceil,
    Fract,
    // interpolation and measures
    Mix,
    Step,
    Distance,
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ DEFINE BUILT-IN FUNCTIONS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

impl BuiltIn {
    /// The call name this built-in is resolvable under in shader source.
    pub fn name(&self) -> &'static str {
        match self {
            BuiltIn::Vec2 => "vec2",
            BuiltIn::Vec3 => "vec3",
            BuiltIn::Vec4 => "vec4",
            BuiltIn::Sin => "sin",
            BuiltIn::Cos => "cos",
            BuiltIn::Pow => "pow",
            BuiltIn::Sqrt => "sqrt",
            BuiltIn::Abs => "abs",
            BuiltIn::Floor => "floor",
            BuiltIn::Ceil => "ceil",
            BuiltIn::Fract => "fract",
            BuiltIn::Mix => "mix",
            BuiltIn::Step => "step",
            BuiltIn::Distance => "distance",
        }
    }

    /// Evaluate this built-in for the given arguments.
    pub fn call(&self, args: &[Value]) -> Result<Value, EvalError> {
        match self {
            BuiltIn::Vec2 => match args {
                [Value::Scalar(x), Value::Scalar(y)] => Ok(Value::Vec2(*x, *y)),
                _ => Err(self.bad_args(args, "two scalar components")),
            },
            BuiltIn::Vec3 => match args {
                [Value::Scalar(x), Value::Scalar(y), Value::Scalar(z)] => {
                    Ok(Value::Vec3(*x, *y, *z))
                }
                _ => Err(self.bad_args(args, "three scalar components")),
            },
            BuiltIn::Vec4 => match args {
                [Value::Scalar(x), Value::Scalar(y), Value::Scalar(z), Value::Scalar(w)] => {
                    Ok(Value::Vec4(*x, *y, *z, *w))
                }
                // the overloaded form copies the three components and appends w
                [Value::Vec3(x, y, z), Value::Scalar(w)] => Ok(Value::Vec4(*x, *y, *z, *w)),
                _ => Err(self.bad_args(args, "four scalar components or a vec3 and a scalar")),
            },
            BuiltIn::Sin => self.map_components(args, f64::sin),
            BuiltIn::Cos => self.map_components(args, f64::cos),
            BuiltIn::Abs => self.map_components(args, f64::abs),
            BuiltIn::Floor => self.map_components(args, f64::floor),
            BuiltIn::Ceil => self.map_components(args, f64::ceil),
            // defined as x - floor(x), which stays in [0, 1) for negative
            // inputs unlike f64::fract
            BuiltIn::Fract => self.map_components(args, |c| c - c.floor()),
            BuiltIn::Sqrt => {
                let v = self.unary(args)?;
                if v.padded()[..v.arity()].iter().any(|&c| c < 0.0) {
                    return Err(EvalError::Domain("square root of a negative number"));
                }
                Ok(v.map(f64::sqrt))
            }
            BuiltIn::Pow => match args {
                [base, Value::Scalar(e)] => {
                    let e = *e;
                    Ok(base.map(|c| c.powf(e)))
                }
                [base, exponent] => base
                    .zip(*exponent, f64::powf)
                    .ok_or_else(|| self.bad_args(args, "operands of equal arity")),
                _ => Err(self.bad_args(args, "a base and an exponent")),
            },
            BuiltIn::Mix => match args {
                // linear interpolation a*(1-t) + b*t, component-wise for
                // vectors of equal arity
                [a, b, Value::Scalar(t)] => {
                    let t = *t;
                    a.zip(*b, |x, y| x * (1.0 - t) + y * t)
                        .ok_or_else(|| self.bad_args(args, "endpoints of equal arity"))
                }
                _ => Err(self.bad_args(args, "two endpoints and a scalar weight")),
            },
            BuiltIn::Step => match args {
                // 0 below the edge, 1 at and above it
                [Value::Scalar(edge), x] => {
                    let edge = *edge;
                    Ok(x.map(|c| if c < edge { 0.0 } else { 1.0 }))
                }
                [edge, x] => edge
                    .zip(*x, |e, c| if c < e { 0.0 } else { 1.0 })
                    .ok_or_else(|| self.bad_args(args, "an edge and a value of equal arity")),
                _ => Err(self.bad_args(args, "an edge and a value")),
            },
            BuiltIn::Distance => match args {
                // euclidean norm of p - q; missing components count as 0,
                // so 2D and 3D points may be mixed
                [p, q] => {
                    let (p, q) = (p.padded(), q.padded());
                    let sum: f64 = p.iter().zip(q).map(|(a, b)| (a - b) * (a - b)).sum();
                    Ok(Value::Scalar(sum.sqrt()))
                }
                _ => Err(self.bad_args(args, "two points")),
            },
        }
    }

    fn unary(&self, args: &[Value]) -> Result<Value, EvalError> {
        match args {
            [v] => Ok(*v),
            _ => Err(self.bad_args(args, "exactly one argument")),
        }
    }

    fn map_components(&self, args: &[Value], f: impl Fn(f64) -> f64) -> Result<Value, EvalError> {
        Ok(self.unary(args)?.map(f))
    }

    fn bad_args(&self, args: &[Value], expected: &str) -> EvalError {
        let found: Vec<&str> = args.iter().map(Value::type_name).collect();
        EvalError::invalid_arguments(
            self.name(),
            format!("expected {}, found ({})", expected, found.join(", ")),
        )
    }
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~ RESOLVE BUILT-INS BY NAME ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

static BUILT_INS_BY_NAME: OnceLock<AHashMap<&'static str, BuiltIn>> = OnceLock::new();

impl BuiltIn {
    /// Resolve a call name against the registry.
    ///
    /// This may initialize a OnceLock on the first call, creating a hashmap
    /// from function names to their respective `BuiltIn` enum variant.
    pub fn lookup(name: &str) -> Option<BuiltIn> {
        BUILT_INS_BY_NAME
            .get_or_init(|| AHashMap::from_iter(BuiltIn::iter().map(|f| (f.name(), f))))
            .get(name)
            .copied()
    }
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ TESTS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
