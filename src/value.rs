use crate::error::EvalError;

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ WHAT IS A VALUE? ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// A runtime value of the shading language: a scalar or a vector of up to
/// four components.
///
/// The component count is fixed at construction. There is no implicit
/// widening; the only mixed-arity behaviors are the ones individual
/// built-ins and operators define explicitly (scalar broadcast in `*` and
/// `/`, the `vec4(vec3, w)` overload, padded `distance`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Scalar(f64),
    Vec2(f64, f64),
    Vec3(f64, f64, f64),
    Vec4(f64, f64, f64, f64),
}

impl Value {
    /// The number of components, 1 through 4.
    pub fn arity(&self) -> usize {
        match self {
            Value::Scalar(_) => 1,
            Value::Vec2(..) => 2,
            Value::Vec3(..) => 3,
            Value::Vec4(..) => 4,
        }
    }

    /// The source-language name of this value's type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "float",
            Value::Vec2(..) => "vec2",
            Value::Vec3(..) => "vec3",
            Value::Vec4(..) => "vec4",
        }
    }

    /// The `i`-th component, if the value is wide enough.
    pub fn component(&self, i: usize) -> Option<f64> {
        match (self, i) {
            (Value::Scalar(x), 0) => Some(*x),
            (Value::Vec2(x, _), 0) | (Value::Vec3(x, _, _), 0) | (Value::Vec4(x, _, _, _), 0) => {
                Some(*x)
            }
            (Value::Vec2(_, y), 1) | (Value::Vec3(_, y, _), 1) | (Value::Vec4(_, y, _, _), 1) => {
                Some(*y)
            }
            (Value::Vec3(_, _, z), 2) | (Value::Vec4(_, _, z, _), 2) => Some(*z),
            (Value::Vec4(_, _, _, w), 3) => Some(*w),
            _ => None,
        }
    }

    /// All four component slots, with missing components padded to `0`.
    /// This is the duck-typed view `distance` uses to mix 2D and 3D points.
    pub fn padded(&self) -> [f64; 4] {
        match *self {
            Value::Scalar(x) => [x, 0.0, 0.0, 0.0],
            Value::Vec2(x, y) => [x, y, 0.0, 0.0],
            Value::Vec3(x, y, z) => [x, y, z, 0.0],
            Value::Vec4(x, y, z, w) => [x, y, z, w],
        }
    }

    /// Apply `f` to every component, preserving arity.
    pub fn map(self, f: impl Fn(f64) -> f64) -> Value {
        match self {
            Value::Scalar(x) => Value::Scalar(f(x)),
            Value::Vec2(x, y) => Value::Vec2(f(x), f(y)),
            Value::Vec3(x, y, z) => Value::Vec3(f(x), f(y), f(z)),
            Value::Vec4(x, y, z, w) => Value::Vec4(f(x), f(y), f(z), f(w)),
        }
    }

    /// Combine two values of equal arity component-wise, or `None` if the
    /// arities differ.
    pub fn zip(self, rhs: Value, f: impl Fn(f64, f64) -> f64) -> Option<Value> {
        match (self, rhs) {
            (Value::Scalar(a), Value::Scalar(b)) => Some(Value::Scalar(f(a, b))),
            (Value::Vec2(a, b), Value::Vec2(c, d)) => Some(Value::Vec2(f(a, c), f(b, d))),
            (Value::Vec3(a, b, c), Value::Vec3(d, e, g)) => {
                Some(Value::Vec3(f(a, d), f(b, e), f(c, g)))
            }
            (Value::Vec4(a, b, c, d), Value::Vec4(e, g, h, i)) => {
                Some(Value::Vec4(f(a, e), f(b, g), f(c, h), f(d, i)))
            }
            _ => None,
        }
    }
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ BINARY OPERATORS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

impl Value {
    /// Addition requires two values of equal arity.
    pub fn try_add(self, rhs: Value) -> Result<Value, EvalError> {
        self.zip(rhs, |a, b| a + b)
            .ok_or_else(|| mismatch("+", &self, &rhs))
    }

    /// Subtraction requires two values of equal arity.
    pub fn try_sub(self, rhs: Value) -> Result<Value, EvalError> {
        self.zip(rhs, |a, b| a - b)
            .ok_or_else(|| mismatch("-", &self, &rhs))
    }

    /// Component-wise multiplication of values of equal arity, or a scalar
    /// on either side broadcast over the other operand.
    pub fn try_mul(self, rhs: Value) -> Result<Value, EvalError> {
        match (self, rhs) {
            (Value::Scalar(s), v) if v.arity() > 1 => Ok(v.map(|c| s * c)),
            (v, Value::Scalar(s)) if v.arity() > 1 => Ok(v.map(|c| c * s)),
            (lhs, rhs) => lhs
                .zip(rhs, |a, b| a * b)
                .ok_or_else(|| mismatch("*", &lhs, &rhs)),
        }
    }

    /// Component-wise division by a value of equal arity or by a scalar.
    /// Any zero divisor component is a domain fault.
    pub fn try_div(self, rhs: Value) -> Result<Value, EvalError> {
        if rhs.padded()[..rhs.arity()].iter().any(|&c| c == 0.0) {
            return Err(EvalError::Domain("division by zero"));
        }
        match (self, rhs) {
            (v, Value::Scalar(s)) if v.arity() > 1 => Ok(v.map(|c| c / s)),
            (lhs, rhs) => lhs
                .zip(rhs, |a, b| a / b)
                .ok_or_else(|| mismatch("/", &lhs, &rhs)),
        }
    }
}

fn mismatch(op: &'static str, lhs: &Value, rhs: &Value) -> EvalError {
    EvalError::OperandMismatch {
        op,
        lhs: lhs.type_name(),
        rhs: rhs.type_name(),
    }
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ THE OUTPUT COLOR SLOT ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

/// The mutable 4-component result slot of one pixel evaluation.
///
/// The slot is passed by exclusive mutable reference into the program, so an
/// output assignment must mutate it in place (via [`OutColor::replace`])
/// rather than rebind it; the caller then reads the final color out of the
/// same instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutColor {
    r: f64,
    g: f64,
    b: f64,
    a: f64,
}

impl OutColor {
    /// A fresh slot, initialized to opaque black `(0, 0, 0, 1)`.
    pub fn new() -> Self {
        OutColor {
            r: 0.0,
            g: 0.0,
            b: 0.0,
            a: 1.0,
        }
    }

    /// Copy all four components of `source` into this slot, preserving the
    /// slot's identity. The source must be a vec4.
    pub fn replace(&mut self, source: &Value) -> Result<(), EvalError> {
        if let Value::Vec4(r, g, b, a) = *source {
            self.r = r;
            self.g = g;
            self.b = b;
            self.a = a;
            Ok(())
        } else {
            Err(EvalError::invalid_arguments(
                "gl_FragColor",
                format!("expected vec4, found {}", source.type_name()),
            ))
        }
    }

    /// Convert to interleaved RGBA bytes: each channel scaled by 255 and
    /// truncated, with alpha forced to fully opaque.
    pub fn to_rgba8(&self) -> [u8; 4] {
        [channel(self.r), channel(self.g), channel(self.b), 255]
    }
}

impl Default for OutColor {
    fn default() -> Self {
        OutColor::new()
    }
}

/// Scale a unit-range channel to a byte by truncation. The saturating float
/// cast clamps to `0..=255` and maps NaN to 0.
fn channel(c: f64) -> u8 {
    (c * 255.0).floor() as u8
}

// ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~ TESTS ~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_requires_equal_arity() {
        let v = Value::Vec2(1.0, 2.0).try_add(Value::Vec2(3.0, 4.0)).unwrap();
        assert_eq!(v, Value::Vec2(4.0, 6.0));
        assert!(Value::Scalar(1.0).try_add(Value::Vec3(0.0, 0.0, 0.0)).is_err());
    }

    #[test]
    fn mul_broadcasts_scalars() {
        let v = Value::Scalar(2.0)
            .try_mul(Value::Vec3(1.0, 2.0, 3.0))
            .unwrap();
        assert_eq!(v, Value::Vec3(2.0, 4.0, 6.0));
        let v = Value::Vec2(1.0, 2.0).try_mul(Value::Scalar(0.5)).unwrap();
        assert_eq!(v, Value::Vec2(0.5, 1.0));
        assert!(Value::Vec2(1.0, 1.0).try_mul(Value::Vec3(1.0, 1.0, 1.0)).is_err());
    }

    #[test]
    fn div_by_zero_is_a_domain_fault() {
        assert_eq!(
            Value::Scalar(1.0).try_div(Value::Scalar(0.0)),
            Err(EvalError::Domain("division by zero"))
        );
        assert_eq!(
            Value::Vec2(1.0, 1.0).try_div(Value::Vec2(1.0, 0.0)),
            Err(EvalError::Domain("division by zero"))
        );
        let v = Value::Vec3(2.0, 4.0, 6.0).try_div(Value::Scalar(2.0)).unwrap();
        assert_eq!(v, Value::Vec3(1.0, 2.0, 3.0));
    }

    #[test]
    fn projections_respect_arity() {
        assert_eq!(Value::Vec3(1.0, 2.0, 3.0).component(2), Some(3.0));
        assert_eq!(Value::Vec2(1.0, 2.0).component(2), None);
        assert_eq!(Value::Scalar(7.0).component(0), Some(7.0));
    }

    #[test]
    fn fresh_slot_is_opaque_black() {
        assert_eq!(OutColor::new().to_rgba8(), [0, 0, 0, 255]);
    }

    #[test]
    fn replace_requires_a_vec4() {
        let mut out = OutColor::new();
        out.replace(&Value::Vec4(0.0, 0.75, 0.5, 1.0)).unwrap();
        assert_eq!(out.to_rgba8(), [0, 191, 127, 255]);
        assert!(out.replace(&Value::Vec3(1.0, 1.0, 1.0)).is_err());
        // a failed replace leaves the slot untouched
        assert_eq!(out.to_rgba8(), [0, 191, 127, 255]);
    }

    #[test]
    fn byte_conversion_truncates_and_saturates() {
        let mut out = OutColor::new();
        out.replace(&Value::Vec4(-1.0, 2.0, 1.0, 0.0)).unwrap();
        // negative clamps to 0, overshoot clamps to 255, alpha forced opaque
        assert_eq!(out.to_rgba8(), [0, 255, 255, 255]);
        out.replace(&Value::Vec4(f64::NAN, 0.999, 0.5, 1.0)).unwrap();
        assert_eq!(out.to_rgba8(), [0, 254, 127, 255]);
    }
}
