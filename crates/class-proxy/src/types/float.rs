//! `float`.

use std::sync::Arc;

use crate::{
    args::{expect_args, optional_arg},
    class::{Class, ClassBuilder},
    exception::{ExcType, RunResult},
    hook::CompareOp,
    py_hash::hash_float,
    value::{Value, float_repr, str_repr},
};

type FloatOp = fn(f64, f64) -> RunResult<Value>;

pub(super) fn float_class(object: &Arc<Class>) -> Arc<Class> {
    let mut builder = ClassBuilder::new("float").base(object);
    for (name, reflected, op) in [
        ("add", "radd", add as FloatOp),
        ("sub", "rsub", sub as FloatOp),
        ("mul", "rmul", mul as FloatOp),
        ("truediv", "rtruediv", truediv as FloatOp),
        ("floordiv", "rfloordiv", floordiv as FloatOp),
        ("mod", "rmod", modulo as FloatOp),
    ] {
        builder = builder
            .method(format!("__{name}__"), binary(op, false))
            .method(format!("__{reflected}__"), binary(op, true));
    }
    for op in [
        CompareOp::Eq,
        CompareOp::Ne,
        CompareOp::Lt,
        CompareOp::Le,
        CompareOp::Gt,
        CompareOp::Ge,
    ] {
        builder = builder.method(op.hook().name(), move |this, args| {
            let [other] = expect_args(op.hook().name(), args)?;
            Ok(match (this.as_float(), other.as_float()) {
                (Some(a), Some(b)) => Value::Bool(match a.partial_cmp(&b) {
                    Some(ordering) => op.matches(ordering),
                    // NaN compares unequal to everything
                    None => op == CompareOp::Ne,
                }),
                _ => Value::NotImplemented,
            })
        });
    }
    builder
        .method("__neg__", |this, _| float_of(this).map(|f| Value::Float(-f)))
        .method("__pos__", |this, _| float_of(this).map(Value::Float))
        .method("__abs__", |this, _| float_of(this).map(|f| Value::Float(f.abs())))
        .method("__bool__", |this, _| Ok(Value::Bool(float_of(this)? != 0.0)))
        .method("__hash__", |this, _| Ok(Value::Int(hash_float(float_of(this)?))))
        .method("__repr__", |this, _| Ok(Value::str(float_repr(float_of(this)?))))
        .method("is_integer", |this, _| {
            let value = float_of(this)?;
            Ok(Value::Bool(value.is_finite() && value.fract() == 0.0))
        })
        .constructor(|args| match optional_arg("float", args)? {
            None => Ok(Value::Float(0.0)),
            Some(value) => to_float(value).map(Value::Float),
        })
        .build()
}

fn float_of(value: &Value) -> RunResult<f64> {
    match value {
        Value::Float(f) => Ok(*f),
        _ => Err(ExcType::type_error(format!(
            "descriptor requires a 'float' object but received a '{}'",
            value.type_name()
        ))),
    }
}

fn binary(op: FloatOp, reflected: bool) -> impl Fn(&Value, &[Value]) -> RunResult<Value> + Send + Sync + 'static {
    move |this, args| {
        let [other] = expect_args("float operator", args)?;
        match (this.as_float(), other.as_float()) {
            (Some(a), Some(b)) if reflected => op(b, a),
            (Some(a), Some(b)) => op(a, b),
            _ => Ok(Value::NotImplemented),
        }
    }
}

fn add(a: f64, b: f64) -> RunResult<Value> {
    Ok(Value::Float(a + b))
}

fn sub(a: f64, b: f64) -> RunResult<Value> {
    Ok(Value::Float(a - b))
}

fn mul(a: f64, b: f64) -> RunResult<Value> {
    Ok(Value::Float(a * b))
}

fn truediv(a: f64, b: f64) -> RunResult<Value> {
    if b == 0.0 {
        return Err(ExcType::zero_division("float division by zero"));
    }
    Ok(Value::Float(a / b))
}

fn floordiv(a: f64, b: f64) -> RunResult<Value> {
    if b == 0.0 {
        return Err(ExcType::zero_division("float floor division by zero"));
    }
    Ok(Value::Float((a / b).floor()))
}

/// Float modulo; a non-zero result takes the sign of the divisor.
fn modulo(a: f64, b: f64) -> RunResult<Value> {
    if b == 0.0 {
        return Err(ExcType::zero_division("float modulo"));
    }
    let remainder = a % b;
    if remainder != 0.0 && (remainder < 0.0) != (b < 0.0) {
        Ok(Value::Float(remainder + b))
    } else {
        Ok(Value::Float(remainder))
    }
}

/// `float(value)` conversion.
fn to_float(value: &Value) -> RunResult<f64> {
    if let Some(f) = value.as_float() {
        return Ok(f);
    }
    match value {
        Value::Str(s) => {
            let trimmed = s.trim();
            match trimmed.to_ascii_lowercase().as_str() {
                "nan" | "+nan" | "-nan" => Ok(f64::NAN),
                "inf" | "+inf" | "infinity" | "+infinity" => Ok(f64::INFINITY),
                "-inf" | "-infinity" => Ok(f64::NEG_INFINITY),
                _ => trimmed.parse().map_err(|_| {
                    ExcType::value_error(format!("could not convert string to float: {}", str_repr(s)))
                }),
            }
        }
        other => Err(ExcType::type_error(format!(
            "float() argument must be a string or a real number, not '{}'",
            other.type_name()
        ))),
    }
}
