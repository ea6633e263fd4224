//! `int` and its subclass `bool`.
//!
//! Binary hooks return `NotImplemented` for non-integer operands so the reflected
//! hook of the other operand (e.g. `float.__radd__`) gets a chance.

use std::sync::Arc;

use crate::{
    args::{expect_args, optional_arg},
    class::{Class, ClassBuilder},
    exception::{ExcType, RunResult},
    hook::CompareOp,
    protocol,
    py_hash::hash_int,
    value::Value,
};

type IntOp = fn(i64, i64) -> RunResult<Value>;

pub(super) fn int_class(object: &Arc<Class>) -> Arc<Class> {
    let mut builder = ClassBuilder::new("int").base(object);
    for (name, reflected, op) in [
        ("add", "radd", add as IntOp),
        ("sub", "rsub", sub as IntOp),
        ("mul", "rmul", mul as IntOp),
        ("truediv", "rtruediv", truediv as IntOp),
        ("floordiv", "rfloordiv", floordiv as IntOp),
        ("mod", "rmod", modulo as IntOp),
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
            Ok(match (this.as_int(), other.as_int()) {
                (Some(a), Some(b)) => Value::Bool(op.matches(a.cmp(&b))),
                _ => Value::NotImplemented,
            })
        });
    }
    builder
        .method("__neg__", |this, _| {
            let value = int_of(this)?;
            value.checked_neg().map(Value::Int).ok_or_else(|| ExcType::overflow_error("negation"))
        })
        .method("__pos__", |this, _| int_of(this).map(Value::Int))
        .method("__abs__", |this, _| {
            let value = int_of(this)?;
            value.checked_abs().map(Value::Int).ok_or_else(|| ExcType::overflow_error("abs()"))
        })
        .method("__bool__", |this, _| Ok(Value::Bool(int_of(this)? != 0)))
        .method("__hash__", |this, _| Ok(Value::Int(hash_int(int_of(this)?))))
        .method("__repr__", |this, _| Ok(Value::str(int_of(this)?.to_string())))
        .method("bit_length", |this, _| {
            Ok(Value::Int(i64::from(64 - int_of(this)?.unsigned_abs().leading_zeros())))
        })
        .property("real", |this| int_of(this).map(Value::Int))
        .constructor(|args| match optional_arg("int", args)? {
            None => Ok(Value::Int(0)),
            Some(value) => to_int(value).map(Value::Int),
        })
        .build()
}

pub(super) fn bool_class(int: &Arc<Class>) -> Arc<Class> {
    ClassBuilder::new("bool")
        .base(int)
        .method("__repr__", |this, _| {
            Ok(Value::str(if int_of(this)? != 0 { "True" } else { "False" }))
        })
        .constructor(|args| match optional_arg("bool", args)? {
            None => Ok(Value::Bool(false)),
            Some(value) => protocol::truthy(value).map(Value::Bool),
        })
        .build()
}

fn int_of(value: &Value) -> RunResult<i64> {
    value
        .as_int()
        .ok_or_else(|| ExcType::type_error(format!("descriptor requires an 'int' object but received a '{}'", value.type_name())))
}

fn binary(op: IntOp, reflected: bool) -> impl Fn(&Value, &[Value]) -> RunResult<Value> + Send + Sync + 'static {
    move |this, args| {
        let [other] = expect_args("int operator", args)?;
        match (this.as_int(), other.as_int()) {
            (Some(a), Some(b)) if reflected => op(b, a),
            (Some(a), Some(b)) => op(a, b),
            _ => Ok(Value::NotImplemented),
        }
    }
}

fn add(a: i64, b: i64) -> RunResult<Value> {
    a.checked_add(b).map(Value::Int).ok_or_else(|| ExcType::overflow_error("+"))
}

fn sub(a: i64, b: i64) -> RunResult<Value> {
    a.checked_sub(b).map(Value::Int).ok_or_else(|| ExcType::overflow_error("-"))
}

fn mul(a: i64, b: i64) -> RunResult<Value> {
    a.checked_mul(b).map(Value::Int).ok_or_else(|| ExcType::overflow_error("*"))
}

fn truediv(a: i64, b: i64) -> RunResult<Value> {
    if b == 0 {
        return Err(ExcType::zero_division("division by zero"));
    }
    Ok(Value::Float(a as f64 / b as f64))
}

/// Floor division rounding toward negative infinity.
fn floordiv(a: i64, b: i64) -> RunResult<Value> {
    if b == 0 {
        return Err(ExcType::zero_division("integer division or modulo by zero"));
    }
    let quotient = a.checked_div(b).ok_or_else(|| ExcType::overflow_error("//"))?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        Ok(Value::Int(quotient - 1))
    } else {
        Ok(Value::Int(quotient))
    }
}

/// Modulo whose result takes the sign of the divisor.
fn modulo(a: i64, b: i64) -> RunResult<Value> {
    if b == 0 {
        return Err(ExcType::zero_division("integer modulo by zero"));
    }
    // only `MIN % -1` overflows, and its remainder is zero
    let remainder = a.checked_rem(b).unwrap_or(0);
    if remainder != 0 && ((remainder < 0) != (b < 0)) {
        Ok(Value::Int(remainder + b))
    } else {
        Ok(Value::Int(remainder))
    }
}

/// `int(value)` conversion.
fn to_int(value: &Value) -> RunResult<i64> {
    match value {
        Value::Int(_) | Value::Bool(_) => int_of(value),
        Value::Float(f) => {
            if f.is_nan() {
                Err(ExcType::value_error("cannot convert float NaN to integer"))
            } else if f.is_infinite() || *f >= i64::MAX as f64 || *f < i64::MIN as f64 {
                Err(ExcType::overflow_error("int()"))
            } else {
                Ok(f.trunc() as i64)
            }
        }
        Value::Str(s) => s
            .trim()
            .replace('_', "")
            .parse()
            .map_err(|_| ExcType::value_error(format!("invalid literal for int() with base 10: {}", crate::value::str_repr(s)))),
        other => Err(ExcType::type_error(format!(
            "int() argument must be a string or a real number, not '{}'",
            other.type_name()
        ))),
    }
}
