//! `str`.
//!
//! Lengths and indexes count Unicode scalar values, not bytes.

use std::sync::Arc;

use crate::{
    args::{expect_args, optional_arg},
    class::{Class, ClassBuilder},
    exception::{ExcType, RunResult},
    hook::CompareOp,
    protocol,
    py_hash::hash_str,
    value::{Value, normalize_index, str_repr},
};

pub(super) fn str_class(object: &Arc<Class>) -> Arc<Class> {
    let mut builder = ClassBuilder::new("str").base(object);
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
            Ok(match (this.as_str(), other.as_str()) {
                (Some(a), Some(b)) => Value::Bool(op.matches(a.cmp(b))),
                _ => Value::NotImplemented,
            })
        });
    }
    builder
        .method("__add__", |this, args| {
            let [other] = expect_args("__add__", args)?;
            Ok(match other.as_str() {
                Some(other) => Value::str(format!("{}{other}", str_of(this)?)),
                None => Value::NotImplemented,
            })
        })
        .method("__mul__", repeat)
        .method("__rmul__", repeat)
        .method("__len__", |this, _| {
            let count = str_of(this)?.chars().count();
            Ok(Value::Int(i64::try_from(count).unwrap_or(i64::MAX)))
        })
        .method("__contains__", |this, args| {
            let [needle] = expect_args("__contains__", args)?;
            match needle.as_str() {
                Some(needle) => Ok(Value::Bool(str_of(this)?.contains(needle))),
                None => Err(ExcType::type_error(format!(
                    "'in <string>' requires string as left operand, not {}",
                    needle.type_name()
                ))),
            }
        })
        .method("__getitem__", |this, args| {
            let [key] = expect_args("__getitem__", args)?;
            let Some(index) = key.as_int() else {
                return Err(ExcType::type_error(format!(
                    "string indices must be integers, not '{}'",
                    key.type_name()
                )));
            };
            let s = str_of(this)?;
            normalize_index(index, s.chars().count())
                .and_then(|index| s.chars().nth(index))
                .map(|c| Value::str(c.to_string()))
                .ok_or_else(|| ExcType::index_error("string index out of range"))
        })
        .method("__iter__", |this, _| {
            let s = str_of(this)?;
            Ok(Value::iterator(s.chars().map(|c| Value::str(c.to_string()))))
        })
        .method("__bool__", |this, _| Ok(Value::Bool(!str_of(this)?.is_empty())))
        .method("__hash__", |this, _| Ok(Value::Int(hash_str(str_of(this)?))))
        .method("__repr__", |this, _| Ok(Value::str(str_repr(str_of(this)?))))
        .method("__str__", |this, _| str_of(this).map(|_| this.clone()))
        .method("upper", |this, _| Ok(Value::str(str_of(this)?.to_uppercase())))
        .method("lower", |this, _| Ok(Value::str(str_of(this)?.to_lowercase())))
        .method("strip", |this, _| Ok(Value::str(str_of(this)?.trim())))
        .method("startswith", |this, args| {
            let [prefix] = expect_args("startswith", args)?;
            match prefix.as_str() {
                Some(prefix) => Ok(Value::Bool(str_of(this)?.starts_with(prefix))),
                None => Err(ExcType::type_error(format!(
                    "startswith first arg must be str, not {}",
                    prefix.type_name()
                ))),
            }
        })
        .constructor(|args| match optional_arg("str", args)? {
            None => Ok(Value::str("")),
            Some(value) => protocol::to_str(value).map(Value::str),
        })
        .build()
}

fn str_of(value: &Value) -> RunResult<&str> {
    value.as_str().ok_or_else(|| {
        ExcType::type_error(format!(
            "descriptor requires a 'str' object but received a '{}'",
            value.type_name()
        ))
    })
}

/// `s * n` and `n * s`.
fn repeat(this: &Value, args: &[Value]) -> RunResult<Value> {
    let [count] = expect_args("__mul__", args)?;
    let Some(count) = count.as_int() else {
        return Ok(Value::NotImplemented);
    };
    let count = usize::try_from(count).unwrap_or(0);
    let s = str_of(this)?;
    if s.len().checked_mul(count).is_none() {
        return Err(ExcType::overflow_error("*"));
    }
    Ok(Value::str(s.repeat(count)))
}
