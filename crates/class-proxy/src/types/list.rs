//! `list`.

use std::sync::Arc;

use crate::{
    args::{expect_args, optional_arg},
    class::{Class, ClassBuilder, Member},
    exception::{ExcType, RunResult},
    protocol,
    value::{List, Value},
};

pub(super) fn list_class(object: &Arc<Class>) -> Arc<Class> {
    ClassBuilder::new("list")
        .base(object)
        .method("__len__", |this, _| {
            Ok(Value::Int(i64::try_from(list_of(this)?.len()).unwrap_or(i64::MAX)))
        })
        .method("__getitem__", |this, args| {
            let [key] = expect_args("__getitem__", args)?;
            list_of(this)?.get(index_of(key)?)
        })
        .method("__setitem__", |this, args| {
            let [key, value] = expect_args("__setitem__", args)?;
            list_of(this)?.set(index_of(key)?, value.clone())?;
            Ok(Value::None)
        })
        .method("__delitem__", |this, args| {
            let [key] = expect_args("__delitem__", args)?;
            list_of(this)?.remove(index_of(key)?).map(|_| Value::None)
        })
        .method("__contains__", |this, args| {
            let [needle] = expect_args("__contains__", args)?;
            for item in list_of(this)?.snapshot() {
                if item.is(needle) || protocol::eq(&item, needle)? {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        })
        .method("__iter__", |this, _| Ok(Value::iterator(list_of(this)?.snapshot())))
        .method("__add__", |this, args| {
            let [other] = expect_args("__add__", args)?;
            let Value::List(other) = other else {
                return Ok(Value::NotImplemented);
            };
            let mut items = list_of(this)?.snapshot();
            items.extend(other.snapshot());
            Ok(Value::list(items))
        })
        .method("__iadd__", |this, args| {
            let [other] = expect_args("__iadd__", args)?;
            let items = protocol::iterate(other)?;
            list_of(this)?.extend(items);
            Ok(this.clone())
        })
        .method("__mul__", |this, args| {
            let [count] = expect_args("__mul__", args)?;
            let Some(count) = count.as_int() else {
                return Ok(Value::NotImplemented);
            };
            let items = list_of(this)?.snapshot();
            let count = usize::try_from(count).unwrap_or(0);
            let total = items.len().checked_mul(count).ok_or_else(|| ExcType::overflow_error("*"))?;
            Ok(Value::list(items.iter().cloned().cycle().take(total).collect()))
        })
        .method("__eq__", |this, args| {
            let [other] = expect_args("__eq__", args)?;
            match other {
                Value::List(other) => elements_equal(list_of(this)?, other).map(Value::Bool),
                _ => Ok(Value::NotImplemented),
            }
        })
        .method("__ne__", |this, args| {
            let [other] = expect_args("__ne__", args)?;
            match other {
                Value::List(other) => elements_equal(list_of(this)?, other).map(|eq| Value::Bool(!eq)),
                _ => Ok(Value::NotImplemented),
            }
        })
        .method("__repr__", |this, _| {
            let mut out = String::from("[");
            for (i, item) in list_of(this)?.snapshot().iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&protocol::to_repr(item)?);
            }
            out.push(']');
            Ok(Value::str(out))
        })
        // lists are mutable, so unhashable
        .member("__hash__", Member::Const(Value::None))
        .method("append", |this, args| {
            let [item] = expect_args("append", args)?;
            list_of(this)?.push(item.clone());
            Ok(Value::None)
        })
        .method("pop", |this, args| {
            let list = list_of(this)?;
            let index = match optional_arg("pop", args)? {
                Some(key) => index_of(key)?,
                None => -1,
            };
            if list.is_empty() {
                return Err(ExcType::index_error("pop from empty list"));
            }
            list.remove(index).map_err(|_| ExcType::index_error("pop index out of range"))
        })
        .constructor(|args| match optional_arg("list", args)? {
            None => Ok(Value::list(Vec::new())),
            Some(iterable) => protocol::iterate(iterable).map(Value::list),
        })
        .build()
}

fn list_of(value: &Value) -> RunResult<&List> {
    match value {
        Value::List(list) => Ok(list),
        _ => Err(ExcType::type_error(format!(
            "descriptor requires a 'list' object but received a '{}'",
            value.type_name()
        ))),
    }
}

fn index_of(key: &Value) -> RunResult<i64> {
    key.as_int().ok_or_else(|| {
        ExcType::type_error(format!(
            "list indices must be integers, not '{}'",
            key.type_name()
        ))
    })
}

fn elements_equal(left: &List, right: &List) -> RunResult<bool> {
    let (left, right) = (left.snapshot(), right.snapshot());
    if left.len() != right.len() {
        return Ok(false);
    }
    for (a, b) in left.iter().zip(&right) {
        if !(a.is(b) || protocol::eq(a, b)?) {
            return Ok(false);
        }
    }
    Ok(true)
}
