//! Host operations on values: operators, conversions, container access and calls.
//!
//! Every operation dispatches through the operand's operator hooks, so plain
//! values and proxies go through exactly the same code and raise the same errors.
//!
//! Binary operations follow the Python dunder protocol:
//! 1. Try `lhs.__op__(rhs)`, looked up on the type, never the instance
//! 2. If that is missing or returns `NotImplemented`, try `rhs.__rop__(lhs)`
//! 3. If neither produced a value, raise `TypeError`
//!
//! A missing hook and a hook returning `NotImplemented` are treated alike.

use std::slice;

use crate::{
    class::Member,
    exception::{ExcType, RunResult},
    hook::{BinaryOp, CompareOp, Hook, UnaryOp},
    value::Value,
};

/// Invokes operator hook `hook` on `value`.
///
/// Returns `Ok(None)` when the value's type does not define the hook (or disables
/// it, like `list.__hash__ = None`); callers turn that into the host's
/// "unsupported operation" error. Proxies dispatch through their hook table.
pub fn call_hook(value: &Value, hook: Hook, args: &[Value]) -> RunResult<Option<Value>> {
    if let Value::Proxy(proxy) = value {
        return proxy.dispatch_hook(hook, args);
    }
    let class = value.class();
    match class.lookup(hook.name()) {
        None => Ok(None),
        Some(member) if member.is_disabled_hook() => Ok(None),
        Some(Member::Method(func)) => func.call_method(value, args).map(Some),
        Some(member) => {
            let bound = member.bind(value)?;
            call(&bound, args).map(Some)
        }
    }
}

/// Calls `hook` and filters out `NotImplemented`.
fn call_implemented(value: &Value, hook: Hook, other: &Value) -> RunResult<Option<Value>> {
    Ok(call_hook(value, hook, slice::from_ref(other))?.filter(|result| !result.is_not_implemented()))
}

/// Tries the forward hook on `lhs`, then the reflected hook on `rhs`.
fn try_binary(lhs: &Value, rhs: &Value, hook: Hook, reflected: Hook) -> RunResult<Option<Value>> {
    if let Some(result) = call_implemented(lhs, hook, rhs)? {
        return Ok(Some(result));
    }
    call_implemented(rhs, reflected, lhs)
}

/// `lhs <op> rhs`.
pub fn binary_op(lhs: &Value, rhs: &Value, op: BinaryOp) -> RunResult<Value> {
    match try_binary(lhs, rhs, op.hook(), op.reflected())? {
        Some(result) => Ok(result),
        None => Err(ExcType::binary_type_error(op.symbol(), &lhs.type_name(), &rhs.type_name())),
    }
}

/// `lhs <op>= rhs`: the in-place hook first, then the plain binary protocol.
///
/// Returns the value to rebind `lhs` to. Mutable types (e.g. `list`) return `lhs`
/// itself from their in-place hook.
pub fn inplace_op(lhs: &Value, rhs: &Value, op: BinaryOp) -> RunResult<Value> {
    if let Some(result) = call_implemented(lhs, op.inplace(), rhs)? {
        return Ok(result);
    }
    match try_binary(lhs, rhs, op.hook(), op.reflected())? {
        Some(result) => Ok(result),
        None => Err(ExcType::binary_type_error(
            op.inplace_symbol(),
            &lhs.type_name(),
            &rhs.type_name(),
        )),
    }
}

/// Rich comparison `lhs <op> rhs`, returning whatever the hook returned.
///
/// `==` and `!=` fall back to identity when neither operand implements them;
/// ordering comparisons raise `TypeError`.
pub fn compare(lhs: &Value, rhs: &Value, op: CompareOp) -> RunResult<Value> {
    if let Some(result) = try_binary(lhs, rhs, op.hook(), op.reflected())? {
        return Ok(result);
    }
    match op {
        CompareOp::Eq => Ok(Value::Bool(lhs.is(rhs))),
        CompareOp::Ne => Ok(Value::Bool(!lhs.is(rhs))),
        _ => Err(ExcType::compare_type_error(op.symbol(), &lhs.type_name(), &rhs.type_name())),
    }
}

/// Rich comparison reduced to a boolean.
pub fn compare_bool(lhs: &Value, rhs: &Value, op: CompareOp) -> RunResult<bool> {
    truthy(&compare(lhs, rhs, op)?)
}

/// `lhs == rhs` as a boolean.
pub fn eq(lhs: &Value, rhs: &Value) -> RunResult<bool> {
    compare_bool(lhs, rhs, CompareOp::Eq)
}

/// `-value`, `+value`, `abs(value)`.
pub fn unary_op(value: &Value, op: UnaryOp) -> RunResult<Value> {
    match call_hook(value, op.hook(), &[])? {
        Some(result) => Ok(result),
        None if op == UnaryOp::Abs => Err(ExcType::type_error(format!(
            "bad operand type for abs(): '{}'",
            value.type_name()
        ))),
        None => Err(ExcType::unary_type_error(op.symbol(), &value.type_name())),
    }
}

/// `str(value)`. Falls back to `repr` when `__str__` is not defined.
pub fn to_str(value: &Value) -> RunResult<String> {
    if let Value::Str(s) = value {
        return Ok(s.to_string());
    }
    match call_hook(value, Hook::Str, &[])? {
        Some(Value::Str(s)) => Ok(s.to_string()),
        Some(other) => Err(ExcType::type_error_hook_result("__str__", "string", &other.type_name())),
        None => to_repr(value),
    }
}

/// `repr(value)`.
pub fn to_repr(value: &Value) -> RunResult<String> {
    match call_hook(value, Hook::Repr, &[])? {
        Some(Value::Str(s)) => Ok(s.to_string()),
        Some(other) => Err(ExcType::type_error_hook_result("__repr__", "string", &other.type_name())),
        None => Ok(format!("<{} object at {:#x}>", value.type_name(), value.identity())),
    }
}

/// Truthiness: `__bool__`, then `__len__`, then `true`.
pub fn truthy(value: &Value) -> RunResult<bool> {
    match value {
        Value::Bool(b) => return Ok(*b),
        Value::None => return Ok(false),
        _ => {}
    }
    if let Some(result) = call_hook(value, Hook::Bool, &[])? {
        return match result {
            Value::Bool(b) => Ok(b),
            other => Err(ExcType::type_error(format!(
                "__bool__ should return bool, returned {}",
                other.type_name()
            ))),
        };
    }
    if has_hook(value, Hook::Len) {
        return Ok(len(value)? != 0);
    }
    Ok(true)
}

/// `hash(value)`.
pub fn hash(value: &Value) -> RunResult<i64> {
    match call_hook(value, Hook::Hash, &[])? {
        Some(result) => result
            .as_int()
            .ok_or_else(|| ExcType::type_error("__hash__ method should return an integer")),
        None => Err(ExcType::type_error_unhashable(&value.type_name())),
    }
}

/// `len(value)`.
pub fn len(value: &Value) -> RunResult<usize> {
    match call_hook(value, Hook::Len, &[])? {
        Some(result) => {
            let Some(n) = result.as_int() else {
                return Err(ExcType::type_error(format!(
                    "'{}' object cannot be interpreted as an integer",
                    result.type_name()
                )));
            };
            usize::try_from(n).map_err(|_| ExcType::value_error("__len__() should return >= 0"))
        }
        None => Err(ExcType::type_error_no_len(&value.type_name())),
    }
}

/// `item in container`. Falls back to iterating the container.
pub fn contains(container: &Value, item: &Value) -> RunResult<bool> {
    if let Some(result) = call_hook(container, Hook::Contains, slice::from_ref(item))? {
        return truthy(&result);
    }
    if !has_hook(container, Hook::Iter) {
        return Err(ExcType::type_error(format!(
            "argument of type '{}' is not iterable",
            container.type_name()
        )));
    }
    for candidate in iterate(container)? {
        if candidate.is(item) || eq(&candidate, item)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Whether calling `hook` on `value` would find an implementation.
pub(crate) fn has_hook(value: &Value, hook: Hook) -> bool {
    match value {
        Value::Proxy(proxy) => proxy.supports(hook),
        _ => value
            .class()
            .lookup(hook.name())
            .is_some_and(|member| !member.is_disabled_hook()),
    }
}

/// `container[key]`.
pub fn get_item(container: &Value, key: &Value) -> RunResult<Value> {
    match call_hook(container, Hook::GetItem, slice::from_ref(key))? {
        Some(result) => Ok(result),
        None => Err(ExcType::type_error_not_subscriptable(&container.type_name())),
    }
}

/// `container[key] = value`.
pub fn set_item(container: &Value, key: &Value, value: &Value) -> RunResult<()> {
    match call_hook(container, Hook::SetItem, &[key.clone(), value.clone()])? {
        Some(_) => Ok(()),
        None => Err(ExcType::type_error_no_item_assignment(&container.type_name())),
    }
}

/// `del container[key]`.
pub fn del_item(container: &Value, key: &Value) -> RunResult<()> {
    match call_hook(container, Hook::DelItem, slice::from_ref(key))? {
        Some(_) => Ok(()),
        None => Err(ExcType::type_error_no_item_deletion(&container.type_name())),
    }
}

/// Collects every item `iter(value)` yields.
///
/// Native iterators are drained directly; anything else is advanced through
/// `__next__` until it raises `StopIteration`.
pub fn iterate(value: &Value) -> RunResult<Vec<Value>> {
    let Some(iterator) = call_hook(value, Hook::Iter, &[])? else {
        return Err(ExcType::type_error_not_iterable(&value.type_name()));
    };
    if let Value::Iter(iter) = &iterator {
        return Ok(iter.drain());
    }
    let next = iterator.get_attr("__next__")?;
    let mut items = Vec::new();
    loop {
        match call(&next, &[]) {
            Ok(item) => items.push(item),
            Err(err) if err.exc_type() == ExcType::StopIteration => return Ok(items),
            Err(err) => return Err(err),
        }
    }
}

/// `callee(*args)`.
pub fn call(callee: &Value, args: &[Value]) -> RunResult<Value> {
    match callee {
        Value::Function(func) => func.call(args),
        Value::BoundMethod(method) => method.call(args),
        Value::Class(class) => class.call(args),
        Value::ProxyType(proxy_type) => proxy_type.call(args),
        _ => match call_hook(callee, Hook::Call, args)? {
            Some(result) => Ok(result),
            None => Err(ExcType::type_error_not_callable(&callee.type_name())),
        },
    }
}

/// `receiver.name(*args)`.
pub fn call_method(receiver: &Value, name: &str, args: &[Value]) -> RunResult<Value> {
    let method = receiver.get_attr(name)?;
    call(&method, args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reflected_hook_handles_mixed_numbers() {
        let result = binary_op(&Value::Int(1), &Value::Float(0.5), BinaryOp::Add).unwrap();
        assert_eq!(result.as_float(), Some(1.5));
    }

    #[test]
    fn equality_falls_back_to_identity() {
        let list = Value::list(vec![]);
        assert!(eq(&list, &list).unwrap());
        assert!(!eq(&Value::None, &Value::Int(0)).unwrap());
    }

    #[test]
    fn ordering_unrelated_types_is_a_type_error() {
        let err = compare(&Value::Int(1), &Value::str("a"), CompareOp::Lt).unwrap_err();
        assert_eq!(err.message(), "'<' not supported between instances of 'int' and 'str'");
    }

    #[test]
    fn disabled_hash_is_unhashable() {
        let err = hash(&Value::list(vec![])).unwrap_err();
        assert_eq!(err.message(), "unhashable type: 'list'");
    }
}
