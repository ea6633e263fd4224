//! `object` and the classes of the runtime's own values (None, types, callables, iterators).

use std::sync::Arc;

use crate::{
    args::expect_args,
    class::{Class, ClassBuilder},
    exception::{ExcType, RunResult},
    hook::Hook,
    protocol,
    py_hash::hash_int,
    value::{Value, str_repr},
};

/// The root class.
///
/// Defines the defaults every value falls back to: identity equality and
/// hashing, and a `<Name object at 0x..>` repr.
pub(super) fn object_class() -> Arc<Class> {
    ClassBuilder::new("object")
        .root()
        .method("__repr__", |this, _| {
            Ok(Value::str(format!(
                "<{} object at {:#x}>",
                this.type_name(),
                this.identity()
            )))
        })
        .method("__str__", |this, _| protocol::to_repr(this).map(Value::str))
        .method("__eq__", |this, args| {
            let [other] = expect_args("__eq__", args)?;
            Ok(if this.is(other) {
                Value::Bool(true)
            } else {
                Value::NotImplemented
            })
        })
        .method("__ne__", |this, args| {
            // inverts `__eq__` unless it is not implemented
            match protocol::call_hook(this, Hook::Eq, args)? {
                Some(result) if !result.is_not_implemented() => Ok(Value::Bool(!protocol::truthy(&result)?)),
                _ => Ok(Value::NotImplemented),
            }
        })
        .method("__hash__", |this, _| {
            Ok(Value::Int(hash_int((this.identity() >> 4) as i64)))
        })
        .constructor(|args| {
            if args.is_empty() {
                Ok(Value::Instance(Arc::new(crate::class::Instance::new(
                    super::builtins().object.clone(),
                ))))
            } else {
                Err(ExcType::type_error_no_args("object"))
            }
        })
        .build()
}

pub(super) fn none_type_class(object: &Arc<Class>) -> Arc<Class> {
    ClassBuilder::new("NoneType")
        .base(object)
        .method("__repr__", |_, _| Ok(Value::str("None")))
        .method("__bool__", |_, _| Ok(Value::Bool(false)))
        .constructor(|args| {
            expect_args::<0>("NoneType", args)?;
            Ok(Value::None)
        })
        .build()
}

pub(super) fn not_implemented_type_class(object: &Arc<Class>) -> Arc<Class> {
    ClassBuilder::new("NotImplementedType")
        .base(object)
        .method("__repr__", |_, _| Ok(Value::str("NotImplemented")))
        .build()
}

/// The class of classes and proxy types. Calling it with one argument returns
/// that argument's class.
pub(super) fn type_class(object: &Arc<Class>) -> Arc<Class> {
    ClassBuilder::new("type")
        .base(object)
        .method("__repr__", |this, _| {
            let name = this.get_attr("__name__")?;
            Ok(Value::str(format!("<class {}>", str_repr(name.as_str().unwrap_or_default()))))
        })
        .method("__call__", |this, args| protocol::call(this, args))
        .constructor(|args| {
            let [value] = expect_args("type", args)?;
            Ok(match value {
                Value::Proxy(proxy) => Value::ProxyType(proxy.proxy_type().clone()),
                other => Value::Class(other.class()),
            })
        })
        .build()
}

pub(super) fn function_class(object: &Arc<Class>) -> Arc<Class> {
    ClassBuilder::new("function")
        .base(object)
        .method("__repr__", |this, _| {
            let name = match this {
                Value::Function(func) => func.name(),
                _ => "?",
            };
            Ok(Value::str(format!("<function {name}>")))
        })
        .method("__call__", |this, args| protocol::call(this, args))
        .build()
}

pub(super) fn method_class(object: &Arc<Class>) -> Arc<Class> {
    ClassBuilder::new("method")
        .base(object)
        .method("__repr__", |this, _| match this {
            Value::BoundMethod(method) => Ok(Value::str(format!(
                "<bound method {} of {}>",
                method.func().name(),
                protocol::to_repr(method.receiver())?
            ))),
            _ => Ok(Value::str("<bound method>")),
        })
        .method("__call__", |this, args| protocol::call(this, args))
        .build()
}

pub(super) fn iterator_class(object: &Arc<Class>) -> Arc<Class> {
    ClassBuilder::new("iterator")
        .base(object)
        .method("__iter__", |this, _| Ok(this.clone()))
        .method("__next__", |this, _| next_item(this))
        .build()
}

fn next_item(this: &Value) -> RunResult<Value> {
    match this {
        Value::Iter(iter) => iter.next_value().ok_or_else(ExcType::stop_iteration),
        _ => Err(ExcType::type_error_not_iterable(&this.type_name())),
    }
}
