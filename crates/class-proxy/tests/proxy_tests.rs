use std::sync::Arc;

use class_proxy::{
    BinaryOp, Class, CompareOp, ExcType, Hook, HookSource, ProxyRegistry, RunError, UnaryOp, Value, protocol,
    synthesize, types::builtins,
};
use pretty_assertions::assert_eq;

/// The wrapped class: class constants, two methods also defined on the proxy
/// base, and both conversion hooks.
fn base_class() -> Arc<Class> {
    Class::builder("Base")
        .constant("a", 1)
        .constant("b", 2)
        .method("get_self", |this, _| Ok(this.clone()))
        .method("get_base", |this, _| Ok(this.clone()))
        .method("__str__", |_, _| Ok(Value::str("str-base")))
        .method("__repr__", |_, _| Ok(Value::str("repr-base")))
        .build()
}

/// The proxy base: overrides `b`, adds `c` and `d`, and overrides `__str__` only.
fn base_proxy_class() -> Arc<Class> {
    Class::builder("BaseProxy")
        .constant("b", 3)
        .constant("c", 4)
        .init(|this, args| {
            let [d] = args else {
                return Err(RunError::from(class_proxy::SimpleException::new_msg(
                    ExcType::TypeError,
                    "BaseProxy() takes exactly one argument",
                )));
            };
            this.set_attr("d", d.clone())
        })
        .method("get_self", |this, _| Ok(this.clone()))
        .method("get_proxy", |this, _| Ok(this.clone()))
        .method("__str__", |_, _| Ok(Value::str("str-proxy")))
        .build()
}

fn tag_class() -> Arc<Class> {
    Class::builder("Tag").build()
}

struct Fixture {
    proxy_type: Arc<class_proxy::ProxyType>,
    wrapped: Value,
    proxy: Value,
}

fn fixture() -> Fixture {
    let base = base_class();
    let proxy_type = synthesize(Some(&base), &base_proxy_class());
    let wrapped = base.call(&[]).unwrap();
    let proxy = proxy_type.call(&[wrapped.clone(), Value::Int(1)]).unwrap();
    Fixture {
        proxy_type,
        wrapped,
        proxy,
    }
}

fn int_attr(value: &Value, name: &str) -> Option<i64> {
    value.get_attr(name).unwrap().as_int()
}

// =============================================================================
// Class-level lookup
// =============================================================================

#[test]
fn class_attributes_resolve_base_first_then_wrapped() {
    let f = fixture();
    let ty = Value::ProxyType(f.proxy_type.clone());
    assert_eq!(int_attr(&ty, "a"), Some(1));
    assert_eq!(int_attr(&ty, "b"), Some(3));
    assert_eq!(int_attr(&ty, "c"), Some(4));
    assert_eq!(ty.get_attr("__name__").unwrap().as_str(), Some("BaseProxy[Base]"));
}

#[test]
fn class_attribute_missing_on_both_tiers() {
    let f = fixture();
    let err = f.proxy_type.class_attr("nope").unwrap_err();
    let RunError::AttributeNotFound(err) = err else {
        panic!("expected AttributeNotFound, got {err:?}");
    };
    assert_eq!(err.attr(), "nope");
    assert_eq!(err.owner(), "BaseProxy[Base]");
    assert_eq!(err.searched(), ["BaseProxy", "Base"]);
}

#[test]
fn class_level_methods_are_unbound() {
    let f = fixture();
    let get_base = f.proxy_type.class_attr("get_base").unwrap();
    let result = protocol::call(&get_base, std::slice::from_ref(&f.wrapped)).unwrap();
    assert!(result.is(&f.wrapped));
}

// =============================================================================
// Instance-level lookup
// =============================================================================

#[test]
fn instance_attributes_resolve_through_both_tiers() {
    let f = fixture();
    assert_eq!(int_attr(&f.proxy, "a"), Some(1));
    assert_eq!(int_attr(&f.proxy, "b"), Some(3));
    assert_eq!(int_attr(&f.proxy, "c"), Some(4));
    assert_eq!(int_attr(&f.proxy, "d"), Some(1));
}

#[test]
fn base_member_wins_and_is_bound_to_state() {
    let f = fixture();
    let Value::Proxy(proxy) = &f.proxy else { unreachable!() };
    let result = protocol::call_method(&f.proxy, "get_self", &[]).unwrap();
    assert!(result.is(proxy.state()));
    let result = protocol::call_method(&f.proxy, "get_proxy", &[]).unwrap();
    assert!(result.is(proxy.state()));
}

#[test]
fn wrapped_member_is_bound_to_wrapped_value() {
    let f = fixture();
    let result = protocol::call_method(&f.proxy, "get_base", &[]).unwrap();
    assert!(result.is(&f.wrapped));
}

#[test]
fn missing_member_names_attribute_and_both_tiers() {
    let f = fixture();
    let err = f.proxy.get_attr("missing").unwrap_err();
    assert!(err.is(ExcType::AttributeError));
    assert_eq!(
        err.message(),
        "'BaseProxy[Base]' object has no attribute 'missing' (searched 'BaseProxy', 'Base')"
    );
    assert!(!f.proxy.has_attr("missing"));
}

#[test]
fn set_attribute_shadows_both_tiers() {
    let f = fixture();
    f.proxy.set_attr("a", Value::Int(5)).unwrap();
    f.proxy.set_attr("x", Value::Int(100)).unwrap();
    assert_eq!(int_attr(&f.proxy, "a"), Some(5));
    assert_eq!(int_attr(&f.proxy, "x"), Some(100));
    // the wrapped class is untouched
    assert_eq!(int_attr(&f.wrapped, "a"), Some(1));
}

#[test]
fn delete_inherited_attribute() {
    let f = fixture();
    f.proxy.del_attr("a").unwrap();
    assert!(f.proxy.get_attr("a").unwrap_err().is(ExcType::AttributeError));
    assert!(f.proxy.del_attr("a").unwrap_err().is(ExcType::AttributeError));
}

#[test]
fn delete_assigned_attribute() {
    let f = fixture();
    f.proxy.set_attr("x", Value::Int(100)).unwrap();
    f.proxy.del_attr("x").unwrap();
    assert!(f.proxy.get_attr("x").unwrap_err().is(ExcType::AttributeError));
}

#[test]
fn delete_unknown_attribute_fails() {
    let f = fixture();
    assert!(f.proxy.del_attr("never_set").unwrap_err().is(ExcType::AttributeError));
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn unwrap_returns_the_exact_wrapped_value() {
    let f = fixture();
    let Value::Proxy(proxy) = &f.proxy else { unreachable!() };
    assert!(class_proxy::unwrap(proxy).is(&f.wrapped));
    assert!(class_proxy::instance(&f.proxy).unwrap().is(&f.wrapped));
    assert!(class_proxy::instance(&f.wrapped).is_none());

    let text = Value::str("hello");
    let tagged = synthesize(None, &tag_class()).call(std::slice::from_ref(&text)).unwrap();
    assert!(class_proxy::instance(&tagged).unwrap().is(&text));
}

#[test]
fn wrapping_wrong_type_is_a_type_error() {
    let f = fixture();
    let err = f.proxy_type.call(&[Value::Int(0), Value::Int(1)]).unwrap_err();
    assert_eq!(err.exc_type(), ExcType::TypeError);
    assert_eq!(err.message(), "type 'BaseProxy[Base]' cannot wrap object 0 with type 'int'");
}

#[test]
fn subclass_instances_can_be_wrapped() {
    let base = base_class();
    let derived = Class::builder("Derived").base(&base).build();
    let proxy_type = synthesize(Some(&base), &base_proxy_class());
    let proxy = proxy_type.call(&[derived.call(&[]).unwrap(), Value::Int(1)]).unwrap();
    assert_eq!(int_attr(&proxy, "a"), Some(1));
}

#[test]
fn base_construction_error_passes_through_unchanged() {
    let f = fixture();
    let err = f.proxy_type.call(std::slice::from_ref(&f.wrapped)).unwrap_err();
    assert_eq!(
        err,
        RunError::from(class_proxy::SimpleException::new_msg(
            ExcType::TypeError,
            "BaseProxy() takes exactly one argument",
        ))
    );

    let plain = synthesize(Some(&builtins().int), &tag_class());
    let err = plain.call(&[Value::Int(1), Value::Int(2)]).unwrap_err();
    assert_eq!(err.message(), "Tag() takes no arguments");
}

#[test]
fn missing_wrapped_argument() {
    let f = fixture();
    let err = f.proxy_type.call(&[]).unwrap_err();
    assert_eq!(err.exc_type(), ExcType::TypeError);
}

#[test]
fn type_of_proxy_is_its_proxy_type() {
    let f = fixture();
    assert_eq!(f.proxy.type_name(), "BaseProxy[Base]");
    let ty = builtins().type_.call(std::slice::from_ref(&f.proxy)).unwrap();
    let Value::ProxyType(ty) = ty else {
        panic!("expected a proxy type");
    };
    assert!(Arc::ptr_eq(&ty, &f.proxy_type));
}

// =============================================================================
// Operator hooks
// =============================================================================

#[test]
fn str_override_skips_object_defaults() {
    let f = fixture();
    assert_eq!(protocol::to_str(&f.proxy).unwrap(), "str-proxy");
    assert_eq!(protocol::to_repr(&f.proxy).unwrap(), "repr-base");
}

#[test]
fn string_conversion_override() {
    let shouty = Class::builder("Shouty")
        .method("__str__", |_, _| Ok(Value::str("X")))
        .build();
    let proxy = synthesize(Some(&builtins().str), &shouty)
        .call(&[Value::str("hello")])
        .unwrap();
    assert_eq!(protocol::to_str(&proxy).unwrap(), "X");
    assert_eq!(protocol::to_repr(&proxy).unwrap(), "'hello'");
    assert_eq!(protocol::len(&proxy).unwrap(), 5);
}

#[test]
fn comparisons_forward_to_wrapped_integers() {
    let tagged = synthesize(Some(&builtins().int), &tag_class());
    let a = tagged.call(&[Value::Int(42)]).unwrap();
    let b = tagged.call(&[Value::Int(100)]).unwrap();
    assert!(protocol::compare_bool(&a, &b, CompareOp::Lt).unwrap());
    assert!(!protocol::compare_bool(&a, &b, CompareOp::Ge).unwrap());
    assert!(protocol::compare_bool(&a, &Value::Int(42), CompareOp::Eq).unwrap());
    assert!(protocol::compare_bool(&Value::Int(42), &a, CompareOp::Eq).unwrap());
    assert!(protocol::compare_bool(&Value::Int(7), &b, CompareOp::Lt).unwrap());
}

#[test]
fn proxies_of_incompatible_types_are_not_unwrapped() {
    let any = synthesize(None, &tag_class());
    let number = any.call(&[Value::Int(42)]).unwrap();
    let text = any.call(&[Value::str("x")]).unwrap();
    assert!(!protocol::eq(&number, &text).unwrap());
    let err = protocol::compare(&number, &text, CompareOp::Lt).unwrap_err();
    assert_eq!(
        err.message(),
        "'<' not supported between instances of 'Tag[object]' and 'Tag[object]'"
    );
}

#[test]
fn arithmetic_forwards_with_reflection() {
    let tagged = synthesize(Some(&builtins().int), &tag_class());
    let six = tagged.call(&[Value::Int(6)]).unwrap();
    let seven = tagged.call(&[Value::Int(7)]).unwrap();

    let product = protocol::binary_op(&six, &seven, BinaryOp::Mul).unwrap();
    assert_eq!(product.as_int(), Some(42));
    let sum = protocol::binary_op(&Value::Int(36), &six, BinaryOp::Add).unwrap();
    assert_eq!(sum.as_int(), Some(42));
    let half = protocol::binary_op(&seven, &Value::Int(2), BinaryOp::TrueDiv).unwrap();
    assert_eq!(half.as_float(), Some(3.5));
    let negated = protocol::unary_op(&six, UnaryOp::Neg).unwrap();
    assert_eq!(negated.as_int(), Some(-6));
}

#[test]
fn inplace_falls_back_to_binary_and_rebinds_to_result() {
    let tagged = synthesize(Some(&builtins().int), &tag_class());
    let forty = tagged.call(&[Value::Int(40)]).unwrap();
    let result = protocol::inplace_op(&forty, &Value::Int(2), BinaryOp::Add).unwrap();
    assert_eq!(result.as_int(), Some(42));
}

#[test]
fn inplace_on_wrapped_list_mutates_it() {
    let items = Value::list(vec![Value::Int(1)]);
    let proxy = synthesize(Some(&builtins().list), &tag_class())
        .call(std::slice::from_ref(&items))
        .unwrap();
    let result = protocol::inplace_op(&proxy, &Value::list(vec![Value::Int(2)]), BinaryOp::Add).unwrap();
    assert!(result.is(&items));
    assert_eq!(protocol::len(&items).unwrap(), 2);
}

#[test]
fn unsupported_operation_matches_plain_value_error() {
    let tagged = synthesize(Some(&builtins().str), &tag_class());
    let proxy = tagged.call(&[Value::str("a")]).unwrap();
    let err = protocol::binary_op(&proxy, &Value::Int(1), BinaryOp::Sub).unwrap_err();
    assert_eq!(err.exc_type(), ExcType::TypeError);
    assert_eq!(err.message(), "unsupported operand type(s) for -: 'Tag[str]' and 'int'");

    let plain = protocol::binary_op(&Value::str("a"), &Value::Int(1), BinaryOp::Sub).unwrap_err();
    assert_eq!(plain.exc_type(), err.exc_type());

    let err = protocol::len(&synthesize(Some(&builtins().int), &tag_class()).call(&[Value::Int(1)]).unwrap())
        .unwrap_err();
    assert_eq!(err.message(), "object of type 'Tag[int]' has no len()");
}

#[test]
fn hashing_and_truthiness_forward() {
    let tagged = synthesize(Some(&builtins().int), &tag_class());
    let zero = tagged.call(&[Value::Int(0)]).unwrap();
    let answer = tagged.call(&[Value::Int(42)]).unwrap();
    assert!(!protocol::truthy(&zero).unwrap());
    assert!(protocol::truthy(&answer).unwrap());
    assert_eq!(protocol::hash(&answer).unwrap(), protocol::hash(&Value::Int(42)).unwrap());

    let listed = synthesize(Some(&builtins().list), &tag_class())
        .call(&[Value::list(vec![])])
        .unwrap();
    assert!(!protocol::truthy(&listed).unwrap());
    let err = protocol::hash(&listed).unwrap_err();
    assert_eq!(err.message(), "unhashable type: 'Tag[list]'");
}

#[test]
fn unspecified_wrapped_type_uses_runtime_hooks() {
    let any = synthesize(None, &tag_class());
    let items = Value::list(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
    let proxy = any.call(std::slice::from_ref(&items)).unwrap();

    assert_eq!(protocol::len(&proxy).unwrap(), 3);
    assert!(protocol::contains(&proxy, &Value::Int(2)).unwrap());
    assert_eq!(protocol::get_item(&proxy, &Value::Int(-1)).unwrap().as_int(), Some(3));
    protocol::set_item(&proxy, &Value::Int(0), &Value::Int(10)).unwrap();
    protocol::del_item(&proxy, &Value::Int(1)).unwrap();
    let collected: Vec<i64> = protocol::iterate(&proxy)
        .unwrap()
        .iter()
        .filter_map(Value::as_int)
        .collect();
    assert_eq!(collected, [10, 3]);
    assert_eq!(protocol::to_repr(&items).unwrap(), "[10, 3]");

    let number = any.call(&[Value::Int(5)]).unwrap();
    let err = protocol::len(&number).unwrap_err();
    assert_eq!(err.message(), "object of type 'Tag[object]' has no len()");
}

#[test]
fn call_hook_forwards_to_wrapped_callable() {
    let double = Value::Function(Arc::new(class_proxy::Function::new("double", |args| {
        protocol::binary_op(&args[0], &Value::Int(2), BinaryOp::Mul)
    })));
    let proxy = synthesize(None, &tag_class()).call(&[double]).unwrap();
    assert_eq!(protocol::call(&proxy, &[Value::Int(21)]).unwrap().as_int(), Some(42));

    let number = synthesize(None, &tag_class()).call(&[Value::Int(1)]).unwrap();
    let err = protocol::call(&number, &[]).unwrap_err();
    assert_eq!(err.message(), "'Tag[object]' object is not callable");
}

#[test]
fn partial_comparison_override_keeps_other_hooks_forwarded() {
    let lenient = Class::builder("Lenient")
        .method("__eq__", |_, _| Ok(Value::Bool(true)))
        .build();
    let proxy_type = synthesize(Some(&builtins().int), &lenient);
    assert_eq!(proxy_type.hooks().source(Hook::Eq), HookSource::ProxyBase);
    assert_eq!(proxy_type.hooks().source(Hook::Lt), HookSource::Wrapped);

    let one = proxy_type.call(&[Value::Int(1)]).unwrap();
    assert!(protocol::eq(&one, &Value::Int(2)).unwrap());
    assert!(protocol::compare_bool(&one, &Value::Int(2), CompareOp::Lt).unwrap());
}

// =============================================================================
// Synthesis
// =============================================================================

#[test]
fn repeated_synthesis_is_behaviorally_identical() {
    let base = base_class();
    let proxy_base = base_proxy_class();
    let first = synthesize(Some(&base), &proxy_base);
    let second = synthesize(Some(&base), &proxy_base);
    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(first.name(), second.name());
    assert_eq!(first.hooks(), second.hooks());

    let wrapped = base.call(&[]).unwrap();
    let a = first.call(&[wrapped.clone(), Value::Int(1)]).unwrap();
    let b = second.call(&[wrapped, Value::Int(1)]).unwrap();
    for name in ["a", "b", "c", "d"] {
        assert_eq!(int_attr(&a, name), int_attr(&b, name));
    }
    assert_eq!(protocol::to_str(&a).unwrap(), protocol::to_str(&b).unwrap());
}

#[test]
fn default_names() {
    let tag = tag_class();
    assert_eq!(synthesize(Some(&builtins().int), &tag).name(), "Tag[int]");
    assert_eq!(synthesize(None, &tag).name(), "Tag[object]");
}

#[test]
fn proxy_types_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<class_proxy::ProxyType>();
    assert_send_sync::<class_proxy::ProxyInstance>();
    assert_send_sync::<Value>();
    assert_send_sync::<ProxyRegistry>();
}
