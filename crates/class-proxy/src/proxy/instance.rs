//! Proxy instances and the resolution engine.

use std::{slice, sync::Arc};

use ahash::AHashSet;
use parking_lot::RwLock;

use super::{HookSource, ProxyType};
use crate::{
    class::Member,
    exception::{ExcType, RunError, RunResult},
    hook::Hook,
    protocol,
    tracer::Tier,
    value::Value,
};

/// An instance of a [`ProxyType`].
///
/// Owns exactly one wrapped value plus the proxy-base state produced by calling
/// the base class with the extra constructor arguments.
#[derive(Debug)]
pub struct ProxyInstance {
    ty: Arc<ProxyType>,
    wrapped: Value,
    state: Value,
    /// Names deleted through the proxy that would otherwise still resolve
    /// through the base class or the wrapped value.
    deleted: RwLock<AHashSet<String>>,
}

impl ProxyInstance {
    pub(crate) fn new(ty: Arc<ProxyType>, wrapped: Value, state: Value) -> Self {
        Self {
            ty,
            wrapped,
            state,
            deleted: RwLock::new(AHashSet::new()),
        }
    }

    #[must_use]
    pub fn proxy_type(&self) -> &Arc<ProxyType> {
        &self.ty
    }

    #[must_use]
    pub fn wrapped(&self) -> &Value {
        &self.wrapped
    }

    /// The proxy-base state, usually an [`Instance`](crate::Instance) of the base class.
    #[must_use]
    pub fn state(&self) -> &Value {
        &self.state
    }

    /// A base member not inherited from an ancestor shared with the wrapped type.
    fn base_member(&self, name: &str) -> Option<&Member> {
        self.ty.base().lookup_where(name, |class| self.ty.is_common(class))
    }

    fn state_attr(&self, name: &str) -> Option<Value> {
        match &self.state {
            Value::Instance(state) => state.attr(name),
            _ => None,
        }
    }

    fn is_deleted(&self, name: &str) -> bool {
        self.deleted.read().contains(name)
    }

    /// Instance-level lookup.
    ///
    /// The base tier (state attributes, then base members bound to the state)
    /// wins over the wrapped tier (attributes bound to the wrapped value). A miss
    /// on both tiers names the attribute and both searched types.
    pub fn get_attr(&self, name: &str) -> RunResult<Value> {
        let tracer = self.ty.tracer();
        if !self.is_deleted(name) {
            if let Some(value) = self.state_attr(name) {
                tracer.on_attr_resolved(self.ty.name(), name, Tier::ProxyBase);
                return Ok(value);
            }
            if let Some(member) = self.base_member(name) {
                tracer.on_attr_resolved(self.ty.name(), name, Tier::ProxyBase);
                return member.bind(&self.state);
            }
            if self.wrapped.has_attr(name) {
                tracer.on_attr_resolved(self.ty.name(), name, Tier::Wrapped);
                return self.wrapped.get_attr(name);
            }
        }
        tracer.on_attr_missing(self.ty.name(), name);
        Err(self.not_found(name))
    }

    #[must_use]
    pub fn has_attr(&self, name: &str) -> bool {
        !self.is_deleted(name)
            && (self.state_attr(name).is_some() || self.base_member(name).is_some() || self.wrapped.has_attr(name))
    }

    /// Assigns `name` on the proxy-base state, shadowing both tiers.
    pub fn set_attr(&self, name: &str, value: Value) -> RunResult<()> {
        let Value::Instance(state) = &self.state else {
            return Err(ExcType::attribute_error_no_setattr(self.ty.name(), name));
        };
        state.set_attr(name, value);
        self.deleted.write().remove(name);
        Ok(())
    }

    /// Deletes `name` from the proxy.
    ///
    /// Removes an assigned value from the state; a name that would still resolve
    /// through the base class or the wrapped value is hidden from then on. The
    /// wrapped value itself is never modified.
    pub fn del_attr(&self, name: &str) -> RunResult<()> {
        if self.is_deleted(name) {
            return Err(self.not_found(name));
        }
        let removed = match &self.state {
            Value::Instance(state) => state.remove_attr(name).is_some(),
            _ => false,
        };
        let still_resolves = self.base_member(name).is_some() || self.wrapped.has_attr(name);
        if still_resolves {
            self.deleted.write().insert(name.to_owned());
        }
        if removed || still_resolves {
            Ok(())
        } else {
            Err(self.not_found(name))
        }
    }

    /// Runs operator hook `hook` according to the proxy type's hook table.
    ///
    /// Returns `Ok(None)` when the hook is unsupported, exactly like
    /// [`protocol::call_hook`] does for a plain value.
    pub fn dispatch_hook(&self, hook: Hook, args: &[Value]) -> RunResult<Option<Value>> {
        let source = self.ty.hooks().source(hook);
        let tier = if self.supports(hook) { source.tier() } else { None };
        self.ty.tracer().on_hook(self.ty.name(), hook, tier);
        match source {
            HookSource::ProxyBase => protocol::call_hook(&self.state, hook, args),
            HookSource::Wrapped | HookSource::WrappedRuntime => {
                if hook.takes_operand()
                    && let [Value::Proxy(other)] = args
                    && let Some(operand) = self.unwrap_operand(other)
                {
                    return protocol::call_hook(&self.wrapped, hook, slice::from_ref(operand));
                }
                protocol::call_hook(&self.wrapped, hook, args)
            }
            HookSource::Absent => Ok(None),
        }
    }

    /// Whether dispatching `hook` would find an implementation.
    #[must_use]
    pub fn supports(&self, hook: Hook) -> bool {
        match self.ty.hooks().source(hook) {
            HookSource::ProxyBase | HookSource::Wrapped => true,
            HookSource::WrappedRuntime => protocol::has_hook(&self.wrapped, hook),
            HookSource::Absent => false,
        }
    }

    /// The wrapped value of `other` when it wraps something compatible with this
    /// proxy: an instance of the declared wrapped type, or of this proxy's wrapped
    /// value's runtime class when the wrapped type is unspecified.
    fn unwrap_operand<'a>(&self, other: &'a Self) -> Option<&'a Value> {
        let compatible = match self.ty.wrapped() {
            Some(class) => class.clone(),
            None => self.wrapped.class(),
        };
        other.wrapped.is_instance(&compatible).then_some(&other.wrapped)
    }

    fn not_found(&self, name: &str) -> RunError {
        self.ty.attribute_not_found(name, &self.wrapped.type_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{class::Class, proxy::synthesize, types::builtins};

    #[test]
    fn delete_hides_wrapped_attribute_until_reassigned() {
        let base = Class::builder("Tag").build();
        let proxy_type = synthesize(Some(&builtins().int), &base);
        let proxy = proxy_type.instantiate(Value::Int(7), &[]).unwrap();

        proxy.del_attr("bit_length").unwrap();
        assert!(!proxy.has_attr("bit_length"));
        assert!(proxy.get_attr("bit_length").unwrap_err().is(ExcType::AttributeError));

        proxy.set_attr("bit_length", Value::Int(1)).unwrap();
        assert_eq!(proxy.get_attr("bit_length").unwrap().as_int(), Some(1));
    }

    #[test]
    fn incompatible_operand_is_not_unwrapped() {
        let base = Class::builder("Tag").build();
        let ints = synthesize(Some(&builtins().int), &base);
        let strs = synthesize(Some(&builtins().str), &base);
        let one = ints.instantiate(Value::Int(1), &[]).unwrap();
        let two = ints.instantiate(Value::Int(2), &[]).unwrap();
        let text = strs.instantiate(Value::str("x"), &[]).unwrap();

        assert!(one.unwrap_operand(&two).is_some());
        assert!(one.unwrap_operand(&text).is_none());
    }
}
