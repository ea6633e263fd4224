//! Proxy type synthesis.
//!
//! A proxy type composes a *wrapped* value with the state of a separate *proxy
//! base* class. Instances resolve attributes and operator hooks through a fixed
//! two-tier chain: the proxy base first, the wrapped value second.
//!
//! # Synthesis
//!
//! [`synthesize`] computes everything that does not depend on a concrete value
//! once, up front:
//!
//! - the ancestors shared by the base and the wrapped type (at least `object`),
//!   whose members never count as base overrides
//! - a [`HookTable`] with one entry per [`Hook`](crate::Hook)
//! - the proxy type's name, `Base[wrapped]` unless overridden
//!
//! Synthesis never fails. Errors from the proxy base's initializer surface when
//! the proxy type is instantiated.
//!
//! # Lookup
//!
//! | Access | Order |
//! |--------|-------|
//! | `proxy.attr` | deleted names, base state, base members, wrapped value |
//! | `ProxyType.attr` | base members, wrapped type members, shared members |
//! | `proxy < other` etc. | the hook table |

use std::sync::Arc;

use ahash::AHashSet;

use crate::{
    class::{Class, ClassBuilder, common_ancestors},
    exception::{AttributeNotFound, ExcType, RunError, RunResult},
    options::ProxyOptions,
    protocol,
    tracer::ResolutionTracer,
    types::builtins,
    value::Value,
};

mod instance;
mod table;

pub use instance::ProxyInstance;
pub use table::{HookSource, HookTable};

/// A synthesized proxy type.
///
/// Immutable once built and shared as `Arc<ProxyType>`; calling it (through
/// [`ProxyType::call`] or [`protocol::call`]) creates [`ProxyInstance`]s.
#[derive(Debug)]
pub struct ProxyType {
    name: String,
    /// Class reported by `type(proxy)`, named like the proxy type.
    shell: Arc<Class>,
    /// `None` when any object may be wrapped.
    wrapped: Option<Arc<Class>>,
    base: Arc<Class>,
    /// Uids of the classes shared by the base and wrapped hierarchies.
    common: AHashSet<u64>,
    hooks: HookTable,
    tracer: Arc<dyn ResolutionTracer>,
}

impl ProxyType {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn shell(&self) -> &Arc<Class> {
        &self.shell
    }

    /// The declared wrapped type, `None` when unspecified.
    #[must_use]
    pub fn wrapped(&self) -> Option<&Arc<Class>> {
        self.wrapped.as_ref()
    }

    #[must_use]
    pub fn base(&self) -> &Arc<Class> {
        &self.base
    }

    #[must_use]
    pub fn hooks(&self) -> &HookTable {
        &self.hooks
    }

    pub(crate) fn tracer(&self) -> &dyn ResolutionTracer {
        self.tracer.as_ref()
    }

    /// Whether `class` is an ancestor shared by the base and the wrapped type.
    #[must_use]
    pub fn is_common(&self, class: &Class) -> bool {
        self.common.contains(&class.uid())
    }

    /// Class-level attribute access (`ProxyType.attr`). Members are returned unbound.
    pub fn class_attr(&self, name: &str) -> RunResult<Value> {
        if name == "__name__" {
            return Ok(Value::str(self.name.as_str()));
        }
        if let Some(member) = self.base.lookup_where(name, |class| self.is_common(class)) {
            return Ok(member.unbound());
        }
        if let Some(member) = self.wrapped.as_ref().and_then(|wrapped| wrapped.lookup(name)) {
            return Ok(member.unbound());
        }
        match self.base.lookup(name) {
            Some(member) => Ok(member.unbound()),
            None => {
                let wrapped = self.wrapped.as_ref().map_or("object", |wrapped| wrapped.name());
                Err(self.attribute_not_found(name, wrapped))
            }
        }
    }

    /// Wraps `wrapped`, building the proxy-base state from `args`.
    ///
    /// Fails with `TypeError` when `wrapped` is not an instance of the declared
    /// wrapped type; errors from the base initializer are returned unchanged.
    pub fn instantiate(self: &Arc<Self>, wrapped: Value, args: &[Value]) -> RunResult<Arc<ProxyInstance>> {
        if let Some(expected) = &self.wrapped
            && !wrapped.is_instance(expected)
        {
            return Err(ExcType::type_error_cannot_wrap(
                &self.name,
                &protocol::to_repr(&wrapped)?,
                &wrapped.type_name(),
            ));
        }
        let state = self.base.call(args)?;
        Ok(Arc::new(ProxyInstance::new(self.clone(), wrapped, state)))
    }

    /// `ProxyType(wrapped, *args)`.
    pub fn call(self: &Arc<Self>, args: &[Value]) -> RunResult<Value> {
        match args.split_first() {
            Some((wrapped, rest)) => self.instantiate(wrapped.clone(), rest).map(Value::Proxy),
            None => Err(ExcType::type_error(format!(
                "{}() missing 1 required positional argument: 'wrapped'",
                self.name
            ))),
        }
    }

    pub(crate) fn attribute_not_found(&self, attr: &str, wrapped_type: &str) -> RunError {
        AttributeNotFound::new(
            attr,
            self.name.as_str(),
            vec![self.base.name().to_owned(), wrapped_type.to_owned()],
        )
        .into()
    }
}

/// Synthesizes a proxy type over `wrapped` (any object when `None`) with
/// `base` as the proxy base.
///
/// ```
/// use class_proxy::{Class, Value, protocol, synthesize, types::builtins};
///
/// let provenance = Class::builder("Provenance")
///     .init(|this, args| this.set_attr("source", args[0].clone()))
///     .build();
/// let tracked_int = synthesize(Some(&builtins().int), &provenance);
/// assert_eq!(tracked_int.name(), "Provenance[int]");
///
/// let answer = tracked_int.call(&[Value::Int(42), Value::str("db")]).unwrap();
/// assert_eq!(answer.get_attr("source").unwrap().as_str(), Some("db"));
/// assert_eq!(protocol::to_str(&answer).unwrap(), "42");
/// ```
#[must_use]
pub fn synthesize(wrapped: Option<&Arc<Class>>, base: &Arc<Class>) -> Arc<ProxyType> {
    synthesize_with(wrapped, base, ProxyOptions::default())
}

/// [`synthesize`] with explicit [`ProxyOptions`].
#[must_use]
pub fn synthesize_with(wrapped: Option<&Arc<Class>>, base: &Arc<Class>, options: ProxyOptions) -> Arc<ProxyType> {
    let (name, tracer) = options.into_parts();
    let name = name.unwrap_or_else(|| default_name(wrapped, base));
    let common = common_ancestors(base, wrapped.unwrap_or(&builtins().object));
    let hooks = HookTable::generate(base, wrapped.map(|wrapped| &**wrapped), &common);
    tracer.on_synthesize(&name, hooks.forwarded());
    Arc::new(ProxyType {
        shell: ClassBuilder::new(name.as_str()).build(),
        name,
        wrapped: wrapped.cloned(),
        base: base.clone(),
        common,
        hooks,
        tracer,
    })
}

/// `Base[wrapped]`, or `Base[object]` for an unspecified wrapped type.
fn default_name(wrapped: Option<&Arc<Class>>, base: &Class) -> String {
    let wrapped = wrapped.map_or("object", |wrapped| wrapped.name());
    format!("{}[{wrapped}]", base.name())
}

/// The value `proxy` wraps, exactly as passed at construction.
#[must_use]
pub fn unwrap(proxy: &ProxyInstance) -> &Value {
    proxy.wrapped()
}

/// The wrapped value if `value` is a proxy, `None` otherwise.
#[must_use]
pub fn instance(value: &Value) -> Option<&Value> {
    match value {
        Value::Proxy(proxy) => Some(proxy.wrapped()),
        _ => None,
    }
}
