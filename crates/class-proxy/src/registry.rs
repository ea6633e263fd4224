//! Convenience entry points and the proxy type cache.
//!
//! [`synthesize`](crate::synthesize) builds a fresh type on every call. A
//! [`ProxyRegistry`] memoizes synthesis per (wrapped type, base, name), so code
//! that asks for `Provenance[int]` in many places gets one shared type back.
//! Registries are ordinary values: there is no process-wide cache.

use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;

use crate::{
    class::Class,
    options::ProxyOptions,
    proxy::{ProxyType, synthesize, synthesize_with},
    tracer::ResolutionTracer,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    wrapped: Option<u64>,
    base: u64,
    name: Option<String>,
}

/// A cache of synthesized proxy types.
///
/// ```
/// use class_proxy::{Class, ProxyRegistry, types::builtins};
///
/// let registry = ProxyRegistry::new();
/// let base = Class::builder("Provenance").build();
/// let first = registry.wrap_with(Some(&builtins().int), &base, None);
/// let second = registry.wrap_with(Some(&builtins().int), &base, None);
/// assert!(std::sync::Arc::ptr_eq(&first, &second));
///
/// let named = registry.proxy_of(&builtins().int, Some("Sourced"))(&base);
/// assert_eq!(named.name(), "Sourced");
/// ```
#[derive(Debug, Default)]
pub struct ProxyRegistry {
    cache: Mutex<AHashMap<CacheKey, Arc<ProxyType>>>,
    /// Installed on every proxy type this registry synthesizes.
    tracer: Option<Arc<dyn ResolutionTracer>>,
}

impl ProxyRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry whose proxy types all report to `tracer`.
    #[must_use]
    pub fn with_tracer(tracer: Arc<dyn ResolutionTracer>) -> Self {
        Self {
            cache: Mutex::default(),
            tracer: Some(tracer),
        }
    }

    /// The proxy type of `base` over `wrapped` (any object when `None`), named
    /// `name` or `Base[wrapped]`. Synthesized on first use, cached afterwards.
    ///
    /// The cache is not locked during synthesis, so a tracer may call back into
    /// the registry. When two threads race on the same key, the first insert
    /// wins and both get that type.
    pub fn wrap_with(&self, wrapped: Option<&Arc<Class>>, base: &Arc<Class>, name: Option<&str>) -> Arc<ProxyType> {
        let key = CacheKey {
            wrapped: wrapped.map(|class| class.uid()),
            base: base.uid(),
            name: name.map(str::to_owned),
        };
        if let Some(cached) = self.cache.lock().get(&key) {
            return cached.clone();
        }

        let mut options = ProxyOptions::new();
        if let Some(name) = name {
            options = options.name(name);
        }
        if let Some(tracer) = &self.tracer {
            options = options.tracer(tracer.clone());
        }
        let proxy_type = synthesize_with(wrapped, base, options);
        self.cache.lock().entry(key).or_insert(proxy_type).clone()
    }

    /// Declaration-style entry point: fixes the wrapped type (and optional name)
    /// and returns a function that turns a base class into its proxy type.
    pub fn proxy_of<'a>(
        &'a self,
        wrapped: &Arc<Class>,
        name: Option<&str>,
    ) -> impl Fn(&Arc<Class>) -> Arc<ProxyType> + use<'a> {
        let wrapped = wrapped.clone();
        let name = name.map(str::to_owned);
        move |base: &Arc<Class>| self.wrap_with(Some(&wrapped), base, name.as_deref())
    }

    /// The proxy type of `base` over any object.
    pub fn proxy(&self, base: &Arc<Class>) -> Arc<ProxyType> {
        self.wrap_with(None, base, None)
    }

    /// Forgets every cached proxy type. Types handed out earlier stay valid.
    pub fn reset(&self) {
        self.cache.lock().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.lock().is_empty()
    }
}

/// Curries [`synthesize`] over a fixed proxy base.
///
/// Every call synthesizes a new, behaviorally identical type; use a
/// [`ProxyRegistry`] to share them.
pub fn make_proxy_factory(base: &Arc<Class>) -> impl Fn(Option<&Arc<Class>>) -> Arc<ProxyType> + Send + Sync + use<> {
    let base = base.clone();
    move |wrapped: Option<&Arc<Class>>| synthesize(wrapped, &base)
}
