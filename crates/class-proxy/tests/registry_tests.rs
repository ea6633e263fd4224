use std::sync::{Arc, OnceLock, Weak};

use class_proxy::{
    Class, ProxyRegistry, RecordingTracer, ResolutionTracer, TraceEvent, Value, make_proxy_factory, types::builtins,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;

/// Looks the registry up again from inside synthesis.
#[derive(Debug, Default)]
struct ReentrantTracer {
    registry: OnceLock<Weak<ProxyRegistry>>,
    cached_during_synthesis: Mutex<Vec<usize>>,
}

impl ResolutionTracer for ReentrantTracer {
    fn on_synthesize(&self, _proxy: &str, _forwarded_hooks: usize) {
        if let Some(registry) = self.registry.get().and_then(Weak::upgrade) {
            self.cached_during_synthesis.lock().push(registry.len());
        }
    }
}

fn provenance() -> Arc<Class> {
    Class::builder("Provenance")
        .init(|this, args| this.set_attr("source", args.first().cloned().unwrap_or(Value::None)))
        .build()
}

#[test]
fn same_key_returns_the_same_type() {
    let registry = ProxyRegistry::new();
    let base = provenance();
    let first = registry.wrap_with(Some(&builtins().int), &base, None);
    let second = registry.wrap_with(Some(&builtins().int), &base, None);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.len(), 1);
}

#[test]
fn different_keys_get_different_types() {
    let registry = ProxyRegistry::new();
    let base = provenance();
    let ints = registry.wrap_with(Some(&builtins().int), &base, None);
    let strs = registry.wrap_with(Some(&builtins().str), &base, None);
    let named = registry.wrap_with(Some(&builtins().int), &base, Some("SourcedInt"));
    let any = registry.proxy(&base);
    assert!(!Arc::ptr_eq(&ints, &strs));
    assert!(!Arc::ptr_eq(&ints, &named));
    assert_eq!(any.name(), "Provenance[object]");
    assert_eq!(named.name(), "SourcedInt");
    assert_eq!(registry.len(), 4);
}

#[test]
fn proxy_of_is_declaration_style() {
    let registry = ProxyRegistry::new();
    let base = provenance();
    let declare = registry.proxy_of(&builtins().int, Some("CustomName"));
    let proxy_type = declare(&base);
    assert_eq!(proxy_type.name(), "CustomName");
    assert!(Arc::ptr_eq(&proxy_type, &declare(&base)));
    assert!(Arc::ptr_eq(
        &proxy_type,
        &registry.wrap_with(Some(&builtins().int), &base, Some("CustomName"))
    ));
}

#[test]
fn reset_forgets_cached_types() {
    let registry = ProxyRegistry::new();
    let base = provenance();
    let before = registry.proxy(&base);
    registry.reset();
    assert!(registry.is_empty());

    let after = registry.proxy(&base);
    assert!(!Arc::ptr_eq(&before, &after));
    // types handed out before the reset keep working
    let value = before.call(&[Value::Int(1), Value::str("cache")]).unwrap();
    assert_eq!(value.get_attr("source").unwrap().as_str(), Some("cache"));
}

#[test]
fn registry_tracer_sees_each_synthesis_once() {
    let tracer = Arc::new(RecordingTracer::new());
    let registry = ProxyRegistry::with_tracer(tracer.clone());
    let base = provenance();
    registry.proxy(&base);
    registry.proxy(&base);
    let synthesized: Vec<_> = tracer
        .events()
        .into_iter()
        .filter(|event| matches!(event, TraceEvent::Synthesized { .. }))
        .collect();
    assert_eq!(synthesized.len(), 1);
}

#[test]
fn factory_curries_over_the_base() {
    let base = provenance();
    let factory = make_proxy_factory(&base);
    let ints = factory(Some(&builtins().int));
    let any = factory(None);
    assert_eq!(ints.name(), "Provenance[int]");
    assert_eq!(any.name(), "Provenance[object]");
    assert_eq!(factory(Some(&builtins().int)).hooks(), ints.hooks());
}

#[test]
fn registry_is_shareable_across_threads() {
    let registry = Arc::new(ProxyRegistry::new());
    let base = provenance();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let registry = registry.clone();
            let base = base.clone();
            std::thread::spawn(move || registry.wrap_with(Some(&builtins().int), &base, None))
        })
        .collect();
    let types: Vec<_> = handles.into_iter().map(|handle| handle.join().unwrap()).collect();
    assert!(types.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
}

#[test]
fn tracer_may_use_the_registry_during_synthesis() {
    let tracer = Arc::new(ReentrantTracer::default());
    let registry = Arc::new(ProxyRegistry::with_tracer(tracer.clone()));
    tracer.registry.set(Arc::downgrade(&registry)).unwrap();
    let base = provenance();

    registry.proxy(&base);
    registry.wrap_with(Some(&builtins().int), &base, None);
    registry.proxy(&base);

    assert_eq!(*tracer.cached_during_synthesis.lock(), vec![0, 1]);
    assert_eq!(registry.len(), 2);
}
