//! Resolution tracing infrastructure.
//!
//! Proxy types never log on their own. A [`ResolutionTracer`] installed through
//! [`ProxyOptions::tracer`](crate::ProxyOptions::tracer) observes synthesis,
//! attribute resolution and hook dispatch instead.
//!
//! | Tracer | Purpose |
//! |--------|---------|
//! | [`NoopTracer`] | No-op (default) |
//! | [`StderrTracer`] | Human-readable resolution log to stderr |
//! | [`RecordingTracer`] | Full event recording for assertions or post-mortem |
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use class_proxy::{Class, ProxyOptions, RecordingTracer, Value, synthesize_with};
//!
//! let base = Class::builder("Tagged").build();
//! let tracer = Arc::new(RecordingTracer::new());
//! let tagged = synthesize_with(None, &base, ProxyOptions::new().tracer(tracer.clone()));
//! let value = tagged.call(&[Value::str("hello")]).unwrap();
//! value.get_attr("upper").unwrap();
//! assert_eq!(tracer.events().len(), 2);
//! ```

use parking_lot::Mutex;
use strum::{Display, IntoStaticStr};

use crate::hook::Hook;

/// The lookup tier that resolved an attribute or hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr)]
pub enum Tier {
    /// The embedded proxy-base state and the proxy base's members.
    #[strum(serialize = "base")]
    ProxyBase,
    /// The wrapped value.
    #[strum(serialize = "wrapped")]
    Wrapped,
}

/// Trace event emitted while synthesizing or resolving through a proxy type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// A proxy type was synthesized.
    Synthesized {
        /// Name of the new proxy type.
        proxy: String,
        /// Number of hooks with a forwarding entry (everything not absent).
        forwarded_hooks: usize,
    },
    /// An instance attribute lookup found `attr` on `tier`.
    AttrResolved { proxy: String, attr: String, tier: Tier },
    /// An instance attribute lookup failed on both tiers (or hit a deleted name).
    AttrMissing { proxy: String, attr: String },
    /// An operator hook was dispatched.
    HookDispatched {
        proxy: String,
        hook: Hook,
        /// `None` when neither tier implements the hook.
        tier: Option<Tier>,
    },
}

/// Trait for resolution tracing.
///
/// All methods have default no-op implementations, so [`NoopTracer`] is empty
/// and implementations only override the hooks they care about. Tracers are
/// shared by every instance of a proxy type, possibly across threads, so the
/// hooks take `&self`.
pub trait ResolutionTracer: std::fmt::Debug + Send + Sync {
    /// Called once when a proxy type is synthesized.
    fn on_synthesize(&self, _proxy: &str, _forwarded_hooks: usize) {}

    /// Called when an instance attribute lookup succeeds.
    fn on_attr_resolved(&self, _proxy: &str, _attr: &str, _tier: Tier) {}

    /// Called when an instance attribute lookup fails.
    fn on_attr_missing(&self, _proxy: &str, _attr: &str) {}

    /// Called before an operator hook runs.
    fn on_hook(&self, _proxy: &str, _hook: Hook, _tier: Option<Tier>) {}
}

// ============================================================================
// NoopTracer: production default
// ============================================================================

/// A tracer that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl ResolutionTracer for NoopTracer {}

// ============================================================================
// StderrTracer: human-readable resolution log
// ============================================================================

/// Tracer that prints a human-readable resolution log to stderr.
///
/// Output format:
/// ```text
///   +++ SYNTHESIZE Tagged[int]      hooks=37
///   ... ATTR  Tagged[int].bit_length -> wrapped
///   ... ATTR  Tagged[int].missing    -> not found
///   >>> HOOK  Tagged[int].__lt__     -> wrapped
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrTracer;

impl StderrTracer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ResolutionTracer for StderrTracer {
    fn on_synthesize(&self, proxy: &str, forwarded_hooks: usize) {
        eprintln!("  +++ SYNTHESIZE {proxy:<16} hooks={forwarded_hooks}");
    }

    fn on_attr_resolved(&self, proxy: &str, attr: &str, tier: Tier) {
        eprintln!("  ... ATTR  {proxy}.{attr:<16} -> {tier}");
    }

    fn on_attr_missing(&self, proxy: &str, attr: &str) {
        eprintln!("  ... ATTR  {proxy}.{attr:<16} -> not found");
    }

    fn on_hook(&self, proxy: &str, hook: Hook, tier: Option<Tier>) {
        let hook = hook.name();
        match tier {
            Some(tier) => eprintln!("  >>> HOOK  {proxy}.{hook:<16} -> {tier}"),
            None => eprintln!("  >>> HOOK  {proxy}.{hook:<16} -> unsupported"),
        }
    }
}

// ============================================================================
// RecordingTracer: full event recording
// ============================================================================

/// Tracer that records every event.
///
/// Allocates per event, so use it for tests and for debugging specific
/// resolution issues.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    events: Mutex<Vec<TraceEvent>>,
}

impl RecordingTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the events recorded so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().clone()
    }

    /// Discards every recorded event.
    pub fn clear(&self) {
        self.events.lock().clear();
    }

    fn record(&self, event: TraceEvent) {
        self.events.lock().push(event);
    }
}

impl ResolutionTracer for RecordingTracer {
    fn on_synthesize(&self, proxy: &str, forwarded_hooks: usize) {
        self.record(TraceEvent::Synthesized {
            proxy: proxy.to_owned(),
            forwarded_hooks,
        });
    }

    fn on_attr_resolved(&self, proxy: &str, attr: &str, tier: Tier) {
        self.record(TraceEvent::AttrResolved {
            proxy: proxy.to_owned(),
            attr: attr.to_owned(),
            tier,
        });
    }

    fn on_attr_missing(&self, proxy: &str, attr: &str) {
        self.record(TraceEvent::AttrMissing {
            proxy: proxy.to_owned(),
            attr: attr.to_owned(),
        });
    }

    fn on_hook(&self, proxy: &str, hook: Hook, tier: Option<Tier>) {
        self.record(TraceEvent::HookDispatched {
            proxy: proxy.to_owned(),
            hook,
            tier,
        });
    }
}
