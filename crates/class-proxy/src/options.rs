//! Per-proxy-type configuration.

use std::sync::Arc;

use crate::tracer::{NoopTracer, ResolutionTracer};

/// Options accepted by [`synthesize_with`](crate::synthesize_with).
///
/// ```
/// use std::sync::Arc;
///
/// use class_proxy::{ProxyOptions, StderrTracer};
///
/// let options = ProxyOptions::new().name("Traced").tracer(Arc::new(StderrTracer::new()));
/// assert_eq!(options.name_override(), Some("Traced"));
/// ```
#[derive(Debug, Clone)]
pub struct ProxyOptions {
    name: Option<String>,
    tracer: Arc<dyn ResolutionTracer>,
}

impl ProxyOptions {
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: None,
            tracer: Arc::new(NoopTracer),
        }
    }

    /// Names the proxy type, replacing the default `Base[wrapped]`.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Installs a tracer that observes every instance of the proxy type.
    #[must_use]
    pub fn tracer(mut self, tracer: Arc<dyn ResolutionTracer>) -> Self {
        self.tracer = tracer;
        self
    }

    #[must_use]
    pub fn name_override(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn into_parts(self) -> (Option<String>, Arc<dyn ResolutionTracer>) {
        (self.name, self.tracer)
    }
}

impl Default for ProxyOptions {
    fn default() -> Self {
        Self::new()
    }
}
