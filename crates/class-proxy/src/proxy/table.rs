//! The per-type operator hook table.

use ahash::AHashSet;
use strum::{EnumCount, IntoEnumIterator};

use crate::{class::Class, hook::Hook, tracer::Tier};

/// Where a proxy type sends an operator hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookSource {
    /// The proxy base defines the hook; it runs with the proxy-base state as receiver.
    ProxyBase,
    /// The declared wrapped type defines the hook; it runs on the wrapped value.
    Wrapped,
    /// The wrapped type is unspecified; the wrapped value's runtime type is
    /// consulted on every call.
    WrappedRuntime,
    /// Neither side defines the hook (or one disables it): the operation is unsupported.
    Absent,
}

impl HookSource {
    /// The tier a dispatch through this source lands on, if any.
    #[must_use]
    pub fn tier(self) -> Option<Tier> {
        match self {
            Self::ProxyBase => Some(Tier::ProxyBase),
            Self::Wrapped | Self::WrappedRuntime => Some(Tier::Wrapped),
            Self::Absent => None,
        }
    }
}

/// One [`HookSource`] per [`Hook`], indexed by discriminant.
///
/// Generated once at synthesis from the fixed hook set, so two proxy types built
/// from the same classes always compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookTable {
    sources: [HookSource; Hook::COUNT],
}

impl HookTable {
    /// Builds the table for a proxy of `base` over `wrapped`.
    ///
    /// Base members inherited from `common` ancestors (shared with the wrapped
    /// type, at least `object`) do not count as overrides, otherwise
    /// `object.__repr__` would shadow every wrapped type's repr.
    pub(crate) fn generate(base: &Class, wrapped: Option<&Class>, common: &AHashSet<u64>) -> Self {
        let mut sources = [HookSource::Absent; Hook::COUNT];
        for hook in Hook::iter() {
            sources[hook as usize] = source_for(hook, base, wrapped, common);
        }
        Self { sources }
    }

    #[must_use]
    pub fn source(&self, hook: Hook) -> HookSource {
        self.sources[hook as usize]
    }

    /// Every hook with its source, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Hook, HookSource)> + '_ {
        Hook::iter().map(|hook| (hook, self.source(hook)))
    }

    /// Number of hooks that are not [`HookSource::Absent`].
    #[must_use]
    pub fn forwarded(&self) -> usize {
        self.sources.iter().filter(|source| **source != HookSource::Absent).count()
    }
}

fn source_for(hook: Hook, base: &Class, wrapped: Option<&Class>, common: &AHashSet<u64>) -> HookSource {
    let name = hook.name();
    if let Some(member) = base.lookup_where(name, |class| common.contains(&class.uid())) {
        return if member.is_disabled_hook() {
            HookSource::Absent
        } else {
            HookSource::ProxyBase
        };
    }
    match wrapped {
        None => HookSource::WrappedRuntime,
        Some(wrapped) => match wrapped.lookup(name) {
            Some(member) if !member.is_disabled_hook() => HookSource::Wrapped,
            _ => HookSource::Absent,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{class::common_ancestors, types::builtins};

    #[test]
    fn base_override_wins_and_object_members_do_not_count() {
        let base = Class::builder("Loud")
            .method("__str__", |_, _| Ok(crate::Value::str("LOUD")))
            .build();
        let int = &builtins().int;
        let table = HookTable::generate(&base, Some(int), &common_ancestors(&base, int));
        assert_eq!(table.source(Hook::Str), HookSource::ProxyBase);
        assert_eq!(table.source(Hook::Repr), HookSource::Wrapped);
        assert_eq!(table.source(Hook::Add), HookSource::Wrapped);
        assert_eq!(table.source(Hook::Len), HookSource::Absent);
    }

    #[test]
    fn disabled_wrapped_hook_is_absent() {
        let base = Class::builder("Tag").build();
        let list = &builtins().list;
        let table = HookTable::generate(&base, Some(list), &common_ancestors(&base, list));
        assert_eq!(table.source(Hook::Hash), HookSource::Absent);
        assert_eq!(table.source(Hook::Len), HookSource::Wrapped);
    }

    #[test]
    fn unspecified_wrapped_type_resolves_at_runtime() {
        let base = Class::builder("Tag").build();
        let object = &builtins().object;
        let table = HookTable::generate(&base, None, &common_ancestors(&base, object));
        assert!(table.iter().all(|(_, source)| source == HookSource::WrappedRuntime));
        assert_eq!(table.forwarded(), Hook::COUNT);
    }
}
