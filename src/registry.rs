//! Integration registry — named descriptors with activation hooks.
//!
//! The registry owns the descriptors. The settings store borrows it for
//! lookups and shares descriptor handles into its activation log; it never
//! takes ownership.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::settings::{InstrumentOptions, Settings};

/// Boxed error an activation hook may fail with. Hook failures are not
/// handled by this crate; they propagate out of [`Settings::merge`].
pub type ActivationError = Box<dyn std::error::Error + Send + Sync>;

/// Descriptor for one pluggable integration.
///
/// `activate` receives the settings store and the registry itself so a hook
/// may apply further configuration — including calling [`Settings::merge`]
/// again — before the outer merge returns.
pub trait Integration: Send + Sync {
    /// Whether the target library is present in the process.
    fn loaded(&self) -> bool;

    /// Whether the loaded version is one this integration supports.
    fn compatible(&self) -> bool;

    /// Activation hook, invoked once per enabled instrument request.
    ///
    /// Idempotency is not guaranteed by the caller: a hook requested twice
    /// runs twice.
    fn activate(
        &self,
        options: &InstrumentOptions,
        settings: &mut Settings,
        registry: &IntegrationRegistry,
    ) -> Result<(), ActivationError>;
}

/// Name → descriptor table.
#[derive(Default, Clone)]
pub struct IntegrationRegistry {
    entries: HashMap<String, Arc<dyn Integration>>,
}

impl IntegrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `integration` under `name`. Re-registration replaces the
    /// previous descriptor.
    pub fn register(&mut self, name: impl Into<String>, integration: Arc<dyn Integration>) {
        let name = name.into();
        if self.entries.insert(name.clone(), integration).is_some() {
            warn!(%name, "integration re-registered, previous descriptor replaced");
        }
    }

    /// Look up a descriptor by name.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Integration>> {
        self.entries.get(name).cloned()
    }

    /// Registered names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl fmt::Debug for IntegrationRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegrationRegistry")
            .field("names", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Inert;

    impl Integration for Inert {
        fn loaded(&self) -> bool {
            false
        }

        fn compatible(&self) -> bool {
            false
        }

        fn activate(
            &self,
            _options: &InstrumentOptions,
            _settings: &mut Settings,
            _registry: &IntegrationRegistry,
        ) -> Result<(), ActivationError> {
            Ok(())
        }
    }

    #[test]
    fn lookup_finds_registered_descriptor() {
        let mut registry = IntegrationRegistry::new();
        registry.register("rack", Arc::new(Inert));
        assert!(registry.lookup("rack").is_some());
        assert!(registry.lookup("rails").is_none());
    }

    #[test]
    fn re_registration_replaces() {
        let mut registry = IntegrationRegistry::new();
        registry.register("rack", Arc::new(Inert));
        registry.register("rack", Arc::new(Inert));
        assert_eq!(registry.names().count(), 1);
    }
}
