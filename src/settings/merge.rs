//! Pending-changes DSL and the merge/activation engine.
//!
//! [`Settings::merge`] is the only mutation path after construction.
//! Activation hooks run with the store borrowed mutably, so a hook that
//! needs further configuration re-enters `merge` through the references it
//! is handed — nested on the same call stack, never parallel.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::registry::IntegrationRegistry;

use super::store::{ActiveIntegration, InstrumentOptions, Settings};

// ── DSL ──────────────────────────────────────────────────────────────────────

/// Setting overrides carried by one [`PendingChanges`] batch.
///
/// `None` entries are no-ops; they never clear an existing value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Overrides {
    pub enabled: Option<bool>,
    pub ruleset: Option<String>,
    /// Microseconds.
    pub waf_timeout: Option<u64>,
    pub waf_debug: Option<bool>,
    pub trace_rate_limit: Option<u64>,
}

/// A requested activation of one named integration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentRequest {
    pub name: String,
    #[serde(default)]
    pub options: InstrumentOptions,
}

/// A batch of pending configuration: overrides plus an ordered sequence of
/// instrument requests. Consumed exactly once by [`Settings::merge`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PendingChanges {
    overrides: Overrides,
    instruments: Vec<InstrumentRequest>,
}

impl PendingChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.overrides.enabled = Some(enabled);
        self
    }

    pub fn ruleset(mut self, ruleset: impl Into<String>) -> Self {
        self.overrides.ruleset = Some(ruleset.into());
        self
    }

    /// Microseconds.
    pub fn waf_timeout(mut self, micros: u64) -> Self {
        self.overrides.waf_timeout = Some(micros);
        self
    }

    pub fn waf_debug(mut self, debug: bool) -> Self {
        self.overrides.waf_debug = Some(debug);
        self
    }

    pub fn trace_rate_limit(mut self, per_second: u64) -> Self {
        self.overrides.trace_rate_limit = Some(per_second);
        self
    }

    /// Append an instrument request. Order is preserved through `merge`.
    pub fn instrument(mut self, name: impl Into<String>, options: InstrumentOptions) -> Self {
        self.instruments.push(InstrumentRequest {
            name: name.into(),
            options,
        });
        self
    }

    pub fn overrides(&self) -> &Overrides {
        &self.overrides
    }

    pub fn instruments(&self) -> &[InstrumentRequest] {
        &self.instruments
    }
}

// ── Engine ───────────────────────────────────────────────────────────────────

impl Settings {
    /// Apply a batch of pending changes.
    ///
    /// Overrides land first. If the store is disabled afterwards, no
    /// instrument is processed. Otherwise every request is appended to the
    /// activation log in order, and a descriptor that reports its target
    /// library loaded and version-compatible gets its activation hook
    /// invoked exactly once for that request.
    ///
    /// # Reentrancy
    ///
    /// A hook may call `merge` again through the `&mut Settings` it is
    /// handed. The nested call appends to the same activation log but
    /// iterates only its own batch, so the outer call's remaining requests
    /// are unaffected. Nothing here stops a hook that unconditionally
    /// re-feeds its own instrument; bounding that is the embedding
    /// configuration layer's responsibility.
    ///
    /// # Errors
    ///
    /// An unknown instrument name or a failing activation hook aborts the
    /// remainder of the batch. Earlier appends and activations stay in
    /// place.
    pub fn merge(
        &mut self,
        pending: PendingChanges,
        registry: &IntegrationRegistry,
    ) -> Result<(), ConfigError> {
        let PendingChanges {
            overrides,
            instruments,
        } = pending;
        self.apply_overrides(overrides);

        if !self.enabled {
            debug!(
                instruments = instruments.len(),
                "appsec disabled, skipping instrument activation"
            );
            return Ok(());
        }

        for request in instruments {
            let Some(integration) = registry.lookup(&request.name) else {
                return Err(ConfigError::UnknownIntegration(request.name));
            };

            // Appended before the hook runs; a nested merge must see this
            // record already in the log.
            self.active.push(ActiveIntegration {
                name: request.name.clone(),
                integration: integration.clone(),
                options: request.options.clone(),
            });

            let (loaded, compatible) = (integration.loaded(), integration.compatible());
            if loaded && compatible {
                info!(integration = %request.name, "activating integration");
                integration
                    .activate(&request.options, self, registry)
                    .map_err(|source| ConfigError::Activation {
                        integration: request.name.clone(),
                        source,
                    })?;
            } else {
                debug!(integration = %request.name, loaded, compatible, "activation skipped");
            }
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(enabled) = overrides.enabled {
            self.enabled = enabled;
        }
        if let Some(ruleset) = overrides.ruleset {
            self.ruleset = ruleset;
        }
        if let Some(waf_timeout) = overrides.waf_timeout {
            self.waf_timeout = waf_timeout;
        }
        if let Some(waf_debug) = overrides.waf_debug {
            self.waf_debug = waf_debug;
        }
        if let Some(trace_rate_limit) = overrides.trace_rate_limit {
            self.trace_rate_limit = trace_rate_limit;
        }
    }
}
