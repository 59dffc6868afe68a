//! Settings store: defaults, environment overrides, merge-driven activation.
//!
//! # Module layout
//!
//! - **store** — The [`Settings`] store: typed getters, the default table,
//!   the append-only activation log, `options_for`.
//! - **env** — The fixed environment binding table and construction from
//!   the process environment.
//! - **merge** — The [`PendingChanges`] DSL and the merge/activation
//!   engine.

mod env;
mod merge;
mod store;

pub use env::{ENV_BINDINGS, EnvBinding};
pub use merge::{InstrumentRequest, Overrides, PendingChanges};
pub use store::{ActiveIntegration, InstrumentOptions, SettingKey, Settings};

#[cfg(test)]
impl Settings {
    /// Construct from an explicit variable list so tests never touch the
    /// process environment.
    pub(crate) fn from_vars(vars: &[(&str, &str)]) -> Result<Self, crate::error::ConfigError> {
        Self::from_env_with(|name| {
            vars.iter()
                .find(|(var, _)| *var == name)
                .map(|(_, value)| (*value).to_string())
        })
    }
}
