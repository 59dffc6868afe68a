//! Typed, environment-driven configuration core for the AppSec agent.
//!
//! Defaults are layered under process-environment overrides when the store
//! is constructed; user configuration arrives afterwards as
//! [`PendingChanges`] batches consumed by [`Settings::merge`], which also
//! drives one-time activation of registered integrations.
//!
//! The store is an explicit value — construct it once, pass it by
//! reference. There is no global state and no internal locking; callers
//! sharing a store across threads must serialize configuration operations
//! themselves. The one form of nesting the engine supports is reentrancy:
//! an activation hook may apply further configuration through the store
//! reference it is handed, before the outer merge returns.
//!
//! # Module layout
//!
//! - **coerce** — Pure conversions from raw text to typed setting values
//!   (`boolean`, `string`, `integer`, `duration` with unit rescaling).
//! - **settings** — The [`Settings`] store: the default table, environment
//!   bindings, the [`PendingChanges`] DSL, and the merge/activation engine.
//! - **registry** — The [`IntegrationRegistry`] of named [`Integration`]
//!   descriptors and their activation hooks.
//! - **error** — [`ConfigError`].

pub mod coerce;
pub mod error;
pub mod registry;
pub mod settings;

pub use coerce::{Coercer, CoercionError, NumericKind, SettingValue, TimeUnit};
pub use error::ConfigError;
pub use registry::{ActivationError, Integration, IntegrationRegistry};
pub use settings::{
    ActiveIntegration, ENV_BINDINGS, EnvBinding, InstrumentOptions, InstrumentRequest, Overrides,
    PendingChanges, SettingKey, Settings,
};
