//! Environment bindings — fixed table of variable → (key, coercion).
//!
//! Applied once, at store construction. An absent variable never overwrites
//! a default; a present one is coerced and must parse, or construction
//! aborts with the variable name and raw value attached.

use std::env;

use tracing::debug;

use crate::coerce::{Coercer, NumericKind, TimeUnit};
use crate::error::ConfigError;

use super::store::{SettingKey, Settings};

/// One environment binding.
#[derive(Debug, Clone, Copy)]
pub struct EnvBinding {
    pub var: &'static str,
    pub key: SettingKey,
    pub coercer: Coercer,
}

/// The full binding table. Keys are disjoint, so application order across
/// bindings does not matter.
pub const ENV_BINDINGS: &[EnvBinding] = &[
    EnvBinding {
        var: "APPSEC_ENABLED",
        key: SettingKey::Enabled,
        coercer: Coercer::Boolean,
    },
    EnvBinding {
        var: "APPSEC_RULES",
        key: SettingKey::Ruleset,
        coercer: Coercer::Str,
    },
    EnvBinding {
        var: "APPSEC_WAF_TIMEOUT",
        key: SettingKey::WafTimeout,
        coercer: Coercer::Duration {
            base: TimeUnit::Micros,
            numeric: NumericKind::Integer,
        },
    },
    EnvBinding {
        var: "APPSEC_WAF_DEBUG",
        key: SettingKey::WafDebug,
        coercer: Coercer::Boolean,
    },
    EnvBinding {
        var: "APPSEC_TRACE_RATE_LIMIT",
        key: SettingKey::TraceRateLimit,
        coercer: Coercer::Integer,
    },
];

impl Settings {
    /// Construct from the default table overlaid with process environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// A variable that fails coercion aborts construction with
    /// [`ConfigError::Env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_with(|var| env::var(var).ok())
    }

    /// Construction with an injectable variable lookup.
    /// Tests pass lookups directly instead of mutating process env vars.
    pub(crate) fn from_env_with(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut settings = Settings::default();
        for binding in ENV_BINDINGS {
            let Some(raw) = lookup(binding.var) else {
                continue;
            };
            let value = binding
                .coercer
                .coerce(Some(&raw))
                .map_err(|source| ConfigError::Env {
                    var: binding.var,
                    source,
                })?;
            debug!(var = binding.var, ?value, "environment override");
            settings
                .apply(binding.key, value)
                .map_err(|source| ConfigError::Env {
                    var: binding.var,
                    source,
                })?;
        }
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_environment_yields_defaults() {
        let settings = Settings::from_vars(&[]).unwrap();
        assert!(!settings.enabled());
        assert_eq!(settings.ruleset(), "recommended");
        assert_eq!(settings.waf_timeout(), 5_000);
        assert!(!settings.waf_debug());
        assert_eq!(settings.trace_rate_limit(), 100);
    }

    #[test]
    fn each_binding_overrides_its_key() {
        let settings = Settings::from_vars(&[
            ("APPSEC_ENABLED", "true"),
            ("APPSEC_RULES", "strict"),
            ("APPSEC_WAF_TIMEOUT", "10ms"),
            ("APPSEC_WAF_DEBUG", "1"),
            ("APPSEC_TRACE_RATE_LIMIT", "250"),
        ])
        .unwrap();
        assert!(settings.enabled());
        assert_eq!(settings.ruleset(), "strict");
        // 10 ms in the native microsecond unit.
        assert_eq!(settings.waf_timeout(), 10_000);
        assert!(settings.waf_debug());
        assert_eq!(settings.trace_rate_limit(), 250);
    }

    #[test]
    fn unrelated_variables_are_ignored() {
        let settings = Settings::from_vars(&[("APPSEC_UNKNOWN", "1"), ("PATH", "/bin")]).unwrap();
        assert!(!settings.enabled());
    }

    #[test]
    fn coercion_failure_is_fatal_and_names_the_variable() {
        let err = Settings::from_vars(&[("APPSEC_ENABLED", "maybe")]).unwrap_err();
        match err {
            ConfigError::Env { var, source } => {
                assert_eq!(var, "APPSEC_ENABLED");
                assert_eq!(source.raw, "maybe");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_duration_reports_raw_value() {
        let err = Settings::from_vars(&[("APPSEC_WAF_TIMEOUT", "soon")]).unwrap_err();
        assert!(err.to_string().contains("APPSEC_WAF_TIMEOUT"));
        assert!(format!("{err:?}").contains("soon"));
    }
}
