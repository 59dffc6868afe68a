//! Crate-wide error types.

use thiserror::Error;

use crate::coerce::CoercionError;

/// Errors raised by store construction, lookups, and the merge engine.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable did not match its expected format.
    /// Fatal to store construction.
    #[error("environment variable {var}: {source}")]
    Env {
        var: &'static str,
        #[source]
        source: CoercionError,
    },

    /// The integration registry has no descriptor under this name.
    #[error("{0:?} is not a registered integration")]
    UnknownIntegration(String),

    /// An activation hook failed. Aborts the rest of the merge batch.
    #[error("activation of {integration} failed: {source}")]
    Activation {
        integration: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn env_error_names_variable_and_raw_value() {
        let e = ConfigError::Env {
            var: "APPSEC_ENABLED",
            source: CoercionError {
                expected: "boolean",
                raw: "maybe".into(),
            },
        };
        assert!(e.to_string().contains("APPSEC_ENABLED"));
        let source = e.source().expect("coercion source");
        assert!(source.to_string().contains("maybe"));
    }

    #[test]
    fn unknown_integration_display() {
        let e = ConfigError::UnknownIntegration("rack".into());
        assert!(e.to_string().contains("rack"));
        assert!(e.to_string().contains("not a registered integration"));
    }

    #[test]
    fn activation_error_display() {
        let e = ConfigError::Activation {
            integration: "sinatra".into(),
            source: "middleware insertion failed".into(),
        };
        assert!(e.to_string().contains("sinatra"));
        assert!(e.source().is_some());
    }
}
