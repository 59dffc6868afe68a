//! Coercion library — raw textual input to typed setting values.
//!
//! Every environment variable enters the store through [`Coercer::coerce`].
//! The set of coercion kinds is closed: each variant carries its parameters
//! (duration base, numeric kind) explicitly, so the binding table in
//! `settings::env` stays a plain data table with no function values in it.

use serde::Serialize;
use thiserror::Error;

// ── Values ───────────────────────────────────────────────────────────────────

/// A typed setting value produced by a coercion.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    Bool(bool),
    Str(String),
    Int(u64),
    Float(f64),
}

impl SettingValue {
    /// Short name of the carried kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            SettingValue::Bool(_) => "boolean",
            SettingValue::Str(_) => "string",
            SettingValue::Int(_) => "integer",
            SettingValue::Float(_) => "float",
        }
    }
}

// ── Errors ───────────────────────────────────────────────────────────────────

/// A raw input that does not match the expected coercion kind.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid {expected}: {raw:?}")]
pub struct CoercionError {
    /// The kind the caller expected (`"boolean"`, `"duration"`, …).
    pub expected: &'static str,
    /// The offending raw input; `"<absent>"` when no value was given.
    pub raw: String,
}

impl CoercionError {
    fn new(expected: &'static str, raw: Option<&str>) -> Self {
        Self {
            expected,
            raw: raw.unwrap_or("<absent>").to_string(),
        }
    }
}

// ── Duration parameters ──────────────────────────────────────────────────────

/// Time unit a duration setting is natively expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Seconds,
    Millis,
    Micros,
    Nanos,
}

impl TimeUnit {
    /// Nanoseconds per one unit.
    fn nanos(self) -> u128 {
        match self {
            TimeUnit::Seconds => 1_000_000_000,
            TimeUnit::Millis => 1_000_000,
            TimeUnit::Micros => 1_000,
            TimeUnit::Nanos => 1,
        }
    }
}

/// Whether a duration coercion yields an integer (truncating division) or a
/// floating value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    Integer,
    Float,
}

// ── Coercers ─────────────────────────────────────────────────────────────────

/// A coercion kind. Dispatch happens through [`Coercer::coerce`] only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercer {
    /// `1`/`true` → true, `0`/`false`/absent → false, case-insensitive.
    Boolean,
    /// Identity; absent input yields the empty string.
    Str,
    /// Leading run of decimal digits.
    Integer,
    /// Decimal integer with an optional unit suffix, rescaled to `base`.
    Duration { base: TimeUnit, numeric: NumericKind },
}

impl Coercer {
    /// Convert `raw` into a typed value, or fail with the raw input and the
    /// expected kind attached.
    ///
    /// Absent input (`None`) is meaningful only for `Boolean` (false) and
    /// `Str` (empty); the numeric kinds reject it.
    pub fn coerce(self, raw: Option<&str>) -> Result<SettingValue, CoercionError> {
        match self {
            Coercer::Boolean => match raw {
                Some(s) if s == "1" || s.eq_ignore_ascii_case("true") => {
                    Ok(SettingValue::Bool(true))
                }
                Some(s) if s == "0" || s.eq_ignore_ascii_case("false") => {
                    Ok(SettingValue::Bool(false))
                }
                None => Ok(SettingValue::Bool(false)),
                Some(_) => Err(CoercionError::new("boolean", raw)),
            },
            Coercer::Str => Ok(SettingValue::Str(raw.unwrap_or_default().to_string())),
            Coercer::Integer => {
                let s = raw.ok_or_else(|| CoercionError::new("integer", raw))?;
                let digits = leading_digits(s).ok_or_else(|| CoercionError::new("integer", raw))?;
                let n = digits
                    .parse::<u64>()
                    .map_err(|_| CoercionError::new("integer", raw))?;
                Ok(SettingValue::Int(n))
            }
            Coercer::Duration { base, numeric } => coerce_duration(base, numeric, raw),
        }
    }
}

/// The longest prefix of `s` made of ASCII digits, or `None` if it is empty.
fn leading_digits(s: &str) -> Option<&str> {
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    (end > 0).then(|| &s[..end])
}

/// Parse `<n>[h|m|s|ms|us|ns]` and rescale to `base`.
///
/// Two steps: the quantity is first converted to nanoseconds with fixed
/// ratios, then divided by the scale `base` implies. Every setting can
/// declare its own native unit while sharing this one parser. The
/// intermediate product is computed in `u128`; an integer result that does
/// not fit `u64` is a coercion failure.
fn coerce_duration(
    base: TimeUnit,
    numeric: NumericKind,
    raw: Option<&str>,
) -> Result<SettingValue, CoercionError> {
    let s = raw.ok_or_else(|| CoercionError::new("duration", raw))?;
    let digits = leading_digits(s).ok_or_else(|| CoercionError::new("duration", raw))?;
    let quantity = digits
        .parse::<u64>()
        .map_err(|_| CoercionError::new("duration", raw))?;

    let unit_nanos: u128 = match &s[digits.len()..] {
        "h" => 3_600_000_000_000,
        "m" => 60_000_000_000,
        "s" => 1_000_000_000,
        "ms" => 1_000_000,
        "us" => 1_000,
        "ns" => 1,
        "" => base.nanos(),
        _ => return Err(CoercionError::new("duration", raw)),
    };
    let nanos = u128::from(quantity) * unit_nanos;

    match numeric {
        NumericKind::Integer => {
            let scaled = nanos / base.nanos();
            let n = u64::try_from(scaled).map_err(|_| CoercionError::new("duration", raw))?;
            Ok(SettingValue::Int(n))
        }
        NumericKind::Float => Ok(SettingValue::Float(nanos as f64 / base.nanos() as f64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn duration_ns(raw: &str) -> Result<SettingValue, CoercionError> {
        Coercer::Duration {
            base: TimeUnit::Nanos,
            numeric: NumericKind::Integer,
        }
        .coerce(Some(raw))
    }

    fn duration_us(raw: &str) -> Result<SettingValue, CoercionError> {
        Coercer::Duration {
            base: TimeUnit::Micros,
            numeric: NumericKind::Integer,
        }
        .coerce(Some(raw))
    }

    #[test]
    fn boolean_truthy() {
        assert_eq!(
            Coercer::Boolean.coerce(Some("1")).unwrap(),
            SettingValue::Bool(true)
        );
        assert_eq!(
            Coercer::Boolean.coerce(Some("true")).unwrap(),
            SettingValue::Bool(true)
        );
        assert_eq!(
            Coercer::Boolean.coerce(Some("TRUE")).unwrap(),
            SettingValue::Bool(true)
        );
    }

    #[test]
    fn boolean_falsy() {
        assert_eq!(
            Coercer::Boolean.coerce(Some("0")).unwrap(),
            SettingValue::Bool(false)
        );
        assert_eq!(
            Coercer::Boolean.coerce(Some("False")).unwrap(),
            SettingValue::Bool(false)
        );
        assert_eq!(
            Coercer::Boolean.coerce(None).unwrap(),
            SettingValue::Bool(false)
        );
    }

    #[test]
    fn boolean_rejects_everything_else() {
        let err = Coercer::Boolean.coerce(Some("maybe")).unwrap_err();
        assert_eq!(err.expected, "boolean");
        assert_eq!(err.raw, "maybe");
    }

    #[test]
    fn string_is_identity() {
        assert_eq!(
            Coercer::Str.coerce(Some("recommended")).unwrap(),
            SettingValue::Str("recommended".into())
        );
        assert_eq!(Coercer::Str.coerce(None).unwrap(), SettingValue::Str(String::new()));
    }

    #[test]
    fn integer_takes_leading_digits() {
        assert_eq!(
            Coercer::Integer.coerce(Some("100")).unwrap(),
            SettingValue::Int(100)
        );
        assert_eq!(
            Coercer::Integer.coerce(Some("42abc")).unwrap(),
            SettingValue::Int(42)
        );
    }

    #[test]
    fn integer_rejects_non_digits() {
        assert!(Coercer::Integer.coerce(Some("abc")).is_err());
        assert!(Coercer::Integer.coerce(Some("")).is_err());
        assert!(Coercer::Integer.coerce(None).is_err());
    }

    #[test]
    fn duration_suffixes_to_nanoseconds() {
        assert_eq!(duration_ns("2h").unwrap(), SettingValue::Int(7_200_000_000_000));
        assert_eq!(duration_ns("2m").unwrap(), SettingValue::Int(120_000_000_000));
        assert_eq!(duration_ns("2s").unwrap(), SettingValue::Int(2_000_000_000));
        assert_eq!(duration_ns("2ms").unwrap(), SettingValue::Int(2_000_000));
        assert_eq!(duration_ns("2us").unwrap(), SettingValue::Int(2_000));
        assert_eq!(duration_ns("2ns").unwrap(), SettingValue::Int(2));
        // No suffix: the quantity is already in the base unit.
        assert_eq!(duration_ns("2").unwrap(), SettingValue::Int(2));
    }

    #[test]
    fn duration_rescales_to_base() {
        assert_eq!(duration_us("5000000ns").unwrap(), SettingValue::Int(5_000));
        assert_eq!(duration_us("1s").unwrap(), SettingValue::Int(1_000_000));
        assert_eq!(duration_us("5000").unwrap(), SettingValue::Int(5_000));
    }

    #[test]
    fn duration_integer_division_truncates() {
        // 999 ns is less than one microsecond.
        assert_eq!(duration_us("999ns").unwrap(), SettingValue::Int(0));
    }

    #[test]
    fn duration_float_keeps_fraction() {
        let v = Coercer::Duration {
            base: TimeUnit::Micros,
            numeric: NumericKind::Float,
        }
        .coerce(Some("1500ns"))
        .unwrap();
        assert_eq!(v, SettingValue::Float(1.5));
    }

    #[test]
    fn duration_rejects_bad_input() {
        assert!(duration_ns("").is_err());
        assert!(duration_ns("fast").is_err());
        assert!(duration_ns("5 s").is_err());
        assert!(duration_ns("5sec").is_err());
        assert!(
            Coercer::Duration {
                base: TimeUnit::Nanos,
                numeric: NumericKind::Integer
            }
            .coerce(None)
            .is_err()
        );
    }

    #[test]
    fn coercion_error_display_carries_raw_input() {
        let err = duration_ns("bogus").unwrap_err();
        assert_eq!(err.to_string(), "invalid duration: \"bogus\"");
    }
}
