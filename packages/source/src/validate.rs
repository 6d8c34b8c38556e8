//! AQI validation.
//!
//! The validator is the single gate admitting a station into a result
//! set. A station whose AQI fails validation is discarded as a whole;
//! callers never substitute a default value.

/// Provider error sentinel. Any AQI at or above this value is rejected.
pub const AQI_ERROR_SENTINEL: f64 = 999.0;

/// Placeholder the provider uses when a station has no current reading.
const MISSING_SENTINEL: &str = "-";

/// Validates a raw AQI value.
///
/// Rules, in order:
///
/// 1. missing, `null`, or the `"-"` sentinel → invalid
/// 2. non-numeric after coercion → invalid
/// 3. negative → invalid
/// 4. `>= 999` (provider error sentinel) → invalid
///
/// Strings are coerced by integer-prefix parsing (`"57.8"` → 57,
/// `" 12abc"` → 12). Numbers are floored once they pass the range checks.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn validate_aqi(raw: Option<&serde_json::Value>) -> Option<u32> {
    let value = match raw? {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) if s == MISSING_SENTINEL => return None,
        serde_json::Value::String(s) => parse_int_prefix(s)?,
        _ => return None,
    };

    if !value.is_finite() || value < 0.0 || value >= AQI_ERROR_SENTINEL {
        return None;
    }

    Some(value.floor() as u32)
}

/// Parses the leading integer of `s`: optional whitespace, optional sign,
/// then the longest run of ASCII digits. Returns `None` if no digits
/// follow.
fn parse_int_prefix(s: &str) -> Option<f64> {
    let trimmed = s.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude: f64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn rejects_missing_and_sentinels() {
        assert_eq!(validate_aqi(None), None);
        assert_eq!(validate_aqi(Some(&json!(null))), None);
        assert_eq!(validate_aqi(Some(&json!("-"))), None);
    }

    #[test]
    fn rejects_non_numeric() {
        assert_eq!(validate_aqi(Some(&json!("abc"))), None);
        assert_eq!(validate_aqi(Some(&json!(""))), None);
        assert_eq!(validate_aqi(Some(&json!(true))), None);
        assert_eq!(validate_aqi(Some(&json!({ "v": 10 }))), None);
    }

    #[test]
    fn rejects_negative_values() {
        assert_eq!(validate_aqi(Some(&json!(-1))), None);
        assert_eq!(validate_aqi(Some(&json!(-0.5))), None);
        assert_eq!(validate_aqi(Some(&json!("-5"))), None);
    }

    #[test]
    fn rejects_error_sentinel_and_above() {
        assert_eq!(validate_aqi(Some(&json!(999))), None);
        assert_eq!(validate_aqi(Some(&json!("999"))), None);
        assert_eq!(validate_aqi(Some(&json!(1500))), None);
    }

    #[test]
    fn accepts_boundary_values() {
        assert_eq!(validate_aqi(Some(&json!(0))), Some(0));
        assert_eq!(validate_aqi(Some(&json!(998))), Some(998));
        assert_eq!(validate_aqi(Some(&json!("0"))), Some(0));
    }

    #[test]
    fn coerces_numeric_strings_by_prefix() {
        assert_eq!(validate_aqi(Some(&json!("152"))), Some(152));
        assert_eq!(validate_aqi(Some(&json!("57.8"))), Some(57));
        assert_eq!(validate_aqi(Some(&json!(" 12abc"))), Some(12));
        assert_eq!(validate_aqi(Some(&json!("+7"))), Some(7));
    }

    #[test]
    fn floors_fractional_numbers() {
        assert_eq!(validate_aqi(Some(&json!(998.7))), Some(998));
        assert_eq!(validate_aqi(Some(&json!(42.2))), Some(42));
    }

    #[test]
    fn rejection_is_stable_across_calls() {
        let raw = json!("-");
        for _ in 0..3 {
            assert_eq!(validate_aqi(Some(&raw)), None);
        }
    }
}
