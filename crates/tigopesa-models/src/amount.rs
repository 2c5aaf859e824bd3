//! Serde helpers for monetary amounts.
//!
//! The provider writes amounts as bare integers (`1000`) and is not
//! consistent about quoting them in JSON. Amounts are held as `f64` and:
//!
//! * serialised without a fractional part when they are whole,
//! * deserialised from either a number or a numeric string.
//!
//! [`json`] is used for JSON messages and [`xml`] for XML messages, where
//! every element is text.

use std::fmt;

/// Render an amount the way the provider expects it (`1000`, `1000.5`).
///
/// ```
/// use tigopesa_models::amount::format_amount;
///
/// assert_eq!(format_amount(1000.0), "1000");
/// assert_eq!(format_amount(1000.5), "1000.5");
/// ```
pub fn format_amount(value: f64) -> String {
    match whole(value) {
        Some(n) => n.to_string(),
        None => value.to_string(),
    }
}

/// `Some(n)` when `value` has no fractional part and fits an `i64` exactly.
#[allow(clippy::cast_possible_truncation)]
fn whole(value: f64) -> Option<i64> {
    const LIMIT: f64 = 9_007_199_254_740_992.0; // 2^53
    (value.fract() == 0.0 && value.abs() <= LIMIT).then_some(value as i64)
}

fn ensure_finite<E: serde::ser::Error>(value: f64) -> Result<(), E> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(E::custom(format!("amount {value} is not a finite number")))
    }
}

fn parse_amount<E: serde::de::Error>(text: &str) -> Result<f64, E> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0.0);
    }
    text.parse::<f64>()
        .map_err(|_| E::custom(format!("invalid amount {text:?}")))
}

/// JSON amounts: numbers on the way out, numbers or strings on the way in.
pub mod json {
    use super::*;
    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    /// Serialise as an integer when whole, otherwise as a float.
    /// NaN and infinities are rejected.
    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        ensure_finite::<S::Error>(*value)?;
        match whole(*value) {
            Some(n) => serializer.serialize_i64(n),
            None => serializer.serialize_f64(*value),
        }
    }

    /// Accept `1000`, `1000.5`, `"1000"` or `"1000.00"`.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }

    struct AmountVisitor;

    impl Visitor<'_> for AmountVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number or a numeric string")
        }

        #[allow(clippy::cast_precision_loss)]
        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        #[allow(clippy::cast_precision_loss)]
        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            parse_amount(v)
        }

        fn visit_unit<E: de::Error>(self) -> Result<f64, E> {
            Ok(0.0)
        }
    }
}

/// XML amounts: element text in both directions.
pub mod xml {
    use super::*;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Serialise as element text, integer-formatted when whole.
    /// NaN and infinities are rejected.
    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        ensure_finite::<S::Error>(*value)?;
        serializer.serialize_str(&format_amount(*value))
    }

    /// Parse element text; an empty element reads as zero.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_amount(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct JsonAmount {
        #[serde(rename = "Amount", with = "json")]
        amount: f64,
    }

    #[test]
    fn format_whole_and_fractional() {
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(250_000.0), "250000");
        assert_eq!(format_amount(99.75), "99.75");
    }

    #[test]
    fn json_whole_amount_has_no_fraction() {
        let json = serde_json::to_string(&JsonAmount { amount: 1000.0 }).unwrap();
        assert_eq!(json, r#"{"Amount":1000}"#);
    }

    #[test]
    fn json_accepts_numbers_and_strings() {
        for raw in [r#"{"Amount":1500}"#, r#"{"Amount":1500.0}"#, r#"{"Amount":"1500.00"}"#] {
            let parsed: JsonAmount = serde_json::from_str(raw).unwrap();
            assert_eq!(parsed.amount, 1500.0, "{raw}");
        }
    }

    #[test]
    fn non_finite_amounts_fail_to_encode() {
        #[derive(Serialize)]
        struct XmlAmount {
            #[serde(rename = "AMOUNT", with = "xml")]
            amount: f64,
        }

        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let json = serde_json::to_string(&JsonAmount { amount: value });
            assert!(json.is_err(), "{value}: {json:?}");

            let mut buffer = String::new();
            let serializer =
                quick_xml::se::Serializer::with_root(&mut buffer, Some("COMMAND")).unwrap();
            let xml = XmlAmount { amount: value }.serialize(serializer);
            assert!(xml.is_err(), "{value}: {buffer}");
        }
    }

    #[test]
    fn json_rejects_non_numeric_string() {
        let result: Result<JsonAmount, _> = serde_json::from_str(r#"{"Amount":"ten"}"#);
        assert!(result.is_err());
    }
}
