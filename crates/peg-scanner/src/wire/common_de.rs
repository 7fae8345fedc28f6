use serde::{Deserialize, Deserializer};

/// JSON backends are loose about numbers. Depending on the revision, a ratio can
/// arrive as any of:
///
/// ```text
/// "pe_ratio": 28.4
/// "pe_ratio": "28.40"      <- decimal serializers
/// "pe_ratio": null
/// ```
///
/// `de_opt_f64` maps numbers and numeric strings to `Some`, and `null`, blank or
/// non-numeric strings (e.g. `"N/A"`) to `None`.
pub fn de_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: serde_json::Value = Deserialize::deserialize(deserializer)?;
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(num) => Ok(num.as_f64()),
        serde_json::Value::String(s) => Ok(s.trim().parse::<f64>().ok().filter(|v| v.is_finite())),
        _ => Err(serde::de::Error::custom("expected a number, numeric string or null")),
    }
}

/// Integers (timestamps, volumes) can also come back as floats from the GraphQL
/// revision, e.g. `"timestampMs": 1700000000000.0`. Floats are truncated.
pub fn de_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: serde_json::Value = Deserialize::deserialize(deserializer)?;
    match value {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(num) => Ok(num
            .as_i64()
            .or_else(|| num.as_f64().filter(|v| v.is_finite()).map(|v| v as i64))),
        serde_json::Value::String(s) => {
            let s = s.trim();
            Ok(s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v as i64)))
        }
        _ => Err(serde::de::Error::custom("expected an integer, numeric string or null")),
    }
}

/// As [`de_opt_i64`], with `null` read as `0`.
pub fn de_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    de_opt_i64(deserializer).map(Option::unwrap_or_default)
}

/// `null` becomes `T::default()`, e.g. `"url": null` -> `""`, `"news": null` -> `[]`.
pub fn de_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, Default)]
    #[serde(default)]
    struct Probe {
        #[serde(deserialize_with = "de_opt_f64")]
        ratio: Option<f64>,
        #[serde(deserialize_with = "de_i64")]
        ts: i64,
        #[serde(deserialize_with = "de_null_default")]
        text: String,
    }

    fn probe(json: &str) -> Probe {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn ratios() {
        assert_eq!(probe(r#"{"ratio": 1.25}"#).ratio, Some(1.25));
        assert_eq!(probe(r#"{"ratio": "28.40"}"#).ratio, Some(28.4));
        assert_eq!(probe(r#"{"ratio": null}"#).ratio, None);
        assert_eq!(probe(r#"{"ratio": "N/A"}"#).ratio, None);
        assert_eq!(probe(r#"{}"#).ratio, None);
        assert_eq!(probe(r#"{"ratio": 0}"#).ratio, Some(0.0));
    }

    #[test]
    fn integers() {
        assert_eq!(probe(r#"{"ts": 1700000000000}"#).ts, 1_700_000_000_000);
        assert_eq!(probe(r#"{"ts": 1700000000000.0}"#).ts, 1_700_000_000_000);
        assert_eq!(probe(r#"{"ts": "42"}"#).ts, 42);
        assert_eq!(probe(r#"{"ts": null}"#).ts, 0);
    }

    #[test]
    fn null_strings() {
        assert_eq!(probe(r#"{"text": null}"#).text, "");
        assert_eq!(probe(r#"{"text": "Reuters"}"#).text, "Reuters");
    }

    #[test]
    fn booleans_are_rejected() {
        assert!(serde_json::from_str::<Probe>(r#"{"ratio": true}"#).is_err());
    }
}
