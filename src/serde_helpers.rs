// Tolerant field deserializers for records written by other releases
//
// Stored profiles and remote records may carry `null` or a differently
// typed value in any optional field. These helpers map such values to the
// field's default instead of rejecting the whole record.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// `null` or a mistyped value becomes `T::default()`.
pub fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Session counter; anything unreadable counts as the first session.
pub fn session_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_f64()
        .filter(|n| n.is_finite() && *n >= 1.0)
        .map(|n| n.min(u32::MAX as f64) as u32)
        .unwrap_or(1))
}

/// Quality score; fractional values are rounded and clamped to `0..=100`.
pub fn quality<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_f64()
        .filter(|n| n.is_finite())
        .map(|n| n.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    struct Sample {
        #[serde(deserialize_with = "super::or_default")]
        name: String,
        #[serde(deserialize_with = "super::or_default")]
        flag: bool,
        #[serde(deserialize_with = "super::or_default")]
        tags: Vec<String>,
        #[serde(deserialize_with = "super::session_count")]
        sessions: u32,
        #[serde(deserialize_with = "super::quality")]
        score: u8,
    }

    #[test]
    fn test_nulls_become_defaults() {
        let s: Sample = serde_json::from_str(
            r#"{"name":null,"flag":null,"tags":null,"sessions":null,"score":null}"#,
        )
        .unwrap();
        assert_eq!(s.name, "");
        assert!(!s.flag);
        assert!(s.tags.is_empty());
        assert_eq!(s.sessions, 1);
        assert_eq!(s.score, 0);
    }

    #[test]
    fn test_mistyped_values_become_defaults() {
        let s: Sample = serde_json::from_str(
            r#"{"name":42,"flag":"yes","tags":[1,2],"sessions":"many","score":"high"}"#,
        )
        .unwrap();
        assert_eq!(s.name, "");
        assert!(!s.flag);
        assert!(s.tags.is_empty());
        assert_eq!(s.sessions, 1);
        assert_eq!(s.score, 0);
    }

    #[test]
    fn test_numeric_coercion() {
        let s: Sample = serde_json::from_str(r#"{"sessions":7.0,"score":87.5}"#).unwrap();
        assert_eq!(s.sessions, 7);
        assert_eq!(s.score, 88);

        let s: Sample = serde_json::from_str(r#"{"sessions":0,"score":250}"#).unwrap();
        assert_eq!(s.sessions, 1);
        assert_eq!(s.score, 100);
    }

    #[test]
    fn test_well_formed_values_kept() {
        let s: Sample = serde_json::from_str(
            r#"{"name":"hunter","flag":true,"tags":["a"],"sessions":3,"score":72}"#,
        )
        .unwrap();
        assert_eq!(s.name, "hunter");
        assert!(s.flag);
        assert_eq!(s.tags, ["a"]);
        assert_eq!(s.sessions, 3);
        assert_eq!(s.score, 72);
    }
}
