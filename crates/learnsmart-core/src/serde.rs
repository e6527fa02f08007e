//! Deserializers for query-string parameters.
//!
//! HTML forms and the dashboard client send empty strings for unset filters
//! (`?instructor_id=&status=`), which must read as `None`.

use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

pub fn deserialize_optional_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => Uuid::parse_str(s.trim())
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Like [`deserialize_optional_uuid`] for any `FromStr` type (enums, booleans).
pub fn deserialize_optional_from_str<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s.trim().parse::<T>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Filters {
        #[serde(default, deserialize_with = "deserialize_optional_uuid")]
        owner: Option<Uuid>,
        #[serde(default, deserialize_with = "deserialize_optional_from_str")]
        cascade: Option<bool>,
    }

    #[test]
    fn test_empty_strings_are_none() {
        let f: Filters = serde_json::from_str(r#"{"owner":"","cascade":""}"#).unwrap();
        assert!(f.owner.is_none());
        assert!(f.cascade.is_none());
    }

    #[test]
    fn test_values_parse() {
        let id = Uuid::new_v4();
        let f: Filters =
            serde_json::from_str(&format!(r#"{{"owner":"{}","cascade":"true"}}"#, id)).unwrap();
        assert_eq!(f.owner, Some(id));
        assert_eq!(f.cascade, Some(true));
    }

    #[test]
    fn test_missing_fields_default() {
        let f: Filters = serde_json::from_str("{}").unwrap();
        assert!(f.owner.is_none());
        assert!(f.cascade.is_none());
    }

    #[test]
    fn test_invalid_uuid_errors() {
        assert!(serde_json::from_str::<Filters>(r#"{"owner":"nope"}"#).is_err());
    }
}
