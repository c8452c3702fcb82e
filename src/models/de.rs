// src/models/de.rs
// DOCUMENTATION: Lenient deserializers for form-submitted photo fields
// PURPOSE: EXIF values arrive either as JSON numbers or as strings typed into
// form inputs; an empty string means "no value"

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

fn number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid number: {:?}", s)))
        }
    }
}

/// `12.5`, `"12.5"`, `""` and `null` into `Option<f32>`
pub fn lenient_f32<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(number(deserializer)?.map(|n| n as f32))
}

/// Like [`lenient_f32`] but the value must be a whole number fitting in i32
pub fn lenient_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match number(deserializer)? {
        None => Ok(None),
        Some(n) if n.fract() == 0.0 && n >= i32::MIN as f64 && n <= i32::MAX as f64 => {
            Ok(Some(n as i32))
        }
        Some(n) => Err(de::Error::custom(format!("expected an integer, got {}", n))),
    }
}

/// Parse a capture timestamp.
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS` and the EXIF `YYYY:MM:DD HH:MM:SS`
/// form; naive values are taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S", "%Y:%m:%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

pub fn lenient_datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Option::<String>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(raw) => raw,
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    parse_timestamp(trimmed)
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {:?}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[derive(Deserialize)]
    struct Exif {
        #[serde(default, deserialize_with = "lenient_f32")]
        f_number: Option<f32>,
        #[serde(default, deserialize_with = "lenient_i32")]
        iso: Option<i32>,
        #[serde(default, deserialize_with = "lenient_datetime")]
        taken: Option<DateTime<Utc>>,
    }

    fn parse(json: &str) -> Result<Exif, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn test_numbers_and_strings() {
        let exif = parse(r#"{"f_number": 2.8, "iso": "400"}"#).unwrap();
        assert_eq!(exif.f_number, Some(2.8));
        assert_eq!(exif.iso, Some(400));

        let exif = parse(r#"{"f_number": "1.4", "iso": 100}"#).unwrap();
        assert_eq!(exif.f_number, Some(1.4));
        assert_eq!(exif.iso, Some(100));
    }

    #[test]
    fn test_empty_and_missing_are_absent() {
        let exif = parse(r#"{"f_number": "", "iso": null, "taken": ""}"#).unwrap();
        assert_eq!(exif.f_number, None);
        assert_eq!(exif.iso, None);
        assert_eq!(exif.taken, None);

        let exif = parse("{}").unwrap();
        assert_eq!(exif.f_number, None);
        assert_eq!(exif.iso, None);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse(r#"{"f_number": "fast"}"#).is_err());
        assert!(parse(r#"{"iso": "100.5"}"#).is_err());
        assert!(parse(r#"{"taken": "yesterday"}"#).is_err());
    }

    #[test]
    fn test_timestamp_formats() {
        let rfc = parse_timestamp("2024-05-01T10:30:00+02:00").unwrap();
        assert_eq!(rfc.hour(), 8);

        let exif = parse_timestamp("2023:11:04 17:45:12").unwrap();
        assert_eq!((exif.year(), exif.month(), exif.day()), (2023, 11, 4));
        assert_eq!(exif.minute(), 45);

        assert!(parse_timestamp("2024-05-01T10:30:00").is_some());
        assert!(parse_timestamp("not a date").is_none());
    }
}
