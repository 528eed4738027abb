//! Parsing of `exiftool -json` output.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde_json::{Map, Value};

/// Pulls the value of `key` out of the JSON that exiftool printed for a
/// single file.
///
/// exiftool prints an array with one object per file. Tag names are
/// case-insensitive and requesting `-EXIF:Make` answers with a plain `Make`
/// key, so both sides are compared without any `Group:` prefix.
pub(crate) fn parse(output: &[u8], key: &str) -> Result<Option<String>> {
    let records: Vec<Map<String, Value>> = serde_json::from_slice(output).or_raise(|| ErrorKind::InvalidResponse)?;
    let Some(record) = records.into_iter().next() else {
        return Ok(None);
    };
    let wanted = unqualified(key);
    let value = record
        .into_iter()
        .find(|(name, _)| name != "SourceFile" && unqualified(name).eq_ignore_ascii_case(wanted))
        .map(|(_, value)| value);
    Ok(value.and_then(flatten))
}

fn unqualified(tag: &str) -> &str {
    tag.rsplit(':').next().unwrap_or(tag)
}

/// Flatten a JSON value into the string the matcher sees. Lists (keywords,
/// subjects) are joined with `", "`, the same separator exiftool uses when
/// printing them outside of JSON mode.
fn flatten(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let items: Vec<String> = items.into_iter().filter_map(flatten).collect();
            Some(items.join(", "))
        },
        object @ Value::Object(_) => Some(object.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const RESPONSE: &[u8] = br#"[{
  "SourceFile": "/photos/a.jpg",
  "Keywords": ["sunset", "beach"],
  "Make": "Canon",
  "ISO": 200,
  "Flash": false,
  "Description": ""
}]
"#;

    #[rstest]
    #[case("Keywords", Some("sunset, beach"))]
    #[case("keywords", Some("sunset, beach"))]
    #[case("EXIF:Make", Some("Canon"))]
    #[case("ISO", Some("200"))]
    #[case("Flash", Some("false"))]
    #[case("Description", Some(""))]
    #[case("Artist", None)]
    // SourceFile is bookkeeping, not metadata.
    #[case("SourceFile", None)]
    fn test_parse(#[case] key: &str, #[case] expected: Option<&str>) {
        assert_eq!(parse(RESPONSE, key).unwrap().as_deref(), expected);
    }

    #[test]
    fn test_parse_grouped_output() {
        let response = br#"[{"SourceFile": "a.jpg", "IPTC:Keywords": "city"}]"#;
        assert_eq!(parse(response, "Keywords").unwrap().as_deref(), Some("city"));
    }

    #[test]
    fn test_parse_empty_array() {
        assert_eq!(parse(b"[]", "Keywords").unwrap(), None);
    }

    #[test]
    fn test_parse_garbage() {
        let err = parse(b"Error: File not found - a.jpg", "Keywords").unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidResponse));
    }

    #[test]
    fn test_flatten_nested() {
        let value: Value = serde_json::from_str(r#"["a", null, 3, ["b"]]"#).unwrap();
        assert_eq!(flatten(value).as_deref(), Some("a, 3, b"));
    }
}
