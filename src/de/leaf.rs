//
//  de/leaf.rs -- text conversion for LLSD leaf elements.
//
//  Library for serializing and de-serializing data in
//  Linden Lab Structured Data format.
//
//  Format documentation is at http://wiki.secondlife.com/wiki/LLSD
//
//  Every leaf type has one empty value, used when the element has no text.
//
//  Animats
//  October, 2026.
//  License: LGPL.
//
use crate::error::{LLSDError, Result};
use crate::tag::LLSDTag;
use crate::tree::XmlElement;
use crate::LLSDValue;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// What to do with leaf text that does not parse as its type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafPolicy {
    /// Replace it with the type's empty value, as older LLSD readers do.
    #[default]
    Lenient,
    /// Fail with `LLSDError::MalformedLeafValue`.
    Strict,
}

/// Convert one leaf element to a value.
/// Unrecognized element names pass their text through as a string.
pub fn convert_leaf(element: &XmlElement, policy: LeafPolicy) -> Result<LLSDValue> {
    let text = element.text.as_deref();
    match LLSDTag::from_name(&element.name) {
        Some(tag) if !tag.is_container() => {
            convert(tag, text, element.attribute("encoding"), policy)
        }
        _ => Ok(passthrough(text)),
    }
}

fn convert(
    tag: LLSDTag,
    text: Option<&str>,
    encoding: Option<&str>,
    policy: LeafPolicy,
) -> Result<LLSDValue> {
    let Some(text) = text else {
        return Ok(empty_value(tag));
    };
    let leaf = Leaf { tag, text, policy };
    Ok(match tag {
        LLSDTag::Undef => LLSDValue::Undefined,
        LLSDTag::Integer => LLSDValue::Integer(leaf.coerce(parse_integer(text), 0)?),
        LLSDTag::Real => LLSDValue::Real(leaf.coerce(parse_real(text), 0.0)?),
        LLSDTag::Boolean => LLSDValue::Boolean(match policy {
            LeafPolicy::Lenient => text.trim() != "false",
            LeafPolicy::Strict => leaf.coerce(parse_boolean(text), false)?,
        }),
        LLSDTag::String => LLSDValue::String(text.to_string()),
        LLSDTag::Date => LLSDValue::Date(leaf.coerce(parse_date(text), DateTime::<Utc>::default())?),
        LLSDTag::UUID => LLSDValue::UUID(leaf.coerce(
            Uuid::parse_str(text.trim()).map_err(|e| e.to_string()),
            Uuid::nil(),
        )?),
        LLSDTag::URI => LLSDValue::URI(text.to_string()),
        LLSDTag::Binary => {
            match leaf.coerce(parse_binary(text, encoding, policy).map(Some), None)? {
                Some(base64_text) => LLSDValue::Binary(base64_text),
                None => LLSDValue::Undefined,
            }
        }
        LLSDTag::Llsd | LLSDTag::Key | LLSDTag::Map | LLSDTag::Array => passthrough(Some(text)),
    })
}

/// Value of a leaf element with no text.
fn empty_value(tag: LLSDTag) -> LLSDValue {
    match tag {
        LLSDTag::Integer => LLSDValue::Integer(0),
        LLSDTag::Real => LLSDValue::Real(0.0),
        LLSDTag::Boolean => LLSDValue::Boolean(false),
        LLSDTag::String => LLSDValue::String(String::new()),
        LLSDTag::Date => LLSDValue::Date(DateTime::<Utc>::default()), // the epoch
        LLSDTag::UUID => LLSDValue::UUID(Uuid::nil()),
        //  An empty uri or binary is absence, not an empty string.
        _ => LLSDValue::Undefined,
    }
}

fn passthrough(text: Option<&str>) -> LLSDValue {
    match text {
        Some(text) => LLSDValue::String(text.to_string()),
        None => LLSDValue::Undefined,
    }
}

/// Leaf text being converted, for coercion and error reporting.
struct Leaf<'a> {
    tag: LLSDTag,
    text: &'a str,
    policy: LeafPolicy,
}

impl Leaf<'_> {
    fn coerce<T>(&self, parsed: std::result::Result<T, String>, empty: T) -> Result<T> {
        match parsed {
            Ok(v) => Ok(v),
            Err(reason) if self.policy == LeafPolicy::Lenient => {
                debug!(tag = %self.tag, text = self.text, %reason, "malformed leaf value replaced by its empty value");
                Ok(empty)
            }
            Err(reason) => Err(LLSDError::MalformedLeafValue {
                tag: self.tag.to_string(),
                text: self.text.to_string(),
                reason,
            }),
        }
    }
}

fn parse_integer(s: &str) -> std::result::Result<i32, String> {
    s.trim().parse::<i32>().map_err(|e| e.to_string())
}

//  SL writes "nan"; Rust wants "NaN".
fn parse_real(s: &str) -> std::result::Result<f64, String> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    s.parse::<f64>().map_err(|e| e.to_string())
}

//  Strict boolean. LSL allows 0, 0.0, false, 1, 1.0, true.
fn parse_boolean(s: &str) -> std::result::Result<bool, String> {
    match s.trim() {
        "true" | "1" | "1.0" => Ok(true),
        "false" | "0" | "0.0" => Ok(false),
        other => Err(format!("{:?} is not a boolean", other)),
    }
}

/// Parse ISO 8601 date. RFC 3339 with any offset, the signed years past 9999
/// that the writer emits, or a bare calendar date.
fn parse_date(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    let s = s.trim();
    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(e) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%SZ")
            .ok()
            .or_else(|| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
            .map(|naive| Utc.from_utc_datetime(&naive))
            .ok_or_else(|| e.to_string()),
    }
}

/// Binary payload as base64 text.
/// "Parsers must support base64 encoding. Parsers may support base16 and base85."
/// Base64 text is kept as written; the other encodings are re-expressed as base64.
fn parse_binary(
    s: &str,
    encoding: Option<&str>,
    policy: LeafPolicy,
) -> std::result::Result<String, String> {
    let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = match encoding.unwrap_or("base64") {
        "base64" => {
            if policy == LeafPolicy::Strict {
                STANDARD.decode(&compact).map_err(|e| e.to_string())?;
            }
            return Ok(s.to_string());
        }
        "base16" => hex::decode(&compact).map_err(|e| e.to_string())?,
        "base85" => ascii85::decode(&compact).map_err(|e| format!("base 85 decode error: {:?}", e))?,
        other => return Err(format!("unknown encoding: <binary encoding=\"{}\">", other)),
    };
    Ok(STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, text: Option<&str>, policy: LeafPolicy) -> Result<LLSDValue> {
        let element = XmlElement {
            name: name.to_string(),
            text: text.map(str::to_string),
            ..XmlElement::default()
        };
        convert_leaf(&element, policy)
    }

    fn lenient(name: &str, text: Option<&str>) -> LLSDValue {
        leaf(name, text, LeafPolicy::Lenient).unwrap()
    }

    #[test]
    fn test_empty_values() {
        assert_eq!(lenient("integer", None), LLSDValue::Integer(0));
        assert_eq!(lenient("real", None), LLSDValue::Real(0.0));
        assert_eq!(lenient("boolean", None), LLSDValue::Boolean(false));
        assert_eq!(lenient("string", None), LLSDValue::String(String::new()));
        assert_eq!(lenient("uuid", None), LLSDValue::UUID(Uuid::nil()));
        assert_eq!(lenient("date", None), LLSDValue::Date(DateTime::<Utc>::default()));
        assert_eq!(lenient("uri", None), LLSDValue::Undefined);
        assert_eq!(lenient("binary", None), LLSDValue::Undefined);
        assert_eq!(lenient("undef", None), LLSDValue::Undefined);
        assert_eq!(lenient("mystery", None), LLSDValue::Undefined);
    }

    #[test]
    fn test_lenient_coercion() {
        assert_eq!(lenient("integer", Some("forty-two")), LLSDValue::Integer(0));
        assert_eq!(lenient("integer", Some("99999999999")), LLSDValue::Integer(0));
        assert_eq!(lenient("real", Some("1.2.3")), LLSDValue::Real(0.0));
        assert_eq!(lenient("date", Some("yesterday")), LLSDValue::Date(DateTime::<Utc>::default()));
        assert_eq!(lenient("uuid", Some("not-a-uuid")), LLSDValue::UUID(Uuid::nil()));
        assert_eq!(lenient("binary", Some("zz")), LLSDValue::Binary("zz".to_string()));
    }

    #[test]
    fn test_strict_rejects() {
        for (name, text) in [
            ("integer", "forty-two"),
            ("real", "1.2.3"),
            ("boolean", "yes"),
            ("date", "yesterday"),
            ("uuid", "not-a-uuid"),
            ("binary", "!!!"),
        ] {
            match leaf(name, Some(text), LeafPolicy::Strict) {
                Err(LLSDError::MalformedLeafValue { tag, text: raw, .. }) => {
                    assert_eq!(tag, name);
                    assert_eq!(raw, text);
                }
                other => panic!("<{}>{}</{}> gave {:?}", name, text, name, other),
            }
        }
        //  Empty elements are never malformed.
        assert_eq!(leaf("integer", None, LeafPolicy::Strict).unwrap(), LLSDValue::Integer(0));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(lenient("integer", Some("-289343")), LLSDValue::Integer(-289343));
        assert_eq!(lenient("integer", Some(" 42\n")), LLSDValue::Integer(42));
        assert_eq!(lenient("real", Some("1.5e3")), LLSDValue::Real(1500.0));
        assert!(lenient("real", Some("nan")).as_real().unwrap().is_nan());
    }

    #[test]
    fn test_booleans() {
        assert_eq!(lenient("boolean", Some("false")), LLSDValue::Boolean(false));
        assert_eq!(lenient("boolean", Some("true")), LLSDValue::Boolean(true));
        //  Legacy rule: anything but "false" is true.
        assert_eq!(lenient("boolean", Some("0")), LLSDValue::Boolean(true));
        assert_eq!(
            leaf("boolean", Some("0.0"), LeafPolicy::Strict).unwrap(),
            LLSDValue::Boolean(false)
        );
        assert_eq!(
            leaf("boolean", Some("1"), LeafPolicy::Strict).unwrap(),
            LLSDValue::Boolean(true)
        );
    }

    #[test]
    fn test_dates() {
        let expected = Utc.with_ymd_and_hms(2006, 2, 1, 14, 29, 53).unwrap();
        assert_eq!(lenient("date", Some("2006-02-01T14:29:53Z")), LLSDValue::Date(expected));
        assert_eq!(lenient("date", Some("2006-02-01T09:29:53-05:00")), LLSDValue::Date(expected));
        assert_eq!(
            lenient("date", Some("2006-02-01")),
            LLSDValue::Date(Utc.with_ymd_and_hms(2006, 2, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_verbatim_text() {
        assert_eq!(lenient("string", Some(" padded ")), LLSDValue::String(" padded ".to_string()));
        assert_eq!(
            lenient("uri", Some("http://www.example.com:4201/agents")),
            LLSDValue::URI("http://www.example.com:4201/agents".to_string())
        );
        assert_eq!(lenient("mystery", Some("as is")), LLSDValue::String("as is".to_string()));
        assert_eq!(lenient("key", Some("k")), LLSDValue::String("k".to_string()));
    }

    #[test]
    fn test_binary_encodings() {
        let element = |encoding: &str, text: &str| XmlElement {
            name: "binary".to_string(),
            text: Some(text.to_string()),
            attributes: vec![("encoding".to_string(), encoding.to_string())],
            children: Vec::new(),
        };
        let hex16 = convert_leaf(&element("base16", "0fa1"), LeafPolicy::Strict).unwrap();
        assert_eq!(hex16.decode_binary().unwrap(), Some(vec![0x0f, 0xa1]));

        let encoded85 = ascii85::encode(b"Hello world");
        let b85 = convert_leaf(&element("base85", &encoded85), LeafPolicy::Strict).unwrap();
        assert_eq!(b85.decode_binary().unwrap(), Some(b"Hello world".to_vec()));

        let b64 = convert_leaf(&element("base64", "SGVsbG8gd29ybGQ="), LeafPolicy::Strict).unwrap();
        assert_eq!(b64, LLSDValue::Binary("SGVsbG8gd29ybGQ=".to_string()));

        let unknown = element("base32", "ABC");
        assert_eq!(convert_leaf(&unknown, LeafPolicy::Lenient).unwrap(), LLSDValue::Undefined);
        assert!(convert_leaf(&unknown, LeafPolicy::Strict).is_err());
    }
}
