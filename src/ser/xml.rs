//
//  ser/xml.rs -- XML serializer for LLSD
//
//
//  Library for serializing and de-serializing data in
//  Linden Lab Structured Data format.
//
//  Format documentation is at http://wiki.secondlife.com/wiki/LLSD
//
//  XML format.
//
//  Animats
//  February, 2021.
//  License: LGPL.
//
//
//  Much like Serde-JSON, this will serialize trees of LLSDValue items,
//  and anything serde can turn into one.

use crate::error::Result;
use crate::ser::value::to_value;
use crate::tag::LLSDTag;
use crate::tree::XmlElement;
use crate::LLSDValue;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::trace;

/// Output settings. No pretty-printing; output is compact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerializeOptions {
    /// Emit `<?xml version="1.0" encoding="UTF-8"?>` before `<llsd>`.
    pub xml_declaration: bool,
}

impl SerializeOptions {
    pub fn with_xml_declaration(mut self, xml_declaration: bool) -> Self {
        self.xml_declaration = xml_declaration;
        self
    }
}

// By convention, the public API of a Serde serializer is one or more `to_abc`
// functions such as `to_string`, `to_bytes`, or `to_writer` depending on what
// Rust types the serializer is able to produce as output.
//

/// LLSDValue to Writer
pub fn to_writer<W: Write>(
    writer: &mut W,
    value: &LLSDValue,
    options: &SerializeOptions,
) -> Result<()> {
    trace!(tag = %value.tag(), "serializing LLSD XML");
    to_document(value).write_to(&mut *writer, options.xml_declaration)?;
    writer.flush()?;
    Ok(())
}

/// LLSDValue to String, as `<llsd>...</llsd>` with no declaration.
pub fn to_string(value: &LLSDValue) -> Result<String> {
    to_string_with(value, &SerializeOptions::default())
}

/// LLSDValue to String.
pub fn to_string_with(value: &LLSDValue, options: &SerializeOptions) -> Result<String> {
    trace!(tag = %value.tag(), "serializing LLSD XML");
    to_document(value).to_xml_string(options.xml_declaration)
}

/// Any serde-serializable value to String.
/// Fails with `LLSDError::Serialization` if some part has no LLSD form.
pub fn to_xml<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    to_string(&to_value(value)?)
}

/// The `<llsd>` wrapper holding one value element.
pub fn to_document(value: &LLSDValue) -> XmlElement {
    let mut llsd = XmlElement::new(LLSDTag::Llsd.as_str());
    llsd.push(to_element(value));
    llsd
}

/// Generate one <TYPE> VALUE </TYPE> element. VALUE is recursive.
pub fn to_element(value: &LLSDValue) -> XmlElement {
    //  Leaf with text.
    fn tag_value(tag: LLSDTag, text: impl Into<String>) -> XmlElement {
        XmlElement::with_text(tag.as_str(), text)
    }
    //  Leaf with text, written as a null tag if the text is empty.
    fn tag_value_or_empty(tag: LLSDTag, text: &str) -> XmlElement {
        if text.is_empty() {
            XmlElement::new(tag.as_str())
        } else {
            tag_value(tag, text)
        }
    }
    //  Use SL "nan", not Rust "NaN". Exponent form outside the plain decimal range.
    fn f64_to_xml(v: f64) -> String {
        let magnitude = v.abs();
        if v.is_nan() {
            "nan".to_string()
        } else if v.is_finite() && v != 0.0 && !(1e-5..1e17).contains(&magnitude) {
            format!("{:e}", v)
        } else {
            v.to_string()
        }
    }

    let tag = value.tag();
    match value {
        LLSDValue::Undefined => XmlElement::new(tag.as_str()),
        LLSDValue::Boolean(v) => tag_value(tag, if *v { "true" } else { "false" }),
        LLSDValue::String(v) => tag_value_or_empty(tag, v),
        LLSDValue::URI(v) => tag_value_or_empty(tag, v),
        LLSDValue::Binary(v) => tag_value_or_empty(tag, v),
        LLSDValue::Integer(v) => tag_value(tag, v.to_string()),
        LLSDValue::Real(v) => tag_value(tag, f64_to_xml(*v)),
        LLSDValue::UUID(v) => tag_value(tag, v.to_string()),
        LLSDValue::Date(v) => tag_value(tag, v.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
        LLSDValue::Map(v) => {
            let mut map = XmlElement::new(tag.as_str());
            for (key, value) in v {
                //  Keys always carry text, even when empty.
                map.push(XmlElement::with_text(LLSDTag::Key.as_str(), key.as_str()));
                map.push(to_element(value));
            }
            map
        }
        LLSDValue::Array(v) => {
            let mut array = XmlElement::new(tag.as_str());
            for value in v {
                array.push(to_element(value));
            }
            array
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use indexmap::IndexMap;
    use uuid::Uuid;

    #[test]
    fn test_leaf_forms() {
        let cases = [
            (LLSDValue::Integer(-289343), "<integer>-289343</integer>"),
            (LLSDValue::Boolean(true), "<boolean>true</boolean>"),
            (LLSDValue::Real(2983287453.38483), "<real>2983287453.38483</real>"),
            (LLSDValue::Real(f64::NAN), "<real>nan</real>"),
            (LLSDValue::Real(100.0), "<real>100</real>"),
            (LLSDValue::Real(-1.5e-300), "<real>-1.5e-300</real>"),
            (LLSDValue::String("foo".to_string()), "<string>foo</string>"),
            (LLSDValue::String(String::new()), "<string/>"),
            (LLSDValue::Undefined, "<undef/>"),
            (LLSDValue::UUID(Uuid::nil()), "<uuid>00000000-0000-0000-0000-000000000000</uuid>"),
            (
                LLSDValue::URI("http://www.example.com:4201/agents".to_string()),
                "<uri>http://www.example.com:4201/agents</uri>",
            ),
            (LLSDValue::URI(String::new()), "<uri/>"),
            (LLSDValue::binary_from_bytes(b"the quick brown fox"), "<binary>dGhlIHF1aWNrIGJyb3duIGZveA==</binary>"),
            (
                LLSDValue::Date(Utc.with_ymd_and_hms(2006, 2, 1, 14, 29, 53).unwrap()),
                "<date>2006-02-01T14:29:53Z</date>",
            ),
        ];
        for (value, expected) in cases {
            assert_eq!(
                to_string(&value).unwrap(),
                format!("<llsd>{}</llsd>", expected)
            );
        }
    }

    #[test]
    fn test_escaping() {
        let value = LLSDValue::String("<a & b>".to_string());
        assert_eq!(
            to_string(&value).unwrap(),
            "<llsd><string>&lt;a &amp; b&gt;</string></llsd>"
        );
    }

    #[test]
    fn test_map_order_and_empty_key() {
        let mut map = IndexMap::new();
        map.insert("z".to_string(), LLSDValue::Integer(1));
        map.insert(String::new(), LLSDValue::Integer(2));
        map.insert("a".to_string(), LLSDValue::Map(IndexMap::new()));
        assert_eq!(
            to_string(&LLSDValue::Map(map)).unwrap(),
            "<llsd><map><key>z</key><integer>1</integer><key></key><integer>2</integer>\
             <key>a</key><map/></map></llsd>"
        );
    }

    #[test]
    fn test_declaration_and_writer() {
        let options = SerializeOptions::default().with_xml_declaration(true);
        let mut out: Vec<u8> = Vec::new();
        to_writer(&mut out, &LLSDValue::Undefined, &options).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            r#"<?xml version="1.0" encoding="UTF-8"?><llsd><undef/></llsd>"#
        );
    }
}
