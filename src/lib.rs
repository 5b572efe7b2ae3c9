//
//  lib.rs
//
//  Rust library for serializing and de-serializing data in
//  Linden Lab Structured Data format, XML form.
//
//  Format documentation is at http://wiki.secondlife.com/wiki/LLSD
//
//  Animats
//  October, 2021.
//  License: LGPL.
//
//
//  Modules
//
pub mod de;
pub mod error;
pub mod ser;
pub mod tag;
pub mod tree;


pub use crate::{
    de::{
        leaf::LeafPolicy,
        xml::{from_document, from_element, from_reader, from_str, from_str_with, ParseOptions},
    },
    error::{LLSDError, Result},
    ser::{
        value::to_value,
        xml::{to_document, to_element, to_string, to_string_with, to_writer, to_xml, SerializeOptions},
    },
    tag::LLSDTag,
    tree::XmlElement,
};

use base64::Engine;
use chrono::{DateTime, SubsecRound, TimeZone, Utc};
use enum_as_inner::EnumAsInner;
use indexmap::IndexMap;
use uuid::Uuid;

/// The primitive LLSD data item.
/// Serialization takes a tree of these.
/// Deserialization returns a tree of these.
#[derive(Debug, Clone, PartialEq, EnumAsInner)]
pub enum LLSDValue {
    Undefined,
    Boolean(bool),
    Real(f64),
    Integer(i32),
    UUID(Uuid),
    String(String),
    Date(DateTime<Utc>),
    URI(String),
    /// Base64 text, as carried on the wire.
    Binary(String),
    /// Keys keep insertion order for output. Equality ignores order.
    Map(IndexMap<String, LLSDValue>),
    Array(Vec<LLSDValue>),
}

impl LLSDValue {
    /// The XML tag this value serializes to.
    pub fn tag(&self) -> LLSDTag {
        match self {
            LLSDValue::Undefined => LLSDTag::Undef,
            LLSDValue::Boolean(_) => LLSDTag::Boolean,
            LLSDValue::Real(_) => LLSDTag::Real,
            LLSDValue::Integer(_) => LLSDTag::Integer,
            LLSDValue::UUID(_) => LLSDTag::UUID,
            LLSDValue::String(_) => LLSDTag::String,
            LLSDValue::Date(_) => LLSDTag::Date,
            LLSDValue::URI(_) => LLSDTag::URI,
            LLSDValue::Binary(_) => LLSDTag::Binary,
            LLSDValue::Map(_) => LLSDTag::Map,
            LLSDValue::Array(_) => LLSDTag::Array,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.tag().as_str()
    }

    /// Date in any time zone, normalized to UTC at whole-second precision,
    /// which is all the XML form keeps.
    pub fn date<Tz: TimeZone>(dt: DateTime<Tz>) -> Self {
        LLSDValue::Date(dt.with_timezone(&Utc).trunc_subsecs(0))
    }

    /// Binary value from raw bytes.
    pub fn binary_from_bytes(bytes: &[u8]) -> Self {
        LLSDValue::Binary(base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    /// Raw bytes of a Binary value. None for any other variant.
    pub fn decode_binary(&self) -> Result<Option<Vec<u8>>> {
        let LLSDValue::Binary(text) = self else {
            return Ok(None);
        };
        let mut clean = text.clone();
        clean.retain(|c| !char::is_whitespace(c)); // line-wrapped base64 is common
        base64::engine::general_purpose::STANDARD
            .decode(clean)
            .map(Some)
            .map_err(|e| LLSDError::BinaryDecode(e.to_string()))
    }
}

impl From<bool> for LLSDValue {
    fn from(v: bool) -> Self {
        LLSDValue::Boolean(v)
    }
}

impl From<i32> for LLSDValue {
    fn from(v: i32) -> Self {
        LLSDValue::Integer(v)
    }
}

impl From<f64> for LLSDValue {
    fn from(v: f64) -> Self {
        LLSDValue::Real(v)
    }
}

impl From<&str> for LLSDValue {
    fn from(v: &str) -> Self {
        LLSDValue::String(v.to_string())
    }
}

impl From<String> for LLSDValue {
    fn from(v: String) -> Self {
        LLSDValue::String(v)
    }
}

impl From<Uuid> for LLSDValue {
    fn from(v: Uuid) -> Self {
        LLSDValue::UUID(v)
    }
}

impl From<DateTime<Utc>> for LLSDValue {
    fn from(v: DateTime<Utc>) -> Self {
        LLSDValue::date(v)
    }
}

impl From<Vec<LLSDValue>> for LLSDValue {
    fn from(v: Vec<LLSDValue>) -> Self {
        LLSDValue::Array(v)
    }
}

impl From<IndexMap<String, LLSDValue>> for LLSDValue {
    fn from(v: IndexMap<String, LLSDValue>) -> Self {
        LLSDValue::Map(v)
    }
}
