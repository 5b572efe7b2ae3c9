//
//  ser/value.rs -- convert any serde-serializable value into an LLSDValue tree.
//
//  Library for serializing and de-serializing data in
//  Linden Lab Structured Data format.
//
//  The serde data model is wider than LLSD. Integers that do not fit in
//  32 bits, map keys that are not strings, and ranges have no LLSD form, and fail.
//
//  Animats
//  October, 2026.
//  License: LGPL.
//
use crate::error::{LLSDError, Result};
use crate::LLSDValue;
use indexmap::IndexMap;
use serde::ser::{self, Serialize};
use std::fmt::Display;

//  Struct names serde uses for the std::ops range types.
const RANGE_NAMES: [&str; 4] = ["Range", "RangeInclusive", "RangeFrom", "RangeTo"];

/// Convert a value to an LLSDValue tree.
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<LLSDValue> {
    value.serialize(ValueSerializer)
}

/// Serializer whose output is an LLSDValue.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueSerializer;

fn integer<T>(v: T, type_name: &'static str) -> Result<LLSDValue>
where
    T: TryInto<i32> + Display + Copy,
{
    v.try_into().map(LLSDValue::Integer).map_err(|_| {
        LLSDError::unsupported(type_name, format!("{} is outside the 32-bit LLSD integer range", v))
    })
}

/// Single-entry map used for enum variants carrying data.
fn variant(name: &str, value: LLSDValue) -> LLSDValue {
    let mut map = IndexMap::with_capacity(1);
    map.insert(name.to_string(), value);
    LLSDValue::Map(map)
}

/// LLSD map keys are text.
fn map_key<T: Serialize + ?Sized>(key: &T) -> Result<String> {
    match to_value(key)? {
        LLSDValue::String(s) => Ok(s),
        other => Err(LLSDError::unsupported(
            other.type_name(),
            "LLSD map keys must be strings",
        )),
    }
}

impl ser::Serializer for ValueSerializer {
    type Ok = LLSDValue;
    type Error = LLSDError;

    type SerializeSeq = SerializeArray;
    type SerializeTuple = SerializeArray;
    type SerializeTupleStruct = SerializeArray;
    type SerializeTupleVariant = SerializeArrayVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeMapVariant;

    fn serialize_bool(self, v: bool) -> Result<LLSDValue> {
        Ok(LLSDValue::Boolean(v))
    }

    fn serialize_i8(self, v: i8) -> Result<LLSDValue> {
        Ok(LLSDValue::Integer(v.into()))
    }

    fn serialize_i16(self, v: i16) -> Result<LLSDValue> {
        Ok(LLSDValue::Integer(v.into()))
    }

    fn serialize_i32(self, v: i32) -> Result<LLSDValue> {
        Ok(LLSDValue::Integer(v))
    }

    fn serialize_i64(self, v: i64) -> Result<LLSDValue> {
        integer(v, "i64")
    }

    fn serialize_i128(self, v: i128) -> Result<LLSDValue> {
        integer(v, "i128")
    }

    fn serialize_u8(self, v: u8) -> Result<LLSDValue> {
        Ok(LLSDValue::Integer(v.into()))
    }

    fn serialize_u16(self, v: u16) -> Result<LLSDValue> {
        Ok(LLSDValue::Integer(v.into()))
    }

    fn serialize_u32(self, v: u32) -> Result<LLSDValue> {
        integer(v, "u32")
    }

    fn serialize_u64(self, v: u64) -> Result<LLSDValue> {
        integer(v, "u64")
    }

    fn serialize_u128(self, v: u128) -> Result<LLSDValue> {
        integer(v, "u128")
    }

    fn serialize_f32(self, v: f32) -> Result<LLSDValue> {
        Ok(LLSDValue::Real(v.into()))
    }

    fn serialize_f64(self, v: f64) -> Result<LLSDValue> {
        Ok(LLSDValue::Real(v))
    }

    fn serialize_char(self, v: char) -> Result<LLSDValue> {
        Ok(LLSDValue::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<LLSDValue> {
        Ok(LLSDValue::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<LLSDValue> {
        Ok(LLSDValue::binary_from_bytes(v))
    }

    fn serialize_none(self) -> Result<LLSDValue> {
        Ok(LLSDValue::Undefined)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<LLSDValue> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<LLSDValue> {
        Ok(LLSDValue::Undefined)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<LLSDValue> {
        Ok(LLSDValue::Undefined)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<LLSDValue> {
        Ok(LLSDValue::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<LLSDValue> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant_name: &'static str,
        value: &T,
    ) -> Result<LLSDValue> {
        Ok(variant(variant_name, to_value(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeArray> {
        Ok(SerializeArray {
            items: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeArray> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeArray> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeArrayVariant> {
        Ok(SerializeArrayVariant {
            variant,
            items: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap {
            map: IndexMap::with_capacity(len.unwrap_or(0)),
            next_key: None,
        })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<SerializeMap> {
        //  serde writes std ranges as structs; LLSD has no range type.
        if RANGE_NAMES.contains(&name) {
            return Err(LLSDError::unsupported(name, "ranges have no LLSD form"));
        }
        self.serialize_map(Some(len))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeMapVariant> {
        Ok(SerializeMapVariant {
            variant,
            map: IndexMap::with_capacity(len),
        })
    }
}

/// Sequence, tuple and tuple struct in progress.
#[derive(Debug)]
pub struct SerializeArray {
    items: Vec<LLSDValue>,
}

impl ser::SerializeSeq for SerializeArray {
    type Ok = LLSDValue;
    type Error = LLSDError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.items.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<LLSDValue> {
        Ok(LLSDValue::Array(self.items))
    }
}

impl ser::SerializeTuple for SerializeArray {
    type Ok = LLSDValue;
    type Error = LLSDError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<LLSDValue> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeArray {
    type Ok = LLSDValue;
    type Error = LLSDError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<LLSDValue> {
        ser::SerializeSeq::end(self)
    }
}

/// Tuple variant in progress, written as `{variant: [fields]}`.
#[derive(Debug)]
pub struct SerializeArrayVariant {
    variant: &'static str,
    items: Vec<LLSDValue>,
}

impl ser::SerializeTupleVariant for SerializeArrayVariant {
    type Ok = LLSDValue;
    type Error = LLSDError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.items.push(to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<LLSDValue> {
        Ok(variant(self.variant, LLSDValue::Array(self.items)))
    }
}

/// Map and struct in progress.
#[derive(Debug)]
pub struct SerializeMap {
    map: IndexMap<String, LLSDValue>,
    next_key: Option<String>,
}

impl ser::SerializeMap for SerializeMap {
    type Ok = LLSDValue;
    type Error = LLSDError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<()> {
        self.next_key = Some(map_key(key)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| LLSDError::unsupported("map", "value serialized before its key"))?;
        self.map.insert(key, to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<LLSDValue> {
        Ok(LLSDValue::Map(self.map))
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = LLSDValue;
    type Error = LLSDError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.map.insert(key.to_string(), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<LLSDValue> {
        Ok(LLSDValue::Map(self.map))
    }
}

/// Struct variant in progress, written as `{variant: {fields}}`.
#[derive(Debug)]
pub struct SerializeMapVariant {
    variant: &'static str,
    map: IndexMap<String, LLSDValue>,
}

impl ser::SerializeStructVariant for SerializeMapVariant {
    type Ok = LLSDValue;
    type Error = LLSDError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, key: &'static str, value: &T) -> Result<()> {
        self.map.insert(key.to_string(), to_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<LLSDValue> {
        Ok(variant(self.variant, LLSDValue::Map(self.map)))
    }
}
