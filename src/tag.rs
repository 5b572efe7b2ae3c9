//
//  tag.rs -- the fixed XML tag vocabulary of LLSD.
//
//  Library for serializing and de-serializing data in
//  Linden Lab Structured Data format.
//
//  Format documentation is at http://wiki.secondlife.com/wiki/LLSD
//
//  Animats
//  October, 2026.
//  License: LGPL.
//
use std::fmt;

/// Every element name an LLSD XML document may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LLSDTag {
    Llsd,
    Map,
    Array,
    Key,
    String,
    Integer,
    Real,
    Boolean,
    Date,
    UUID,
    URI,
    Binary,
    Undef,
}

impl LLSDTag {
    pub const ALL: [LLSDTag; 13] = [
        LLSDTag::Llsd,
        LLSDTag::Map,
        LLSDTag::Array,
        LLSDTag::Key,
        LLSDTag::String,
        LLSDTag::Integer,
        LLSDTag::Real,
        LLSDTag::Boolean,
        LLSDTag::Date,
        LLSDTag::UUID,
        LLSDTag::URI,
        LLSDTag::Binary,
        LLSDTag::Undef,
    ];

    /// Element name on the wire.
    pub const fn as_str(self) -> &'static str {
        match self {
            LLSDTag::Llsd => "llsd",
            LLSDTag::Map => "map",
            LLSDTag::Array => "array",
            LLSDTag::Key => "key",
            LLSDTag::String => "string",
            LLSDTag::Integer => "integer",
            LLSDTag::Real => "real",
            LLSDTag::Boolean => "boolean",
            LLSDTag::Date => "date",
            LLSDTag::UUID => "uuid",
            LLSDTag::URI => "uri",
            LLSDTag::Binary => "binary",
            LLSDTag::Undef => "undef",
        }
    }

    /// Look up a tag by element name. Names are case sensitive.
    pub fn from_name(name: &str) -> Option<LLSDTag> {
        Self::ALL.iter().copied().find(|tag| tag.as_str() == name)
    }

    /// Map and array hold child values; everything else is a leaf or metadata.
    pub const fn is_container(self) -> bool {
        matches!(self, LLSDTag::Map | LLSDTag::Array)
    }
}

impl fmt::Display for LLSDTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
