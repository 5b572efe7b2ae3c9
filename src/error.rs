//
//  error.rs -- error type for LLSD XML conversion.
//
//  Library for serializing and de-serializing data in
//  Linden Lab Structured Data format.
//
//  Animats
//  October, 2026.
//  License: LGPL.
//
use std::fmt::Display;
use thiserror::Error;

/// Errors from serializing or parsing LLSD XML.
#[derive(Debug, Error)]
pub enum LLSDError {
    /// A host value has no LLSD representation.
    #[error("{type_name} cannot be serialized into LLSD XML: {message}")]
    Serialization { type_name: String, message: String },

    /// The document is well-formed XML but not a valid LLSD document.
    #[error("malformed LLSD document: {0}")]
    MalformedDocument(String),

    /// Leaf text that does not parse as its type. Strict policy only.
    #[error("malformed <{tag}> value {text:?}: {reason}")]
    MalformedLeafValue {
        tag: String,
        text: String,
        reason: String,
    },

    /// Value nesting deeper than the configured ceiling.
    #[error("LLSD nesting exceeds the depth limit of {limit}")]
    DepthLimitExceeded { limit: usize },

    /// XML syntax error from the XML reader or writer.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// UTF-8 decoding error.
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    /// Binary payload that is not valid base64.
    #[error("binary decode error: {0}")]
    BinaryDecode(String),
}

impl LLSDError {
    /// Serialization failure for the named host type.
    pub fn unsupported(type_name: impl Into<String>, message: impl Display) -> Self {
        LLSDError::Serialization {
            type_name: type_name.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        LLSDError::MalformedDocument(message.into())
    }
}

impl serde::ser::Error for LLSDError {
    fn custom<T: Display>(msg: T) -> Self {
        LLSDError::unsupported("value", msg)
    }
}

/// Result type for LLSD operations.
pub type Result<T> = std::result::Result<T, LLSDError>;
