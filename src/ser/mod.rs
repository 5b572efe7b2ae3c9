//! #Serialization. Converts a tree of LLSDValue items, or any serde-serializable
//! value, to an LLSD XML document.
pub mod value;
pub mod xml;
