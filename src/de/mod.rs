//! #De-serialization. Converts an LLSD XML document to a tree of LLSDValue items.
pub mod leaf;
pub mod xml;
