//
//  de/xml.rs -- XML deserializer for LLSD
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
use crate::de::leaf::{convert_leaf, LeafPolicy};
use crate::error::{LLSDError, Result};
use crate::tag::LLSDTag;
use crate::tree::XmlElement;
use crate::LLSDValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use tracing::{debug, trace, warn};
//
//  Constants
//
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Parser settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Handling of leaf text that does not parse as its type.
    pub leaf_policy: LeafPolicy,
    /// Deepest value nesting accepted below the `<llsd>` wrapper.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            leaf_policy: LeafPolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    pub fn with_leaf_policy(mut self, leaf_policy: LeafPolicy) -> Self {
        self.leaf_policy = leaf_policy;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Parse LLSD expressed in XML into an LLSD tree, with default options.
pub fn from_str(xmlstr: &str) -> Result<LLSDValue> {
    from_str_with(xmlstr, &ParseOptions::default())
}

/// Parse LLSD expressed in XML into an LLSD tree.
pub fn from_str_with(xmlstr: &str, options: &ParseOptions) -> Result<LLSDValue> {
    trace!(len = xmlstr.len(), "parsing LLSD XML");
    //  The tree root is <llsd> at depth 0, so tree depth is value depth.
    let root = XmlElement::parse_str(xmlstr, options.max_depth)?;
    from_document(&root, options)
}

/// Read XML from buffered source and parse into LLSDValue.
pub fn from_reader<R: BufRead>(rdr: &mut R) -> Result<LLSDValue> {
    let mut xmlstr = String::new();
    rdr.read_to_string(&mut xmlstr)?;
    from_str(&xmlstr)
}

/// Parse an already built tree whose root is the `<llsd>` wrapper.
/// Only the first child is used.
pub fn from_document(root: &XmlElement, options: &ParseOptions) -> Result<LLSDValue> {
    if root.name != LLSDTag::Llsd.as_str() {
        return Err(LLSDError::malformed(format!(
            "expected <llsd>, found <{}>",
            root.name
        )));
    }
    let mut values = root.children.iter();
    let first = values
        .next()
        .ok_or_else(|| LLSDError::malformed("<llsd> holds no value"))?;
    let ignored = values.count();
    if ignored > 0 {
        warn!(ignored, "<llsd> holds more than one value, using the first");
    }
    parse_value(first, options, 1)
}

/// Parse a bare value element, such as one produced by `ser::xml::to_element`.
pub fn from_element(element: &XmlElement, options: &ParseOptions) -> Result<LLSDValue> {
    parse_value(element, options, 1)
}

/// Parse one value - real, integer, map, etc. Recursive.
fn parse_value(element: &XmlElement, options: &ParseOptions, depth: usize) -> Result<LLSDValue> {
    if depth > options.max_depth {
        return Err(LLSDError::DepthLimitExceeded {
            limit: options.max_depth,
        });
    }
    match LLSDTag::from_name(&element.name) {
        Some(LLSDTag::Map) => parse_map(element, options, depth),
        Some(LLSDTag::Array) => parse_array(element, options, depth),
        _ => convert_leaf(element, options.leaf_policy),
    }
}

//  Parse one map.
//  Format <key> STRING </key> LLSDVALUE, repeated.
fn parse_map(element: &XmlElement, options: &ParseOptions, depth: usize) -> Result<LLSDValue> {
    let mut map: IndexMap<String, LLSDValue> = IndexMap::new();
    let mut children = element.children.iter();
    while let Some(child) = children.next() {
        if child.name != LLSDTag::Key.as_str() {
            debug!(tag = %child.name, "ignoring map child that is not a key");
            continue;
        }
        let key = child.text.clone().unwrap_or_default();
        let value = match children.next() {
            Some(v) if v.name != LLSDTag::Key.as_str() => v,
            _ => {
                return Err(LLSDError::malformed(format!(
                    "map key {:?} has no value",
                    key
                )))
            }
        };
        //  Duplicate keys are not errors. Last one wins.
        let _dup = map.insert(key, parse_value(value, options, depth + 1)?);
    }
    Ok(LLSDValue::Map(map))
}

/// Parse one array. Children are values in order.
fn parse_array(element: &XmlElement, options: &ParseOptions, depth: usize) -> Result<LLSDValue> {
    let items = element
        .children
        .iter()
        .map(|child| parse_value(child, options, depth + 1))
        .collect::<Result<Vec<LLSDValue>>>()?;
    Ok(LLSDValue::Array(items))
}

// Unit tests
