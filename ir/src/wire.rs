use std::collections::BTreeMap;

use crate::ConstBit;

/// Attribute values netsynth's transforms actually need to read or write.
///
/// Real netlist IRs carry a much richer attribute grammar (strings, nested
/// ints, source spans); the passes here only ever touch `init`, so the facade
/// stays narrow on purpose.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttrValue {
    /// A constant bit-vector, LSB first, as wide as the wire it is attached to.
    Bits(Vec<ConstBit>),
    String(String),
}

impl AttrValue {
    pub fn as_bits(&self) -> Option<&[ConstBit]> {
        match self {
            AttrValue::Bits(bits) => Some(bits),
            AttrValue::String(_) => None,
        }
    }
}

/// A multi-bit net. Owns its width and a sparse attribute map; `init` is the
/// only attribute the recovery passes consume (the reset value of a register
/// this wire is the `Q` of).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Wire {
    pub(crate) name: String,
    pub(crate) width: u32,
    pub(crate) is_port: bool,
    pub(crate) attributes: BTreeMap<String, AttrValue>,
}

impl Wire {
    pub fn new(name: impl Into<String>, width: u32) -> Self {
        assert!(width > 0, "wire width must be nonzero");
        Self {
            name: name.into(),
            width,
            is_port: false,
            attributes: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn is_port(&self) -> bool {
        self.is_port
    }

    pub fn attributes(&self) -> &BTreeMap<String, AttrValue> {
        &self.attributes
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: AttrValue) {
        self.attributes.insert(key.into(), value);
    }

    /// The `init` attribute, if present. Per the data model invariant this is
    /// always a constant of exactly this wire's width when it exists.
    pub fn init(&self) -> Option<&[ConstBit]> {
        self.attributes.get("init").and_then(AttrValue::as_bits)
    }
}
