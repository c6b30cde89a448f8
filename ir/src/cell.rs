use std::collections::BTreeMap;

use smallvec::SmallVec;

use crate::{ConstBit, PropKind, SigBit};

/// Bits backing one cell port. Most ports in this IR are 1 bit (gate
/// operands) or a handful of bits (arithmetic operands before bus extraction
/// runs), so the common case never touches the heap.
pub type PortBits = SmallVec<[SigBit; 4]>;

/// A typed, small integer handle into a [`Module`](crate::Module)'s cell arena.
///
/// Cells are never reassigned an id once created; removal only unlinks them
/// from the arena's live set, so a stale `CellId` captured before a pass runs
/// is safe to hold across the pass (it will simply stop resolving).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellId(pub(crate) u32);

impl CellId {
    pub fn to_usize(self) -> usize {
        self.0 as usize
    }
}

/// A cell parameter value (the `parameters` map Yosys calls it).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Param {
    Int(i64),
    Str(String),
    Bits(Vec<ConstBit>),
}

impl Param {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Param::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Param::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// The closed universe of cell types the three transforms know how to
/// produce or consume. Unlike a full RTLIL cell library this is deliberately
/// narrow: only the primitive gates, registers, arithmetic cells, and
/// bit-blasting placeholders the SVA compiler and gate-chain recovery passes
/// actually touch.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellType {
    // Combinational primitives
    And,
    Or,
    Not,
    Xor,
    AndNot,
    Nor,
    Mux,
    Buf,
    ReduceOr,
    Anyseq,

    /// A clocked register. `flavor` mirrors the tech-mapped `_DFF_*` family
    /// name (e.g. `"P"` posedge no reset, `"PN0"` posedge, async-low reset
    /// to 0); two cells share a flavor iff they are interchangeable for the
    /// purposes of chain recovery.
    Dff { flavor: String },
    /// An async-reset D flip-flop exposed at the RTLIL `$adff` level
    /// (post-recovery, word-level).
    Adff,
    /// A toggle flip-flop (`_TFF_*`), same flavor convention as [`Dff`].
    Tff { flavor: String },

    Add,
    Sub,
    Alu,

    /// Internal bit-blasted placeholder: `A + B (+ Cin) -> {Cout, Y}`.
    HalfAdder,
    FullAdder,
    HalfSubtractor,
    FullSubtractor,
    /// Final-bit sum when both a carry-in and an external carry are present.
    Xor3,

    /// Recovered toggle counter (`$__COUNT_`).
    Count,

    Assert,
    Assume,
    Cover,
    Live,
    Fair,

    /// A property-tree node delivered by the SVA front-end.
    Sva(PropKind),
}

impl CellType {
    pub fn is_half_adder_family(&self) -> bool {
        matches!(self, CellType::HalfAdder | CellType::HalfSubtractor)
    }

    pub fn is_full_adder_family(&self) -> bool {
        matches!(self, CellType::FullAdder | CellType::FullSubtractor)
    }

    pub fn is_adder_placeholder(&self) -> bool {
        matches!(
            self,
            CellType::HalfAdder
                | CellType::FullAdder
                | CellType::HalfSubtractor
                | CellType::FullSubtractor
                | CellType::Xor3
        )
    }

    /// True for subtractor-flavored placeholders (`Bin`/`Bout` carry ports
    /// instead of `Cin`/`Cout`).
    pub fn is_subtractor(&self) -> bool {
        matches!(self, CellType::HalfSubtractor | CellType::FullSubtractor)
    }
}

/// A named port, either a 1-bit or multi-bit connection.
pub type PortName = &'static str;

/// A typed node with named ports and a parameter map.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub(crate) id: CellId,
    pub(crate) kind: CellType,
    pub(crate) ports: BTreeMap<PortName, PortBits>,
    pub(crate) params: BTreeMap<String, Param>,
    pub(crate) attributes: BTreeMap<String, String>,
    pub(crate) name: String,
}

impl Cell {
    pub fn id(&self) -> CellId {
        self.id
    }

    pub fn kind(&self) -> &CellType {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn port(&self, name: PortName) -> Option<&[SigBit]> {
        self.ports.get(name).map(|bits| bits.as_slice())
    }

    /// The single bit at `port`, for 1-bit ports. Panics if the port is wider
    /// than one bit or absent, since every call site in this crate knows
    /// statically which of its ports are 1-bit.
    pub fn port_bit(&self, name: PortName) -> SigBit {
        let bits = self.ports.get(name).unwrap_or_else(|| {
            panic!("cell {} ({:?}) has no port {name}", self.name, self.kind)
        });
        assert_eq!(bits.len(), 1, "port {name} on {} is not 1-bit", self.name);
        bits[0]
    }

    pub fn set_port(&mut self, name: PortName, bits: impl Into<PortBits>) {
        self.ports.insert(name, bits.into());
    }

    pub fn ports(&self) -> impl Iterator<Item = (PortName, &[SigBit])> {
        self.ports.iter().map(|(k, v)| (*k, v.as_slice()))
    }

    pub fn param(&self, name: &str) -> Option<&Param> {
        self.params.get(name)
    }

    pub fn set_param(&mut self, name: impl Into<String>, value: Param) {
        self.params.insert(name.into(), value);
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }
}
