use crate::module::WireId;

/// One of the three constant drivers a bit-blasted netlist can present in place
/// of a real wire: tied low, tied high, or don't-care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ConstBit {
    Zero,
    One,
    X,
}

impl ConstBit {
    pub fn as_char(&self) -> char {
        match self {
            ConstBit::Zero => '0',
            ConstBit::One => '1',
            ConstBit::X => 'x',
        }
    }
}

/// A single-bit wire reference: a handle into a [`Wire`](crate::Wire) at a bit
/// offset, or one of the constant drivers.
///
/// Equality is structural after canonicalisation by the [`ModIndex`](crate::ModIndex);
/// two `SigBit::Wire` values referring to the same wire and offset always compare
/// equal regardless of how they were constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SigBit {
    Wire(WireId, u32),
    Const(ConstBit),
}

impl SigBit {
    pub const ZERO: SigBit = SigBit::Const(ConstBit::Zero);
    pub const ONE: SigBit = SigBit::Const(ConstBit::One);
    pub const X: SigBit = SigBit::Const(ConstBit::X);

    pub fn is_const(&self) -> bool {
        matches!(self, SigBit::Const(_))
    }

    pub fn wire(&self) -> Option<WireId> {
        match self {
            SigBit::Wire(w, _) => Some(*w),
            SigBit::Const(_) => None,
        }
    }
}

impl From<ConstBit> for SigBit {
    fn from(c: ConstBit) -> Self {
        SigBit::Const(c)
    }
}
