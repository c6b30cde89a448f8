use crate::{CellId, WireId};

/// Errors raised by the IR facade itself (as opposed to the passes built on
/// top of it). These are all internal-consistency failures: the facade's
/// constructors are the only legal way to get a `CellId`/`WireId`, so a
/// dangling one means a pass kept a handle past a removal.
#[derive(Debug, thiserror::Error)]
pub enum IrError {
    #[error("wire {0:?} is not a member of this module")]
    UnknownWire(WireId),

    #[error("cell {0:?} is not a member of this module")]
    UnknownCell(CellId),

    #[error("bit offset {offset} out of range for wire {wire:?} of width {width}")]
    BitOutOfRange { wire: WireId, offset: u32, width: u32 },

    #[error("sig-bit {0:?} has no driver")]
    Undriven(crate::SigBit),

    #[error("sig-bit {0:?} has more than one driver, violating the single-driver invariant")]
    MultiplyDriven(crate::SigBit),
}
