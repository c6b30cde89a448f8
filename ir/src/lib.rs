//! Gate-level netlist IR: modules, cells, sig-bits, attribute maps,
//! gate/verification-cell constructors, and the mod-index fan-out service.
//! A full RTLIL-compatible parser, printer, and general netlist optimizer
//! live outside this crate's scope; what's here is exactly the surface the
//! transforms in [`netsynth-sva`] and [`netsynth-recover`] need to consume
//! and produce.

mod cell;
mod design;
mod errors;
mod mod_index;
mod module;
mod prop_kind;
mod sigbit;
#[cfg(test)]
mod tests;
mod wire;

pub use cell::{Cell, CellId, CellType, Param, PortName};
pub use design::{Design, Selection};
pub use errors::IrError;
pub use mod_index::{ModIndex, PortRef};
pub use module::{output_ports, Module, WireId};
pub use prop_kind::PropKind;
pub use sigbit::{ConstBit, SigBit};
pub use wire::{AttrValue, Wire};
