//! Compiles SystemVerilog Assertion property trees, delivered as ordinary
//! netlist cells (see [`netsynth_ir::CellType::Sva`]), into combinational and
//! sequential verification cells.
//!
//! The three stages run in order for every property root: [`preprocess`]
//! rewrites the tree to a mode-specific normal form, [`sequence`] walks the
//! normalized tree accumulating an activation/enable pair one clock tick at a
//! time, and [`driver::compile_property`] ties both together and emits the
//! final `$assert`/`$assume`/`$cover`/`$live`/`$fair` cell.

mod driver;
mod errors;
mod linearity;
mod mode;
mod preprocess;
mod sequence;

pub use driver::{compile_property, CompileOptions};
pub use errors::SvaError;
pub use linearity::TypeAnalyser;
pub use mode::Mode;
pub use preprocess::preprocess;
pub use sequence::{CompileCtx, SeqState};
