use netsynth_ir::{CellId, CellType, ModIndex, Module, PropKind, SigBit};

use crate::{
    preprocess,
    sequence::{self, CompileCtx, SeqState},
    Mode, SvaError, TypeAnalyser,
};

/// Options controlling compilation that aren't part of the property tree
/// itself: whether unsupported primitives are fatal or warn-and-passthrough,
/// and whether emitted cells are named from the property's declared name.
#[derive(Debug, Clone, Copy)]
pub struct CompileOptions {
    pub lenient: bool,
    pub names_mode: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { lenient: false, names_mode: true }
    }
}

fn mode_of(kind: PropKind) -> Option<Mode> {
    match kind {
        PropKind::AssertImmediate | PropKind::AssertDeferred => Some(Mode::Assert),
        PropKind::AssumeImmediate | PropKind::AssumeDeferred => Some(Mode::Assume),
        PropKind::CoverImmediate | PropKind::CoverDeferred => Some(Mode::Cover),
        _ => None,
    }
}

fn sva_kind(module: &Module, index: &ModIndex, bit: SigBit) -> Option<(CellId, PropKind)> {
    let cell_id = index.driver_cell(bit)?;
    match module.cell(cell_id)?.kind() {
        CellType::Sva(k) => Some((cell_id, *k)),
        _ => None,
    }
}

/// Compiles the property rooted at `root` into a verification cell.
///
/// Returns the id of the emitted `$assert`/`$assume`/`$cover`/`$live`/`$fair`
/// cell. `root`'s own cell is left in place (it's how the front-end delivered
/// the property) but the pass that calls this is expected to remove the
/// property-tree cells afterwards, the same way the adder recoverer drains
/// its "to remove" set.
pub fn compile_property(
    module: &mut Module,
    root: CellId,
    name: Option<String>,
    opts: &CompileOptions,
) -> Result<CellId, SvaError> {
    let root_kind = match module.cell(root).ok_or(SvaError::MalformedPropertyRoot)?.kind() {
        CellType::Sva(k) => *k,
        _ => return Err(SvaError::MalformedPropertyRoot),
    };
    let mode = mode_of(root_kind).ok_or(SvaError::MalformedPropertyRoot)?;

    preprocess::preprocess(module, root, mode);

    let index = ModIndex::build(module);
    let input = module.cell(root).unwrap().port_bit("Input");
    let at_child = sva_kind(module, &index, input);

    if root_kind.is_immediate() && !matches!(at_child, Some((_, PropKind::Clock))) {
        return Ok(emit_verification_cell(module, mode, false, input, SigBit::ONE, name));
    }

    let Some((clock_id, PropKind::Clock)) = at_child else {
        return Err(SvaError::MalformedPropertyRoot);
    };

    let clock_cell = module.cell(clock_id).unwrap();
    let clk = clock_cell.port_bit("Control");
    let posedge = clock_cell.attribute("posedge") == Some("true");
    let mut body = clock_cell.port_bit("Input2");

    let mut eventually = false;
    let mut disable_iff = None;
    loop {
        let index = ModIndex::build(module);
        match sva_kind(module, &index, body) {
            Some((cid, PropKind::SEventually)) => {
                eventually = true;
                body = module.cell(cid).unwrap().port_bit("Input");
            }
            Some((cid, PropKind::DisableIff)) => {
                disable_iff = Some(module.cell(cid).unwrap().port_bit("Control"));
                body = module.cell(cid).unwrap().port_bit("Input2");
            }
            _ => break,
        }
    }

    let index = ModIndex::build(module);
    let mut analyser = TypeAnalyser::new();
    let mut ctx = CompileCtx::new(clk, posedge, disable_iff, mode, opts.lenient);

    let seq = sequence::parse(module, &index, &mut analyser, &mut ctx, SeqState::start(), body)?;
    let seq = sequence::finish(module, &mut ctx, seq);

    Ok(emit_verification_cell(module, mode, eventually, seq.a, seq.en, name))
}

fn emit_verification_cell(
    module: &mut Module,
    mode: Mode,
    eventually: bool,
    a: SigBit,
    en: SigBit,
    name: Option<String>,
) -> CellId {
    match (mode, eventually) {
        (Mode::Assert, false) => module.add_assert(a, en, name),
        (Mode::Assert, true) => module.add_live(a, en, name),
        (Mode::Assume, false) => module.add_assume(a, en, name),
        (Mode::Assume, true) => module.add_fair(a, en, name),
        (Mode::Cover, _) => module.add_cover(a, en, name),
    }
}
