use netsynth_ir::{CellId, CellType, ModIndex, Module, PropKind, SigBit};

use crate::Mode;

/// Iteration cap for the fixed-point rewrite loop. Termination is actually
/// guaranteed by construction — each rewrite strictly shrinks the count of
/// `not` (assert/assume) or non-overlapped-implication (cover) nodes still to
/// process — so this is a backstop against a future rewrite rule breaking
/// that invariant, not a load-bearing limit.
const MAX_ITERS: usize = 1024;

/// Rewrites `root`'s property tree in place to a fixed point, under `mode`.
///
/// Every rewrite here is semantics-preserving for `mode`, so a pass aborting
/// partway through still leaves a valid, equivalent property behind.
pub fn preprocess(module: &mut Module, root: CellId, mode: Mode) {
    for iteration in 0..MAX_ITERS {
        let index = ModIndex::build(module);
        let root_bit = module.sva_output(root);
        let (_, did_something) = rewrite(module, &index, root_bit, mode);
        if !did_something {
            log::debug!("SVA preprocess reached fixed point after {iteration} pass(es)");
            return;
        }
    }
    log::warn!("SVA preprocess hit the {MAX_ITERS}-iteration cap without reaching a fixed point");
}

fn sva_kind(module: &Module, index: &ModIndex, bit: SigBit) -> Option<(CellId, PropKind)> {
    let cell_id = index.driver_cell(bit)?;
    match module.cell(cell_id)?.kind() {
        CellType::Sva(k) => Some((cell_id, *k)),
        _ => None,
    }
}

/// Returns the (possibly unchanged) net and whether a rewrite fired anywhere
/// along this recursive descent.
fn rewrite(module: &mut Module, index: &ModIndex, bit: SigBit, mode: Mode) -> (SigBit, bool) {
    let Some((cell_id, kind)) = sva_kind(module, index, bit) else {
        return (bit, false);
    };

    if kind.is_verification_root() {
        let input = module.cell(cell_id).unwrap().port_bit("Input");
        let (new_input, changed) = rewrite(module, index, input, mode);
        if changed {
            module.cell_mut(cell_id).unwrap().set_port("Input", vec![new_input]);
        }
        return (bit, changed);
    }

    if matches!(kind, PropKind::Clock | PropKind::DisableIff) {
        let input2 = module.cell(cell_id).unwrap().port_bit("Input2");
        let (new_input2, changed) = rewrite(module, index, input2, mode);
        if changed {
            module.cell_mut(cell_id).unwrap().set_port("Input2", vec![new_input2]);
        }
        return (bit, changed);
    }

    if kind == PropKind::Not && matches!(mode, Mode::Assert | Mode::Assume) {
        let p = module.cell(cell_id).unwrap().port_bit("Input");
        let (p, _) = rewrite(module, index, p, mode);
        let name = module.new_id("sva_not_to_implies");
        let new_id = module.add_sva_node(
            PropKind::ImplicationOverlapped,
            name,
            Some(p),
            None,
            Some(SigBit::ZERO),
            None,
            None,
        );
        return (module.sva_output(new_id), true);
    }

    if kind == PropKind::ImplicationNonOverlapped && mode == Mode::Cover {
        let p = module.cell(cell_id).unwrap().port_bit("Input");
        let q = module.cell(cell_id).unwrap().port_bit("Input2");
        let (p, _) = rewrite(module, index, p, mode);
        let (q, _) = rewrite(module, index, q, mode);
        let name = module.new_id("sva_cover_desugar");
        let new_id = module.add_sva_node(
            PropKind::SeqConcat,
            name,
            Some(p),
            None,
            Some(q),
            None,
            None,
        );
        module.cell_mut(new_id).unwrap().set_attribute("sva:low", "1");
        module.cell_mut(new_id).unwrap().set_attribute("sva:high", "1");
        return (module.sva_output(new_id), true);
    }

    (bit, false)
}
