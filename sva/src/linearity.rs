use std::collections::HashMap;

use netsynth_ir::{Cell, CellId, CellType, ModIndex, Module, PropKind, SigBit};

/// Structural children a node's linearity depends on. Deliberately excludes
/// the pure-Boolean first operand of `throughout`/`until`/... (it can never
/// make its parent non-linear — it isn't a sequence at all) and ports that
/// don't represent AST recursion (`Control`, the consequent of an implication
/// once merged, etc. are handled by their own call sites, not here).
fn linearity_children(kind: PropKind) -> &'static [&'static str] {
    use PropKind::*;
    match kind {
        AssertImmediate | AssertDeferred | AssumeImmediate | AssumeDeferred | CoverImmediate
        | CoverDeferred => &["Input"],
        Clock | DisableIff => &["Input2"],
        Not | Eventually | SEventually | Always | SAlways | NextTime | SNextTime | AcceptOn
        | RejectOn | SyncAcceptOn | SyncRejectOn | FirstMatch | Matched | Ended => &["Input"],
        And | Or | Implies | Iff | SeqAnd | SeqOr | SeqConcat | Intersect | Within | EventOr
        | ImplicationOverlapped | ImplicationNonOverlapped | FollowedByOverlapped
        | FollowedByNonOverlapped => &["Input", "Input2"],
        ConsecutiveRepeat | NonConsecutiveRepeat | GotoRepeat => &["Input"],
        Throughout | Until | SUntil | UntilWith | SUntilWith => &["Input2"],
        Expect | Restrict | GlobalClockingRef | GlobalClockingDef | Sampled | Stable | Rose
        | Fell | Past => &[],
    }
}

/// Reads the `sva:low`/`sva:high` bounds off a repetition/concatenation cell.
/// `"$"` on `sva:high` denotes unbounded.
pub fn bounds(cell: &Cell) -> (u64, Option<u64>) {
    let low = cell
        .attribute("sva:low")
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(0);
    let high = match cell.attribute("sva:high") {
        Some("$") => None,
        Some(s) => s.parse::<u64>().ok(),
        None => Some(low),
    };
    (low, high)
}

/// Classifies each SVA AST node as linear (matches exactly one timepoint
/// relative to its start) or not, memoising per node since the AST is a DAG
/// with shared subtrees.
///
/// Takes the module and its mod-index by reference on each call rather than
/// owning them, so it can be interleaved with the sequence compiler's
/// mutations of the same module (the AST itself is read-only during
/// compilation; only the memo here is mutable state).
#[derive(Default)]
pub struct TypeAnalyser {
    memo: HashMap<CellId, bool>,
}

impl TypeAnalyser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_linear(&mut self, module: &Module, index: &ModIndex, bit: SigBit) -> bool {
        let Some(cell_id) = index.driver_cell(bit) else {
            // A plain Boolean expression leaf matches exactly its own timepoint.
            return true;
        };
        if let Some(&cached) = self.memo.get(&cell_id) {
            return cached;
        }

        let kind = match module.cell(cell_id).unwrap().kind() {
            CellType::Sva(k) => *k,
            _ => {
                self.memo.insert(cell_id, true);
                return true;
            }
        };

        if kind.is_always_leaf() {
            self.memo.insert(cell_id, true);
            return true;
        }

        let mut own_linear = true;
        if matches!(kind, PropKind::SeqConcat | PropKind::ConsecutiveRepeat) {
            let (low, high) = bounds(module.cell(cell_id).unwrap());
            match high {
                None => own_linear = false,
                Some(high) => {
                    if high != low {
                        own_linear = false;
                    }
                }
            }
        }

        let child_bits: Vec<SigBit> = {
            let cell = module.cell(cell_id).unwrap();
            linearity_children(kind)
                .iter()
                .flat_map(|port| cell.port(port).unwrap_or(&[]).iter().copied())
                .collect()
        };

        let mut result = own_linear;
        if result {
            for bit in child_bits {
                if !self.is_linear(module, index, bit) {
                    result = false;
                    break;
                }
            }
        }

        self.memo.insert(cell_id, result);
        result
    }
}
