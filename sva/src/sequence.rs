use netsynth_ir::{CellId, CellType, ConstBit, ModIndex, Module, PropKind, SigBit};

use crate::{linearity::bounds, Mode, SvaError, TypeAnalyser};

/// State threaded through sequence compilation: the static tick count since
/// the sequence started (`-1` once a non-linear merge makes that meaningless),
/// the activation bit `a`, and the enable bit `en`.
#[derive(Debug, Clone, Copy)]
pub struct SeqState {
    pub length: i64,
    pub a: SigBit,
    pub en: SigBit,
}

impl SeqState {
    pub fn start() -> Self {
        Self { length: 0, a: SigBit::ONE, en: SigBit::ONE }
    }
}

/// Per-pass mutable context: the property's clock, the ambient `until`
/// conjunct stacks, and the stack of "alive" lists used by non-linear
/// implication consequents. Passed explicitly rather than via globals.
pub struct CompileCtx {
    pub clk: SigBit,
    pub posedge: bool,
    pub disable_iff: Option<SigBit>,
    pub mode: Mode,
    pub lenient: bool,
    until_inclusive: Vec<SigBit>,
    until_exclusive: Vec<SigBit>,
    alive_stack: Vec<Vec<SigBit>>,
}

impl CompileCtx {
    pub fn new(clk: SigBit, posedge: bool, disable_iff: Option<SigBit>, mode: Mode, lenient: bool) -> Self {
        Self {
            clk,
            posedge,
            disable_iff,
            mode,
            lenient,
            until_inclusive: Vec::new(),
            until_exclusive: Vec::new(),
            alive_stack: Vec::new(),
        }
    }
}

fn sequence_cond(module: &mut Module, seq: SeqState, c: SigBit) -> SeqState {
    SeqState { a: module.and_gate(seq.a, c), ..seq }
}

/// Applies `disable iff`, the exclusive `until` conjuncts, registers the
/// flipflop pair for one tick, then applies the inclusive `until` conjuncts
/// to the result.
fn sequence_ff(module: &mut Module, ctx: &mut CompileCtx, seq: SeqState) -> SeqState {
    let mut en = seq.en;
    if let Some(disable) = ctx.disable_iff {
        let not_disable = module.not_gate(disable);
        en = module.and_gate(en, not_disable);
    }

    let mut a = seq.a;
    for &c in &ctx.until_exclusive {
        a = module.and_gate(a, c);
    }

    let alive_bit = module.and_gate(a, en);
    for list in ctx.alive_stack.iter_mut() {
        list.push(alive_bit);
    }

    let new_a = module.add_dff(ctx.clk, ctx.posedge, a, ConstBit::Zero);
    let new_en = module.add_dff(ctx.clk, ctx.posedge, en, ConstBit::Zero);
    let length = if seq.length >= 0 { seq.length + 1 } else { -1 };

    let mut result = SeqState { length, a: new_a, en: new_en };
    for &c in &ctx.until_inclusive {
        result.a = module.and_gate(result.a, c);
    }
    result
}

fn combine_seq(module: &mut Module, seq: SeqState, other: SeqState) -> SeqState {
    let filtered = module.and_gate(seq.a, seq.en);
    let other_filtered = module.and_gate(other.a, other.en);
    let a = module.or_gate(filtered, other_filtered);
    let en = module.or_gate(seq.en, other.en);
    let length = if seq.length == other.length { seq.length } else { -1 };
    SeqState { length, a, en }
}

/// Merges a separately-produced `(a, en)` pair into `seq`, forcing
/// `length = -1`. Used by the infinite-delay self-feedback latch in
/// concat/repeat: `other_a`/`other_en` are placeholder wires wired up by the
/// caller only *after* this call returns.
fn combine_external(module: &mut Module, seq: SeqState, other_a: SigBit, other_en: SigBit) -> SeqState {
    let filtered = module.and_gate(seq.a, seq.en);
    let other_filtered = module.and_gate(other_a, other_en);
    let a = module.or_gate(filtered, other_filtered);
    let en = module.or_gate(seq.en, other_en);
    SeqState { length: -1, a, en }
}

/// A state bit that latches permanently high the first cycle `enable` is
/// seen. Returns `(pulse, latched)`: `pulse` fires exactly the cycle the
/// transition happens, `latched` holds afterwards. Backs the non-linear
/// implication consequent's "temporal one-hot" activation — `enable` is
/// typically itself gated by an `$anyseq` free signal representing "did the
/// antecedent hold", left for a formal engine to constrain.
fn make_temporal_one_hot(module: &mut Module, ctx: &CompileCtx, enable: SigBit) -> (SigBit, SigBit) {
    let any = module.anyseq_gate();
    let any = module.and_gate(any, enable);
    let state = module.add_wire(module.new_id("one_hot_state"), 1);
    let state_bit = SigBit::Wire(state, 0);
    let next_state = module.or_gate(state_bit, any);
    let registered = module.add_dff(ctx.clk, ctx.posedge, next_state, ConstBit::Zero);
    module.alias_wire(state, registered);
    let not_state = module.not_gate(state_bit);
    let pulse = module.and_gate(next_state, not_state);
    (pulse, state_bit)
}

/// A state bit that OR-latches `enable` permanently. Returns the
/// combinational (pre-register) value, which is already "sticky" in the
/// sense that once high it can never see its driving `enable` go low without
/// also staying high through the registered path.
fn make_permanent_latch(module: &mut Module, ctx: &CompileCtx, enable: SigBit) -> SigBit {
    let state = module.add_wire(module.new_id("perm_latch_state"), 1);
    let state_bit = SigBit::Wire(state, 0);
    let next_state = module.or_gate(state_bit, enable);
    let registered = module.add_dff(ctx.clk, ctx.posedge, next_state, ConstBit::Zero);
    module.alias_wire(state, registered);
    next_state
}

fn sva_kind(module: &Module, index: &ModIndex, bit: SigBit) -> Option<(CellId, PropKind)> {
    let cell_id = index.driver_cell(bit)?;
    match module.cell(cell_id)?.kind() {
        CellType::Sva(k) => Some((cell_id, *k)),
        _ => None,
    }
}

/// Translates the sequence AST rooted at `net` into `(a, en)`, starting from
/// `seq`. Covers implication, concatenation, consecutive repeat, and the
/// throughout/until family; any other SVA primitive either warns-and-passes-
/// through (lenient mode) or is a fatal error.
pub fn parse(
    module: &mut Module,
    index: &ModIndex,
    analyser: &mut TypeAnalyser,
    ctx: &mut CompileCtx,
    seq: SeqState,
    net: SigBit,
) -> Result<SeqState, SvaError> {
    let Some((cell_id, kind)) = sva_kind(module, index, net) else {
        return Ok(sequence_cond(module, seq, net));
    };
    if kind.is_always_leaf() {
        return Ok(sequence_cond(module, seq, net));
    }

    match kind {
        PropKind::ImplicationOverlapped | PropKind::ImplicationNonOverlapped => {
            let p = module.cell(cell_id).unwrap().port_bit("Input");
            let q = module.cell(cell_id).unwrap().port_bit("Input2");
            let linear_consequent = analyser.is_linear(module, index, q);

            let mut seq = parse(module, index, analyser, ctx, seq, p)?;
            seq.en = module.and_gate(seq.en, seq.a);

            if kind == PropKind::ImplicationNonOverlapped {
                seq = sequence_ff(module, ctx, seq);
            }

            if !linear_consequent && ctx.mode == Mode::Assume {
                return Err(SvaError::NonLinearConsequentInAssume);
            }

            if linear_consequent {
                parse(module, index, analyser, ctx, seq, q)
            } else {
                let (pulse, activated) = make_temporal_one_hot(module, ctx, seq.en);
                seq.en = pulse;

                let pass_latch_en = module.add_wire(module.new_id("pass_latch_en"), 1);
                let pass_latch = make_permanent_latch(module, ctx, SigBit::Wire(pass_latch_en, 0));

                ctx.alive_stack.push(Vec::new());
                let inner = parse(module, index, analyser, ctx, seq, q)?;
                let mut alive_list = ctx.alive_stack.pop().unwrap();

                let hit = module.and_gate(inner.a, inner.en);
                module.alias_wire(pass_latch_en, hit);
                alive_list.push(pass_latch);

                let combined_alive = alive_list
                    .into_iter()
                    .reduce(|a, b| module.or_gate(a, b))
                    .unwrap_or(SigBit::ZERO);

                Ok(SeqState { length: -1, a: combined_alive, en: activated })
            }
        }
        PropKind::SeqConcat => {
            let p = module.cell(cell_id).unwrap().port_bit("Input");
            let q = module.cell(cell_id).unwrap().port_bit("Input2");
            let (low, high) = bounds(module.cell(cell_id).unwrap());

            let mut seq = parse(module, index, analyser, ctx, seq, p)?;
            for _ in 0..low {
                seq = sequence_ff(module, ctx, seq);
            }

            match high {
                None => {
                    let latched_a = module.add_wire(module.new_id("concat_latch_a"), 1);
                    let latched_en = module.add_wire(module.new_id("concat_latch_en"), 1);
                    seq = combine_external(
                        module,
                        seq,
                        SigBit::Wire(latched_a, 0),
                        SigBit::Wire(latched_en, 0),
                    );
                    let ticked = sequence_ff(module, ctx, seq);
                    module.alias_wire(latched_a, ticked.a);
                    module.alias_wire(latched_en, ticked.en);
                }
                Some(high) => {
                    for _ in low..high {
                        let before = seq;
                        seq = sequence_ff(module, ctx, seq);
                        seq = combine_seq(module, seq, before);
                    }
                }
            }

            parse(module, index, analyser, ctx, seq, q)
        }
        PropKind::ConsecutiveRepeat => {
            let p = module.cell(cell_id).unwrap().port_bit("Input");
            let (low, high) = bounds(module.cell(cell_id).unwrap());

            let mut seq = parse(module, index, analyser, ctx, seq, p)?;
            for _ in 1..low {
                seq = sequence_ff(module, ctx, seq);
                seq = parse(module, index, analyser, ctx, seq, p)?;
            }

            match high {
                None => {
                    let latched_a = module.add_wire(module.new_id("repeat_latch_a"), 1);
                    let latched_en = module.add_wire(module.new_id("repeat_latch_en"), 1);
                    seq = combine_external(
                        module,
                        seq,
                        SigBit::Wire(latched_a, 0),
                        SigBit::Wire(latched_en, 0),
                    );
                    let mut ticked = sequence_ff(module, ctx, seq);
                    ticked = parse(module, index, analyser, ctx, ticked, p)?;
                    module.alias_wire(latched_a, ticked.a);
                    module.alias_wire(latched_en, ticked.en);
                }
                Some(high) => {
                    for _ in low..high {
                        let before = seq;
                        seq = sequence_ff(module, ctx, seq);
                        seq = parse(module, index, analyser, ctx, seq, p)?;
                        seq = combine_seq(module, seq, before);
                    }
                }
            }

            Ok(seq)
        }
        PropKind::Throughout
        | PropKind::Until
        | PropKind::SUntil
        | PropKind::UntilWith
        | PropKind::SUntilWith => {
            let first_operand = module.cell(cell_id).unwrap().port_bit("Input");
            let first_is_sequence = index
                .driver_cell(first_operand)
                .is_some_and(|c| matches!(module.cell(c).unwrap().kind(), CellType::Sva(_)));
            if first_is_sequence {
                return Err(SvaError::NonExpressionUntilOperand(kind));
            }

            let q = module.cell(cell_id).unwrap().port_bit("Input2");
            let inclusive = matches!(
                kind,
                PropKind::Throughout | PropKind::UntilWith | PropKind::SUntilWith
            );

            if inclusive {
                let mut seq = seq;
                seq.a = module.and_gate(seq.a, first_operand);
                ctx.until_inclusive.push(first_operand);
                let result = parse(module, index, analyser, ctx, seq, q);
                ctx.until_inclusive.pop();
                result
            } else {
                ctx.until_exclusive.push(first_operand);
                let result = parse(module, index, analyser, ctx, seq, q);
                ctx.until_exclusive.pop();
                result
            }
        }
        other => {
            if ctx.lenient {
                log::warn!("passthrough for unsupported SVA primitive {other:?}");
                Ok(sequence_cond(module, seq, net))
            } else {
                Err(SvaError::UnsupportedPrimitive(other))
            }
        }
    }
}

/// Runs [`sequence_ff`] one last time, as the top-level driver does after
/// parsing a property's outer sequence.
pub fn finish(module: &mut Module, ctx: &mut CompileCtx, seq: SeqState) -> SeqState {
    sequence_ff(module, ctx, seq)
}
