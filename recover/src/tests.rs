use netsynth_ir::{CellType, Module, Param, SigBit};

use crate::{extract_buses, recover_adders, recover_tff_counters};

fn half_adder(module: &mut Module, a: SigBit, b: SigBit) -> (SigBit, SigBit) {
    let y = module.add_wire(module.new_id("y"), 1);
    let cout = module.add_wire(module.new_id("cout"), 1);
    let name = module.new_id("ha");
    let id = module.add_cell(CellType::HalfAdder, name);
    let cell = module.cell_mut(id).unwrap();
    cell.set_port("A", vec![a]);
    cell.set_port("B", vec![b]);
    cell.set_port("Y", vec![SigBit::Wire(y, 0)]);
    cell.set_port("Cout", vec![SigBit::Wire(cout, 0)]);
    (SigBit::Wire(y, 0), SigBit::Wire(cout, 0))
}

fn full_adder(module: &mut Module, a: SigBit, b: SigBit, cin: SigBit) -> (SigBit, SigBit) {
    let y = module.add_wire(module.new_id("y"), 1);
    let cout = module.add_wire(module.new_id("cout"), 1);
    let name = module.new_id("fa");
    let id = module.add_cell(CellType::FullAdder, name);
    let cell = module.cell_mut(id).unwrap();
    cell.set_port("A", vec![a]);
    cell.set_port("B", vec![b]);
    cell.set_port("Cin", vec![cin]);
    cell.set_port("Y", vec![SigBit::Wire(y, 0)]);
    cell.set_port("Cout", vec![SigBit::Wire(cout, 0)]);
    (SigBit::Wire(y, 0), SigBit::Wire(cout, 0))
}

fn half_subtractor(module: &mut Module, a: SigBit, b: SigBit) -> (SigBit, SigBit) {
    let y = module.add_wire(module.new_id("y"), 1);
    let bout = module.add_wire(module.new_id("bout"), 1);
    let name = module.new_id("hs");
    let id = module.add_cell(CellType::HalfSubtractor, name);
    let cell = module.cell_mut(id).unwrap();
    cell.set_port("A", vec![a]);
    cell.set_port("B", vec![b]);
    cell.set_port("Y", vec![SigBit::Wire(y, 0)]);
    cell.set_port("Bout", vec![SigBit::Wire(bout, 0)]);
    (SigBit::Wire(y, 0), SigBit::Wire(bout, 0))
}

fn full_subtractor(module: &mut Module, a: SigBit, b: SigBit, bin: SigBit) -> (SigBit, SigBit) {
    let y = module.add_wire(module.new_id("y"), 1);
    let bout = module.add_wire(module.new_id("bout"), 1);
    let name = module.new_id("fs");
    let id = module.add_cell(CellType::FullSubtractor, name);
    let cell = module.cell_mut(id).unwrap();
    cell.set_port("A", vec![a]);
    cell.set_port("B", vec![b]);
    cell.set_port("Bin", vec![bin]);
    cell.set_port("Y", vec![SigBit::Wire(y, 0)]);
    cell.set_port("Bout", vec![SigBit::Wire(bout, 0)]);
    (SigBit::Wire(y, 0), SigBit::Wire(bout, 0))
}

/// A 2-bit ripple-carry chain (half adder + full adder) with no carry
/// fan-out folds into a single `$add` whose `Y` exposes the final carry-out
/// as its top bit.
#[test]
fn two_bit_chain_without_fanout_becomes_add() {
    let mut module = Module::new("top");
    let a0 = SigBit::Wire(module.add_wire("a0", 1), 0);
    let b0 = SigBit::Wire(module.add_wire("b0", 1), 0);
    let a1 = SigBit::Wire(module.add_wire("a1", 1), 0);
    let b1 = SigBit::Wire(module.add_wire("b1", 1), 0);

    let (_y0, cout0) = half_adder(&mut module, a0, b0);
    let (_y1, _cout1) = full_adder(&mut module, a1, b1, cout0);

    let n = recover_adders(&mut module).unwrap();
    assert_eq!(n, 1);

    let add_cells: Vec<_> = module.cells().filter(|c| c.kind() == &CellType::Add).collect();
    assert_eq!(add_cells.len(), 1);
    let cell = add_cells[0];
    assert_eq!(cell.param("A_WIDTH").unwrap().as_int(), Some(2));
    assert_eq!(cell.param("Y_WIDTH").unwrap().as_int(), Some(3));
    assert!(!module.cells().any(|c| c.kind() == &CellType::HalfAdder || c.kind() == &CellType::FullAdder));
}

/// The same chain, but the intermediate carry wire also drives a third,
/// unrelated cell: carry fan-out forces the `$alu` emission path instead,
/// with `CO` wired to the original stage-by-stage carry sequence.
#[test]
fn carry_fanout_forces_alu() {
    let mut module = Module::new("top");
    let a0 = SigBit::Wire(module.add_wire("a0", 1), 0);
    let b0 = SigBit::Wire(module.add_wire("b0", 1), 0);
    let a1 = SigBit::Wire(module.add_wire("a1", 1), 0);
    let b1 = SigBit::Wire(module.add_wire("b1", 1), 0);

    let (_y0, cout0) = half_adder(&mut module, a0, b0);
    let (_y1, cout1) = full_adder(&mut module, a1, b1, cout0);
    let _extra = module.and_gate(cout0, SigBit::ONE);

    let n = recover_adders(&mut module).unwrap();
    assert_eq!(n, 1);

    let alu_cells: Vec<_> = module.cells().filter(|c| c.kind() == &CellType::Alu).collect();
    assert_eq!(alu_cells.len(), 1);
    let co = alu_cells[0].port("CO").unwrap();
    assert_eq!(co, &[cout0, cout1][..]);
}

/// A half/full-subtractor chain with carry fan-out also forces the `$alu`
/// path, with `BI` tied high and `CO` equal to the bit-wise inverse of the
/// original `Bout` sequence (the subtractor's borrow-out is itself the
/// inverted carry-out the `$alu` primitive expects).
#[test]
fn carry_fanout_subtractor_forces_alu_with_inverted_co() {
    let mut module = Module::new("top");
    let a0 = SigBit::Wire(module.add_wire("a0", 1), 0);
    let b0 = SigBit::Wire(module.add_wire("b0", 1), 0);
    let a1 = SigBit::Wire(module.add_wire("a1", 1), 0);
    let b1 = SigBit::Wire(module.add_wire("b1", 1), 0);

    let (_y0, bout0) = half_subtractor(&mut module, a0, b0);
    let (_y1, bout1) = full_subtractor(&mut module, a1, b1, bout0);
    let _extra = module.and_gate(bout0, SigBit::ONE);

    let n = recover_adders(&mut module).unwrap();
    assert_eq!(n, 1);

    let alu_cells: Vec<_> = module.cells().filter(|c| c.kind() == &CellType::Alu).collect();
    assert_eq!(alu_cells.len(), 1);
    let alu = alu_cells[0];
    assert_eq!(alu.port_bit("BI"), SigBit::ONE);

    let co = alu.port("CO").unwrap().to_vec();
    assert_eq!(co.len(), 2);
    let not_cell = module
        .cells()
        .find(|c| c.kind() == &CellType::Not && c.port("A") == Some(&co[..]))
        .expect("CO should feed a $not whose output is the original Bout sequence");
    assert_eq!(not_cell.port("Y"), Some(&[bout0, bout1][..]));
}

/// A lone half adder (chain length 1) is left untouched.
#[test]
fn single_cell_chain_is_not_rewritten() {
    let mut module = Module::new("top");
    let a0 = SigBit::Wire(module.add_wire("a0", 1), 0);
    let b0 = SigBit::Wire(module.add_wire("b0", 1), 0);
    half_adder(&mut module, a0, b0);

    let n = recover_adders(&mut module).unwrap();
    assert_eq!(n, 0);
    assert!(module.cells().any(|c| c.kind() == &CellType::HalfAdder));
}

fn dff(module: &mut Module, clk: SigBit, rst: SigBit, d: SigBit) -> (SigBit, netsynth_ir::CellId) {
    let q = module.add_wire(module.new_id("q"), 1);
    let name = module.new_id("dff");
    let id = module.add_cell(CellType::Dff { flavor: "P".into() }, name);
    let cell = module.cell_mut(id).unwrap();
    cell.set_port("CLK", vec![clk]);
    cell.set_port("RST", vec![rst]);
    cell.set_port("D", vec![d]);
    cell.set_port("Q", vec![SigBit::Wire(q, 0)]);
    (SigBit::Wire(q, 0), id)
}

fn tff(module: &mut Module, clk: SigBit, rst: SigBit, t: SigBit) -> SigBit {
    let q = module.add_wire(module.new_id("q"), 1);
    let name = module.new_id("tff");
    let id = module.add_cell(CellType::Tff { flavor: "P".into() }, name);
    let cell = module.cell_mut(id).unwrap();
    cell.set_port("CLK", vec![clk]);
    cell.set_port("RST", vec![rst]);
    cell.set_port("T", vec![t]);
    cell.set_port("Q", vec![SigBit::Wire(q, 0)]);
    SigBit::Wire(q, 0)
}

/// Wires up an `n`-bit TFF down-counter chain: a self-toggling anchor
/// flipflop (`D = not(Q)`) followed by `n - 1` `andnot`-gated toggle stages.
fn build_counter_chain(module: &mut Module, clk: SigBit, rst: SigBit, n: usize) -> SigBit {
    // D is a placeholder until the inverter exists, then patched directly
    // (the anchor's Q feeds back into its own D through that inverter).
    let (anchor_q, anchor_id) = dff(module, clk, rst, SigBit::ZERO);
    let toggle0 = module.not_gate(anchor_q);
    module.cell_mut(anchor_id).unwrap().set_port("D", vec![toggle0]);

    let mut prev_toggle = toggle0;
    let mut prev_q = anchor_q;
    for _ in 1..n {
        let andnot_out = module.andnot_gate(prev_toggle, prev_q);
        let q = tff(module, clk, rst, andnot_out);
        prev_toggle = andnot_out;
        prev_q = q;
    }
    anchor_q
}

/// A 4-bit TFF counter chain folds into one `$__COUNT_` cell with `POUT`
/// ordered LSB-first: `POUT[i]` is exactly stage `i`'s original `Q`.
#[test]
fn four_bit_tff_chain_becomes_counter() {
    let mut module = Module::new("top");
    let clk = SigBit::Wire(module.add_wire("clk", 1), 0);
    let rst = SigBit::Wire(module.add_wire("rst", 1), 0);

    let (anchor_q, anchor_id) = dff(&mut module, clk, rst, SigBit::ZERO);
    let toggle0 = module.not_gate(anchor_q);
    module.cell_mut(anchor_id).unwrap().set_port("D", vec![toggle0]);

    let mut stage_qs = vec![anchor_q];
    let mut prev_toggle = toggle0;
    let mut prev_q = anchor_q;
    for _ in 1..4 {
        let andnot_out = module.andnot_gate(prev_toggle, prev_q);
        let q = tff(&mut module, clk, rst, andnot_out);
        stage_qs.push(q);
        prev_toggle = andnot_out;
        prev_q = q;
    }

    let n = recover_tff_counters(&mut module);
    assert_eq!(n, 1);

    let counters: Vec<_> = module.cells().filter(|c| c.kind() == &CellType::Count).collect();
    assert_eq!(counters.len(), 1);
    let cell = counters[0];
    assert_eq!(cell.param("WIDTH").unwrap().as_int(), Some(4));
    assert_eq!(cell.param("COUNT_TO").unwrap().as_int(), Some(15));
    assert_eq!(cell.port("POUT").unwrap(), &stage_qs[..]);
}

/// A 2-bit chain is below the width-3 threshold and is left alone.
#[test]
fn two_bit_tff_chain_is_not_rewritten() {
    let mut module = Module::new("top");
    let clk = SigBit::Wire(module.add_wire("clk", 1), 0);
    let rst = SigBit::Wire(module.add_wire("rst", 1), 0);
    build_counter_chain(&mut module, clk, rst, 2);

    let n = recover_tff_counters(&mut module);
    assert_eq!(n, 0);
    assert!(!module.cells().any(|c| c.kind() == &CellType::Count));
}

/// An `$add.Y` port backed by two independent 1-bit wires (one of them a
/// module port) is converted to a single bus wire, with a buffer gate
/// preserving the port-facing wire's name.
#[test]
fn extract_bus_converts_split_add_output() {
    let mut module = Module::new("top");
    let y0 = module.add_port("y0", 1);
    let y1 = module.add_wire("y1", 1);

    let name = module.new_id("add");
    let id = module.add_cell(CellType::Add, name);
    let cell = module.cell_mut(id).unwrap();
    cell.set_param("A_WIDTH", Param::Int(2));
    cell.set_param("B_WIDTH", Param::Int(2));
    cell.set_param("Y_WIDTH", Param::Int(2));
    cell.set_port("Y", vec![SigBit::Wire(y0, 0), SigBit::Wire(y1, 0)]);

    let downstream_bit1 = module.and_gate(SigBit::Wire(y1, 0), SigBit::ONE);
    let _ = downstream_bit1;

    let n = extract_buses(&mut module);
    assert_eq!(n, 1);

    let cell = module.cell(id).unwrap();
    let bits = cell.port("Y").unwrap();
    assert_eq!(bits.len(), 2);
    let bus_wire = bits[0].wire().unwrap();
    assert_eq!(bits[1], SigBit::Wire(bus_wire, 1));

    // A buffer gate now drives the original port wire from the new bus.
    assert!(module.cells().any(|c| {
        c.kind() == &CellType::Buf && c.port("Y") == Some(&[SigBit::Wire(y0, 0)][..])
    }));
}

/// An `$add.Y` port already backed by a single contiguous wire is left
/// untouched: no new bus wire, no buffer gate, same cell count.
#[test]
fn extract_bus_leaves_already_contiguous_port_untouched() {
    let mut module = Module::new("top");
    let y = module.add_wire("y", 2);

    let name = module.new_id("add");
    let id = module.add_cell(CellType::Add, name);
    let cell = module.cell_mut(id).unwrap();
    cell.set_param("A_WIDTH", Param::Int(2));
    cell.set_param("B_WIDTH", Param::Int(2));
    cell.set_param("Y_WIDTH", Param::Int(2));
    cell.set_port("Y", vec![SigBit::Wire(y, 0), SigBit::Wire(y, 1)]);

    let cells_before = module.cells().count();
    let n = extract_buses(&mut module);
    assert_eq!(n, 0);
    assert_eq!(module.cells().count(), cells_before);
    assert_eq!(
        module.cell(id).unwrap().port("Y").unwrap(),
        &[SigBit::Wire(y, 0), SigBit::Wire(y, 1)][..]
    );
}
