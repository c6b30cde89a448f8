use std::collections::{HashMap, HashSet, VecDeque};

use netsynth_ir::{Cell, CellId, CellType, Module, Param, SigBit};

use crate::RecoverError;

fn is_addsub_placeholder(kind: &CellType) -> bool {
    kind.is_half_adder_family() || kind.is_full_adder_family()
}

fn cin_port(is_sub: bool) -> &'static str {
    if is_sub { "Bin" } else { "Cin" }
}

fn cout_port(is_sub: bool) -> &'static str {
    if is_sub { "Bout" } else { "Cout" }
}

fn is_compatible_addsub(kind: &CellType, is_sub: bool) -> bool {
    if is_sub {
        matches!(kind, CellType::HalfSubtractor | CellType::FullSubtractor)
    } else {
        matches!(kind, CellType::HalfAdder | CellType::FullAdder)
    }
}

struct Chain {
    cells: VecDeque<CellId>,
    is_sub: bool,
    has_carryin: bool,
    has_carryout: bool,
    has_carry_fanout: bool,
}

/// Folds chains of `__HALF_ADDER_`/`__FULL_ADDER_`/`__HALF_SUBTRACTOR_`/
/// `__FULL_SUBTRACTOR_` (plus an optional `__XOR3_` terminator) into
/// word-level `$add`/`$sub`/`$alu` cells.
///
/// Returns the number of chains folded.
pub fn recover_adders(module: &mut Module) -> Result<usize, RecoverError> {
    let addsub_cells: Vec<CellId> = module
        .cells()
        .filter(|c| is_addsub_placeholder(c.kind()))
        .map(Cell::id)
        .collect();

    let mut carry_wires: HashMap<SigBit, HashSet<CellId>> = HashMap::new();
    for &id in &addsub_cells {
        let cell = module.cell(id).unwrap();
        match cell.kind() {
            CellType::HalfAdder => {
                carry_wires.entry(cell.port_bit("Cout")).or_default();
            }
            CellType::HalfSubtractor => {
                carry_wires.entry(cell.port_bit("Bout")).or_default();
            }
            CellType::FullAdder => {
                carry_wires.entry(cell.port_bit("Cout")).or_default();
                carry_wires.entry(cell.port_bit("Cin")).or_default();
            }
            CellType::FullSubtractor => {
                carry_wires.entry(cell.port_bit("Bout")).or_default();
                carry_wires.entry(cell.port_bit("Bin")).or_default();
            }
            _ => unreachable!(),
        }
    }

    for cell in module.cells() {
        for (_, bits) in cell.ports() {
            for bit in bits {
                if let Some(set) = carry_wires.get_mut(bit) {
                    set.insert(cell.id());
                }
            }
        }
    }

    let carry_fanout_to_port: HashSet<SigBit> = carry_wires
        .keys()
        .copied()
        .filter(|bit| module.is_port_bit(*bit))
        .collect();

    let mut consumed: HashSet<CellId> = HashSet::new();
    let mut chains = Vec::new();

    for &cell_id in &addsub_cells {
        if consumed.contains(&cell_id) {
            continue;
        }

        let is_sub = module
            .cell(cell_id)
            .unwrap()
            .kind()
            .is_subtractor();
        let mut has_carryin = false;
        let mut has_carryout = false;
        let mut has_carry_fanout = false;
        let mut chain: VecDeque<CellId> = VecDeque::from([cell_id]);

        // Extend left, toward the LSB.
        let mut x = cell_id;
        loop {
            let x_kind = module.cell(x).unwrap().kind().clone();
            if matches!(x_kind, CellType::HalfAdder | CellType::HalfSubtractor) {
                break;
            }
            let c = module.cell(x).unwrap().port_bit(cin_port(is_sub));
            let mut others: HashSet<CellId> = carry_wires.get(&c).cloned().unwrap_or_default();
            others.remove(&x);

            let mut connected = None;
            let mut count = 0;
            for &y in &others {
                if consumed.contains(&y) || chain.contains(&y) {
                    continue;
                }
                let ykind = module.cell(y).unwrap().kind();
                if is_compatible_addsub(ykind, is_sub)
                    && module.cell(y).unwrap().port_bit(cout_port(is_sub)) == c
                {
                    connected = Some(y);
                    count += 1;
                }
            }

            if count == 0 {
                has_carryin = true;
                break;
            } else if count > 1 {
                has_carryin = true;
                break;
            } else {
                if others.len() > 1 || carry_fanout_to_port.contains(&c) {
                    has_carry_fanout = true;
                }
                let y = connected.unwrap();
                chain.push_front(y);
                x = y;
            }
        }

        // Extend right, toward the MSB (and possibly an `__XOR3_` terminator).
        let mut x = cell_id;
        loop {
            if module.cell(x).unwrap().kind() == &CellType::Xor3 {
                break;
            }
            let c = module.cell(x).unwrap().port_bit(cout_port(is_sub));
            let mut others: HashSet<CellId> = carry_wires.get(&c).cloned().unwrap_or_default();
            others.remove(&x);

            let mut connected = None;
            let mut count = 0;
            for &y in &others {
                if consumed.contains(&y) || chain.contains(&y) {
                    continue;
                }
                let ykind = module.cell(y).unwrap().kind();
                let compatible = if is_sub {
                    matches!(ykind, CellType::Xor3 | CellType::FullSubtractor)
                } else {
                    matches!(ykind, CellType::Xor3 | CellType::FullAdder)
                };
                if compatible {
                    connected = Some(y);
                    count += 1;
                }
            }

            if count == 0 {
                has_carryout = true;
                break;
            } else if count > 1 {
                has_carryout = true;
                break;
            } else {
                if others.len() > 1 || carry_fanout_to_port.contains(&c) {
                    has_carry_fanout = true;
                }
                let y = connected.unwrap();
                chain.push_back(y);
                x = y;
            }
        }

        if chain.len() > 1 {
            for &id in &chain {
                consumed.insert(id);
            }
            chains.push(Chain { cells: chain, is_sub, has_carryin, has_carryout, has_carry_fanout });
        }
    }

    let n = chains.len();
    for chain in chains {
        emit_chain(module, chain)?;
    }
    for id in consumed {
        module.remove_cell(id);
    }
    Ok(n)
}

/// Per-stage `(A, B, Y)` bits, remapping an `__XOR3_` terminator's third
/// operand onto whichever of `A`/`B` doesn't already carry the previous
/// stage's carry-out.
fn gather_operands(
    module: &Module,
    chain: &VecDeque<CellId>,
    is_sub: bool,
) -> Result<(Vec<SigBit>, Vec<SigBit>, Vec<SigBit>), RecoverError> {
    let mut a = Vec::with_capacity(chain.len());
    let mut b = Vec::with_capacity(chain.len());
    let mut y = Vec::with_capacity(chain.len());

    for (i, &id) in chain.iter().enumerate() {
        let cell = module.cell(id).unwrap();
        let mut this_a = cell.port_bit("A");
        let mut this_b = cell.port_bit("B");
        if cell.kind() == &CellType::Xor3 {
            let this_c = cell.port_bit("C");
            let prev = module.cell(chain[i - 1]).unwrap();
            let last_carry = prev.port_bit(cout_port(is_sub));
            if this_a == last_carry {
                this_a = this_c;
            } else if this_b == last_carry {
                this_b = this_c;
            } else if this_c != last_carry {
                return Err(RecoverError::Xor3CarryMismatch(cell.name().to_string()));
            }
        }
        a.push(this_a);
        b.push(this_b);
        y.push(cell.port_bit("Y"));
    }

    Ok((a, b, y))
}

fn emit_chain(module: &mut Module, chain: Chain) -> Result<(), RecoverError> {
    let Chain { cells, is_sub, has_carryin, has_carryout, has_carry_fanout } = chain;
    let (a, b, mut y) = gather_operands(module, &cells, is_sub)?;

    if !has_carry_fanout {
        if has_carryout {
            let last = module.cell(*cells.back().unwrap()).unwrap();
            y.push(last.port_bit(cout_port(is_sub)));
        }

        let name = module.new_id(if is_sub { "sub" } else { "add" });
        let id = module.add_cell(if is_sub { CellType::Sub } else { CellType::Add }, name);
        let cell = module.cell_mut(id).unwrap();
        cell.set_param("A_SIGNED", Param::Int(0));
        cell.set_param("B_SIGNED", Param::Int(0));
        cell.set_param("A_WIDTH", Param::Int(a.len() as i64));
        cell.set_param("B_WIDTH", Param::Int(b.len() as i64));
        cell.set_param("Y_WIDTH", Param::Int(y.len() as i64));
        cell.set_port("A", a);
        cell.set_port("B", b.clone());

        if has_carryin {
            let intermed = module.add_wire(module.new_id("y"), y.len() as u32);
            let intermed_bits: Vec<SigBit> = (0..y.len() as u32).map(|i| SigBit::Wire(intermed, i)).collect();
            module.cell_mut(id).unwrap().set_port("Y", intermed_bits.clone());

            let carry_in_bit = module.cell(*cells.front().unwrap()).unwrap().port_bit(cin_port(is_sub));
            let name2 = module.new_id(if is_sub { "sub" } else { "add" });
            let id2 = module.add_cell(if is_sub { CellType::Sub } else { CellType::Add }, name2);
            let cell2 = module.cell_mut(id2).unwrap();
            cell2.set_param("A_SIGNED", Param::Int(0));
            cell2.set_param("B_SIGNED", Param::Int(0));
            cell2.set_param("A_WIDTH", Param::Int(y.len() as i64));
            cell2.set_param("B_WIDTH", Param::Int(1));
            cell2.set_param("Y_WIDTH", Param::Int(y.len() as i64));
            cell2.set_port("A", intermed_bits);
            cell2.set_port("B", vec![carry_in_bit]);
            cell2.set_port("Y", y);
        } else {
            module.cell_mut(id).unwrap().set_port("Y", y);
        }
    } else {
        let mut cout = Vec::with_capacity(cells.len());
        for &id in &cells {
            let cell = module.cell(id).unwrap();
            if let Some(bit) = cell.port(cout_port(is_sub)).and_then(|bits| bits.first()) {
                cout.push(*bit);
            } else {
                let w = module.add_wire(module.new_id("y"), 1);
                cout.push(SigBit::Wire(w, 0));
            }
        }

        let name = module.new_id("alu");
        let alu_id = module.add_cell(CellType::Alu, name);
        let x_wire = module.add_wire(module.new_id("y"), y.len() as u32);
        let x_bits: Vec<SigBit> = (0..y.len() as u32).map(|i| SigBit::Wire(x_wire, i)).collect();

        {
            let cell = module.cell_mut(alu_id).unwrap();
            cell.set_param("A_SIGNED", Param::Int(0));
            cell.set_param("B_SIGNED", Param::Int(0));
            cell.set_param("A_WIDTH", Param::Int(a.len() as i64));
            cell.set_param("B_WIDTH", Param::Int(b.len() as i64));
            cell.set_param("Y_WIDTH", Param::Int(y.len() as i64));
            cell.set_port("A", a);
            cell.set_port("B", b);
            cell.set_port("X", x_bits);
            cell.set_port("Y", y);
        }

        if !is_sub {
            let cell = module.cell_mut(alu_id).unwrap();
            cell.set_port("BI", vec![SigBit::ZERO]);
            cell.set_port("CO", cout);
            let ci = if has_carryin {
                module.cell(*cells.front().unwrap()).unwrap().port_bit("Cin")
            } else {
                SigBit::ZERO
            };
            module.cell_mut(alu_id).unwrap().set_port("CI", vec![ci]);
        } else {
            module.cell_mut(alu_id).unwrap().set_port("BI", vec![SigBit::ONE]);

            let invert_wire = module.add_wire(module.new_id("y"), cout.len() as u32);
            let invert_bits: Vec<SigBit> =
                (0..cout.len() as u32).map(|i| SigBit::Wire(invert_wire, i)).collect();
            let not_name = module.new_id("not");
            let not_id = module.add_cell(CellType::Not, not_name);
            let not_cell = module.cell_mut(not_id).unwrap();
            not_cell.set_param("A_SIGNED", Param::Int(0));
            not_cell.set_param("A_WIDTH", Param::Int(cout.len() as i64));
            not_cell.set_param("Y_WIDTH", Param::Int(cout.len() as i64));
            not_cell.set_port("A", invert_bits.clone());
            not_cell.set_port("Y", cout);
            module.cell_mut(alu_id).unwrap().set_port("CO", invert_bits);

            if has_carryin {
                let bin = module.cell(*cells.front().unwrap()).unwrap().port_bit("Bin");
                let invert_w = module.add_wire(module.new_id("y"), 1);
                let invert_bit = SigBit::Wire(invert_w, 0);
                let not_name2 = module.new_id("not");
                let not_id2 = module.add_cell(CellType::Not, not_name2);
                let not_cell2 = module.cell_mut(not_id2).unwrap();
                not_cell2.set_param("A_SIGNED", Param::Int(0));
                not_cell2.set_param("A_WIDTH", Param::Int(1));
                not_cell2.set_param("Y_WIDTH", Param::Int(1));
                not_cell2.set_port("A", vec![bin]);
                not_cell2.set_port("Y", vec![invert_bit]);
                module.cell_mut(alu_id).unwrap().set_port("CI", vec![invert_bit]);
            } else {
                module.cell_mut(alu_id).unwrap().set_port("CI", vec![SigBit::ONE]);
            }
        }
    }

    Ok(())
}
