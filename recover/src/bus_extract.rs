use netsynth_ir::{Cell, CellId, CellType, ModIndex, Module, SigBit};

/// Output ports guaranteed safe to debus: a multi-bit concatenation of
/// independent wires here can be replaced by a single fresh wire, because the
/// cell doesn't need to tell which bit came from which side (unlike `$add.A`/
/// `$add.B`, which are symmetric and would lose that information).
fn bus_ports(kind: &CellType) -> &'static [&'static str] {
    match kind {
        CellType::Add | CellType::Sub | CellType::Alu => &["Y"],
        CellType::Count => &["POUT"],
        _ => &[],
    }
}

fn already_single_wire(bits: &[SigBit]) -> bool {
    let Some(SigBit::Wire(w, 0)) = bits.first() else {
        return bits.is_empty();
    };
    bits.iter()
        .enumerate()
        .all(|(i, b)| *b == SigBit::Wire(*w, i as u32))
}

/// Converts a commutative-cell output port that's a concatenation of
/// independent 1-bit nets into a single fresh bus wire, patching every
/// downstream load and preserving port-facing names via a buffer gate.
///
/// Returns the number of ports converted.
pub fn extract_buses(module: &mut Module) -> usize {
    let index = ModIndex::build(module);
    let cell_ids: Vec<CellId> = module.cells().map(Cell::id).collect();
    let mut converted = 0;

    for cell_id in cell_ids {
        for &port in bus_ports(module.cell(cell_id).unwrap().kind()) {
            let Some(bits) = module.cell(cell_id).unwrap().port(port).map(|s| s.to_vec()) else {
                continue;
            };
            if already_single_wire(&bits) {
                continue;
            }

            log::info!("inferring bus for port {port} of cell {}", module.cell(cell_id).unwrap().name());
            let wire = module.add_wire(module.new_id("bus"), bits.len() as u32);
            let new_bits: Vec<SigBit> = (0..bits.len() as u32).map(|i| SigBit::Wire(wire, i)).collect();

            for (i, &old_bit) in bits.iter().enumerate() {
                for pref in index.query_ports(old_bit) {
                    if pref.cell == cell_id {
                        continue;
                    }
                    let mut consumer_bits = module.cell(pref.cell).unwrap().port(pref.port).unwrap().to_vec();
                    consumer_bits[pref.offset as usize] = new_bits[i];
                    module.cell_mut(pref.cell).unwrap().set_port(pref.port, consumer_bits);
                }

                if index.escapes_to_port(old_bit) {
                    if let SigBit::Wire(old_wire, 0) = old_bit {
                        module.alias_wire(old_wire, new_bits[i]);
                    }
                }
            }

            module.cell_mut(cell_id).unwrap().set_port(port, new_bits);
            converted += 1;
        }
    }

    converted
}
