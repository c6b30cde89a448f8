use std::collections::HashSet;

use netsynth_ir::{Cell, CellId, CellType, ModIndex, Module, Param, SigBit};

/// Recognizes a down-counter built from a toggle-flipflop chain and replaces
/// it with a single `$__COUNT_` cell.
///
/// The anchor is a register whose `D` is driven by `not(Q)` of itself; each
/// downstream stage is an `andnot(prev_toggle, Q)` feeding another register's
/// `T` input, sharing the anchor's clock and reset. Chains shorter than 3
/// bits (the LSB plus two downstream stages) are left alone.
///
/// Returns the number of counters recovered.
pub fn recover_tff_counters(module: &mut Module) -> usize {
    let index = ModIndex::build(module);
    let candidates: Vec<CellId> = module
        .cells()
        .filter(|c| matches!(c.kind(), CellType::Dff { .. }))
        .map(Cell::id)
        .collect();

    let mut to_remove: HashSet<CellId> = HashSet::new();
    let mut found = 0;

    for anchor_id in candidates {
        if to_remove.contains(&anchor_id) {
            continue;
        }
        let Some(downstream) = detect_chain(module, &index, anchor_id) else {
            continue;
        };
        let width = 1 + downstream.len();
        if width < 3 {
            continue;
        }

        log::info!(
            "recovered {width}-bit down counter anchored at cell {}",
            module.cell(anchor_id).unwrap().name()
        );
        log::warn!("not copying INIT attributes from incoming TFFs");
        log::warn!("not checking set/reset polarity on original TFFs");

        let anchor = module.cell(anchor_id).unwrap();
        let rst = anchor.port_bit("RST");
        let clk = anchor.port_bit("CLK");
        let mut pout = vec![anchor.port_bit("Q")];
        for &id in &downstream {
            pout.push(module.cell(id).unwrap().port_bit("Q"));
        }

        let name = module.new_id("count");
        let id = module.add_cell(CellType::Count, name);
        let cell = module.cell_mut(id).unwrap();
        cell.set_param("RESET_MODE", Param::Str("FIXME".into()));
        cell.set_param("WIDTH", Param::Int(width as i64));
        cell.set_param("COUNT_TO", Param::Int((1i64 << width) - 1));
        cell.set_param("HAS_CE", Param::Int(0));
        cell.set_param("HAS_POUT", Param::Int(1));
        cell.set_param("DIRECTION", Param::Str("DOWN".into()));
        cell.set_port("CE", vec![SigBit::ONE]);
        cell.set_port("UP", vec![SigBit::ZERO]);
        cell.set_port("RST", vec![rst]);
        cell.set_port("CLK", vec![clk]);
        cell.set_port("POUT", pout);

        to_remove.insert(anchor_id);
        to_remove.extend(downstream);
        found += 1;
    }

    for id in to_remove {
        module.remove_cell(id);
    }
    found
}

/// Returns the downstream toggle-flipflop chain (MSB-ward, not including the
/// anchor itself) if `anchor_id` matches the LSB pattern, else `None`.
fn detect_chain(module: &Module, index: &ModIndex, anchor_id: CellId) -> Option<Vec<CellId>> {
    let anchor = module.cell(anchor_id).unwrap();
    let d = anchor.port_bit("D");
    let not_id = index.driver_cell(d)?;
    if module.cell(not_id)?.kind() != &CellType::Not {
        return None;
    }
    let a = module.cell(not_id)?.port_bit("A");
    if index.driver_cell(a)? != anchor_id {
        return None;
    }

    let anchor_reset = anchor.port_bit("RST");
    let anchor_clock = anchor.port_bit("CLK");

    let mut downstream = Vec::new();
    let mut current = anchor_id;
    loop {
        let q = module.cell(current).unwrap().port_bit("Q");
        let mut andnots = Vec::new();
        for pref in index.query_ports(q) {
            if pref.cell == current {
                continue;
            }
            if downstream.is_empty() {
                if pref.port != "A" || module.cell(pref.cell).unwrap().kind() != &CellType::Not {
                    continue;
                }
            } else {
                if pref.port != "B" || module.cell(pref.cell).unwrap().kind() != &CellType::AndNot {
                    continue;
                }
                let noninv = module.cell(pref.cell).unwrap().port_bit("A");
                let noninv_driver = index.driver_cell(noninv);
                let t = module.cell(current).unwrap().port_bit("T");
                let expected_driver = index.driver_cell(t);
                if noninv_driver != expected_driver {
                    continue;
                }
            }
            andnots.push(pref.cell);
        }

        if andnots.is_empty() {
            break;
        }

        let mut hit = None;
        for anot in andnots {
            let y = module.cell(anot).unwrap().port_bit("Y");
            for pref in index.query_ports(y) {
                if pref.cell == current || pref.port != "T" {
                    continue;
                }
                let candidate = module.cell(pref.cell).unwrap();
                if candidate.port_bit("RST") != anchor_reset || candidate.port_bit("CLK") != anchor_clock {
                    continue;
                }
                hit = Some(pref.cell);
            }
        }

        match hit {
            Some(next) => {
                downstream.push(next);
                current = next;
            }
            None => break,
        }
    }

    Some(downstream)
}
