use std::collections::HashMap;

use crate::{module::output_ports, CellId, Module, SigBit};

/// A single fan-out edge: `cell` consumes `bit` at the given `offset` within
/// the named port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortRef {
    pub cell: CellId,
    pub port: &'static str,
    pub offset: u32,
}

/// Precomputed driver/fan-out maps over a module's sig-bits.
///
/// Built once per pass invocation (passes don't mutate a module and reuse
/// the same index across the mutation; each rewrite that changes connectivity
/// rebuilds it). `query_ports(sig-bit)` answers "who drives or consumes this
/// bit" as a set of `(cell, port, offset)` triples.
pub struct ModIndex {
    driver: HashMap<SigBit, PortRef>,
    fanout: HashMap<SigBit, Vec<PortRef>>,
    port_bits: std::collections::HashSet<SigBit>,
}

impl ModIndex {
    pub fn build(module: &Module) -> Self {
        let mut driver = HashMap::new();
        let mut fanout: HashMap<SigBit, Vec<PortRef>> = HashMap::new();

        for cell in module.cells() {
            let outputs = output_ports(cell.kind());
            for (port_name, bits) in cell.ports() {
                let is_output = outputs.contains(&port_name);
                for (offset, bit) in bits.iter().enumerate() {
                    if bit.is_const() {
                        continue;
                    }
                    let port_ref = PortRef {
                        cell: cell.id(),
                        port: port_name,
                        offset: offset as u32,
                    };
                    if is_output {
                        driver.insert(*bit, port_ref);
                    } else {
                        fanout.entry(*bit).or_default().push(port_ref);
                    }
                }
            }
        }

        let port_bits = module
            .wires()
            .filter(|(_, w)| w.is_port())
            .flat_map(|(id, w)| (0..w.width()).map(move |o| SigBit::Wire(id, o)))
            .collect();

        Self { driver, fanout, port_bits }
    }

    /// The single cell driving `bit`, if any. Per the data-model invariant an
    /// AST-child net has exactly one driver; this returns `None` for
    /// undriven/constant bits rather than panicking, since callers (e.g. the
    /// adder recoverer's carry walk) treat "no driver" as a terminal case.
    pub fn driver_cell(&self, bit: SigBit) -> Option<CellId> {
        self.driver.get(&bit).map(|p| p.cell)
    }

    pub fn driver_port(&self, bit: SigBit) -> Option<PortRef> {
        self.driver.get(&bit).copied()
    }

    pub fn query_ports(&self, bit: SigBit) -> &[PortRef] {
        self.fanout.get(&bit).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fanout_count(&self, bit: SigBit) -> usize {
        self.query_ports(bit).len()
    }

    pub fn escapes_to_port(&self, bit: SigBit) -> bool {
        self.port_bits.contains(&bit)
    }
}
