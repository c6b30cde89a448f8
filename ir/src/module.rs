use std::collections::BTreeMap;

use crate::{Cell, CellId, CellType, ConstBit, PropKind, SigBit, Wire};

/// A typed, small integer handle into a [`Module`]'s wire arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WireId(pub(crate) u32);

impl WireId {
    pub fn to_usize(self) -> usize {
        self.0 as usize
    }
}

/// A module: a set of cells and wires, with a distinguished subset of wires
/// acting as ports.
///
/// Cells and wires live in insertion-order arenas, so module iteration order
/// is deterministic and fresh ids generated while a pass runs are
/// reproducible between runs. Removing a cell tombstones its slot rather
/// than shifting later ids.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Module {
    name: String,
    wires: Vec<Wire>,
    cells: Vec<Option<Cell>>,
    cell_order: Vec<CellId>,
    next_anon_id: u64,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            wires: Vec::new(),
            cells: Vec::new(),
            cell_order: Vec::new(),
            next_anon_id: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // --- wires -----------------------------------------------------------

    pub fn add_wire(&mut self, name: impl Into<String>, width: u32) -> WireId {
        let id = WireId(self.wires.len() as u32);
        self.wires.push(Wire::new(name, width));
        id
    }

    pub fn add_port(&mut self, name: impl Into<String>, width: u32) -> WireId {
        let id = self.add_wire(name, width);
        self.wires[id.to_usize()].is_port = true;
        id
    }

    pub fn wire(&self, id: WireId) -> &Wire {
        &self.wires[id.to_usize()]
    }

    pub fn wire_mut(&mut self, id: WireId) -> &mut Wire {
        &mut self.wires[id.to_usize()]
    }

    pub fn wires(&self) -> impl Iterator<Item = (WireId, &Wire)> {
        self.wires
            .iter()
            .enumerate()
            .map(|(i, w)| (WireId(i as u32), w))
    }

    pub fn is_port_bit(&self, bit: SigBit) -> bool {
        match bit {
            SigBit::Wire(w, _) => self.wire(w).is_port(),
            SigBit::Const(_) => false,
        }
    }

    // --- cells -------------------------------------------------------------

    /// Fresh identifier in the style of the IR facade's `NEW_ID` generator:
    /// deterministic given the module's cell-creation history, never reused.
    pub fn new_id(&mut self, prefix: &str) -> String {
        let n = self.next_anon_id;
        self.next_anon_id += 1;
        format!("$netsynth${prefix}${n}")
    }

    fn insert_cell(&mut self, kind: CellType, name: String) -> CellId {
        let id = CellId(self.cells.len() as u32);
        self.cells.push(Some(Cell {
            id,
            kind,
            ports: BTreeMap::new(),
            params: BTreeMap::new(),
            attributes: BTreeMap::new(),
            name,
        }));
        self.cell_order.push(id);
        id
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.to_usize()).and_then(Option::as_ref)
    }

    /// Generic cell constructor for cell kinds that don't fit one of the
    /// gate-constructor shortcuts below (`$add`/`$sub`/`$alu`/`$__COUNT_`/
    /// the bit-blasted adder placeholders, and `$not`). Callers set ports and
    /// params afterwards via [`Cell::set_port`]/[`Cell::set_param`].
    pub fn add_cell(&mut self, kind: CellType, name: impl Into<String>) -> CellId {
        self.insert_cell(kind, name.into())
    }

    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.cells.get_mut(id.to_usize()).and_then(Option::as_mut)
    }

    /// Live cells in insertion order. Tombstoned (removed) cells are skipped.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cell_order
            .iter()
            .filter_map(move |id| self.cell(*id))
    }

    /// Remove a cell from the module. This is the only mutation a pass
    /// should apply mid-iteration; callers stage ids in a "to remove" set and
    /// call this once iteration is complete.
    pub fn remove_cell(&mut self, id: CellId) {
        self.cells[id.to_usize()] = None;
    }

    // --- gate constructors ---------------------------------------------

    fn gate2(&mut self, kind: CellType, a: SigBit, b: SigBit, width: u32) -> SigBit {
        let name = self.new_id("gate");
        let id = self.insert_cell(kind, name);
        let y = self.add_wire(self.new_id("y"), width);
        let cell = self.cell_mut(id).unwrap();
        cell.set_port("A", vec![a]);
        cell.set_port("B", vec![b]);
        cell.set_port("Y", vec![SigBit::Wire(y, 0)]);
        SigBit::Wire(y, 0)
    }

    pub fn and_gate(&mut self, a: SigBit, b: SigBit) -> SigBit {
        self.gate2(CellType::And, a, b, 1)
    }

    pub fn or_gate(&mut self, a: SigBit, b: SigBit) -> SigBit {
        self.gate2(CellType::Or, a, b, 1)
    }

    pub fn andnot_gate(&mut self, a: SigBit, b: SigBit) -> SigBit {
        self.gate2(CellType::AndNot, a, b, 1)
    }

    pub fn nor_gate(&mut self, a: SigBit, b: SigBit) -> SigBit {
        self.gate2(CellType::Nor, a, b, 1)
    }

    pub fn xor_gate(&mut self, a: SigBit, b: SigBit) -> SigBit {
        self.gate2(CellType::Xor, a, b, 1)
    }

    pub fn not_gate(&mut self, a: SigBit) -> SigBit {
        let name = self.new_id("not");
        let id = self.insert_cell(CellType::Not, name);
        let y = self.add_wire(self.new_id("y"), 1);
        let cell = self.cell_mut(id).unwrap();
        cell.set_port("A", vec![a]);
        cell.set_port("Y", vec![SigBit::Wire(y, 0)]);
        SigBit::Wire(y, 0)
    }

    pub fn mux_gate(&mut self, sel: SigBit, a: SigBit, b: SigBit) -> SigBit {
        let name = self.new_id("mux");
        let id = self.insert_cell(CellType::Mux, name);
        let y = self.add_wire(self.new_id("y"), 1);
        let cell = self.cell_mut(id).unwrap();
        cell.set_port("A", vec![a]);
        cell.set_port("B", vec![b]);
        cell.set_port("S", vec![sel]);
        cell.set_port("Y", vec![SigBit::Wire(y, 0)]);
        SigBit::Wire(y, 0)
    }

    pub fn reduce_or_gate(&mut self, bits: &[SigBit]) -> SigBit {
        let name = self.new_id("reduce_or");
        let id = self.insert_cell(CellType::ReduceOr, name);
        let y = self.add_wire(self.new_id("y"), 1);
        let cell = self.cell_mut(id).unwrap();
        cell.set_port("A", bits.to_vec());
        cell.set_port("Y", vec![SigBit::Wire(y, 0)]);
        SigBit::Wire(y, 0)
    }

    pub fn anyseq_gate(&mut self) -> SigBit {
        let name = self.new_id("anyseq");
        let id = self.insert_cell(CellType::Anyseq, name);
        let y = self.add_wire(self.new_id("y"), 1);
        let cell = self.cell_mut(id).unwrap();
        cell.set_port("Y", vec![SigBit::Wire(y, 0)]);
        SigBit::Wire(y, 0)
    }

    pub fn add_buf_gate(&mut self, a: SigBit) -> SigBit {
        let name = self.new_id("buf");
        let id = self.insert_cell(CellType::Buf, name);
        let y = self.add_wire(self.new_id("y"), 1);
        let cell = self.cell_mut(id).unwrap();
        cell.set_port("A", vec![a]);
        cell.set_port("Y", vec![SigBit::Wire(y, 0)]);
        SigBit::Wire(y, 0)
    }

    /// Connects a wire created up front (a placeholder for a feedback loop)
    /// to its driver, via a buffer cell so the mod-index still finds a single
    /// driver for it. This is how the sequence compiler closes the
    /// infinite-delay and temporal-one-hot fixpoints: create the wire,
    /// recurse, then alias it to whatever the recursive call produced.
    pub fn alias_wire(&mut self, wire: WireId, driver: SigBit) {
        let name = self.new_id("alias");
        let id = self.insert_cell(CellType::Buf, name);
        let cell = self.cell_mut(id).unwrap();
        cell.set_port("A", vec![driver]);
        cell.set_port("Y", vec![SigBit::Wire(wire, 0)]);
    }

    /// A clocked 1-bit flip-flop, as used throughout the sequence compiler:
    /// samples `d` on the clock's active edge, resetting to `init` (usually
    /// constant 0) at time zero.
    pub fn add_dff(
        &mut self,
        clk: SigBit,
        posedge: bool,
        d: SigBit,
        init: ConstBit,
    ) -> SigBit {
        let flavor = if posedge { "P" } else { "N" }.to_string();
        let name = self.new_id("dff");
        let id = self.insert_cell(CellType::Dff { flavor }, name);
        let q = self.add_wire(self.new_id("q"), 1);
        self.wire_mut(q)
            .set_attribute("init", crate::AttrValue::Bits(vec![init]));
        let cell = self.cell_mut(id).unwrap();
        cell.set_port("CLK", vec![clk]);
        cell.set_port("D", vec![d]);
        cell.set_port("Q", vec![SigBit::Wire(q, 0)]);
        SigBit::Wire(q, 0)
    }

    // --- verification cell constructors ------------------------------------

    fn add_verification_cell(
        &mut self,
        kind: CellType,
        prefix: &str,
        a: SigBit,
        en: SigBit,
        name: Option<String>,
    ) -> CellId {
        let cell_name = name.unwrap_or_else(|| self.new_id(prefix));
        let id = self.insert_cell(kind, cell_name);
        let cell = self.cell_mut(id).unwrap();
        cell.set_port("A", vec![a]);
        cell.set_port("EN", vec![en]);
        id
    }

    pub fn add_assert(&mut self, a: SigBit, en: SigBit, name: Option<String>) -> CellId {
        self.add_verification_cell(CellType::Assert, "assert", a, en, name)
    }

    pub fn add_assume(&mut self, a: SigBit, en: SigBit, name: Option<String>) -> CellId {
        self.add_verification_cell(CellType::Assume, "assume", a, en, name)
    }

    pub fn add_cover(&mut self, a: SigBit, en: SigBit, name: Option<String>) -> CellId {
        self.add_verification_cell(CellType::Cover, "cover", a, en, name)
    }

    pub fn add_live(&mut self, a: SigBit, en: SigBit, name: Option<String>) -> CellId {
        self.add_verification_cell(CellType::Live, "live", a, en, name)
    }

    pub fn add_fair(&mut self, a: SigBit, en: SigBit, name: Option<String>) -> CellId {
        self.add_verification_cell(CellType::Fair, "fair", a, en, name)
    }

    // --- SVA AST cell constructors (front-end facade) ----------------------

    /// Registers a property-tree node delivered by the SVA front-end. This
    /// is how netsynth receives the AST: as ordinary cells of type
    /// [`CellType::Sva`], queryable through the same mod-index used for
    /// netlist fan-out.
    #[allow(clippy::too_many_arguments)]
    pub fn add_sva_node(
        &mut self,
        kind: PropKind,
        name: impl Into<String>,
        input: Option<SigBit>,
        input1: Option<SigBit>,
        input2: Option<SigBit>,
        input3: Option<SigBit>,
        control: Option<SigBit>,
    ) -> CellId {
        let name = name.into();
        let id = self.insert_cell(CellType::Sva(kind), name);
        let y = self.add_wire(self.new_id("sva"), 1);
        let cell = self.cell_mut(id).unwrap();
        cell.set_port("Y", vec![SigBit::Wire(y, 0)]);
        if let Some(b) = input {
            cell.set_port("Input", vec![b]);
        }
        if let Some(b) = input1 {
            cell.set_port("Input1", vec![b]);
        }
        if let Some(b) = input2 {
            cell.set_port("Input2", vec![b]);
        }
        if let Some(b) = input3 {
            cell.set_port("Input3", vec![b]);
        }
        if let Some(b) = control {
            cell.set_port("Control", vec![b]);
        }
        id
    }

    pub fn sva_output(&self, id: CellId) -> SigBit {
        self.cell(id).expect("sva node must exist").port_bit("Y")
    }
}

/// Direction table for [`CellType`] ports: which named ports are driven by
/// the cell (outputs) as opposed to consumed by it (inputs). Needed to build
/// the mod-index's driver and fan-out maps.
pub fn output_ports(kind: &CellType) -> &'static [&'static str] {
    match kind {
        CellType::And
        | CellType::Or
        | CellType::Not
        | CellType::Xor
        | CellType::AndNot
        | CellType::Nor
        | CellType::Mux
        | CellType::Buf
        | CellType::ReduceOr
        | CellType::Anyseq => &["Y"],
        CellType::Dff { .. } | CellType::Adff | CellType::Tff { .. } => &["Q"],
        CellType::Add | CellType::Sub => &["Y"],
        CellType::Alu => &["X", "Y", "CO"],
        CellType::HalfAdder => &["Y", "Cout"],
        CellType::FullAdder => &["Y", "Cout"],
        CellType::HalfSubtractor => &["Y", "Bout"],
        CellType::FullSubtractor => &["Y", "Bout"],
        CellType::Xor3 => &["Y"],
        CellType::Count => &["POUT"],
        CellType::Assert | CellType::Assume | CellType::Cover | CellType::Live | CellType::Fair => {
            &[]
        }
        CellType::Sva(_) => &["Y"],
    }
}
