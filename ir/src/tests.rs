use crate::{CellType, ConstBit, Design, ModIndex, Module, SigBit};

#[test]
fn and_gate_wires_up_fresh_output() {
    let mut module = Module::new("top");
    let a = module.add_port("a", 1);
    let b = module.add_port("b", 1);
    let y = module.and_gate(SigBit::Wire(a, 0), SigBit::Wire(b, 0));

    let index = ModIndex::build(&module);
    let driver = index.driver_cell(y).expect("and output must be driven");
    assert_eq!(module.cell(driver).unwrap().kind(), &CellType::And);
}

#[test]
fn mod_index_reports_fanout_and_port_escapes() {
    let mut module = Module::new("top");
    let a = module.add_port("a", 1);
    let a_bit = SigBit::Wire(a, 0);
    let y1 = module.not_gate(a_bit);
    let _y2 = module.not_gate(a_bit);

    let index = ModIndex::build(&module);
    assert_eq!(index.fanout_count(a_bit), 2);
    assert!(index.escapes_to_port(a_bit));
    assert!(!index.escapes_to_port(y1));
}

#[test]
fn dff_carries_init_attribute() {
    let mut module = Module::new("top");
    let clk = module.add_port("clk", 1);
    let d = module.add_port("d", 1);
    let q = module.add_dff(SigBit::Wire(clk, 0), true, SigBit::Wire(d, 0), ConstBit::Zero);
    let q_wire = q.wire().unwrap();
    assert_eq!(module.wire(q_wire).init(), Some(&[ConstBit::Zero][..]));
}

#[test]
fn removed_cells_are_skipped_by_iteration() {
    let mut module = Module::new("top");
    let a = module.add_port("a", 1);
    let id = {
        let y = module.not_gate(SigBit::Wire(a, 0));
        ModIndex::build(&module).driver_cell(y).unwrap()
    };
    assert_eq!(module.cells().count(), 1);
    module.remove_cell(id);
    assert_eq!(module.cells().count(), 0);
}

#[test]
fn selection_defaults_to_everything() {
    let mut design = Design::new();
    design.add_module(Module::new("alpha"));
    design.add_module(Module::new("beta"));
    let sel = crate::Selection::parse("");
    let mut names = design.selected_modules(&sel);
    names.sort();
    assert_eq!(names, vec!["alpha", "beta"]);
}
