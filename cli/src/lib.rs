//! Pass-manager CLI: reads a [`Design`] from a JSON file (standing in for a
//! full RTLIL-style text format, which this suite doesn't implement), runs
//! one of the three transforms or the bus extractor over the modules matched
//! by a selection string, and writes the result back out.

mod errors;

use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use netsynth_ir::{Cell, CellType, Design, Selection};
use netsynth_recover::{extract_buses, recover_adders, recover_tff_counters};
use netsynth_sva::{compile_property, CompileOptions};

pub use errors::CliError;

/// Runs one recovery or compilation pass over a design.
#[derive(Debug, Parser)]
#[command(name = "netsynth", about = "Gate-level netlist recovery and SVA compilation passes")]
pub struct Cli {
    /// Path to the input design, serialized as JSON.
    pub design: PathBuf,

    /// Where to write the transformed design. Defaults to overwriting the input.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Module selection: empty or `*` for all modules, an exact module name,
    /// or `t:<prefix>` (unused for module selection, kept for symmetry with
    /// the cell-selection grammar).
    #[arg(short, long, default_value = "*")]
    pub selection: String,

    #[command(subcommand)]
    pub pass: Pass,
}

/// The passes exposed to the command line, one per transform in the suite.
#[derive(Debug, Subcommand)]
pub enum Pass {
    /// Compile SystemVerilog Assertion property roots into assert/assume/cover/live/fair cells.
    SvaCompile {
        /// Treat unsupported primitives as opaque leaves instead of failing the pass.
        #[arg(long)]
        lenient: bool,
    },
    /// Fold half/full adder and subtractor gate chains into `$add`/`$sub`/`$alu` cells.
    RecoverAdders,
    /// Recognize toggle-flipflop down-counter chains and replace them with `$__COUNT_` cells.
    RecoverTffCounters,
    /// Debus commutative-cell outputs that are concatenations of independent wires.
    ExtractBus,
}

pub fn run(cli: Cli) -> Result<(), CliError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = cli.design.to_string_lossy().into_owned();
    let text = fs::read_to_string(&cli.design)
        .map_err(|source| CliError::ReadDesign { path: path.clone(), source })?;
    let mut design: Design = serde_json::from_str(&text)?;

    let selection = Selection::parse(&cli.selection);
    let module_names: Vec<String> = design
        .selected_modules(&selection)
        .into_iter()
        .map(str::to_string)
        .collect();
    if module_names.is_empty() {
        return Err(CliError::EmptySelection);
    }

    for name in &module_names {
        let module = design.module_mut(name).expect("name came from selected_modules");
        match &cli.pass {
            Pass::SvaCompile { lenient } => run_sva_compile(module, *lenient, name)?,
            Pass::RecoverAdders => {
                let n = recover_adders(module)
                    .map_err(|source| CliError::Recover { module: name.clone(), source })?;
                log::info!("module {name}: recovered {n} adder/subtractor chain(s)");
            }
            Pass::RecoverTffCounters => {
                let n = recover_tff_counters(module);
                log::info!("module {name}: recovered {n} toggle-flipflop counter(s)");
            }
            Pass::ExtractBus => {
                let n = extract_buses(module);
                log::info!("module {name}: extracted {n} bus(es)");
            }
        }
    }

    let out_path = cli.output.unwrap_or(cli.design);
    let out_path_str = out_path.to_string_lossy().into_owned();
    let serialized = serde_json::to_string_pretty(&design)?;
    fs::write(&out_path, serialized)
        .map_err(|source| CliError::WriteDesign { path: out_path_str, source })?;

    Ok(())
}

fn run_sva_compile(
    module: &mut netsynth_ir::Module,
    lenient: bool,
    module_name: &str,
) -> Result<(), CliError> {
    let opts = CompileOptions { lenient, ..CompileOptions::default() };
    let roots: Vec<_> = module
        .cells()
        .filter(|c| matches!(c.kind(), CellType::Sva(k) if k.is_verification_root()))
        .map(Cell::id)
        .collect();

    let mut compiled = 0;
    for root in roots {
        let name = module.cell(root).map(|c| c.name().to_string());
        compile_property(module, root, name, &opts)
            .map_err(|source| CliError::Sva { module: module_name.to_string(), source })?;
        compiled += 1;
    }
    let noun = if compiled == 1 { "property" } else { "properties" };
    log::info!("module {module_name}: compiled {compiled} {noun}");
    Ok(())
}
