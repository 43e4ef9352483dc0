use std::process::ExitCode;

use clap::Parser;
use miette::{Context, miette};

use arblang_opt::{OptLevel, PassManager};

mod demo;

/// Arb-Lang — middle-end demo driver
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Demo program to compile (see --list-demos)
    #[arg(short, long, default_value = "current")]
    demo: String,

    /// Optimisation level: 0, 1, or 2
    #[arg(long, default_value = "1", value_parser = parse_opt_level)]
    opt_level: OptLevel,

    /// Print the surface tree before lowering
    #[arg(long)]
    emit_ast: bool,

    /// Lower, validate, and optimise without printing the IR
    #[arg(long)]
    dry_run: bool,

    /// List the built-in demo programs and exit
    #[arg(long)]
    list_demos: bool,
}

fn parse_opt_level(s: &str) -> Result<OptLevel, String> {
    match s {
        "0" => Ok(OptLevel::O0),
        "1" => Ok(OptLevel::O1),
        "2" => Ok(OptLevel::O2),
        _ => Err(format!(
            "invalid optimisation level '{s}', expected 0, 1, or 2"
        )),
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> miette::Result<()> {
    env_logger::try_init().ok();

    let cli = Cli::parse();

    if cli.list_demos {
        for name in demo::list() {
            println!("{name}");
        }
        return Ok(());
    }

    // 1. Build the surface tree.
    let block = demo::build(&cli.demo).ok_or_else(|| {
        let available = demo::list().join(", ");
        miette!("unknown demo '{}' (available: {})", cli.demo, available)
    })?;

    if cli.emit_ast {
        print!("{block}");
        println!("------------------------------------------------------");
    }

    // 2. Lower to the nested IR.
    let mut program = arblang_lower::lower(&block)
        .map_err(|e| miette!("{e}"))
        .wrap_err("lowering failed")?;

    arblang_opt::validate(&program)
        .map_err(|e| miette!("{e}"))
        .wrap_err("lowered IR failed validation")?;

    // 3. Optimise.
    PassManager::for_level(cli.opt_level).run(&mut program);

    arblang_opt::validate(&program)
        .map_err(|e| miette!("{e}"))
        .wrap_err("optimised IR failed validation")?;

    // 4. Print.
    if !cli.dry_run {
        print!("{}", arblang_ir::dump_program(&program));
    }

    Ok(())
}
