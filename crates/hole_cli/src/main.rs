//! holex - run, check and list hole-vm programs

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hole_vm::{disassemble, validate, Program, Vm, VmConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "holex", version, about = "Random-address register machine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Execute a program and print the outcome as JSON
    Run {
        /// Program file (JSON instruction records), `-` for stdin
        program: PathBuf,
        /// Number of memory cells
        #[arg(short, long)]
        memory: usize,
        /// Comma-separated input values
        #[arg(short, long, value_delimiter = ',', allow_hyphen_values = true)]
        input: Vec<i64>,
        /// RNG seed for memory addressing
        #[arg(long)]
        seed: Option<u64>,
        /// Fault after this many executed instructions
        #[arg(long)]
        step_limit: Option<u64>,
        /// Include a per-step trace in the outcome
        #[arg(long)]
        trace: bool,
        /// Reject the program before running if any instruction would fault
        #[arg(long)]
        strict: bool,
    },
    /// Report every fault detectable without running
    Check {
        program: PathBuf,
    },
    /// Print an annotated listing
    Disasm {
        program: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            program,
            memory,
            input,
            seed,
            step_limit,
            trace,
            strict,
        } => {
            let mut cfg = VmConfig::from_env().context("reading HOLE_VM_* environment")?;
            if let Some(seed) = seed {
                cfg = cfg.with_seed(seed);
            }
            if let Some(limit) = step_limit {
                cfg = cfg.with_step_limit(limit);
            }
            if trace {
                cfg = cfg.with_trace(true);
            }
            if strict {
                cfg = cfg.with_strict(true);
            }
            cmd_run(&program, cfg, memory, input)
        }
        Command::Check { program } => cmd_check(&program),
        Command::Disasm { program } => {
            let program = load_program(&program)?;
            print!("{}", disassemble(&program));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,hole_vm=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn load_program(path: &Path) -> Result<Program> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("reading program from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    };
    Program::from_json(&text).with_context(|| format!("decoding {}", path.display()))
}

fn cmd_run(path: &Path, cfg: VmConfig, memory: usize, input: Vec<i64>) -> Result<ExitCode> {
    let program = load_program(path)?;
    info!(
        program = %path.display(),
        instructions = program.len(),
        memory,
        inputs = input.len(),
        "running"
    );
    match Vm::new(cfg, &program, memory, input).run() {
        Ok(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("fault: {err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn cmd_check(path: &Path) -> Result<ExitCode> {
    let program = load_program(path)?;
    let report = validate(&program);
    for diag in &report.diagnostics {
        println!("{diag}");
    }
    println!(
        "{} instructions, {} errors, {} warnings",
        program.len(),
        report.error_count(),
        report.warning_count()
    );
    Ok(if report.has_errors() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
