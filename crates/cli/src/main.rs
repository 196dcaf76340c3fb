//! SAVM command-line assembler and runner.
//!
//! This binary provides a single entry point for working with the machine.
//! It performs:
//! 1. **Assemble:** Turn mnemonic source into a flat binary image.
//! 2. **Run:** Load an image at the RAM base and execute until halt.
//! 3. **Exec:** Assemble source straight into memory and execute it.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use savm_core::asm;
use savm_core::config::Config;
use savm_core::sim::machine::RunOutcome;
use savm_core::sim::{Machine, loader};

#[derive(Parser, Debug)]
#[command(
    name = "savm",
    author,
    version,
    about = "SAVM assembler and virtual machine",
    long_about = "Assemble mnemonic source into flat instruction images and run them.\n\nExamples:\n  savm asm boot.s -o boot.bin\n  savm run boot.bin --max-cycles 100000\n  savm exec boot.s --trace"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Assemble a source file into a binary image.
    Asm {
        /// Assembly source file.
        source: PathBuf,

        /// Output image path (defaults to the source with a .bin extension).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Load a binary image at the RAM base and run it.
    Run {
        /// Binary image to execute.
        image: PathBuf,

        /// JSON configuration file (defaults are used otherwise).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Stop after this many cycles even if the machine keeps running.
        #[arg(long)]
        max_cycles: Option<u64>,

        /// Enable per-instruction execution tracing on stderr.
        #[arg(long)]
        trace: bool,
    },

    /// Assemble a source file into memory and run it immediately.
    Exec {
        /// Assembly source file.
        source: PathBuf,

        /// JSON configuration file (defaults are used otherwise).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Stop after this many cycles even if the machine keeps running.
        #[arg(long)]
        max_cycles: Option<u64>,

        /// Enable per-instruction execution tracing on stderr.
        #[arg(long)]
        trace: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Asm { source, output } => cmd_asm(&source, output),
        Commands::Run {
            image,
            config,
            max_cycles,
            trace,
        } => {
            init_tracing(trace);
            let mut machine = build_machine(config);
            let base = machine.config.system.ram_base;
            let words = loader::load_file(&mut machine, base, &image).unwrap_or_else(|e| {
                eprintln!("[!] FATAL: could not load '{}': {e}", image.display());
                process::exit(1);
            });
            println!("[*] loaded {words} words at {base:#x}");
            run_machine(&mut machine, max_cycles);
        }
        Commands::Exec {
            source,
            config,
            max_cycles,
            trace,
        } => {
            init_tracing(trace);
            let code = assemble_or_exit(&source);
            let mut machine = build_machine(config);
            let base = machine.config.system.ram_base;
            let words = machine.load_image(base, &code).unwrap_or_else(|e| {
                eprintln!("[!] FATAL: image load failed: {e}");
                process::exit(1);
            });
            println!("[*] loaded {words} words at {base:#x}");
            run_machine(&mut machine, max_cycles);
        }
    }
}

fn init_tracing(trace: bool) {
    let filter = if trace { "savm_core=trace" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<PathBuf>) -> Config {
    let Some(path) = path else {
        return Config::default();
    };
    let text = std::fs::read_to_string(&path).unwrap_or_else(|e| {
        eprintln!("[!] FATAL: could not read config '{}': {e}", path.display());
        process::exit(1);
    });
    serde_json::from_str(&text).unwrap_or_else(|e| {
        eprintln!("[!] FATAL: bad config '{}': {e}", path.display());
        process::exit(1);
    })
}

fn build_machine(config: Option<PathBuf>) -> Machine {
    Machine::new(load_config(config)).unwrap_or_else(|e| {
        eprintln!("[!] FATAL: machine setup failed: {e}");
        process::exit(1);
    })
}

/// Assembles a source file, printing accumulated errors and exiting with
/// code 1 when any are present.
fn assemble_or_exit(source: &Path) -> Vec<u8> {
    let text = std::fs::read_to_string(source).unwrap_or_else(|e| {
        eprintln!(
            "[!] FATAL: could not read source '{}': {e}",
            source.display()
        );
        process::exit(1);
    });
    let assembly = asm::assemble_source(&text);
    if !assembly.errors.is_empty() {
        for error in &assembly.errors {
            eprintln!("{}: error: {error}", source.display());
        }
        process::exit(1);
    }
    assembly.code
}

fn cmd_asm(source: &Path, output: Option<PathBuf>) {
    let code = assemble_or_exit(source);
    let out_path = output.unwrap_or_else(|| source.with_extension("bin"));
    if let Err(e) = std::fs::write(&out_path, &code) {
        eprintln!("[!] FATAL: could not write '{}': {e}", out_path.display());
        process::exit(1);
    }
    println!(
        "[*] {} -> {} ({} instructions)",
        source.display(),
        out_path.display(),
        code.len() / 24
    );
}

/// Runs the machine and reports the outcome, UART output, and statistics.
fn run_machine(machine: &mut Machine, max_cycles: Option<u64>) {
    match machine.run(max_cycles) {
        Ok(RunOutcome::Halted { cycles }) => println!("[*] halted after {cycles} cycles"),
        Ok(RunOutcome::CycleLimit { cycles }) => {
            println!("[*] cycle limit reached after {cycles} cycles");
        }
        Err(e) => {
            eprintln!("\n[!] FATAL: {e}");
            dump_uart(machine);
            machine.stats.print();
            process::exit(1);
        }
    }

    dump_uart(machine);
    machine.stats.print();
}

fn dump_uart(machine: &mut Machine) {
    if let Some(uart) = machine.uart_mut() {
        let output = uart.take_output();
        if !output.is_empty() {
            println!("--- uart ---");
            println!("{}", String::from_utf8_lossy(&output));
        }
    }
}
