//! Extended Brainfuck VM - CLI
//!
//! Opens a program image, hands it to the engine and maps the outcome
//! to an exit status: 0 for a clean stop or ExitProg, 1 for anything fatal.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{info, Level};

use ebvm_core::loader::{MAX_PAGE_SIZE, PAGE_SIZE};
use ebvm_core::{VirtualMachine, VmConfig};

#[derive(Debug, Parser)]
#[command(name = "ebvm", version, about = "Run an Extended Brainfuck bytecode program")]
struct Args {
    /// Program image to execute
    program: PathBuf,

    /// Seed for the RandomNum instruction
    #[arg(long)]
    seed: Option<u64>,

    /// Bytes per program page
    #[arg(
        long,
        default_value_t = PAGE_SIZE,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..=MAX_PAGE_SIZE as u64),
    )]
    page_size: usize,

    /// Do not print the machine state on fatal errors
    #[arg(long)]
    no_dump: bool,

    /// Log verbosity on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn config(&self) -> VmConfig {
        VmConfig {
            page_size: self.page_size,
            rng_seed: self.seed,
            dump_on_fatal: !self.no_dump,
        }
    }
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    let code = run(&args);
    process::exit(code);
}

/// Everything that holds the program file lives in here, so it is
/// closed and stdout flushed before the process exits.
fn run(args: &Args) -> i32 {
    let program = match File::open(&args.program) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error: failed to open {}: {}", args.program.display(), e);
            return 1;
        }
    };

    let mut vm = VirtualMachine::new(
        args.config(),
        program,
        io::stdin().lock(),
        BufWriter::new(io::stdout().lock()),
    );

    match vm.execute() {
        Ok(halt) => {
            info!(?halt, pc = vm.pc(), "program finished");
            0
        }
        Err(e) => {
            eprintln!("error: {}", e);
            1
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_max_level(level)
        .with_writer(io::stderr)
        .try_init();
}
