use clap::Parser;
use log::error;
use mvmac::simulator::config::{apply_cli_overrides, load_config_file, load_default_config, CliOverrides};
use mvmac::simulator::utils::log::init_log;
use mvmac::{SimError, Simulator};
use std::path::PathBuf;
use std::process::ExitCode;

/// mvmac - cycle-level matrix-vector multiply accelerator simulator
#[derive(Parser, Debug)]
#[command(name = "mvmac")]
#[command(version = "0.1.0")]
#[command(about = "Cycle-level simulator of a multi-lane matrix-vector coprocessor", long_about = None)]
struct Args {
  /// Configuration file (defaults to configs/default.toml)
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Number of dot-product lanes
  #[arg(short, long)]
  lanes: Option<usize>,

  /// Multiply pipeline depth
  #[arg(long)]
  stages: Option<usize>,

  /// Extra memory response latency in cycles
  #[arg(long)]
  mem_delay: Option<u64>,

  /// Give up after this many cycles
  #[arg(long)]
  max_cycles: Option<u64>,

  /// Enable step mode (interactive stepping)
  #[arg(short, long)]
  step: bool,

  /// Quiet mode (suppress log messages)
  #[arg(short, long)]
  quiet: bool,

  /// Output trace file path
  #[arg(long, value_name = "FILE")]
  trace_file: Option<String>,
}

fn run(args: Args) -> mvmac::Result<()> {
  let mut config = match &args.config {
    Some(path) => load_config_file(path)?,
    None => load_default_config()?,
  };
  apply_cli_overrides(
    &mut config,
    &CliOverrides {
      lanes: args.lanes,
      stages: args.stages,
      mem_delay: args.mem_delay,
      max_cycles: args.max_cycles,
      quiet: args.quiet,
      step: args.step,
      trace_file: args.trace_file,
    },
  );

  let mut simulator = Simulator::from_app_config(config)?;
  let report = simulator.run()?;
  report.print();

  if !report.passed() {
    return Err(SimError::Mismatch {
      expected: report.expected,
      actual: report.actual,
    });
  }
  Ok(())
}

fn main() -> ExitCode {
  init_log();

  match run(Args::parse()) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      error!("{}", e);
      ExitCode::FAILURE
    },
  }
}
