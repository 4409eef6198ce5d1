use log::info;
use std::fs::File;
use std::io::BufWriter;

use super::config::AppConfig;
use super::sim::{Command, Shell, StepMode, TraceWriter};
use super::utils::log::set_quiet;
use super::utils::Report;
use crate::error::{Result, SimError};
use crate::harness::{Harness, MatrixVecHarness};
use crate::log_info;

/// Drives one configured matrix-vector run
pub struct Simulator {
  config: AppConfig,
  step_mode: StepMode,
  harness: MatrixVecHarness,
  trace: Option<TraceWriter<BufWriter<File>>>,
}

impl Simulator {
  pub fn from_app_config(config: AppConfig) -> Result<Self> {
    config.validate()?;

    let workload = &config.workload;
    let mut harness = MatrixVecHarness::new(
      &config.accel,
      config.memory.delay,
      config.memory.size_bytes,
      config.simulation.src_delay,
      workload.config_msgs(),
    )?;
    workload.load(&mut harness.mem);

    let trace = if config.simulation.trace_file.is_empty() {
      None
    } else {
      Some(TraceWriter::create(&config.simulation.trace_file)?)
    };

    Ok(Self {
      step_mode: StepMode::from_flag(config.simulation.step_mode),
      config,
      harness,
      trace,
    })
  }

  pub fn harness(&self) -> &MatrixVecHarness {
    &self.harness
  }

  pub fn run(&mut self) -> Result<Report> {
    set_quiet(self.config.simulation.quiet);
    info!(
      "{} lanes, {} multiply stages, memory delay {}",
      self.config.accel.nlanes, self.config.accel.nmul_stages, self.config.memory.delay
    );
    match self.step_mode {
      StepMode::Continuous => self.run_continuous()?,
      StepMode::Step => self.run_step_mode()?,
    }
    if let Some(trace) = self.trace.as_mut() {
      trace.flush()?;
    }
    Ok(self.report())
  }

  fn run_continuous(&mut self) -> Result<()> {
    while !self.harness.done() {
      self.step()?;
    }
    Ok(())
  }

  fn run_step_mode(&mut self) -> Result<()> {
    println!("Step mode - Enter steps one cycle, 'si N' steps N, 'c' continues, 'q' quits\n");
    let mut shell = Shell::new()?;
    while !self.harness.done() {
      match shell.read_command()? {
        Command::Step(n) => {
          for _ in 0..n {
            if self.harness.done() {
              break;
            }
            self.step()?;
            log_info!("{:>4}: {}", self.harness.ncycles(), self.harness.line_trace());
          }
        },
        Command::Continue => return self.run_continuous(),
        Command::Quit => break,
      }
    }
    Ok(())
  }

  fn step(&mut self) -> Result<()> {
    let max_cycles = self.config.simulation.max_cycles;
    if self.harness.ncycles() >= max_cycles {
      return Err(SimError::Timeout { cycles: max_cycles });
    }
    self.harness.cycle();
    if let Some(trace) = self.trace.as_mut() {
      trace.record(&self.harness)?;
    }
    Ok(())
  }

  /// Results as written to memory, next to the software reference.
  pub fn report(&self) -> Report {
    let nlanes = self.config.accel.nlanes;
    let workload = &self.config.workload;
    Report {
      cycles: self.harness.ncycles(),
      nlanes,
      expected: workload.expected(nlanes, self.config.accel.data_mask()),
      actual: self.harness.mem.read_words(workload.dest_base, nlanes),
      stats: self.harness.cop.stats(),
      mem_requests: self.harness.mem.total_requests(),
    }
  }
}
