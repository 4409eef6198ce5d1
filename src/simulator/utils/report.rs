use serde::Serialize;

use crate::accel::CopStats;

/// End-of-run summary
#[derive(Debug, Clone, Serialize)]
pub struct Report {
  pub cycles: u64,
  pub nlanes: usize,
  pub expected: Vec<u32>,
  pub actual: Vec<u32>,
  pub stats: CopStats,
  pub mem_requests: u64,
}

impl Report {
  pub fn passed(&self) -> bool {
    self.expected == self.actual
  }

  pub fn print(&self) {
    println!("\n--- Simulation Report ---");
    println!("  cycles:           {}", self.cycles);
    println!("  lanes:            {}", self.nlanes);
    println!("  dispatches:       {}", self.stats.dispatches);
    println!("  ignored go:       {}", self.stats.ignored_dispatches);
    println!("  busy cycles:      {}", self.stats.busy_cycles);
    println!("  memory requests:  {}", self.mem_requests);
    println!("  expected:         {:?}", self.expected);
    println!("  actual:           {:?}", self.actual);
    println!("  status:           {}", if self.passed() { "PASS" } else { "FAIL" });
    println!("--- End Report ---\n");
  }
}
