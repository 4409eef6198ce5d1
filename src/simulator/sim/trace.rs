use std::fs::File;
use std::io::{BufWriter, Result, Write};
use std::path::Path;

use crate::harness::{Harness, MatrixVecHarness};

/// One JSON object per simulated cycle
pub struct TraceWriter<W: Write> {
  writer: W,
}

impl TraceWriter<BufWriter<File>> {
  pub fn create(path: impl AsRef<Path>) -> Result<Self> {
    Ok(Self::new(BufWriter::new(File::create(path)?)))
  }
}

impl<W: Write> TraceWriter<W> {
  pub fn new(writer: W) -> Self {
    Self { writer }
  }

  pub fn record(&mut self, h: &MatrixVecHarness) -> Result<()> {
    let lanes: Vec<_> = h
      .cop
      .lanes()
      .iter()
      .map(|lane| {
        serde_json::json!({
          "state": lane.state(),
          "acc": lane.result(),
        })
      })
      .collect();
    let entry = serde_json::json!({
      "cycle": h.ncycles(),
      "state": h.cop.state(),
      "lanes": lanes,
      "results": h.cop.results(),
      "mem_requests": h.mem.total_requests(),
      "line": h.line_trace(),
    });
    writeln!(self.writer, "{}", entry)
  }

  pub fn flush(&mut self) -> Result<()> {
    self.writer.flush()
  }

  pub fn into_inner(self) -> W {
    self.writer
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::AccelConfig;

  #[test]
  fn one_line_per_record() {
    let mut h = MatrixVecHarness::new(&AccelConfig::new(1, 1), 0, 256, 0, Vec::new()).unwrap();
    let mut trace = TraceWriter::new(Vec::new());
    trace.record(&h).unwrap();
    h.cycle();
    trace.record(&h).unwrap();

    let text = String::from_utf8(trace.into_inner()).unwrap();
    let lines: Vec<serde_json::Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["cycle"], 0);
    assert_eq!(lines[1]["cycle"], 1);
    assert_eq!(lines[1]["state"], "Idle");
    assert_eq!(lines[1]["lanes"][0]["state"], "Idle");
  }
}
