pub mod port;

pub use port::{connect, connect_bwd, connect_fwd, Channel, Wire};

/// A clocked hardware block.
///
/// Every cycle the parent calls `comb` on all children, wires the channels between them, then
/// calls `run` on all children. `comb` must only look at registered state so the order of
/// children inside one phase does not matter.
pub trait Module {
  /// Drive this cycle's outputs: `val`/`msg` on outgoing channels, `rdy` on incoming ones.
  fn comb(&mut self);

  /// Clock edge: sample the handshakes that fired and advance state.
  fn run(&mut self);

  fn reset(&mut self);

  fn name(&self) -> &str;

  fn line_trace(&self) -> String {
    String::new()
  }
}
