/// Port and signal types for module interconnection

/// A wire/signal that carries data between modules.
/// Every wire carries its own valid flag.
#[derive(Clone, Debug)]
pub struct Wire<T: Clone> {
  pub value: T,
  pub valid: bool,
}

impl<T: Clone> Wire<T> {
  pub fn new(value: T) -> Self {
    Self { value, valid: false }
  }

  pub fn set(&mut self, value: T) {
    self.value = value;
    self.valid = true;
  }

  pub fn clear(&mut self) {
    self.valid = false;
  }
}

impl<T: Clone + Default> Default for Wire<T> {
  fn default() -> Self {
    Self {
      value: T::default(),
      valid: false,
    }
  }
}

/// Ready/valid channel.
///
/// The producer drives `val` and `msg`, the consumer drives `rdy`. A transfer happens in the
/// cycle where both are high; the producer keeps `val` and `msg` stable until then.
#[derive(Clone, Debug, Default)]
pub struct Channel<T: Clone> {
  pub msg: T,
  pub val: bool,
  pub rdy: bool,
}

impl<T: Clone> Channel<T> {
  /// Producer side: offer `msg` this cycle.
  pub fn send(&mut self, msg: T) {
    self.msg = msg;
    self.val = true;
  }

  /// Producer side: nothing to offer this cycle.
  pub fn idle(&mut self) {
    self.val = false;
  }

  /// Whether the handshake completes this cycle.
  pub fn fire(&self) -> bool {
    self.val && self.rdy
  }

  /// The message if it transfers this cycle.
  pub fn fired(&self) -> Option<&T> {
    if self.fire() {
      Some(&self.msg)
    } else {
      None
    }
  }
}

/// Copy `val`/`msg` from a producer's output to a consumer's input.
pub fn connect_fwd<T: Clone>(out: &Channel<T>, inp: &mut Channel<T>) {
  inp.msg = out.msg.clone();
  inp.val = out.val;
}

/// Copy `rdy` from a consumer's input back to a producer's output.
pub fn connect_bwd<T: Clone>(out: &mut Channel<T>, inp: &Channel<T>) {
  out.rdy = inp.rdy;
}

/// Full wiring of one channel between the combinational and sequential phases.
pub fn connect<T: Clone>(out: &mut Channel<T>, inp: &mut Channel<T>) {
  connect_fwd(out, inp);
  connect_bwd(out, inp);
}
