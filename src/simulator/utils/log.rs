/// Global logging setup
use log::LevelFilter;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Level chosen at init, restored when quiet mode is switched off
static BASE_LEVEL: AtomicUsize = AtomicUsize::new(LevelFilter::Info as usize);

const LEVELS: [LevelFilter; 6] = [
  LevelFilter::Off,
  LevelFilter::Error,
  LevelFilter::Warn,
  LevelFilter::Info,
  LevelFilter::Debug,
  LevelFilter::Trace,
];

/// Initialize env_logger at `info`, overridable through `RUST_LOG`. Safe to call twice.
pub fn init_log() {
  init_log_with_level(LevelFilter::Info);
}

pub fn init_log_with_level(level: LevelFilter) {
  let installed = env_logger::Builder::new()
    .filter_level(level)
    .parse_default_env()
    .format_timestamp(None)
    .try_init()
    .is_ok();
  if installed {
    BASE_LEVEL.store(log::max_level() as usize, Ordering::Relaxed);
  }
}

/// Logger for `cargo test`: output goes through the test harness capture.
pub fn init_test_log() {
  let installed = env_logger::Builder::new()
    .filter_level(LevelFilter::Warn)
    .parse_default_env()
    .is_test(true)
    .try_init()
    .is_ok();
  if installed {
    BASE_LEVEL.store(log::max_level() as usize, Ordering::Relaxed);
  }
}

fn base_level() -> LevelFilter {
  LEVELS
    .get(BASE_LEVEL.load(Ordering::Relaxed))
    .copied()
    .unwrap_or(LevelFilter::Info)
}

/// Quiet mode keeps warnings and errors only; leaving it restores the init level.
pub fn set_quiet(quiet: bool) {
  log::set_max_level(quiet_level(quiet, base_level()));
}

fn quiet_level(quiet: bool, base: LevelFilter) -> LevelFilter {
  if quiet {
    base.min(LevelFilter::Warn)
  } else {
    base
  }
}

/// Print a log message with blue [Log] prefix
#[macro_export]
macro_rules! log_info {
  ($($arg:tt)*) => {
    println!("\x1b[34m[Log]\x1b[0m {}", format!($($arg)*));
  };
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn quiet_caps_at_warn_and_restores() {
    assert_eq!(quiet_level(true, LevelFilter::Debug), LevelFilter::Warn);
    assert_eq!(quiet_level(true, LevelFilter::Error), LevelFilter::Error);
    assert_eq!(quiet_level(false, LevelFilter::Debug), LevelFilter::Debug);
  }

  #[test]
  fn level_table_matches_discriminants() {
    for (i, level) in LEVELS.iter().enumerate() {
      assert_eq!(*level as usize, i);
    }
  }
}
