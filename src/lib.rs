pub mod accel;
pub mod builtin;
pub mod config;
pub mod error;
pub mod harness;
pub mod simulator;

pub use accel::{DotProductLane, MatrixVec};
pub use config::AccelConfig;
pub use error::{ConfigError, Result, SimError};
pub use simulator::utils::log;
pub use simulator::Simulator;
