//! Test tooling around the accelerator: latency-injecting memory, command source, harnesses.

pub mod harness;
pub mod test_memory;
pub mod test_source;
pub mod workload;

pub use harness::{config_msg, dot_config, matvec_config, DotProductHarness, Harness, MatrixVecHarness};
pub use test_memory::TestMemory;
pub use test_source::TestSource;
pub use workload::{reference_dot, Workload};
