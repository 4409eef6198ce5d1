pub mod cop_regs;
pub mod dot_product;
pub mod mac_pipe;
pub mod mem_msg;
pub mod mvmult;

pub use cop_regs::{CopRegs, Dispatch};
pub use dot_product::{DotProductLane, LaneState};
pub use mac_pipe::MulAccPipeline;
pub use mem_msg::{CopReq, MemMsgType, MemReq, MemResp};
pub use mvmult::{CopState, CopStats, MatrixVec};
