//! 核心编排层：错误、时钟、Worker Pool、重试编排与构建器

pub mod builder;
pub mod clock;
pub mod error;
pub mod orchestrator;
pub mod pool;

pub use builder::OrchestratorBuilder;
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::CoreError;
pub use orchestrator::{
    is_valid_reply, Orchestrator, RetryState, DEFAULT_MAX_ATTEMPTS, FALLBACK_MESSAGE,
    INVALID_RESPONSE_MARKER,
};
pub use pool::{WorkerPool, DEFAULT_POOL_SIZE};
