//! 核心内部错误类型
//!
//! 只在 Worker Pool / Agent Invoker / Tool Dispatcher 之间流转；
//! Orchestrator 在边界处把它们统一折算成文本，调用方永远看不到 CoreError。

use thiserror::Error;

/// 阻塞调用（Agent 或 Tool）在卸载执行过程中可能出现的错误
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Agent call failed: {0}")]
    AgentFailed(String),

    #[error("Tool execution failed: {0}")]
    ToolFailed(String),

    #[error("Blocking call exceeded deadline of {0} ms")]
    Timeout(u64),

    #[error("Worker pool closed")]
    PoolClosed,

    /// 阻塞闭包 panic，spawn_blocking 的 JoinError 被折算到这里
    #[error("Blocking call panicked: {0}")]
    Panicked(String),
}

impl CoreError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, CoreError::Timeout(_))
    }
}
