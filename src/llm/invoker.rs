//! Agent Invoker：把阻塞的 Agent 调用提交到 WorkerPool 并等待结果
//!
//! Agent 报错、超时、panic 与空回复都不会向上抛出，而是折算为 AgentReply 的哨兵变体：
//! Empty / Failed 由 Orchestrator 重试，TimedOut 的调用仍在池中运行，Orchestrator 不再重试。

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use crate::core::{Clock, CoreError, WorkerPool};
use crate::llm::Agent;
use crate::observability::preview;

/// Agent 返回空字符串时的哨兵文本
pub const EMPTY_RESPONSE_SENTINEL: &str = "Error: Empty response from LLM.";
/// Agent 调用失败时的哨兵文本
pub const AGENT_ERROR_SENTINEL: &str = "There was an error processing your request.";

/// 带时间标注的 prompt：用户消息 + 调用时刻渲染的当前时间
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampedPrompt {
    text: String,
}

impl TimestampedPrompt {
    pub fn build(message: &str, clock: &dyn Clock) -> Self {
        Self {
            text: format!("{} (Current time: {})", message, clock.now()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for TimestampedPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// 一次 Agent 调用的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentReply {
    /// 非空的原始回复（未经清洗，不可信）
    Text(String),
    /// Agent 返回了空字符串
    Empty,
    /// Agent 报错或 panic
    Failed,
    /// 超过单次调用期限；阻塞调用仍在池中运行直到自行返回
    TimedOut,
}

impl AgentReply {
    /// 哨兵变体渲染为固定文本，Text 原样返回
    pub fn as_text(&self) -> &str {
        match self {
            AgentReply::Text(text) => text,
            AgentReply::Empty => EMPTY_RESPONSE_SENTINEL,
            AgentReply::Failed | AgentReply::TimedOut => AGENT_ERROR_SENTINEL,
        }
    }
}

/// 持有 Agent 与共享的 WorkerPool
pub struct AgentInvoker {
    agent: Arc<dyn Agent>,
    pool: Arc<WorkerPool>,
}

impl AgentInvoker {
    pub fn new(agent: Arc<dyn Agent>, pool: Arc<WorkerPool>) -> Self {
        Self { agent, pool }
    }

    pub async fn invoke(&self, prompt: &TimestampedPrompt) -> AgentReply {
        let agent = self.agent.clone();
        let text = prompt.as_str().to_string();
        let start = Instant::now();

        let result = self
            .pool
            .run(move || agent.run(&text))
            .await
            .and_then(|r| r.map_err(CoreError::AgentFailed));
        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(reply) if reply.is_empty() => {
                tracing::warn!(duration_ms, "Agent returned an empty response");
                AgentReply::Empty
            }
            Ok(reply) => {
                tracing::debug!(duration_ms, reply = %preview(&reply, 200), "Agent replied");
                AgentReply::Text(reply)
            }
            Err(e) if e.is_timeout() => {
                tracing::error!(duration_ms, "Agent call exceeded its deadline: {}", e);
                AgentReply::TimedOut
            }
            Err(e) => {
                tracing::error!(duration_ms, "Error processing LLM response: {}", e);
                AgentReply::Failed
            }
        }
    }
}
