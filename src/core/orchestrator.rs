//! 重试编排器：单条用户消息的主控流程
//!
//! 拼接带时间的 prompt -> 最多 max_attempts 次调用 Agent -> 清洗 -> 提取工具指令并调度 ->
//! 校验回复 -> 返回文本。所有失败都折算为文本，get_response 不会返回错误。
//! 同一条消息的尝试严格串行：阻塞调用超时后它仍在池中运行，此时直接返回兜底文本而不是重试。

use std::sync::Arc;

use tracing::Instrument;

use crate::core::Clock;
use crate::llm::{AgentInvoker, AgentReply, TimestampedPrompt};
use crate::observability::preview;
use crate::react::{extract, normalize};
use crate::tools::{DispatchOutcome, ToolDispatcher};

/// 重试耗尽后返回给调用方的兜底文本
pub const FALLBACK_MESSAGE: &str = "Sorry, I couldn't generate a valid response. Please try again.";
/// 回复中出现此子串即视为无效/不完整
pub const INVALID_RESPONSE_MARKER: &str = "Invalid or incomplete response";
/// 默认重试预算
pub const DEFAULT_MAX_ATTEMPTS: usize = 3;

/// 单次调用内的重试计数，随调用结束销毁
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    pub attempts_made: usize,
    pub max_attempts: usize,
}

impl RetryState {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            attempts_made: 0,
            max_attempts: max_attempts.max(1),
        }
    }

    /// 占用一次尝试，返回从 1 开始的尝试序号；预算耗尽返回 None
    pub fn next_attempt(&mut self) -> Option<usize> {
        if self.is_exhausted() {
            return None;
        }
        self.attempts_made += 1;
        Some(self.attempts_made)
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts_made >= self.max_attempts
    }
}

/// 校验清洗后的回复：非空且不含无效标记
pub fn is_valid_reply(text: &str) -> bool {
    !text.is_empty() && !text.contains(INVALID_RESPONSE_MARKER)
}

/// 编排器：持有 Agent Invoker、Tool Dispatcher 与时钟，可被多个请求任务并发共享
pub struct Orchestrator {
    invoker: AgentInvoker,
    dispatcher: ToolDispatcher,
    clock: Arc<dyn Clock>,
    max_attempts: usize,
}

impl Orchestrator {
    pub fn new(
        invoker: AgentInvoker,
        dispatcher: ToolDispatcher,
        clock: Arc<dyn Clock>,
        max_attempts: usize,
    ) -> Self {
        Self {
            invoker,
            dispatcher,
            clock,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// 处理一条用户消息，总是返回文本
    pub async fn get_response(&self, message: &str) -> String {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("get_response", %request_id);
        self.respond(message).instrument(span).await
    }

    async fn respond(&self, message: &str) -> String {
        tracing::info!("Received user message: {}", preview(message, 500));

        let prompt = TimestampedPrompt::build(message, self.clock.as_ref());
        let mut state = RetryState::new(self.max_attempts);

        while let Some(attempt) = state.next_attempt() {
            match self.attempt(&prompt).await {
                Attempt::Reply(text) => {
                    tracing::debug!(attempt, "Returning response");
                    return text;
                }
                Attempt::Abandon => {
                    tracing::warn!(
                        attempt,
                        "Blocking call still running past its deadline, not retrying"
                    );
                    return FALLBACK_MESSAGE.to_string();
                }
                Attempt::Invalid if !state.is_exhausted() => {
                    tracing::warn!(
                        "Invalid response detected, retrying ({}/{})...",
                        attempt,
                        state.max_attempts
                    );
                }
                Attempt::Invalid => {}
            }
        }

        tracing::warn!(attempts = state.attempts_made, "Retry budget exhausted");
        FALLBACK_MESSAGE.to_string()
    }

    /// 单次尝试：有工具结果直接返回；否则回复有效时返回
    async fn attempt(&self, prompt: &TimestampedPrompt) -> Attempt {
        let raw = match self.invoker.invoke(prompt).await {
            AgentReply::Text(raw) => raw,
            AgentReply::TimedOut => return Attempt::Abandon,
            sentinel => {
                tracing::debug!(reply = sentinel.as_text(), "Agent produced no usable reply");
                return Attempt::Invalid;
            }
        };

        let normalized = normalize(&raw);

        let mut tool_timed_out = false;
        if let Some(instruction) = extract(&normalized) {
            match self.dispatcher.dispatch_outcome(&instruction).await {
                DispatchOutcome::Executed(tool_result) => return Attempt::Reply(tool_result),
                DispatchOutcome::TimedOut => tool_timed_out = true,
                DispatchOutcome::UnknownTool | DispatchOutcome::Failed(_) => {}
            }
        }

        if is_valid_reply(&normalized) {
            Attempt::Reply(normalized)
        } else if tool_timed_out {
            Attempt::Abandon
        } else {
            Attempt::Invalid
        }
    }
}

/// 单次尝试的结论
enum Attempt {
    /// 得到可返回的文本
    Reply(String),
    /// 回复无效，可以重试
    Invalid,
    /// 超时的阻塞调用仍占着槽位，不再提交新的尝试
    Abandon,
}
