//! 工具调度器
//!
//! 持有只读 ToolRegistry 与共享 WorkerPool，按指令中的工具名查找并在池中执行；
//! 每次调用输出结构化审计日志（JSON）。未注册、失败、超时都不向上抛出：
//! dispatch 只返回 Option；dispatch_outcome 区分原因，供日志与 Orchestrator 判断超时。

use std::sync::Arc;
use std::time::Instant;

use crate::core::{CoreError, WorkerPool};
use crate::observability::preview;
use crate::react::ToolInstruction;
use crate::tools::ToolRegistry;

/// 工具成功结果的前缀
pub const TOOL_RESULT_PREFIX: &str = "✅ Tool executed: ";

/// 单次调度的结果分类
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// 已执行，携带包装后的结果文本
    Executed(String),
    /// 工具名未注册
    UnknownTool,
    /// 工具返回错误或 panic
    Failed(String),
    /// 超过单次调用期限
    TimedOut,
}

impl DispatchOutcome {
    fn label(&self) -> &'static str {
        match self {
            DispatchOutcome::Executed(_) => "ok",
            DispatchOutcome::UnknownTool => "unknown_tool",
            DispatchOutcome::Failed(_) => "error",
            DispatchOutcome::TimedOut => "timeout",
        }
    }

    pub fn into_result(self) -> Option<String> {
        match self {
            DispatchOutcome::Executed(text) => Some(text),
            _ => None,
        }
    }
}

/// 工具调度器
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    pool: Arc<WorkerPool>,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>, pool: Arc<WorkerPool>) -> Self {
        Self { registry, pool }
    }

    /// 执行指令；只有成功执行时返回 `✅ Tool executed: <result>`
    pub async fn dispatch(&self, instruction: &ToolInstruction) -> Option<String> {
        self.dispatch_outcome(instruction).await.into_result()
    }

    /// 执行指令并返回带原因的结果分类
    pub async fn dispatch_outcome(&self, instruction: &ToolInstruction) -> DispatchOutcome {
        let tool_name = instruction.tool_name.as_str();
        let start = Instant::now();

        let outcome = match self.registry.get(tool_name) {
            None => DispatchOutcome::UnknownTool,
            Some(tool) => {
                let input = instruction.tool_input.clone();
                let result = self
                    .pool
                    .run(move || tool.run(&input))
                    .await
                    .and_then(|r| r.map_err(CoreError::ToolFailed));
                match result {
                    Ok(output) => {
                        DispatchOutcome::Executed(format!("{}{}", TOOL_RESULT_PREFIX, output))
                    }
                    Err(CoreError::ToolFailed(e)) => DispatchOutcome::Failed(e),
                    Err(e) if e.is_timeout() => DispatchOutcome::TimedOut,
                    Err(e) => DispatchOutcome::Failed(e.to_string()),
                }
            }
        };

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        let audit = serde_json::json!({
            "event": "tool_audit",
            "tool": tool_name,
            "ok": matches!(outcome, DispatchOutcome::Executed(_)),
            "outcome": outcome.label(),
            "duration_ms": duration_ms,
            "input_preview": preview(&instruction.tool_input, 200),
        });
        match &outcome {
            DispatchOutcome::Executed(_) => tracing::info!(audit = %audit, "tool"),
            DispatchOutcome::UnknownTool => {
                tracing::debug!(audit = %audit, "Ignoring unregistered tool '{}'", tool_name)
            }
            DispatchOutcome::Failed(e) => {
                tracing::error!(audit = %audit, "Error executing tool: {}", e)
            }
            DispatchOutcome::TimedOut => {
                tracing::error!(audit = %audit, "Tool '{}' exceeded its deadline", tool_name)
            }
        }

        outcome
    }
}
