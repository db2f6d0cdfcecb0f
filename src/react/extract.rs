//! Instruction Extractor：从 Agent 回复中提取嵌入的工具指令
//!
//! 取第一个 `{` 到最后一个 `}` 之间的片段按 JSON 解析，要求含 action / action_input 两个键。
//! 找不到花括号、JSON 非法、缺键都视为「没有指令」，不是错误。

use serde::Deserialize;
use serde_json::Value;

/// Agent 请求执行的工具指令
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInstruction {
    pub tool_name: String,
    pub tool_input: String,
}

/// 指令的线上形态：{"action": "search", "action_input": "weather"}
#[derive(Debug, Deserialize)]
struct RawInstruction {
    action: String,
    action_input: Option<Value>,
}

impl RawInstruction {
    /// action_input 为字符串时原样使用，其它非 null 值使用其紧凑 JSON 文本
    fn into_instruction(self) -> Option<ToolInstruction> {
        let tool_input = match self.action_input? {
            Value::Null => return None,
            Value::String(s) => s,
            other => other.to_string(),
        };
        Some(ToolInstruction {
            tool_name: self.action,
            tool_input,
        })
    }
}

/// 定位最外层花括号片段（含两端）；缺任一端或顺序颠倒时返回 None
fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// 解析回复中的工具指令；action 必须是字符串，action_input 必须存在且非 null
pub fn extract(text: &str) -> Option<ToolInstruction> {
    let json_str = brace_span(text)?;
    serde_json::from_str::<RawInstruction>(json_str)
        .ok()?
        .into_instruction()
}
