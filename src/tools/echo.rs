//! Echo 工具（测试与演示用）

use crate::tools::Tool;

/// Echo 工具：回显输入文本
pub struct EchoTool;

impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn run(&self, input: &str) -> Result<String, String> {
        if input.is_empty() {
            Ok("(empty)".to_string())
        } else {
            Ok(input.to_string())
        }
    }
}
