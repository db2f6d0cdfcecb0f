//! 工具注册表
//!
//! 所有工具实现 Tool trait（name / 阻塞 run），由 ToolRegistry 在启动时按名注册，
//! 之后只读共享；ToolDispatcher 负责把调用卸载到 WorkerPool。

use std::collections::HashMap;
use std::sync::Arc;

/// 工具 trait：名称与阻塞执行（输入为纯文本）
pub trait Tool: Send + Sync {
    /// 工具名称（对应指令 JSON 中的 "action" 字段）
    fn name(&self) -> &str;

    /// 执行工具；可能阻塞，可能失败
    fn run(&self, input: &str) -> Result<String, String>;
}

/// 工具注册表：按名称存储 Arc<dyn Tool>，名称唯一，后注册的同名工具覆盖先注册的
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), Arc::new(tool)).is_some() {
            tracing::warn!("Tool '{}' registered twice, keeping the latest", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// 已注册的工具名，按名称排序
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }
}
