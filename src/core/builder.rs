//! Orchestrator 构建器：统一组装 Agent、工具、时钟与共享 WorkerPool
//!
//! Agent Invoker 与 Tool Dispatcher 共用同一个池，全局并发上限对 Agent 与工具调用合并计算。

use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::{Clock, Orchestrator, SystemClock, WorkerPool};
use crate::llm::{Agent, AgentInvoker};
use crate::tools::{Tool, ToolDispatcher, ToolRegistry};

pub struct OrchestratorBuilder {
    config: AppConfig,
    agent: Arc<dyn Agent>,
    tools: ToolRegistry,
    clock: Arc<dyn Clock>,
    pool: Option<Arc<WorkerPool>>,
}

impl OrchestratorBuilder {
    /// 以默认配置创建构建器
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self {
            config: AppConfig::default(),
            agent,
            tools: ToolRegistry::new(),
            clock: Arc::new(SystemClock),
            pool: None,
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.config.orchestrator.max_attempts = max_attempts;
        self
    }

    /// 注册一个工具；同名工具后者覆盖前者
    pub fn with_tool(mut self, tool: impl Tool + 'static) -> Self {
        self.tools.register(tool);
        self
    }

    pub fn with_tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// 使用外部池（多个 Orchestrator 共享同一并发上限时）；未设置时按 [pool] 配置新建
    pub fn with_pool(mut self, pool: Arc<WorkerPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn build(self) -> Orchestrator {
        let pool = self
            .pool
            .unwrap_or_else(|| Arc::new(WorkerPool::from_config(&self.config.pool)));
        tracing::info!(
            pool_size = pool.capacity(),
            tools = ?self.tools.tool_names(),
            max_attempts = self.config.orchestrator.max_attempts,
            "Orchestrator initialized"
        );

        let invoker = AgentInvoker::new(self.agent, pool.clone());
        let dispatcher = ToolDispatcher::new(Arc::new(self.tools), pool);
        Orchestrator::new(
            invoker,
            dispatcher,
            self.clock,
            self.config.orchestrator.max_attempts,
        )
    }
}
