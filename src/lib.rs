//! chat-core - 聊天消息编排核心
//!
//! 模块划分：
//! - **chat**: 对外契约（ChatRequest / ChatResponse / ChatResponder）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: Worker Pool、重试编排器、时钟、构建器与内部错误
//! - **llm**: 阻塞 Agent 抽象、池化调用器与 Mock 实现
//! - **observability**: tracing 日志初始化
//! - **react**: 回复清洗与工具指令提取
//! - **tools**: 工具注册表与调度器

pub mod chat;
pub mod config;
pub mod core;
pub mod llm;
pub mod observability;
pub mod react;
pub mod tools;

pub use chat::{handle_chat, ChatRequest, ChatResponder, ChatResponse};
pub use crate::core::{Orchestrator, OrchestratorBuilder, FALLBACK_MESSAGE};
