//! 对外聊天接口
//!
//! Web 层（路由、鉴权、会话持久化）只依赖 ChatResponder 这一个契约：给一条消息，得到一段文本。
//! ChatRequest / ChatResponse 对应 `POST /chat/send_message` 的请求与响应体。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::Orchestrator;

/// 入站聊天请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// 出站聊天响应
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// 把用户消息变成回复文本；实现方不得返回错误
#[async_trait]
pub trait ChatResponder: Send + Sync {
    async fn get_response(&self, message: &str) -> String;
}

#[async_trait]
impl ChatResponder for Orchestrator {
    async fn get_response(&self, message: &str) -> String {
        Orchestrator::get_response(self, message).await
    }
}

/// 处理一次聊天请求
pub async fn handle_chat(responder: &dyn ChatResponder, request: ChatRequest) -> ChatResponse {
    ChatResponse {
        response: responder.get_response(&request.message).await,
    }
}
