//! Agent 层：阻塞 Agent 抽象、池化调用器与 Mock 实现

pub mod invoker;
pub mod mock;
pub mod traits;

pub use invoker::{
    AgentInvoker, AgentReply, TimestampedPrompt, AGENT_ERROR_SENTINEL, EMPTY_RESPONSE_SENTINEL,
};
pub use mock::{EchoAgent, ScriptedAgent};
pub use traits::Agent;
