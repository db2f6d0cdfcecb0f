//! 推理 Agent 抽象
//!
//! 核心把 Agent 视为不透明的阻塞函数：输入 prompt 文本，返回回复文本，可能失败。

/// 阻塞式推理 Agent；实现方可以做网络请求、本地推理等任何耗时操作
pub trait Agent: Send + Sync {
    fn run(&self, prompt: &str) -> Result<String, String>;
}

impl<F> Agent for F
where
    F: Fn(&str) -> Result<String, String> + Send + Sync,
{
    fn run(&self, prompt: &str) -> Result<String, String> {
        self(prompt)
    }
}
