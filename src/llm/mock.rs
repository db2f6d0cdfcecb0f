//! Mock Agent（用于测试与本地演示，无需真实模型）
//!
//! - EchoAgent：回显 prompt，演示二进制默认使用
//! - ScriptedAgent：按顺序回放预设结果并记录调用次数与收到的 prompt

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::llm::Agent;

/// 回显 Agent：以 `Echo: <prompt>` 作为回复
#[derive(Debug, Default)]
pub struct EchoAgent;

impl Agent for EchoAgent {
    fn run(&self, prompt: &str) -> Result<String, String> {
        Ok(format!("Echo: {}", prompt))
    }
}

/// 脚本化 Agent：每次调用弹出一个预设结果，脚本耗尽后重复最后一个
#[derive(Debug, Default)]
pub struct ScriptedAgent {
    script: Mutex<VecDeque<Result<String, String>>>,
    last: Mutex<Option<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedAgent {
    pub fn new<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Result<String, String>>,
    {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            ..Self::default()
        }
    }

    /// 全部成功回复的快捷构造
    pub fn replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(replies.into_iter().map(|r| Ok(r.into())))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl Agent for ScriptedAgent {
    fn run(&self, prompt: &str) -> Result<String, String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let next = self.script.lock().ok().and_then(|mut s| s.pop_front());
        let mut last = self.last.lock().map_err(|e| e.to_string())?;
        match next {
            Some(outcome) => {
                *last = Some(outcome.clone());
                outcome
            }
            None => last
                .clone()
                .unwrap_or_else(|| Err("script exhausted".to_string())),
        }
    }
}
