//! 可观测性：tracing 日志初始化
//!
//! 日志是尽力而为的：订阅器安装失败（例如已被测试或宿主安装）只会被忽略，不影响业务流程。

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 安装全局订阅器；默认 info，可通过 RUST_LOG 覆盖。可重复调用
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}

/// 截断过长文本，用于日志与审计预览
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}
