//! chat-core 演示入口
//!
//! 初始化日志与配置，用 EchoAgent + EchoTool 组装编排器，逐行读取 stdin 并打印回复。
//! 真实部署由宿主应用注入 Agent 与工具，这里只用于本地跑通流程。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chat_core::config::{load_config, AppConfig};
use chat_core::llm::EchoAgent;
use chat_core::tools::EchoTool;
use chat_core::{handle_chat, observability, ChatRequest, OrchestratorBuilder};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志：默认 info，可通过 RUST_LOG 覆盖
    observability::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = match load_config(config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            AppConfig::default()
        }
    };

    let orchestrator = OrchestratorBuilder::new(Arc::new(EchoAgent))
        .with_config(cfg)
        .with_tool(EchoTool)
        .build();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        let reply = handle_chat(
            &orchestrator,
            ChatRequest {
                message: message.to_string(),
            },
        )
        .await;
        stdout
            .write_all(format!("{}\n", reply.response).as_bytes())
            .await
            .context("Failed to write stdout")?;
        stdout.flush().await.context("Failed to flush stdout")?;
    }

    Ok(())
}
