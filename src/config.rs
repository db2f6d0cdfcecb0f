//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `CHAT__*` 覆盖（双下划线表示嵌套，如 `CHAT__POOL__SIZE=8`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::core::{DEFAULT_MAX_ATTEMPTS, DEFAULT_POOL_SIZE};

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub orchestrator: OrchestratorSection,
    #[serde(default)]
    pub pool: PoolSection,
}

/// [orchestrator] 段：重试预算
#[derive(Debug, Clone, Deserialize)]
pub struct OrchestratorSection {
    /// 单条消息最多调用 Agent 的次数
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
}

fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

impl Default for OrchestratorSection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

/// [pool] 段：阻塞调用池大小与单次调用期限
#[derive(Debug, Clone, Deserialize)]
pub struct PoolSection {
    #[serde(default = "default_pool_size")]
    pub size: usize,
    /// 单次阻塞调用期限（秒），0 表示不限
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
}

fn default_pool_size() -> usize {
    DEFAULT_POOL_SIZE
}

fn default_call_timeout_secs() -> u64 {
    60
}

impl Default for PoolSection {
    fn default() -> Self {
        Self {
            size: default_pool_size(),
            call_timeout_secs: default_call_timeout_secs(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 CHAT__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 CHAT__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("CHAT")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
