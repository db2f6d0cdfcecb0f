//! ReAct 回复处理：清洗（normalize）与工具指令提取（extract），均为纯同步函数

pub mod extract;
pub mod normalize;

pub use extract::{extract, ToolInstruction};
pub use normalize::{normalize, PARSE_FAILURE_APOLOGY, PARSE_FAILURE_MARKER};
