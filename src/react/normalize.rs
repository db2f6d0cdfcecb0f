//! Response Normalizer：把 Agent 原始回复清洗为单行、可安全传输的文本

/// ReAct 解析失败时 Agent 输出中会带上的标记
pub const PARSE_FAILURE_MARKER: &str = "Observation: Invalid";
/// 命中解析失败标记时替换整段回复的道歉文本
pub const PARSE_FAILURE_APOLOGY: &str = "I'm sorry, but I couldn't process that request.";

/// 换行替换为两字符转义 `\n`；含解析失败标记则整体替换为道歉文本
///
/// 纯函数、不会失败：任何输入（包括空串）都得到一个字符串。
pub fn normalize(raw: &str) -> String {
    if raw.contains(PARSE_FAILURE_MARKER) {
        return PARSE_FAILURE_APOLOGY.to_string();
    }
    raw.replace('\n', "\\n")
}
