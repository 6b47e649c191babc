//! 工具调用检测：从完整模型输出中提取内嵌的调用请求
//!
//! 在拼接完成的全文上运行（不做增量解析）。取全文第一个 `{` 到最后一个 `}` 的子串尝试
//! 解析 `{"tool_call": {"name": ..., "args": {...}}}`；找不到大括号、解析失败或形状不符
//! 都走「无工具调用」路径，把原文整体当最终回答——这是正常分支而非错误。
//!
//! 贪心首末大括号是刻意保留的行为：同一回复里出现多个 JSON 片段时会被并成一次
//! （可能失败的）解析，失败则回退为纯回答。不要收紧为单对象匹配，会改变可观测行为。

use serde::Deserialize;
use serde_json::{Map, Value};

/// 从模型输出解析出的调用请求（瞬态，不直接持久化）
#[derive(Clone, Debug, PartialEq)]
pub struct ToolInvocationRequest {
    pub name: String,
    pub args: Map<String, Value>,
}

/// 检测结果：纯回答，或调用请求 + 闭括号之后的剩余回答文本
#[derive(Clone, Debug, PartialEq)]
pub enum Detection {
    /// 无工具调用，原文即最终回答（逐字节原样）
    FinalAnswer(String),
    ToolCall {
        request: ToolInvocationRequest,
        /// 匹配的 `}` 之后的文本，去除首尾空白；JSON 之前的文本按协议约定丢弃
        answer: String,
    },
}

#[derive(Deserialize)]
struct Envelope {
    tool_call: CallBody,
}

#[derive(Deserialize)]
struct CallBody {
    name: String,
    args: Map<String, Value>,
}

/// 在完整输出文本上运行检测
pub fn detect_tool_call(output: &str) -> Detection {
    let (start, end) = match (output.find('{'), output.rfind('}')) {
        (Some(s), Some(e)) if s < e => (s, e),
        _ => return Detection::FinalAnswer(output.to_string()),
    };

    let candidate = &output[start..=end];
    let envelope: Envelope = match serde_json::from_str(candidate) {
        Ok(v) => v,
        Err(_) => return Detection::FinalAnswer(output.to_string()),
    };

    if envelope.tool_call.name.is_empty() {
        return Detection::FinalAnswer(output.to_string());
    }

    Detection::ToolCall {
        request: ToolInvocationRequest {
            name: envelope.tool_call.name,
            args: envelope.tool_call.args,
        },
        answer: output[end + 1..].trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_prose_without_braces_is_final_answer_verbatim() {
        let text = "The adiabatic flame temperature of methane in air is about 2220 K.\n";
        assert_eq!(
            detect_tool_call(text),
            Detection::FinalAnswer(text.to_string())
        );
    }

    #[test]
    fn well_formed_call_extracts_name_args_and_suffix() {
        let text = concat!(
            "Let me look that up.\n",
            r#"{"tool_call": {"name": "get_species_molecular_weight", "args": {"species_name": "CO2"}}}"#,
            "\n  I will interpret the result next.  "
        );
        match detect_tool_call(text) {
            Detection::ToolCall { request, answer } => {
                assert_eq!(request.name, "get_species_molecular_weight");
                assert_eq!(request.args.get("species_name"), Some(&json!("CO2")));
                assert_eq!(answer, "I will interpret the result next.");
            }
            other => panic!("expected tool call, got {:?}", other),
        }
    }

    #[test]
    fn malformed_json_falls_back_to_final_answer_without_error() {
        let text = r#"Here: {"tool_call": {"name": "x", "args": {"#;
        assert_eq!(
            detect_tool_call(text),
            Detection::FinalAnswer(text.to_string())
        );
    }

    #[test]
    fn wrong_shape_is_final_answer() {
        let text = r#"{"name": "get_species_molecular_weight", "args": {}}"#;
        assert_eq!(
            detect_tool_call(text),
            Detection::FinalAnswer(text.to_string())
        );
    }

    #[test]
    fn missing_args_field_is_final_answer() {
        let text = r#"{"tool_call": {"name": "get_species_molecular_weight"}}"#;
        assert_eq!(
            detect_tool_call(text),
            Detection::FinalAnswer(text.to_string())
        );
    }

    #[test]
    fn two_json_fragments_collapse_greedily_and_fall_back() {
        // 首个 { 到末尾 } 横跨两个独立对象，合并后不是合法 JSON -> 回退为纯回答
        let text = r#"Example: {"a": 1} and then {"tool_call": {"name": "x", "args": {}}}"#;
        assert_eq!(
            detect_tool_call(text),
            Detection::FinalAnswer(text.to_string())
        );
    }

    #[test]
    fn empty_tool_name_is_final_answer() {
        let text = r#"{"tool_call": {"name": "", "args": {}}}"#;
        assert_eq!(
            detect_tool_call(text),
            Detection::FinalAnswer(text.to_string())
        );
    }

    #[test]
    fn nested_args_survive_extraction() {
        let text = r#"{"tool_call": {"name": "process_simulation_snapshot", "args": {"process_type": "combustion", "reactor_params": {"volume": 2.5}}}}"#;
        match detect_tool_call(text) {
            Detection::ToolCall { request, answer } => {
                assert_eq!(request.name, "process_simulation_snapshot");
                assert_eq!(
                    request.args.get("reactor_params"),
                    Some(&json!({"volume": 2.5}))
                );
                assert!(answer.is_empty());
            }
            other => panic!("expected tool call, got {:?}", other),
        }
    }
}
