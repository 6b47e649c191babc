//! 会话：隐藏指令播种、提交入口与只读 JSON 导出
//!
//! 新会话先追加一条隐藏的 system 指令回合（人设 + 全部工具的 JSON Schema + 调用协议），
//! 再追加一条固定问候。指令回合参与每次模型请求（all()），但不在 visible() 中展示。
//! 导出是只读快照，图片以 base64 内嵌。

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::agent::{process_turn, AgentComponents};
use crate::core::AgentError;
use crate::ingest::{ingest_submission, Attachment};
use crate::tools::ToolRegistry;
use crate::transcript::{Part, Role, Transcript, Turn};

/// 固定问候语（会话的第一条可见回合）
pub const GREETING: &str = "Hello! I am Catalyst Mind. How can I assist you with \
chemical operations or process control today?";

/// 一次提交的结果：最终回答 + 摄取阶段的说明（丢弃的附件等）
#[derive(Debug)]
pub struct SubmitOutcome {
    pub answer: String,
    pub notes: Vec<String>,
}

/// 单个用户会话：唯一 ID + 显式持有的会话记录
pub struct ChatSession {
    id: Uuid,
    transcript: Transcript,
}

impl ChatSession {
    /// 创建会话：播种隐藏指令回合与固定问候
    pub fn new(registry: &ToolRegistry) -> Self {
        let mut transcript = Transcript::new();
        transcript.append(Turn::user_text(system_instruction(registry)));
        transcript.append(Turn::assistant_text(GREETING));
        Self {
            id: Uuid::new_v4(),
            transcript,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// 处理一次用户提交（文本 + 附件），返回最终回答与摄取说明
    pub async fn submit(
        &mut self,
        components: &AgentComponents,
        text: Option<&str>,
        attachments: &[Attachment],
        max_text_chars: usize,
    ) -> Result<SubmitOutcome, AgentError> {
        let report = ingest_submission(text, attachments, max_text_chars);
        if report.parts.is_empty() {
            // 拒绝时带上摄取说明，调用方能解释为什么什么都没发出去
            return Err(AgentError::EmptySubmission {
                notes: report.notes,
            });
        }
        let answer = process_turn(components, &mut self.transcript, report.parts).await?;
        Ok(SubmitOutcome {
            answer,
            notes: report.notes,
        })
    }

    /// 导出整个会话为 JSON（只读，不改动记录本身）。图片部件内嵌 base64。
    pub fn export_json(&self) -> Value {
        let turns: Vec<Value> = self
            .transcript
            .all()
            .iter()
            .map(|turn| {
                let role = match turn.role() {
                    Role::User => "user",
                    Role::Assistant => "assistant",
                    Role::ToolOutput => "tool_output",
                };
                let parts: Vec<Value> = turn.parts().iter().map(export_part).collect();
                json!({ "role": role, "parts": parts })
            })
            .collect();

        json!({
            "session_id": self.id.to_string(),
            "exported_at": chrono::Utc::now().to_rfc3339(),
            "turns": turns,
        })
    }
}

fn export_part(part: &Part) -> Value {
    match part {
        Part::Text { text } => json!({ "type": "text", "text": text }),
        Part::Image {
            data,
            source_format,
            width,
            height,
        } => json!({
            "type": "image",
            "source_format": source_format,
            "width": width,
            "height": height,
            "png_base64": BASE64.encode(data),
        }),
        Part::ToolOutput { result } => json!({
            "type": "tool_output",
            "result": Value::Object(result.clone()),
        }),
    }
}

/// 拼装隐藏指令：人设 + 工具清单（JSON Schema）+ 调用协议
fn system_instruction(registry: &ToolRegistry) -> String {
    let specs: Vec<Value> = registry
        .specs()
        .iter()
        .map(|s| {
            json!({
                "name": s.name,
                "description": s.description,
                "parameters": s.parameters,
            })
        })
        .collect();
    let tools_json =
        serde_json::to_string_pretty(&specs).unwrap_or_else(|_| "[]".to_string());

    format!(
        "You are Catalyst Mind, an expert AI assistant for chemical engineers. \
You specialize in chemical operations, process control, reaction engineering, and \
thermodynamics. Answer questions clearly and precisely, using SI units.\n\n\
You have access to the following tools:\n{}\n\n\
When a question requires a calculation or live data, respond FIRST with a single JSON \
object of the form:\n\
{{\"tool_call\": {{\"name\": \"<tool name>\", \"args\": {{...}}}}}}\n\
and nothing else before it. The tool result will be provided back to you, after which \
you must produce the final answer for the user in plain language. If no tool is \
needed, answer directly.",
        tools_json
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ToolsSection;

    fn registry() -> ToolRegistry {
        ToolRegistry::new(&ToolsSection::default())
    }

    #[test]
    fn new_session_hides_instruction_and_shows_greeting() {
        let session = ChatSession::new(&registry());
        assert_eq!(session.transcript().len(), 2);
        let visible = session.transcript().visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].parts(), &[Part::text(GREETING)]);
    }

    #[test]
    fn instruction_lists_every_tool_and_the_call_shape() {
        let session = ChatSession::new(&registry());
        let first = &session.transcript().all()[0];
        let text = match &first.parts()[0] {
            Part::Text { text } => text,
            other => panic!("expected text, got {:?}", other),
        };
        assert!(text.contains("Catalyst Mind"));
        assert!(text.contains("get_species_molecular_weight"));
        assert!(text.contains("get_wikipedia_data"));
        assert!(text.contains(r#"{"tool_call": {"name":"#));
    }

    #[test]
    fn export_is_a_read_only_snapshot() {
        let session = ChatSession::new(&registry());
        let before = session.transcript().len();
        let exported = session.export_json();
        assert_eq!(session.transcript().len(), before);

        assert_eq!(exported["turns"].as_array().unwrap().len(), 2);
        assert_eq!(exported["turns"][1]["role"], json!("assistant"));
        assert!(exported["session_id"].as_str().unwrap().len() >= 32);
        assert!(exported["exported_at"].as_str().is_some());
    }
}
