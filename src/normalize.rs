//! 内容归一化：Transcript -> 模型消息
//!
//! 角色折叠为双角色词汇表：字面 User 之外的角色（Assistant、ToolOutput）一律归为 model ——
//! 对模型而言工具结果是随对话一起提供的外部信息。工具输出部件序列化为带标签的
//! fenced JSON 文本块；归一化后 parts 为空的回合直接丢弃（供应商 API 拒绝空 parts）。

use crate::llm::{ChatMessage, ChatPart, ChatRole};
use crate::transcript::{Part, Role, Transcript, Turn};

/// 将整个会话记录映射为模型请求消息列表
pub fn to_chat_messages(transcript: &Transcript) -> Vec<ChatMessage> {
    transcript.all().iter().filter_map(to_chat_message).collect()
}

fn to_chat_message(turn: &Turn) -> Option<ChatMessage> {
    let role = match turn.role() {
        Role::User => ChatRole::User,
        Role::Assistant | Role::ToolOutput => ChatRole::Model,
    };

    let parts: Vec<ChatPart> = turn.parts().iter().map(to_chat_part).collect();
    if parts.is_empty() {
        return None;
    }
    Some(ChatMessage { role, parts })
}

fn to_chat_part(part: &Part) -> ChatPart {
    match part {
        Part::Text { text } => ChatPart::Text(text.clone()),
        Part::Image { data, .. } => ChatPart::InlineData {
            mime_type: "image/png".to_string(),
            data: data.clone(),
        },
        Part::ToolOutput { result } => {
            let json = serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string());
            ChatPart::Text(format!("Tool execution result:\n```json\n{}\n```", json))
        }
    }
}
