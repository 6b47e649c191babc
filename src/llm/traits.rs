//! LLM 客户端抽象
//!
//! 所有后端（Gemini 兼容 REST / Mock）实现 LlmClient：complete（非流式）、complete_stream（流式片段）。
//! 消息格式与具体供应商解耦：双角色（user / model）+ 文本或内联二进制部件。

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};

/// 模型 API 的双角色词汇表
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Model,
}

/// 发往模型的单个内容项
#[derive(Clone, Debug, PartialEq)]
pub enum ChatPart {
    Text(String),
    /// 内联二进制（如图片），发送时做 base64 编码
    InlineData { mime_type: String, data: Vec<u8> },
}

/// 发往模型的单条消息；parts 非空由归一化层保证（供应商 API 拒绝空 parts）
#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub parts: Vec<ChatPart>,
}

impl ChatMessage {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            parts: vec![ChatPart::Text(text.into())],
        }
    }
}

/// 固定的生成参数：temperature 0.7、max_output_tokens 1024
#[derive(Clone, Copy, Debug)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_output_tokens: 1024,
        }
    }
}

/// LLM 客户端 trait：非流式完成与流式完成（返回文本片段流）
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成
    async fn complete(
        &self,
        messages: &[ChatMessage],
        config: &GenerationConfig,
    ) -> Result<String, String>;

    /// 流式完成，返回文本片段流；调用方拼接为完整文本后再解析
    async fn complete_stream(
        &self,
        messages: &[ChatMessage],
        config: &GenerationConfig,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<String, String>> + Send>>, String>;
}

/// 将流式片段拼为完整文本；任一片段出错即整体失败（解析只在全文上进行，不做增量解析）
pub async fn collect_stream(
    mut stream: Pin<Box<dyn Stream<Item = Result<String, String>> + Send>>,
) -> Result<String, String> {
    let mut full = String::new();
    while let Some(fragment) = stream.next().await {
        full.push_str(&fragment?);
    }
    Ok(full)
}
