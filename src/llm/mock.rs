//! Mock LLM 客户端（用于测试，无需 API）
//!
//! 按脚本顺序返回预设回复，并记录每次收到的消息列表，便于断言调用次数与请求内容。

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::{stream, Stream};

use crate::llm::{ChatMessage, GenerationConfig, LlmClient};

/// Mock 客户端：依次弹出脚本回复；脚本耗尽或设为失败时返回 Err
#[derive(Debug, Default)]
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<String, String>>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockLlmClient {
    pub fn with_responses(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(|s| Ok(s.to_string())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 追加一条失败回复（模拟网络 / 限流错误）
    pub fn push_failure(&self, message: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(message.to_string()));
    }

    /// 已收到的请求数（即完成调用次数）
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// 第 n 次请求的消息列表副本
    pub fn request(&self, n: usize) -> Option<Vec<ChatMessage>> {
        self.requests.lock().unwrap().get(n).cloned()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        _config: &GenerationConfig,
    ) -> Result<String, String> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err("Mock has no scripted response".to_string()))
    }

    async fn complete_stream(
        &self,
        messages: &[ChatMessage],
        config: &GenerationConfig,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<String, String>> + Send>>, String> {
        let content = self.complete(messages, config).await?;
        // 切成多个片段，验证调用方按全文拼接后再解析
        let fragments: Vec<Result<String, String>> = content
            .chars()
            .collect::<Vec<_>>()
            .chunks(16)
            .map(|c| Ok(c.iter().collect()))
            .collect();
        Ok(Box::pin(stream::iter(fragments)))
    }
}
