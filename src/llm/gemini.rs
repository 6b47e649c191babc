//! Gemini 兼容 REST 客户端
//!
//! 直接用 reqwest 调 generateContent 风格端点（不依赖供应商 SDK）；base_url 可配置，
//! 便于代理或自建兼容端点。流式接口按「缓冲后整体返回」实现：单片段流，由调用方拼接。

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use futures_util::{stream, Stream};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::llm::{ChatMessage, ChatPart, ChatRole, GenerationConfig, LlmClient};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini 客户端：持有 Client、端点与 model 名，complete 时转 ChatMessage 为 API 格式并拼接候选文本
pub struct GeminiClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<WireContent>,
    #[serde(rename = "generationConfig")]
    generation_config: WireGenerationConfig,
}

#[derive(Serialize)]
struct WireContent {
    role: &'static str,
    parts: Vec<WirePart>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WirePart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: WireInlineData,
    },
}

#[derive(Serialize)]
struct WireInlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    /// base64 编码的原始字节
    data: String,
}

#[derive(Serialize)]
struct WireGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GeminiClient {
    pub fn new(
        base_url: Option<&str>,
        model: &str,
        api_key: Option<&str>,
        request_timeout_secs: u64,
    ) -> Self {
        let api_key = api_key
            .map(String::from)
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .unwrap_or_default();

        let client = Client::builder()
            .timeout(Duration::from_secs(request_timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url
                .unwrap_or(DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    fn to_wire_contents(messages: &[ChatMessage]) -> Vec<WireContent> {
        messages
            .iter()
            .map(|m| WireContent {
                role: match m.role {
                    ChatRole::User => "user",
                    ChatRole::Model => "model",
                },
                parts: m
                    .parts
                    .iter()
                    .map(|p| match p {
                        ChatPart::Text(text) => WirePart::Text { text: text.clone() },
                        ChatPart::InlineData { mime_type, data } => WirePart::InlineData {
                            inline_data: WireInlineData {
                                mime_type: mime_type.clone(),
                                data: BASE64.encode(data),
                            },
                        },
                    })
                    .collect(),
            })
            .collect()
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        config: &GenerationConfig,
    ) -> Result<String, String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let request = GenerateRequest {
            contents: Self::to_wire_contents(messages),
            generation_config: WireGenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
            },
        };

        let resp = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("HTTP {}: {}", status, body));
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| format!("Bad response body: {}", e))?;

        let text: String = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        Ok(text)
    }

    async fn complete_stream(
        &self,
        messages: &[ChatMessage],
        config: &GenerationConfig,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<String, String>> + Send>>, String> {
        let content = self.complete(messages, config).await?;
        Ok(Box::pin(stream::iter(vec![Ok(content)])))
    }
}
