//! 编排循环：一次用户回合的端到端处理
//!
//! 每轮至多两次模型调用：第一次完成后在全文上检测内嵌工具调用；检测到则执行工具，
//! 把结果以「瞬态用户消息」喂回做第二次完成，第二次的输出即最终回答。瞬态消息只进
//! 第二次请求，不写入会话记录——记录里持久化的是结构化的工具结果回合。
//! 未知工具名与参数解码失败不做第二次调用，直接以固定措辞回答；模型调用失败对
//! 本回合是终态（不追加 assistant 回合，已追加的用户回合保留）。

use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::AgentError;
use crate::detect::{detect_tool_call, Detection};
use crate::llm::{collect_stream, ChatMessage, GeminiClient, GenerationConfig, LlmClient};
use crate::normalize::to_chat_messages;
use crate::tools::{ToolError, ToolRegistry};
use crate::transcript::{Part, Role, Transcript, Turn};

/// 编排循环持有的进程级组件：模型客户端、工具注册表、固定生成参数
pub struct AgentComponents {
    pub llm: Arc<dyn LlmClient>,
    pub registry: ToolRegistry,
    pub generation: GenerationConfig,
}

/// 按配置组装组件（Gemini 客户端 + 注册表）
pub fn create_components(cfg: &AppConfig) -> AgentComponents {
    let llm = GeminiClient::new(
        cfg.llm.base_url.as_deref(),
        &cfg.llm.model,
        cfg.llm.api_key.as_deref(),
        cfg.llm.request_timeout_secs,
    );
    AgentComponents {
        llm: Arc::new(llm),
        registry: ToolRegistry::new(&cfg.tools),
        generation: GenerationConfig {
            temperature: cfg.llm.temperature,
            max_output_tokens: cfg.llm.max_output_tokens,
        },
    }
}

/// 处理一次用户回合，返回最终回答文本。
/// parts 为空在任何模型调用之前拒绝；成功路径上用户回合与最终 assistant 回合
/// （以及可能的工具结果回合）都已追加进 transcript。
pub async fn process_turn(
    components: &AgentComponents,
    transcript: &mut Transcript,
    parts: Vec<Part>,
) -> Result<String, AgentError> {
    if parts.is_empty() {
        return Err(AgentError::EmptySubmission { notes: Vec::new() });
    }
    transcript.append(Turn::new(Role::User, parts)?);

    // 第一次模型调用：流式片段拼为全文后再检测
    let messages = to_chat_messages(transcript);
    let output = complete(components, &messages).await?;

    match detect_tool_call(&output) {
        Detection::FinalAnswer(answer) => {
            transcript.append(Turn::assistant_text(answer.clone()));
            Ok(answer)
        }
        Detection::ToolCall { request, answer } => {
            if !answer.is_empty() {
                // 闭括号之后的残余文本按协议丢弃，只记日志
                tracing::debug!(suffix = %answer, "discarding text after tool call JSON");
            }
            let name = request.name.clone();
            tracing::info!(tool = %name, "model requested tool call");

            match components
                .registry
                .invoke(&name, serde_json::Value::Object(request.args))
                .await
            {
                Ok(result) => {
                    transcript.append(Turn::tool_output(result.to_map()));

                    // 第二次模型调用：完整记录 + 瞬态工具结果消息（不持久化）
                    let result_json = serde_json::to_string_pretty(&result.to_value())
                        .unwrap_or_else(|_| "{}".to_string());
                    let mut messages = to_chat_messages(transcript);
                    messages.push(ChatMessage::user_text(format!(
                        "Tool '{}' returned the following JSON result:\n{}",
                        name, result_json
                    )));

                    let final_answer = complete(components, &messages).await?;
                    transcript.append(Turn::assistant_text(final_answer.clone()));
                    Ok(final_answer)
                }
                Err(ToolError::Unknown(tool)) => {
                    let answer = format!(
                        "I attempted to use an unknown tool named '{}'. \
Please rephrase your request using the available chemistry tools.",
                        tool
                    );
                    transcript.append(Turn::assistant_text(answer.clone()));
                    Ok(answer)
                }
                Err(ToolError::BadArguments { tool, message }) => {
                    let answer = format!(
                        "I attempted to call the tool '{}' with invalid arguments ({}). \
Please restate the request with the required parameters.",
                        tool, message
                    );
                    transcript.append(Turn::assistant_text(answer.clone()));
                    Ok(answer)
                }
            }
        }
    }
}

async fn complete(
    components: &AgentComponents,
    messages: &[ChatMessage],
) -> Result<String, AgentError> {
    let stream = components
        .llm
        .complete_stream(messages, &components.generation)
        .await
        .map_err(AgentError::LlmError)?;
    collect_stream(stream).await.map_err(AgentError::LlmError)
}
