//! LLM 客户端抽象与实现（Gemini 兼容 REST / Mock）

pub mod gemini;
pub mod mock;
pub mod traits;

pub use gemini::GeminiClient;
pub use mock::MockLlmClient;
pub use traits::{
    collect_stream, ChatMessage, ChatPart, ChatRole, GenerationConfig, LlmClient,
};
