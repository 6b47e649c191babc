//! Agent 错误类型
//!
//! 与编排循环配合：模型调用失败为终态错误（本轮终止、不追加 assistant 回合），
//! 摄取为空在任何模型调用之前拒绝，空回合在创建处拒绝。

use thiserror::Error;

/// Agent 运行过程中可能出现的错误（模型调用、空提交等）
#[derive(Error, Debug)]
pub enum AgentError {
    /// 模型调用失败（网络 / 认证 / 限流），对当前用户回合是终态
    #[error("LLM error: {0}")]
    LlmError(String),

    /// 摄取后没有任何内容部件，在模型调用之前拒绝；
    /// notes 携带每个被丢弃附件的原因，供调用方展示
    #[error("Nothing to send: enter a query or attach a supported file")]
    EmptySubmission { notes: Vec<String> },

    /// 回合不允许零个内容部件
    #[error("A turn must contain at least one content part")]
    EmptyTurn,
}
