//! 会话记录：回合与部件
//!
//! Transcript 是仅追加的回合序列，整个会话状态都在其中（只存内存，进程 / 会话生命周期）。
//! 首条回合是隐藏的 system 指令，visible() 跳过它，仅用于展示；构建模型输入一律用 all()。

use serde_json::{Map, Value};

use crate::core::AgentError;

/// 回合角色：用户输入 / 模型回复 / 展示给用户的工具执行结果
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    /// 工具结果回合，仅供审计与展示，编排循环不会对其再做工具调用解析
    ToolOutput,
}

/// 单个内容部件：文本、图片或结构化工具输出
#[derive(Clone, Debug, PartialEq)]
pub enum Part {
    Text {
        text: String,
    },
    /// 摄取时解码并归一化为 PNG 编码缓冲；创建后不再变更
    Image {
        data: Vec<u8>,
        source_format: String,
        width: u32,
        height: u32,
    },
    /// 工具执行结果（string -> JSON 值 的映射，含 status 字段）
    ToolOutput {
        result: Map<String, Value>,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// 一条角色标注的会话贡献；parts 永不为空（由 Turn::new 保证），追加后不可变
#[derive(Clone, Debug)]
pub struct Turn {
    role: Role,
    parts: Vec<Part>,
}

impl Turn {
    /// 创建回合；parts 为空时拒绝（摄取为空必须阻止回合创建，而不是追加空回合）
    pub fn new(role: Role, parts: Vec<Part>) -> Result<Self, AgentError> {
        if parts.is_empty() {
            return Err(AgentError::EmptyTurn);
        }
        Ok(Self { role, parts })
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::text(text)],
        }
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            parts: vec![Part::text(text)],
        }
    }

    /// 工具结果回合：携带解析后的 ToolResult 负载
    pub fn tool_output(result: Map<String, Value>) -> Self {
        Self {
            role: Role::ToolOutput,
            parts: vec![Part::ToolOutput { result }],
        }
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }
}

/// 仅追加的回合日志：append / all / visible，无删除、无就地修改
#[derive(Debug, Default)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// O(1) 追加，保持插入顺序
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// 完整有序序列（构建模型输入用）
    pub fn all(&self) -> &[Turn] {
        &self.turns
    }

    /// 除首条（隐藏 system 指令）外的全部回合，仅用于展示
    pub fn visible(&self) -> &[Turn] {
        if self.turns.is_empty() {
            &[]
        } else {
            &self.turns[1..]
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
