//! Catalyst Mind - 化学工程助手（手动工具调用编排）
//!
//! 模块划分：
//! - **agent**: 编排循环（至多两次模型调用、工具结果回灌）
//! - **chem**: 内部数值协作方（分子量、绝热火焰温度、平衡组成、热力学性质）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型
//! - **detect**: 模型输出中的内嵌工具调用检测（首末大括号 + JSON 解析）
//! - **ingest**: 附件摄取（图片 / PDF / 纯文本 -> 内容部件）
//! - **llm**: LLM 客户端抽象与实现（Gemini 兼容 REST / Mock）
//! - **normalize**: 会话记录 -> 模型消息的归一化
//! - **session**: 会话（指令播种、提交入口、JSON 导出）
//! - **tools**: 工具箱（六个化工计算工具 + Wikipedia 抓取）与类型化注册表
//! - **transcript**: 仅追加的会话记录（回合与部件）

pub mod agent;
pub mod chem;
pub mod config;
pub mod core;
pub mod detect;
pub mod ingest;
pub mod llm;
pub mod normalize;
pub mod session;
pub mod tools;
pub mod transcript;
