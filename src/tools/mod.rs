//! 工具箱：六个化工计算工具 + 参考文章抓取，类型化注册表与分发

pub mod equilibrium;
pub mod flame;
pub mod phase;
pub mod registry;
pub mod simulate;
pub mod thermo;
pub mod weight;
pub mod wiki;

pub use registry::{ToolError, ToolRegistry, ToolRequest, ToolResult, ToolSpec, ToolStatus};
