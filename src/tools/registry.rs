//! 工具注册表与类型化分发
//!
//! 工具名在启动期固定为有限的带标签变体：ToolRequest::decode 把 (name, args) 校验并转换成
//! 每个工具自己的类型化参数结构，未知名与参数转换失败分别是 Unknown / BadArguments 两种
//! 具名错误，而不是缺键或泛化故障。分发本身永不外抛：每次调用都得到 ToolResult
//! （status + payload），内部失败编码为 Error 状态负载；每次调用输出结构化审计日志（JSON）。

use std::time::{Duration, Instant};

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tokio::time::timeout;

use crate::config::ToolsSection;
use crate::tools::{equilibrium, flame, phase, simulate, thermo, weight, wiki};

/// 工具调用结果状态
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolStatus {
    Success,
    Error,
}

impl ToolStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolStatus::Success => "success",
            ToolStatus::Error => "error",
        }
    }
}

/// 每个工具必须返回的统一形状：状态 + JSON 负载；失败编码为 Error 状态与 message 字段
#[derive(Clone, Debug, PartialEq)]
pub struct ToolResult {
    pub status: ToolStatus,
    pub payload: Map<String, Value>,
}

impl ToolResult {
    pub fn success(payload: Map<String, Value>) -> Self {
        Self {
            status: ToolStatus::Success,
            payload,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        let mut payload = Map::new();
        payload.insert("message".to_string(), json!(message.into()));
        Self {
            status: ToolStatus::Error,
            payload,
        }
    }

    /// 失败并附带回显字段（原始实现会把入参一起编码进错误负载）
    pub fn error_with(message: impl Into<String>, extra: Map<String, Value>) -> Self {
        let mut result = Self::error(message);
        result.payload.extend(extra);
        result
    }

    /// 展平为单个 JSON 对象：{"status": ..., ...payload}
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("status".to_string(), json!(self.status.as_str()));
        map.extend(self.payload.clone());
        map
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.to_map())
    }
}

/// 分发边界上的具名错误：未知工具名 / 参数无法转换为该工具的类型化结构
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    Unknown(String),

    #[error("Bad arguments for tool '{tool}': {message}")]
    BadArguments { tool: String, message: String },
}

/// 启动期固定的调用请求变体，每个变体携带自己的类型化参数结构
#[derive(Debug)]
pub enum ToolRequest {
    FlameTemperature(flame::FlameTemperatureArgs),
    MolecularWeight(weight::MolecularWeightArgs),
    Equilibrium(equilibrium::EquilibriumArgs),
    ThermoProperties(thermo::ThermoPropertiesArgs),
    ProcessSimulation(simulate::ProcessSimulationArgs),
    PhaseDiagram(phase::PhaseDiagramArgs),
    WikipediaFetch(wiki::WikipediaArgs),
}

fn decode_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolError> {
    serde_json::from_value(args).map_err(|e| ToolError::BadArguments {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}

impl ToolRequest {
    /// 校验并转换 (name, args)；在调用任何工具实现之前完成全部参数解码
    pub fn decode(name: &str, args: Value) -> Result<Self, ToolError> {
        match name {
            flame::NAME => Ok(Self::FlameTemperature(decode_args(name, args)?)),
            weight::NAME => Ok(Self::MolecularWeight(decode_args(name, args)?)),
            equilibrium::NAME => Ok(Self::Equilibrium(decode_args(name, args)?)),
            thermo::NAME => Ok(Self::ThermoProperties(decode_args(name, args)?)),
            simulate::NAME => Ok(Self::ProcessSimulation(decode_args(name, args)?)),
            phase::NAME => Ok(Self::PhaseDiagram(decode_args(name, args)?)),
            wiki::NAME => Ok(Self::WikipediaFetch(decode_args(name, args)?)),
            other => Err(ToolError::Unknown(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::FlameTemperature(_) => flame::NAME,
            Self::MolecularWeight(_) => weight::NAME,
            Self::Equilibrium(_) => equilibrium::NAME,
            Self::ThermoProperties(_) => thermo::NAME,
            Self::ProcessSimulation(_) => simulate::NAME,
            Self::PhaseDiagram(_) => phase::NAME,
            Self::WikipediaFetch(_) => wiki::NAME,
        }
    }
}

/// 注册项：名称、描述与参数 JSON Schema（schemars 自动生成，拼入 system prompt）
#[derive(Clone, Debug)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

fn spec_of<T: JsonSchema>(name: &'static str, description: &'static str) -> ToolSpec {
    let schema = schema_for!(T);
    ToolSpec {
        name,
        description,
        parameters: serde_json::to_value(schema).unwrap_or_else(|_| json!({})),
    }
}

/// 进程级只读注册表：持有需要共享状态的工具实例与全局调用超时
pub struct ToolRegistry {
    wiki: wiki::WikipediaTool,
    timeout: Duration,
}

impl ToolRegistry {
    pub fn new(cfg: &ToolsSection) -> Self {
        Self {
            wiki: wiki::WikipediaTool::new(&cfg.wiki),
            timeout: Duration::from_secs(cfg.tool_timeout_secs),
        }
    }

    /// 全部注册工具的 (name, description, schema)
    pub fn specs(&self) -> Vec<ToolSpec> {
        vec![
            spec_of::<flame::FlameTemperatureArgs>(flame::NAME, flame::DESCRIPTION),
            spec_of::<weight::MolecularWeightArgs>(weight::NAME, weight::DESCRIPTION),
            spec_of::<equilibrium::EquilibriumArgs>(equilibrium::NAME, equilibrium::DESCRIPTION),
            spec_of::<thermo::ThermoPropertiesArgs>(thermo::NAME, thermo::DESCRIPTION),
            spec_of::<simulate::ProcessSimulationArgs>(simulate::NAME, simulate::DESCRIPTION),
            spec_of::<phase::PhaseDiagramArgs>(phase::NAME, phase::DESCRIPTION),
            spec_of::<wiki::WikipediaArgs>(wiki::NAME, wiki::DESCRIPTION),
        ]
    }

    /// 调用指定工具：解码 -> 超时内分发 -> 审计日志。
    /// 未知名与参数解码失败以 ToolError 返回，工具内部失败一律是 Error 状态的 ToolResult。
    pub async fn invoke(&self, name: &str, args: Value) -> Result<ToolResult, ToolError> {
        let args_preview = args_preview(&args);
        let request = ToolRequest::decode(name, args)?;
        let tool_name = request.name();

        let start = Instant::now();
        let result = match timeout(self.timeout, self.dispatch(request)).await {
            Ok(r) => r,
            Err(_) => ToolResult::error(format!(
                "Tool '{}' timed out after {}s",
                tool_name,
                self.timeout.as_secs()
            )),
        };

        let audit = json!({
            "event": "tool_audit",
            "tool": tool_name,
            "status": result.status.as_str(),
            "duration_ms": start.elapsed().as_millis() as u64,
            "args_preview": args_preview,
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        Ok(result)
    }

    async fn dispatch(&self, request: ToolRequest) -> ToolResult {
        match request {
            ToolRequest::FlameTemperature(args) => flame::run(&args),
            ToolRequest::MolecularWeight(args) => weight::run(&args),
            ToolRequest::Equilibrium(args) => equilibrium::run(&args),
            ToolRequest::ThermoProperties(args) => thermo::run(&args),
            ToolRequest::ProcessSimulation(args) => simulate::run(&args),
            ToolRequest::PhaseDiagram(args) => phase::run(&args),
            ToolRequest::WikipediaFetch(args) => self.wiki.fetch(&args).await,
        }
    }
}

fn args_preview(args: &Value) -> String {
    let s = args.to_string();
    if s.len() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> ToolRegistry {
        ToolRegistry::new(&ToolsSection::default())
    }

    #[tokio::test]
    async fn molecular_weight_of_co2_succeeds() {
        let result = registry()
            .invoke(weight::NAME, json!({"species_name": "CO2"}))
            .await
            .unwrap();
        assert_eq!(result.status, ToolStatus::Success);
        let g_mol = result.payload["molecular_weight_g_mol"].as_f64().unwrap();
        assert!((g_mol - 44.01).abs() < 0.05, "got {}", g_mol);
    }

    #[tokio::test]
    async fn identical_invocations_yield_identical_results() {
        let reg = registry();
        let args = json!({"species_name": "H2O"});
        let first = reg.invoke(weight::NAME, args.clone()).await.unwrap();
        let second = reg.invoke(weight::NAME, args).await.unwrap();
        assert_eq!(first.status, second.status);
        assert_eq!(first.payload, second.payload);
    }

    #[tokio::test]
    async fn unknown_tool_is_a_named_error_kind() {
        let err = registry().invoke("bogus_tool", json!({})).await.unwrap_err();
        assert!(matches!(err, ToolError::Unknown(name) if name == "bogus_tool"));
    }

    #[tokio::test]
    async fn bad_arguments_are_a_named_error_kind() {
        let err = registry()
            .invoke(weight::NAME, json!({"species_name": 42}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::BadArguments { tool, .. } if tool == weight::NAME));
    }

    #[tokio::test]
    async fn overflowing_formula_counts_are_error_status_not_faults() {
        let reg = registry();
        // 组倍数与重复元素累加都会溢出 u32；必须以 Error 状态返回而不是让调用恐慌或回绕
        for formula in ["(H4294967295)2", "H4000000000H4000000000", "H99999999999"] {
            let result = reg
                .invoke(weight::NAME, json!({"species_name": formula}))
                .await
                .unwrap();
            assert_eq!(result.status, ToolStatus::Error, "formula {}", formula);
        }
    }

    #[tokio::test]
    async fn internal_tool_failure_is_an_error_status_result() {
        let result = registry()
            .invoke(weight::NAME, json!({"species_name": "UNOBTAINIUM99"}))
            .await
            .unwrap();
        assert_eq!(result.status, ToolStatus::Error);
        assert!(result.payload["message"].as_str().unwrap().contains("UNOBTAINIUM99"));
    }

    #[test]
    fn to_value_flattens_status_with_payload() {
        let mut payload = Map::new();
        payload.insert("species".into(), json!("CO2"));
        let v = ToolResult::success(payload).to_value();
        assert_eq!(v["status"], json!("success"));
        assert_eq!(v["species"], json!("CO2"));
    }

    #[test]
    fn specs_cover_all_seven_tools() {
        let specs = registry().specs();
        assert_eq!(specs.len(), 7);
        assert!(specs.iter().any(|s| s.name == wiki::NAME));
        for spec in specs {
            assert!(spec.parameters.is_object());
        }
    }
}
