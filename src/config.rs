//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `CATALYST__*` 覆盖（双下划线表示嵌套，
//! 如 `CATALYST__LLM__MODEL=gemini-1.5-flash`）。所有键都有内置默认值，配置文件可缺省。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub llm: LlmSection,
    pub ingest: IngestSection,
    pub tools: ToolsSection,
}

/// [app] 段：应用名
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppSection {
    pub name: Option<String>,
}

/// [llm] 段：端点、模型、API Key 与固定生成参数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// Gemini 兼容端点；未设置时用官方 v1beta 端点
    pub base_url: Option<String>,
    pub model: String,
    /// 未设置时读环境变量 GEMINI_API_KEY
    pub api_key: Option<String>,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub request_timeout_secs: u64,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            base_url: None,
            model: "gemini-1.5-flash".to_string(),
            api_key: None,
            temperature: 0.7,
            max_output_tokens: 1024,
            request_timeout_secs: 60,
        }
    }
}

/// [ingest] 段：文本附件截断上限（字符数）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestSection {
    pub max_text_chars: usize,
}

impl Default for IngestSection {
    fn default() -> Self {
        Self {
            max_text_chars: 2000,
        }
    }
}

/// [tools] 段：单次工具调用超时与 wiki 抓取参数
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    /// 单次工具调用超时（秒）
    pub tool_timeout_secs: u64,
    pub wiki: WikiSection,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            tool_timeout_secs: 30,
            wiki: WikiSection::default(),
        }
    }
}

/// [tools.wiki] 段：词条基址、抓取超时、正文截断上限
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WikiSection {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_article_chars: usize,
}

impl Default for WikiSection {
    fn default() -> Self {
        Self {
            base_url: "https://en.wikipedia.org/wiki".to_string(),
            timeout_secs: 15,
            max_article_chars: 8000,
        }
    }
}

/// 从 config 目录加载配置，环境变量 CATALYST__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 CATALYST__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("CATALYST")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
