//! 参考文章抓取工具（Wikipedia）
//!
//! GET 对应词条页面，带浏览器 UA 与超时；HTML 用 html2text 提取可读正文，
//! 失败时退回手工去标签；超过 max_article_chars 截断并追加 ...[truncated]。

use reqwest::Client;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Map};

use crate::config::WikiSection;
use crate::tools::ToolResult;

pub const NAME: &str = "get_wikipedia_data";
pub const DESCRIPTION: &str =
    "Fetches the main content of a Wikipedia article for a chemical or scientific topic.";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WikipediaArgs {
    /// 要检索的主题，如 'Haber process'
    pub query: String,
}

/// Wikipedia 抓取工具：持有 reqwest Client 与截断上限
pub struct WikipediaTool {
    client: Client,
    base_url: String,
    max_article_chars: usize,
}

/// 简易去除 HTML 标签（html2text 失败时的回退）
fn strip_html_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    let mut prev_whitespace = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => {
                let is_whitespace = c.is_whitespace();
                if is_whitespace && prev_whitespace {
                    continue;
                }
                prev_whitespace = is_whitespace;
                out.push(if is_whitespace { ' ' } else { c });
            }
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ").trim().to_string()
}

/// 从 <title> 标签提取词条标题，去掉站点后缀
fn extract_title(html: &str) -> Option<String> {
    let start = html.find("<title>")? + "<title>".len();
    let end = html[start..].find("</title>")? + start;
    let title = html[start..end].trim();
    let title = title
        .strip_suffix(" - Wikipedia")
        .or_else(|| title.strip_suffix(" — Wikipedia"))
        .unwrap_or(title);
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

impl WikipediaTool {
    pub fn new(cfg: &WikiSection) -> Self {
        const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(cfg.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            max_article_chars: cfg.max_article_chars,
        }
    }

    fn html_to_text(&self, html: &str) -> String {
        match html2text::from_read(html.as_bytes(), 120) {
            Ok(text) if !text.trim().is_empty() => text,
            _ => strip_html_tags(html),
        }
    }

    fn article_url(&self, query: &str) -> String {
        // 词条 URL：空格转下划线，其余保守地百分号编码
        let mut encoded = String::with_capacity(query.len());
        for c in query.trim().chars() {
            match c {
                ' ' => encoded.push('_'),
                c if c.is_ascii_alphanumeric() || "-_.~()".contains(c) => encoded.push(c),
                c => {
                    let mut buf = [0u8; 4];
                    for b in c.encode_utf8(&mut buf).bytes() {
                        encoded.push_str(&format!("%{:02X}", b));
                    }
                }
            }
        }
        format!("{}/{}", self.base_url, encoded)
    }

    pub async fn fetch(&self, args: &WikipediaArgs) -> ToolResult {
        let url = self.article_url(&args.query);
        let mut echo = Map::new();
        echo.insert("query".into(), json!(args.query));
        echo.insert("wikipedia_url".into(), json!(url));

        if args.query.trim().is_empty() {
            return ToolResult::error_with("Missing query", echo);
        }

        tracing::info!(url = %url, "wikipedia fetch");
        let resp = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => return ToolResult::error_with(format!("Network error: {}", e), echo),
        };
        if !resp.status().is_success() {
            return ToolResult::error_with(format!("HTTP {}", resp.status()), echo);
        }
        let html = match resp.text().await {
            Ok(b) => b,
            Err(e) => return ToolResult::error_with(format!("Network error: {}", e), echo),
        };

        let title = extract_title(&html).unwrap_or_else(|| args.query.trim().to_string());
        let mut text = self.html_to_text(&html);
        if text.trim().is_empty() {
            return ToolResult::error_with("No article text found on the page.", echo);
        }
        if text.chars().count() > self.max_article_chars {
            text = text.chars().take(self.max_article_chars).collect::<String>()
                + "\n...[truncated]";
        }

        let mut payload = echo;
        payload.insert("title".into(), json!(title));
        payload.insert("article_text".into(), json!(text.trim()));
        ToolResult::success(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_url_encodes_query() {
        let tool = WikipediaTool::new(&WikiSection::default());
        assert_eq!(
            tool.article_url("Haber process"),
            "https://en.wikipedia.org/wiki/Haber_process"
        );
        assert!(tool.article_url("C2H5OH (ethanol)").contains("C2H5OH_(ethanol)"));
    }

    #[test]
    fn title_extraction_strips_site_suffix() {
        let html = "<html><head><title>Ammonia - Wikipedia</title></head><body></body></html>";
        assert_eq!(extract_title(html).as_deref(), Some("Ammonia"));
        assert_eq!(extract_title("<html></html>"), None);
    }

    #[tokio::test]
    async fn empty_query_is_error_status() {
        let tool = WikipediaTool::new(&WikiSection::default());
        let result = tool.fetch(&WikipediaArgs { query: "  ".into() }).await;
        assert_eq!(result.status, crate::tools::ToolStatus::Error);
    }
}
