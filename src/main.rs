//! Catalyst Mind - 化学工程助手
//!
//! 入口：初始化日志、加载配置、组装组件并运行 stdin 会话循环。
//! 命令：`:attach <path>` 暂存附件（随下一条消息发送）、`:export <path>` 导出会话 JSON、
//! `:quit` 退出；其余输入作为一条用户消息提交。

use std::io::{BufRead, Write as _};
use std::path::Path;

use anyhow::Context;
use catalyst::agent::create_components;
use catalyst::config::load_config;
use catalyst::core::AgentError;
use catalyst::ingest::Attachment;
use catalyst::session::{ChatSession, GREETING};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志：默认 info，可通过 RUST_LOG 覆盖
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .with(fmt::layer())
        .init();

    let cfg = load_config(None).context("Failed to load config")?;
    let components = create_components(&cfg);
    let mut session = ChatSession::new(&components.registry);
    tracing::info!(session_id = %session.id(), "session started");

    println!("{}\n", GREETING);

    let stdin = std::io::stdin();
    let mut pending: Vec<Attachment> = Vec::new();

    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();

        if line == ":quit" || line == ":q" {
            break;
        }
        if let Some(path) = line.strip_prefix(":attach ") {
            match load_attachment(path.trim()) {
                Ok(attachment) => {
                    println!("Attached {} ({} bytes)", attachment.file_name, attachment.data.len());
                    pending.push(attachment);
                }
                Err(e) => println!("Could not attach: {:#}", e),
            }
            continue;
        }
        if let Some(path) = line.strip_prefix(":export ") {
            let json = serde_json::to_string_pretty(&session.export_json())?;
            std::fs::write(path.trim(), json)
                .with_context(|| format!("Failed to write {}", path.trim()))?;
            println!("Exported session to {}", path.trim());
            continue;
        }

        let text = if line.is_empty() { None } else { Some(line) };
        let attachments = std::mem::take(&mut pending);
        match session
            .submit(&components, text, &attachments, cfg.ingest.max_text_chars)
            .await
        {
            Ok(outcome) => {
                for note in &outcome.notes {
                    println!("[note] {}", note);
                }
                println!("\n{}\n", outcome.answer);
            }
            Err(e) => match &e {
                AgentError::EmptySubmission { notes } => {
                    for note in notes {
                        println!("[note] {}", note);
                    }
                    println!("{}", e);
                }
                _ => {
                    tracing::error!(error = %e, "turn failed");
                    println!("Error: {}", e);
                }
            },
        }
    }

    Ok(())
}

/// 读取附件并按扩展名推断 MIME 类型
fn load_attachment(path: &str) -> anyhow::Result<Attachment> {
    let data = std::fs::read(path).with_context(|| format!("Failed to read {}", path))?;
    let file_name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    let mime_type = match Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        other => {
            anyhow::bail!("Unsupported attachment extension: {:?}", other)
        }
    }
    .to_string();
    Ok(Attachment {
        file_name,
        mime_type,
        data,
    })
}
