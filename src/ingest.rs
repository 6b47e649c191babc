//! 附件摄取：图片 / PDF / 纯文本 -> 归一化内容部件
//!
//! 按 MIME 类型分派：图片解码校验后归一化为 PNG 缓冲；PDF 逐页提取文本后拼接；
//! 纯文本按 UTF-8 解码。文本类内容超过 max_text_chars 时截断并追加显式标记。
//! 单个附件失败只丢弃该附件并记录一条说明，继续处理其余内容；不支持的类型同样拒绝并说明。

use std::io::Cursor;

use crate::transcript::Part;

/// 截断标记（追加在被截断文本之后）
pub const TRUNCATION_MARKER: &str = "...\n\n[Content truncated due to length.]";

/// 一个待摄取的二进制附件
#[derive(Clone, Debug)]
pub struct Attachment {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// 摄取结果：产出的部件 + 面向用户的说明（丢弃原因、截断提示等）
#[derive(Debug, Default)]
pub struct IngestReport {
    pub parts: Vec<Part>,
    pub notes: Vec<String>,
}

/// 超过 max_chars 时取前 max_chars 个字符并追加截断标记，否则原样返回
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

/// 摄取一次用户提交：可选文本 + 任意数量附件。
/// parts 为空表示整次提交无有效内容，由调用方在任何模型调用之前拒绝。
pub fn ingest_submission(
    text: Option<&str>,
    attachments: &[Attachment],
    max_text_chars: usize,
) -> IngestReport {
    let mut report = IngestReport::default();

    if let Some(t) = text {
        let t = t.trim();
        if !t.is_empty() {
            report.parts.push(Part::text(t));
        }
    }

    for attachment in attachments {
        ingest_attachment(attachment, max_text_chars, &mut report);
    }

    report
}

fn ingest_attachment(attachment: &Attachment, max_text_chars: usize, report: &mut IngestReport) {
    let name = &attachment.file_name;
    let mime = attachment.mime_type.as_str();

    if mime.starts_with("image/") {
        match decode_image(&attachment.data) {
            Ok(part) => report.parts.push(part),
            Err(e) => report.notes.push(format!(
                "Error processing image {}: {}. This image will not be sent.",
                name, e
            )),
        }
    } else if mime == "application/pdf" {
        match pdf_extract::extract_text_from_mem(&attachment.data) {
            Ok(text) if !text.trim().is_empty() => {
                let truncated = truncate_chars(text.trim(), max_text_chars);
                report.parts.push(Part::text(format!(
                    "Content from PDF '{}':\n\n{}",
                    name, truncated
                )));
            }
            Ok(_) => {
                report.notes.push(format!(
                    "Could not extract any readable text from PDF: {}. It might be a scanned PDF without OCR, or empty.",
                    name
                ));
                report.parts.push(Part::text(format!(
                    "Attempted to process PDF '{}', but no text could be extracted.",
                    name
                )));
            }
            Err(e) => report.notes.push(format!(
                "Error processing PDF {}: {}. This PDF will not be sent.",
                name, e
            )),
        }
    } else if mime == "text/plain" {
        match String::from_utf8(attachment.data.clone()) {
            Ok(text) => {
                let truncated = truncate_chars(text.trim(), max_text_chars);
                report.parts.push(Part::text(format!(
                    "Content from TXT '{}':\n\n{}",
                    name, truncated
                )));
            }
            Err(e) => report.notes.push(format!(
                "Error processing text file {}: {}. This file will not be sent.",
                name, e
            )),
        }
    } else {
        report.notes.push(format!(
            "Unsupported file type: {} ({}). Only images (PNG, JPG, JPEG), PDFs, and TXT files are supported.",
            name, mime
        ));
    }
}

/// 解码并归一化图片：校验可解码后重编码为 PNG，记录来源格式与尺寸
fn decode_image(data: &[u8]) -> Result<Part, String> {
    let format = image::guess_format(data).map_err(|e| e.to_string())?;
    let decoded = image::load_from_memory(data).map_err(|e| e.to_string())?;

    let mut png = Cursor::new(Vec::new());
    decoded
        .write_to(&mut png, image::ImageFormat::Png)
        .map_err(|e| e.to_string())?;

    let source_format = format
        .extensions_str()
        .first()
        .copied()
        .unwrap_or("unknown")
        .to_string();

    Ok(Part::Image {
        data: png.into_inner(),
        source_format,
        width: decoded.width(),
        height: decoded.height(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_text_is_cut_to_limit_plus_marker() {
        let long: String = "a".repeat(2500);
        let out = truncate_chars(&long, 2000);
        assert_eq!(out, format!("{}{}", "a".repeat(2000), TRUNCATION_MARKER));

        let short = "hello";
        assert_eq!(truncate_chars(short, 2000), "hello");
    }

    #[test]
    fn text_attachment_is_labelled_and_truncated() {
        let attachment = Attachment {
            file_name: "notes.txt".into(),
            mime_type: "text/plain".into(),
            data: "x".repeat(2500).into_bytes(),
        };
        let report = ingest_submission(None, &[attachment], 2000);
        assert_eq!(report.parts.len(), 1);
        match &report.parts[0] {
            Part::Text { text } => {
                assert!(text.starts_with("Content from TXT 'notes.txt':\n\n"));
                assert!(text.ends_with(TRUNCATION_MARKER));
            }
            other => panic!("expected text part, got {:?}", other),
        }
    }

    #[test]
    fn unsupported_types_yield_zero_parts_and_a_note() {
        let attachment = Attachment {
            file_name: "song.mp3".into(),
            mime_type: "audio/mpeg".into(),
            data: vec![0, 1, 2],
        };
        let report = ingest_submission(None, &[attachment], 2000);
        assert!(report.parts.is_empty());
        assert_eq!(report.notes.len(), 1);
        assert!(report.notes[0].contains("Unsupported file type"));
    }

    #[test]
    fn invalid_utf8_text_is_dropped_with_note() {
        let attachment = Attachment {
            file_name: "broken.txt".into(),
            mime_type: "text/plain".into(),
            data: vec![0xff, 0xfe, 0xfd],
        };
        let report = ingest_submission(Some("still valid"), &[attachment], 2000);
        assert_eq!(report.parts.len(), 1); // 只有文本提示，附件被丢弃
        assert_eq!(report.notes.len(), 1);
    }

    #[test]
    fn bad_image_bytes_are_dropped_with_note() {
        let attachment = Attachment {
            file_name: "photo.png".into(),
            mime_type: "image/png".into(),
            data: vec![1, 2, 3, 4],
        };
        let report = ingest_submission(None, &[attachment], 2000);
        assert!(report.parts.is_empty());
        assert!(report.notes[0].contains("photo.png"));
    }

    #[test]
    fn valid_png_is_normalized_with_dimensions() {
        // 2x2 纯色图，编码为 PNG 后再走摄取
        let img = image::DynamicImage::new_rgba8(2, 2);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();

        let attachment = Attachment {
            file_name: "tiny.png".into(),
            mime_type: "image/png".into(),
            data: buf.into_inner(),
        };
        let report = ingest_submission(None, &[attachment], 2000);
        assert_eq!(report.parts.len(), 1);
        match &report.parts[0] {
            Part::Image {
                width,
                height,
                source_format,
                data,
            } => {
                assert_eq!((*width, *height), (2, 2));
                assert_eq!(source_format, "png");
                assert!(!data.is_empty());
            }
            other => panic!("expected image part, got {:?}", other),
        }
    }

    #[test]
    fn garbage_pdf_is_dropped_with_note() {
        let attachment = Attachment {
            file_name: "doc.pdf".into(),
            mime_type: "application/pdf".into(),
            data: b"not a pdf at all".to_vec(),
        };
        let report = ingest_submission(None, &[attachment], 2000);
        assert!(report.parts.is_empty());
        assert!(report.notes[0].contains("doc.pdf"));
    }

    #[test]
    fn empty_submission_produces_no_parts() {
        let report = ingest_submission(Some("   "), &[], 2000);
        assert!(report.parts.is_empty());
    }
}
