//! Turns an uploaded resume file into plain text for the analysis flows.
//!
//! PDFs go through `pdf-extract` on the blocking pool; plain text must be UTF-8.

use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;

const PDF_MAGIC: &[u8] = b"%PDF";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Pdf,
    PlainText,
}

/// Decides how to read an upload from its leading bytes, declared content type,
/// and file name, in that order of trust.
pub fn detect_kind(data: &[u8], content_type: Option<&str>, file_name: Option<&str>) -> Option<UploadKind> {
    if data.starts_with(PDF_MAGIC) {
        return Some(UploadKind::Pdf);
    }
    let content_type = content_type.unwrap_or_default().to_ascii_lowercase();
    let file_name = file_name.unwrap_or_default().to_ascii_lowercase();
    if content_type == "application/pdf" || file_name.ends_with(".pdf") {
        Some(UploadKind::Pdf)
    } else if content_type.starts_with("text/plain") || file_name.ends_with(".txt") {
        Some(UploadKind::PlainText)
    } else {
        None
    }
}

pub async fn extract_resume_text(
    data: Bytes,
    content_type: Option<&str>,
    file_name: Option<&str>,
) -> Result<String, AppError> {
    if data.is_empty() {
        return Err(AppError::Validation("uploaded file is empty".to_string()));
    }

    let kind = detect_kind(&data, content_type, file_name).ok_or_else(|| {
        AppError::UnprocessableEntity("only PDF and plain-text resumes are supported".to_string())
    })?;

    let text = match kind {
        UploadKind::Pdf => tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&data).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("PDF extraction task failed: {e}")))?
        .map_err(|e| AppError::UnprocessableEntity(format!("could not read PDF: {e}")))?,
        UploadKind::PlainText => String::from_utf8(data.to_vec())
            .map_err(|_| AppError::UnprocessableEntity("text file is not valid UTF-8".to_string()))?,
    };

    let text = normalize_whitespace(&text);
    if text.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "no text could be extracted from the uploaded file".to_string(),
        ));
    }

    info!("Extracted {} characters from {:?} upload", text.len(), kind);
    Ok(text)
}

/// Trims each line and collapses runs of blank lines, which PDF extraction produces a lot of.
fn normalize_whitespace(text: &str) -> String {
    let mut out = Vec::new();
    let mut blank_run = false;
    for line in text.lines().map(str::trim_end) {
        if line.trim().is_empty() {
            if !blank_run && !out.is_empty() {
                out.push("");
            }
            blank_run = true;
        } else {
            out.push(line);
            blank_run = false;
        }
    }
    while out.last() == Some(&"") {
        out.pop();
    }
    out.join("\n")
}
