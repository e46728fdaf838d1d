//! Résumé intake: PDF check, text extraction, S3 archive.

use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;

/// Extracted text beyond this is dropped before prompting.
pub const MAX_RESUME_CHARS: usize = 20_000;
const PDF_MAGIC: &[u8] = b"%PDF-";

pub fn is_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(PDF_MAGIC)
}

/// Extracts plain text from PDF bytes on the blocking pool.
pub async fn extract_text(pdf: Bytes) -> Result<String, AppError> {
    if !is_pdf(&pdf) {
        return Err(AppError::UnsupportedMedia(
            "Only PDF files are supported".to_string(),
        ));
    }

    let size = pdf.len();
    // pdf-extract panics on some malformed files; a panicked task is a bad upload.
    let extracted = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf))
        .await
        .map_err(|e| {
            if e.is_panic() {
                AppError::UnprocessableEntity("The PDF could not be read".to_string())
            } else {
                AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF extraction: {e}"))
            }
        })?
        .map_err(|e| AppError::UnprocessableEntity(format!("The PDF could not be read: {e}")))?;

    let text = cap_chars(&tidy(&extracted), MAX_RESUME_CHARS);
    if text.is_empty() {
        return Err(AppError::UnprocessableEntity(
            "No text could be extracted from the PDF".to_string(),
        ));
    }

    info!(bytes = size, chars = text.chars().count(), "Extracted résumé text");
    Ok(text)
}

/// Stores the original PDF under `resumes/<uuid>.pdf`. Failures are logged and
/// yield `None`; onboarding proceeds without an archived copy.
pub async fn archive_resume(s3: &aws_sdk_s3::Client, bucket: &str, pdf: Bytes) -> Option<String> {
    let key = format!("resumes/{}.pdf", Uuid::new_v4());
    match s3
        .put_object()
        .bucket(bucket)
        .key(&key)
        .body(ByteStream::from(pdf))
        .content_type("application/pdf")
        .send()
        .await
    {
        Ok(_) => {
            info!("Archived résumé to s3://{}/{}", bucket, key);
            Some(key)
        }
        Err(e) => {
            warn!("Résumé archive failed, continuing without it: {e}");
            None
        }
    }
}

/// Trims every line and collapses runs of blank lines into one.
fn tidy(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() && out.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        out.push(line);
    }
    while out.last().is_some_and(|l| l.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

fn cap_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
