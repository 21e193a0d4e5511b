//! Text extraction for uploaded resumes and job descriptions.

use std::path::Path;

use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

/// One uploaded file part. Lives only for the duration of a request.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub filename: String,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Text,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type '{extension}'. Upload PDF or TXT.")]
    UnsupportedFormat { extension: String },

    #[error("Could not read PDF '{filename}': {reason}")]
    Pdf { filename: String, reason: String },

    #[error("File '{filename}' is not valid UTF-8 text: {source}")]
    Encoding {
        filename: String,
        #[source]
        source: std::str::Utf8Error,
    },

    /// The blocking extraction task panicked or was cancelled.
    #[error("Text extraction for '{filename}' aborted: {source}")]
    Aborted {
        filename: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

impl DocumentFormat {
    /// Detects the format from the filename extension, case-insensitively.
    pub fn from_filename(filename: &str) -> Result<Self, ExtractError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_lowercase();
        match extension.as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "txt" => Ok(DocumentFormat::Text),
            "" => Err(ExtractError::UnsupportedFormat {
                extension: "(none)".to_string(),
            }),
            other => Err(ExtractError::UnsupportedFormat {
                extension: format!(".{other}"),
            }),
        }
    }
}

/// Returns the plain-text content of an uploaded document.
///
/// PDF pages are concatenated in page order. Text files are decoded as
/// strict UTF-8 and returned unchanged. PDF parsing is CPU-bound, so call
/// this from a blocking context (see `extract_blocking`).
pub fn extract(document: &UploadedDocument) -> Result<String, ExtractError> {
    match DocumentFormat::from_filename(&document.filename)? {
        DocumentFormat::Pdf => {
            let pages = pdf_extract::extract_text_from_mem_by_pages(&document.bytes).map_err(
                |e| ExtractError::Pdf {
                    filename: document.filename.clone(),
                    reason: e.to_string(),
                },
            )?;
            debug!("Extracted {} PDF pages from {}", pages.len(), document.filename);
            Ok(pages.concat())
        }
        DocumentFormat::Text => std::str::from_utf8(&document.bytes)
            .map(str::to_owned)
            .map_err(|source| ExtractError::Encoding {
                filename: document.filename.clone(),
                source,
            }),
    }
}

/// Runs `extract` on the blocking pool. A panic inside the PDF library
/// comes back as `ExtractError::Aborted`.
pub async fn extract_blocking(document: UploadedDocument) -> Result<String, ExtractError> {
    // Reject unsupported types before handing work to the blocking pool.
    DocumentFormat::from_filename(&document.filename)?;

    let filename = document.filename.clone();
    run_blocking(filename, move || extract(&document)).await
}

async fn run_blocking<F>(filename: String, job: F) -> Result<String, ExtractError>
where
    F: FnOnce() -> Result<String, ExtractError> + Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .map_err(|source| ExtractError::Aborted { filename, source })?
}
