use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub mod docx;
pub mod frequency;

pub use docx::extract_text_from_docx;
pub use frequency::{clean_text, format_frequency_report, top_words, WordCount};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported file type '{0}', please upload a PDF, DOCX or TXT file")]
    UnsupportedFormat(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to extract text from PDF: {0}")]
    Pdf(String),
    #[error("failed to read Word document: {0}")]
    Docx(String),
    #[error("text file is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Supported upload formats, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Txt,
}

impl DocumentKind {
    pub fn from_extension(extension: &str) -> Result<Self, ExtractionError> {
        match extension.to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "docx" => Ok(DocumentKind::Docx),
            "txt" => Ok(DocumentKind::Txt),
            other => Err(ExtractionError::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, ExtractionError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        Self::from_extension(extension)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Pdf => write!(f, "PDF"),
            DocumentKind::Docx => write!(f, "DOCX"),
            DocumentKind::Txt => write!(f, "TXT"),
        }
    }
}

pub fn extract_text_from_pdf(pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
    let text = pdf_extract::extract_text_from_mem(pdf_bytes)
        .map_err(|e| ExtractionError::Pdf(e.to_string()))?;
    Ok(text)
}

pub fn extract_text_from_txt(txt_bytes: &[u8]) -> Result<String, ExtractionError> {
    let bytes = txt_bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(txt_bytes);
    Ok(String::from_utf8(bytes.to_vec())?)
}

/// Extract text from in-memory upload content; `file_name` only decides the format.
pub fn extract_text_from_bytes(file_name: &str, bytes: &[u8]) -> Result<String, ExtractionError> {
    let kind = DocumentKind::from_path(Path::new(file_name))?;
    extract_by_kind(kind, bytes)
}

/// Extract the full plain text of a PDF, Word or text document on disk.
pub fn extract_text(path: &Path) -> Result<String, ExtractionError> {
    // Reject by extension before touching the file
    let kind = DocumentKind::from_path(path)?;

    let bytes = std::fs::read(path).map_err(|source| ExtractionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("📄 Extracting text from {} ({}, {} bytes)", path.display(), kind, bytes.len());

    let text = extract_by_kind(kind, &bytes)?;
    info!("✅ Text extraction successful, {} characters", text.chars().count());
    Ok(text)
}

fn extract_by_kind(kind: DocumentKind, bytes: &[u8]) -> Result<String, ExtractionError> {
    debug!("Extracting {} content ({} bytes)", kind, bytes.len());
    match kind {
        DocumentKind::Pdf => extract_text_from_pdf(bytes),
        DocumentKind::Docx => extract_text_from_docx(bytes),
        DocumentKind::Txt => extract_text_from_txt(bytes),
    }
}

/// One checkpoint per non-blank line, trimmed.
pub fn parse_checkpoint_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// First `max_chars` characters followed by `...`; shorter text is returned as is.
pub fn text_preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
