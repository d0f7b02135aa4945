use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use mime_guess::from_path;

use crate::error::RagError;
use crate::hashing;

/// A document with its raw bytes, extracted text, and metadata.
#[derive(Debug, Clone)]
pub struct Document {
    /// The extracted text content of the document
    pub content: String,
    /// Digest of the raw bytes, used as the index cache key
    pub content_id: String,
    /// The document's MIME type
    pub mime_type: String,
}

impl Document {
    /// Create a document from a file path, guessing the MIME type from the
    /// file name.
    pub fn from_file<P: AsRef<Path>>(file_path: P) -> Result<Self> {
        let path = file_path.as_ref();

        let mime = from_path(path).first_or_octet_stream();
        let mime_type = mime.to_string();
        debug!("Detected MIME type: {}", mime_type);

        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        let document = Self::from_bytes(&bytes, &mime_type)?;
        Ok(document)
    }

    /// Create a document from an uploaded byte stream and its MIME type.
    ///
    /// The content id is computed over the raw bytes before any extraction,
    /// so the same upload always maps to the same cached index.
    pub fn from_bytes(bytes: &[u8], mime_type: &str) -> Result<Self, RagError> {
        let content_id = hashing::content_id(bytes);
        let content = extract_content(bytes, mime_type)?;

        Ok(Document {
            content,
            content_id,
            mime_type: mime_type.to_string(),
        })
    }
}

/// Extract text from document bytes based on the MIME type.
fn extract_content(bytes: &[u8], mime_type: &str) -> Result<String, RagError> {
    match mime_type {
        mime if mime.starts_with("application/pdf") => {
            info!("Extracting text from PDF ({} bytes)", bytes.len());
            let content = pdf_extract::extract_text_from_mem(bytes)
                .map_err(|e| RagError::UnreadableDocument(e.to_string()))?;

            // PDF extraction can leave excessive whitespace behind
            let cleaned = normalize_whitespace(&content);
            if cleaned.is_empty() {
                warn!("Extracted PDF content is empty or contains only whitespace");
            }

            Ok(cleaned)
        }

        mime if mime.starts_with("text/") => {
            info!("Reading plain text document ({} bytes)", bytes.len());
            let content = std::str::from_utf8(bytes)
                .map_err(|e| RagError::UnreadableDocument(format!("invalid UTF-8: {}", e)))?;
            Ok(content.to_string())
        }

        _ => Err(RagError::UnreadableDocument(format!(
            "unsupported document format: {}. Only text and PDF files are supported.",
            mime_type
        ))),
    }
}

/// Collapse runs of spaces and cap runs of newlines at a paragraph break.
fn normalize_whitespace(text: &str) -> String {
    let mut normalized = String::with_capacity(text.len());
    let mut pending_newlines = 0;
    let mut prev = ' ';

    for c in text.chars().filter(|&c| c != '\r') {
        if c == '\n' {
            pending_newlines += 1;
            continue;
        }
        if pending_newlines > 0 {
            normalized.push_str(if pending_newlines >= 2 { "\n\n" } else { "\n" });
            pending_newlines = 0;
            prev = '\n';
        }
        if c == ' ' && prev == ' ' {
            continue;
        }
        normalized.push(c);
        prev = c;
    }

    normalized.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        let text = "This  has   multiple    spaces.\n\n\nAnd multiple newlines.\r\nAnd Windows line endings.";
        let expected =
            "This has multiple spaces.\n\nAnd multiple newlines.\nAnd Windows line endings.";
        assert_eq!(normalize_whitespace(text), expected);
    }

    #[test]
    fn test_normalize_whitespace_trims_edges() {
        assert_eq!(normalize_whitespace("  text  \n\n\n"), "text");
    }

    #[test]
    fn test_from_bytes_plain_text() {
        let document = Document::from_bytes(b"hello document", "text/plain").unwrap();
        assert_eq!(document.content, "hello document");
        assert_eq!(document.content_id, hashing::content_id(b"hello document"));
    }

    #[test]
    fn test_from_bytes_same_bytes_same_id() {
        let a = Document::from_bytes(b"same", "text/plain").unwrap();
        let b = Document::from_bytes(b"same", "text/plain").unwrap();
        assert_eq!(a.content_id, b.content_id);
    }

    #[test]
    fn test_from_bytes_unsupported_format() {
        let err = Document::from_bytes(b"\x89PNG", "image/png").unwrap_err();
        assert!(matches!(err, RagError::UnreadableDocument(_)));
    }

    #[test]
    fn test_from_bytes_invalid_utf8_text() {
        let err = Document::from_bytes(&[0xff, 0xfe, 0x41], "text/plain").unwrap_err();
        assert!(matches!(err, RagError::UnreadableDocument(_)));
    }

    #[test]
    fn test_from_bytes_malformed_pdf() {
        let err = Document::from_bytes(b"not a pdf at all", "application/pdf").unwrap_err();
        assert!(matches!(err, RagError::UnreadableDocument(_)));
    }
}
