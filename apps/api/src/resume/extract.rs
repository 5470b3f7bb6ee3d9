//! Text extraction seam. Rich formats (PDF, DOCX, scanned images) are handled
//! by an external extractor plugged in behind `TextExtractor`; the built-in
//! one only reads plain text.

use std::path::Path;

use crate::resume::error::ResumeError;

/// Turns uploaded bytes into text. Runs on a blocking thread, so
/// implementations may do slow synchronous work.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, content: &[u8], filename: &str) -> Result<String, ResumeError>;
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, content: &[u8], filename: &str) -> Result<String, ResumeError> {
        match file_extension(filename).as_deref() {
            Some("txt") | Some("rtf") => Ok(String::from_utf8_lossy(content).into_owned()),
            Some(other) => Err(ResumeError::UnsupportedFormat(format!(".{other}"))),
            None => Err(ResumeError::UnsupportedFormat(filename.to_string())),
        }
    }
}

pub fn file_extension(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_txt_case_insensitively() {
        let text = PlainTextExtractor.extract(b"hello", "CV.TXT").unwrap();
        assert_eq!(text, "hello");
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let text = PlainTextExtractor
            .extract(&[b'o', b'k', 0xff], "cv.txt")
            .unwrap();
        assert!(text.starts_with("ok"));
    }

    #[test]
    fn test_pdf_is_unsupported() {
        assert_eq!(
            PlainTextExtractor.extract(b"%PDF", "cv.pdf"),
            Err(ResumeError::UnsupportedFormat(".pdf".into()))
        );
    }

    #[test]
    fn test_no_extension_is_unsupported() {
        assert!(matches!(
            PlainTextExtractor.extract(b"x", "resume"),
            Err(ResumeError::UnsupportedFormat(_))
        ));
    }
}
