//! Resume parsing, memoized in the shared TTL cache.
//!
//! Cache keys combine the parse kind, a SHA-256 fingerprint of the uploaded
//! bytes and the filename (the extension decides how bytes are read). Only
//! successful parses are stored.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::cache::TtlCache;
use crate::resume::error::ResumeError;
use crate::resume::extract::TextExtractor;
use crate::resume::keywords::{extract_skills_and_roles, ResumeSummary};

/// `full_text` is cut to this many characters, followed by "...".
pub const FULL_TEXT_LIMIT: usize = 5000;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\w.-]+@[\w.-]+").expect("email pattern is valid"));
static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\+\d{1,3})?[\s-]?\(?\d{3}\)?[\s-]?\d{3}[\s-]?\d{4}")
        .expect("phone pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMetadata {
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullResume {
    pub full_text: String,
    pub metadata: ContactMetadata,
    pub extracted_data: ResumeSummary,
}

/// What the resume cache holds. One cache serves both parse kinds.
#[derive(Debug, Clone)]
pub enum CachedParse {
    Basic(ResumeSummary),
    Full(FullResume),
}

pub type ResumeCache = TtlCache<CachedParse>;

pub struct ResumeParser {
    cache: Arc<ResumeCache>,
    extractor: Arc<dyn TextExtractor>,
}

impl ResumeParser {
    pub fn new(cache: Arc<ResumeCache>, extractor: Arc<dyn TextExtractor>) -> Self {
        Self { cache, extractor }
    }

    pub fn cache(&self) -> &Arc<ResumeCache> {
        &self.cache
    }

    /// Skills and roles only.
    pub fn parse_basic(&self, content: &[u8], filename: &str) -> Result<ResumeSummary, ResumeError> {
        check_upload(content, filename)?;
        let key = cache_key("parse_basic", content, filename);
        if let Some(CachedParse::Basic(summary)) = self.cache.get(&key) {
            debug!(filename, "resume cache hit (basic)");
            return Ok(summary);
        }

        let text = self.extract_text(content, filename)?;
        let summary = extract_skills_and_roles(&text);

        self.cache.set(key, CachedParse::Basic(summary.clone()));
        Ok(summary)
    }

    /// Skills and roles plus contact details and the (truncated) text.
    pub fn parse_full(&self, content: &[u8], filename: &str) -> Result<FullResume, ResumeError> {
        check_upload(content, filename)?;
        let key = cache_key("parse_full", content, filename);
        if let Some(CachedParse::Full(full)) = self.cache.get(&key) {
            debug!(filename, "resume cache hit (full)");
            return Ok(full);
        }

        let text = self.extract_text(content, filename)?;
        let full = FullResume {
            metadata: extract_contact_metadata(&text),
            extracted_data: extract_skills_and_roles(&text),
            full_text: truncate_text(&text, FULL_TEXT_LIMIT),
        };

        self.cache.set(key, CachedParse::Full(full.clone()));
        Ok(full)
    }

    fn extract_text(&self, content: &[u8], filename: &str) -> Result<String, ResumeError> {
        let text = clean_text(&self.extractor.extract(content, filename)?);
        if text.trim().is_empty() {
            return Err(ResumeError::NoText);
        }
        Ok(text)
    }
}

fn check_upload(content: &[u8], filename: &str) -> Result<(), ResumeError> {
    if content.is_empty() {
        return Err(ResumeError::Empty);
    }
    if filename.trim().is_empty() {
        return Err(ResumeError::MissingFilename);
    }
    Ok(())
}

pub fn content_fingerprint(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

fn cache_key(kind: &str, content: &[u8], filename: &str) -> String {
    format!("{kind}:{}:{filename}", content_fingerprint(content))
}

/// Control characters (other than whitespace) become spaces.
fn clean_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() && !c.is_whitespace() { ' ' } else { c })
        .collect()
}

fn truncate_text(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

pub fn extract_contact_metadata(text: &str) -> ContactMetadata {
    ContactMetadata {
        email: EMAIL_PATTERN.find(text).map(|m| m.as_str().to_string()),
        phone: PHONE_PATTERN.find(text).map(|m| m.as_str().trim().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::resume::extract::PlainTextExtractor;

    /// Plain-text extractor that counts how often it is asked to work.
    #[derive(Default)]
    struct CountingExtractor {
        calls: AtomicUsize,
    }

    impl TextExtractor for CountingExtractor {
        fn extract(&self, content: &[u8], filename: &str) -> Result<String, ResumeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            PlainTextExtractor.extract(content, filename)
        }
    }

    fn parser() -> (ResumeParser, Arc<CountingExtractor>) {
        let extractor = Arc::new(CountingExtractor::default());
        let cache = Arc::new(TtlCache::new(Duration::from_secs(900), 128));
        (ResumeParser::new(cache, extractor.clone()), extractor)
    }

    #[test]
    fn test_basic_parse_is_memoized() {
        let (p, extractor) = parser();
        let content = b"Sample Resume Skills: Python Java Email: test@example.com";

        let first = p.parse_basic(content, "resume.txt").unwrap();
        let second = p.parse_basic(content, "resume.txt").unwrap();

        assert_eq!(first, second);
        assert_eq!(first.skills, vec!["python", "java"]);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_full_parse_is_memoized() {
        let (p, extractor) = parser();
        let content = b"Full Resume Phone: +1 555-123-4567 Skills: Python";

        let first = p.parse_full(content, "resume.txt").unwrap();
        let second = p.parse_full(content, "resume.txt").unwrap();

        assert_eq!(first, second);
        assert_eq!(first.metadata.phone.as_deref(), Some("+1 555-123-4567"));
        assert_eq!(first.metadata.email, None);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_basic_and_full_use_separate_entries() {
        let (p, extractor) = parser();
        let content = b"Python developer";
        p.parse_basic(content, "cv.txt").unwrap();
        p.parse_full(content, "cv.txt").unwrap();
        assert_eq!(p.cache().len(), 2);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_filename_is_part_of_key() {
        let (p, extractor) = parser();
        p.parse_basic(b"Rust", "a.txt").unwrap();
        p.parse_basic(b"Rust", "b.txt").unwrap();
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failures_are_not_cached() {
        let (p, extractor) = parser();
        assert!(p.parse_basic(b"%PDF-1.7", "cv.pdf").is_err());
        assert!(p.parse_basic(b"%PDF-1.7", "cv.pdf").is_err());
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 2);
        assert!(p.cache().is_empty());
    }

    #[test]
    fn test_empty_and_blank_uploads() {
        let (p, _) = parser();
        assert_eq!(p.parse_basic(b"", "cv.txt"), Err(ResumeError::Empty));
        assert_eq!(p.parse_basic(b"x", " "), Err(ResumeError::MissingFilename));
        assert_eq!(p.parse_full(b"  \n\t ", "cv.txt"), Err(ResumeError::NoText));
    }

    #[test]
    fn test_full_text_is_truncated() {
        let (p, _) = parser();
        let content = "é".repeat(FULL_TEXT_LIMIT + 10);
        let full = p.parse_full(content.as_bytes(), "cv.txt").unwrap();
        assert_eq!(full.full_text.chars().count(), FULL_TEXT_LIMIT + 3);
        assert!(full.full_text.ends_with("..."));
    }

    #[test]
    fn test_short_text_is_not_truncated() {
        assert_eq!(truncate_text("abc", 5), "abc");
        assert_eq!(truncate_text("abcdef", 5), "abcde...");
    }

    #[test]
    fn test_contact_metadata() {
        let meta = extract_contact_metadata("Reach me at jane.doe@mail.example.org or (555) 123-4567");
        assert_eq!(meta.email.as_deref(), Some("jane.doe@mail.example.org"));
        assert_eq!(meta.phone.as_deref(), Some("(555) 123-4567"));
    }

    #[test]
    fn test_fingerprint_is_sha256_hex() {
        assert_eq!(
            content_fingerprint(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_control_characters_are_blanked() {
        assert_eq!(clean_text("a\u{0}b\nc"), "a b\nc");
    }
}
