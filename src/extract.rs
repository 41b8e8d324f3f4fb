//! Job description extraction.
//!
//! Finds the block of visible text most likely to be the job posting:
//! same-origin frames first, then structural selectors, then a brute-force
//! scan of generic containers for job-posting signal phrases.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::Serialize;
use tracing::debug;

use crate::normalize::{collapse_whitespace, normalize_text};
use crate::page::{body_text, is_visible, visible_text, Page, ReadyState};

/// Frame text longer than this wins immediately
pub const FRAME_MIN_CHARS: usize = 100;

/// Matched elements with less own text than this are skipped
pub const ELEMENT_MIN_CHARS: usize = 50;

/// Accumulated selector text must exceed this to be used
pub const BUFFER_MIN_CHARS: usize = 100;

/// Fallback containers must carry more text than this
pub const FALLBACK_MIN_CHARS: usize = 500;

/// Structural selectors, most specific first
const CONTENT_SELECTORS: &[&str] = &[
    // LinkedIn
    ".jobs-description-content__text",
    ".jobs-box__html-content",
    ".jobs-description__content",
    // Indeed
    "#jobDescriptionText",
    ".jobsearch-jobDescriptionText",
    // Seek
    "[data-automation=\"jobAdDetails\"]",
    "[data-automation=\"jobDescription\"]",
    // Generic class/id wildcards
    "[class*=\"description\"]",
    "[id*=\"description\"]",
    "[class*=\"job\"]",
    "[id*=\"job\"]",
    "[class*=\"posting\"]",
    "[id*=\"posting\"]",
    "[class*=\"vacancy\"]",
    // Content landmarks
    "[role=\"main\"]",
    "main",
    "article",
];

/// Phrases that strongly suggest a container holds a job posting
const JOB_SIGNAL_PHRASES: &[&str] = &[
    "responsibilities",
    "requirements",
    "qualifications",
    "about the role",
    "job description",
    "what you'll do",
    "what we offer",
];

static CONTENT_SELECTOR_LIST: Lazy<Vec<Selector>> = Lazy::new(|| {
    CONTENT_SELECTORS
        .iter()
        .map(|s| Selector::parse(s).expect("Invalid content selector"))
        .collect()
});

static FALLBACK_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div, section, article, main").expect("Invalid fallback selector")
});

/// Which strategy produced the extracted text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionSource {
    Frame,
    Selectors,
    Fallback,
    None,
}

/// Text pulled out of a page for one analysis pass
#[derive(Debug, Clone)]
pub struct ExtractedContent {
    /// Text as rendered, before lowercasing
    pub raw_text: String,
    /// Lowercased, whitespace-normalized text handed to the classifier
    pub normalized_text: String,
    /// Length of `normalized_text` in characters
    pub length: usize,
    pub source: ExtractionSource,
}

impl ExtractedContent {
    pub fn new(raw_text: String, source: ExtractionSource) -> Self {
        let normalized_text = normalize_text(&raw_text);
        let length = normalized_text.chars().count();
        Self {
            raw_text,
            normalized_text,
            length,
            source,
        }
    }

    /// No analyzable content was found
    pub fn empty() -> Self {
        Self::new(String::new(), ExtractionSource::None)
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Anything the analysis loop can pull job text from
pub trait ContentSource {
    fn ready_state(&self) -> ReadyState;
    fn extract(&self) -> ExtractedContent;
}

impl ContentSource for Page {
    fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    fn extract(&self) -> ExtractedContent {
        extract(self)
    }
}

/// Extract the most likely job description from a page.
///
/// Never fails: absence of content is an empty result.
pub fn extract(page: &Page) -> ExtractedContent {
    if let Some(text) = extract_from_frames(page) {
        return ExtractedContent::new(text, ExtractionSource::Frame);
    }

    let from_selectors = extract_from_selectors(&page.document);
    if char_len(&from_selectors) >= BUFFER_MIN_CHARS {
        return ExtractedContent::new(from_selectors, ExtractionSource::Selectors);
    }

    if let Some(text) = extract_fallback(&page.document) {
        return ExtractedContent::new(text, ExtractionSource::Fallback);
    }

    debug!("no analyzable content found");
    ExtractedContent::empty()
}

/// First same-origin frame with substantial visible text
fn extract_from_frames(page: &Page) -> Option<String> {
    for frame in &page.frames {
        match frame.document() {
            Ok(Some(doc)) => {
                let text = body_text(doc);
                if char_len(text.trim()) > FRAME_MIN_CHARS {
                    debug!(src = ?frame.src, "using frame content");
                    return Some(text);
                }
            }
            Ok(None) => {}
            Err(e) => debug!("skipping frame: {}", e),
        }
    }
    None
}

/// Accumulate text from visible elements matching the structural selectors,
/// then pick the largest block (or the whole buffer when no single block is
/// big enough). Returns an empty string when the buffer is too small.
fn extract_from_selectors(document: &Html) -> String {
    let mut seen = HashSet::new();
    let mut buffer = String::new();

    for selector in CONTENT_SELECTOR_LIST.iter() {
        for element in document.select(selector) {
            if !seen.insert(element.id()) {
                continue;
            }
            if !is_visible(element) {
                continue;
            }
            let text = collapse_whitespace(&visible_text(element));
            if char_len(&text) < ELEMENT_MIN_CHARS {
                continue;
            }
            buffer.push_str(&text);
            buffer.push('\n');
        }
    }

    if char_len(&buffer) <= BUFFER_MIN_CHARS {
        return String::new();
    }

    pick_block(&buffer)
}

/// Largest line of the buffer, or the whole buffer when none exceeds the threshold
fn pick_block(buffer: &str) -> String {
    let largest = buffer
        .lines()
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .max_by_key(|block| char_len(block));

    match largest {
        Some(block) if char_len(block) > BUFFER_MIN_CHARS => block.to_string(),
        _ => buffer.trim().to_string(),
    }
}

/// Brute-force scan: the first visible container with plenty of text and
/// at least one job-posting signal phrase
fn extract_fallback(document: &Html) -> Option<String> {
    document
        .select(&FALLBACK_SELECTOR)
        .filter(|el| is_visible(*el))
        .map(visible_text)
        .find(|text| char_len(text) > FALLBACK_MIN_CHARS && has_job_signal(text))
}

fn has_job_signal(text: &str) -> bool {
    let lower = text.to_lowercase();
    JOB_SIGNAL_PHRASES.iter().any(|p| lower.contains(p))
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG_DESCRIPTION: &str = "We are hiring a backend engineer to build our payments \
        platform. You will design services, review code, and mentor others. We offer \
        visa sponsorship and a relocation package for the right candidate.";

    #[test]
    fn test_extract_indeed_selector() {
        let html = format!(
            r#"<html><body><nav>Home | Jobs</nav>
            <div id="jobDescriptionText">{}</div></body></html>"#,
            LONG_DESCRIPTION
        );
        let page = Page::from_html(&html, None).unwrap();
        let content = extract(&page);
        assert_eq!(content.source, ExtractionSource::Selectors);
        assert!(content.normalized_text.contains("visa sponsorship"));
        assert!(!content.normalized_text.contains("home | jobs"));
    }

    #[test]
    fn test_extract_skips_hidden_elements() {
        let html = format!(
            r#"<html><body>
            <div class="job-description" style="display:none">{}</div>
            </body></html>"#,
            LONG_DESCRIPTION
        );
        let page = Page::from_html(&html, None).unwrap();
        let content = extract(&page);
        assert!(content.is_empty());
    }

    #[test]
    fn test_extract_prefers_frame() {
        let frame_body = format!("<p>{}</p>", LONG_DESCRIPTION.replace("backend", "frame"));
        let html = format!(
            r#"<html><body>
            <iframe srcdoc="{}"></iframe>
            <div id="jobDescriptionText">{}</div></body></html>"#,
            frame_body, LONG_DESCRIPTION
        );
        let page = Page::from_html(&html, None).unwrap();
        let content = extract(&page);
        assert_eq!(content.source, ExtractionSource::Frame);
        assert!(content.normalized_text.contains("frame engineer"));
    }

    #[test]
    fn test_cross_origin_frame_is_ignored() {
        let html = format!(
            r#"<html><body>
            <iframe src="https://other.example.org/posting"></iframe>
            <div id="jobDescriptionText">{}</div></body></html>"#,
            LONG_DESCRIPTION
        );
        let mut page = Page::from_html(&html, Some("https://jobs.example.com/")).unwrap();
        page.load_frame("https://other.example.org/posting", "<p>Should never be read</p>");
        let content = extract(&page);
        assert_eq!(content.source, ExtractionSource::Selectors);
    }

    #[test]
    fn test_fallback_requires_signal_phrase() {
        let filler = "Lorem ipsum dolor sit amet consectetur. ".repeat(20);
        let with_signal = format!(
            r#"<html><body><section><p>Responsibilities</p><p>{}</p></section></body></html>"#,
            filler
        );
        let page = Page::from_html(&with_signal, None).unwrap();
        let content = extract(&page);
        assert_eq!(content.source, ExtractionSource::Fallback);
        assert!(content.normalized_text.starts_with("responsibilities"));

        let without_signal = format!(
            r#"<html><body><section><p>{}</p></section></body></html>"#,
            filler
        );
        let page = Page::from_html(&without_signal, None).unwrap();
        assert!(extract(&page).is_empty());
    }

    #[test]
    fn test_pick_block_largest_or_buffer() {
        let big = "x".repeat(150);
        let buffer = format!("short line\n{}\nanother\n", big);
        assert_eq!(pick_block(&buffer), big);

        let small = "a".repeat(60);
        let buffer = format!("{}\n{}\n", small, small);
        assert_eq!(pick_block(&buffer), buffer.trim());
    }

    #[test]
    fn test_duplicate_matches_counted_once() {
        // Matches both `#jobDescriptionText` and `[id*="description"]`
        let html = format!(
            r#"<html><body><div id="jobDescriptionText">{}</div></body></html>"#,
            LONG_DESCRIPTION
        );
        let page = Page::from_html(&html, None).unwrap();
        let content = extract(&page);
        assert_eq!(content.normalized_text.matches("payments platform").count(), 1);
    }
}
