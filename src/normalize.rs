use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

// Horizontal whitespace only; line breaks separate blocks and are kept
static INLINE_WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^\S\n]+").expect("Invalid whitespace regex pattern")
});

/// Normalize extracted text for classification.
///
/// Collapses runs of spaces and tabs, trims every line, drops blank lines
/// and lowercases the result. Line structure survives so that region
/// patterns can stop at line ends.
pub fn normalize_text(content: &str) -> String {
    content
        .lines()
        .map(|line| INLINE_WHITESPACE_RE.replace_all(line, " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .to_lowercase()
}

/// Collapse all whitespace (including line breaks) into single spaces
pub fn collapse_whitespace(content: &str) -> String {
    content.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compute SHA-256 hash of content
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
}

/// Take at most `max_chars` characters (not bytes) from the start of `content`
pub fn truncate_chars(content: &str, max_chars: usize) -> &str {
    match content.char_indices().nth(max_chars) {
        Some((idx, _)) => &content[..idx],
        None => content,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text_keeps_lines() {
        let input = "  Senior   Engineer \n\n\tVisa Sponsorship\tAvailable  ";
        assert_eq!(normalize_text(input), "senior engineer\nvisa sponsorship available");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("Hello   World\n\n\nTest"), "Hello World Test");
    }

    #[test]
    fn test_hash_content() {
        let hash1 = hash_content("Hello World");
        let hash2 = hash_content("Hello World");
        let hash3 = hash_content("Hello World!");

        assert_eq!(hash1, hash2);
        assert_ne!(hash1, hash3);
        assert_eq!(hash1.len(), 64); // SHA-256 produces 64 hex chars
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("héllo wörld", 4), "héll");
        assert_eq!(truncate_chars("short", 100), "short");
    }
}
