//! Fixed keyword taxonomies for relocation support and employment type.
//!
//! Taxonomies are built once and never change. All matching is
//! case-insensitive and anchored on word boundaries.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::analysis::EmploymentCategory;

/// How a taxonomy entry is matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// A single bare token that must stand alone ("relocate" never matches
    /// "relocated" or "relocating")
    Word,
    /// A multi-word phrase; any whitespace run may separate its words
    Phrase,
}

/// A compiled taxonomy entry. `phrase` is the canonical text reported as
/// evidence when it matches.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub phrase: &'static str,
    pub kind: PatternKind,
    regex: Regex,
}

impl Pattern {
    pub fn word(phrase: &'static str) -> Self {
        let body = regex::escape(phrase);
        Self::compile(phrase, PatternKind::Word, &body)
    }

    pub fn phrase(phrase: &'static str) -> Self {
        let body = phrase
            .split_whitespace()
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(r"\s+");
        Self::compile(phrase, PatternKind::Phrase, &body)
    }

    fn compile(phrase: &'static str, kind: PatternKind, body: &str) -> Self {
        let starts_word = phrase.chars().next().is_some_and(char::is_alphanumeric);
        let ends_word = phrase.chars().last().is_some_and(char::is_alphanumeric);
        let pattern = format!(
            r"(?i){}{}{}",
            if starts_word { r"\b" } else { "" },
            body,
            if ends_word { r"\b" } else { "" },
        );
        let regex = Regex::new(&pattern).expect("Invalid taxonomy pattern");
        Self { phrase, kind, regex }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

/// Build patterns from phrases: single tokens become `Word`s, everything
/// else a `Phrase`
fn patterns(phrases: &[&'static str]) -> Vec<Pattern> {
    phrases
        .iter()
        .map(|p| {
            if p.contains(char::is_whitespace) {
                Pattern::phrase(p)
            } else {
                Pattern::word(p)
            }
        })
        .collect()
}

/// Canonical phrases of every pattern that matches, in taxonomy order
pub fn matching_phrases(patterns: &[Pattern], text: &str) -> Vec<String> {
    patterns
        .iter()
        .filter(|p| p.is_match(text))
        .map(|p| p.phrase.to_string())
        .collect()
}

pub struct RelocationTaxonomy {
    pub positive: Vec<Pattern>,
    pub negative: Vec<Pattern>,
    /// Plain substrings that deny relocation outright
    pub hard_denials: &'static [&'static str],
}

pub struct EmploymentTaxonomy {
    /// Categories in tie-break order; the first category that matches wins
    pub categories: Vec<(EmploymentCategory, Vec<Pattern>)>,
    pub negative: Vec<Pattern>,
}

pub static RELOCATION: Lazy<RelocationTaxonomy> = Lazy::new(|| RelocationTaxonomy {
    positive: patterns(&[
        "relocation assistance",
        "relocation package",
        "relocation support",
        "relocation allowance",
        "moving allowance",
        "moving expenses",
        "relocation stipend",
        "visa sponsorship",
        "visa support",
        "work permit",
        "immigration support",
        "relocate",
        "willing to relocate",
        "relocation available",
        "moving costs covered",
        "relocation bonus",
    ]),
    negative: patterns(&[
        "no relocation",
        "relocation is not available",
        "relocation not available",
        "relocation is not provided",
        "relocation not provided",
        "not offer relocation",
        "not provide relocation",
        "unable to offer relocation",
        "no visa sponsorship",
        "unable to sponsor",
        "cannot sponsor",
        "can't sponsor",
        "will not sponsor",
        "won't sponsor",
        "not able to sponsor",
        "does not sponsor",
        "do not sponsor",
        "without sponsorship",
        "sponsorship is not available",
    ]),
    hard_denials: &["must be located", "visa sponsorship is not available"],
});

pub static EMPLOYMENT: Lazy<EmploymentTaxonomy> = Lazy::new(|| EmploymentTaxonomy {
    categories: vec![
        (
            EmploymentCategory::Remote,
            patterns(&["remote", "work from home", "wfh", "telecommute", "fully distributed"]),
        ),
        (
            EmploymentCategory::Hybrid,
            patterns(&["hybrid", "flexible work", "part remote", "mixed location"]),
        ),
        (
            EmploymentCategory::Onsite,
            patterns(&["on-site", "onsite", "office based", "office-based", "in office", "in-office"]),
        ),
        (
            EmploymentCategory::Contract,
            patterns(&["contract", "contractor", "freelance", "temporary", "fixed term", "fixed-term"]),
        ),
        (
            EmploymentCategory::Permanent,
            patterns(&["permanent", "full-time", "full time", "perm", "indefinite"]),
        ),
    ],
    negative: patterns(&[
        "not remote",
        "no remote",
        "non-remote",
        "not a remote",
        "not open to remote",
        "remote work is not available",
        "remote is not available",
        "remote not available",
    ]),
});
