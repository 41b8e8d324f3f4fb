//! Keyword classification of normalized job text.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::analysis::{
    ClassificationResult, EmploymentCategory, EmploymentTypeResult, RelocationCategory,
    RelocationResult, ResultSource,
};
use crate::taxonomy::{matching_phrases, EMPLOYMENT, RELOCATION};

/// Words that commonly trail a location and are not part of it
const TRAILING_QUALIFIERS: &[&str] = &["only", "required", "needed"];

// Location capture and where it ends. Lazy, so the first terminator wins.
const LOCATION: &str = r"(?P<loc>\p{L}[\p{L} '\-]{0,48}?)";
const LOCATION_END: &str =
    r"(?:\s+(?:and|with|who|to|for|as|because|while)\b|\s*[.,;:!?()\n]|\s*$)";

/// Region restriction patterns, tried in order
static REGION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\bmust (?:reside|live|be based|be residing|be living) in (?:the )?",
        r"\b(?:limited|restricted) to (?:(?:candidates|applicants|residents|people|those) (?:who are )?(?:based |located |residing |living )?(?:in|of|from|within) |residents of )?(?:the )?",
        r"\b(?:only|exclusively) (?:open to |accepting |considering )?(?:candidates|applicants|residents) (?:who are )?(?:based |located |residing |living )?(?:in|from|of) (?:the )?",
        r"\bapplicants (?:[a-z]+ ){0,4}?(?:in|from) (?:the )?",
    ]
    .iter()
    .map(|prefix| {
        Regex::new(&format!("(?i){}{}{}", prefix, LOCATION, LOCATION_END))
            .expect("Invalid region pattern")
    })
    .collect()
});

/// Classify relocation support.
///
/// Negative phrases and hard denials always win over positive phrases.
pub fn classify_relocation(text: &str) -> RelocationResult {
    let mut denials = matching_phrases(&RELOCATION.negative, text);
    let lower = text.to_lowercase();
    denials.extend(
        RELOCATION
            .hard_denials
            .iter()
            .filter(|d| lower.contains(*d))
            .map(|d| d.to_string()),
    );

    if !denials.is_empty() {
        debug!(?denials, "relocation explicitly denied");
        return RelocationResult {
            found: false,
            category: RelocationCategory::ExplicitlyNotAvailable,
            matched_phrases: denials,
        };
    }

    let matched = matching_phrases(&RELOCATION.positive, text);
    if matched.is_empty() {
        return RelocationResult::not_mentioned();
    }

    let mentions = |needles: &[&str]| {
        matched
            .iter()
            .any(|phrase| needles.iter().any(|n| phrase.contains(n)))
    };

    let category = if mentions(&["visa", "immigration"]) {
        RelocationCategory::VisaSponsorship
    } else if mentions(&["package", "allowance"]) {
        RelocationCategory::FinancialAssistance
    } else {
        RelocationCategory::Available
    };

    RelocationResult {
        found: true,
        category,
        matched_phrases: matched,
    }
}

/// Classify employment type. Categories are checked in fixed order and the
/// first with any match wins; later categories are never combined in.
pub fn classify_employment_type(text: &str) -> EmploymentTypeResult {
    let denials = matching_phrases(&EMPLOYMENT.negative, text);
    if !denials.is_empty() {
        return EmploymentTypeResult {
            found: false,
            category: EmploymentCategory::ExplicitlyNotAvailable,
            matched_phrases: denials,
        };
    }

    for (category, patterns) in &EMPLOYMENT.categories {
        let matched = matching_phrases(patterns, text);
        if !matched.is_empty() {
            return EmploymentTypeResult {
                found: true,
                category: *category,
                matched_phrases: matched,
            };
        }
    }

    EmploymentTypeResult::unknown()
}

/// Find a stated region restriction such as "must reside in Germany".
///
/// Returns the location with trailing qualifiers stripped and the first
/// letter capitalized.
pub fn extract_region_restriction(text: &str) -> Option<String> {
    REGION_PATTERNS.iter().find_map(|re| {
        let caps = re.captures(text)?;
        let location = strip_qualifiers(caps.name("loc")?.as_str());
        if location.is_empty() {
            None
        } else {
            Some(capitalize_first(&location))
        }
    })
}

fn strip_qualifiers(location: &str) -> String {
    let mut words: Vec<&str> = location.split_whitespace().collect();
    while words
        .last()
        .is_some_and(|w| TRAILING_QUALIFIERS.iter().any(|q| w.eq_ignore_ascii_case(q)))
    {
        words.pop();
    }
    words.join(" ")
}

pub(crate) fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Run every keyword rule over normalized text
pub fn classify(text: &str) -> ClassificationResult {
    let relocation = classify_relocation(text);
    let employment_type = classify_employment_type(text);
    let region_restriction = extract_region_restriction(text);

    let mut all_matched_keywords: Vec<String> = Vec::new();
    for phrase in relocation
        .matched_phrases
        .iter()
        .chain(employment_type.matched_phrases.iter())
    {
        if !all_matched_keywords.contains(phrase) {
            all_matched_keywords.push(phrase.clone());
        }
    }

    ClassificationResult {
        relocation,
        employment_type,
        region_restriction,
        all_matched_keywords,
        content_length: text.chars().count(),
        source: ResultSource::Keywords,
    }
}
