use std::fmt;

use serde::{Deserialize, Serialize};

/// Relocation support found in a posting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelocationCategory {
    Available,
    #[serde(rename = "Visa Sponsorship")]
    VisaSponsorship,
    #[serde(rename = "Financial Assistance")]
    FinancialAssistance,
    #[serde(rename = "Not Mentioned")]
    NotMentioned,
    #[serde(rename = "Explicitly Not Available")]
    ExplicitlyNotAvailable,
}

impl fmt::Display for RelocationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelocationCategory::Available => write!(f, "Available"),
            RelocationCategory::VisaSponsorship => write!(f, "Visa Sponsorship"),
            RelocationCategory::FinancialAssistance => write!(f, "Financial Assistance"),
            RelocationCategory::NotMentioned => write!(f, "Not Mentioned"),
            RelocationCategory::ExplicitlyNotAvailable => write!(f, "Explicitly Not Available"),
        }
    }
}

/// Employment type of a posting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmploymentCategory {
    Remote,
    Hybrid,
    Onsite,
    Contract,
    Permanent,
    Unknown,
    #[serde(rename = "Explicitly Not Available")]
    ExplicitlyNotAvailable,
}

impl EmploymentCategory {
    /// Parse a free-form job type label such as "on-site" or "Full-time"
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        match label.as_str() {
            "remote" | "fully remote" | "work from home" => EmploymentCategory::Remote,
            "hybrid" => EmploymentCategory::Hybrid,
            "onsite" | "on-site" | "on site" | "office" | "in office" | "in-office" => {
                EmploymentCategory::Onsite
            }
            "contract" | "contractor" | "freelance" | "temporary" | "fixed term"
            | "fixed-term" => EmploymentCategory::Contract,
            "permanent" | "full-time" | "full time" | "fulltime" => EmploymentCategory::Permanent,
            _ => EmploymentCategory::Unknown,
        }
    }
}

impl fmt::Display for EmploymentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmploymentCategory::Remote => write!(f, "Remote"),
            EmploymentCategory::Hybrid => write!(f, "Hybrid"),
            EmploymentCategory::Onsite => write!(f, "Onsite"),
            EmploymentCategory::Contract => write!(f, "Contract"),
            EmploymentCategory::Permanent => write!(f, "Permanent"),
            EmploymentCategory::Unknown => write!(f, "Unknown"),
            EmploymentCategory::ExplicitlyNotAvailable => write!(f, "Explicitly Not Available"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelocationResult {
    pub found: bool,
    pub category: RelocationCategory,
    /// Taxonomy phrases that triggered, in taxonomy order
    pub matched_phrases: Vec<String>,
}

impl RelocationResult {
    pub fn not_mentioned() -> Self {
        Self {
            found: false,
            category: RelocationCategory::NotMentioned,
            matched_phrases: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmploymentTypeResult {
    pub found: bool,
    pub category: EmploymentCategory,
    pub matched_phrases: Vec<String>,
}

impl EmploymentTypeResult {
    pub fn unknown() -> Self {
        Self {
            found: false,
            category: EmploymentCategory::Unknown,
            matched_phrases: Vec::new(),
        }
    }
}

/// Which path produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    Keywords,
    External,
}

/// Outcome of one analysis pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub relocation: RelocationResult,
    pub employment_type: EmploymentTypeResult,
    pub region_restriction: Option<String>,
    pub all_matched_keywords: Vec<String>,
    pub content_length: usize,
    pub source: ResultSource,
}

impl ClassificationResult {
    /// Neither taxonomy produced a positive or negative match.
    ///
    /// This is the only state that escalates to the external classifier.
    pub fn is_keyword_inconclusive(&self) -> bool {
        !self.relocation.found
            && !self.employment_type.found
            && self.relocation.category == RelocationCategory::NotMentioned
    }

    /// Anything worth showing on the badge
    pub fn has_findings(&self) -> bool {
        self.relocation.found
            || self.employment_type.found
            || self.relocation.category == RelocationCategory::ExplicitlyNotAvailable
    }
}
