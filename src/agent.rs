//! External classifier: escalates keyword-inconclusive pages to a hosted
//! chat-completion model and adapts its verdict to a `ClassificationResult`.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::analysis::{
    ClassificationResult, EmploymentCategory, EmploymentTypeResult, RelocationCategory,
    RelocationResult, ResultSource,
};
use crate::classify::capitalize_first;
use crate::error::{Result, ScanError};
use crate::normalize::truncate_chars;

/// Only this many characters of job text are sent
pub const MAX_INPUT_CHARS: usize = 2000;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_MAX_TOKENS: u32 = 200;
const DEFAULT_TIMEOUT_SECS: u64 = 15;

const CLASSIFY_PROMPT: &str = r#"Analyze this job posting for relocation support and employment type.
Respond ONLY with a JSON object, no other text:
{
  "relocation": true/false/null,
  "relocation_details": "Visa Sponsorship | Financial Assistance | Available | short description, or empty",
  "remote": true/false/null,
  "job_type": "remote | hybrid | onsite | contract | permanent | unknown",
  "region_restriction": "where candidates must be located, or empty"
}

Job posting:
{{job_text}}"#;

/// Anything that can classify job text remotely
pub trait ExternalClassifier {
    fn classify(&self, text: &str, credential: &str) -> Result<ClassificationResult>;
}

/// Connection options for the chat-completion endpoint
#[derive(Debug, Clone)]
pub struct ClassifierOptions {
    pub endpoint: String,
    pub model: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// OpenAI-compatible chat-completion classifier
pub struct OpenAiClassifier {
    agent: ureq::Agent,
    options: ClassifierOptions,
}

impl OpenAiClassifier {
    pub fn new(options: ClassifierOptions) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(options.timeout))
            .build()
            .into();
        Self { agent, options }
    }

    fn map_transport_error(&self, err: ureq::Error) -> ScanError {
        match err {
            ureq::Error::StatusCode(code) => {
                ScanError::ExternalServiceError(format!("HTTP {}", code))
            }
            ureq::Error::Timeout(_) => ScanError::TimeoutError(self.options.timeout.as_secs()),
            ureq::Error::Io(ref io) if io.kind() == std::io::ErrorKind::TimedOut => {
                ScanError::TimeoutError(self.options.timeout.as_secs())
            }
            other => ScanError::ExternalServiceError(other.to_string()),
        }
    }
}

impl Default for OpenAiClassifier {
    fn default() -> Self {
        Self::new(ClassifierOptions::default())
    }
}

impl ExternalClassifier for OpenAiClassifier {
    fn classify(&self, text: &str, credential: &str) -> Result<ClassificationResult> {
        let body = build_request(text, &self.options);
        debug!(model = %self.options.model, "calling external classifier");

        let response = self
            .agent
            .post(&self.options.endpoint)
            .header("Authorization", format!("Bearer {}", credential))
            .header("Content-Type", "application/json")
            .send_json(&body)
            .map_err(|e| self.map_transport_error(e))?;

        let raw = response
            .into_body()
            .read_to_string()
            .map_err(|e| self.map_transport_error(e))?;

        let content = completion_content(&raw)?;
        let verdict = parse_verdict(&content)?;
        Ok(verdict.into_result(text.chars().count()))
    }
}

/// Request body for one classification call
pub fn build_request(text: &str, options: &ClassifierOptions) -> serde_json::Value {
    let prompt = CLASSIFY_PROMPT.replace("{{job_text}}", truncate_chars(text, MAX_INPUT_CHARS));
    serde_json::json!({
        "model": options.model,
        "messages": [
            { "role": "user", "content": prompt }
        ],
        "max_tokens": options.max_tokens,
        "temperature": 0
    })
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

/// Pull the assistant message out of a chat-completion response body
fn completion_content(raw: &str) -> Result<String> {
    let response: ChatResponse = serde_json::from_str(raw)
        .map_err(|e| ScanError::ResponseParseError(format!("unexpected response shape: {}", e)))?;
    response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| ScanError::ResponseParseError("response has no choices".into()))
}

/// Verdict returned by the model
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExternalVerdict {
    #[serde(default)]
    pub relocation: Option<bool>,
    #[serde(default)]
    pub relocation_details: Option<String>,
    #[serde(default)]
    pub remote: Option<bool>,
    #[serde(default)]
    pub job_type: Option<String>,
    #[serde(default)]
    pub region_restriction: Option<String>,
}

/// Parse the first JSON object found in the model's reply
pub fn parse_verdict(content: &str) -> Result<ExternalVerdict> {
    let json = first_json_object(content)
        .ok_or_else(|| ScanError::ResponseParseError("no JSON object in response".into()))?;
    serde_json::from_str(json).map_err(|e| ScanError::ResponseParseError(e.to_string()))
}

/// Find the first balanced top-level `{...}` in `s`, skipping braces in strings
pub fn first_json_object(s: &str) -> Option<&str> {
    let start = s.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in s[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&s[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Placeholder answers models give instead of an empty string
fn is_blank_answer(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "" | "none" | "null" | "n/a" | "na" | "no" | "unknown" | "not mentioned"
    )
}

impl ExternalVerdict {
    /// Adapt the verdict to the keyword result shape
    pub fn into_result(self, content_length: usize) -> ClassificationResult {
        let found = self.relocation == Some(true);
        let details = self
            .relocation_details
            .as_deref()
            .map(str::trim)
            .filter(|d| !is_blank_answer(d));

        let category = match details {
            Some(d) => relocation_category_from_details(d, self.relocation),
            None if found => RelocationCategory::Available,
            None => RelocationCategory::NotMentioned,
        };

        let mut job_category = self
            .job_type
            .as_deref()
            .map(EmploymentCategory::from_label)
            .unwrap_or(EmploymentCategory::Unknown);
        if job_category == EmploymentCategory::Unknown && self.remote == Some(true) {
            job_category = EmploymentCategory::Remote;
        }

        let region_restriction = self
            .region_restriction
            .as_deref()
            .map(str::trim)
            .filter(|r| !is_blank_answer(r))
            .map(capitalize_first);

        ClassificationResult {
            relocation: RelocationResult {
                found,
                category,
                matched_phrases: Vec::new(),
            },
            employment_type: EmploymentTypeResult {
                found: job_category != EmploymentCategory::Unknown,
                category: job_category,
                matched_phrases: Vec::new(),
            },
            region_restriction,
            all_matched_keywords: Vec::new(),
            content_length,
            source: ResultSource::External,
        }
    }
}

fn relocation_category_from_details(details: &str, relocation: Option<bool>) -> RelocationCategory {
    let lower = details.to_lowercase();
    match relocation {
        Some(true) => {
            if lower.contains("visa") || lower.contains("immigration") || lower.contains("sponsor") {
                RelocationCategory::VisaSponsorship
            } else if lower.contains("package")
                || lower.contains("allowance")
                || lower.contains("financial")
                || lower.contains("stipend")
            {
                RelocationCategory::FinancialAssistance
            } else {
                RelocationCategory::Available
            }
        }
        Some(false) if lower.contains("not") || lower.starts_with("no ") => {
            RelocationCategory::ExplicitlyNotAvailable
        }
        _ => RelocationCategory::NotMentioned,
    }
}
