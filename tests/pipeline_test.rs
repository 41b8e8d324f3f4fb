//! End-to-end tests: HTML snapshot -> extraction -> classification.

use std::time::Instant;

use jobscan::agent::OpenAiClassifier;
use jobscan::analysis::{EmploymentCategory, RelocationCategory, ResultSource};
use jobscan::badge::RecordingPresenter;
use jobscan::classify::classify;
use jobscan::config::EffectiveSettings;
use jobscan::controller::{AnalysisOutcome, PageController};
use jobscan::extract::{extract, ExtractionSource};
use jobscan::page::Page;

const POSTING: &str = "About the role: we are hiring a senior platform engineer to \
    own our deployment tooling. Responsibilities include designing build pipelines and \
    mentoring engineers. This is a hybrid role with two days in the Berlin office. \
    We offer a relocation allowance for candidates moving to Germany.";

fn analyze_html(html: &str, url: Option<&str>) -> jobscan::analysis::ClassificationResult {
    let page = Page::from_html(html, url).unwrap();
    let content = extract(&page);
    classify(&content.normalized_text)
}

#[test]
fn test_linkedin_style_page() {
    let html = format!(
        r#"<html><body>
        <header>Sign in | Join now | Remote jobs near you</header>
        <div class="jobs-description-content__text"><p>{}</p></div>
        </body></html>"#,
        POSTING
    );
    let result = analyze_html(&html, Some("https://www.linkedin.com/jobs/view/123"));

    assert!(result.relocation.found);
    assert_eq!(result.relocation.category, RelocationCategory::FinancialAssistance);
    // The header's "Remote" is outside the description
    assert_eq!(result.employment_type.category, EmploymentCategory::Hybrid);
    assert_eq!(result.source, ResultSource::Keywords);
}

#[test]
fn test_hidden_text_is_ignored() {
    let html = format!(
        r#"<html><body>
        <div id="jobDescriptionText">
            <p>{}</p>
            <p style="display: none">We do not sponsor visas.</p>
            <p hidden>No relocation.</p>
        </div>
        <script>var remote = true;</script>
        </body></html>"#,
        POSTING
    );
    let result = analyze_html(&html, None);
    assert!(result.relocation.found);
    assert_ne!(result.relocation.category, RelocationCategory::ExplicitlyNotAvailable);
}

#[test]
fn test_same_origin_frame_wins() {
    let frame_doc = format!("<html><body><article>{}</article></body></html>", POSTING)
        .replace('"', "&quot;");
    let html = format!(
        r#"<html><body>
        <main>Company overview and navigation links for the careers portal, nothing about the role itself here at all.</main>
        <iframe srcdoc="{}"></iframe>
        </body></html>"#,
        frame_doc
    );
    let page = Page::from_html(&html, Some("https://careers.example.com/jobs/1")).unwrap();
    let content = extract(&page);
    assert_eq!(content.source, ExtractionSource::Frame);
    assert!(content.normalized_text.contains("relocation allowance"));
}

#[test]
fn test_cross_origin_frame_is_skipped() {
    let html = format!(
        r#"<html><body>
        <iframe src="https://ads.other.net/frame"></iframe>
        <section class="job-posting">{}</section>
        </body></html>"#,
        POSTING
    );
    let mut page = Page::from_html(&html, Some("https://careers.example.com/jobs/1")).unwrap();
    page.load_frame(
        "https://ads.other.net/frame",
        "<html><body>Fully remote contract role with visa sponsorship, apply today for this amazing opportunity right now</body></html>",
    );

    let content = extract(&page);
    assert_eq!(content.source, ExtractionSource::Selectors);
    assert!(!content.normalized_text.contains("apply today"));
}

#[test]
fn test_fallback_scan_finds_posting() {
    let requirements = "Requirements: five years of Rust experience, familiarity with \
        distributed systems, and strong written communication. ";
    let body = format!("{}{}", POSTING, requirements.repeat(4));
    let html = format!(
        r#"<html><body><div><span>{}</span></div></body></html>"#,
        body
    );
    let page = Page::from_html(&html, None).unwrap();
    let content = extract(&page);
    assert_eq!(content.source, ExtractionSource::Fallback);

    let result = classify(&content.normalized_text);
    assert_eq!(result.relocation.category, RelocationCategory::FinancialAssistance);
}

#[test]
fn test_page_without_posting_is_empty() {
    let html = "<html><body><nav>Home</nav><p>Welcome!</p></body></html>";
    let page = Page::from_html(html, None).unwrap();
    let content = extract(&page);
    assert!(content.is_empty());
    assert_eq!(content.source, ExtractionSource::None);
}

#[test]
fn test_region_restriction_from_page() {
    let html = format!(
        r#"<html><body><div class="job-description"><p>{} Applicants must be based in the United Kingdom.</p></div></body></html>"#,
        POSTING
    );
    let result = analyze_html(&html, None);
    assert_eq!(result.region_restriction.as_deref(), Some("United kingdom"));
}

#[test]
fn test_controller_over_real_page() {
    let html = format!(
        r#"<html><body><div id="jobDescriptionText">{}</div></body></html>"#,
        POSTING
    );
    let page = Page::from_html(&html, None).unwrap();
    let settings = EffectiveSettings {
        api_key: None,
        enable_external_classification: false,
        auto_hide: false,
        show_always: true,
    };
    let mut controller = PageController::new(
        OpenAiClassifier::default(),
        RecordingPresenter::default(),
        settings,
    );

    let outcome = controller.attach(&page, Instant::now()).unwrap();
    assert!(matches!(outcome, AnalysisOutcome::Classified(_)));

    let badge = controller.presenter().last.as_ref().unwrap();
    assert!(badge.text.contains("Relocation: Financial Assistance"));
    assert!(badge.text.contains("Hybrid"));
    assert!(badge.fade_after.is_none());
    assert!(badge.to_html().contains("job-analyzer-indicator"));
}
