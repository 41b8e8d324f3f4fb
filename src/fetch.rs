use std::time::Duration;

use once_cell::sync::Lazy;
use ureq::ResponseExt;

use crate::error::Result;
use crate::page::Page;

/// Default HTTP request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Job boards with dedicated extraction selectors
const SUPPORTED_SITES: &[&str] = &[
    "linkedin.com/jobs",
    "indeed.com/viewjob",
    "seek.com.au/job",
    "seek.co.nz/job",
];

/// Shared HTTP agent for connection pooling
static HTTP_AGENT: Lazy<ureq::Agent> = Lazy::new(|| {
    ureq::Agent::config_builder()
        .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)))
        .build()
        .into()
});

/// Fetch a page over HTTP and parse it
pub fn fetch_page(url: &str) -> Result<Page> {
    let response = HTTP_AGENT
        .get(url)
        .header(
            "User-Agent",
            "Mozilla/5.0 (compatible; jobscan/0.1)",
        )
        .call()?;
    let final_url = response.get_uri().to_string();
    let html = response.into_body().read_to_string()?;

    Page::from_html(&html, Some(&final_url))
}

/// Whether the URL points at a job board with dedicated selectors
pub fn is_supported_job_site(url: &str) -> bool {
    SUPPORTED_SITES.iter().any(|site| url.contains(site))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_sites() {
        assert!(is_supported_job_site("https://www.linkedin.com/jobs/view/123"));
        assert!(is_supported_job_site("https://au.indeed.com/viewjob?jk=abc"));
        assert!(is_supported_job_site("https://www.seek.co.nz/job/999"));
        assert!(!is_supported_job_site("https://example.com/careers"));
    }
}
