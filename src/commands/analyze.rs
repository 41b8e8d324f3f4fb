//! Analyze command: load a page, run the pipeline once, print the badge

use colored::Colorize;
use std::path::Path;
use std::time::Instant;

use jobscan::agent::OpenAiClassifier;
use jobscan::badge::{BadgeTone, RecordingPresenter};
use jobscan::config::{EffectiveSettings, InjectedConfig, Settings};
use jobscan::controller::{EscalationOutcome, PageController, Phase};
use jobscan::error::{Result, ScanError};
use jobscan::fetch::{fetch_page, is_supported_job_site};
use jobscan::message::Request;
use jobscan::page::Page;

pub fn cmd_analyze(
    target: &str,
    frames: Vec<String>,
    json: bool,
    html: bool,
    no_ai: bool,
) -> Result<()> {
    let is_url = target.starts_with("http://") || target.starts_with("https://");
    let mut page = if is_url {
        fetch_page(target)?
    } else {
        Page::from_file(Path::new(target))?
    };

    for arg in frames {
        let (src, file) = arg.split_once('=').ok_or_else(|| {
            ScanError::ConfigError(format!("Invalid --frame '{}'. Use SRC=FILE", arg))
        })?;
        let html = std::fs::read_to_string(file)?;
        page.load_frame(src, &html);
    }

    let stored = Settings::load()?;
    let mut settings = EffectiveSettings::resolve(stored.as_ref(), &InjectedConfig::from_env());
    if no_ai {
        settings.enable_external_classification = false;
    }

    let mut controller =
        PageController::new(OpenAiClassifier::default(), RecordingPresenter::default(), settings);

    // A snapshot never changes, so retries run back to back at their
    // scheduled instants
    controller.attach(&page, Instant::now());
    while let Phase::InitialAnalysisInFlight { next_attempt_at, .. } = controller.phase() {
        controller.tick(&page, next_attempt_at);
    }

    if let Some(EscalationOutcome::FellBack) = controller.run_pending_escalation() {
        if !json && !html {
            eprintln!("  AI analysis failed (using keyword results)");
        }
    }

    if json {
        let response = controller.handle_message(Request::GetAnalysis)?;
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    if html {
        if let Some(view) = &controller.presenter().last {
            println!("{}", view.to_html());
        }
        return Ok(());
    }

    println!();
    match &controller.presenter().last {
        Some(view) => {
            let line = match view.tone {
                BadgeTone::Positive => view.text.green().bold(),
                BadgeTone::Negative => view.text.red().bold(),
                BadgeTone::Neutral => view.text.dimmed(),
            };
            println!("  {}", line);
            if !view.keywords.is_empty() {
                println!("  {} {}", "Keywords:".dimmed(), view.keywords.join(", "));
            }
        }
        None => println!("  {}", "Nothing found (badge hidden)".dimmed()),
    }

    if let Some(result) = controller.current_result() {
        println!(
            "  {} {} chars ({})",
            "Analyzed:".dimmed(),
            result.content_length,
            match result.source {
                jobscan::analysis::ResultSource::Keywords => "keywords",
                jobscan::analysis::ResultSource::External => "AI",
            }
        );
    }

    if is_url && !is_supported_job_site(target) {
        println!(
            "\n  {} not a known job board; results rely on generic extraction",
            "Note:".yellow()
        );
    }
    println!();

    Ok(())
}
