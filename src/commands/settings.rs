//! Settings commands: show, set

use colored::Colorize;

use jobscan::config::{InjectedConfig, Settings};
use jobscan::error::Result;

/// Mask an API key for display, keeping the last four characters
fn mask_key(key: &str) -> String {
    if key.is_empty() {
        return String::new();
    }
    let tail: String = key.chars().rev().take(4).collect::<Vec<_>>().into_iter().rev().collect();
    format!("sk-****{}", tail)
}

pub fn cmd_settings_show(json: bool) -> Result<()> {
    let stored = Settings::load()?;
    let mut settings = stored.clone().unwrap_or_default();
    settings.api_key = mask_key(&settings.api_key);

    if json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    let injected = InjectedConfig::from_env();
    let yes_no = |b: bool| if b { "yes".green() } else { "no".red() };

    println!("\nSettings ({})\n", Settings::settings_path()?.display());
    if stored.is_none() {
        println!("  {}", "(nothing saved yet, showing defaults)".dimmed());
    }
    println!(
        "  API key:      {}",
        if settings.api_key.is_empty() {
            "not set".dimmed()
        } else {
            settings.api_key.normal()
        }
    );
    println!("  AI analysis:  {}", yes_no(settings.enable_ai));
    println!("  Auto-hide:    {}", yes_no(settings.auto_hide));
    println!("  Show always:  {}", yes_no(settings.show_always));
    if !injected.openai_api_key.is_empty() {
        println!("  {}", "Build-time API key available as fallback".dimmed());
    }
    println!();
    Ok(())
}

pub fn cmd_settings_set(
    api_key: Option<String>,
    enable_ai: Option<bool>,
    auto_hide: Option<bool>,
    show_always: Option<bool>,
) -> Result<()> {
    let mut settings = Settings::load()?.unwrap_or_default();

    if let Some(key) = api_key {
        settings.api_key = key.trim().to_string();
    }
    if let Some(v) = enable_ai {
        settings.enable_ai = v;
    }
    if let Some(v) = auto_hide {
        settings.auto_hide = v;
    }
    if let Some(v) = show_always {
        settings.show_always = v;
    }

    settings.save()?;
    println!("{} Settings saved", "✓".green());
    Ok(())
}
