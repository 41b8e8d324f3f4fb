//! The floating badge summarizing a classification.

use std::time::Duration;

use crate::analysis::{ClassificationResult, RelocationCategory};
use crate::config::EffectiveSettings;
use crate::mutation::{BADGE_ATTR, BADGE_ID};

/// Badge fades this long after being shown when auto-hide is on
pub const FADE_AFTER: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Positive,
    Negative,
    Neutral,
}

impl BadgeTone {
    pub fn background(&self) -> &'static str {
        match self {
            BadgeTone::Positive => "#27ae60",
            BadgeTone::Negative => "#e74c3c",
            BadgeTone::Neutral => "#7f8c8d",
        }
    }
}

/// What the badge should display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeView {
    pub tone: BadgeTone,
    pub text: String,
    pub keywords: Vec<String>,
    pub fade_after: Option<Duration>,
}

impl BadgeView {
    /// Badge for a result, or `None` when it should stay hidden
    /// (nothing found and `show_always` is off)
    pub fn for_result(result: &ClassificationResult, settings: &EffectiveSettings) -> Option<Self> {
        if !settings.show_always && !result.has_findings() {
            return None;
        }

        let (tone, mut text) = match result.relocation.category {
            _ if result.relocation.found => (
                BadgeTone::Positive,
                format!("🏢 Relocation: {}", result.relocation.category),
            ),
            RelocationCategory::ExplicitlyNotAvailable => (
                BadgeTone::Negative,
                "❌ No Relocation (explicitly stated)".to_string(),
            ),
            _ => (BadgeTone::Negative, "❌ No Relocation".to_string()),
        };

        if result.employment_type.found {
            text.push_str(&format!(" | 📍 {}", result.employment_type.category));
        }
        if let Some(region) = &result.region_restriction {
            text.push_str(&format!(" | 🌍 {} only", region));
        }

        Some(Self {
            tone,
            text,
            keywords: result.all_matched_keywords.clone(),
            fade_after: fade_after(settings),
        })
    }

    /// Neutral badge for pages with no analyzable content
    pub fn unavailable(settings: &EffectiveSettings) -> Self {
        Self {
            tone: BadgeTone::Neutral,
            text: "Unable to analyze this page".to_string(),
            keywords: Vec::new(),
            fade_after: fade_after(settings),
        }
    }

    /// Markup for the badge element, tagged so its own insertion is
    /// recognized by the mutation filter
    pub fn to_html(&self) -> String {
        format!(
            r#"<div id="{id}" class="{id}" {attr}="1" title="{title}" style="position: fixed; top: 20px; right: 20px; background: {bg}; color: white; padding: 12px 20px; border-radius: 25px; font-size: 14px; font-weight: 600; z-index: 10000; max-width: 300px;">{text}</div>"#,
            id = BADGE_ID,
            attr = BADGE_ATTR,
            title = escape_html(&self.keywords.join(", ")),
            bg = self.tone.background(),
            text = escape_html(&self.text),
        )
    }
}

fn fade_after(settings: &EffectiveSettings) -> Option<Duration> {
    settings.auto_hide.then_some(FADE_AFTER)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Where badges are rendered
pub trait Presenter {
    fn show(&mut self, view: &BadgeView);
    fn clear(&mut self);
}

/// Keeps the badge in memory; the current badge is `last`
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub last: Option<BadgeView>,
    /// Number of times a badge was (re)rendered
    pub renders: usize,
}

impl Presenter for RecordingPresenter {
    fn show(&mut self, view: &BadgeView) {
        self.last = Some(view.clone());
        self.renders += 1;
    }

    fn clear(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::config::{InjectedConfig, Settings};

    fn settings(show_always: bool, auto_hide: bool) -> EffectiveSettings {
        let stored = Settings {
            show_always,
            auto_hide,
            ..Settings::default()
        };
        EffectiveSettings::resolve(Some(&stored), &InjectedConfig::default())
    }

    #[test]
    fn test_positive_badge() {
        let result = classify("hybrid role. we offer visa sponsorship");
        let view = BadgeView::for_result(&result, &settings(true, true)).unwrap();
        assert_eq!(view.tone, BadgeTone::Positive);
        assert_eq!(view.text, "🏢 Relocation: Visa Sponsorship | 📍 Hybrid");
        assert_eq!(view.fade_after, Some(FADE_AFTER));
    }

    #[test]
    fn test_explicit_denial_badge() {
        let result = classify("fully remote, no relocation assistance available");
        let view = BadgeView::for_result(&result, &settings(true, false)).unwrap();
        assert_eq!(view.tone, BadgeTone::Negative);
        assert!(view.text.starts_with("❌ No Relocation (explicitly stated)"));
        assert!(view.text.ends_with("📍 Remote"));
        assert_eq!(view.fade_after, None);
    }

    #[test]
    fn test_hidden_when_nothing_found() {
        let result = classify("we build rockets and eat snacks");
        assert!(BadgeView::for_result(&result, &settings(false, true)).is_none());
        assert!(BadgeView::for_result(&result, &settings(true, true)).is_some());
    }

    #[test]
    fn test_html_is_tagged_and_escaped() {
        let view = BadgeView {
            tone: BadgeTone::Neutral,
            text: "<b>x</b>".into(),
            keywords: vec![],
            fade_after: None,
        };
        let html = view.to_html();
        assert!(html.contains(BADGE_ID));
        assert!(html.contains(BADGE_ATTR));
        assert!(html.contains("&lt;b&gt;x&lt;/b&gt;"));
    }
}
