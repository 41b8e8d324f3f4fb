//! Page-scoped analysis controller.
//!
//! Drives extraction and classification for one document: the initial
//! content-polling loop, debounced re-analysis on significant mutations,
//! optional escalation to the external classifier, and the popup's
//! `getAnalysis` requests. Time is passed in by the host so every wait
//! is an explicit deadline checked by `tick`.

use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::agent::ExternalClassifier;
use crate::analysis::ClassificationResult;
use crate::badge::{BadgeView, Presenter};
use crate::cache::{ClassificationCache, Fingerprint};
use crate::classify::classify;
use crate::config::EffectiveSettings;
use crate::error::{Result, ScanError};
use crate::extract::ContentSource;
use crate::message::{Request, Response};
use crate::mutation::{is_self_inflicted, is_significant, MutationRecord};
use crate::page::ReadyState;

/// Content must be longer than this to be classified
pub const MIN_CONTENT_CHARS: usize = 50;

/// Retries after the first failed attempt during initial polling
pub const MAX_RETRIES: u32 = 5;

pub const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Quiet period after the last significant mutation before re-analysis
pub const DEBOUNCE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingInitialLoad,
    InitialAnalysisInFlight {
        retries: u32,
        next_attempt_at: Instant,
    },
    Observing,
}

/// Result of one analysis pass
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    /// Not enough text to classify
    InsufficientContent { length: usize },
    /// Cached result for the fingerprint already on display
    Unchanged,
    /// Cached result for a different fingerprint, shown again
    Redisplayed(Rc<ClassificationResult>),
    /// Freshly classified
    Classified(Rc<ClassificationResult>),
}

/// What happened to a mutation batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationDecision {
    NotObserving,
    SelfInflicted,
    Insignificant,
    Scheduled { run_at: Instant },
}

/// External classification owed for a keyword-inconclusive pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEscalation {
    pub fingerprint: Fingerprint,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EscalationOutcome {
    Applied(Rc<ClassificationResult>),
    /// Finished after a newer fingerprint was displayed
    Discarded,
    /// External call failed; the keyword result stays
    FellBack,
}

pub struct PageController<C: ExternalClassifier, P: Presenter> {
    classifier: C,
    presenter: P,
    settings: EffectiveSettings,
    cache: ClassificationCache,
    current: Option<Rc<ClassificationResult>>,
    displayed: Option<Fingerprint>,
    phase: Phase,
    debounce_deadline: Option<Instant>,
    pending: Option<PendingEscalation>,
    detached: bool,
}

impl<C: ExternalClassifier, P: Presenter> PageController<C, P> {
    pub fn new(classifier: C, presenter: P, settings: EffectiveSettings) -> Self {
        Self {
            classifier,
            presenter,
            settings,
            cache: ClassificationCache::new(),
            current: None,
            displayed: None,
            phase: Phase::AwaitingInitialLoad,
            debounce_deadline: None,
            pending: None,
            detached: false,
        }
    }

    /// Script attached to the document. Starts polling right away when the
    /// page has already finished loading. Only the first attach counts.
    pub fn attach<S: ContentSource>(&mut self, source: &S, now: Instant) -> Option<AnalysisOutcome> {
        if self.detached || self.phase != Phase::AwaitingInitialLoad {
            return None;
        }
        debug!(settings = ?self.settings, "controller attached");
        match source.ready_state() {
            ReadyState::Complete => Some(self.start_initial_analysis(source, now)),
            ReadyState::Loading => None,
        }
    }

    /// Page-load completion signal
    pub fn on_page_loaded<S: ContentSource>(
        &mut self,
        source: &S,
        now: Instant,
    ) -> Option<AnalysisOutcome> {
        if self.detached || self.phase != Phase::AwaitingInitialLoad {
            return None;
        }
        Some(self.start_initial_analysis(source, now))
    }

    fn start_initial_analysis<S: ContentSource>(&mut self, source: &S, now: Instant) -> AnalysisOutcome {
        self.phase = Phase::InitialAnalysisInFlight {
            retries: 0,
            next_attempt_at: now,
        };
        self.initial_attempt(source, now, 0)
    }

    fn initial_attempt<S: ContentSource>(&mut self, source: &S, now: Instant, retries: u32) -> AnalysisOutcome {
        let outcome = self.analyze(source);

        if let AnalysisOutcome::InsufficientContent { length } = outcome {
            if retries < MAX_RETRIES {
                debug!(length, retry = retries + 1, "insufficient content, retrying");
                self.phase = Phase::InitialAnalysisInFlight {
                    retries: retries + 1,
                    next_attempt_at: now + RETRY_DELAY,
                };
            } else {
                info!("no analyzable content after {} retries", MAX_RETRIES);
                self.presenter.show(&BadgeView::unavailable(&self.settings));
                self.phase = Phase::Observing;
            }
        } else {
            self.phase = Phase::Observing;
        }

        outcome
    }

    /// A batch of DOM mutations was observed
    pub fn on_mutations(&mut self, batch: &[MutationRecord], now: Instant) -> MutationDecision {
        if self.detached || self.phase != Phase::Observing {
            return MutationDecision::NotObserving;
        }
        if is_self_inflicted(batch) {
            return MutationDecision::SelfInflicted;
        }
        if !is_significant(batch) {
            return MutationDecision::Insignificant;
        }

        // Later bursts push the deadline out; only the last one runs
        let run_at = now + DEBOUNCE;
        self.debounce_deadline = Some(run_at);
        debug!("re-analysis scheduled");
        MutationDecision::Scheduled { run_at }
    }

    /// Run whatever is due: an initial-polling retry or a debounced
    /// re-analysis
    pub fn tick<S: ContentSource>(&mut self, source: &S, now: Instant) -> Option<AnalysisOutcome> {
        if self.detached {
            return None;
        }

        match self.phase {
            Phase::InitialAnalysisInFlight {
                retries,
                next_attempt_at,
            } if now >= next_attempt_at => Some(self.initial_attempt(source, now, retries)),
            Phase::Observing => match self.debounce_deadline {
                Some(deadline) if now >= deadline => {
                    self.debounce_deadline = None;
                    Some(self.analyze(source))
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// Extract, fingerprint and classify once.
    pub fn analyze<S: ContentSource>(&mut self, source: &S) -> AnalysisOutcome {
        let content = source.extract();
        if content.length <= MIN_CONTENT_CHARS {
            debug!(length = content.length, "insufficient content for analysis");
            return AnalysisOutcome::InsufficientContent {
                length: content.length,
            };
        }

        let fingerprint = Fingerprint::of(&content.normalized_text);

        if let Some(cached) = self.cache.get(&fingerprint) {
            if self.displayed.as_ref() == Some(&fingerprint) {
                return AnalysisOutcome::Unchanged;
            }
            debug!(fingerprint = fingerprint.as_str(), "cache hit, redisplaying");
            self.pending = None;
            self.display(fingerprint, Rc::clone(&cached));
            return AnalysisOutcome::Redisplayed(cached);
        }

        let result = Rc::new(classify(&content.normalized_text));
        info!(
            relocation = %result.relocation.category,
            employment = %result.employment_type.category,
            length = content.length,
            "classified job content"
        );

        self.cache.put(fingerprint.clone(), Rc::clone(&result));
        self.display(fingerprint.clone(), Rc::clone(&result));

        // An owed call for replaced content is never made
        self.pending = None;
        if result.is_keyword_inconclusive() && self.settings.can_escalate() {
            self.pending = Some(PendingEscalation {
                fingerprint,
                text: content.normalized_text,
            });
        }

        AnalysisOutcome::Classified(result)
    }

    /// Hand the owed external call to the host
    pub fn take_pending_escalation(&mut self) -> Option<PendingEscalation> {
        self.pending.take()
    }

    /// Run the owed external call with this controller's classifier
    pub fn run_pending_escalation(&mut self) -> Option<EscalationOutcome> {
        let pending = self.pending.take()?;
        let api_key = self.settings.api_key.clone()?;
        let outcome = self.classifier.classify(&pending.text, &api_key);
        Some(self.complete_escalation(pending, outcome))
    }

    /// Apply a finished external call unless a newer fingerprint has been
    /// displayed in the meantime. Failures keep the keyword result.
    pub fn complete_escalation(
        &mut self,
        pending: PendingEscalation,
        outcome: Result<ClassificationResult>,
    ) -> EscalationOutcome {
        match outcome {
            Err(e) => {
                warn!("external classification failed, keeping keyword result: {}", e);
                EscalationOutcome::FellBack
            }
            Ok(result) => {
                let result = Rc::new(result);
                self.cache.put(pending.fingerprint.clone(), Rc::clone(&result));

                if self.displayed.as_ref() != Some(&pending.fingerprint) {
                    debug!("discarding stale external result");
                    return EscalationOutcome::Discarded;
                }
                self.display(pending.fingerprint, Rc::clone(&result));
                EscalationOutcome::Applied(result)
            }
        }
    }

    fn display(&mut self, fingerprint: Fingerprint, result: Rc<ClassificationResult>) {
        match BadgeView::for_result(&result, &self.settings) {
            Some(view) => self.presenter.show(&view),
            None => self.presenter.clear(),
        }
        self.current = Some(result);
        self.displayed = Some(fingerprint);
    }

    /// Answer a popup request
    pub fn handle_message(&self, request: Request) -> Result<Response> {
        if self.detached {
            return Err(ScanError::MessagingUnavailable);
        }
        match request {
            Request::GetAnalysis => Ok(Response {
                analysis: self.current.as_deref().cloned(),
            }),
        }
    }

    /// Answer a raw JSON request with a raw JSON response
    pub fn handle_raw_message(&self, json: &str) -> Result<String> {
        let request = Request::parse(json)?;
        let response = self.handle_message(request)?;
        Ok(serde_json::to_string(&response)?)
    }

    /// Tear down the page context
    pub fn detach(&mut self) {
        self.detached = true;
        self.debounce_deadline = None;
        self.pending = None;
        self.presenter.clear();
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn current_result(&self) -> Option<&Rc<ClassificationResult>> {
        self.current.as_ref()
    }

    pub fn displayed_fingerprint(&self) -> Option<&Fingerprint> {
        self.displayed.as_ref()
    }

    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.debounce_deadline
    }

    pub fn cache(&self) -> &ClassificationCache {
        &self.cache
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn settings(&self) -> &EffectiveSettings {
        &self.settings
    }
}
