#![forbid(unsafe_code)]

//! Platform-independent runner core wrapping `StepProgram<SiteModel>`.
//!
//! This module contains the logic shared between the wasm-bindgen exports
//! and the native test harness. No JS/WASM types here.

use core::time::Duration;

use pageflow_core::{DomPatch, Event, HostEffect, PageLayout, SectionId};
use pageflow_runtime::{StepOutputs, StepProgram, StepResult};
use pageflow_site::{SiteConfig, SiteError, SiteModel, SiteMsg};

/// Platform-independent page runner wrapping `StepProgram<SiteModel>`.
pub struct RunnerCore {
    inner: StepProgram<SiteModel>,
    /// Outputs moved out of the program but not yet taken by the host.
    staged: StepOutputs,
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
impl RunnerCore {
    /// Build the controller for `layout` and present the first document.
    ///
    /// `fragment` is the address fragment at load (`""` when absent).
    pub fn new(config: SiteConfig, layout: PageLayout, fragment: &str) -> Result<Self, SiteError> {
        let model = SiteModel::with_simulated_transport(config, layout.clone(), fragment)?;
        let mut inner = StepProgram::new(model, layout);
        let mut staged = StepOutputs::default();
        if let Err(err) = inner.init() {
            staged.logs.push(format!("runner_init_error: {err}"));
        }
        Ok(Self { inner, staged })
    }

    /// Parse a JSON-encoded event and push it to the event queue.
    /// Returns `false` for malformed or unknown events.
    pub fn push_encoded_event(&mut self, json: &str) -> bool {
        match serde_json::from_str::<Event>(json) {
            Ok(event) => {
                self.inner.push_event(event);
                true
            }
            Err(err) => {
                tracing::warn!(target: "pageflow.web", error = %err, "rejected encoded event");
                false
            }
        }
    }

    /// Queue a programmatic navigation, handled on the next step.
    pub fn navigate_to(&mut self, section: &str) {
        self.inner.send(SiteMsg::NavigateRequested(SectionId::new(section)));
    }

    /// Advance the deterministic clock by `dt_ms` milliseconds.
    pub fn advance_time_ms(&mut self, dt_ms: f64) {
        // Host input can be noisy (NaN/inf/negative spikes).
        if !dt_ms.is_finite() || dt_ms <= 0.0 {
            return;
        }
        let duration = Duration::try_from_secs_f64(dt_ms / 1000.0).unwrap_or(Duration::MAX);
        self.inner.advance_time(duration);
    }

    /// Set the deterministic clock to absolute milliseconds.
    pub fn set_time_ms(&mut self, ts_ms: f64) {
        let ts = if !ts_ms.is_finite() || ts_ms <= 0.0 {
            Duration::ZERO
        } else {
            Duration::try_from_secs_f64(ts_ms / 1000.0).unwrap_or(Duration::MAX)
        };
        self.inner.set_time(ts);
    }

    /// Process queued events, messages and due timers.
    pub fn step(&mut self) -> StepResult {
        match self.inner.step() {
            Ok(result) => result,
            Err(err) => {
                self.staged.logs.push(format!("runner_step_error: {err}"));
                StepResult::default()
            }
        }
    }

    /// Deliver the pending animation frame.
    pub fn frame(&mut self) -> StepResult {
        match self.inner.frame() {
            Ok(result) => result,
            Err(err) => {
                self.staged.logs.push(format!("runner_frame_error: {err}"));
                StepResult::default()
            }
        }
    }

    #[must_use]
    pub fn has_pending_frame(&self) -> bool {
        self.inner.has_pending_frame()
    }

    /// Milliseconds until the earliest pending timer, or `None` when idle.
    #[must_use]
    pub fn next_timer_delay_ms(&self) -> Option<f64> {
        self.inner
            .next_timer_due()
            .map(|due| due.saturating_sub(self.inner.now()).as_micros() as f64 / 1000.0)
    }

    fn stage(&mut self) {
        let fresh = self.inner.take_outputs();
        self.staged.patches.extend(fresh.patches);
        self.staged.effects.extend(fresh.effects);
        self.staged.logs.extend(fresh.logs);
    }

    /// Take pending DOM patches.
    pub fn take_patches(&mut self) -> Vec<DomPatch> {
        self.stage();
        std::mem::take(&mut self.staged.patches)
    }

    /// Take pending host effects.
    pub fn take_effects(&mut self) -> Vec<HostEffect> {
        self.stage();
        std::mem::take(&mut self.staged.effects)
    }

    /// Take pending log lines.
    pub fn take_logs(&mut self) -> Vec<String> {
        self.stage();
        std::mem::take(&mut self.staged.logs)
    }

    /// Pending DOM patches as a JSON array.
    pub fn take_patches_json(&mut self) -> String {
        let patches = self.take_patches();
        encode_json(&patches)
    }

    /// Pending host effects as a JSON array.
    pub fn take_effects_json(&mut self) -> String {
        let effects = self.take_effects();
        encode_json(&effects)
    }

    /// Section currently shown.
    #[must_use]
    pub fn current_section(&self) -> Option<String> {
        self.inner
            .model()
            .current_section()
            .map(|s| s.as_str().to_owned())
    }

    #[must_use]
    pub fn layout(&self) -> &PageLayout {
        self.inner.layout()
    }
}

fn encode_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| {
        tracing::warn!(target: "pageflow.web", error = %err, "output encoding failed");
        String::from("[]")
    })
}
