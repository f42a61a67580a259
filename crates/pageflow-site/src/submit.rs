#![forbid(unsafe_code)]

//! Greeting submission: transport seam and the submit state machine.
//!
//! ```text
//! Idle ──begin──▶ Sending ──finish(Ok)──▶ Succeeded ──reset──▶ Idle
//!                    │
//!                    └──finish(Err)──▶ Idle (form error shown)
//! ```

use std::cell::RefCell;
use std::time::Duration;

use pageflow_core::Document;

use crate::config::FormConfig;

/// Where the greeting form is in its submit cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SubmissionState {
    #[default]
    Idle,
    Sending,
    Succeeded,
}

/// Validated, trimmed form contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeting {
    pub sender_name: String,
    pub sender_email: String,
    pub recipient_email: String,
    pub message: String,
}

/// A transport refused or failed to deliver a greeting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("greeting rejected: {0}")]
    Rejected(String),
    #[error("transport unavailable")]
    Unavailable,
}

/// Delivers greetings.
pub trait GreetingTransport {
    /// How long after submit the delivery outcome is known.
    fn latency(&self) -> Duration;

    fn send(&self, greeting: &Greeting) -> Result<(), TransportError>;
}

/// In-page transport: records greetings and reports the configured outcome.
#[derive(Debug)]
pub struct SimulatedTransport {
    latency: Duration,
    failure: Option<TransportError>,
    sent: RefCell<Vec<Greeting>>,
}

impl SimulatedTransport {
    /// Always succeeds after `latency`.
    #[must_use]
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            failure: None,
            sent: RefCell::new(Vec::new()),
        }
    }

    /// Succeeds after the configured submit latency.
    #[must_use]
    pub fn from_config(config: &FormConfig) -> Self {
        Self::new(config.submit_latency())
    }

    /// Fail every delivery with `error`.
    #[must_use]
    pub fn failing_with(mut self, error: TransportError) -> Self {
        self.failure = Some(error);
        self
    }

    /// Greetings accepted so far.
    #[must_use]
    pub fn sent(&self) -> Vec<Greeting> {
        self.sent.borrow().clone()
    }
}

impl GreetingTransport for SimulatedTransport {
    fn latency(&self) -> Duration {
        self.latency
    }

    fn send(&self, greeting: &Greeting) -> Result<(), TransportError> {
        if let Some(err) = &self.failure {
            return Err(err.clone());
        }
        self.sent.borrow_mut().push(greeting.clone());
        Ok(())
    }
}

/// The submit state machine and what it shows.
#[derive(Debug, Clone)]
pub struct Submission {
    state: SubmissionState,
    idle_label: String,
    pending_label: String,
    failure_message: String,
    form_error: Option<String>,
}

impl Submission {
    /// `idle_label` is the submit control's label from the markup.
    #[must_use]
    pub fn new(idle_label: impl Into<String>, config: &FormConfig) -> Self {
        Self {
            state: SubmissionState::Idle,
            idle_label: idle_label.into(),
            pending_label: config.pending_label.clone(),
            failure_message: config.failure_message.clone(),
            form_error: None,
        }
    }

    #[must_use]
    pub const fn state(&self) -> SubmissionState {
        self.state
    }

    #[must_use]
    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    /// Idle → Sending. Returns `false` (and changes nothing) otherwise.
    pub fn begin(&mut self) -> bool {
        if self.state != SubmissionState::Idle {
            return false;
        }
        self.state = SubmissionState::Sending;
        self.form_error = None;
        true
    }

    /// Apply the transport outcome. Returns the state it led to, or `None`
    /// when nothing was being sent.
    pub fn finish(&mut self, outcome: Result<(), TransportError>) -> Option<SubmissionState> {
        if self.state != SubmissionState::Sending {
            return None;
        }
        match outcome {
            Ok(()) => self.state = SubmissionState::Succeeded,
            Err(err) => {
                tracing::debug!(target: "pageflow.site", error = %err, "greeting delivery failed");
                self.state = SubmissionState::Idle;
                self.form_error = Some(self.failure_message.clone());
            }
        }
        Some(self.state)
    }

    /// Succeeded → Idle. Returns whether the form should be reset.
    pub fn reset(&mut self) -> bool {
        if self.state != SubmissionState::Succeeded {
            return false;
        }
        self.state = SubmissionState::Idle;
        true
    }

    pub fn view(&self, doc: &mut Document) {
        let busy = self.state != SubmissionState::Idle;
        doc.submit.disabled = busy;
        doc.submit.label.clone_from(if busy {
            &self.pending_label
        } else {
            &self.idle_label
        });
        doc.form_visible = self.state != SubmissionState::Succeeded;
        doc.success_visible = self.state == SubmissionState::Succeeded;
        doc.form_error.clone_from(&self.form_error);
    }
}
