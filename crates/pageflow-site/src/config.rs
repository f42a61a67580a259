#![forbid(unsafe_code)]

//! Site configuration.
//!
//! Every tunable of the page controller lives in a single [`SiteConfig`]
//! that can be loaded from TOML or JSON (feature `config-file`). Defaults
//! reproduce the behavior of the shipped page.
//!
//! # Loading
//!
//! ```toml
//! # pageflow.toml
//! [nav]
//! home = "home"
//! history = "push"
//!
//! [form]
//! submit_latency_ms = 800
//!
//! [[animator.reveal_targets]]
//! selector = ".gallery-card"
//! style = "slide_in_up"
//! ```
//!
//! ```rust,ignore
//! let config = SiteConfig::from_toml_file("pageflow.toml")?.validated()?;
//! ```

#[cfg(feature = "config-file")]
use std::path::Path;
use std::time::Duration;

#[cfg(feature = "config-file")]
use serde::{Deserialize, Serialize};

use pageflow_core::{HistoryMode, RevealStyle, SectionId, Selector};

/// Top-level configuration of the page controller.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct SiteConfig {
    /// Router and navigation binder parameters.
    pub nav: NavConfig,
    /// Greeting form parameters.
    pub form: FormConfig,
    /// Entry animation and parallax parameters.
    pub animator: AnimatorConfig,
}

/// Router and navigation binder parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct NavConfig {
    /// Section shown for an empty or unknown address fragment.
    pub home: SectionId,
    /// How navigations write the fragment into history.
    pub history: HistoryMode,
    /// Viewport width above which the mobile menu closes (CSS px).
    pub mobile_breakpoint: u32,
    /// Quiet period before a resize is acted on (ms).
    pub resize_debounce_ms: u64,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            home: SectionId::new("home"),
            history: HistoryMode::Replace,
            mobile_breakpoint: 768,
            resize_debounce_ms: 250,
        }
    }
}

impl NavConfig {
    #[must_use]
    pub const fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

/// Greeting form parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct FormConfig {
    /// Submit label while a greeting is being sent.
    pub pending_label: String,
    /// Latency of the simulated transport (ms).
    pub submit_latency_ms: u64,
    /// How long the success message stays up (ms).
    pub success_display_ms: u64,
    /// Form-level message shown when the transport fails.
    pub failure_message: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            pending_label: "Sending...".to_owned(),
            submit_latency_ms: 1500,
            success_display_ms: 5000,
            failure_message: "Sending failed, please try again".to_owned(),
        }
    }
}

impl FormConfig {
    #[must_use]
    pub const fn submit_latency(&self) -> Duration {
        Duration::from_millis(self.submit_latency_ms)
    }

    #[must_use]
    pub const fn success_display(&self) -> Duration {
        Duration::from_millis(self.success_display_ms)
    }
}

/// One group of elements revealed on viewport entry.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
pub struct RevealTarget {
    pub selector: Selector,
    pub style: RevealStyle,
}

impl RevealTarget {
    /// Target for an already-valid selector.
    #[must_use]
    pub fn new(selector: Selector, style: RevealStyle) -> Self {
        Self { selector, style }
    }

    fn class(name: &str, style: RevealStyle) -> Self {
        Self::new(Selector::Class(name.to_owned()), style)
    }
}

/// Entry animation and parallax parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config-file", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config-file", serde(default))]
pub struct AnimatorConfig {
    /// Visible fraction at which an element counts as entered.
    pub reveal_threshold: f64,
    /// Background translation per scrolled pixel.
    pub parallax_factor: f64,
    /// Pause between stopping and restarting the flag pulse (ms).
    pub flag_restart_ms: u64,
    /// Element groups observed at startup, in order.
    pub reveal_targets: Vec<RevealTarget>,
}

impl Default for AnimatorConfig {
    fn default() -> Self {
        Self {
            reveal_threshold: 0.1,
            parallax_factor: -0.5,
            flag_restart_ms: 10,
            reveal_targets: vec![
                RevealTarget::class("hero-card", RevealStyle::SlideInUp),
                RevealTarget::class("place-card", RevealStyle::SlideInUp),
                RevealTarget::class("symbol-card", RevealStyle::SlideInUp),
                RevealTarget::class("timeline-item-full", RevealStyle::SlideInLeft),
            ],
        }
    }
}

impl AnimatorConfig {
    #[must_use]
    pub const fn flag_restart(&self) -> Duration {
        Duration::from_millis(self.flag_restart_ms)
    }
}

impl SiteConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config-file")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config-file")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config-file")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Check every parameter.
    ///
    /// Returns a list of problems; an empty list means the config is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.nav.home.as_str().is_empty() {
            errors.push("nav.home must not be empty".into());
        }
        if self.nav.mobile_breakpoint == 0 {
            errors.push("nav.mobile_breakpoint must be > 0".into());
        }

        if self.form.pending_label.trim().is_empty() {
            errors.push("form.pending_label must not be empty".into());
        }
        if self.form.success_display_ms == 0 {
            errors.push("form.success_display_ms must be > 0".into());
        }
        if self.form.failure_message.trim().is_empty() {
            errors.push("form.failure_message must not be empty".into());
        }

        let threshold = self.animator.reveal_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            errors.push(format!(
                "animator.reveal_threshold must be in (0, 1], got {threshold}"
            ));
        }
        if !self.animator.parallax_factor.is_finite() {
            errors.push(format!(
                "animator.parallax_factor must be finite, got {}",
                self.animator.parallax_factor
            ));
        }
        for (idx, target) in self.animator.reveal_targets.iter().enumerate() {
            if self.animator.reveal_targets[..idx]
                .iter()
                .any(|t| t.selector == target.selector)
            {
                errors.push(format!(
                    "animator.reveal_targets: selector {} listed twice",
                    target.selector
                ));
            }
        }

        errors
    }

    /// `self` if [`Self::validate`] finds nothing, otherwise the problems.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Failure to load or validate a [`SiteConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading a config file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config-file")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config-file")]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// Parameters out of range.
    #[error("validation errors: {}", .0.join("; "))]
    Validation(Vec<String>),
}
