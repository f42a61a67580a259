#![forbid(unsafe_code)]

//! Site: the page controller for a single-page informational site.
//!
//! # Role in pageflow
//! `pageflow-site` is the behavior layer. [`SiteModel`] implements the
//! runtime's [`Model`](pageflow_runtime::Model) and owns one of each
//! component:
//!
//! - **ViewRouter** ([`router`]): one visible section, the current-section
//!   pointer, history and scroll effects.
//! - **NavBinder** ([`nav`]): primary, footer and mobile links behind one
//!   [`NavigableControl`](nav::NavigableControl) capability, plus the
//!   mobile menu.
//! - **FormState** ([`validate`]): greeting form values and per-field
//!   validation.
//! - **Submission** ([`submit`]): Idle → Sending → Succeeded through a
//!   [`GreetingTransport`](submit::GreetingTransport).
//! - **Animator** ([`animator`]): one-shot entry reveals, frame-throttled
//!   parallax, the flag pulse.
//!
//! All tunables come from [`SiteConfig`].
//!
//! # Example
//!
//! ```
//! use pageflow_core::{Event, PageLayout, ControlRole};
//! use pageflow_runtime::StepProgram;
//! use pageflow_site::{SiteConfig, SiteModel};
//!
//! let layout = PageLayout::new()
//!     .with_initial_section("home")
//!     .with_section("places")
//!     .with_link(ControlRole::PrimaryNav, "#places")
//!     .with_control(ControlRole::MenuToggle, None)
//!     .with_greeting_form("Send Greeting")
//!     .with_mobile_menu();
//!
//! let model = SiteModel::with_simulated_transport(SiteConfig::default(), layout.clone(), "")
//!     .expect("layout is complete");
//! let mut program = StepProgram::new(model, layout);
//! program.init().expect("first init");
//!
//! let link = program.layout().controls()[0].id;
//! program.push_event(Event::Click { control: link });
//! program.step().expect("initialized");
//! assert_eq!(program.model().current_section().map(|s| s.as_str()), Some("places"));
//! ```

pub mod animator;
pub mod app;
pub mod config;
pub mod nav;
pub mod router;
pub mod submit;
pub mod validate;

pub use app::{SiteError, SiteModel, SiteMsg};
pub use config::{AnimatorConfig, ConfigError, FormConfig, NavConfig, RevealTarget, SiteConfig};
pub use nav::{MobileMenu, NavBinder, NavigableControl};
pub use router::{NavOrigin, Navigation, ViewRouter};
pub use submit::{
    Greeting, GreetingTransport, SimulatedTransport, Submission, SubmissionState, TransportError,
};
pub use validate::{FieldError, FormState};
