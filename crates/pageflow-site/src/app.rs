#![forbid(unsafe_code)]

//! The page controller.
//!
//! [`SiteModel`] owns one instance of each component and routes canonical
//! events to them. It implements [`Model`], so a
//! [`StepProgram`](pageflow_runtime::StepProgram) can drive it from a host.

use std::rc::Rc;

use pageflow_core::{
    ControlId, Document, ElementId, Event, FieldName, LayoutError, PageLayout, SectionId,
};
use pageflow_runtime::{Cmd, Model, TimerKey};

use crate::animator::{FlagPulse, Parallax, RevealObserver};
use crate::config::{ConfigError, SiteConfig};
use crate::nav::{ClickKind, FollowUp, NavBinder};
use crate::router::{NavOrigin, ViewRouter};
use crate::submit::{GreetingTransport, SimulatedTransport, Submission, SubmissionState, TransportError};
use crate::validate::FormState;

const RESIZE_KEY: TimerKey = TimerKey::new("resize");
const FLAG_KEY: TimerKey = TimerKey::new("flag.restart");
const SUCCESS_KEY: TimerKey = TimerKey::new("form.success");

/// Failure to set up the page controller.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Required markup is missing.
    #[error("invalid page layout: {0}")]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The configured home section is not on the page.
    #[error("home section {0} is not on the page")]
    UnknownHome(SectionId),
}

/// Messages understood by [`SiteModel`].
#[derive(Debug)]
pub enum SiteMsg {
    /// Script asked to show a section.
    NavigateRequested(SectionId),
    ControlClicked(ControlId),
    /// Back/forward landed on this fragment.
    HistoryPopped(String),
    FieldBlurred(FieldName),
    FieldEdited(FieldName, String),
    FormSubmitted,
    SubmissionFinished(Result<(), TransportError>),
    SuccessElapsed,
    ScrollTicked(f64),
    FrameRendered,
    Resized { width: u32, height: u32 },
    ResizeSettled { width: u32 },
    ElementIntersected { element: ElementId, ratio: f64 },
    FlagPulseRestart,
}

impl From<Event> for SiteMsg {
    fn from(event: Event) -> Self {
        match event {
            Event::Click { control } => Self::ControlClicked(control),
            Event::Submit => Self::FormSubmitted,
            Event::FieldBlur { field } => Self::FieldBlurred(field),
            Event::FieldInput { field, value } => Self::FieldEdited(field, value),
            Event::Scroll { y } => Self::ScrollTicked(y),
            Event::Resize { width, height } => Self::Resized { width, height },
            Event::PopState { fragment } => Self::HistoryPopped(fragment),
            Event::Intersect { element, ratio } => Self::ElementIntersected { element, ratio },
        }
    }
}

/// The single-page site controller.
pub struct SiteModel {
    config: SiteConfig,
    layout: PageLayout,
    initial_fragment: String,
    router: ViewRouter,
    nav: NavBinder,
    form: FormState,
    submission: Submission,
    transport: Rc<dyn GreetingTransport>,
    reveals: RevealObserver,
    parallax: Parallax,
    flag: FlagPulse,
}

impl SiteModel {
    /// Controller for `layout`, started at the address fragment
    /// `initial_fragment` (`""` when the address has none).
    pub fn new(
        config: SiteConfig,
        layout: PageLayout,
        initial_fragment: &str,
        transport: Rc<dyn GreetingTransport>,
    ) -> Result<Self, SiteError> {
        layout.validate()?;
        let config = config.validated()?;
        if !layout.has_section(&config.nav.home) {
            return Err(SiteError::UnknownHome(config.nav.home.clone()));
        }
        let idle_label = layout.submit_label().unwrap_or_default().to_owned();
        Ok(Self {
            router: ViewRouter::new(&layout),
            nav: NavBinder::from_layout(&layout),
            form: FormState::new(),
            submission: Submission::new(idle_label, &config.form),
            transport,
            reveals: RevealObserver::new(&layout, config.animator.reveal_threshold),
            parallax: Parallax::new(config.animator.parallax_factor, layout.has_background()),
            flag: FlagPulse::new(layout.has_flag()),
            initial_fragment: initial_fragment.to_owned(),
            config,
            layout,
        })
    }

    /// Controller with the simulated transport from `config`.
    pub fn with_simulated_transport(
        config: SiteConfig,
        layout: PageLayout,
        initial_fragment: &str,
    ) -> Result<Self, SiteError> {
        let transport = Rc::new(SimulatedTransport::from_config(&config.form));
        Self::new(config, layout, initial_fragment, transport)
    }

    #[must_use]
    pub fn current_section(&self) -> Option<&SectionId> {
        self.router.current()
    }

    #[must_use]
    pub const fn config(&self) -> &SiteConfig {
        &self.config
    }

    #[must_use]
    pub const fn layout(&self) -> &PageLayout {
        &self.layout
    }

    #[must_use]
    pub const fn router(&self) -> &ViewRouter {
        &self.router
    }

    #[must_use]
    pub const fn nav(&self) -> &NavBinder {
        &self.nav
    }

    #[must_use]
    pub const fn form(&self) -> &FormState {
        &self.form
    }

    #[must_use]
    pub const fn submission(&self) -> &Submission {
        &self.submission
    }

    #[must_use]
    pub const fn reveals(&self) -> &RevealObserver {
        &self.reveals
    }

    #[must_use]
    pub const fn parallax(&self) -> &Parallax {
        &self.parallax
    }

    #[must_use]
    pub const fn flag(&self) -> FlagPulse {
        self.flag
    }

    fn navigate(&mut self, target: &SectionId, origin: NavOrigin) -> (bool, Cmd<SiteMsg>) {
        let navigation = self.router.navigate(target);
        if !navigation.is_shown() {
            return (false, Cmd::none());
        }
        self.nav.sync_active(target);
        let effects: Vec<Cmd<SiteMsg>> = navigation
            .effects(origin, self.config.nav.history)
            .into_iter()
            .map(Cmd::effect)
            .collect();
        (true, Cmd::batch(effects))
    }

    fn click(&mut self, control: ControlId) -> Cmd<SiteMsg> {
        match self.nav.classify(control) {
            Some(ClickKind::Link(idx)) => {
                let Some(link) = self.nav.link(idx) else {
                    return Cmd::none();
                };
                let follow_up = link.follow_up();
                let target = link.target().cloned();
                let (shown, cmd) = match &target {
                    Some(target) => self.navigate(target, NavOrigin::Link),
                    None => {
                        tracing::debug!(target: "pageflow.site", %control, "link without fragment target ignored");
                        (false, Cmd::none())
                    }
                };
                match follow_up {
                    FollowUp::HighlightPrimary if shown => self.nav.highlight_primary(control),
                    FollowUp::CloseMenu => {
                        self.nav.menu_mut().close();
                    }
                    _ => {}
                }
                cmd
            }
            Some(ClickKind::MenuToggle) => {
                let open = self.nav.menu_mut().toggle();
                tracing::debug!(target: "pageflow.site", open, "mobile menu toggled");
                Cmd::none()
            }
            Some(ClickKind::Flag) => {
                if self.flag.stop() {
                    Cmd::debounce(
                        FLAG_KEY,
                        self.config.animator.flag_restart(),
                        SiteMsg::FlagPulseRestart,
                    )
                } else {
                    Cmd::none()
                }
            }
            None => {
                tracing::warn!(target: "pageflow.site", %control, "click on unknown control");
                Cmd::none()
            }
        }
    }

    fn submit(&mut self) -> Cmd<SiteMsg> {
        if self.submission.state() != SubmissionState::Idle {
            tracing::debug!(target: "pageflow.site", state = ?self.submission.state(), "submit ignored");
            return Cmd::none();
        }
        if !self.form.validate_form() {
            let invalid: Vec<&str> = self.form.invalid_fields().map(FieldName::wire_name).collect();
            tracing::debug!(target: "pageflow.site", ?invalid, "submit blocked by validation");
            return Cmd::none();
        }
        self.submission.begin();
        let greeting = self.form.greeting();
        let transport = Rc::clone(&self.transport);
        tracing::debug!(target: "pageflow.site", "greeting sending");
        Cmd::batch(vec![
            Cmd::log(format!("greeting: sending to {}", greeting.recipient_email)),
            Cmd::task_after("greeting.send", transport.latency(), move || {
                SiteMsg::SubmissionFinished(transport.send(&greeting))
            }),
        ])
    }
}

impl Model for SiteModel {
    type Message = SiteMsg;

    fn init(&mut self) -> Cmd<SiteMsg> {
        for target in &self.config.animator.reveal_targets {
            self.reveals.observe(&self.layout, &target.selector, target.style);
        }
        let start = self
            .router
            .resolve_fragment(&self.initial_fragment, &self.config.nav.home);
        tracing::debug!(
            target: "pageflow.site",
            fragment = %self.initial_fragment,
            section = %start,
            "site starting"
        );
        let (_, cmd) = self.navigate(&start, NavOrigin::Initial);
        cmd
    }

    fn update(&mut self, msg: SiteMsg) -> Cmd<SiteMsg> {
        tracing::trace!(target: "pageflow.site", ?msg, "update");
        match msg {
            SiteMsg::NavigateRequested(target) => self.navigate(&target, NavOrigin::Programmatic).1,
            SiteMsg::ControlClicked(control) => self.click(control),
            SiteMsg::HistoryPopped(fragment) => {
                let target = SectionId::from_fragment(&fragment)
                    .unwrap_or_else(|| self.config.nav.home.clone());
                self.navigate(&target, NavOrigin::History).1
            }
            SiteMsg::FieldBlurred(field) => {
                self.form.validate_field(field);
                Cmd::none()
            }
            SiteMsg::FieldEdited(field, value) => {
                self.form.edit(field, value);
                Cmd::none()
            }
            SiteMsg::FormSubmitted => self.submit(),
            SiteMsg::SubmissionFinished(outcome) => match self.submission.finish(outcome) {
                Some(SubmissionState::Succeeded) => Cmd::batch(vec![
                    Cmd::log("greeting: sent"),
                    Cmd::debounce(
                        SUCCESS_KEY,
                        self.config.form.success_display(),
                        SiteMsg::SuccessElapsed,
                    ),
                ]),
                Some(_) => Cmd::log("greeting: failed"),
                None => Cmd::none(),
            },
            SiteMsg::SuccessElapsed => {
                if self.submission.reset() {
                    self.form.reset();
                }
                Cmd::none()
            }
            SiteMsg::ScrollTicked(y) => {
                if self.parallax.on_scroll(y) {
                    Cmd::next_frame(SiteMsg::FrameRendered)
                } else {
                    Cmd::none()
                }
            }
            SiteMsg::FrameRendered => {
                let home = self.router.current() == Some(&self.config.nav.home);
                self.parallax.on_frame(home);
                Cmd::none()
            }
            SiteMsg::Resized { width, .. } => Cmd::debounce(
                RESIZE_KEY,
                self.config.nav.resize_debounce(),
                SiteMsg::ResizeSettled { width },
            ),
            SiteMsg::ResizeSettled { width } => {
                let breakpoint = self.config.nav.mobile_breakpoint;
                if self.nav.menu_mut().on_resize_settled(width, breakpoint) {
                    tracing::debug!(target: "pageflow.site", width, "mobile menu closed by resize");
                }
                Cmd::none()
            }
            SiteMsg::ElementIntersected { element, ratio } => {
                if self.reveals.intersect(element, ratio) {
                    tracing::trace!(target: "pageflow.site", %element, "revealed");
                }
                Cmd::none()
            }
            SiteMsg::FlagPulseRestart => {
                self.flag.restart();
                Cmd::none()
            }
        }
    }

    fn view(&self, doc: &mut Document) {
        self.router.view(doc);
        self.nav.view(doc);
        self.form.view(doc);
        self.submission.view(doc);
        self.reveals.view(doc);
        self.parallax.view(doc);
        self.flag.view(doc);
    }
}

impl std::fmt::Debug for SiteModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SiteModel")
            .field("current", &self.router.current())
            .field("menu_open", &self.nav.menu().is_open())
            .field("submission", &self.submission.state())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pageflow_core::fixtures::demo_layout;
    use pretty_assertions::assert_eq;

    fn model(fragment: &str) -> SiteModel {
        SiteModel::with_simulated_transport(SiteConfig::default(), demo_layout(), fragment)
            .expect("demo layout is valid")
    }

    #[test]
    fn new_rejects_incomplete_layout() {
        let layout = PageLayout::new().with_initial_section("home");
        let err = SiteModel::with_simulated_transport(SiteConfig::default(), layout, "")
            .expect_err("form is missing");
        assert!(matches!(err, SiteError::Layout(LayoutError::MissingField(_))));
    }

    #[test]
    fn new_rejects_missing_home() {
        let mut config = SiteConfig::default();
        config.nav.home = SectionId::new("start");
        let err = SiteModel::with_simulated_transport(config, demo_layout(), "")
            .expect_err("home is missing");
        assert_eq!(err.to_string(), "home section start is not on the page");
    }

    #[test]
    fn new_rejects_invalid_config() {
        let mut config = SiteConfig::default();
        config.animator.reveal_threshold = 2.0;
        let err = SiteModel::with_simulated_transport(config, demo_layout(), "")
            .expect_err("threshold out of range");
        assert!(matches!(err, SiteError::Config(ConfigError::Validation(_))));
    }

    #[test]
    fn init_follows_fragment_or_falls_back() {
        for (fragment, expected) in [("#symbols", "symbols"), ("", "home"), ("#void", "home")] {
            let mut site = model(fragment);
            let cmd = site.init();
            assert!(cmd.is_none(), "initial navigation has no host effects");
            assert_eq!(site.current_section(), Some(&SectionId::new(expected)));
        }
    }

    #[test]
    fn init_observes_default_targets() {
        let mut site = model("");
        site.init();
        assert_eq!(site.reveals().observed().count(), 9);
    }

    #[test]
    fn events_map_to_messages() {
        assert!(matches!(
            SiteMsg::from(Event::PopState {
                fragment: "#places".to_owned()
            }),
            SiteMsg::HistoryPopped(f) if f == "#places"
        ));
        assert!(matches!(SiteMsg::from(Event::Submit), SiteMsg::FormSubmitted));
        assert!(matches!(
            SiteMsg::from(Event::Resize {
                width: 900,
                height: 700
            }),
            SiteMsg::Resized { width: 900, .. }
        ));
    }

    #[test]
    fn programmatic_navigation_writes_history() {
        let mut site = model("");
        site.init();
        let cmd = site.update(SiteMsg::NavigateRequested(SectionId::new("history")));
        assert_eq!(cmd.count(), 2);
        assert_eq!(site.current_section(), Some(&SectionId::new("history")));
    }
}
