#![forbid(unsafe_code)]

//! Host-driven step runner.
//!
//! [`StepProgram`] owns a [`Model`] and everything the browser would
//! otherwise own implicitly: the event queue, the timer queue, the pending
//! animation-frame callbacks and the last presented document. The host
//! drives it explicitly:
//!
//! - push events via [`StepProgram::push_event`]
//! - advance time via [`StepProgram::advance_time`] / [`StepProgram::set_time`]
//! - call [`StepProgram::step`] to process events and due timers
//! - call [`StepProgram::frame`] from `requestAnimationFrame`
//! - read patches and effects via [`StepProgram::take_outputs`]
//!
//! # Ordering
//!
//! 1. Events are processed in arrival order.
//! 2. A message sent by a command is processed after the message that sent
//!    it and before the next event (no reentrancy).
//! 3. Due timers fire after the event queue drains, in due order. While a
//!    timer's message is processed, "now" is the timer's due time, so nested
//!    timers land where a real event loop would put them no matter how far
//!    the host advanced the clock in one go.
//! 4. Frame messages are delivered only by [`StepProgram::frame`].

use core::fmt;
use core::time::Duration;
use std::collections::VecDeque;

use pageflow_core::{DeterministicClock, Document, DomPatch, Event, HostEffect, PageLayout};

use crate::program::{Cmd, Model};
use crate::timer::{TimerPayload, TimerQueue};

/// Runtime misuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramError {
    /// `step`/`frame` called before `init`.
    NotInitialized,
    /// `init` called twice.
    AlreadyInitialized,
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "program not initialized"),
            Self::AlreadyInitialized => write!(f, "program already initialized"),
        }
    }
}

impl std::error::Error for ProgramError {}

/// Everything the host must apply, accumulated until taken.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StepOutputs {
    /// DOM patches, in application order.
    pub patches: Vec<DomPatch>,
    /// Host side effects, in request order.
    pub effects: Vec<HostEffect>,
    /// Log lines written by the model.
    pub logs: Vec<String>,
}

impl StepOutputs {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty() && self.effects.is_empty() && self.logs.is_empty()
    }
}

/// Summary of one `step`/`frame` call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    /// Host events taken from the queue.
    pub events_processed: usize,
    /// Model updates run (events, sent messages, timers, frames).
    pub messages_processed: usize,
    /// Timers that came due.
    pub timers_fired: usize,
    /// Whether a new document was presented.
    pub rendered: bool,
    /// Patches produced by this call.
    pub patch_count: usize,
}

/// Deterministic, host-driven program runner.
pub struct StepProgram<M: Model> {
    model: M,
    layout: PageLayout,
    clock: DeterministicClock,
    events: VecDeque<Event>,
    inbox: VecDeque<M::Message>,
    timers: TimerQueue<M::Message>,
    frame_queue: Vec<M::Message>,
    presented: Option<Document>,
    outputs: StepOutputs,
    initialized: bool,
    dirty: bool,
    frame_idx: u64,
}

impl<M: Model> StepProgram<M> {
    /// Wrap a model rendering into documents shaped by `layout`.
    pub fn new(model: M, layout: PageLayout) -> Self {
        Self {
            model,
            layout,
            clock: DeterministicClock::new(),
            events: VecDeque::new(),
            inbox: VecDeque::new(),
            timers: TimerQueue::new(),
            frame_queue: Vec::new(),
            presented: None,
            outputs: StepOutputs::default(),
            initialized: false,
            dirty: true,
            frame_idx: 0,
        }
    }

    /// Run `Model::init` and present the first document.
    pub fn init(&mut self) -> Result<StepResult, ProgramError> {
        if self.initialized {
            return Err(ProgramError::AlreadyInitialized);
        }
        let _span = tracing::debug_span!("step_program.init").entered();
        self.initialized = true;
        let now = self.clock.now();
        let mut result = StepResult::default();
        let cmd = self.model.init();
        let mut queue = VecDeque::new();
        self.execute(cmd, now, &mut queue);
        result.messages_processed = self.drain(queue, now);
        result.timers_fired = self.fire_due_timers(&mut result.messages_processed);
        self.present(&mut result);
        Ok(result)
    }

    /// Queue a canonical event.
    pub fn push_event(&mut self, event: Event) {
        tracing::trace!(target: "pageflow.runtime", kind = event.kind(), "event queued");
        self.events.push_back(event);
    }

    /// Queue a message that does not originate from a DOM event.
    pub fn send(&mut self, msg: M::Message) {
        self.inbox.push_back(msg);
    }

    /// Advance the host clock by `dt`.
    pub fn advance_time(&mut self, dt: Duration) {
        self.clock.advance(dt);
    }

    /// Set the host clock. Moving backwards is ignored.
    pub fn set_time(&mut self, now: Duration) {
        self.clock.set(now);
    }

    /// Current host time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    /// Process queued events, sent messages and due timers, then present.
    pub fn step(&mut self) -> Result<StepResult, ProgramError> {
        if !self.initialized {
            return Err(ProgramError::NotInitialized);
        }
        let _span = tracing::debug_span!(
            "step_program.step",
            frame_idx = self.frame_idx,
            queued = self.events.len(),
        )
        .entered();

        let now = self.clock.now();
        let mut result = StepResult::default();

        while let Some(event) = self.events.pop_front() {
            result.events_processed += 1;
            result.messages_processed += self.dispatch(M::Message::from(event), now);
        }
        while let Some(msg) = self.inbox.pop_front() {
            result.messages_processed += self.dispatch(msg, now);
        }
        result.timers_fired = self.fire_due_timers(&mut result.messages_processed);
        self.present(&mut result);
        Ok(result)
    }

    /// Deliver pending animation-frame messages, then present.
    pub fn frame(&mut self) -> Result<StepResult, ProgramError> {
        if !self.initialized {
            return Err(ProgramError::NotInitialized);
        }
        let now = self.clock.now();
        let mut result = StepResult::default();
        for msg in std::mem::take(&mut self.frame_queue) {
            result.messages_processed += self.dispatch(msg, now);
        }
        self.present(&mut result);
        Ok(result)
    }

    /// Whether the model asked for an animation frame.
    #[must_use]
    pub fn has_pending_frame(&self) -> bool {
        !self.frame_queue.is_empty()
    }

    /// When the next timer comes due.
    #[must_use]
    pub fn next_timer_due(&self) -> Option<Duration> {
        self.timers.next_due()
    }

    /// Number of pending timers.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Accumulated outputs.
    #[must_use]
    pub const fn outputs(&self) -> &StepOutputs {
        &self.outputs
    }

    /// Take accumulated outputs, leaving empty defaults.
    pub fn take_outputs(&mut self) -> StepOutputs {
        std::mem::take(&mut self.outputs)
    }

    /// Last presented document.
    #[must_use]
    pub fn presented(&self) -> Option<&Document> {
        self.presented.as_ref()
    }

    #[must_use]
    pub const fn model(&self) -> &M {
        &self.model
    }

    /// Mutable model access; the next step re-renders.
    pub fn model_mut(&mut self) -> &mut M {
        self.dirty = true;
        &mut self.model
    }

    #[must_use]
    pub const fn layout(&self) -> &PageLayout {
        &self.layout
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Documents presented so far.
    #[must_use]
    pub const fn frame_idx(&self) -> u64 {
        self.frame_idx
    }

    fn dispatch(&mut self, first: M::Message, now: Duration) -> usize {
        let mut queue = VecDeque::new();
        queue.push_back(first);
        self.drain(queue, now)
    }

    fn drain(&mut self, mut queue: VecDeque<M::Message>, now: Duration) -> usize {
        let mut processed = 0;
        while let Some(msg) = queue.pop_front() {
            let cmd = self.model.update(msg);
            processed += 1;
            self.dirty = true;
            self.execute(cmd, now, &mut queue);
        }
        processed
    }

    fn fire_due_timers(&mut self, messages: &mut usize) -> usize {
        let mut fired_count = 0;
        while let Some(fired) = self.timers.pop_due(self.clock.now()) {
            fired_count += 1;
            tracing::trace!(
                target: "pageflow.runtime",
                key = fired.key.map(|k| k.name()),
                due_ms = fired.due.as_millis() as u64,
                "timer fired"
            );
            let msg = fired.payload.into_message();
            *messages += self.dispatch(msg, fired.due);
        }
        fired_count
    }

    fn execute(&mut self, cmd: Cmd<M::Message>, now: Duration, queue: &mut VecDeque<M::Message>) {
        match cmd {
            Cmd::None => {}
            Cmd::Batch(cmds) => {
                for cmd in cmds {
                    self.execute(cmd, now, queue);
                }
            }
            Cmd::Msg(msg) => queue.push_back(msg),
            Cmd::After { delay, key, msg } => {
                self.timers.schedule(now, delay, key, TimerPayload::Msg(msg));
            }
            Cmd::Cancel(key) => {
                self.timers.cancel(key);
            }
            Cmd::NextFrame(msg) => self.frame_queue.push(msg),
            Cmd::Task(spec, run) => {
                let delay = spec.delay;
                self.timers.schedule(now, delay, None, TimerPayload::Task(spec, run));
            }
            Cmd::Effect(effect) => {
                tracing::debug!(target: "pageflow.runtime", ?effect, "host effect");
                self.outputs.effects.push(effect);
            }
            Cmd::Log(line) => {
                tracing::debug!(target: "pageflow.runtime", %line, "model log");
                self.outputs.logs.push(line);
            }
        }
    }

    fn present(&mut self, result: &mut StepResult) {
        if !self.dirty {
            return;
        }
        let mut doc = Document::from_layout(&self.layout);
        self.model.view(&mut doc);
        let patches = Document::diff(self.presented.as_ref(), &doc);
        result.rendered = true;
        result.patch_count = patches.len();
        self.outputs.patches.extend(patches);
        self.presented = Some(doc);
        self.dirty = false;
        self.frame_idx += 1;
    }
}

impl<M: Model + fmt::Debug> fmt::Debug for StepProgram<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepProgram")
            .field("model", &self.model)
            .field("now", &self.clock.now())
            .field("queued_events", &self.events.len())
            .field("timers", &self.timers)
            .field("pending_frames", &self.frame_queue.len())
            .field("initialized", &self.initialized)
            .field("frame_idx", &self.frame_idx)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::TimerKey;
    use pageflow_core::fixtures::demo_layout;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::registry::LookupSpan;

    /// Counts submits; each submit starts a 100ms echo and emits one log and
    /// one effect. A scroll asks for one frame that toggles the flag.
    #[derive(Debug, Default)]
    struct Recorder {
        submits: u32,
        echoes: Vec<Duration>,
        flag: bool,
        trace: Vec<&'static str>,
    }

    #[derive(Debug)]
    enum RecorderMsg {
        Submit,
        Echo(Duration),
        Chain,
        Scroll,
        Frame,
        Other,
    }

    impl From<Event> for RecorderMsg {
        fn from(event: Event) -> Self {
            match event {
                Event::Submit => Self::Submit,
                Event::Scroll { .. } => Self::Scroll,
                _ => Self::Other,
            }
        }
    }

    impl Model for Recorder {
        type Message = RecorderMsg;

        fn update(&mut self, msg: RecorderMsg) -> Cmd<RecorderMsg> {
            match msg {
                RecorderMsg::Submit => {
                    self.submits += 1;
                    self.trace.push("submit");
                    Cmd::batch(vec![
                        Cmd::msg(RecorderMsg::Chain),
                        Cmd::after(Duration::from_millis(100), RecorderMsg::Echo(Duration::ZERO)),
                        Cmd::log("submitted"),
                        Cmd::effect(HostEffect::ScrollToTop { smooth: false }),
                    ])
                }
                RecorderMsg::Chain => {
                    self.trace.push("chain");
                    Cmd::none()
                }
                RecorderMsg::Echo(depth) => {
                    self.echoes.push(depth);
                    if depth == Duration::ZERO {
                        Cmd::after(Duration::from_millis(50), RecorderMsg::Echo(Duration::from_millis(1)))
                    } else {
                        Cmd::none()
                    }
                }
                RecorderMsg::Scroll => {
                    self.trace.push("scroll");
                    Cmd::next_frame(RecorderMsg::Frame)
                }
                RecorderMsg::Frame => {
                    self.flag = !self.flag;
                    Cmd::none()
                }
                RecorderMsg::Other => {
                    self.trace.push("other");
                    Cmd::none()
                }
            }
        }

        fn view(&self, doc: &mut Document) {
            doc.flag_pulsing = self.flag;
            doc.submit.label = format!("sent {}", self.submits);
        }
    }

    fn program() -> StepProgram<Recorder> {
        let mut p = StepProgram::new(Recorder::default(), demo_layout());
        p.init().expect("init should succeed");
        p.take_outputs();
        p
    }

    #[test]
    fn step_before_init_is_an_error() {
        let mut p = StepProgram::new(Recorder::default(), demo_layout());
        assert_eq!(p.step(), Err(ProgramError::NotInitialized));
        assert_eq!(p.frame(), Err(ProgramError::NotInitialized));
        assert!(p.init().is_ok());
        assert_eq!(p.init(), Err(ProgramError::AlreadyInitialized));
    }

    #[test]
    fn init_presents_full_document() {
        let mut p = StepProgram::new(Recorder::default(), demo_layout());
        let result = p.init().expect("init should succeed");
        assert!(result.rendered);
        assert_eq!(p.frame_idx(), 1);
        assert!(p.outputs().patches.len() > 10);
    }

    #[test]
    fn idle_step_does_not_render() {
        let mut p = program();
        let result = p.step().expect("step");
        assert_eq!(result, StepResult::default());
        assert!(p.take_outputs().is_empty());
    }

    #[test]
    fn sent_messages_run_after_their_sender() {
        let mut p = program();
        p.push_event(Event::Submit);
        p.push_event(Event::Resize {
            width: 10,
            height: 10,
        });
        let result = p.step().expect("step");
        assert_eq!(result.events_processed, 2);
        assert_eq!(result.messages_processed, 3);
        assert_eq!(p.model().trace, vec!["submit", "chain", "other"]);
        let outputs = p.take_outputs();
        assert_eq!(outputs.logs, vec!["submitted".to_owned()]);
        assert_eq!(outputs.effects, vec![HostEffect::ScrollToTop { smooth: false }]);
    }

    #[derive(Default)]
    struct Captured {
        spans: Vec<String>,
        events: Vec<(String, Vec<(String, String)>)>,
    }

    struct Capture(Arc<Mutex<Captured>>);

    struct FieldVisitor(Vec<(String, String)>);

    impl tracing::field::Visit for FieldVisitor {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
            self.0.push((field.name().to_string(), format!("{value:?}")));
        }

        fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
            self.0.push((field.name().to_string(), value.to_string()));
        }
    }

    impl<S> tracing_subscriber::Layer<S> for Capture
    where
        S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    {
        fn on_new_span(
            &self,
            attrs: &tracing::span::Attributes<'_>,
            _id: &tracing::span::Id,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            self.0
                .lock()
                .unwrap()
                .spans
                .push(attrs.metadata().name().to_string());
        }

        fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
            let mut visitor = FieldVisitor(Vec::new());
            event.record(&mut visitor);
            self.0
                .lock()
                .unwrap()
                .events
                .push((event.metadata().target().to_string(), visitor.0));
        }
    }

    #[test]
    fn steps_trace_spans_effects_and_logs() {
        let store = Arc::new(Mutex::new(Captured::default()));
        let subscriber = tracing_subscriber::registry().with(Capture(Arc::clone(&store)));
        tracing::subscriber::with_default(subscriber, || {
            let mut p = StepProgram::new(Recorder::default(), demo_layout());
            p.init().expect("init");
            p.push_event(Event::Submit);
            p.step().expect("step");
        });

        let captured = store.lock().unwrap();
        assert!(captured.spans.iter().any(|s| s == "step_program.init"));
        assert!(captured.spans.iter().any(|s| s == "step_program.step"));

        let runtime: Vec<&Vec<(String, String)>> = captured
            .events
            .iter()
            .filter(|(target, _)| target == "pageflow.runtime")
            .map(|(_, fields)| fields)
            .collect();
        let has = |message: &str, key: &str, needle: &str| {
            runtime.iter().any(|fields| {
                fields.iter().any(|(k, v)| k == "message" && v == message)
                    && fields.iter().any(|(k, v)| k == key && v.contains(needle))
            })
        };
        assert!(has("model log", "line", "submitted"), "{runtime:?}");
        assert!(has("host effect", "effect", "ScrollToTop"), "{runtime:?}");
        assert!(has("event queued", "kind", "submit"), "{runtime:?}");
    }

    #[test]
    fn nested_timers_fire_in_one_large_advance() {
        let mut p = program();
        p.push_event(Event::Submit);
        p.step().expect("step");
        assert_eq!(p.next_timer_due(), Some(Duration::from_millis(100)));

        p.advance_time(Duration::from_secs(10));
        let result = p.step().expect("step");
        assert_eq!(result.timers_fired, 2);
        assert_eq!(
            p.model().echoes,
            vec![Duration::ZERO, Duration::from_millis(1)]
        );
        assert_eq!(p.pending_timers(), 0);
    }

    #[test]
    fn timers_wait_for_their_due_time() {
        let mut p = program();
        p.push_event(Event::Submit);
        p.step().expect("step");

        p.advance_time(Duration::from_millis(99));
        assert_eq!(p.step().expect("step").timers_fired, 0);
        p.advance_time(Duration::from_millis(1));
        assert_eq!(p.step().expect("step").timers_fired, 1);
        p.advance_time(Duration::from_millis(49));
        assert_eq!(p.step().expect("step").timers_fired, 0);
        p.advance_time(Duration::from_millis(1));
        assert_eq!(p.step().expect("step").timers_fired, 1);
    }

    #[test]
    fn frame_messages_wait_for_frame() {
        let mut p = program();
        p.push_event(Event::Scroll { y: 10.0 });
        p.step().expect("step");
        assert!(p.has_pending_frame());
        assert!(!p.model().flag);
        p.take_outputs();

        let result = p.frame().expect("frame");
        assert_eq!(result.messages_processed, 1);
        assert!(p.model().flag);
        assert!(!p.has_pending_frame());
        assert_eq!(
            p.take_outputs().patches,
            vec![DomPatch::FlagPulse { running: true }]
        );
    }

    #[test]
    fn keyed_after_replaces_through_commands() {
        struct Debounced {
            fired: u32,
        }
        enum DMsg {
            Poke,
            Fire,
        }
        impl From<Event> for DMsg {
            fn from(_: Event) -> Self {
                Self::Poke
            }
        }
        impl Model for Debounced {
            type Message = DMsg;
            fn update(&mut self, msg: DMsg) -> Cmd<DMsg> {
                match msg {
                    DMsg::Poke => {
                        Cmd::debounce(TimerKey::new("poke"), Duration::from_millis(250), DMsg::Fire)
                    }
                    DMsg::Fire => {
                        self.fired += 1;
                        Cmd::none()
                    }
                }
            }
            fn view(&self, _doc: &mut Document) {}
        }

        let mut p = StepProgram::new(Debounced { fired: 0 }, demo_layout());
        p.init().expect("init");
        for _ in 0..5 {
            p.push_event(Event::Submit);
            p.step().expect("step");
            p.advance_time(Duration::from_millis(100));
        }
        p.step().expect("step");
        assert_eq!(p.model().fired, 0);
        p.advance_time(Duration::from_millis(150));
        p.step().expect("step");
        assert_eq!(p.model().fired, 1);
    }
}
