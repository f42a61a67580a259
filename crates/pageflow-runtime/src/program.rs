#![forbid(unsafe_code)]

//! Elm-style model contract and commands.
//!
//! A page is a [`Model`]: it receives messages (converted from canonical
//! [`Event`]s or produced by its own commands), mutates its state in
//! `update`, and projects that state onto a [`Document`] in `view`.
//!
//! # Example
//!
//! ```
//! use pageflow_core::{Document, Event};
//! use pageflow_runtime::program::{Cmd, Model};
//! use std::time::Duration;
//!
//! struct Blink {
//!     on: bool,
//! }
//!
//! enum Msg {
//!     Toggle,
//!     Ignore,
//! }
//!
//! impl From<Event> for Msg {
//!     fn from(event: Event) -> Self {
//!         match event {
//!             Event::Submit => Msg::Toggle,
//!             _ => Msg::Ignore,
//!         }
//!     }
//! }
//!
//! impl Model for Blink {
//!     type Message = Msg;
//!
//!     fn update(&mut self, msg: Msg) -> Cmd<Msg> {
//!         match msg {
//!             Msg::Toggle => {
//!                 self.on = !self.on;
//!                 Cmd::after(Duration::from_millis(500), Msg::Toggle)
//!             }
//!             Msg::Ignore => Cmd::none(),
//!         }
//!     }
//!
//!     fn view(&self, doc: &mut Document) {
//!         doc.flag_pulsing = self.on;
//!     }
//! }
//! ```

use core::fmt;
use core::time::Duration;

use pageflow_core::{Document, Event, HostEffect};

/// The model contract driven by [`StepProgram`](crate::step_program::StepProgram).
pub trait Model: Sized {
    /// The message type for this model.
    ///
    /// Must be convertible from canonical page events.
    type Message: From<Event> + 'static;

    /// Initialize the model with startup commands.
    ///
    /// Called once before the first render.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// Update the model in response to a message.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Project the current state onto a document built from the layout.
    fn view(&self, doc: &mut Document);
}

/// Name of a keyed timer.
///
/// Scheduling a keyed timer replaces any pending timer with the same key,
/// which is how debouncing is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerKey(&'static str);

impl TimerKey {
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        self.0
    }
}

/// Description of a deferred task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    /// Name used in logs.
    pub name: &'static str,
    /// How long after scheduling the task runs.
    pub delay: Duration,
}

/// Deferred work producing a message.
pub type Task<M> = Box<dyn FnOnce() -> M>;

/// Commands represent side effects to be executed by the runtime.
///
/// Commands are returned from `init()` and `update()`.
pub enum Cmd<M> {
    /// No operation.
    None,
    /// Execute multiple commands in order.
    Batch(Vec<Cmd<M>>),
    /// Send a message to the model after the current one is processed.
    Msg(M),
    /// Deliver a message once `delay` has elapsed on the host clock.
    After {
        delay: Duration,
        /// Replaces a pending timer with the same key.
        key: Option<TimerKey>,
        msg: M,
    },
    /// Drop a pending keyed timer.
    Cancel(TimerKey),
    /// Deliver a message on the next animation frame.
    NextFrame(M),
    /// Run a closure after a delay and deliver the message it returns.
    Task(TaskSpec, Task<M>),
    /// Ask the host to perform a side effect.
    Effect(HostEffect),
    /// Write a log line to the host outputs.
    Log(String),
}

impl<M> Cmd<M> {
    /// Create a no-op command.
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    /// Create a message command.
    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    /// Create a log command.
    #[inline]
    pub fn log(msg: impl Into<String>) -> Self {
        Self::Log(msg.into())
    }

    /// Create a host effect command.
    #[inline]
    pub fn effect(effect: HostEffect) -> Self {
        Self::Effect(effect)
    }

    /// Deliver `msg` after `delay`.
    #[inline]
    pub fn after(delay: Duration, msg: M) -> Self {
        Self::After {
            delay,
            key: None,
            msg,
        }
    }

    /// Deliver `msg` after `delay`, replacing any pending timer named `key`.
    #[inline]
    pub fn debounce(key: TimerKey, delay: Duration, msg: M) -> Self {
        Self::After {
            delay,
            key: Some(key),
            msg,
        }
    }

    /// Deliver `msg` on the next animation frame.
    #[inline]
    pub fn next_frame(msg: M) -> Self {
        Self::NextFrame(msg)
    }

    /// Run `f` after `delay` and deliver its message.
    pub fn task_after<F>(name: &'static str, delay: Duration, f: F) -> Self
    where
        F: FnOnce() -> M + 'static,
    {
        Self::Task(TaskSpec { name, delay }, Box::new(f))
    }

    /// Create a batch of commands.
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds.into_iter().filter(|c| !c.is_none()).collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.pop().unwrap_or(Self::None),
            _ => Self::Batch(cmds),
        }
    }

    /// Whether this is [`Cmd::None`].
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Number of leaf commands (batches flattened).
    #[must_use]
    pub fn count(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Batch(cmds) => cmds.iter().map(Self::count).sum(),
            _ => 1,
        }
    }

    /// Short stable name used in logs.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Batch(_) => "Batch",
            Self::Msg(_) => "Msg",
            Self::After { .. } => "After",
            Self::Cancel(_) => "Cancel",
            Self::NextFrame(_) => "NextFrame",
            Self::Task(..) => "Task",
            Self::Effect(_) => "Effect",
            Self::Log(_) => "Log",
        }
    }
}

impl<M> Default for Cmd<M> {
    fn default() -> Self {
        Self::None
    }
}

impl<M: fmt::Debug> fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::After { delay, key, msg } => f
                .debug_struct("After")
                .field("delay", delay)
                .field("key", key)
                .field("msg", msg)
                .finish(),
            Self::Cancel(key) => f.debug_tuple("Cancel").field(key).finish(),
            Self::NextFrame(m) => f.debug_tuple("NextFrame").field(m).finish(),
            Self::Task(spec, _) => f.debug_tuple("Task").field(spec).finish_non_exhaustive(),
            Self::Effect(e) => f.debug_tuple("Effect").field(e).finish(),
            Self::Log(s) => f.debug_tuple("Log").field(s).finish(),
        }
    }
}
