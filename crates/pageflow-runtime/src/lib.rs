#![forbid(unsafe_code)]

//! Runtime: Elm-style model contract and a host-driven deterministic runner.
//!
//! # Role in pageflow
//! `pageflow-runtime` turns a page [`Model`] into something a browser (or a
//! test) can drive one step at a time. It owns no I/O; time, events and
//! animation frames all arrive from the host.
//!
//! # Primary responsibilities
//! - **Model / Cmd**: the update/view contract and the side effects a model
//!   may request (messages, timers, frames, host effects, logs).
//! - **TimerQueue**: due-ordered timers with keyed replacement (debounce).
//! - **StepProgram**: event queue, timer firing, frame delivery, render and
//!   diff into [`DomPatch`](pageflow_core::DomPatch) lists.
//!
//! # How it fits in the system
//! `pageflow-site` implements [`Model`] for the page controller;
//! `pageflow-web` wraps a [`StepProgram`] and forwards its outputs to the DOM.

pub mod program;
pub mod step_program;
pub mod timer;

pub use program::{Cmd, Model, TaskSpec, TimerKey};
pub use step_program::{ProgramError, StepOutputs, StepProgram, StepResult};
pub use timer::{FiredTimer, TimerPayload, TimerQueue};
