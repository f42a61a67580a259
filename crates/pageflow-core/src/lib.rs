#![forbid(unsafe_code)]

//! Core: canonical page events, the markup contract, and the DOM-like
//! document model for pageflow.
//!
//! # Role in pageflow
//! `pageflow-core` is the vocabulary layer. It owns the identifiers that the
//! markup exposes (sections, controls, form fields, animatable elements), the
//! [`Event`](event::Event) values a host pushes in, and the
//! [`Document`](document::Document) a model renders out.
//!
//! # Primary responsibilities
//! - **Event**: canonical browser events (click, submit, blur, input, scroll,
//!   resize, popstate, intersection).
//! - **PageLayout**: what the markup provides, validated up front.
//! - **Document / DomPatch**: presentation state and its minimal diff.
//! - **HostEffect**: side effects only the host can perform (history, scroll).
//! - **DeterministicClock**: host-advanced monotonic time.
//!
//! # How it fits in the system
//! The runtime (`pageflow-runtime`) consumes `Event` values, drives a model,
//! and diffs successive `Document`s into `DomPatch` lists that the web host
//! (`pageflow-web`) applies to the live DOM.

pub mod clock;
pub mod document;
pub mod effect;
pub mod event;
pub mod field;
pub mod layout;
pub mod section;
pub mod selector;

#[cfg(any(test, feature = "test-helpers"))]
pub mod fixtures;

pub use clock::DeterministicClock;
pub use document::{Document, DomPatch, REVEAL_TRANSITION, RevealPhase, RevealStyle};
pub use effect::{HistoryMode, HostEffect};
pub use event::Event;
pub use field::FieldName;
pub use layout::{ControlId, ControlRole, ControlSpec, ElementId, ElementSpec, LayoutError, PageLayout};
pub use section::SectionId;
pub use selector::Selector;
