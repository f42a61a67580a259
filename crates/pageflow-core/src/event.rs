#![forbid(unsafe_code)]

//! Canonical page events.
//!
//! These are the only inputs a page model ever sees. The web host translates
//! DOM listeners (click, submit, blur, input, scroll, resize, popstate and
//! IntersectionObserver callbacks) into these values; tests construct them
//! directly.
//!
//! # Design Notes
//!
//! - Control and element ids refer to entries of the
//!   [`PageLayout`](crate::layout::PageLayout) the host scanned at mount.
//! - Fragments are passed verbatim (`"#places"`, `""`); the model decides
//!   how to interpret an empty one.
//! - Default actions (link navigation, form submission) are always
//!   suppressed by the host; the event is the whole story.

use crate::field::FieldName;
use crate::layout::{ControlId, ElementId};

/// Canonical page event.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Event {
    /// A bound control (link, menu toggle, flag) was clicked.
    Click {
        /// Control that received the click.
        control: ControlId,
    },

    /// The greeting form was submitted.
    Submit,

    /// A form field lost focus.
    FieldBlur {
        /// Field that lost focus.
        field: FieldName,
    },

    /// A form field's value changed through typing.
    FieldInput {
        /// Edited field.
        field: FieldName,
        /// Full current value of the field.
        value: String,
    },

    /// The page scrolled.
    Scroll {
        /// Vertical scroll offset in CSS pixels.
        y: f64,
    },

    /// The viewport was resized.
    Resize {
        /// New inner width in CSS pixels.
        width: u32,
        /// New inner height in CSS pixels.
        height: u32,
    },

    /// Browser history traversal (back/forward) landed on a new address.
    PopState {
        /// The address fragment after traversal, `""` when absent.
        fragment: String,
    },

    /// An observed element's intersection with the viewport changed.
    Intersect {
        /// Observed element.
        element: ElementId,
        /// Visible fraction of the element, `0.0..=1.0`.
        ratio: f64,
    },
}

impl Event {
    /// Short stable name used in logs and traces.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Click { .. } => "click",
            Self::Submit => "submit",
            Self::FieldBlur { .. } => "field_blur",
            Self::FieldInput { .. } => "field_input",
            Self::Scroll { .. } => "scroll",
            Self::Resize { .. } => "resize",
            Self::PopState { .. } => "pop_state",
            Self::Intersect { .. } => "intersect",
        }
    }
}
