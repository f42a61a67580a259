#![forbid(unsafe_code)]

//! DOM-like presentation state and its minimal diff.
//!
//! A model renders into a fresh [`Document`] built from the page layout; the
//! runtime compares it to the previously presented one and hands the host a
//! list of [`DomPatch`] values. The host never re-renders the page; it only
//! toggles the flags, labels and styles named in the patches.
//!
//! # Invariants
//!
//! 1. Two documents built from the same layout have the same shape, so the
//!    diff is a positional walk.
//! 2. `diff(None, doc)` describes the complete presentation (first present).
//! 3. `diff(Some(a), a)` is empty.

use crate::field::FieldName;
use crate::layout::{ControlId, ElementId, PageLayout};
use crate::section::SectionId;

/// CSS transition applied to every observed element.
pub const REVEAL_TRANSITION: &str = "opacity 0.6s ease, transform 0.6s ease";

/// Entry animation style of an observed element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RevealStyle {
    /// Rise 50px into place.
    SlideInUp,
    /// Slide 50px in from the left.
    ///
    /// The shipped page script hides every observed element with
    /// `translateY(50px)` and ignores the `slideInLeft` name it gives timeline
    /// items. Here the name is honored with a horizontal offset.
    SlideInLeft,
}

impl RevealStyle {
    /// CSS transform while hidden.
    #[must_use]
    pub const fn hidden_transform(self) -> &'static str {
        match self {
            Self::SlideInUp => "translateY(50px)",
            Self::SlideInLeft => "translateX(-50px)",
        }
    }

    /// CSS transform at rest.
    #[must_use]
    pub const fn resting_transform(self) -> &'static str {
        match self {
            Self::SlideInUp => "translateY(0)",
            Self::SlideInLeft => "translateX(0)",
        }
    }
}

/// Where an observed element is in its one-shot reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RevealPhase {
    /// Transparent and offset, waiting to enter the viewport.
    Hidden,
    /// Opaque and at rest. Terminal.
    Revealed,
}

impl RevealPhase {
    /// CSS opacity for this phase.
    #[must_use]
    pub const fn opacity(self) -> &'static str {
        match self {
            Self::Hidden => "0",
            Self::Revealed => "1",
        }
    }

    /// CSS transform for this phase.
    #[must_use]
    pub const fn transform(self, style: RevealStyle) -> &'static str {
        match self {
            Self::Hidden => style.hidden_transform(),
            Self::Revealed => style.resting_transform(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionView {
    pub id: SectionId,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlView {
    pub id: ControlId,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub field: FieldName,
    pub value: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitView {
    pub label: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealView {
    pub element: ElementId,
    /// `None` until the element is observed.
    pub state: Option<(RevealStyle, RevealPhase)>,
}

/// Presentation state of the whole page.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub sections: Vec<SectionView>,
    pub controls: Vec<ControlView>,
    pub mobile_menu_open: bool,
    /// Indexed by [`FieldName::index`].
    pub fields: Vec<FieldView>,
    /// Form-level message (transport failure).
    pub form_error: Option<String>,
    pub submit: SubmitView,
    pub form_visible: bool,
    pub success_visible: bool,
    pub reveals: Vec<RevealView>,
    /// Parallax translation in CSS pixels; `None` until first applied.
    pub background_offset: Option<f64>,
    pub flag_pulsing: bool,
}

impl Document {
    /// Presentation of the static markup before any script runs.
    #[must_use]
    pub fn from_layout(layout: &PageLayout) -> Self {
        let initial = layout.initial_section();
        Self {
            sections: layout
                .sections()
                .iter()
                .map(|id| SectionView {
                    id: id.clone(),
                    visible: Some(id) == initial,
                })
                .collect(),
            controls: layout
                .controls()
                .iter()
                .map(|c| ControlView {
                    id: c.id,
                    active: false,
                })
                .collect(),
            mobile_menu_open: false,
            fields: FieldName::ALL
                .into_iter()
                .map(|field| FieldView {
                    field,
                    value: String::new(),
                    error: None,
                })
                .collect(),
            form_error: None,
            submit: SubmitView {
                label: layout.submit_label().unwrap_or_default().to_owned(),
                disabled: false,
            },
            form_visible: true,
            success_visible: false,
            reveals: layout
                .elements()
                .iter()
                .map(|e| RevealView {
                    element: e.id,
                    state: None,
                })
                .collect(),
            background_offset: None,
            flag_pulsing: layout.has_flag(),
        }
    }

    /// Set the visibility of one section. Unknown ids are ignored.
    pub fn set_section_visible(&mut self, id: &SectionId, visible: bool) {
        if let Some(view) = self.sections.iter_mut().find(|s| &s.id == id) {
            view.visible = visible;
        }
    }

    /// Set the active flag of one control. Unknown ids are ignored.
    pub fn set_control_active(&mut self, id: ControlId, active: bool) {
        if let Some(view) = self.controls.get_mut(id.get() as usize) {
            view.active = active;
        }
    }

    /// Mutable view of one form field.
    pub fn field_mut(&mut self, field: FieldName) -> &mut FieldView {
        &mut self.fields[field.index()]
    }

    /// View of one form field.
    #[must_use]
    pub fn field(&self, field: FieldName) -> &FieldView {
        &self.fields[field.index()]
    }

    /// Set the reveal state of one element. Unknown ids are ignored.
    pub fn set_reveal(&mut self, element: ElementId, style: RevealStyle, phase: RevealPhase) {
        if let Some(view) = self.reveals.get_mut(element.get() as usize) {
            view.state = Some((style, phase));
        }
    }

    /// Ids of visible sections, in markup order.
    #[must_use]
    pub fn visible_sections(&self) -> Vec<&SectionId> {
        self.sections
            .iter()
            .filter(|s| s.visible)
            .map(|s| &s.id)
            .collect()
    }

    /// Whether a control is marked active.
    #[must_use]
    pub fn is_control_active(&self, id: ControlId) -> bool {
        self.controls
            .get(id.get() as usize)
            .is_some_and(|c| c.active)
    }

    /// Reveal phase of an element, `None` when not observed.
    #[must_use]
    pub fn reveal_phase(&self, element: ElementId) -> Option<RevealPhase> {
        self.reveals
            .get(element.get() as usize)
            .and_then(|r| r.state)
            .map(|(_, phase)| phase)
    }

    /// Patches turning `prev` into `next`.
    ///
    /// With no previous document (or a differently shaped one) every piece
    /// of presentation state is emitted.
    #[must_use]
    pub fn diff(prev: Option<&Self>, next: &Self) -> Vec<DomPatch> {
        match prev {
            Some(prev) if prev.same_shape(next) => diff_documents(prev, next),
            _ => full_patch(next),
        }
    }

    /// Apply one patch to this document, as the host applies it to the DOM.
    pub fn apply(&mut self, patch: &DomPatch) {
        match patch {
            DomPatch::SectionVisibility { section, visible } => {
                self.set_section_visible(section, *visible);
            }
            DomPatch::ControlActive { control, active } => {
                self.set_control_active(*control, *active);
            }
            DomPatch::MobileMenu { open } => self.mobile_menu_open = *open,
            DomPatch::FieldValue { field, value } => {
                self.field_mut(*field).value.clone_from(value);
            }
            DomPatch::FieldError { field, message } => {
                self.field_mut(*field).error.clone_from(message);
            }
            DomPatch::FormError { message } => self.form_error.clone_from(message),
            DomPatch::SubmitButton { label, disabled } => {
                self.submit.label.clone_from(label);
                self.submit.disabled = *disabled;
            }
            DomPatch::FormVisibility { visible } => self.form_visible = *visible,
            DomPatch::SuccessVisibility { visible } => self.success_visible = *visible,
            DomPatch::Reveal {
                element,
                style,
                phase,
            } => self.set_reveal(*element, *style, *phase),
            DomPatch::BackgroundOffset { offset_px } => {
                self.background_offset = Some(*offset_px);
            }
            DomPatch::FlagPulse { running } => self.flag_pulsing = *running,
        }
    }

    fn same_shape(&self, other: &Self) -> bool {
        self.sections.len() == other.sections.len()
            && self.controls.len() == other.controls.len()
            && self.reveals.len() == other.reveals.len()
            && self
                .sections
                .iter()
                .zip(&other.sections)
                .all(|(a, b)| a.id == b.id)
    }
}

/// A single change to apply to the live DOM.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "op", rename_all = "snake_case"))]
pub enum DomPatch {
    /// Toggle the `active` class on a section container.
    SectionVisibility { section: SectionId, visible: bool },
    /// Toggle the `active` class on a control.
    ControlActive { control: ControlId, active: bool },
    /// Show or hide the mobile overlay; mirrors onto the toggle.
    MobileMenu { open: bool },
    /// Write an input's value.
    FieldValue { field: FieldName, value: String },
    /// Write (or clear) a field's error slot and border highlight.
    FieldError {
        field: FieldName,
        message: Option<String>,
    },
    /// Write (or clear) the form-level message.
    FormError { message: Option<String> },
    /// Update the submit control.
    SubmitButton { label: String, disabled: bool },
    /// Show or hide the form.
    FormVisibility { visible: bool },
    /// Show or hide the success message.
    SuccessVisibility { visible: bool },
    /// Move an element into a reveal phase.
    Reveal {
        element: ElementId,
        style: RevealStyle,
        phase: RevealPhase,
    },
    /// Translate the background vertically.
    BackgroundOffset { offset_px: f64 },
    /// Run or stop the flag pulse animation.
    FlagPulse { running: bool },
}

impl DomPatch {
    /// Short stable name used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::SectionVisibility { .. } => "section_visibility",
            Self::ControlActive { .. } => "control_active",
            Self::MobileMenu { .. } => "mobile_menu",
            Self::FieldValue { .. } => "field_value",
            Self::FieldError { .. } => "field_error",
            Self::FormError { .. } => "form_error",
            Self::SubmitButton { .. } => "submit_button",
            Self::FormVisibility { .. } => "form_visibility",
            Self::SuccessVisibility { .. } => "success_visibility",
            Self::Reveal { .. } => "reveal",
            Self::BackgroundOffset { .. } => "background_offset",
            Self::FlagPulse { .. } => "flag_pulse",
        }
    }
}

fn full_patch(doc: &Document) -> Vec<DomPatch> {
    let mut patches = Vec::new();
    for s in &doc.sections {
        patches.push(DomPatch::SectionVisibility {
            section: s.id.clone(),
            visible: s.visible,
        });
    }
    for c in &doc.controls {
        patches.push(DomPatch::ControlActive {
            control: c.id,
            active: c.active,
        });
    }
    patches.push(DomPatch::MobileMenu {
        open: doc.mobile_menu_open,
    });
    for f in &doc.fields {
        patches.push(DomPatch::FieldValue {
            field: f.field,
            value: f.value.clone(),
        });
        patches.push(DomPatch::FieldError {
            field: f.field,
            message: f.error.clone(),
        });
    }
    patches.push(DomPatch::FormError {
        message: doc.form_error.clone(),
    });
    patches.push(DomPatch::SubmitButton {
        label: doc.submit.label.clone(),
        disabled: doc.submit.disabled,
    });
    patches.push(DomPatch::FormVisibility {
        visible: doc.form_visible,
    });
    patches.push(DomPatch::SuccessVisibility {
        visible: doc.success_visible,
    });
    for r in &doc.reveals {
        if let Some((style, phase)) = r.state {
            patches.push(DomPatch::Reveal {
                element: r.element,
                style,
                phase,
            });
        }
    }
    if let Some(offset_px) = doc.background_offset {
        patches.push(DomPatch::BackgroundOffset { offset_px });
    }
    patches.push(DomPatch::FlagPulse {
        running: doc.flag_pulsing,
    });
    patches
}

fn diff_documents(prev: &Document, next: &Document) -> Vec<DomPatch> {
    let mut patches = Vec::new();

    // Hide before show so a host applying patches in order never shows two
    // sections at once.
    for (a, b) in prev.sections.iter().zip(&next.sections) {
        if a.visible && !b.visible {
            patches.push(DomPatch::SectionVisibility {
                section: b.id.clone(),
                visible: false,
            });
        }
    }
    for (a, b) in prev.sections.iter().zip(&next.sections) {
        if !a.visible && b.visible {
            patches.push(DomPatch::SectionVisibility {
                section: b.id.clone(),
                visible: true,
            });
        }
    }

    for (a, b) in prev.controls.iter().zip(&next.controls) {
        if a.active != b.active {
            patches.push(DomPatch::ControlActive {
                control: b.id,
                active: b.active,
            });
        }
    }

    if prev.mobile_menu_open != next.mobile_menu_open {
        patches.push(DomPatch::MobileMenu {
            open: next.mobile_menu_open,
        });
    }

    for (a, b) in prev.fields.iter().zip(&next.fields) {
        if a.value != b.value {
            patches.push(DomPatch::FieldValue {
                field: b.field,
                value: b.value.clone(),
            });
        }
        if a.error != b.error {
            patches.push(DomPatch::FieldError {
                field: b.field,
                message: b.error.clone(),
            });
        }
    }

    if prev.form_error != next.form_error {
        patches.push(DomPatch::FormError {
            message: next.form_error.clone(),
        });
    }
    if prev.submit != next.submit {
        patches.push(DomPatch::SubmitButton {
            label: next.submit.label.clone(),
            disabled: next.submit.disabled,
        });
    }
    if prev.form_visible != next.form_visible {
        patches.push(DomPatch::FormVisibility {
            visible: next.form_visible,
        });
    }
    if prev.success_visible != next.success_visible {
        patches.push(DomPatch::SuccessVisibility {
            visible: next.success_visible,
        });
    }

    for (a, b) in prev.reveals.iter().zip(&next.reveals) {
        if a.state != b.state
            && let Some((style, phase)) = b.state
        {
            patches.push(DomPatch::Reveal {
                element: b.element,
                style,
                phase,
            });
        }
    }

    if prev.background_offset != next.background_offset
        && let Some(offset_px) = next.background_offset
    {
        patches.push(DomPatch::BackgroundOffset { offset_px });
    }

    if prev.flag_pulsing != next.flag_pulsing {
        patches.push(DomPatch::FlagPulse {
            running: next.flag_pulsing,
        });
    }

    patches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::demo_layout;
    use pretty_assertions::assert_eq;

    #[test]
    fn from_layout_shows_initial_section_only() {
        let doc = Document::from_layout(&demo_layout());
        assert_eq!(doc.visible_sections(), vec![&SectionId::new("home")]);
        assert!(doc.form_visible);
        assert!(!doc.success_visible);
        assert_eq!(doc.submit.label, "Send Greeting");
        assert!(doc.flag_pulsing);
        assert!(doc.reveals.iter().all(|r| r.state.is_none()));
    }

    #[test]
    fn identical_documents_diff_empty() {
        let doc = Document::from_layout(&demo_layout());
        assert!(Document::diff(Some(&doc), &doc).is_empty());
    }

    #[test]
    fn first_present_is_full() {
        let layout = demo_layout();
        let doc = Document::from_layout(&layout);
        let patches = Document::diff(None, &doc);
        let sections = patches
            .iter()
            .filter(|p| matches!(p, DomPatch::SectionVisibility { .. }))
            .count();
        assert_eq!(sections, layout.sections().len());
        assert!(patches.contains(&DomPatch::FlagPulse { running: true }));
        assert!(
            !patches
                .iter()
                .any(|p| matches!(p, DomPatch::BackgroundOffset { .. }))
        );
    }

    #[test]
    fn section_switch_hides_before_showing() {
        let layout = demo_layout();
        let prev = Document::from_layout(&layout);
        let mut next = prev.clone();
        next.set_section_visible(&SectionId::new("home"), false);
        next.set_section_visible(&SectionId::new("places"), true);

        assert_eq!(
            Document::diff(Some(&prev), &next),
            vec![
                DomPatch::SectionVisibility {
                    section: SectionId::new("home"),
                    visible: false,
                },
                DomPatch::SectionVisibility {
                    section: SectionId::new("places"),
                    visible: true,
                },
            ]
        );
    }

    #[test]
    fn field_and_button_changes() {
        let layout = demo_layout();
        let prev = Document::from_layout(&layout);
        let mut next = prev.clone();
        next.field_mut(FieldName::RecipientEmail).error =
            Some("Please enter a valid email address".to_owned());
        next.submit.disabled = true;
        next.submit.label = "Sending...".to_owned();

        assert_eq!(
            Document::diff(Some(&prev), &next),
            vec![
                DomPatch::FieldError {
                    field: FieldName::RecipientEmail,
                    message: Some("Please enter a valid email address".to_owned()),
                },
                DomPatch::SubmitButton {
                    label: "Sending...".to_owned(),
                    disabled: true,
                },
            ]
        );
    }

    #[test]
    fn reveal_and_background() {
        let layout = demo_layout();
        let prev = Document::from_layout(&layout);
        let mut next = prev.clone();
        next.set_reveal(ElementId::new(0), RevealStyle::SlideInUp, RevealPhase::Hidden);
        next.background_offset = Some(-60.0);

        assert_eq!(
            Document::diff(Some(&prev), &next),
            vec![
                DomPatch::Reveal {
                    element: ElementId::new(0),
                    style: RevealStyle::SlideInUp,
                    phase: RevealPhase::Hidden,
                },
                DomPatch::BackgroundOffset { offset_px: -60.0 },
            ]
        );
    }

    #[test]
    fn reveal_styles_map_to_css() {
        assert_eq!(
            RevealPhase::Hidden.transform(RevealStyle::SlideInUp),
            "translateY(50px)"
        );
        assert_eq!(
            RevealPhase::Revealed.transform(RevealStyle::SlideInLeft),
            "translateX(0)"
        );
        assert_eq!(RevealPhase::Hidden.opacity(), "0");
    }
}
