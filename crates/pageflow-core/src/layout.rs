#![forbid(unsafe_code)]

//! The markup contract: what the static page exposes to the controller.
//!
//! A [`PageLayout`] is built once at mount time, either by scanning the live
//! DOM (`pageflow-web`) or with the builder methods (tests). It lists the
//! sections, the clickable controls with their roles and fragment targets,
//! the form fields, and the elements the animator may observe.
//!
//! # Invariants
//!
//! 1. Control ids and element ids are dense and assigned in insertion order.
//! 2. Section ids are unique.
//! 3. [`PageLayout::validate`] passing means every element the controller
//!    unconditionally touches is present; optional decorations (background,
//!    flag) may be absent.

use std::fmt;

use crate::field::FieldName;
use crate::section::SectionId;
use crate::selector::Selector;

/// Identifier of a clickable control, dense from `0` in layout order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ControlId(u32);

impl ControlId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "control#{}", self.0)
    }
}

/// Identifier of an animatable element, dense from `0` in layout order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ElementId(u32);

impl ElementId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

/// What a clickable control does on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ControlRole {
    /// Desktop navigation link (`.nav-link`).
    PrimaryNav,
    /// Footer in-page link (`footer a[href^="#"]`).
    FooterNav,
    /// Link inside the mobile overlay (`.mobile-link`).
    MobileNav,
    /// The hamburger button opening the mobile overlay.
    MenuToggle,
    /// Decorative flag whose pulse restarts on click.
    Flag,
}

impl ControlRole {
    /// Whether the control navigates between sections.
    #[must_use]
    pub const fn is_link(self) -> bool {
        matches!(self, Self::PrimaryNav | Self::FooterNav | Self::MobileNav)
    }
}

/// One clickable control.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlSpec {
    pub id: ControlId,
    pub role: ControlRole,
    /// Raw `href` attribute, present for links.
    pub href: Option<String>,
}

impl ControlSpec {
    /// Section referenced by the `href`, if it is fragment-style.
    #[must_use]
    pub fn target(&self) -> Option<SectionId> {
        self.href.as_deref().and_then(SectionId::from_href)
    }
}

/// One animatable element.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementSpec {
    pub id: ElementId,
    /// Markup `id` attribute, if any.
    pub dom_id: Option<String>,
    /// Markup class list.
    pub classes: Vec<String>,
}

/// Static description of the page markup.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PageLayout {
    sections: Vec<SectionId>,
    initial_section: Option<SectionId>,
    controls: Vec<ControlSpec>,
    fields: Vec<FieldName>,
    elements: Vec<ElementSpec>,
    submit_label: Option<String>,
    has_success_message: bool,
    has_mobile_menu: bool,
    has_background: bool,
}

impl PageLayout {
    /// Create an empty layout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a section (builder pattern).
    #[must_use]
    pub fn with_section(mut self, id: impl Into<SectionId>) -> Self {
        self.push_section(id.into());
        self
    }

    /// Add a section that the markup shows before any script runs.
    #[must_use]
    pub fn with_initial_section(mut self, id: impl Into<SectionId>) -> Self {
        let id = id.into();
        self.initial_section = Some(id.clone());
        self.push_section(id);
        self
    }

    /// Add a control (builder pattern).
    #[must_use]
    pub fn with_control(mut self, role: ControlRole, href: Option<&str>) -> Self {
        self.push_control(role, href.map(str::to_owned));
        self
    }

    /// Add a navigation link of `role` targeting `href` (builder pattern).
    #[must_use]
    pub fn with_link(self, role: ControlRole, href: &str) -> Self {
        self.with_control(role, Some(href))
    }

    /// Add the four greeting form fields, the submit control and the
    /// success-message container.
    #[must_use]
    pub fn with_greeting_form(mut self, submit_label: &str) -> Self {
        for field in FieldName::ALL {
            self.push_field(field);
        }
        self.submit_label = Some(submit_label.to_owned());
        self.has_success_message = true;
        self
    }

    /// Add an animatable element (builder pattern).
    #[must_use]
    pub fn with_element(mut self, dom_id: Option<&str>, classes: &[&str]) -> Self {
        self.push_element(
            dom_id.map(str::to_owned),
            classes.iter().map(|c| (*c).to_owned()).collect(),
        );
        self
    }

    /// Declare the mobile overlay panel (builder pattern).
    #[must_use]
    pub fn with_mobile_menu(mut self) -> Self {
        self.has_mobile_menu = true;
        self
    }

    /// Declare the parallax background element (builder pattern).
    #[must_use]
    pub fn with_background(mut self) -> Self {
        self.has_background = true;
        self
    }

    /// Append a section. Duplicates are kept and reported by [`Self::validate`].
    pub fn push_section(&mut self, id: SectionId) {
        self.sections.push(id);
    }

    /// Mark the section the markup shows initially.
    pub fn set_initial_section(&mut self, id: SectionId) {
        self.initial_section = Some(id);
    }

    /// Append a control and return its id.
    pub fn push_control(&mut self, role: ControlRole, href: Option<String>) -> ControlId {
        let id = ControlId::new(self.controls.len() as u32);
        self.controls.push(ControlSpec { id, role, href });
        id
    }

    /// Declare a form field.
    pub fn push_field(&mut self, field: FieldName) {
        if !self.fields.contains(&field) {
            self.fields.push(field);
        }
    }

    /// Append an animatable element and return its id.
    pub fn push_element(&mut self, dom_id: Option<String>, classes: Vec<String>) -> ElementId {
        let id = ElementId::new(self.elements.len() as u32);
        self.elements.push(ElementSpec {
            id,
            dom_id,
            classes,
        });
        id
    }

    /// Record the submit control and its initial label.
    pub fn set_submit_label(&mut self, label: impl Into<String>) {
        self.submit_label = Some(label.into());
    }

    /// Record whether the success-message container exists.
    pub fn set_success_message(&mut self, present: bool) {
        self.has_success_message = present;
    }

    /// Record whether the mobile overlay exists.
    pub fn set_mobile_menu(&mut self, present: bool) {
        self.has_mobile_menu = present;
    }

    /// Record whether the parallax background exists.
    pub fn set_background(&mut self, present: bool) {
        self.has_background = present;
    }

    /// Sections in markup order.
    #[must_use]
    pub fn sections(&self) -> &[SectionId] {
        &self.sections
    }

    /// Whether a section with this id exists.
    #[must_use]
    pub fn has_section(&self, id: &SectionId) -> bool {
        self.sections.contains(id)
    }

    /// Section the markup shows before the controller runs.
    #[must_use]
    pub fn initial_section(&self) -> Option<&SectionId> {
        self.initial_section.as_ref()
    }

    /// All controls in layout order.
    #[must_use]
    pub fn controls(&self) -> &[ControlSpec] {
        &self.controls
    }

    /// Look up a control.
    #[must_use]
    pub fn control(&self, id: ControlId) -> Option<&ControlSpec> {
        self.controls.get(id.get() as usize)
    }

    /// First control with `role` whose `href` equals `href`.
    #[must_use]
    pub fn find_control(&self, role: ControlRole, href: Option<&str>) -> Option<ControlId> {
        self.controls
            .iter()
            .find(|c| c.role == role && c.href.as_deref() == href)
            .map(|c| c.id)
    }

    /// Declared form fields.
    #[must_use]
    pub fn fields(&self) -> &[FieldName] {
        &self.fields
    }

    /// Animatable elements in layout order.
    #[must_use]
    pub fn elements(&self) -> &[ElementSpec] {
        &self.elements
    }

    /// Elements matched by `selector`, in layout order.
    pub fn elements_matching<'a>(
        &'a self,
        selector: &'a Selector,
    ) -> impl Iterator<Item = &'a ElementSpec> + 'a {
        self.elements.iter().filter(move |e| selector.matches(e))
    }

    /// Initial label of the submit control.
    #[must_use]
    pub fn submit_label(&self) -> Option<&str> {
        self.submit_label.as_deref()
    }

    #[must_use]
    pub const fn has_success_message(&self) -> bool {
        self.has_success_message
    }

    #[must_use]
    pub const fn has_mobile_menu(&self) -> bool {
        self.has_mobile_menu
    }

    #[must_use]
    pub const fn has_background(&self) -> bool {
        self.has_background
    }

    /// Whether a flag control is present.
    #[must_use]
    pub fn has_flag(&self) -> bool {
        self.controls.iter().any(|c| c.role == ControlRole::Flag)
    }

    /// Check that every required piece of markup is present.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.sections.is_empty() {
            return Err(LayoutError::NoSections);
        }
        for (idx, id) in self.sections.iter().enumerate() {
            if self.sections[..idx].contains(id) {
                return Err(LayoutError::DuplicateSection(id.clone()));
            }
        }
        if let Some(initial) = &self.initial_section
            && !self.sections.contains(initial)
        {
            return Err(LayoutError::UnknownInitialSection(initial.clone()));
        }
        for (idx, control) in self.controls.iter().enumerate() {
            if control.id.get() as usize != idx {
                return Err(LayoutError::ControlIdOutOfOrder(control.id));
            }
        }
        for (idx, element) in self.elements.iter().enumerate() {
            if element.id.get() as usize != idx {
                return Err(LayoutError::ElementIdOutOfOrder(element.id));
            }
        }
        for field in FieldName::ALL {
            if !self.fields.contains(&field) {
                return Err(LayoutError::MissingField(field));
            }
        }
        if self.submit_label.is_none() {
            return Err(LayoutError::MissingSubmitControl);
        }
        if !self.has_success_message {
            return Err(LayoutError::MissingSuccessMessage);
        }
        if !self.has_mobile_menu {
            return Err(LayoutError::MissingMobileMenu);
        }
        if !self
            .controls
            .iter()
            .any(|c| c.role == ControlRole::MenuToggle)
        {
            return Err(LayoutError::MissingMenuToggle);
        }
        Ok(())
    }
}

/// Required markup that a [`PageLayout`] lacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// No `.section` containers at all.
    NoSections,
    /// Two sections share an id.
    DuplicateSection(SectionId),
    /// The initially visible section is not a declared section.
    UnknownInitialSection(SectionId),
    /// Control ids are not dense in layout order.
    ControlIdOutOfOrder(ControlId),
    /// Element ids are not dense in layout order.
    ElementIdOutOfOrder(ElementId),
    /// A required form field is absent.
    MissingField(FieldName),
    /// The form has no submit control.
    MissingSubmitControl,
    /// The success-message container is absent.
    MissingSuccessMessage,
    /// The mobile overlay panel is absent.
    MissingMobileMenu,
    /// The mobile menu toggle is absent.
    MissingMenuToggle,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSections => write!(f, "page has no sections"),
            Self::DuplicateSection(id) => write!(f, "duplicate section id: {id}"),
            Self::UnknownInitialSection(id) => {
                write!(f, "initial section {id} is not a declared section")
            }
            Self::ControlIdOutOfOrder(id) => write!(f, "{id} is out of layout order"),
            Self::ElementIdOutOfOrder(id) => write!(f, "{id} is out of layout order"),
            Self::MissingField(field) => write!(f, "form field {field} is missing"),
            Self::MissingSubmitControl => write!(f, "form submit control is missing"),
            Self::MissingSuccessMessage => write!(f, "success message container is missing"),
            Self::MissingMobileMenu => write!(f, "mobile menu overlay is missing"),
            Self::MissingMenuToggle => write!(f, "mobile menu toggle is missing"),
        }
    }
}

impl std::error::Error for LayoutError {}
