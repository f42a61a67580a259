#![forbid(unsafe_code)]

//! View router: exactly one visible section and the current-section pointer.
//!
//! # Invariants
//!
//! 1. After a navigation to a known section, that section is the only
//!    visible one and it is the current section.
//! 2. A navigation to an unknown id changes nothing.
//! 3. Navigating to the current section again leaves the same state.

use pageflow_core::{Document, HistoryMode, HostEffect, PageLayout, SectionId};

/// Where a navigation request came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOrigin {
    /// A navigation link was clicked.
    Link,
    /// Browser back/forward; the address already shows the target.
    History,
    /// Script asked for it.
    Programmatic,
    /// The address fragment read at page load.
    Initial,
}

/// Result of [`ViewRouter::navigate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The target is now the only visible section.
    Shown {
        target: SectionId,
        previous: Option<SectionId>,
    },
    /// No section has this id; nothing changed.
    Unknown(SectionId),
}

impl Navigation {
    #[must_use]
    pub fn is_shown(&self) -> bool {
        matches!(self, Self::Shown { .. })
    }

    /// Host effects that follow this navigation.
    ///
    /// Link and programmatic navigations write the fragment and scroll to
    /// the top. History traversal only scrolls, and the initial navigation
    /// does neither since the page was just loaded at that address.
    #[must_use]
    pub fn effects(&self, origin: NavOrigin, mode: HistoryMode) -> Vec<HostEffect> {
        let Self::Shown { target, .. } = self else {
            return Vec::new();
        };
        match origin {
            NavOrigin::Link | NavOrigin::Programmatic => vec![
                HostEffect::ScrollToTop { smooth: true },
                HostEffect::SetFragment {
                    fragment: target.fragment(),
                    mode,
                },
            ],
            NavOrigin::History => vec![HostEffect::ScrollToTop { smooth: true }],
            NavOrigin::Initial => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SectionSlot {
    id: SectionId,
    visible: bool,
}

/// Section visibility and the current-section pointer.
#[derive(Debug, Clone)]
pub struct ViewRouter {
    sections: Vec<SectionSlot>,
    current: Option<SectionId>,
}

impl ViewRouter {
    /// Router over the layout's sections, showing what the markup shows.
    #[must_use]
    pub fn new(layout: &PageLayout) -> Self {
        let initial = layout.initial_section();
        Self {
            sections: layout
                .sections()
                .iter()
                .map(|id| SectionSlot {
                    id: id.clone(),
                    visible: Some(id) == initial,
                })
                .collect(),
            current: initial.cloned(),
        }
    }

    /// Show `target` and hide every other section.
    pub fn navigate(&mut self, target: &SectionId) -> Navigation {
        if !self.has_section(target) {
            tracing::debug!(target: "pageflow.site", section = %target, "navigation to unknown section ignored");
            return Navigation::Unknown(target.clone());
        }
        for slot in &mut self.sections {
            slot.visible = &slot.id == target;
        }
        let previous = self.current.replace(target.clone());
        tracing::debug!(
            target: "pageflow.site",
            section = %target,
            previous = previous.as_ref().map(SectionId::as_str),
            "navigated"
        );
        Navigation::Shown {
            target: target.clone(),
            previous,
        }
    }

    /// Section named by an address fragment.
    ///
    /// An empty fragment or one naming no section resolves to `home`.
    #[must_use]
    pub fn resolve_fragment(&self, fragment: &str, home: &SectionId) -> SectionId {
        SectionId::from_fragment(fragment)
            .filter(|id| self.has_section(id))
            .unwrap_or_else(|| home.clone())
    }

    #[must_use]
    pub fn current(&self) -> Option<&SectionId> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn has_section(&self, id: &SectionId) -> bool {
        self.sections.iter().any(|s| &s.id == id)
    }

    #[must_use]
    pub fn is_visible(&self, id: &SectionId) -> bool {
        self.sections.iter().any(|s| &s.id == id && s.visible)
    }

    /// Visible sections, in markup order.
    pub fn visible_sections(&self) -> impl Iterator<Item = &SectionId> {
        self.sections.iter().filter(|s| s.visible).map(|s| &s.id)
    }

    pub fn view(&self, doc: &mut Document) {
        for slot in &self.sections {
            doc.set_section_visible(&slot.id, slot.visible);
        }
    }
}
