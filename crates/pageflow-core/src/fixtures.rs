#![forbid(unsafe_code)]

//! Test fixture: the layout of the greeting site used across the test suites.

use crate::layout::{ControlId, ControlRole, PageLayout};

/// Section ids of the demo page, in markup order.
pub const DEMO_SECTIONS: [&str; 5] = ["home", "history", "places", "symbols", "greetings"];

/// Submit label of the demo form.
pub const DEMO_SUBMIT_LABEL: &str = "Send Greeting";

/// Layout of the demo page.
///
/// Controls are laid out as: five primary links, five mobile links, two
/// footer links (`#places`, `#greetings`), the menu toggle, the flag.
/// Elements: three `.hero-card`, two `.place-card`, two `.symbol-card`, two
/// `.timeline-item-full`, and one `.footer-note` nobody observes.
#[must_use]
pub fn demo_layout() -> PageLayout {
    let mut layout = PageLayout::new().with_initial_section(DEMO_SECTIONS[0]);
    for id in &DEMO_SECTIONS[1..] {
        layout = layout.with_section(*id);
    }
    for role in [ControlRole::PrimaryNav, ControlRole::MobileNav] {
        for id in DEMO_SECTIONS {
            layout = layout.with_link(role, &format!("#{id}"));
        }
    }
    layout
        .with_link(ControlRole::FooterNav, "#places")
        .with_link(ControlRole::FooterNav, "#greetings")
        .with_control(ControlRole::MenuToggle, None)
        .with_control(ControlRole::Flag, None)
        .with_element(None, &["card", "hero-card"])
        .with_element(None, &["card", "hero-card"])
        .with_element(None, &["card", "hero-card"])
        .with_element(None, &["place-card"])
        .with_element(None, &["place-card"])
        .with_element(None, &["symbol-card"])
        .with_element(None, &["symbol-card"])
        .with_element(None, &["timeline-item-full"])
        .with_element(None, &["timeline-item-full"])
        .with_element(Some("note"), &["footer-note"])
        .with_greeting_form(DEMO_SUBMIT_LABEL)
        .with_mobile_menu()
        .with_background()
}

/// Control id of the link with `role` targeting `#section`.
///
/// # Panics
///
/// Panics when the demo layout has no such link.
#[must_use]
pub fn demo_link(layout: &PageLayout, role: ControlRole, section: &str) -> ControlId {
    layout
        .find_control(role, Some(&format!("#{section}")))
        .unwrap_or_else(|| panic!("demo layout has no {role:?} link to #{section}"))
}

/// Control id of the control with `role` and no `href`.
///
/// # Panics
///
/// Panics when the demo layout has no such control.
#[must_use]
pub fn demo_control(layout: &PageLayout, role: ControlRole) -> ControlId {
    layout
        .find_control(role, None)
        .unwrap_or_else(|| panic!("demo layout has no {role:?} control"))
}
