#![forbid(unsafe_code)]

//! Navigation link binder and the mobile menu.
//!
//! The three link populations of the page (primary navigation, footer links,
//! mobile overlay links) behave alike: a click navigates to the section
//! named by the link's `href`, and every link's active flag tracks whether
//! it points at the current section. They differ only in what happens after
//! the click, which is what [`NavigableControl::follow_up`] expresses.

use pageflow_core::{ControlId, ControlRole, Document, PageLayout, SectionId};

/// Extra work a link does after its click was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    None,
    /// Exclusive highlight among primary links, after a successful navigate.
    HighlightPrimary,
    /// Close the mobile overlay.
    CloseMenu,
}

/// A control that navigates to a section.
pub trait NavigableControl: std::fmt::Debug {
    fn control(&self) -> ControlId;
    fn role(&self) -> ControlRole;
    /// Section named by the `href`, `None` for non-fragment links.
    fn target(&self) -> Option<&SectionId>;
    fn is_active(&self) -> bool;
    fn set_active(&mut self, active: bool);

    fn follow_up(&self) -> FollowUp {
        FollowUp::None
    }

    /// Whether this link points at `section`.
    fn targets(&self, section: &SectionId) -> bool {
        self.target() == Some(section)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct LinkState {
    control: ControlId,
    target: Option<SectionId>,
    active: bool,
}

macro_rules! nav_link {
    ($(#[$meta:meta])* $name:ident, $role:expr, $follow_up:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name(LinkState);

        impl $name {
            #[must_use]
            pub fn new(control: ControlId, target: Option<SectionId>) -> Self {
                Self(LinkState {
                    control,
                    target,
                    active: false,
                })
            }
        }

        impl NavigableControl for $name {
            fn control(&self) -> ControlId {
                self.0.control
            }

            fn role(&self) -> ControlRole {
                $role
            }

            fn target(&self) -> Option<&SectionId> {
                self.0.target.as_ref()
            }

            fn is_active(&self) -> bool {
                self.0.active
            }

            fn set_active(&mut self, active: bool) {
                self.0.active = active;
            }

            fn follow_up(&self) -> FollowUp {
                $follow_up
            }
        }
    };
}

nav_link!(
    /// Desktop navigation link.
    PrimaryNavLink,
    ControlRole::PrimaryNav,
    FollowUp::HighlightPrimary
);
nav_link!(
    /// In-page link in the footer.
    FooterLink,
    ControlRole::FooterNav,
    FollowUp::None
);
nav_link!(
    /// Link inside the mobile overlay.
    MobileNavLink,
    ControlRole::MobileNav,
    FollowUp::CloseMenu
);

/// The mobile overlay: open or closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MobileMenu {
    open: bool,
}

impl MobileMenu {
    #[must_use]
    pub const fn is_open(self) -> bool {
        self.open
    }

    /// Flip the overlay; returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Close the overlay; returns whether it was open.
    pub fn close(&mut self) -> bool {
        std::mem::replace(&mut self.open, false)
    }

    /// Close the overlay when a settled viewport is wider than `breakpoint`.
    pub fn on_resize_settled(&mut self, width: u32, breakpoint: u32) -> bool {
        width > breakpoint && self.close()
    }
}

/// What a clicked control is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickKind {
    /// Index into [`NavBinder::links`].
    Link(usize),
    MenuToggle,
    Flag,
}

/// All navigation controls of the page plus the mobile menu.
#[derive(Debug)]
pub struct NavBinder {
    links: Vec<Box<dyn NavigableControl>>,
    toggle: Option<ControlId>,
    flag: Option<ControlId>,
    menu: MobileMenu,
}

impl NavBinder {
    /// Bind every control of `layout`.
    #[must_use]
    pub fn from_layout(layout: &PageLayout) -> Self {
        let mut links: Vec<Box<dyn NavigableControl>> = Vec::new();
        let mut toggle = None;
        let mut flag = None;
        for spec in layout.controls() {
            let target = spec.target();
            match spec.role {
                ControlRole::PrimaryNav => links.push(Box::new(PrimaryNavLink::new(spec.id, target))),
                ControlRole::FooterNav => links.push(Box::new(FooterLink::new(spec.id, target))),
                ControlRole::MobileNav => links.push(Box::new(MobileNavLink::new(spec.id, target))),
                ControlRole::MenuToggle => {
                    toggle.get_or_insert(spec.id);
                }
                ControlRole::Flag => {
                    flag.get_or_insert(spec.id);
                }
            }
        }
        Self {
            links,
            toggle,
            flag,
            menu: MobileMenu::default(),
        }
    }

    /// Classify a clicked control. `None` for controls this binder does not own.
    #[must_use]
    pub fn classify(&self, control: ControlId) -> Option<ClickKind> {
        if let Some(idx) = self.links.iter().position(|l| l.control() == control) {
            return Some(ClickKind::Link(idx));
        }
        if self.toggle == Some(control) {
            return Some(ClickKind::MenuToggle);
        }
        if self.flag == Some(control) {
            return Some(ClickKind::Flag);
        }
        None
    }

    pub fn links(&self) -> impl Iterator<Item = &dyn NavigableControl> {
        self.links.iter().map(|l| l.as_ref())
    }

    #[must_use]
    pub fn link(&self, idx: usize) -> Option<&dyn NavigableControl> {
        self.links.get(idx).map(|l| l.as_ref())
    }

    /// Mark exactly the links pointing at `section` active.
    ///
    /// Footer links take part too. The shipped page script only highlights
    /// primary and mobile links; matching every population keeps the footer
    /// consistent with the visible section.
    pub fn sync_active(&mut self, section: &SectionId) {
        for link in &mut self.links {
            let active = link.targets(section);
            link.set_active(active);
        }
    }

    /// Make `control` the only active primary link.
    pub fn highlight_primary(&mut self, control: ControlId) {
        for link in &mut self.links {
            if link.role() == ControlRole::PrimaryNav {
                let active = link.control() == control;
                link.set_active(active);
            }
        }
    }

    #[must_use]
    pub fn is_active(&self, control: ControlId) -> bool {
        self.links
            .iter()
            .any(|l| l.control() == control && l.is_active())
    }

    #[must_use]
    pub const fn menu(&self) -> MobileMenu {
        self.menu
    }

    pub fn menu_mut(&mut self) -> &mut MobileMenu {
        &mut self.menu
    }

    pub fn view(&self, doc: &mut Document) {
        for link in &self.links {
            doc.set_control_active(link.control(), link.is_active());
        }
        if let Some(toggle) = self.toggle {
            doc.set_control_active(toggle, self.menu.is_open());
        }
        doc.mobile_menu_open = self.menu.is_open();
    }
}
