#![forbid(unsafe_code)]

//! Entry reveals, background parallax and the flag pulse.

use pageflow_core::{Document, ElementId, PageLayout, RevealPhase, RevealStyle, Selector};

/// One-shot reveal of observed elements on viewport entry.
///
/// An observed element starts [`RevealPhase::Hidden`] and moves to
/// [`RevealPhase::Revealed`] the first time it is reported visible at or
/// above the threshold. It never goes back.
#[derive(Debug, Clone)]
pub struct RevealObserver {
    threshold: f64,
    states: Vec<Option<(RevealStyle, RevealPhase)>>,
}

impl RevealObserver {
    #[must_use]
    pub fn new(layout: &PageLayout, threshold: f64) -> Self {
        Self {
            threshold,
            states: vec![None; layout.elements().len()],
        }
    }

    /// Hide every element matching `selector` until it enters the viewport.
    ///
    /// Elements already observed keep their first style. Returns how many
    /// elements started being observed.
    pub fn observe(&mut self, layout: &PageLayout, selector: &Selector, style: RevealStyle) -> usize {
        let mut added = 0;
        for element in layout.elements_matching(selector) {
            if let Some(slot) = self.states.get_mut(element.id.get() as usize)
                && slot.is_none()
            {
                *slot = Some((style, RevealPhase::Hidden));
                added += 1;
            }
        }
        tracing::trace!(target: "pageflow.site", %selector, added, "observing");
        added
    }

    /// Intersection report. Returns whether the element was revealed now.
    pub fn intersect(&mut self, element: ElementId, ratio: f64) -> bool {
        let Some(Some((_, phase))) = self.states.get_mut(element.get() as usize) else {
            return false;
        };
        if *phase == RevealPhase::Revealed || !(ratio > 0.0 && ratio >= self.threshold) {
            return false;
        }
        *phase = RevealPhase::Revealed;
        true
    }

    #[must_use]
    pub fn phase(&self, element: ElementId) -> Option<RevealPhase> {
        self.states
            .get(element.get() as usize)
            .copied()
            .flatten()
            .map(|(_, phase)| phase)
    }

    /// Observed elements, in layout order.
    pub fn observed(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_some())
            .map(|(idx, _)| ElementId::new(idx as u32))
    }

    pub fn view(&self, doc: &mut Document) {
        for (idx, state) in self.states.iter().enumerate() {
            if let Some((style, phase)) = *state {
                doc.set_reveal(ElementId::new(idx as u32), style, phase);
            }
        }
    }
}

/// Frame-throttled background parallax.
#[derive(Debug, Clone, PartialEq)]
pub struct Parallax {
    factor: f64,
    enabled: bool,
    scroll_y: f64,
    frame_pending: bool,
    offset: Option<f64>,
}

impl Parallax {
    /// `enabled` is whether the page has a background to move.
    #[must_use]
    pub fn new(factor: f64, enabled: bool) -> Self {
        Self {
            factor,
            enabled,
            scroll_y: 0.0,
            frame_pending: false,
            offset: None,
        }
    }

    /// Record a scroll position. Returns whether a frame must be requested.
    pub fn on_scroll(&mut self, y: f64) -> bool {
        if !y.is_finite() {
            tracing::warn!(target: "pageflow.site", y, "non-finite scroll offset ignored");
            return false;
        }
        self.scroll_y = y;
        if self.frame_pending {
            return false;
        }
        self.frame_pending = true;
        true
    }

    /// Animation frame callback. The offset follows the latest scroll
    /// position only while `home_is_current`.
    pub fn on_frame(&mut self, home_is_current: bool) {
        self.frame_pending = false;
        if self.enabled && home_is_current {
            self.offset = Some(self.scroll_y * self.factor);
        }
    }

    #[must_use]
    pub const fn frame_pending(&self) -> bool {
        self.frame_pending
    }

    #[must_use]
    pub const fn offset(&self) -> Option<f64> {
        self.offset
    }

    pub fn view(&self, doc: &mut Document) {
        doc.background_offset = self.offset;
    }
}

/// The flag's pulse animation, restarted on click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlagPulse {
    present: bool,
    running: bool,
}

impl FlagPulse {
    #[must_use]
    pub const fn new(present: bool) -> Self {
        Self {
            present,
            running: present,
        }
    }

    /// Stop the pulse. Returns whether a restart must be scheduled.
    pub fn stop(&mut self) -> bool {
        if !self.present {
            return false;
        }
        self.running = false;
        true
    }

    pub fn restart(&mut self) {
        self.running = self.present;
    }

    #[must_use]
    pub const fn is_running(self) -> bool {
        self.running
    }

    pub fn view(&self, doc: &mut Document) {
        doc.flag_pulsing = self.running;
    }
}
