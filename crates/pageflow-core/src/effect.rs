#![forbid(unsafe_code)]

//! Side effects that only the host can perform.

/// How a navigation writes the address fragment into browser history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum HistoryMode {
    /// Replace the current history entry (`history.replaceState`).
    #[default]
    Replace,
    /// Push a new entry (`history.pushState`).
    Push,
}

/// A side effect requested by the model, applied by the host in order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum HostEffect {
    /// Write `#fragment` into the address bar.
    SetFragment {
        /// Fragment including the leading `#`.
        fragment: String,
        mode: HistoryMode,
    },
    /// Scroll the viewport to the top.
    ScrollToTop {
        /// Use the smooth scroll behavior.
        smooth: bool,
    },
}
