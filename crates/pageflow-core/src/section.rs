#![forbid(unsafe_code)]

//! Section identifiers and the `#fragment` address convention.

use std::fmt;

/// Identifier of one logical page section (the markup element id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SectionId(String);

impl SectionId {
    /// Create a section id from its bare name (no leading `#`).
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse an address fragment or link target.
    ///
    /// Accepts `#places` or `places`. Returns `None` for an empty fragment
    /// (`""` or `"#"`), which callers treat as "use the home section".
    #[must_use]
    pub fn from_fragment(fragment: &str) -> Option<Self> {
        let bare = fragment.strip_prefix('#').unwrap_or(fragment);
        if bare.is_empty() {
            None
        } else {
            Some(Self(bare.to_owned()))
        }
    }

    /// Parse a link `href` that must be fragment-style (`#id`).
    ///
    /// Returns `None` for anything that is not an in-page reference.
    #[must_use]
    pub fn from_href(href: &str) -> Option<Self> {
        href.strip_prefix('#').and_then(Self::from_fragment)
    }

    /// Bare id.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Address fragment form, `#id`.
    #[must_use]
    pub fn fragment(&self) -> String {
        format!("#{}", self.0)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SectionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl PartialEq<str> for SectionId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for SectionId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
