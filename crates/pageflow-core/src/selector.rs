#![forbid(unsafe_code)]

//! Minimal selectors for picking animatable elements.
//!
//! Only the two forms the page script needs are supported: `.class` and
//! `#id`. Anything else fails to parse rather than silently matching nothing.

use std::fmt;

use crate::layout::ElementSpec;

/// A single-token element selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub enum Selector {
    /// `.name`: elements whose class list contains `name`.
    Class(String),
    /// `#name`: the element whose id is `name`.
    Id(String),
}

impl Selector {
    /// Parse `.class` or `#id`.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SelectorError::Empty);
        }
        let (kind, name) = input
            .split_at_checked(1)
            .ok_or_else(|| SelectorError::Unsupported(input.to_owned()))?;
        if name.is_empty() {
            return Err(SelectorError::Empty);
        }
        if name
            .chars()
            .any(|c| !(c.is_alphanumeric() || c == '-' || c == '_'))
        {
            return Err(SelectorError::Unsupported(input.to_owned()));
        }
        match kind {
            "." => Ok(Self::Class(name.to_owned())),
            "#" => Ok(Self::Id(name.to_owned())),
            _ => Err(SelectorError::Unsupported(input.to_owned())),
        }
    }

    /// Whether `element` is selected.
    #[must_use]
    pub fn matches(&self, element: &ElementSpec) -> bool {
        match self {
            Self::Class(name) => element.classes.iter().any(|c| c == name),
            Self::Id(name) => element.dom_id.as_deref() == Some(name.as_str()),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(name) => write!(f, ".{name}"),
            Self::Id(name) => write!(f, "#{name}"),
        }
    }
}

impl TryFrom<String> for Selector {
    type Error = SelectorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Selector> for String {
    fn from(value: Selector) -> Self {
        value.to_string()
    }
}

/// Why a selector string was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    /// Nothing after the leading `.` / `#`.
    Empty,
    /// Compound, descendant, attribute or tag selectors.
    Unsupported(String),
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty selector"),
            Self::Unsupported(s) => write!(f, "unsupported selector: {s}"),
        }
    }
}

impl std::error::Error for SelectorError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::ElementId;

    fn element(dom_id: Option<&str>, classes: &[&str]) -> ElementSpec {
        ElementSpec {
            id: ElementId::new(0),
            dom_id: dom_id.map(str::to_owned),
            classes: classes.iter().map(|c| (*c).to_owned()).collect(),
        }
    }

    #[test]
    fn parses_class_and_id() {
        assert_eq!(
            Selector::parse(".hero-card"),
            Ok(Selector::Class("hero-card".to_owned()))
        );
        assert_eq!(
            Selector::parse("#flag"),
            Ok(Selector::Id("flag".to_owned()))
        );
    }

    #[test]
    fn rejects_unsupported_forms() {
        assert_eq!(Selector::parse(""), Err(SelectorError::Empty));
        assert_eq!(Selector::parse("."), Err(SelectorError::Empty));
        assert!(matches!(
            Selector::parse("div"),
            Err(SelectorError::Unsupported(_))
        ));
        assert!(matches!(
            Selector::parse(".a .b"),
            Err(SelectorError::Unsupported(_))
        ));
        assert!(matches!(
            Selector::parse("footer a[href^=\"#\"]"),
            Err(SelectorError::Unsupported(_))
        ));
    }

    #[test]
    fn matching() {
        let card = element(None, &["card", "hero-card"]);
        assert!(Selector::parse(".hero-card").unwrap().matches(&card));
        assert!(!Selector::parse(".place-card").unwrap().matches(&card));

        let flag = element(Some("flag"), &[]);
        assert!(Selector::parse("#flag").unwrap().matches(&flag));
        assert!(!Selector::parse("#flag").unwrap().matches(&card));
    }

    #[test]
    fn display_round_trips() {
        for raw in [".timeline-item-full", "#home"] {
            assert_eq!(Selector::parse(raw).unwrap().to_string(), raw);
        }
    }
}
