#![forbid(unsafe_code)]

//! Named form fields of the greeting form.

use std::fmt;

/// One of the four required fields of the greeting form.
///
/// The wire name is the `name` attribute the markup uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FieldName {
    #[cfg_attr(feature = "serde", serde(rename = "senderName"))]
    SenderName,
    #[cfg_attr(feature = "serde", serde(rename = "senderEmail"))]
    SenderEmail,
    #[cfg_attr(feature = "serde", serde(rename = "recipientEmail"))]
    RecipientEmail,
    #[cfg_attr(feature = "serde", serde(rename = "greetingMessage"))]
    GreetingMessage,
}

impl FieldName {
    /// All fields in form order.
    pub const ALL: [Self; 4] = [
        Self::SenderName,
        Self::SenderEmail,
        Self::RecipientEmail,
        Self::GreetingMessage,
    ];

    /// The markup `name` attribute.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::SenderName => "senderName",
            Self::SenderEmail => "senderEmail",
            Self::RecipientEmail => "recipientEmail",
            Self::GreetingMessage => "greetingMessage",
        }
    }

    /// Look up a field by its markup `name` attribute.
    #[must_use]
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.wire_name() == name)
    }

    /// Whether the field holds an email address.
    #[must_use]
    pub const fn is_email(self) -> bool {
        matches!(self, Self::SenderEmail | Self::RecipientEmail)
    }

    /// Position in [`Self::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::SenderName => 0,
            Self::SenderEmail => 1,
            Self::RecipientEmail => 2,
            Self::GreetingMessage => 3,
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}
