#![forbid(unsafe_code)]

//! Greeting form values and validation.
//!
//! Values are trimmed before any rule is checked; lengths count Unicode
//! scalar values. Each field reports at most one problem, the first rule it
//! fails in the order required → email shape → minimum length.

use std::fmt;
use std::sync::LazyLock;

use pageflow_core::{Document, FieldName};
use regex_lite::Regex;

use crate::submit::Greeting;

/// Minimum sender name length.
pub const NAME_MIN_CHARS: usize = 2;
/// Minimum greeting message length.
pub const MESSAGE_MIN_CHARS: usize = 10;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex"));

/// Whether `value` has the `local@domain.tld` shape.
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Why a field value was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldError {
    Required,
    InvalidEmail,
    NameTooShort,
    MessageTooShort,
}

impl FieldError {
    /// Message shown next to the field.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Required => "This field is required",
            Self::InvalidEmail => "Please enter a valid email address",
            Self::NameTooShort => "Name must be at least 2 characters",
            Self::MessageTooShort => "Message must be at least 10 characters",
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Check one raw field value.
pub fn check(field: FieldName, raw: &str) -> Result<(), FieldError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(FieldError::Required);
    }
    if field.is_email() && !is_valid_email(value) {
        return Err(FieldError::InvalidEmail);
    }
    match field {
        FieldName::SenderName if value.chars().count() < NAME_MIN_CHARS => {
            Err(FieldError::NameTooShort)
        }
        FieldName::GreetingMessage if value.chars().count() < MESSAGE_MIN_CHARS => {
            Err(FieldError::MessageTooShort)
        }
        _ => Ok(()),
    }
}

/// Current values and shown errors of the four form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    values: [String; 4],
    errors: [Option<FieldError>; 4],
}

impl FormState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn value(&self, field: FieldName) -> &str {
        &self.values[field.index()]
    }

    #[must_use]
    pub fn error(&self, field: FieldName) -> Option<FieldError> {
        self.errors[field.index()]
    }

    /// Mirror typed input. Clears the field's error without revalidating.
    pub fn edit(&mut self, field: FieldName, value: impl Into<String>) {
        self.values[field.index()] = value.into();
        self.errors[field.index()] = None;
    }

    /// Validate one field (on blur), showing or clearing its error.
    pub fn validate_field(&mut self, field: FieldName) -> bool {
        let result = check(field, self.value(field));
        self.errors[field.index()] = result.err();
        result.is_ok()
    }

    /// Validate every field without short-circuiting.
    pub fn validate_form(&mut self) -> bool {
        let mut valid = true;
        for field in FieldName::ALL {
            valid &= self.validate_field(field);
        }
        valid
    }

    /// Fields currently showing an error, in form order.
    pub fn invalid_fields(&self) -> impl Iterator<Item = FieldName> + '_ {
        FieldName::ALL
            .into_iter()
            .filter(|f| self.errors[f.index()].is_some())
    }

    /// Empty every value and clear every error.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Trimmed values, ready to send.
    #[must_use]
    pub fn greeting(&self) -> Greeting {
        let get = |field| self.value(field).trim().to_owned();
        Greeting {
            sender_name: get(FieldName::SenderName),
            sender_email: get(FieldName::SenderEmail),
            recipient_email: get(FieldName::RecipientEmail),
            message: get(FieldName::GreetingMessage),
        }
    }

    pub fn view(&self, doc: &mut Document) {
        for field in FieldName::ALL {
            let view = doc.field_mut(field);
            view.value.clone_from(&self.values[field.index()]);
            view.error = self.errors[field.index()].map(|e| e.message().to_owned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn filled(name: &str, from: &str, to: &str, message: &str) -> FormState {
        let mut form = FormState::new();
        form.edit(FieldName::SenderName, name);
        form.edit(FieldName::SenderEmail, from);
        form.edit(FieldName::RecipientEmail, to);
        form.edit(FieldName::GreetingMessage, message);
        form
    }

    #[test]
    fn email_shape() {
        for ok in ["a@b.c", "first.last@example.co.uk", "x+y@d.io"] {
            assert!(is_valid_email(ok), "{ok}");
        }
        for bad in ["", "bad-email", "a@b", "a b@c.d", "@b.c", "a@.c", "a@b.", "a@@b.c"] {
            assert!(!is_valid_email(bad), "{bad}");
        }
    }

    #[test]
    fn rule_order_per_field() {
        assert_eq!(check(FieldName::SenderEmail, "   "), Err(FieldError::Required));
        assert_eq!(check(FieldName::SenderEmail, "nope"), Err(FieldError::InvalidEmail));
        assert_eq!(check(FieldName::SenderName, " A "), Err(FieldError::NameTooShort));
        assert_eq!(check(FieldName::SenderName, "Al"), Ok(()));
        assert_eq!(
            check(FieldName::GreetingMessage, "Hi there!"),
            Err(FieldError::MessageTooShort)
        );
        assert_eq!(check(FieldName::GreetingMessage, "Hi there!!"), Ok(()));
    }

    #[test]
    fn lengths_count_chars_not_bytes() {
        assert_eq!(check(FieldName::SenderName, "é"), Err(FieldError::NameTooShort));
        assert_eq!(
            check(FieldName::GreetingMessage, &"ک".repeat(9)),
            Err(FieldError::MessageTooShort)
        );
        assert_eq!(check(FieldName::GreetingMessage, &"ک".repeat(10)), Ok(()));
    }

    #[test]
    fn email_is_checked_after_trim() {
        assert_eq!(check(FieldName::RecipientEmail, "  a@b.c  "), Ok(()));
    }

    #[test]
    fn validate_form_reports_every_field() {
        let mut form = FormState::new();
        assert!(!form.validate_form());
        assert_eq!(form.invalid_fields().count(), 4);
        assert!(
            FieldName::ALL
                .iter()
                .all(|f| form.error(*f) == Some(FieldError::Required))
        );
    }

    #[test]
    fn validate_form_clears_passing_fields() {
        let mut form = FormState::new();
        form.validate_form();
        form.edit(FieldName::SenderName, "Alice");
        form.validate_form();
        assert_eq!(form.error(FieldName::SenderName), None);
    }

    #[test]
    fn edit_clears_error_without_revalidating() {
        let mut form = FormState::new();
        assert!(!form.validate_field(FieldName::SenderEmail));
        form.edit(FieldName::SenderEmail, "still bad");
        assert_eq!(form.error(FieldName::SenderEmail), None);
        assert!(!form.validate_field(FieldName::SenderEmail));
        assert_eq!(form.error(FieldName::SenderEmail), Some(FieldError::InvalidEmail));
    }

    #[test]
    fn greeting_is_trimmed() {
        let form = filled(" Alice ", "a@b.c ", " r@s.t", "  Happy Independence Day ");
        let greeting = form.greeting();
        assert_eq!(greeting.sender_name, "Alice");
        assert_eq!(greeting.recipient_email, "r@s.t");
        assert_eq!(greeting.message, "Happy Independence Day");
    }

    #[test]
    fn reset_empties_everything() {
        let mut form = filled("Al", "bad", "bad", "short");
        form.validate_form();
        form.reset();
        assert_eq!(form, FormState::new());
    }
}
