//! Declarative validation rules.

use crate::store::LookupKey;

/// A named check applied to one non-blank value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Any text. Cells always arrive as text so this only documents intent.
    Text,
    MaxLength(usize),
    MinLength(usize),
    Email,
    Integer,
    Date,
    BeforeToday,
    /// No stored record may already hold the value.
    Unique(LookupKey),
    /// A stored record must hold the value.
    Exists(LookupKey),
    /// The value is a user id whose owner is old enough to publish.
    AdultUser,
}

impl Check {
    /// Checks that consult the store. They run after every format check passed.
    pub fn needs_store(&self) -> bool {
        matches!(self, Self::Unique(_) | Self::Exists(_) | Self::AdultUser)
    }

    /// Stock message for a failure on the field labelled `label`.
    pub fn default_message(&self, label: &str) -> String {
        match self {
            Self::Text => format!("The {label} must be a string."),
            Self::MaxLength(n) => format!("The {label} must not be greater than {n} characters."),
            Self::MinLength(n) => format!("The {label} must be at least {n} characters."),
            Self::Email => format!("The {label} must be a valid email address."),
            Self::Integer => format!("The {label} must be an integer."),
            Self::Date => format!("The {label} is not a valid date."),
            Self::BeforeToday => format!("The {label} must be a date before today."),
            Self::Unique(_) => format!("The {label} has already been taken."),
            Self::Exists(_) => format!("The selected {label} is invalid."),
            Self::AdultUser => "The user must be at least 18 years old to create a post.".into(),
        }
    }
}

/// Whether a blank value is acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    Nullable,
}

/// A check with an optional message override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub check: Check,
    pub message: Option<&'static str>,
}

/// The rules for one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRules {
    pub field: &'static str,
    pub presence: Presence,
    pub required_message: Option<&'static str>,
    pub rules: Vec<Rule>,
}

impl FieldRules {
    pub fn required(field: &'static str) -> Self {
        Self::with_presence(field, Presence::Required)
    }

    pub fn nullable(field: &'static str) -> Self {
        Self::with_presence(field, Presence::Nullable)
    }

    fn with_presence(field: &'static str, presence: Presence) -> Self {
        Self {
            field,
            presence,
            required_message: None,
            rules: Vec::new(),
        }
    }

    /// Append a check.
    pub fn check(mut self, check: Check) -> Self {
        self.rules.push(Rule {
            check,
            message: None,
        });
        self
    }

    /// Override the message of the most recently added check, or of the
    /// presence requirement when no check has been added yet.
    pub fn message(mut self, message: &'static str) -> Self {
        match self.rules.last_mut() {
            Some(rule) => rule.message = Some(message),
            None => self.required_message = Some(message),
        }
        self
    }

    /// Human label, e.g. `date of birth` for `date_of_birth`.
    pub fn label(&self) -> String {
        self.field.replace('_', " ")
    }

    pub fn required_failure(&self) -> String {
        self.required_message
            .map(str::to_string)
            .unwrap_or_else(|| format!("The {} field is required.", self.label()))
    }

    pub fn failure(&self, rule: &Rule) -> String {
        rule.message
            .map(str::to_string)
            .unwrap_or_else(|| rule.check.default_message(&self.label()))
    }
}

/// The ordered rules for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    pub entity: &'static str,
    pub fields: Vec<FieldRules>,
}

impl RuleTable {
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, rules: FieldRules) -> Self {
        self.fields.push(rules);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldRules> {
        self.fields.iter().find(|rules| rules.field == field)
    }

    /// Column names in declaration order.
    pub fn columns(&self) -> Vec<&'static str> {
        self.fields.iter().map(|rules| rules.field).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_overrides_attach_to_latest_check() {
        let rules = FieldRules::required("email")
            .message("Email please.")
            .check(Check::Email)
            .check(Check::Unique(LookupKey::UserEmail))
            .message("Taken.");

        assert_eq!(rules.required_failure(), "Email please.");
        assert_eq!(rules.failure(&rules.rules[0]), "The email must be a valid email address.");
        assert_eq!(rules.failure(&rules.rules[1]), "Taken.");
    }

    #[test]
    fn test_default_messages_use_label() {
        let rules = FieldRules::required("date_of_birth").check(Check::MaxLength(10));
        assert_eq!(rules.required_failure(), "The date of birth field is required.");
        assert_eq!(
            rules.failure(&rules.rules[0]),
            "The date of birth must not be greater than 10 characters."
        );
    }

    #[test]
    fn test_store_checks() {
        assert!(Check::Unique(LookupKey::PostTitle).needs_store());
        assert!(Check::AdultUser.needs_store());
        assert!(!Check::Integer.needs_store());
    }
}
