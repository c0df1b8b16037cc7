//! Validation gate: explicit per-entity field rules.
//!
//! Every entity that can be persisted implements [`Validatable`]. A single
//! [`validate`] pass collects *all* violations; [`ensure_valid`] turns a
//! non-empty set into [`CoreError::Validation`].

use serde::{Deserialize, Serialize};
use validator::{ValidateEmail, ValidateLength, ValidateRange};

use crate::error::CoreError;

/// A single field-level rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub rule: String,
    pub message: String,
}

/// Rule identifiers reported in [`FieldViolation::rule`].
pub mod rules {
    pub const REQUIRED: &str = "required";
    pub const NOT_BLANK: &str = "not_blank";
    pub const MAX_LENGTH: &str = "max_length";
    pub const RANGE: &str = "range";
    pub const NON_NEGATIVE: &str = "non_negative";
    pub const EMAIL: &str = "email";
}

/// Accumulator handed to [`Validatable::collect_violations`].
///
/// Each check records a violation and keeps going; nothing short-circuits.
#[derive(Debug, Default)]
pub struct Violations {
    items: Vec<FieldViolation>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, rule: &str, message: impl Into<String>) -> &mut Self {
        self.items.push(FieldViolation {
            field: field.to_string(),
            rule: rule.to_string(),
            message: message.into(),
        });
        self
    }

    pub fn not_blank(&mut self, field: &str, value: &str) -> &mut Self {
        if value.trim().is_empty() {
            self.push(field, rules::NOT_BLANK, format!("{field} must not be blank"));
        }
        self
    }

    pub fn max_length(&mut self, field: &str, value: &str, max: u64) -> &mut Self {
        if !value.validate_length(None, Some(max), None) {
            self.push(
                field,
                rules::MAX_LENGTH,
                format!("{field} must be at most {max} characters"),
            );
        }
        self
    }

    pub fn required<T>(&mut self, field: &str, value: &Option<T>) -> &mut Self {
        if value.is_none() {
            self.push(field, rules::REQUIRED, format!("{field} is required"));
        }
        self
    }

    pub fn range(&mut self, field: &str, value: i32, min: i32, max: i32) -> &mut Self {
        if !value.validate_range(Some(min), Some(max), None, None) {
            self.push(
                field,
                rules::RANGE,
                format!("{field} must be between {min} and {max}"),
            );
        }
        self
    }

    pub fn non_negative(&mut self, field: &str, value: f64) -> &mut Self {
        if !value.is_finite() || value < 0.0 {
            self.push(
                field,
                rules::NON_NEGATIVE,
                format!("{field} must be zero or greater"),
            );
        }
        self
    }

    pub fn email(&mut self, field: &str, value: &str) -> &mut Self {
        if !value.trim().is_empty() && !value.validate_email() {
            self.push(field, rules::EMAIL, format!("{field} must be a valid email address"));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<FieldViolation> {
        self.items
    }
}

/// An entity with declared field constraints.
pub trait Validatable {
    /// Entity name used in [`CoreError::Validation`].
    const ENTITY: &'static str;

    fn collect_violations(&self, violations: &mut Violations);
}

/// Run every rule for `entity` and return the complete violation set.
pub fn validate<T: Validatable>(entity: &T) -> Vec<FieldViolation> {
    let mut violations = Violations::new();
    entity.collect_violations(&mut violations);
    violations.into_vec()
}

/// Like [`validate`], but a non-empty set becomes a typed failure.
pub fn ensure_valid<T: Validatable>(entity: &T) -> Result<(), CoreError> {
    let violations = validate(entity);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation {
            entity: T::ENTITY,
            violations,
        })
    }
}
