//! Rule-set validators for the request models.
//!
//! A validator evaluates every rule it was configured with and reports the
//! union of the failures. Invalid input is never an error: callers receive a
//! `ValidationResult` and decide how to render it.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

pub mod auth;
pub mod rules;
pub mod user;

pub use auth::AuthModelValidator;
pub use user::{UnknownUserRule, UserModelValidator, UserRule, UserRuleSet};

/// ValidationFailure
///
/// A single failed rule. `property` is the PascalCase field path, with nested
/// models joined by a dot (e.g. `Auth.Roles`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ValidationFailure {
    pub property: String,
    pub message: String,
}

impl ValidationFailure {
    pub fn new(property: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            message: message.into(),
        }
    }
}

/// ValidationResult
///
/// Outcome of running a validator against one model instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationFailure>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::valid()
    }
}

impl ValidationResult {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    /// Records a failure if `failure` is `Some`.
    pub fn check(&mut self, failure: Option<ValidationFailure>) {
        if let Some(failure) = failure {
            self.is_valid = false;
            self.errors.push(failure);
        }
    }

    /// Appends every failure of `other`.
    pub fn merge(&mut self, other: ValidationResult) {
        self.is_valid &= other.is_valid;
        self.errors.extend(other.errors);
    }

    /// Re-roots the failures of a child validator under `prefix`.
    pub fn nested(self, prefix: &str) -> Self {
        let errors = self
            .errors
            .into_iter()
            .map(|failure| ValidationFailure {
                property: format!("{prefix}.{}", failure.property),
                message: failure.message,
            })
            .collect();

        Self {
            is_valid: self.is_valid,
            errors,
        }
    }

    /// True when some failure names `property` exactly.
    pub fn has_error_for(&self, property: &str) -> bool {
        self.errors.iter().any(|failure| failure.property == property)
    }
}

/// Validator
///
/// Contract shared by every rule-set validator.
pub trait Validator<T> {
    fn validate(&self, instance: &T) -> ValidationResult;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_is_union_of_failures() {
        let mut result = ValidationResult::valid();
        result.check(Some(ValidationFailure::new("Login", "bad")));

        let mut other = ValidationResult::valid();
        other.check(None);
        other.check(Some(ValidationFailure::new("Password", "bad")));

        result.merge(other);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 2);
        assert!(result.has_error_for("Password"));
    }

    #[test]
    fn nested_prefixes_properties() {
        let mut child = ValidationResult::valid();
        child.check(Some(ValidationFailure::new("Roles", "bad")));

        let nested = child.nested("Auth");
        assert!(nested.has_error_for("Auth.Roles"));
        assert!(!nested.has_error_for("Roles"));
    }

    #[test]
    fn result_serializes_camel_case() {
        let json = serde_json::to_string(&ValidationResult::valid()).unwrap();
        assert_eq!(json, r#"{"isValid":true,"errors":[]}"#);
    }
}
