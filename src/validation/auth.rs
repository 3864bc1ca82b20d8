use crate::models::AuthModel;

use super::{ValidationResult, Validator, rules::not_empty};

/// AuthModelValidator
///
/// Login, password and roles must all be populated. Every rule is always
/// evaluated, so a blank model reports three failures.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthModelValidator;

impl Validator<AuthModel> for AuthModelValidator {
    fn validate(&self, instance: &AuthModel) -> ValidationResult {
        let mut result = ValidationResult::valid();
        result.check(not_empty("Login", &instance.login));
        result.check(not_empty("Password", &instance.password));
        result.check(not_empty("Roles", &instance.roles));
        result
    }
}
