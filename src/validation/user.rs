use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::models::UserModel;

use super::{
    AuthModelValidator, ValidationResult, Validator,
    rules::{email_address, not_empty},
};

/// UserRule
///
/// One opt-in rule of the user validator. Declaration order is evaluation order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS, ToSchema,
)]
#[ts(export)]
pub enum UserRule {
    Id,
    Email,
    FirstName,
    LastName,
    Auth,
}

impl UserRule {
    pub const ALL: [UserRule; 5] = [
        UserRule::Id,
        UserRule::Email,
        UserRule::FirstName,
        UserRule::LastName,
        UserRule::Auth,
    ];

    /// The snake_case name used in query strings and configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            UserRule::Id => "id",
            UserRule::Email => "email",
            UserRule::FirstName => "first_name",
            UserRule::LastName => "last_name",
            UserRule::Auth => "auth",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown user rule '{0}'")]
pub struct UnknownUserRule(pub String);

impl FromStr for UserRule {
    type Err = UnknownUserRule;

    /// Accepts `first_name`, `firstname` and `FirstName` alike.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "id" => Ok(UserRule::Id),
            "email" => Ok(UserRule::Email),
            "firstname" => Ok(UserRule::FirstName),
            "lastname" => Ok(UserRule::LastName),
            "auth" => Ok(UserRule::Auth),
            _ => Err(UnknownUserRule(s.trim().to_string())),
        }
    }
}

impl fmt::Display for UserRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UserRuleSet
///
/// The rules a validation context activates. Which subset belongs to which form
/// is supplied by the caller (or by a configured profile), never inferred here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRuleSet(BTreeSet<UserRule>);

impl UserRuleSet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn all() -> Self {
        UserRule::ALL.into_iter().collect()
    }

    pub fn with(mut self, rule: UserRule) -> Self {
        self.0.insert(rule);
        self
    }

    pub fn contains(&self, rule: UserRule) -> bool {
        self.0.contains(&rule)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = UserRule> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<UserRule> for UserRuleSet {
    fn from_iter<I: IntoIterator<Item = UserRule>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromStr for UserRuleSet {
    type Err = UnknownUserRule;

    /// Parses a comma separated list. Blank entries are skipped, so `""` is the
    /// empty set.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse::<UserRule>)
            .collect()
    }
}

impl fmt::Display for UserRuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(UserRule::as_str).collect();
        f.write_str(&names.join(","))
    }
}

/// UserModelValidator
///
/// Applies exactly the rules in its `UserRuleSet`. The `Auth` rule hands the
/// embedded model to `AuthModelValidator` and reports its failures under
/// `Auth.*`.
#[derive(Debug, Clone, Default)]
pub struct UserModelValidator {
    rules: UserRuleSet,
}

impl UserModelValidator {
    pub fn new(rules: UserRuleSet) -> Self {
        Self { rules }
    }
}

impl Validator<UserModel> for UserModelValidator {
    fn validate(&self, instance: &UserModel) -> ValidationResult {
        let mut result = ValidationResult::valid();

        for rule in self.rules.iter() {
            match rule {
                UserRule::Id => result.check(not_empty("Id", &instance.id)),
                UserRule::Email => result.check(email_address("Email", &instance.email)),
                UserRule::FirstName => result.check(not_empty("FirstName", &instance.first_name)),
                UserRule::LastName => result.check(not_empty("LastName", &instance.last_name)),
                UserRule::Auth => {
                    result.merge(AuthModelValidator.validate(&instance.auth).nested("Auth"))
                }
            }
        }

        result
    }
}
