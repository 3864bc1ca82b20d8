use std::{collections::BTreeMap, env};

use crate::validation::UserRuleSet;

const LOCAL_JWT_SECRET: &str = "super-secure-test-secret-value-local";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// AppConfig
///
/// Holds the application's entire configuration state. Immutable once loaded and
/// pulled into handlers and extractors via `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the log format and the dev sign-in bypass.
    pub env: Env,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // Secret used to decode and validate incoming bearer tokens.
    pub jwt_secret: String,
    // Named user-validation contexts, e.g. `register` -> `email,first_name,auth`.
    pub user_rule_profiles: BTreeMap<String, UserRuleSet>,
}

/// Env
///
/// Defines the runtime context.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// A non-panicking configuration for tests: local mode, local secret, no
    /// profiles.
    fn default() -> Self {
        Self {
            env: Env::Local,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            user_rule_profiles: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables:
    ///
    /// - `APP_ENV`: `production` or anything else for local.
    /// - `BIND_ADDR`: defaults to `0.0.0.0:3000`.
    /// - `JWT_SECRET`: mandatory in production, local fallback otherwise.
    /// - `USER_RULE_PROFILES`: `name=rule,rule;name=rule`.
    ///
    /// # Panics
    /// Panics if `JWT_SECRET` is missing in production or if
    /// `USER_RULE_PROFILES` is malformed. The server must not start half configured.
    pub fn load() -> Self {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match env {
            Env::Production => {
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production.")
            }
            Env::Local => env::var("JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
        };

        let user_rule_profiles = match env::var("USER_RULE_PROFILES") {
            Ok(raw) => parse_profiles(&raw)
                .unwrap_or_else(|e| panic!("FATAL: invalid USER_RULE_PROFILES: {e}")),
            Err(_) => BTreeMap::new(),
        };

        Self {
            env,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            jwt_secret,
            user_rule_profiles,
        }
    }

    /// The rule set configured under `name`, if any.
    pub fn user_rule_profile(&self, name: &str) -> Option<&UserRuleSet> {
        self.user_rule_profiles.get(name)
    }
}

/// parse_profiles
///
/// Parses `register=id,email;edit=email,first_name` into named rule sets.
/// A profile may be declared with no rules (`noop=`).
pub fn parse_profiles(raw: &str) -> Result<BTreeMap<String, UserRuleSet>, String> {
    let mut profiles = BTreeMap::new();

    for entry in raw.split(';').filter(|entry| !entry.trim().is_empty()) {
        let (name, rules) = entry
            .split_once('=')
            .ok_or_else(|| format!("profile entry '{}' is missing '='", entry.trim()))?;

        let name = name.trim();
        if name.is_empty() {
            return Err(format!("profile entry '{}' has no name", entry.trim()));
        }

        let rules: UserRuleSet = rules
            .parse()
            .map_err(|e| format!("profile '{name}': {e}"))?;

        if profiles.insert(name.to_string(), rules).is_some() {
            return Err(format!("profile '{name}' declared twice"));
        }
    }

    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::UserRule;

    #[test]
    fn parses_profiles() {
        let profiles = parse_profiles("register=email,first_name,auth; edit = email ;noop=").unwrap();
        assert_eq!(profiles.len(), 3);
        assert!(profiles["register"].contains(UserRule::Auth));
        assert!(!profiles["edit"].contains(UserRule::FirstName));
        assert!(profiles["noop"].is_empty());
    }

    #[test]
    fn rejects_bad_profiles() {
        assert!(parse_profiles("register").is_err());
        assert!(parse_profiles("=email").is_err());
        assert!(parse_profiles("a=email;a=id").is_err());
        assert!(parse_profiles("a=email,shoe_size").is_err());
    }
}
