use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

/// Reads an explicit `null` as the field's default, so it reaches the validators
/// as an empty value instead of failing deserialization.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// --- Identity Schemas ---

/// Role
///
/// Authorization role granted to an account. Serialized by name so the SPA can
/// compare against the same literals it renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub enum Role {
    User,
    Admin,
}

/// AuthModel
///
/// Credentials and roles attached to an account. A model is only considered
/// valid once all three fields are populated (see `AuthModelValidator`).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct AuthModel {
    #[serde(deserialize_with = "null_as_default")]
    pub login: String,
    #[serde(deserialize_with = "null_as_default")]
    pub password: String,
    #[serde(deserialize_with = "null_as_default")]
    pub roles: Vec<Role>,
}

/// UserModel
///
/// The user record edited by the `form` feature module. Which of its fields are
/// checked depends on the `UserRuleSet` the caller activates.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct UserModel {
    // Zero means "not assigned yet".
    #[ts(type = "number")]
    #[serde(deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(deserialize_with = "null_as_default")]
    pub first_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub last_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub auth: AuthModel,
}

/// SignInModel
///
/// Payload posted by the `signin` feature module.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SignInModel {
    pub login: String,
    pub password: String,
}

impl From<SignInModel> for AuthModel {
    /// A sign-in form carries no roles, so the converted model fails the
    /// `Roles` rule until they are assigned.
    fn from(model: SignInModel) -> Self {
        Self {
            login: model.login,
            password: model.password,
            roles: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_fields_read_as_empty() {
        let auth: AuthModel =
            serde_json::from_str(r#"{"login":null,"password":"pw","roles":null}"#).unwrap();
        assert_eq!(auth.login, "");
        assert_eq!(auth.password, "pw");
        assert!(auth.roles.is_empty());

        let user: UserModel =
            serde_json::from_str(r#"{"id":null,"email":null,"firstName":"Ada","auth":null}"#)
                .unwrap();
        assert_eq!(user.id, 0);
        assert_eq!(user.email, "");
        assert_eq!(user.first_name, "Ada");
        assert_eq!(user.auth, AuthModel::default());
    }

    #[test]
    fn wrong_types_still_fail() {
        assert!(serde_json::from_str::<AuthModel>(r#"{"login":42}"#).is_err());
    }
}
