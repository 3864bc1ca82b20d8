use validator::ValidateEmail;

use super::ValidationFailure;

/// NotEmpty
///
/// What "empty" means for a field type: blank strings, empty collections and
/// default numbers.
pub trait NotEmpty {
    fn is_empty_value(&self) -> bool;
}

impl NotEmpty for str {
    fn is_empty_value(&self) -> bool {
        self.trim().is_empty()
    }
}

impl NotEmpty for String {
    fn is_empty_value(&self) -> bool {
        self.as_str().is_empty_value()
    }
}

impl<T> NotEmpty for Vec<T> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T> NotEmpty for [T] {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl NotEmpty for i64 {
    fn is_empty_value(&self) -> bool {
        *self == 0
    }
}

impl<T: NotEmpty> NotEmpty for Option<T> {
    fn is_empty_value(&self) -> bool {
        self.as_ref().is_none_or(NotEmpty::is_empty_value)
    }
}

/// Fails when `value` is empty.
pub fn not_empty<V>(property: &str, value: &V) -> Option<ValidationFailure>
where
    V: NotEmpty + ?Sized,
{
    value
        .is_empty_value()
        .then(|| ValidationFailure::new(property, format!("'{property}' must not be empty.")))
}

/// Fails when `value` is not a syntactically valid email address.
pub fn email_address(property: &str, value: &str) -> Option<ValidationFailure> {
    (!value.validate_email()).then(|| {
        ValidationFailure::new(
            property,
            format!("'{property}' is not a valid email address."),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_are_empty() {
        assert!(not_empty("Login", "").is_some());
        assert!(not_empty("Login", "   ").is_some());
        assert!(not_empty("Login", "admin").is_none());
    }

    #[test]
    fn zero_id_is_empty() {
        assert!(not_empty("Id", &0i64).is_some());
        assert!(not_empty("Id", &42i64).is_none());
    }

    #[test]
    fn collections_and_options() {
        let empty: Vec<u8> = Vec::new();
        assert!(not_empty("Roles", &empty).is_some());
        assert!(not_empty("Roles", &vec![1u8]).is_none());
        assert!(not_empty("Name", &None::<String>).is_some());
        assert!(not_empty("Name", &Some("x".to_string())).is_none());
    }

    #[test]
    fn failure_message_names_property() {
        let failure = not_empty("Password", "").unwrap();
        assert_eq!(failure.property, "Password");
        assert_eq!(failure.message, "'Password' must not be empty.");
    }

    #[test]
    fn email_format() {
        assert!(email_address("Email", "user@example.com").is_none());
        assert!(email_address("Email", "not-an-email").is_some());
        assert!(email_address("Email", "@example.com").is_some());
        assert!(email_address("Email", "").is_some());
    }

    #[test]
    fn email_syntax_is_stricter_than_a_single_at() {
        for accepted in ["first.last+tag@sub.example.co.uk", "USER@EXAMPLE.COM"] {
            assert!(email_address("Email", accepted).is_none(), "{accepted} rejected");
        }
        // The first two pass a bare single-'@' check.
        for rejected in [
            "first last@example.com",
            "user@exa mple.com",
            "user@",
            "user@@example.com",
        ] {
            assert!(email_address("Email", rejected).is_some(), "{rejected} accepted");
        }
    }
}
