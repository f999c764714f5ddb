/// API route handlers
///
/// Organized by resource:
///
/// - `health`: health check endpoint
/// - `users`: signup, login, profile, password, account deletion
/// - `oauth`: GitHub OAuth login
/// - `tasks`, `categories`, `comments`: owner-scoped CRUD
use serde::{Deserialize, Deserializer};

pub mod categories;
pub mod comments;
pub mod health;
pub mod oauth;
pub mod tasks;
pub mod users;

/// Deserializer for `Option<Option<T>>` update fields
///
/// Distinguishes "field absent" (outer None, leave the column alone) from
/// "field explicitly null" (Some(None), clear the column). Use together
/// with `#[serde(default)]`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "double_option")]
        value: Option<Option<i64>>,
    }

    #[test]
    fn test_double_option_absent_vs_null() {
        let absent: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(absent.value, None);

        let null: Probe = serde_json::from_str(r#"{"value": null}"#).unwrap();
        assert_eq!(null.value, Some(None));

        let set: Probe = serde_json::from_str(r#"{"value": 7}"#).unwrap();
        assert_eq!(set.value, Some(Some(7)));
    }
}
