//! Resource clients for the note service.
//!
//! Each method maps to exactly one transport call. Failures are returned as
//! produced by the [`Transport`](crate::transport::Transport).

mod notes;
mod users;

pub use notes::NotesClient;
pub use users::UsersClient;

/// Append `pairs` to `path` as a percent-encoded query string.
fn with_query(path: &str, pairs: &[(&str, String)]) -> String {
    if pairs.is_empty() {
        return path.to_string();
    }

    let query = pairs
        .iter()
        .map(|(name, value)| format!("{name}={}", urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{path}?{query}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_appended_only_when_present() {
        assert_eq!(with_query("/v1/notes", &[]), "/v1/notes");
        assert_eq!(
            with_query(
                "/v1/notes",
                &[("parent_id", "null".to_string()), ("q", "a b".to_string())]
            ),
            "/v1/notes?parent_id=null&q=a%20b"
        );
    }
}
