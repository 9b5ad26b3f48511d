//! Small helpers shared by Jira request paths.

pub fn truncate_for_error(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated = text.chars().take(max_chars).collect::<String>();
    truncated.push_str("...");
    truncated
}

/// Jira issue keys are `PROJECT-123`; anything outside `[A-Za-z0-9_-]` would
/// change the request path.
pub fn is_valid_issue_key(issue_key: &str) -> bool {
    !issue_key.is_empty()
        && issue_key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}
