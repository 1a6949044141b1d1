//! String helpers for display consumers

/// Shorten a commit sha to its conventional 7-character prefix.
pub fn truncate_commit(commit: Option<&str>) -> String {
    match commit {
        Some(sha) => sha.chars().take(7).collect(),
        None => String::new(),
    }
}

/// Truncate a commit message for list rendering, appending an ellipsis when
/// anything was cut.
pub fn truncate_message(message: Option<&str>, max_length: usize) -> String {
    match message {
        Some(msg) if msg.chars().count() > max_length => {
            let truncated: String = msg.chars().take(max_length).collect();
            format!("{truncated}...")
        }
        Some(msg) => msg.to_string(),
        None => String::new(),
    }
}
