//! Small string helpers shared across modules.

/// Returns a safe index to truncate a string at, ensuring we don't cut UTF-8 characters.
pub fn safe_truncate_index(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    let mut idx = max;
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Truncate a string for logging and display purposes.
pub fn truncate_for_log(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}... [truncated]", &s[..safe_truncate_index(s, max_len)])
    }
}
