use chrono::{DateTime, Local, Utc};

/// Short local-time rendering for history listings.
pub fn display_time(t: &DateTime<Utc>) -> String {
    t.with_timezone(&Local).format("%m-%d %H:%M").to_string()
}

/// Truncate to `max_chars` characters, appending `...` when something was cut.
pub fn truncate_text(s: &str, max_chars: usize) -> String {
    let mut chars = s.char_indices();
    match chars.nth(max_chars) {
        None => s.to_string(),
        Some((idx, _)) => format!("{}...", &s[..idx]),
    }
}

/// Collapse newlines so a snippet fits on one line.
pub fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_text_counts_characters() {
        assert_eq!(truncate_text("奶茶店开业", 10), "奶茶店开业");
        assert_eq!(truncate_text("奶茶店开业", 2), "奶茶...");
        assert_eq!(truncate_text("abc", 3), "abc");
        assert_eq!(truncate_text("abcd", 3), "abc...");
    }

    #[test]
    fn single_line_collapses_whitespace() {
        assert_eq!(single_line("a\n\nb  c\t"), "a b c");
    }
}
