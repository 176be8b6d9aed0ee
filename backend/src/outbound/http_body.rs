//! Helpers shared by the reqwest-backed vendor clients.

const PREVIEW_CHAR_LIMIT: usize = 160;

/// Whitespace-collapsed prefix of a response body for error messages.
pub(crate) fn body_preview(body: &[u8]) -> String {
    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace() {
        assert_eq!(body_preview(b"{\n  \"error\":  \"nope\"\n}"), "{ \"error\": \"nope\" }");
    }

    #[test]
    fn truncates_long_bodies() {
        let body = "x".repeat(400);
        let preview = body_preview(body.as_bytes());
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), PREVIEW_CHAR_LIMIT + 3);
    }
}
