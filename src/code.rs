//! Numeric verification-code extraction.

use regex::Regex;
use std::sync::LazyLock;

/// Returned by [`extract_code`] when no code is found.
pub const NO_CODE: &str = "N/A";

// ASCII digits between ASCII word boundaries, like a browser's `\b\d{4,6}\b`.
static CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?-u:\b)[0-9]{4,6}(?-u:\b)").expect("code regex is valid"));

/// Find the first 4 to 6 digit run in `subject`, `html` and `text`, scanned in that order.
///
/// The three parts are joined with single spaces before matching, so a code
/// can never straddle two of them. Returns [`NO_CODE`] when nothing matches.
///
/// ```
/// use mailtm_client::extract_code;
///
/// assert_eq!(extract_code("Your code is 938201", "", ""), "938201");
/// assert_eq!(extract_code("hello", "", ""), "N/A");
/// ```
pub fn extract_code(subject: &str, html: &str, text: &str) -> String {
    let combined = format!("{subject} {html} {text}");
    CODE_RE
        .find(&combined)
        .map_or_else(|| NO_CODE.to_string(), |m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_code_in_subject() {
        assert_eq!(extract_code("Your code is 938201", "", ""), "938201");
    }

    #[test]
    fn miss_returns_sentinel() {
        assert_eq!(extract_code("hello", "", ""), NO_CODE);
        assert_eq!(extract_code("", "", ""), NO_CODE);
    }

    #[test]
    fn first_match_wins_across_parts() {
        assert_eq!(extract_code("order #12", "<p>pin 4821</p>", ""), "4821");
        assert_eq!(extract_code("", "<b>1111</b>", "2222"), "1111");
        assert_eq!(extract_code("", "", "code: 55555."), "55555");
    }

    #[test]
    fn digit_runs_outside_range_are_skipped() {
        assert_eq!(extract_code("call 123 or 1234567", "", ""), NO_CODE);
        assert_eq!(extract_code("ref 1234567 then 7788", "", ""), "7788");
    }

    #[test]
    fn digits_glued_to_letters_do_not_match() {
        assert_eq!(extract_code("abc12345", "", ""), NO_CODE);
        assert_eq!(extract_code("id_123456", "", ""), NO_CODE);
    }

    #[test]
    fn parts_do_not_merge() {
        // "12" + "34" would read as 1234 without the separator.
        assert_eq!(extract_code("12", "34", ""), NO_CODE);
    }
}
