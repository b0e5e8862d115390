//! Shell quoting for string literals
//!
//! Literals from a script end up inside generated shell text. These helpers
//! decide whether a literal can go in bare, and quote it when it cannot.

/// Characters that never need quoting in a shell word.
fn is_safe_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(c, '_' | '/' | '.' | ':' | '-' | '@' | '%' | '+' | ',' | '=')
}

/// Control characters (0x00-0x1F, 0x7F) can only be written with $'...'.
fn has_control_chars(value: &str) -> bool {
    value.chars().any(|c| (c as u32) < 0x20 || c as u32 == 0x7f)
}

/// ANSI-C quoting: $'...'
fn dollar_quote(value: &str) -> String {
    let mut out = String::from("$'");
    for c in value.chars() {
        match c {
            '\x07' => out.push_str("\\a"),
            '\x08' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\x0b' => out.push_str("\\v"),
            '\x0c' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            '\x1b' => out.push_str("\\e"),
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\{:03o}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Whether `value` can be emitted as a bare shell word.
pub fn is_safe_value(value: &str) -> bool {
    !value.is_empty() && value.chars().all(is_safe_char)
}

/// Quote `value` so the shell reads it back as exactly one word:
/// - bare when every character is safe
/// - $'...' when it holds control characters
/// - single quotes otherwise, with embedded quotes as '\''
pub fn quote_value(value: &str) -> String {
    if has_control_chars(value) {
        return dollar_quote(value);
    }
    if is_safe_value(value) {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// First character that rules a literal out under the strict policy.
/// Spaces are allowed; the caller wraps such literals in double quotes.
pub fn first_unsafe_char(value: &str) -> Option<char> {
    value.chars().find(|&c| c != ' ' && !is_safe_char(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_value_simple() {
        assert_eq!(quote_value("prod"), "prod");
        assert_eq!(quote_value("web-1"), "web-1");
        assert_eq!(quote_value("8080"), "8080");
        assert_eq!(quote_value("/bin/bash"), "/bin/bash");
    }

    #[test]
    fn test_quote_value_empty() {
        assert_eq!(quote_value(""), "''");
    }

    #[test]
    fn test_quote_value_with_spaces_and_metachars() {
        assert_eq!(quote_value("Enter a namespace"), "'Enter a namespace'");
        assert_eq!(quote_value("a; rm -rf /"), "'a; rm -rf /'");
        assert_eq!(quote_value("$(whoami)"), "'$(whoami)'");
    }

    #[test]
    fn test_quote_value_with_single_quote() {
        assert_eq!(quote_value("it's"), "'it'\\''s'");
    }

    #[test]
    fn test_quote_value_with_control_chars() {
        assert_eq!(quote_value("tab\there"), "$'tab\\there'");
        assert_eq!(quote_value("\x01"), "$'\\001'");
    }

    #[test]
    fn test_first_unsafe_char() {
        assert_eq!(first_unsafe_char("hello world"), None);
        assert_eq!(first_unsafe_char("web-1"), None);
        assert_eq!(first_unsafe_char("a;b"), Some(';'));
        assert_eq!(first_unsafe_char("`id`"), Some('`'));
    }
}
