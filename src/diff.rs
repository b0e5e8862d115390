//! Compare generated shell text with a checked-in copy.

use similar::{ChangeTag, TextDiff};

/// Unified diff from `expected` to `actual`, or `None` when they match.
/// A missing final newline on either side is not a difference.
pub fn check_generated(
    expected_name: &str,
    actual_name: &str,
    expected: &str,
    actual: &str,
) -> Option<String> {
    let expected = with_final_newline(expected);
    let actual = with_final_newline(actual);
    if expected == actual {
        return None;
    }

    let diff = TextDiff::from_lines(&expected, &actual);
    let mut output = String::new();
    output.push_str(&format!("--- {}\n", expected_name));
    output.push_str(&format!("+++ {}\n", actual_name));

    for hunk in diff.unified_diff().context_radius(3).iter_hunks() {
        output.push_str(&format!("{}\n", hunk.header()));
        for change in hunk.iter_changes() {
            let sign = match change.tag() {
                ChangeTag::Delete => "-",
                ChangeTag::Insert => "+",
                ChangeTag::Equal => " ",
            };
            output.push_str(sign);
            output.push_str(change.value());
        }
    }

    Some(output)
}

fn with_final_newline(text: &str) -> String {
    if text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{}\n", text)
    }
}
