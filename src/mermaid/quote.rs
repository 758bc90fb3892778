//! Node label quoting.
//!
//! Mermaid's strict grammar rejects unquoted labels containing whitespace in
//! several shapes, so `A[User Login]` is rewritten as `A["User Login"]`.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Identifier directly followed by a `[]`, `()` or `{}` label. Labels may not
/// contain brackets, which leaves nested shapes such as `A((circle))` and
/// `A{{hexagon}}` alone.
fn label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(\w+)(?:\[([^\[\](){}\n]*)\]|\(([^\[\](){}\n]*)\)|\{([^\[\](){}\n]*)\})")
            .expect("label pattern is valid")
    })
}

/// Quote every multi-word node label in `source`.
#[must_use]
pub fn quote_labels(source: &str) -> String {
    label_pattern()
        .replace_all(source, |caps: &Captures<'_>| {
            let (open, close, label) = match (caps.get(2), caps.get(3), caps.get(4)) {
                (Some(label), _, _) => ('[', ']', label.as_str()),
                (_, Some(label), _) => ('(', ')', label.as_str()),
                (_, _, Some(label)) => ('{', '}', label.as_str()),
                _ => return caps[0].to_owned(),
            };
            format!("{}{open}{}{close}", &caps[1], quote_label(label))
        })
        .into_owned()
}

/// Wrap `label` in double quotes when it contains whitespace and is not
/// already quoted. Interior double quotes are backslash-escaped.
#[must_use]
pub fn quote_label(label: &str) -> Cow<'_, str> {
    if !label.chars().any(char::is_whitespace) || label.trim_start().starts_with('"') {
        return Cow::Borrowed(label);
    }
    Cow::Owned(format!("\"{}\"", label.replace('"', "\\\"")))
}
