//! Markdown code-fence removal.

use std::sync::OnceLock;

use regex::Regex;

/// Opening fence with an optional language tag, then the body up to the first
/// closing fence. A tag only counts when it ends the opening line, so
/// "```graph TD" keeps its header.
fn fence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?is)```(?:[a-z0-9_+-]+[ \t]*\r?\n|[ \t]*\r?\n?)(.*?)```").expect("fence pattern is valid")
    })
}

/// Return the body of the first fenced block in `text`, trimmed. Text with no
/// complete fence is returned trimmed and otherwise untouched.
#[must_use]
pub fn strip_fence(text: &str) -> &str {
    fence_pattern()
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map_or(text, |body| body.as_str())
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tagged_fence() {
        assert_eq!(strip_fence("```mermaid\ngraph TD\nA-->B\n```"), "graph TD\nA-->B");
    }

    #[test]
    fn strips_untagged_fence() {
        assert_eq!(strip_fence("```\nsequenceDiagram\nA->>B: hi\n```"), "sequenceDiagram\nA->>B: hi");
    }

    #[test]
    fn language_tag_is_case_insensitive() {
        assert_eq!(strip_fence("```MerMaid\npie title Pets\n```"), "pie title Pets");
    }

    #[test]
    fn drops_surrounding_prose() {
        let text = "Sure! Here it is:\n\n```mermaid\ngraph LR\n  A --> B\n```\n\nHope that helps.";
        assert_eq!(strip_fence(text), "graph LR\n  A --> B");
    }

    #[test]
    fn first_closing_fence_wins() {
        let text = "```mermaid\ngraph TD\nA-->B\n```\ntext\n```mermaid\ngraph TD\nC-->D\n```";
        assert_eq!(strip_fence(text), "graph TD\nA-->B");
    }

    #[test]
    fn crlf_fences() {
        assert_eq!(strip_fence("```mermaid\r\ngraph TD\r\nA-->B\r\n```"), "graph TD\r\nA-->B");
    }

    #[test]
    fn header_on_fence_line_is_kept() {
        assert_eq!(strip_fence("```graph TD\nA-->B```"), "graph TD\nA-->B");
    }

    #[test]
    fn no_fence_passes_through_trimmed() {
        assert_eq!(strip_fence("  graph TD\nA-->B \n"), "graph TD\nA-->B");
    }

    #[test]
    fn unterminated_fence_passes_through() {
        assert_eq!(strip_fence("```mermaid\ngraph TD"), "```mermaid\ngraph TD");
    }

    #[test]
    fn empty_input() {
        assert_eq!(strip_fence(""), "");
    }
}
