//! Diagram extraction: keep the header line and the syntax that follows it,
//! drop the commentary around it.
//!
//! DESIGN
//! ======
//! A single left-to-right pass. The first header line starts the block; every
//! following line is kept while it classifies as syntax. The first prose line
//! ends the block. A blank line is kept as interior spacing unless the next
//! non-blank line is a lowercase prose sentence, in which case the blank line
//! is where the trailing commentary begins.
//!
//! Lines are classified in their label-quoted form, the shape they will have
//! in the output, so a second pass keeps exactly the same lines.
//!
//! `subgraph`/`end` depth is tracked for logging only; unbalanced blocks are
//! passed through for the renderer to report.

use tracing::debug;

use super::classify::{block_delta, is_diagram_syntax};
use super::kind::DiagramKind;
use super::quote::quote_labels;

/// Result of scanning text for a diagram block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Header family, or `None` when no header was found and the whole text
    /// was kept.
    pub kind: Option<DiagramKind>,
    /// Retained lines joined with `\n`, trimmed.
    pub source: String,
    /// Open `end`-terminated blocks left at the end of the block. Negative
    /// when there are more `end`s than openers.
    pub open_blocks: isize,
}

/// Locate the diagram block in `text`.
#[must_use]
pub fn extract(text: &str) -> Extraction {
    let lines: Vec<&str> = text.lines().collect();

    let Some((start, kind)) = lines
        .iter()
        .enumerate()
        .find_map(|(idx, line)| DiagramKind::detect(line).map(|kind| (idx, kind)))
    else {
        debug!(text_len = text.len(), "mermaid: no diagram header, keeping whole text");
        return Extraction { kind: None, source: text.trim().to_owned(), open_blocks: 0 };
    };

    let mut kept = vec![lines[start]];
    let mut open_blocks: isize = 0;

    for (idx, line) in lines.iter().copied().enumerate().skip(start + 1) {
        if line.trim().is_empty() {
            if prose_follows(&lines[idx + 1..]) {
                break;
            }
            kept.push(line);
            continue;
        }
        if !is_syntax(line) {
            debug!(line = idx, "mermaid: prose line ends diagram");
            break;
        }
        open_blocks += block_delta(line);
        kept.push(line);
    }

    if open_blocks != 0 {
        debug!(kind = kind.as_str(), open_blocks, "mermaid: unbalanced block nesting");
    }

    Extraction { kind: Some(kind), source: kept.join("\n").trim().to_owned(), open_blocks }
}

/// `true` when the next non-blank line is a sentence: starts lowercase and is
/// not diagram syntax.
fn prose_follows(rest: &[&str]) -> bool {
    let Some(next) = rest.iter().find(|line| !line.trim().is_empty()) else {
        return false;
    };
    next.trim_start()
        .chars()
        .next()
        .is_some_and(char::is_lowercase)
        && !is_syntax(next)
}

fn is_syntax(line: &str) -> bool {
    is_diagram_syntax(&quote_labels(line))
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
