//! Line classification: is this line Mermaid syntax or trailing prose?
//!
//! DESIGN
//! ======
//! Diagram grammars have a small, enumerable vocabulary of line shapes. Each
//! shape is one entry in an ordered rule table; a line is syntax as soon as
//! any rule accepts it. Anything else is treated as prose the generator added
//! around the code.

use super::kind::DiagramKind;

/// Statements that structure a diagram regardless of its family.
const STRUCTURAL_KEYWORDS: &[&str] = &[
    "subgraph",
    "end",
    "style",
    "classDef",
    "class",
    "click",
    "linkStyle",
    "direction",
    "title",
    "section",
    "accTitle",
    "accDescr",
    "%%",
];

/// Sequence-diagram statements. `note` is also accepted as `Note`.
const SEQUENCE_KEYWORDS: &[&str] = &[
    "participant",
    "actor",
    "activate",
    "deactivate",
    "note",
    "loop",
    "alt",
    "opt",
    "par",
    "and",
    "rect",
    "critical",
    "break",
    "autonumber",
];

const STATE_TOKENS: &[&str] = &["state", "hide empty description", "[*]"];

/// Link and message arrows. Longer spellings first.
const EDGE_TOKENS: &[&str] = &["-->>", "--)", "--x", "->>", "-)", "-x", "->", "--", "==", "..", "-."];

const CLASS_RELATION_TOKENS: &[&str] = &["<|--", ">|--", "*--", "o--", "<..", "*.."];

/// Statements that open a block closed by `end`.
const BLOCK_OPENERS: &[&str] = &["subgraph", "loop", "alt", "opt", "par", "rect", "critical", "break"];

// =============================================================================
// RULES
// =============================================================================

/// Which rule accepted a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineRule {
    Header,
    Structural,
    Sequence,
    State,
    NodeDefinition,
    Edge,
    EdgeLabel,
    ActorShorthand,
    ClassRelation,
}

type RuleCheck = fn(&str) -> bool;

const RULES: &[(LineRule, RuleCheck)] = &[
    (LineRule::Header, is_header),
    (LineRule::Structural, is_structural),
    (LineRule::Sequence, is_sequence_statement),
    (LineRule::State, is_state_statement),
    (LineRule::NodeDefinition, is_node_definition),
    (LineRule::Edge, has_edge),
    (LineRule::EdgeLabel, has_edge_label),
    (LineRule::ActorShorthand, is_actor_shorthand),
    (LineRule::ClassRelation, has_class_relation),
];

/// Return the first rule that accepts `line`, or `None` for prose.
///
/// Blank lines are never syntax; the extractor decides what to do with them.
#[must_use]
pub fn classify(line: &str) -> Option<LineRule> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    RULES
        .iter()
        .find(|(_, check)| check(trimmed))
        .map(|(rule, _)| *rule)
}

/// `true` when `line` is recognised diagram syntax.
#[must_use]
pub fn is_diagram_syntax(line: &str) -> bool {
    classify(line).is_some()
}

/// Nesting change contributed by `line`: `+1` for a block opener, `-1` for
/// `end`, `0` otherwise.
#[must_use]
pub fn block_delta(line: &str) -> isize {
    let trimmed = line.trim();
    if starts_with_keyword(trimmed, "end", false) {
        -1
    } else if BLOCK_OPENERS
        .iter()
        .any(|kw| starts_with_keyword(trimmed, kw, false))
    {
        1
    } else {
        0
    }
}

fn is_header(line: &str) -> bool {
    DiagramKind::detect(line).is_some()
}

// Statement keywords are plain prefixes: `endpoint` and `classes` both
// count, so a bare node named after a keyword is kept.

fn is_structural(line: &str) -> bool {
    STRUCTURAL_KEYWORDS.iter().any(|kw| line.starts_with(kw))
}

fn is_sequence_statement(line: &str) -> bool {
    line.starts_with("Note") || SEQUENCE_KEYWORDS.iter().any(|kw| line.starts_with(kw))
}

fn is_state_statement(line: &str) -> bool {
    STATE_TOKENS.iter().any(|kw| line.starts_with(kw))
}

/// `id[`, `id(` or `id{` at the start of the line.
fn is_node_definition(line: &str) -> bool {
    let ident_len = line.bytes().take_while(|b| is_ident_byte(*b)).count();
    ident_len > 0 && matches!(line.as_bytes().get(ident_len), Some(b'[' | b'(' | b'{'))
}

/// An arrow token with a node on at least one side. A `+`/`-` activation
/// modifier between the arrow and the target (`A->>+B`) is skipped.
fn has_edge(line: &str) -> bool {
    EDGE_TOKENS.iter().any(|token| {
        line.match_indices(token).any(|(start, _)| {
            let before = line[..start].trim_end().chars().next_back();
            let after = line[start + token.len()..]
                .trim_start()
                .trim_start_matches(['+', '-'])
                .chars()
                .next();
            before.is_some_and(is_node_edge_char) || after.is_some_and(is_node_edge_char)
        })
    })
}

/// `|text|` with non-empty text between the pipes.
fn has_edge_label(line: &str) -> bool {
    let segments: Vec<&str> = line.split('|').collect();
    segments.len() >= 3
        && segments[1..segments.len() - 1]
            .iter()
            .any(|segment| !segment.trim().is_empty())
}

/// `Alice: ...` style shorthand.
fn is_actor_shorthand(line: &str) -> bool {
    let ident_len = line.bytes().take_while(|b| is_ident_byte(*b)).count();
    ident_len > 0 && line.as_bytes().get(ident_len) == Some(&b':')
}

fn has_class_relation(line: &str) -> bool {
    CLASS_RELATION_TOKENS
        .iter()
        .any(|token| line.contains(token))
}

// =============================================================================
// HELPERS
// =============================================================================

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Characters that can sit next to an arrow on the node side: identifier
/// characters, bracket shapes and quoted labels.
fn is_node_edge_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '[' | ']' | '(' | ')' | '{' | '}' | '"')
}

/// `true` when `line` begins with `keyword` as a whole word.
///
/// Keywords ending in an identifier character must be followed by a
/// non-identifier character (or end of line), so `end` matches `end` and
/// `end %% done` but not `endpoint`. Symbolic keywords such as `%%` and
/// `[*]` need no boundary.
pub(crate) fn starts_with_keyword(line: &str, keyword: &str, ignore_case: bool) -> bool {
    let line = line.as_bytes();
    let keyword = keyword.as_bytes();
    let Some(prefix) = line.get(..keyword.len()) else {
        return false;
    };
    let prefix_matches = if ignore_case { prefix.eq_ignore_ascii_case(keyword) } else { prefix == keyword };
    if !prefix_matches {
        return false;
    }
    let needs_boundary = keyword.last().is_some_and(|b| is_ident_byte(*b));
    !needs_boundary
        || line
            .get(keyword.len())
            .is_none_or(|b| !is_ident_byte(*b) && b.is_ascii())
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod tests;
