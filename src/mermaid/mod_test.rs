//! End-to-end tests for the sanitizer pipeline.

use super::sanitize;

/// Inputs covering each stage and fallback, used for idempotence checks.
const CORPUS: &[&str] = &[
    "",
    "   ",
    "just some random text",
    "graph TD\nA-->B",
    "```mermaid\ngraph TD\nA-->B\n```",
    "```\nflowchart LR\n  A[User Login] --> B{Valid creds?}\n  B -->|yes| C(Open dashboard)\n  B -->|no| A\n```",
    "Here is your diagram:\n\ngraph TD\n    A[Start] --> B[End]\n\nLet me know if you need changes.",
    "graph TD\n    A[User Login] --> B[Check Credentials]",
    "graph TD\n    A[\"Already quoted\"] --> B[End]",
    "graph TD\n    A[Say \"hi\" now] --> B",
    "sequenceDiagram\n    participant Alice\n    Alice->>+Bob: Hello Bob\n    Note right of Bob: Bob thinks\n    Bob-->>-Alice: Hi\n\nthis is the end of it",
    "classDiagram\n    Animal <|-- Duck\n    class Duck{\n      +swim()\n    }\nDucks swim.",
    "stateDiagram-v2\n    [*] --> Still\n    Still --> Moving\n    Moving --> [*]",
    "erDiagram\n    CUSTOMER ||--o{ ORDER : places",
    "graph TD\n  subgraph Login Flow\n    A[Enter name] --> B\n  end\n\n  B --> C\nThat is all.",
    "Some intro\n```mermaid\ngraph LR\nX[Open door] --> Y\n```\n```js\nconsole.log(1)\n```",
    "no header but A[has label] here",
    "graph TD\r\n  A[Two words] --> B\r\n\r\nok.",
    "graph TD\n    A --> B\n    see x(a b-)\n    C --> D",
];

// =============================================================================
// PROPERTIES
// =============================================================================

#[test]
fn sanitize_is_idempotent() {
    for input in CORPUS {
        let once = sanitize(input);
        assert_eq!(sanitize(&once), once, "not idempotent for {input:?}");
    }
}

#[test]
fn fence_removal_matches_bare_source() {
    assert_eq!(sanitize("```mermaid\ngraph TD\nA-->B\n```"), sanitize("graph TD\nA-->B"));
    assert_eq!(sanitize("graph TD\nA-->B"), "graph TD\nA-->B");
}

#[test]
fn leading_and_trailing_prose_is_stripped() {
    let input = "Here is your diagram:\n\ngraph TD\n    A[Start] --> B[End]\n\nLet me know if you need changes.";
    assert_eq!(sanitize(input), "graph TD\n    A[Start] --> B[End]");
}

#[test]
fn multi_word_labels_are_quoted() {
    let input = "graph TD\n    A[User Login] --> B[Check Credentials]";
    assert_eq!(sanitize(input), "graph TD\n    A[\"User Login\"] --> B[\"Check Credentials\"]");
}

#[test]
fn already_quoted_labels_are_untouched() {
    let input = "graph TD\n    A[\"Already quoted\"] --> B[End]";
    assert_eq!(sanitize(input), input);
}

#[test]
fn text_without_header_is_returned_trimmed() {
    assert_eq!(sanitize("just some random text"), "just some random text");
    assert_eq!(sanitize("  padded  \n"), "padded");
}

#[test]
fn text_without_header_still_gets_label_quoting() {
    assert_eq!(sanitize("no header but A[has label] here"), "no header but A[\"has label\"] here");
}

#[test]
fn blank_line_then_lowercase_prose_stops_extraction() {
    let input = "graph LR\n    A --> B\n    B --> C\n\nthe diagram above shows the flow.";
    assert_eq!(sanitize(input), "graph LR\n    A --> B\n    B --> C");
}

#[test]
fn empty_input_is_empty() {
    assert_eq!(sanitize(""), "");
    assert_eq!(sanitize("\n\n"), "");
}

// =============================================================================
// REALISTIC OUTPUTS
// =============================================================================

#[test]
fn fenced_flowchart_with_commentary() {
    let input = "Sure! Here's a flowchart for the login process:\n\n```mermaid\nflowchart LR\n  A[User Login] --> B{Valid creds?}\n  B -->|yes| C(Open dashboard)\n  B -->|no| A\n```\n\nThe diamond represents a decision.";
    assert_eq!(
        sanitize(input),
        "flowchart LR\n  A[\"User Login\"] --> B{\"Valid creds?\"}\n  B -->|yes| C(\"Open dashboard\")\n  B -->|no| A"
    );
}

#[test]
fn sequence_diagram_with_trailing_sentence() {
    let input = "sequenceDiagram\n    participant Alice\n    Alice->>+Bob: Hello Bob\n    Note right of Bob: Bob thinks\n    Bob-->>-Alice: Hi\n\nthis is the end of it";
    assert_eq!(
        sanitize(input),
        "sequenceDiagram\n    participant Alice\n    Alice->>+Bob: Hello Bob\n    Note right of Bob: Bob thinks\n    Bob-->>-Alice: Hi"
    );
}

#[test]
fn state_diagram_passes_through() {
    let input = "stateDiagram-v2\n    [*] --> Still\n    Still --> Moving\n    Moving --> [*]";
    assert_eq!(sanitize(input), input);
}

#[test]
fn subgraph_block_kept_until_prose() {
    let input = "graph TD\n  subgraph Login Flow\n    A[Enter name] --> B\n  end\n\n  B --> C\nThat is all.";
    assert_eq!(
        sanitize(input),
        "graph TD\n  subgraph Login Flow\n    A[\"Enter name\"] --> B\n  end\n\n  B --> C"
    );
}

#[test]
fn only_first_fenced_block_is_used() {
    let input = "Some intro\n```mermaid\ngraph LR\nX[Open door] --> Y\n```\n```js\nconsole.log(1)\n```";
    assert_eq!(sanitize(input), "graph LR\nX[\"Open door\"] --> Y");
}
