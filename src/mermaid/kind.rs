//! Diagram-type header keywords.

use super::classify::starts_with_keyword;

/// The diagram family named by a Mermaid header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramKind {
    Graph,
    Flowchart,
    Sequence,
    Class,
    State,
    EntityRelationship,
    Journey,
    Gantt,
    Pie,
    Quadrant,
    Requirement,
    GitGraph,
    Mindmap,
    Timeline,
    ZenUml,
    Sankey,
    XyChart,
    Block,
    Packet,
    Architecture,
    Kanban,
    C4,
}

/// Header keywords in match order. Versioned spellings precede their base
/// keyword so `stateDiagram-v2` is reported as written.
const HEADERS: &[(&str, DiagramKind)] = &[
    ("graph", DiagramKind::Graph),
    ("flowchart-elk", DiagramKind::Flowchart),
    ("flowchart", DiagramKind::Flowchart),
    ("sequenceDiagram", DiagramKind::Sequence),
    ("classDiagram-v2", DiagramKind::Class),
    ("classDiagram", DiagramKind::Class),
    ("stateDiagram-v2", DiagramKind::State),
    ("stateDiagram", DiagramKind::State),
    ("erDiagram", DiagramKind::EntityRelationship),
    ("journey", DiagramKind::Journey),
    ("gantt", DiagramKind::Gantt),
    ("pie", DiagramKind::Pie),
    ("quadrantChart", DiagramKind::Quadrant),
    ("requirementDiagram", DiagramKind::Requirement),
    ("gitGraph", DiagramKind::GitGraph),
    ("mindmap", DiagramKind::Mindmap),
    ("timeline", DiagramKind::Timeline),
    ("zenuml", DiagramKind::ZenUml),
    ("sankey-beta", DiagramKind::Sankey),
    ("sankey", DiagramKind::Sankey),
    ("xychart-beta", DiagramKind::XyChart),
    ("block-beta", DiagramKind::Block),
    ("packet-beta", DiagramKind::Packet),
    ("architecture-beta", DiagramKind::Architecture),
    ("kanban", DiagramKind::Kanban),
    ("C4Context", DiagramKind::C4),
    ("C4Container", DiagramKind::C4),
    ("C4Component", DiagramKind::C4),
    ("C4Dynamic", DiagramKind::C4),
    ("C4Deployment", DiagramKind::C4),
];

impl DiagramKind {
    /// Detect a header keyword at the start of `line`.
    ///
    /// Leading/trailing whitespace is ignored and the comparison is ASCII
    /// case-insensitive. The keyword must end at a word boundary, so
    /// `graph TD` and `pie title Pets` match but `graphics` does not.
    #[must_use]
    pub fn detect(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        HEADERS
            .iter()
            .find(|(keyword, _)| starts_with_keyword(trimmed, keyword, true))
            .map(|(_, kind)| *kind)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Graph => "graph",
            Self::Flowchart => "flowchart",
            Self::Sequence => "sequenceDiagram",
            Self::Class => "classDiagram",
            Self::State => "stateDiagram",
            Self::EntityRelationship => "erDiagram",
            Self::Journey => "journey",
            Self::Gantt => "gantt",
            Self::Pie => "pie",
            Self::Quadrant => "quadrantChart",
            Self::Requirement => "requirementDiagram",
            Self::GitGraph => "gitGraph",
            Self::Mindmap => "mindmap",
            Self::Timeline => "timeline",
            Self::ZenUml => "zenuml",
            Self::Sankey => "sankey",
            Self::XyChart => "xychart",
            Self::Block => "block",
            Self::Packet => "packet",
            Self::Architecture => "architecture",
            Self::Kanban => "kanban",
            Self::C4 => "c4",
        }
    }
}
