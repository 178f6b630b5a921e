//! Frozen content snapshot for inert page duplicates
//!
//! Pages 2..N render the same content stream as page 1, but re-rendering the
//! live editable state twice would be expensive and risks divergent
//! interactive state. Instead each recomputation pass captures one serialized
//! snapshot of the rendered markup; every inert frame renders that frozen
//! copy. A deliberate read/write split, not a cache.

use crate::content::{ContentNode, NodeKind};
use serde::Serialize;

/// Serializable render markup for one node
#[derive(Debug, Serialize)]
struct SnapshotNode {
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    style: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    runs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<SnapshotNode>,
}

/// One pass's frozen markup, shared by all inert page frames
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentSnapshot {
    pub markup: String,
}

impl ContentSnapshot {
    /// Serialize the rendered content tree once for this pass.
    pub fn capture(root: &ContentNode) -> Self {
        let markup = match serde_json::to_string(&strip(root)) {
            Ok(markup) => markup,
            Err(err) => {
                log::debug!("snapshot serialization failed: {err}");
                String::new()
            }
        };
        Self { markup }
    }
}

fn strip(node: &ContentNode) -> SnapshotNode {
    SnapshotNode {
        kind: kind_name(node.kind),
        style: node.style.style_id.clone(),
        runs: node.runs.iter().map(|r| r.text.clone()).collect(),
        children: node.children.iter().map(strip).collect(),
    }
}

fn kind_name(kind: NodeKind) -> &'static str {
    match kind {
        NodeKind::Paragraph => "paragraph",
        NodeKind::Heading { level: 1 } => "heading1",
        NodeKind::Heading { level: 2 } => "heading2",
        NodeKind::Heading { level: 3 } => "heading3",
        NodeKind::Heading { level: 4 } => "heading4",
        NodeKind::Heading { level: 5 } => "heading5",
        NodeKind::Heading { .. } => "heading6",
        NodeKind::ListItem => "list-item",
        NodeKind::Image => "image",
        NodeKind::Container => "container",
        NodeKind::List => "list",
        NodeKind::Table => "table",
        NodeKind::TableRow => "table-row",
        NodeKind::TableCell => "table-cell",
    }
}
