//! Content-tree nodes with measured geometry
//!
//! The editing surface owns the real content; the engine observes it through
//! this tree. Every node carries the bounding rectangle the host's renderer
//! measured for it, and every text run carries its rendered fragment
//! rectangles (one per visual-line slice). The engine never writes to the
//! tree.

use crate::Rect;
use smallvec::SmallVec;

/// Unique identifier for a content node, assigned by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

/// The kind of content node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Regular paragraph
    Paragraph,
    /// Heading with level (1-6)
    Heading { level: u8 },
    /// List item
    ListItem,
    /// Block-level image (no text runs; measured by its own bounds)
    Image,
    /// Generic transparent wrapper
    Container,
    /// List wrapper around list items
    List,
    /// Table structure
    Table,
    TableRow,
    TableCell,
}

impl NodeKind {
    /// Paragraph-equivalent leaf the line extractor operates on
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            NodeKind::Paragraph | NodeKind::Heading { .. } | NodeKind::ListItem | NodeKind::Image
        )
    }

    /// Transparent wrapper the collector descends into without recording
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            NodeKind::Container
                | NodeKind::List
                | NodeKind::Table
                | NodeKind::TableRow
                | NodeKind::TableCell
        )
    }
}

impl Default for NodeKind {
    fn default() -> Self {
        NodeKind::Paragraph
    }
}

/// Paragraph-style properties relevant to spacing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockStyle {
    /// Style identifier from the document's style sheet
    pub style_id: Option<String>,
    /// Word-processor "contextual spacing": suppress spacing between
    /// adjacent blocks of the same style
    pub contextual_spacing: bool,
    /// Authored spacing before the block, in twips
    pub spacing_before: f32,
    /// Authored spacing after the block, in twips
    pub spacing_after: f32,
}

/// A text run with its rendered fragment rectangles.
///
/// A run that wraps produces one fragment per visual line it touches; the
/// fragments are in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub fragments: SmallVec<[Rect; 2]>,
}

impl TextRun {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fragments: SmallVec::new(),
        }
    }
}

/// A node in the observed content tree
#[derive(Debug, Clone, Default)]
pub struct ContentNode {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Measured bounding rectangle, in content-surface coordinates
    pub bounds: Rect,
    pub style: BlockStyle,
    /// Text runs (leaf blocks only)
    pub runs: Vec<TextRun>,
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    /// Create a leaf or container node with the given id and kind
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            bounds: Rect::default(),
            style: BlockStyle::default(),
            runs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Root container for an editable surface
    pub fn root() -> Self {
        Self::new(NodeId(0), NodeKind::Container)
    }

    pub fn with_style(mut self, style: BlockStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_run(mut self, run: TextRun) -> Self {
        self.runs.push(run);
        self
    }

    pub fn with_child(mut self, child: ContentNode) -> Self {
        self.children.push(child);
        self
    }

    /// Measured height of this node's subtree (the editable surface height
    /// when called on the root)
    pub fn height(&self) -> f32 {
        self.bounds.height
    }
}
