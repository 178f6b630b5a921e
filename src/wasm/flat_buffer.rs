//! Flat buffer protocol for zero-copy WASM bridge
//!
//! Two binary streams cross the bridge: measured content coming in from the
//! host renderer, and the computed page surface going out. Integer structure
//! lives in u32 buffers, geometry in f32 buffers, UTF-8 text in byte buffers.
//!
//! ## Content buffer (host → engine)
//! ```text
//! u32 stream:
//! [0]     MAGIC (0x50474657 = "PGFW")
//! [1]     SCHEMA_VERSION (currently 1)
//! [2]     node_count
//! [3]     text_buffer_len
//! Per node (pre-order, depth-encoded):
//!   [id, depth, kind, flags, style_offset, style_len, run_count]
//!   then per run: [text_offset, text_len, fragment_count]
//!   depth 0 is the root container; exactly one node has depth 0.
//!   flags: bit0 = contextual spacing
//!
//! f32 stream:
//! Per node: [x, y, width, height, spacing_before_twips, spacing_after_twips]
//!   then per run, per fragment: [x, y, width, height]
//!
//! text stream: style identifiers and run text (UTF-8, offset/len addressed)
//! ```
//!
//! ## Frame buffer (engine → host)
//! ```text
//! u32 stream:
//! [0]     MAGIC
//! [1]     SCHEMA_VERSION
//! [2]     pass_lo
//! [3]     pass_hi
//! [4]     frame_count
//! [5]     page_count
//! [6]     line_count
//! [7]     adjustment_count
//! [8]     snapshot_offset (byte offset in text stream)
//! [9]     snapshot_len
//! Per frame: [page_number, flags]
//!   flags: bit0 live, bit1 clipped, bit2 corner marks, bit3 fixed height
//! Per spacing adjustment: [node_id]
//!
//! f32 stream:
//! Per frame: [origin_y, width, height (0 when auto), content_offset,
//!             clip_height (only meaningful when bit1 set)]
//! Per spacing adjustment: [margin_top_pt, margin_bottom_pt]
//!
//! text stream: snapshot markup (empty when every frame is live)
//! ```

use crate::content::{BlockStyle, ContentNode, NodeId, NodeKind, TextRun};
use crate::{Paginator, Rect};
use rustc_hash::FxHashMap;

/// Magic number for format validation: "PGFW" (PaGe FloW)
pub const MAGIC: u32 = 0x5047_4657;

/// Schema version for protocol compatibility checking
pub const SCHEMA_VERSION: u32 = 1;

/// Header size of both streams, in u32 elements
pub const HEADER_SIZE: usize = 10;

/// Content-buffer header size, in u32 elements
pub const CONTENT_HEADER_SIZE: usize = 4;

/// Opcodes for node kinds
pub const NODE_PARAGRAPH: u32 = 0;
pub const NODE_HEADING_1: u32 = 1;
pub const NODE_HEADING_6: u32 = 6;
pub const NODE_LIST_ITEM: u32 = 7;
pub const NODE_IMAGE: u32 = 8;
pub const NODE_CONTAINER: u32 = 9;
pub const NODE_LIST: u32 = 10;
pub const NODE_TABLE: u32 = 11;
pub const NODE_TABLE_ROW: u32 = 12;
pub const NODE_TABLE_CELL: u32 = 13;

/// Content-node flag bits
pub const FLAG_CONTEXTUAL_SPACING: u32 = 0b0001;

/// Frame flag bits
pub const FRAME_LIVE: u32 = 0b0001;
pub const FRAME_CLIPPED: u32 = 0b0010;
pub const FRAME_CORNER_MARKS: u32 = 0b0100;
pub const FRAME_FIXED_HEIGHT: u32 = 0b1000;

/// Fixed u32 values per content node (runs follow)
pub const U32_PER_NODE: usize = 7;
/// u32 values per run record
pub const U32_PER_RUN: usize = 3;
/// f32 values per content node (fragments follow)
pub const F32_PER_NODE: usize = 6;
/// f32 values per fragment rect
pub const F32_PER_FRAGMENT: usize = 4;
/// u32 / f32 values per output frame
pub const U32_PER_FRAME: usize = 2;
pub const F32_PER_FRAME: usize = 5;
/// u32 / f32 values per spacing adjustment
pub const U32_PER_ADJUSTMENT: usize = 1;
pub const F32_PER_ADJUSTMENT: usize = 2;

fn kind_from_opcode(opcode: u32) -> Option<NodeKind> {
    Some(match opcode {
        NODE_PARAGRAPH => NodeKind::Paragraph,
        NODE_HEADING_1..=NODE_HEADING_6 => NodeKind::Heading { level: opcode as u8 },
        NODE_LIST_ITEM => NodeKind::ListItem,
        NODE_IMAGE => NodeKind::Image,
        NODE_CONTAINER => NodeKind::Container,
        NODE_LIST => NodeKind::List,
        NODE_TABLE => NodeKind::Table,
        NODE_TABLE_ROW => NodeKind::TableRow,
        NODE_TABLE_CELL => NodeKind::TableCell,
        _ => return None,
    })
}

/// Flat form of one decoded node, before tree assembly
struct FlatNode {
    depth: u32,
    node: ContentNode,
}

/// Decode a content buffer into a tree.
///
/// Returns `None` on any structural inconsistency (bad magic, truncated
/// streams, out-of-range text offsets, unknown opcodes); malformed input from
/// the bridge is a recoverable condition, never a panic.
pub fn decode_content(u32_data: &[u32], f32_data: &[f32], text_data: &[u8]) -> Option<ContentNode> {
    if u32_data.len() < CONTENT_HEADER_SIZE
        || u32_data[0] != MAGIC
        || u32_data[1] != SCHEMA_VERSION
        || u32_data[3] as usize != text_data.len()
    {
        log::debug!("content buffer rejected: bad header");
        return None;
    }
    let node_count = u32_data[2] as usize;

    let mut styles: FxHashMap<(u32, u32), Option<String>> = FxHashMap::default();
    // Capacity from untrusted input is clamped; the vec grows as records
    // actually decode
    let mut flat: Vec<FlatNode> = Vec::with_capacity(node_count.min(1024));
    let mut u = CONTENT_HEADER_SIZE;
    let mut f = 0usize;

    for _ in 0..node_count {
        let fixed = u32_data.get(u..u + U32_PER_NODE)?;
        u += U32_PER_NODE;
        let [id, depth, kind, flags, style_offset, style_len, run_count] =
            [fixed[0], fixed[1], fixed[2], fixed[3], fixed[4], fixed[5], fixed[6]];

        let geo = f32_data.get(f..f + F32_PER_NODE)?;
        f += F32_PER_NODE;

        let style_id = styles
            .entry((style_offset, style_len))
            .or_insert_with(|| {
                if style_len == 0 {
                    return None;
                }
                let range = style_offset as usize..(style_offset + style_len) as usize;
                core::str::from_utf8(text_data.get(range)?).ok().map(String::from)
            })
            .clone();
        if style_len > 0 && style_id.is_none() {
            log::debug!("content buffer rejected: bad style range");
            return None;
        }

        let mut node = ContentNode::new(NodeId(u64::from(id)), kind_from_opcode(kind)?);
        node.bounds = Rect::new(geo[0], geo[1], geo[2], geo[3]);
        node.style = BlockStyle {
            style_id,
            contextual_spacing: flags & FLAG_CONTEXTUAL_SPACING != 0,
            spacing_before: geo[4],
            spacing_after: geo[5],
        };

        for _ in 0..run_count {
            let run_rec = u32_data.get(u..u + U32_PER_RUN)?;
            u += U32_PER_RUN;
            let range = run_rec[0] as usize..(run_rec[0] + run_rec[1]) as usize;
            let text = core::str::from_utf8(text_data.get(range)?).ok()?;
            let mut run = TextRun::new(text);
            for _ in 0..run_rec[2] {
                let rect = f32_data.get(f..f + F32_PER_FRAGMENT)?;
                f += F32_PER_FRAGMENT;
                run.fragments.push(Rect::new(rect[0], rect[1], rect[2], rect[3]));
            }
            node.runs.push(run);
        }

        flat.push(FlatNode { depth, node });
    }

    // Exactly one depth-0 node: the root container carrying surface bounds
    if flat.first().map(|n| n.depth) != Some(0) || flat.iter().skip(1).any(|n| n.depth == 0) {
        log::debug!("content buffer rejected: malformed root");
        return None;
    }

    let mut pos = 1usize;
    let mut root = flat[0].node.clone();
    root.children = assemble(&flat, &mut pos, 1);
    if pos != flat.len() {
        log::debug!("content buffer rejected: depth encoding does not nest");
        return None;
    }
    Some(root)
}

fn assemble(flat: &[FlatNode], pos: &mut usize, depth: u32) -> Vec<ContentNode> {
    let mut children: Vec<ContentNode> = Vec::new();
    while *pos < flat.len() {
        match flat[*pos].depth.cmp(&depth) {
            core::cmp::Ordering::Less => break,
            core::cmp::Ordering::Greater => {
                // Skipped depth level: fold the run into the previous child
                if let Some(last) = children.last_mut() {
                    let mut grand = assemble(flat, pos, flat[*pos].depth);
                    last.children.append(&mut grand);
                } else {
                    break;
                }
            }
            core::cmp::Ordering::Equal => {
                let mut node = flat[*pos].node.clone();
                *pos += 1;
                node.children = assemble(flat, pos, depth + 1);
                children.push(node);
            }
        }
    }
    children
}

/// Frame buffer for zero-copy WASM transfer of the computed surface
pub struct FrameBuffer {
    /// Integer data (counts, flags, ids)
    pub u32_data: Vec<u32>,
    /// Float data (positions, dimensions)
    pub f32_data: Vec<f32>,
    /// UTF-8 snapshot markup
    pub text_data: Vec<u8>,
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self {
            u32_data: Vec::with_capacity(256),
            f32_data: Vec::with_capacity(256),
            text_data: Vec::with_capacity(1024),
        }
    }

    pub fn clear(&mut self) {
        self.u32_data.clear();
        self.f32_data.clear();
        self.text_data.clear();
    }

    /// Encode the engine's current outputs.
    ///
    /// The buffers are rebuilt in place; JS re-reads pointers after every
    /// call, so reallocation is safe here (unlike per-item appends).
    pub fn encode(&mut self, paginator: &Paginator) {
        self.clear();

        let surface = paginator.surface();
        let stats = paginator.stats();
        let adjustments = paginator.spacing_adjustments();
        let snapshot = surface
            .snapshot
            .as_ref()
            .map(|s| s.markup.as_bytes())
            .unwrap_or_default();

        self.u32_data.push(MAGIC);
        self.u32_data.push(SCHEMA_VERSION);
        self.u32_data.push((paginator.pass() & 0xFFFF_FFFF) as u32);
        self.u32_data.push((paginator.pass() >> 32) as u32);
        self.u32_data.push(surface.frames.len() as u32);
        self.u32_data.push(stats.page_count as u32);
        self.u32_data.push(stats.visual_line_count as u32);
        self.u32_data.push(adjustments.len() as u32);
        self.u32_data.push(0); // snapshot_offset
        self.u32_data.push(snapshot.len() as u32);

        for frame in &surface.frames {
            let mut flags = 0u32;
            if frame.live {
                flags |= FRAME_LIVE;
            }
            if frame.clip_height.is_some() {
                flags |= FRAME_CLIPPED;
            }
            if frame.corner_marks {
                flags |= FRAME_CORNER_MARKS;
            }
            if frame.height.is_some() {
                flags |= FRAME_FIXED_HEIGHT;
            }
            self.u32_data.push(frame.page_number);
            self.u32_data.push(flags);

            self.f32_data.push(frame.origin_y);
            self.f32_data.push(frame.width);
            self.f32_data.push(frame.height.unwrap_or(0.0));
            self.f32_data.push(frame.content_offset);
            self.f32_data.push(frame.clip_height.unwrap_or(0.0));
        }

        for adjustment in adjustments {
            self.u32_data.push(adjustment.node.0 as u32);
            self.f32_data.push(adjustment.margin_top_pt);
            self.f32_data.push(adjustment.margin_bottom_pt);
        }

        self.text_data.extend_from_slice(snapshot);

        #[cfg(debug_assertions)]
        self.validate();
    }

    /// Validate stream lengths against the header (debug builds only)
    #[cfg(debug_assertions)]
    fn validate(&self) {
        let frames = self.u32_data[4] as usize;
        let adjustments = self.u32_data[7] as usize;
        debug_assert_eq!(
            self.u32_data.len(),
            HEADER_SIZE + frames * U32_PER_FRAME + adjustments * U32_PER_ADJUSTMENT
        );
        debug_assert_eq!(
            self.f32_data.len(),
            frames * F32_PER_FRAME + adjustments * F32_PER_ADJUSTMENT
        );
        debug_assert_eq!(self.text_data.len(), self.u32_data[9] as usize);
    }

    // Accessors for WASM
    // Return u32 instead of usize for explicit WASM contract (wasm32 linear
    // memory uses u32 offsets)

    pub fn u32_ptr(&self) -> u32 {
        self.u32_data.as_ptr() as u32
    }

    pub fn u32_len(&self) -> u32 {
        self.u32_data.len() as u32
    }

    pub fn f32_ptr(&self) -> u32 {
        self.f32_data.as_ptr() as u32
    }

    pub fn f32_len(&self) -> u32 {
        self.f32_data.len() as u32
    }

    pub fn text_ptr(&self) -> u32 {
        self.text_data.as_ptr() as u32
    }

    pub fn text_len(&self) -> u32 {
        self.text_data.len() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DocumentAttributes, PaginatorOptions};

    /// Hand-built buffer: root container with one paragraph ("Hi", one
    /// fragment) and one contextual list item (style "LP", no runs)
    fn sample_buffers() -> (Vec<u32>, Vec<f32>, Vec<u8>) {
        let text = b"HiLP".to_vec();
        #[rustfmt::skip]
        let u32_data = vec![
            MAGIC, SCHEMA_VERSION, 3, 4,
            // root: id 0, depth 0, container, no style, no runs
            0, 0, NODE_CONTAINER, 0, 0, 0, 0,
            // paragraph: id 1, depth 1, one run
            1, 1, NODE_PARAGRAPH, 0, 0, 0, 1,
            //   run: "Hi", 1 fragment
            0, 2, 1,
            // list item: id 2, depth 1, contextual, style "LP"
            2, 1, NODE_LIST_ITEM, FLAG_CONTEXTUAL_SPACING, 2, 2, 0,
        ];
        #[rustfmt::skip]
        let f32_data = vec![
            // root bounds + spacing
            0.0, 0.0, 600.0, 500.0, 0.0, 0.0,
            // paragraph bounds + spacing
            0.0, 0.0, 600.0, 20.0, 0.0, 0.0,
            //   fragment
            0.0, 0.0, 16.0, 20.0,
            // list item bounds + spacing (120/160 twips)
            0.0, 20.0, 600.0, 20.0, 120.0, 160.0,
        ];
        (u32_data, f32_data, text)
    }

    #[test]
    fn test_decode_content_tree() {
        let (u32_data, f32_data, text) = sample_buffers();
        let root = decode_content(&u32_data, &f32_data, &text).expect("decodes");

        assert_eq!(root.bounds.height, 500.0);
        assert_eq!(root.children.len(), 2);

        let para = &root.children[0];
        assert_eq!(para.id, NodeId(1));
        assert_eq!(para.runs[0].text, "Hi");
        assert_eq!(para.runs[0].fragments.len(), 1);

        let item = &root.children[1];
        assert_eq!(item.kind, NodeKind::ListItem);
        assert!(item.style.contextual_spacing);
        assert_eq!(item.style.style_id.as_deref(), Some("LP"));
        assert_eq!(item.style.spacing_after, 160.0);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        let (u32_data, f32_data, text) = sample_buffers();

        // Bad magic
        let mut bad = u32_data.clone();
        bad[0] = 0xDEAD_BEEF;
        assert!(decode_content(&bad, &f32_data, &text).is_none());

        // Truncated f32 stream
        assert!(decode_content(&u32_data, &f32_data[..4], &text).is_none());

        // Out-of-range run text
        let mut bad = u32_data.clone();
        bad[CONTENT_HEADER_SIZE + U32_PER_NODE * 2] = 100;
        assert!(decode_content(&bad, &f32_data, &text).is_none());

        // Unknown opcode
        let mut bad = u32_data;
        bad[CONTENT_HEADER_SIZE + 2] = 99;
        assert!(decode_content(&bad, &f32_data, &text).is_none());
    }

    #[test]
    fn test_encode_frames_and_stats() {
        let mut paginator =
            Paginator::new(DocumentAttributes::default(), PaginatorOptions::default());
        let (u32_data, f32_data, text) = sample_buffers();
        let mut root = decode_content(&u32_data, &f32_data, &text).expect("decodes");
        root.bounds.height = 500.0;

        paginator.notify_mounted(0.0);
        paginator.tick(&root, 100.0).expect("pass should run");

        let mut buf = FrameBuffer::new();
        buf.encode(&paginator);

        assert_eq!(buf.u32_data[0], MAGIC);
        assert_eq!(buf.u32_data[2], 1); // pass_lo
        assert_eq!(buf.u32_data[4], 1); // frame_count
        assert_eq!(buf.u32_data[5], 1); // page_count
        assert_eq!(buf.u32_data[7], 1); // one contextual adjustment
        let frame_flags = buf.u32_data[HEADER_SIZE + 1];
        assert_ne!(frame_flags & FRAME_LIVE, 0);

        // Adjustment for node 2: authored 6pt/8pt restored
        let adj_idx = HEADER_SIZE + U32_PER_FRAME;
        assert_eq!(buf.u32_data[adj_idx], 2);
        assert_eq!(buf.f32_data[F32_PER_FRAME], 6.0);
        assert_eq!(buf.f32_data[F32_PER_FRAME + 1], 8.0);
    }
}
