//! Geometric attachment of documentation notes to nodes.
//!
//! A note documents a node when the note is connected to an anchor and
//! that anchor lies strictly inside the node's rectangle. The resolver is a
//! pure function over the anchors, the note-to-anchor links and the node
//! rectangles; merging its result into the descriptor is the builder's job.

use fwpr_core::{
    descriptor::{NodeIdx, NoteIdx, ProcedureDescriptor},
    geometry::Point,
};

/// A point used solely to tie notes to nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    id: String,
    point: Point,
}

impl Anchor {
    pub fn new(id: impl Into<String>, point: Point) -> Self {
        Self {
            id: id.into(),
            point,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn point(&self) -> Point {
        self.point
    }
}

/// A connection from a note to an anchor, by anchor position in the
/// anchor list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteLink {
    pub note: NoteIdx,
    pub anchor: usize,
}

/// A resolved note-to-node attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attachment {
    pub note: NoteIdx,
    pub node: NodeIdx,
}

/// Resolves which notes document which nodes.
///
/// For every anchor, every node whose rectangle strictly contains the
/// anchor is paired with every note linked to that anchor. Anchors that sit
/// in no node and notes without links produce nothing.
///
/// The result is ordered by anchor, then node, then link, and contains no
/// duplicate pairs.
pub fn resolve(
    anchors: &[Anchor],
    links: &[NoteLink],
    descriptor: &ProcedureDescriptor,
) -> Vec<Attachment> {
    let mut attachments = Vec::new();

    for (anchor_pos, anchor) in anchors.iter().enumerate() {
        let hosts = descriptor
            .indexed_nodes()
            .filter(|(_, node)| node.bounds().strictly_contains(anchor.point))
            .map(|(idx, _)| idx);

        for node in hosts {
            for link in links.iter().filter(|link| link.anchor == anchor_pos) {
                let attachment = Attachment {
                    note: link.note,
                    node,
                };
                if !attachments.contains(&attachment) {
                    attachments.push(attachment);
                }
            }
        }
    }

    attachments
}
