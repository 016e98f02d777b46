//! The validated procedure graph.
//!
//! A [`ProcedureDescriptor`] owns every [`Node`], [`Edge`] and [`Note`] of one
//! procedure. Entities refer to each other through typed indices
//! ([`NodeIdx`], [`EdgeIdx`], [`NoteIdx`]) into the descriptor's storage, so
//! the graph can contain cycles without shared ownership.
//!
//! Descriptors are assembled once by the descriptor builder and are
//! read-only afterwards.

use std::fmt;

use indexmap::IndexMap;

use crate::{
    geometry::Bounds,
    text::{is_default_guard_text, is_no_op_text, normalize_text},
};

/// Index of a [`Node`] inside its [`ProcedureDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(usize);

impl NodeIdx {
    /// Returns the position of the node in [`ProcedureDescriptor::nodes`].
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of an [`Edge`] inside its [`ProcedureDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeIdx(usize);

impl EdgeIdx {
    /// Returns the position of the edge in [`ProcedureDescriptor::edges`].
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a [`Note`] inside its [`ProcedureDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteIdx(usize);

impl NoteIdx {
    /// Returns the position of the note in [`ProcedureDescriptor::notes`].
    pub fn index(self) -> usize {
        self.0
    }
}

/// The kind of a procedure node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The single entry point of the procedure.
    Initial,
    /// The termination point. Reaching it stops the procedure.
    Final,
    /// A node executing an action.
    Action,
    /// A node selecting one of several guarded branches.
    Decision,
}

impl NodeKind {
    /// Returns the lowercase name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Initial => "initial",
            NodeKind::Final => "final",
            NodeKind::Action => "action",
            NodeKind::Decision => "decision",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of the procedure graph.
#[derive(Debug, Clone)]
pub struct Node {
    id: String,
    name: String,
    kind: NodeKind,
    bounds: Bounds,
    description: String,
    is_no_op: bool,
    outgoing: Vec<EdgeIdx>,
    notes: Vec<NoteIdx>,
}

impl Node {
    /// Creates a node without edges or notes.
    ///
    /// Line breaks in `description` are replaced with spaces and the no-op
    /// convention is evaluated once here.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: NodeKind,
        bounds: Bounds,
        description: &str,
    ) -> Self {
        let description = normalize_text(description);
        let is_no_op = is_no_op_text(&description);
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            bounds,
            description,
            is_no_op,
            outgoing: Vec::new(),
            notes: Vec::new(),
        }
    }

    /// Returns the element id the node was built from.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the unique human-readable name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Returns the action label or description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns `true` if the description is the "do nothing" convention.
    pub fn is_no_op(&self) -> bool {
        self.is_no_op
    }

    /// Returns the outgoing edges in model insertion order.
    pub fn outgoing(&self) -> &[EdgeIdx] {
        &self.outgoing
    }

    /// Returns the notes attached to this node.
    pub fn notes(&self) -> &[NoteIdx] {
        &self.notes
    }
}

/// A directed, optionally guarded transition between two nodes.
#[derive(Debug, Clone)]
pub struct Edge {
    id: String,
    source: NodeIdx,
    target: NodeIdx,
    guard: String,
    order: u32,
    is_default_guard: bool,
}

impl Edge {
    /// Creates an edge. Line breaks in `guard` are replaced with spaces.
    pub fn new(
        id: impl Into<String>,
        source: NodeIdx,
        target: NodeIdx,
        guard: &str,
        order: u32,
    ) -> Self {
        let guard = normalize_text(guard);
        let is_default_guard = is_default_guard_text(&guard);
        Self {
            id: id.into(),
            source,
            target,
            guard,
            order,
            is_default_guard,
        }
    }

    /// Returns the connection id the edge was built from.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn source(&self) -> NodeIdx {
        self.source
    }

    pub fn target(&self) -> NodeIdx {
        self.target
    }

    /// Returns the guard description, empty if the edge is unguarded.
    pub fn guard(&self) -> &str {
        &self.guard
    }

    /// Returns the tie-break rank among the source's outgoing edges.
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Returns `true` if the guard is the "else" convention.
    pub fn is_default_guard(&self) -> bool {
        self.is_default_guard
    }

    /// Returns `true` if the edge carries a genuine predicate.
    ///
    /// Unguarded edges and default edges never need a guard callback.
    pub fn has_predicate(&self) -> bool {
        !self.is_default_guard && !self.guard.trim().is_empty()
    }
}

/// A documentation note attached to nodes.
#[derive(Debug, Clone)]
pub struct Note {
    id: String,
    bounds: Bounds,
    text: String,
    nodes: Vec<NodeIdx>,
}

impl Note {
    /// Creates an unattached note. Line breaks in `text` are replaced with spaces.
    pub fn new(id: impl Into<String>, bounds: Bounds, text: &str) -> Self {
        Self {
            id: id.into(),
            bounds,
            text: normalize_text(text),
            nodes: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the nodes this note documents.
    pub fn nodes(&self) -> &[NodeIdx] {
        &self.nodes
    }
}

/// A complete procedure graph.
///
/// Owns all nodes, edges and notes, and indexes nodes by name and by
/// element id.
#[derive(Debug, Clone)]
pub struct ProcedureDescriptor {
    name: String,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    notes: Vec<Note>,
    by_name: IndexMap<String, NodeIdx>,
    by_id: IndexMap<String, NodeIdx>,
}

impl ProcedureDescriptor {
    /// Creates an empty descriptor.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            edges: Vec::new(),
            notes: Vec::new(),
            by_name: IndexMap::new(),
            by_id: IndexMap::new(),
        }
    }

    /// Adds a node and indexes it by name and id.
    ///
    /// Names and ids are expected to be unique; the builder checks this
    /// before calling. A repeated name or id re-points the index entry to the
    /// new node.
    pub fn add_node(&mut self, node: Node) -> NodeIdx {
        let idx = NodeIdx(self.nodes.len());
        self.by_name.insert(node.name.clone(), idx);
        self.by_id.insert(node.id.clone(), idx);
        self.nodes.push(node);
        idx
    }

    /// Adds an edge and appends it to its source node's outgoing list.
    ///
    /// # Panics
    ///
    /// Panics if the edge's source does not belong to this descriptor.
    pub fn add_edge(&mut self, edge: Edge) -> EdgeIdx {
        let idx = EdgeIdx(self.edges.len());
        self.nodes[edge.source.0].outgoing.push(idx);
        self.edges.push(edge);
        idx
    }

    /// Adds an unattached note.
    pub fn add_note(&mut self, note: Note) -> NoteIdx {
        let idx = NoteIdx(self.notes.len());
        self.notes.push(note);
        idx
    }

    /// Records that `note` documents `node`, on both sides.
    ///
    /// Attaching the same pair twice has no effect.
    ///
    /// # Panics
    ///
    /// Panics if either index does not belong to this descriptor.
    pub fn attach(&mut self, note: NoteIdx, node: NodeIdx) {
        let note_nodes = &mut self.notes[note.0].nodes;
        if note_nodes.contains(&node) {
            return;
        }
        note_nodes.push(node);
        self.nodes[node.0].notes.push(note);
    }

    /// Returns the procedure name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns all nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns all nodes paired with their indices.
    pub fn indexed_nodes(&self) -> impl Iterator<Item = (NodeIdx, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeIdx(i), node))
    }

    /// Returns all edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns all edges paired with their indices.
    pub fn indexed_edges(&self) -> impl Iterator<Item = (EdgeIdx, &Edge)> {
        self.edges
            .iter()
            .enumerate()
            .map(|(i, edge)| (EdgeIdx(i), edge))
    }

    /// Returns all notes in insertion order.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Returns the node at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` does not belong to this descriptor.
    pub fn node(&self, idx: NodeIdx) -> &Node {
        &self.nodes[idx.0]
    }

    /// Returns the edge at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` does not belong to this descriptor.
    pub fn edge(&self, idx: EdgeIdx) -> &Edge {
        &self.edges[idx.0]
    }

    /// Returns the note at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` does not belong to this descriptor.
    pub fn note(&self, idx: NoteIdx) -> &Note {
        &self.notes[idx.0]
    }

    /// Looks a node up by its unique name.
    pub fn node_by_name(&self, name: &str) -> Option<NodeIdx> {
        self.by_name.get(name).copied()
    }

    /// Looks a node up by its element id.
    pub fn node_by_id(&self, id: &str) -> Option<NodeIdx> {
        self.by_id.get(id).copied()
    }

    /// Returns the name index in insertion order.
    pub fn names(&self) -> &IndexMap<String, NodeIdx> {
        &self.by_name
    }

    /// Returns the element id index in insertion order.
    pub fn ids(&self) -> &IndexMap<String, NodeIdx> {
        &self.by_id
    }

    /// Returns the first node of kind [`NodeKind::Initial`].
    pub fn initial(&self) -> Option<NodeIdx> {
        self.indexed_nodes()
            .find(|(_, node)| node.kind == NodeKind::Initial)
            .map(|(idx, _)| idx)
    }

    /// Returns the outgoing edges of `idx` in model insertion order.
    pub fn outgoing(&self, idx: NodeIdx) -> impl Iterator<Item = &Edge> {
        self.node(idx)
            .outgoing
            .iter()
            .map(|edge_idx| self.edge(*edge_idx))
    }

    /// Returns the outgoing edges of `idx` sorted by ascending order.
    ///
    /// Edges with equal order keep their insertion order.
    pub fn outgoing_by_order(&self, idx: NodeIdx) -> Vec<&Edge> {
        let mut edges: Vec<&Edge> = self.outgoing(idx).collect();
        edges.sort_by_key(|edge| edge.order);
        edges
    }
}
