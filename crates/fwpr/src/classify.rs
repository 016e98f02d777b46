//! Resident/transient classification of procedure nodes.
//!
//! A resident node is a place where the procedure may stay parked between
//! two `Execute` invocations. Only the initial node and nodes whose single
//! exit is guarded by a real predicate qualify; every other node is walked
//! through within one invocation.

use std::collections::HashMap;

use log::debug;
use petgraph::{
    algo::tarjan_scc,
    graph::{DiGraph, NodeIndex},
};

use fwpr_builder::{BuildError, Diagnostic, ErrorCode};
use fwpr_core::descriptor::{Edge, NodeIdx, NodeKind, ProcedureDescriptor};

/// Whether a node can be the parked state of a procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Residency {
    Resident,
    Transient,
}

impl Residency {
    pub fn is_resident(self) -> bool {
        self == Residency::Resident
    }
}

/// Returns the residency of the node at `idx`.
pub fn residency(descriptor: &ProcedureDescriptor, idx: NodeIdx) -> Residency {
    match descriptor.node(idx).kind() {
        NodeKind::Initial => Residency::Resident,
        NodeKind::Final => Residency::Transient,
        NodeKind::Action | NodeKind::Decision => {
            let edges: Vec<&Edge> = descriptor.outgoing(idx).collect();
            match edges.as_slice() {
                [edge] if edge.has_predicate() => Residency::Resident,
                _ => Residency::Transient,
            }
        }
    }
}

/// The residency of every node of a descriptor.
#[derive(Debug, Clone)]
pub struct Classification {
    residency: Vec<Residency>,
    /// Resident nodes, initial node first, then in descriptor order.
    residents: Vec<NodeIdx>,
}

impl Classification {
    /// Classifies every node and rejects cycles of transient nodes.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] with one [`ErrorCode::E207`] diagnostic per
    /// cycle that never passes through a resident node. Walking such a cycle
    /// within one invocation would never end.
    pub fn classify(descriptor: &ProcedureDescriptor) -> Result<Self, BuildError> {
        let residency: Vec<Residency> = descriptor
            .indexed_nodes()
            .map(|(idx, _)| residency(descriptor, idx))
            .collect();

        let mut residents: Vec<NodeIdx> = descriptor.initial().into_iter().collect();
        residents.extend(descriptor.indexed_nodes().filter_map(|(idx, node)| {
            (residency[idx.index()].is_resident() && node.kind() != NodeKind::Initial)
                .then_some(idx)
        }));

        let classification = Self {
            residency,
            residents,
        };
        classification.check_transient_cycles(descriptor)?;

        for (idx, node) in descriptor.indexed_nodes() {
            debug!(
                node = node.name(),
                kind = node.kind().as_str(),
                resident = classification.is_resident(idx);
                "Node classified"
            );
        }
        Ok(classification)
    }

    /// Returns the residency of the node at `idx`.
    pub fn residency(&self, idx: NodeIdx) -> Residency {
        self.residency[idx.index()]
    }

    pub fn is_resident(&self, idx: NodeIdx) -> bool {
        self.residency(idx).is_resident()
    }

    /// Returns the resident nodes, initial node first.
    pub fn residents(&self) -> &[NodeIdx] {
        &self.residents
    }

    fn check_transient_cycles(&self, descriptor: &ProcedureDescriptor) -> Result<(), BuildError> {
        let mut graph: DiGraph<NodeIdx, ()> = DiGraph::new();
        let mut graph_nodes: HashMap<NodeIdx, NodeIndex> = HashMap::new();
        for (idx, _) in descriptor.indexed_nodes() {
            if !self.is_resident(idx) {
                graph_nodes.insert(idx, graph.add_node(idx));
            }
        }
        for edge in descriptor.edges() {
            if let (Some(&from), Some(&to)) =
                (graph_nodes.get(&edge.source()), graph_nodes.get(&edge.target()))
            {
                graph.add_edge(from, to, ());
            }
        }

        let mut diagnostics = Vec::new();
        for component in tarjan_scc(&graph) {
            let cyclic = match component.as_slice() {
                [single] => graph.contains_edge(*single, *single),
                _ => true,
            };
            if !cyclic {
                continue;
            }

            let mut members: Vec<NodeIdx> = component.iter().map(|n| graph[*n]).collect();
            members.sort();
            let names: Vec<&str> = members
                .iter()
                .map(|idx| descriptor.node(*idx).name())
                .collect();

            let mut diagnostic = Diagnostic::error(format!(
                "nodes {} form a cycle without a guarded pause point",
                names
                    .iter()
                    .map(|name| format!("`{name}`"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
            .with_code(ErrorCode::E207)
            .with_help("guard one transition of the cycle so that the procedure can pause there");
            for (pos, idx) in members.iter().enumerate() {
                let id = descriptor.node(*idx).id();
                diagnostic = if pos == 0 {
                    diagnostic.with_label(id, "part of the cycle")
                } else {
                    diagnostic.with_secondary_label(id, "part of the cycle")
                };
            }
            diagnostics.push(diagnostic);
        }

        if diagnostics.is_empty() {
            Ok(())
        } else {
            Err(BuildError::new(diagnostics))
        }
    }
}
