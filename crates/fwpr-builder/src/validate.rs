//! Structural validation of a resolved procedure descriptor.

use std::collections::VecDeque;

use fwpr_core::descriptor::{Edge, NodeIdx, NodeKind, ProcedureDescriptor};

use crate::error::{BuildError, Diagnostic, DiagnosticCollector, ErrorCode};

/// Checks the structural rules of a procedure.
///
/// Every violated rule is reported; unreachable nodes and branches shadowed
/// by a default branch are reported as warnings only.
pub(crate) fn validate(descriptor: &ProcedureDescriptor) -> Result<(), BuildError> {
    let mut collector = DiagnosticCollector::new();

    if descriptor.initial().is_none() {
        collector.emit(
            Diagnostic::error(format!(
                "procedure `{}` has no initial node",
                descriptor.name()
            ))
            .with_code(ErrorCode::E200)
            .with_label("procedure", "missing initial node"),
        );
    }

    for (idx, node) in descriptor.indexed_nodes() {
        match node.kind() {
            NodeKind::Initial => check_initial(descriptor, idx, &mut collector),
            NodeKind::Action => check_action(descriptor, idx, &mut collector),
            NodeKind::Decision => check_decision(descriptor, idx, &mut collector),
            NodeKind::Final => {}
        }
    }

    check_reachability(descriptor, &mut collector);

    collector.finish()
}

fn check_initial(descriptor: &ProcedureDescriptor, idx: NodeIdx, collector: &mut DiagnosticCollector) {
    let node = descriptor.node(idx);
    let edges: Vec<&Edge> = descriptor.outgoing(idx).collect();
    match edges.as_slice() {
        [edge] if edge.guard().trim().is_empty() => {}
        [edge] => collector.emit(
            Diagnostic::error("the transition out of the initial node must not be guarded")
                .with_code(ErrorCode::E201)
                .with_label(edge.id(), format!("guarded by `{}`", edge.guard()))
                .with_secondary_label(node.id(), "initial node"),
        ),
        _ => collector.emit(
            Diagnostic::error(format!(
                "the initial node must have exactly one outgoing transition, found {}",
                edges.len()
            ))
            .with_code(ErrorCode::E201)
            .with_label(node.id(), "initial node"),
        ),
    }
}

fn check_action(descriptor: &ProcedureDescriptor, idx: NodeIdx, collector: &mut DiagnosticCollector) {
    let node = descriptor.node(idx);
    let count = descriptor.outgoing(idx).count();
    if count != 1 {
        collector.emit(
            Diagnostic::error(format!(
                "action node `{}` must have exactly one outgoing transition, found {count}",
                node.name()
            ))
            .with_code(ErrorCode::E202)
            .with_label(node.id(), "action node")
            .with_help("use a decision node to branch"),
        );
    }
}

fn check_decision(
    descriptor: &ProcedureDescriptor,
    idx: NodeIdx,
    collector: &mut DiagnosticCollector,
) {
    let node = descriptor.node(idx);
    let edges = descriptor.outgoing_by_order(idx);
    if edges.is_empty() {
        collector.emit(
            Diagnostic::error(format!("decision node `{}` has no branches", node.name()))
                .with_code(ErrorCode::E203)
                .with_label(node.id(), "decision node"),
        );
        return;
    }

    let orders: Vec<u32> = edges.iter().map(|edge| edge.order()).collect();
    let expected: Vec<u32> = (1..=edges.len() as u32).collect();
    if orders != expected {
        collector.emit(
            Diagnostic::error(format!(
                "branches of decision node `{}` have orders {orders:?}, expected 1 to {}",
                node.name(),
                edges.len()
            ))
            .with_code(ErrorCode::E204)
            .with_label(node.id(), "decision node")
            .with_help("number the branches consecutively starting from 1"),
        );
    }

    let defaults: Vec<&Edge> = edges
        .iter()
        .copied()
        .filter(|edge| edge.is_default_guard())
        .collect();
    match defaults.as_slice() {
        [] => collector.emit(
            Diagnostic::error(format!(
                "decision node `{}` has no `else` branch",
                node.name()
            ))
            .with_code(ErrorCode::E205)
            .with_label(node.id(), "decision node")
            .with_help("add a branch guarded by `else`"),
        ),
        [default] => {
            let last = orders.iter().copied().max().unwrap_or_default();
            if default.order() != last {
                collector.emit(
                    Diagnostic::warning(format!(
                        "branches of decision node `{}` after the `else` branch are never taken",
                        node.name()
                    ))
                    .with_label(default.id(), "default branch"),
                );
            }
        }
        [first, rest @ ..] => {
            let mut diagnostic = Diagnostic::error(format!(
                "decision node `{}` has {} `else` branches",
                node.name(),
                defaults.len()
            ))
            .with_code(ErrorCode::E205)
            .with_label(first.id(), "first default branch");
            for edge in rest {
                diagnostic = diagnostic.with_secondary_label(edge.id(), "another default branch");
            }
            collector.emit(diagnostic);
        }
    }

    for edge in &edges {
        if !edge.is_default_guard() && edge.guard().trim().is_empty() {
            collector.emit(
                Diagnostic::error(format!(
                    "branch `{}` of decision node `{}` has no guard",
                    edge.id(),
                    node.name()
                ))
                .with_code(ErrorCode::E206)
                .with_label(edge.id(), "unguarded branch")
                .with_secondary_label(node.id(), "decision node"),
            );
        }
    }
}

fn check_reachability(descriptor: &ProcedureDescriptor, collector: &mut DiagnosticCollector) {
    let Some(initial) = descriptor.initial() else {
        return;
    };

    let mut visited = vec![false; descriptor.nodes().len()];
    let mut queue = VecDeque::from([initial]);
    visited[initial.index()] = true;
    while let Some(idx) = queue.pop_front() {
        for edge in descriptor.outgoing(idx) {
            let target = edge.target();
            if !visited[target.index()] {
                visited[target.index()] = true;
                queue.push_back(target);
            }
        }
    }

    for (idx, node) in descriptor.indexed_nodes() {
        if !visited[idx.index()] {
            collector.emit(
                Diagnostic::warning(format!(
                    "node `{}` is not reachable from the initial node",
                    node.name()
                ))
                .with_label(node.id(), "unreachable"),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use fwpr_core::{
        descriptor::Node,
        geometry::{Bounds, Point, Size},
    };

    use super::*;

    fn node(desc: &mut ProcedureDescriptor, id: &str, name: &str, kind: NodeKind) -> NodeIdx {
        let bounds = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(10.0, 10.0));
        desc.add_node(Node::new(id, name, kind, bounds, ""))
    }

    fn codes(result: Result<(), BuildError>) -> Vec<ErrorCode> {
        result
            .unwrap_err()
            .diagnostics()
            .iter()
            .filter_map(Diagnostic::code)
            .collect()
    }

    #[test]
    fn test_minimal_procedure_is_valid() {
        let mut desc = ProcedureDescriptor::new("P");
        let init = node(&mut desc, "n1", "Initial", NodeKind::Initial);
        let fin = node(&mut desc, "n2", "Final", NodeKind::Final);
        desc.add_edge(Edge::new("c1", init, fin, "", 1));
        assert!(validate(&desc).is_ok());
    }

    #[test]
    fn test_missing_initial() {
        let mut desc = ProcedureDescriptor::new("P");
        node(&mut desc, "n1", "Final", NodeKind::Final);
        assert_eq!(codes(validate(&desc)), vec![ErrorCode::E200]);
    }

    #[test]
    fn test_guarded_initial_transition() {
        let mut desc = ProcedureDescriptor::new("P");
        let init = node(&mut desc, "n1", "Initial", NodeKind::Initial);
        let fin = node(&mut desc, "n2", "Final", NodeKind::Final);
        desc.add_edge(Edge::new("c1", init, fin, "ready", 1));
        assert_eq!(codes(validate(&desc)), vec![ErrorCode::E201]);
    }

    #[test]
    fn test_action_with_two_exits() {
        let mut desc = ProcedureDescriptor::new("P");
        let init = node(&mut desc, "n1", "Initial", NodeKind::Initial);
        let a = node(&mut desc, "n2", "A", NodeKind::Action);
        let fin = node(&mut desc, "n3", "Final", NodeKind::Final);
        desc.add_edge(Edge::new("c1", init, a, "", 1));
        desc.add_edge(Edge::new("c2", a, fin, "", 1));
        desc.add_edge(Edge::new("c3", a, fin, "", 2));
        assert_eq!(codes(validate(&desc)), vec![ErrorCode::E202]);
    }

    #[test]
    fn test_decision_rules() {
        let mut desc = ProcedureDescriptor::new("P");
        let init = node(&mut desc, "n1", "Initial", NodeKind::Initial);
        let d = node(&mut desc, "n2", "D", NodeKind::Decision);
        let fin = node(&mut desc, "n3", "Final", NodeKind::Final);
        desc.add_edge(Edge::new("c1", init, d, "", 1));
        desc.add_edge(Edge::new("c2", d, fin, "", 1));
        desc.add_edge(Edge::new("c3", d, fin, "x", 3));
        let found = codes(validate(&desc));
        assert!(found.contains(&ErrorCode::E204));
        assert!(found.contains(&ErrorCode::E205));
        assert!(found.contains(&ErrorCode::E206));
    }

    #[test]
    fn test_decision_without_branches() {
        let mut desc = ProcedureDescriptor::new("P");
        let init = node(&mut desc, "n1", "Initial", NodeKind::Initial);
        let d = node(&mut desc, "n2", "D", NodeKind::Decision);
        desc.add_edge(Edge::new("c1", init, d, "", 1));
        assert_eq!(codes(validate(&desc)), vec![ErrorCode::E203]);
    }

    #[test]
    fn test_two_defaults() {
        let mut desc = ProcedureDescriptor::new("P");
        let init = node(&mut desc, "n1", "Initial", NodeKind::Initial);
        let d = node(&mut desc, "n2", "D", NodeKind::Decision);
        let fin = node(&mut desc, "n3", "Final", NodeKind::Final);
        desc.add_edge(Edge::new("c1", init, d, "", 1));
        desc.add_edge(Edge::new("c2", d, fin, "else", 1));
        desc.add_edge(Edge::new("c3", d, fin, "Else", 2));
        assert_eq!(codes(validate(&desc)), vec![ErrorCode::E205]);
    }

    #[test]
    fn test_warnings_do_not_fail() {
        let mut desc = ProcedureDescriptor::new("P");
        let init = node(&mut desc, "n1", "Initial", NodeKind::Initial);
        let d = node(&mut desc, "n2", "D", NodeKind::Decision);
        let fin = node(&mut desc, "n3", "Final", NodeKind::Final);
        let orphan = node(&mut desc, "n4", "Orphan", NodeKind::Action);
        desc.add_edge(Edge::new("c1", init, d, "", 1));
        desc.add_edge(Edge::new("c2", d, fin, "else", 1));
        desc.add_edge(Edge::new("c3", d, fin, "x > 1", 2));
        desc.add_edge(Edge::new("c4", orphan, fin, "", 1));
        assert!(validate(&desc).is_ok());
    }
}
