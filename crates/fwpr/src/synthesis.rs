//! Synthesis of the per-invocation control flow.
//!
//! The [`ExecutionPlan`] holds one [`ResidentCase`] per resident node. A case
//! describes everything one `Execute` invocation does when the procedure is
//! parked at that node: the guard to check, the node's own action, and the
//! [`Flow`] through every transient node reached afterwards. Flows end either
//! by stopping the procedure or by parking it at the next resident node.
//!
//! The plan is consumed by the C exporter and by
//! [`ProcedureRuntime`](crate::runtime::ProcedureRuntime).

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, info, trace};

use fwpr_builder::{BuildError, Diagnostic, ErrorCode};
use fwpr_core::descriptor::{EdgeIdx, NodeIdx, NodeKind, ProcedureDescriptor};

use crate::{classify::Classification, config::NamingConfig, error::FwprError};

/// Operations of the generated control surface, after the function prefix.
const CONTROL_SURFACE: &[&str] = &[
    "Start",
    "Stop",
    "Execute",
    "IsStarted",
    "GetCurNode",
    "GetPrExecCnt",
    "GetNodeExecCnt",
    "Nodes_t",
];

/// Label of diagnostics about names owned by the procedure itself.
const PROCEDURE_LABEL: &str = "procedure";

/// A call to the user callback implementing a node's action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionCall {
    node: NodeIdx,
    function: String,
}

impl ActionCall {
    /// The node whose action is run.
    pub fn node(&self) -> NodeIdx {
        self.node
    }

    /// Name of the generated callback.
    pub fn function(&self) -> &str {
        &self.function
    }
}

/// A call to the user callback evaluating an edge's guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardCall {
    edge: EdgeIdx,
    function: String,
}

impl GuardCall {
    /// The edge whose guard is evaluated.
    pub fn edge(&self) -> EdgeIdx {
        self.edge
    }

    /// Name of the generated callback.
    pub fn function(&self) -> &str {
        &self.function
    }
}

/// A guarded branch of a decision.
#[derive(Debug, Clone, PartialEq)]
pub struct Arm {
    pub guard: GuardCall,
    pub flow: Flow,
}

/// What happens after a resident node's guard has passed.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// The final node is reached; the procedure stops.
    Stop,
    /// The procedure parks at the resident case with this position.
    Park(usize),
    /// A transient action runs, then the flow continues.
    Action { call: ActionCall, then: Box<Flow> },
    /// A decision: the first arm whose guard holds is taken, else `default`.
    Branch { arms: Vec<Arm>, default: Box<Flow> },
}

/// The dispatch case of one resident node.
#[derive(Debug, Clone, PartialEq)]
pub struct ResidentCase {
    node: NodeIdx,
    name: String,
    guard: Option<GuardCall>,
    action: Option<ActionCall>,
    flow: Flow,
}

impl ResidentCase {
    pub fn node(&self) -> NodeIdx {
        self.node
    }

    /// Name of the resident node.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Guard checked before leaving the node; `None` for the initial node.
    pub fn guard(&self) -> Option<&GuardCall> {
        self.guard.as_ref()
    }

    /// The node's own action, run once the guard passes.
    pub fn action(&self) -> Option<&ActionCall> {
        self.action.as_ref()
    }

    pub fn flow(&self) -> &Flow {
        &self.flow
    }
}

/// The synthesized control flow of a procedure.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    procedure: String,
    cases: Vec<ResidentCase>,
    actions: Vec<ActionCall>,
    guards: Vec<GuardCall>,
}

impl ExecutionPlan {
    /// Synthesizes the plan of a validated, classified descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`FwprError::Invariant`] if the descriptor breaks a rule that
    /// validation guarantees, such as a decision without default branch or a
    /// flow that does not end within as many steps as there are nodes.
    pub fn synthesize(
        descriptor: &ProcedureDescriptor,
        classification: &Classification,
        naming: &NamingConfig,
    ) -> Result<Self, FwprError> {
        info!(procedure = descriptor.name(); "Synthesizing execution plan");

        let names = CallbackNames::new(descriptor, naming);
        names
            .check_unique(descriptor, classification, naming)
            .map_err(|err| FwprError::new_build_error(err, descriptor.name()))?;
        let positions: HashMap<NodeIdx, usize> = classification
            .residents()
            .iter()
            .enumerate()
            .map(|(pos, idx)| (*idx, pos))
            .collect();
        let synthesizer = Synthesizer {
            descriptor,
            classification,
            names: &names,
            positions: &positions,
        };

        let cases = classification
            .residents()
            .iter()
            .map(|idx| synthesizer.resident_case(*idx))
            .collect::<Result<Vec<_>, _>>()?;

        let plan = Self {
            procedure: descriptor.name().to_string(),
            cases,
            actions: names.actions.into_values().collect(),
            guards: names.guards.into_values().collect(),
        };
        debug!(
            cases = plan.cases.len(),
            actions = plan.actions.len(),
            guards = plan.guards.len();
            "Execution plan synthesized"
        );
        trace!(plan:?; "Synthesized plan");
        Ok(plan)
    }

    /// Name of the procedure.
    pub fn procedure(&self) -> &str {
        &self.procedure
    }

    /// Resident cases; position `i` is enumerator value `i + 1`.
    pub fn cases(&self) -> &[ResidentCase] {
        &self.cases
    }

    /// Returns the case position of a resident node.
    pub fn case_position(&self, node: NodeIdx) -> Option<usize> {
        self.cases.iter().position(|case| case.node == node)
    }

    /// Every action callback, in node order.
    pub fn actions(&self) -> &[ActionCall] {
        &self.actions
    }

    /// Every guard callback, in edge order.
    pub fn guards(&self) -> &[GuardCall] {
        &self.guards
    }
}

/// Deterministic callback names.
///
/// Actions are named `<prefix><Proc><Node>`. Guards are named
/// `<prefix><Proc><From>To<To>`, with the edge order appended when several
/// guarded edges join the same pair of nodes.
struct CallbackNames {
    actions: IndexMap<NodeIdx, ActionCall>,
    guards: IndexMap<EdgeIdx, GuardCall>,
}

impl CallbackNames {
    fn new(descriptor: &ProcedureDescriptor, naming: &NamingConfig) -> Self {
        let prefix = format!("{}{}", naming.function_prefix(), descriptor.name());

        let actions = descriptor
            .indexed_nodes()
            .filter(|(_, node)| node.kind() == NodeKind::Action && !node.is_no_op())
            .map(|(idx, node)| {
                let call = ActionCall {
                    node: idx,
                    function: format!("{prefix}{}", node.name()),
                };
                (idx, call)
            })
            .collect();

        let mut pair_counts: HashMap<(NodeIdx, NodeIdx), usize> = HashMap::new();
        for edge in descriptor.edges().iter().filter(|edge| edge.has_predicate()) {
            *pair_counts
                .entry((edge.source(), edge.target()))
                .or_default() += 1;
        }

        let guards = descriptor
            .indexed_edges()
            .filter(|(_, edge)| edge.has_predicate())
            .map(|(idx, edge)| {
                let from = descriptor.node(edge.source()).name();
                let to = descriptor.node(edge.target()).name();
                let mut function = format!("{prefix}{from}To{to}");
                let shared = pair_counts
                    .get(&(edge.source(), edge.target()))
                    .is_some_and(|count| *count > 1);
                if shared {
                    function.push_str(&edge.order().to_string());
                }
                (idx, GuardCall { edge: idx, function })
            })
            .collect();

        Self { actions, guards }
    }

    /// Rejects two elements generating the same C identifier.
    ///
    /// Callbacks, enumerators and the control surface share one namespace,
    /// so a node `AToB` clashes with the guard of a transition from `A` to
    /// `B`.
    fn check_unique(
        &self,
        descriptor: &ProcedureDescriptor,
        classification: &Classification,
        naming: &NamingConfig,
    ) -> Result<(), BuildError> {
        let procedure = descriptor.name();
        let control = format!("{}{procedure}", naming.function_prefix());
        let enumerator = format!("{}{procedure}", naming.enum_prefix());

        // (identifier, element producing it)
        let mut generated: Vec<(String, String)> = CONTROL_SURFACE
            .iter()
            .map(|operation| (format!("{control}{operation}"), PROCEDURE_LABEL.to_string()))
            .collect();
        generated.push((format!("{enumerator}Stopped"), PROCEDURE_LABEL.to_string()));
        generated.extend(classification.residents().iter().map(|idx| {
            let node = descriptor.node(*idx);
            (format!("{enumerator}{}", node.name()), node.id().to_string())
        }));
        generated.extend(self.actions.values().map(|call| {
            let id = descriptor.node(call.node).id();
            (call.function.clone(), id.to_string())
        }));
        generated.extend(self.guards.values().map(|call| {
            let id = descriptor.edge(call.edge).id();
            (call.function.clone(), id.to_string())
        }));

        let mut owners: HashMap<&str, &str> = HashMap::new();
        let mut diagnostics = Vec::new();
        for (identifier, owner) in &generated {
            match owners.get(identifier.as_str()).copied() {
                Some(first) => diagnostics.push(
                    Diagnostic::error(format!(
                        "generated name `{identifier}` is produced by both `{first}` and `{owner}`"
                    ))
                    .with_code(ErrorCode::E105)
                    .with_label(owner.as_str(), "generates the name again")
                    .with_secondary_label(first, "first generates it")
                    .with_help("rename one of the nodes or choose distinct naming prefixes"),
                ),
                None => {
                    owners.insert(identifier.as_str(), owner.as_str());
                }
            }
        }

        if diagnostics.is_empty() {
            Ok(())
        } else {
            Err(BuildError::from(diagnostics))
        }
    }
}

struct Synthesizer<'a> {
    descriptor: &'a ProcedureDescriptor,
    classification: &'a Classification,
    names: &'a CallbackNames,
    positions: &'a HashMap<NodeIdx, usize>,
}

impl Synthesizer<'_> {
    fn resident_case(&self, idx: NodeIdx) -> Result<ResidentCase, FwprError> {
        let node = self.descriptor.node(idx);
        let [edge_idx] = node.outgoing() else {
            return Err(FwprError::Invariant(format!(
                "resident node `{}` has {} exits",
                node.name(),
                node.outgoing().len()
            )));
        };
        let edge = self.descriptor.edge(*edge_idx);

        let guard = self.names.guards.get(edge_idx).cloned();
        let action = self.names.actions.get(&idx).cloned();
        let flow = self.flatten(edge.target(), 0)?;

        Ok(ResidentCase {
            node: idx,
            name: node.name().to_string(),
            guard,
            action,
            flow,
        })
    }

    /// Builds the flow entered at `idx`.
    ///
    /// `depth` counts the transient nodes walked so far; a walk longer than
    /// the node count has revisited a node and would never end.
    fn flatten(&self, idx: NodeIdx, depth: usize) -> Result<Flow, FwprError> {
        let node = self.descriptor.node(idx);
        if depth > self.descriptor.nodes().len() {
            return Err(FwprError::Invariant(format!(
                "flattening did not terminate at node `{}`",
                node.name()
            )));
        }

        if let Some(pos) = self.positions.get(&idx) {
            return Ok(Flow::Park(*pos));
        }

        match node.kind() {
            NodeKind::Final => Ok(Flow::Stop),
            NodeKind::Action => {
                let [edge_idx] = node.outgoing() else {
                    return Err(FwprError::Invariant(format!(
                        "transient action `{}` has {} exits",
                        node.name(),
                        node.outgoing().len()
                    )));
                };
                let then = self.flatten(self.descriptor.edge(*edge_idx).target(), depth + 1)?;
                match self.names.actions.get(&idx) {
                    Some(call) => Ok(Flow::Action {
                        call: call.clone(),
                        then: Box::new(then),
                    }),
                    None => Ok(then),
                }
            }
            NodeKind::Decision => {
                let mut branches = node.outgoing().to_vec();
                branches.sort_by_key(|edge_idx| self.descriptor.edge(*edge_idx).order());

                let mut arms = Vec::new();
                for edge_idx in branches {
                    let edge = self.descriptor.edge(edge_idx);
                    let flow = self.flatten(edge.target(), depth + 1)?;
                    if edge.is_default_guard() {
                        return Ok(Flow::Branch {
                            arms,
                            default: Box::new(flow),
                        });
                    }
                    let guard = self.names.guards.get(&edge_idx).cloned().ok_or_else(|| {
                        FwprError::Invariant(format!(
                            "branch `{}` of decision `{}` has no guard",
                            edge.id(),
                            node.name()
                        ))
                    })?;
                    arms.push(Arm { guard, flow });
                }
                Err(FwprError::Invariant(format!(
                    "decision `{}` has no default branch",
                    node.name()
                )))
            }
            NodeKind::Initial => Err(FwprError::Invariant(format!(
                "initial node reached from `{}` while not resident",
                node.name()
            ))),
        }
    }
}
