//! Step-driven execution of a synthesized procedure.
//!
//! [`ProcedureRuntime`] is the Rust counterpart of the generated C body: it
//! owns the current-node state and advances it one `execute` call at a time,
//! calling back into the host through [`ProcedureHooks`].

use std::fmt;

use log::trace;

use crate::synthesis::{ActionCall, ExecutionPlan, Flow, GuardCall};

/// Callbacks a host implements to run a procedure.
pub trait ProcedureHooks {
    /// Runs the action of a node.
    fn run_action(&mut self, call: &ActionCall);

    /// Evaluates the guard of an edge.
    fn check_guard(&mut self, call: &GuardCall) -> bool;
}

/// The state reported by [`ProcedureRuntime::current_node`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentNode<'plan> {
    Stopped,
    /// Parked at the resident node with this name.
    Resident(&'plan str),
}

impl fmt::Display for CurrentNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurrentNode::Stopped => write!(f, "Stopped"),
            CurrentNode::Resident(name) => write!(f, "{name}"),
        }
    }
}

enum Outcome {
    Stopped,
    Parked(usize),
}

/// A single procedure instance driven by its host.
///
/// # Examples
///
/// ```
/// # use fwpr::runtime::{CurrentNode, ProcedureHooks, ProcedureRuntime};
/// # use fwpr::synthesis::{ActionCall, GuardCall};
/// # use fwpr::ProcedureGenerator;
/// # use fwpr::model::{Model, RawConnection, RawElement};
/// struct AlwaysTrue;
///
/// impl ProcedureHooks for AlwaysTrue {
///     fn run_action(&mut self, _call: &ActionCall) {}
///     fn check_guard(&mut self, _call: &GuardCall) -> bool {
///         true
///     }
/// }
///
/// let model = Model::procedure("Once")
///     .with_element(RawElement::new("s1", "init").with_rect(0.0, 0.0, 10.0, 10.0))
///     .with_element(RawElement::new("s2", "final").with_rect(0.0, 50.0, 10.0, 10.0))
///     .with_connection(RawConnection::new("s1", "s2").with_order("1"));
/// let procedure = ProcedureGenerator::default().build(&model).unwrap().unwrap();
///
/// let mut runtime = ProcedureRuntime::new(procedure.plan());
/// runtime.start();
/// assert_eq!(runtime.current_node(), CurrentNode::Resident("Initial"));
/// runtime.execute(&mut AlwaysTrue);
/// assert!(!runtime.is_started());
/// ```
#[derive(Debug, Clone)]
pub struct ProcedureRuntime<'plan> {
    plan: &'plan ExecutionPlan,
    current: Option<usize>,
    procedure_exec_count: u64,
    node_exec_count: u64,
}

impl<'plan> ProcedureRuntime<'plan> {
    /// Creates a stopped runtime for `plan`.
    pub fn new(plan: &'plan ExecutionPlan) -> Self {
        Self {
            plan,
            current: None,
            procedure_exec_count: 0,
            node_exec_count: 0,
        }
    }

    /// Starts the procedure at its initial node. Does nothing if started.
    pub fn start(&mut self) {
        if self.current.is_some() {
            return;
        }
        // The initial node is always the first resident case.
        if self.plan.cases().is_empty() {
            return;
        }
        self.current = Some(0);
        self.procedure_exec_count = 0;
        self.node_exec_count = 0;
        trace!(procedure = self.plan.procedure(); "Procedure started");
    }

    /// Stops the procedure. Does nothing if stopped.
    pub fn stop(&mut self) {
        if self.current.take().is_some() {
            trace!(procedure = self.plan.procedure(); "Procedure stopped");
        }
    }

    pub fn is_started(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_node(&self) -> CurrentNode<'plan> {
        let plan = self.plan;
        match self.current {
            Some(pos) => CurrentNode::Resident(plan.cases()[pos].name()),
            None => CurrentNode::Stopped,
        }
    }

    /// Number of `execute` calls since the last `start`.
    pub fn procedure_exec_count(&self) -> u64 {
        self.procedure_exec_count
    }

    /// Number of `execute` calls since the current node was entered.
    pub fn node_exec_count(&self) -> u64 {
        self.node_exec_count
    }

    /// Runs the procedure forward as far as it can go.
    ///
    /// Starting at the current node, guards are checked and actions run
    /// until a resident node's guard is false or the final node is reached.
    /// Does nothing if the procedure is stopped.
    pub fn execute(&mut self, hooks: &mut impl ProcedureHooks) {
        let Some(mut pos) = self.current else {
            return;
        };
        self.procedure_exec_count += 1;
        self.node_exec_count += 1;

        let plan = self.plan;
        loop {
            let case = &plan.cases()[pos];
            let passed = case.guard().is_none_or(|guard| hooks.check_guard(guard));
            if !passed {
                trace!(node = case.name(); "Guard is false, procedure stays parked");
                return;
            }
            if let Some(action) = case.action() {
                hooks.run_action(action);
            }

            match run_flow(case.flow(), hooks) {
                Outcome::Stopped => {
                    self.current = None;
                    trace!(procedure = plan.procedure(); "Final node reached");
                    return;
                }
                Outcome::Parked(next) => {
                    if next != pos {
                        self.node_exec_count = 0;
                    }
                    self.current = Some(next);
                    pos = next;
                }
            }
        }
    }
}

fn run_flow(mut flow: &Flow, hooks: &mut impl ProcedureHooks) -> Outcome {
    loop {
        flow = match flow {
            Flow::Stop => return Outcome::Stopped,
            Flow::Park(pos) => return Outcome::Parked(*pos),
            Flow::Action { call, then } => {
                hooks.run_action(call);
                then.as_ref()
            }
            Flow::Branch { arms, default } => arms
                .iter()
                .find(|arm| hooks.check_guard(&arm.guard))
                .map_or(default.as_ref(), |arm| &arm.flow),
        };
    }
}
