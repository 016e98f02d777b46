//! Assembly of a [`ProcedureDescriptor`] from a raw [`Model`].
//!
//! The builder classifies every element by its declared kind, names nodes,
//! resolves connections into edges, merges note attachments and finally
//! hands the descriptor to structural validation. All problems found along
//! the way are collected and reported together.

use std::collections::HashMap;

use indexmap::IndexMap;
use log::{debug, info, trace};

use fwpr_core::{
    descriptor::{Edge, Node, NodeIdx, NodeKind, Note, NoteIdx, ProcedureDescriptor},
    geometry::{Bounds, Point, Size},
    text::is_c_identifier,
};

use crate::{
    attach::{self, Anchor, NoteLink},
    error::{BuildError, Diagnostic, DiagnosticCollector, ErrorCode, Result as DiagnosticResult},
    model::{Model, RawConnection, RawElement},
    validate,
};

/// Name given to a procedure whose model carries none.
pub const DEFAULT_PROCEDURE_NAME: &str = "Unnamed";

/// Names taken by the generated control surface.
pub const RESERVED_NAMES: &[&str] = &[
    "Start",
    "Stop",
    "Execute",
    "IsStarted",
    "GetCurNode",
    "GetPrExecCnt",
    "GetNodeExecCnt",
    "Stopped",
    "Nodes_t",
];

/// The result of a successful build.
#[derive(Debug)]
pub enum BuildOutcome {
    /// The model describes a procedure.
    Procedure(ProcedureDescriptor),
    /// The model is some other kind of editor document; nothing to generate.
    NotApplicable { document_kind: String },
}

impl BuildOutcome {
    /// Returns the descriptor, or `None` for a non-procedure document.
    pub fn into_procedure(self) -> Option<ProcedureDescriptor> {
        match self {
            BuildOutcome::Procedure(descriptor) => Some(descriptor),
            BuildOutcome::NotApplicable { .. } => None,
        }
    }
}

/// Builds and validates the procedure descriptor of `model`.
///
/// # Errors
///
/// Returns a [`BuildError`] holding one diagnostic per model defect: missing
/// fields, unknown kinds, duplicate names, dangling connections, malformed
/// orders and every violated structural rule.
///
/// # Examples
///
/// ```
/// # use fwpr_builder::{build, BuildOutcome, model::{Model, RawConnection, RawElement}};
/// let model = Model::procedure("Blink")
///     .with_element(RawElement::new("s1", "init").with_rect(0.0, 0.0, 10.0, 10.0))
///     .with_element(RawElement::new("s2", "final").with_rect(0.0, 50.0, 10.0, 10.0))
///     .with_connection(RawConnection::new("s1", "s2").with_order("1"));
///
/// let descriptor = build(&model).unwrap().into_procedure().unwrap();
/// assert_eq!(descriptor.nodes().len(), 2);
/// ```
pub fn build(model: &Model) -> Result<BuildOutcome, BuildError> {
    if !model.is_procedure() {
        info!(document_kind = model.document_kind.as_str(); "Model is not a procedure, nothing to build");
        return Ok(BuildOutcome::NotApplicable {
            document_kind: model.document_kind.clone(),
        });
    }

    let name = model
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_PROCEDURE_NAME);
    info!(
        procedure = name,
        elements = model.elements.len(),
        connections = model.connections.len();
        "Building procedure descriptor"
    );

    let mut builder = DescriptorBuilder::new(name);
    builder.check_procedure_name();
    for (pos, element) in model.elements.iter().enumerate() {
        builder.add_element(pos, element);
    }
    for (pos, connection) in model.connections.iter().enumerate() {
        builder.add_connection(pos, connection);
    }
    let descriptor = builder.finish()?;

    validate::validate(&descriptor)?;

    debug!(
        nodes = descriptor.nodes().len(),
        edges = descriptor.edges().len(),
        notes = descriptor.notes().len();
        "Procedure descriptor built"
    );
    trace!(descriptor:?; "Built descriptor");

    Ok(BuildOutcome::Procedure(descriptor))
}

/// What an element id resolved to.
#[derive(Debug, Clone, Copy)]
enum Registered {
    Node(NodeIdx),
    Note(NoteIdx),
    Anchor(usize),
    /// The element was reported as malformed; connections to it are skipped.
    Rejected,
}

#[derive(Debug, Clone, Copy)]
enum ElementKind {
    Node(NodeKind),
    Note,
    Anchor,
}

impl ElementKind {
    fn parse(kind: &str) -> Option<Self> {
        let kind = match kind.trim().to_ascii_lowercase().as_str() {
            "init" | "initial" => ElementKind::Node(NodeKind::Initial),
            "final" => ElementKind::Node(NodeKind::Final),
            "state" | "action" => ElementKind::Node(NodeKind::Action),
            "choice" | "decision" => ElementKind::Node(NodeKind::Decision),
            "note" => ElementKind::Note,
            "notedot" | "anchor" => ElementKind::Anchor,
            _ => return None,
        };
        Some(kind)
    }
}

struct DescriptorBuilder {
    descriptor: ProcedureDescriptor,
    anchors: Vec<Anchor>,
    links: Vec<NoteLink>,
    registry: HashMap<String, Registered>,
    /// Node name to the id of the element that claimed it.
    names: IndexMap<String, String>,
    collector: DiagnosticCollector,
}

impl DescriptorBuilder {
    fn new(name: &str) -> Self {
        Self {
            descriptor: ProcedureDescriptor::new(name),
            anchors: Vec::new(),
            links: Vec::new(),
            registry: HashMap::new(),
            names: IndexMap::new(),
            collector: DiagnosticCollector::new(),
        }
    }

    fn check_procedure_name(&mut self) {
        let name = self.descriptor.name();
        if !is_c_identifier(name) {
            self.collector.emit(
                Diagnostic::error(format!("procedure name `{name}` is not a valid identifier"))
                    .with_code(ErrorCode::E004)
                    .with_label("procedure", "used as prefix of every generated name")
                    .with_help("use letters, digits and underscores only"),
            );
        }
    }

    fn add_element(&mut self, pos: usize, element: &RawElement) {
        let Some(id) = element.id.as_deref() else {
            let label = format!("element #{}", pos + 1);
            self.collector.emit(
                Diagnostic::error(format!("{label} has no id"))
                    .with_code(ErrorCode::E001)
                    .with_label(label, "missing id"),
            );
            return;
        };

        if self.registry.contains_key(id) {
            self.collector.emit(
                Diagnostic::error(format!("element id `{id}` is used more than once"))
                    .with_code(ErrorCode::E104)
                    .with_label(id, "duplicate id"),
            );
            return;
        }

        let entry = match self.register(id, element) {
            Ok(entry) => entry,
            Err(diagnostic) => {
                self.collector.emit(diagnostic);
                Registered::Rejected
            }
        };
        self.registry.insert(id.to_string(), entry);
    }

    fn register(&mut self, id: &str, element: &RawElement) -> DiagnosticResult<Registered> {
        let declared = element
            .kind
            .as_deref()
            .ok_or_else(|| missing_field(id, "kind"))?;
        let kind = ElementKind::parse(declared).ok_or_else(|| {
            Diagnostic::error(format!("element `{id}` has unknown kind `{declared}`"))
                .with_code(ErrorCode::E002)
                .with_label(id, "unknown kind")
                .with_help("expected one of: init, final, state, choice, note, notedot")
        })?;

        match kind {
            ElementKind::Anchor => {
                let point = Point::new(
                    required(id, "x", element.x)?,
                    required(id, "y", element.y)?,
                );
                self.anchors.push(Anchor::new(id, point));
                Ok(Registered::Anchor(self.anchors.len() - 1))
            }
            ElementKind::Note => {
                let bounds = rectangle(id, element)?;
                let text = element.note.as_deref().unwrap_or_default();
                let idx = self.descriptor.add_note(Note::new(id, bounds, text));
                Ok(Registered::Note(idx))
            }
            ElementKind::Node(kind) => {
                let bounds = rectangle(id, element)?;
                let name = node_name(id, kind, element.identifier.as_deref());
                self.claim_name(id, &name)?;
                let description = element.description.as_deref().unwrap_or_default();
                let idx = self
                    .descriptor
                    .add_node(Node::new(id, name, kind, bounds, description));
                Ok(Registered::Node(idx))
            }
        }
    }

    fn claim_name(&mut self, id: &str, name: &str) -> DiagnosticResult<()> {
        if !is_c_identifier(name) {
            return Err(
                Diagnostic::error(format!("node name `{name}` is not a valid identifier"))
                    .with_code(ErrorCode::E004)
                    .with_label(id, "invalid name")
                    .with_help("use letters, digits and underscores, not starting with a digit"),
            );
        }
        if RESERVED_NAMES.contains(&name) {
            return Err(Diagnostic::error(format!("node name `{name}` is reserved"))
                .with_code(ErrorCode::E005)
                .with_label(id, "clashes with a generated function")
                .with_help("rename the node"));
        }
        if let Some(first) = self.names.get(name) {
            return Err(
                Diagnostic::error(format!("node name `{name}` is used more than once"))
                    .with_code(ErrorCode::E100)
                    .with_label(id, "duplicate name")
                    .with_secondary_label(first.clone(), "first used here")
                    .with_help("node names must be unique within a procedure"),
            );
        }
        self.names.insert(name.to_string(), id.to_string());
        Ok(())
    }

    fn add_connection(&mut self, pos: usize, connection: &RawConnection) {
        let label = connection
            .id
            .clone()
            .unwrap_or_else(|| format!("connection #{}", pos + 1));

        let (Some(from), Some(to)) = (connection.from.as_deref(), connection.to.as_deref()) else {
            let field = if connection.from.is_none() {
                "source"
            } else {
                "destination"
            };
            self.collector.emit(missing_field(&label, field));
            return;
        };

        let source = self.registry.get(from).copied();
        let target = self.registry.get(to).copied();
        match (source, target) {
            (None, _) | (_, None) => {
                let unknown = if source.is_none() { from } else { to };
                self.collector.emit(
                    Diagnostic::error(format!(
                        "connection `{label}` from `{from}` to `{to}` refers to unknown element `{unknown}`"
                    ))
                    .with_code(ErrorCode::E101)
                    .with_label(label.clone(), "dangling endpoint")
                    .with_help("reconnect both ends of the connection in the editor"),
                );
            }
            (Some(Registered::Rejected), _) | (_, Some(Registered::Rejected)) => {
                debug!(connection = label.as_str(); "Skipping connection to a rejected element");
            }
            (Some(Registered::Note(note)), Some(Registered::Anchor(anchor))) => {
                self.links.push(NoteLink { note, anchor });
            }
            (Some(Registered::Node(source)), Some(Registered::Node(target))) => {
                if let Err(diagnostic) = self.add_edge(&label, source, target, connection) {
                    self.collector.emit(diagnostic);
                }
            }
            _ => {
                self.collector.emit(
                    Diagnostic::warning(format!(
                        "connection `{label}` is neither a transition nor a note link and is ignored"
                    ))
                    .with_label(label, "ignored"),
                );
            }
        }
    }

    fn add_edge(
        &mut self,
        label: &str,
        source: NodeIdx,
        target: NodeIdx,
        connection: &RawConnection,
    ) -> DiagnosticResult<()> {
        let order = parse_order(label, connection.order.as_deref())?;

        let target_node = self.descriptor.node(target);
        if target_node.kind() == NodeKind::Initial {
            return Err(Diagnostic::error(format!(
                "connection `{label}` enters the initial node"
            ))
            .with_code(ErrorCode::E102)
            .with_label(label, "transition into initial node")
            .with_secondary_label(target_node.id().to_string(), "initial node"));
        }
        let source_node = self.descriptor.node(source);
        if source_node.kind() == NodeKind::Final {
            return Err(Diagnostic::error(format!(
                "connection `{label}` leaves final node `{}`",
                source_node.name()
            ))
            .with_code(ErrorCode::E103)
            .with_label(label, "transition out of final node")
            .with_secondary_label(source_node.id().to_string(), "final node"));
        }

        let guard = connection.guard.as_deref().unwrap_or_default();
        self.descriptor
            .add_edge(Edge::new(label, source, target, guard, order));
        Ok(())
    }

    fn finish(self) -> Result<ProcedureDescriptor, BuildError> {
        let Self {
            mut descriptor,
            anchors,
            links,
            collector,
            ..
        } = self;
        collector.finish()?;

        let attachments = attach::resolve(&anchors, &links, &descriptor);
        debug!(
            anchors = anchors.len(),
            links = links.len(),
            attachments = attachments.len();
            "Note attachments resolved"
        );
        for attachment in attachments {
            descriptor.attach(attachment.note, attachment.node);
        }

        Ok(descriptor)
    }
}

/// Resolves the unique name of a node.
///
/// Initial and final nodes get canonical names, decision nodes get their
/// identifier with the first letter upper-cased, and action nodes keep
/// their identifier. A node without identifier is named after its id.
fn node_name(id: &str, kind: NodeKind, identifier: Option<&str>) -> String {
    let identifier = identifier
        .map(str::trim)
        .filter(|identifier| !identifier.is_empty())
        .unwrap_or(id);
    match kind {
        NodeKind::Initial => "Initial".to_string(),
        NodeKind::Final => "Final".to_string(),
        NodeKind::Decision => capitalize(identifier),
        NodeKind::Action => identifier.to_string(),
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn parse_order(label: &str, order: Option<&str>) -> DiagnosticResult<u32> {
    let text = order.ok_or_else(|| missing_field(label, "order"))?;
    text.trim().parse().map_err(|_| {
        Diagnostic::error(format!(
            "connection `{label}` has order `{text}`, which is not a non-negative integer"
        ))
        .with_code(ErrorCode::E003)
        .with_label(label, "non-numeric order")
    })
}

fn rectangle(id: &str, element: &RawElement) -> DiagnosticResult<Bounds> {
    let top_left = Point::new(required(id, "x", element.x)?, required(id, "y", element.y)?);
    let size = Size::new(
        required(id, "width", element.width)?,
        required(id, "height", element.height)?,
    );
    Ok(Bounds::new_from_top_left(top_left, size))
}

fn required(id: &str, field: &str, value: Option<f32>) -> DiagnosticResult<f32> {
    value.ok_or_else(|| missing_field(id, field))
}

fn missing_field(element: &str, field: &str) -> Diagnostic {
    Diagnostic::error(format!("`{element}` has no {field}"))
        .with_code(ErrorCode::E001)
        .with_label(element, format!("missing {field}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_names() {
        assert_eq!(node_name("s1", NodeKind::Initial, Some("Begin")), "Initial");
        assert_eq!(node_name("s9", NodeKind::Final, None), "Final");
        assert_eq!(node_name("s2", NodeKind::Decision, Some("check")), "Check");
        assert_eq!(node_name("s3", NodeKind::Action, Some("doWork")), "doWork");
        assert_eq!(node_name("s4", NodeKind::Action, None), "s4");
        assert_eq!(node_name("s5", NodeKind::Action, Some("  ")), "s5");
        assert_eq!(node_name("s6", NodeKind::Decision, None), "S6");
    }

    #[test]
    fn test_element_kind_spellings() {
        assert!(matches!(
            ElementKind::parse("init"),
            Some(ElementKind::Node(NodeKind::Initial))
        ));
        assert!(matches!(
            ElementKind::parse("Choice"),
            Some(ElementKind::Node(NodeKind::Decision))
        ));
        assert!(matches!(
            ElementKind::parse("state"),
            Some(ElementKind::Node(NodeKind::Action))
        ));
        assert!(matches!(ElementKind::parse("notedot"), Some(ElementKind::Anchor)));
        assert!(ElementKind::parse("fork").is_none());
    }

    #[test]
    fn test_parse_order() {
        assert_eq!(parse_order("c1", Some(" 3 ")).unwrap(), 3);
        assert_eq!(
            parse_order("c1", None).unwrap_err().code(),
            Some(ErrorCode::E001)
        );
        assert_eq!(
            parse_order("c1", Some("first")).unwrap_err().code(),
            Some(ErrorCode::E003)
        );
        assert_eq!(
            parse_order("c1", Some("-1")).unwrap_err().code(),
            Some(ErrorCode::E003)
        );
    }
}
