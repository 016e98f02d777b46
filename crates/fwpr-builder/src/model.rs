//! The raw input model handed over by the ingestion layer.
//!
//! A [`Model`] is a loose collection of typed graphical elements and the
//! connections between them, exactly as an editor stores them. Nothing is
//! validated yet: every field the builder needs is optional here so that a
//! missing field is reported by the builder with the id of the element it
//! belongs to.

/// Document kind of a procedure model.
pub const PROCEDURE_DOCUMENT_KIND: &str = "Pr";

/// A graphical model as produced by the editor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    /// Kind of editor document, [`PROCEDURE_DOCUMENT_KIND`] for procedures.
    pub document_kind: String,
    /// Procedure name.
    pub name: Option<String>,
    /// Nodes, notes and anchors.
    pub elements: Vec<RawElement>,
    /// Connections between elements.
    pub connections: Vec<RawConnection>,
}

impl Model {
    /// Creates an empty procedure model with the given name.
    ///
    /// # Examples
    ///
    /// ```
    /// # use fwpr_builder::model::{Model, RawConnection, RawElement};
    /// let model = Model::procedure("Blink")
    ///     .with_element(RawElement::new("s1", "init").with_rect(0.0, 0.0, 10.0, 10.0))
    ///     .with_element(RawElement::new("s2", "final").with_rect(0.0, 50.0, 10.0, 10.0))
    ///     .with_connection(RawConnection::new("s1", "s2").with_order("1"));
    /// assert_eq!(model.elements.len(), 2);
    /// ```
    pub fn procedure(name: impl Into<String>) -> Self {
        Self {
            document_kind: PROCEDURE_DOCUMENT_KIND.to_string(),
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Returns `true` if the document describes a procedure.
    pub fn is_procedure(&self) -> bool {
        self.document_kind == PROCEDURE_DOCUMENT_KIND
    }

    /// Appends an element.
    pub fn with_element(mut self, element: RawElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Appends a connection.
    pub fn with_connection(mut self, connection: RawConnection) -> Self {
        self.connections.push(connection);
        self
    }
}

/// An unvalidated graphical element: a node, a note or an anchor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawElement {
    pub id: Option<String>,
    /// Declared kind, e.g. `init`, `state`, `choice`, `note`, `notedot`.
    pub kind: Option<String>,
    /// Human-readable identifier of a node.
    pub identifier: Option<String>,
    /// Action label of a node.
    pub description: Option<String>,
    /// Text of a note.
    pub note: Option<String>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl RawElement {
    /// Creates an element with an id and a declared kind.
    pub fn new(id: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            kind: Some(kind.into()),
            ..Self::default()
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Sets the top-left corner and the size.
    pub fn with_rect(mut self, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Sets the position of a point-like element such as an anchor.
    pub fn with_point(mut self, x: f32, y: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }
}

/// An unvalidated connection between two elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawConnection {
    pub id: Option<String>,
    /// Id of the source element.
    pub from: Option<String>,
    /// Id of the destination element.
    pub to: Option<String>,
    /// Guard description.
    pub guard: Option<String>,
    /// Tie-break rank, as text.
    pub order: Option<String>,
}

impl RawConnection {
    /// Creates a connection between two element ids.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: Some(from.into()),
            to: Some(to.into()),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_guard(mut self, guard: impl Into<String>) -> Self {
        self.guard = Some(guard.into());
        self
    }

    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }
}
