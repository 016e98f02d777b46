//! Ingestion of editor JSON documents.
//!
//! The graphical editor saves a document as JSON with a `globals` block, a
//! `states` array holding nodes, notes and anchors, and a `connections`
//! array. This module maps that layout onto a [`Model`] without judging it:
//! fields that are absent or of an unexpected JSON type become `None`.
//!
//! Ids and orders are accepted both as JSON strings and as JSON numbers.

use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::model::{Model, RawConnection, RawElement};

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    globals: Globals,
    #[serde(default)]
    states: Vec<State>,
    #[serde(default)]
    connections: Vec<Connection>,
}

#[derive(Debug, Default, Deserialize)]
struct Globals {
    #[serde(default)]
    fwprop: GlobalProps,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GlobalProps {
    #[serde(default)]
    editor_type: String,
    sm_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct State {
    id: Option<Value>,
    #[serde(default)]
    fwprop: StateProps,
    #[serde(default)]
    attrs: Attrs,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateProps {
    #[serde(rename = "type")]
    kind: Option<String>,
    identifier: Option<String>,
    entry_desc: Option<String>,
    note: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Attrs {
    x: Option<Value>,
    y: Option<Value>,
    width: Option<Value>,
    height: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Connection {
    id: Option<Value>,
    #[serde(rename = "stateFromID")]
    state_from_id: Option<Value>,
    #[serde(rename = "stateToID")]
    state_to_id: Option<Value>,
    #[serde(default)]
    fwprop: ConnectionProps,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConnectionProps {
    guard_desc: Option<String>,
    order: Option<Value>,
}

/// Parses an editor JSON document into a [`Model`].
///
/// # Errors
///
/// Returns an error if `source` is not JSON or if its top-level layout is
/// not an editor document.
///
/// # Examples
///
/// ```
/// # use fwpr_builder::editor;
/// let source = r#"{
///     "globals": { "fwprop": { "editorType": "Pr", "smName": "Blink" } },
///     "states": [],
///     "connections": []
/// }"#;
/// let model = editor::from_json(source).unwrap();
/// assert!(model.is_procedure());
/// assert_eq!(model.name.as_deref(), Some("Blink"));
/// ```
pub fn from_json(source: &str) -> Result<Model, serde_json::Error> {
    let document: Document = serde_json::from_str(source)?;
    debug!(
        editor_type = document.globals.fwprop.editor_type.as_str(),
        states = document.states.len(),
        connections = document.connections.len();
        "Editor document read"
    );

    let elements = document
        .states
        .into_iter()
        .map(|state| RawElement {
            id: state.id.as_ref().and_then(value_to_string),
            kind: state.fwprop.kind,
            identifier: state.fwprop.identifier,
            description: state.fwprop.entry_desc,
            note: state.fwprop.note,
            x: state.attrs.x.as_ref().and_then(value_to_f32),
            y: state.attrs.y.as_ref().and_then(value_to_f32),
            width: state.attrs.width.as_ref().and_then(value_to_f32),
            height: state.attrs.height.as_ref().and_then(value_to_f32),
        })
        .collect();

    let connections = document
        .connections
        .into_iter()
        .map(|connection| RawConnection {
            id: connection.id.as_ref().and_then(value_to_string),
            from: connection.state_from_id.as_ref().and_then(value_to_string),
            to: connection.state_to_id.as_ref().and_then(value_to_string),
            guard: connection.fwprop.guard_desc,
            order: connection.fwprop.order.as_ref().and_then(value_to_string),
        })
        .collect();

    Ok(Model {
        document_kind: document.globals.fwprop.editor_type,
        name: document.globals.fwprop.sm_name,
        elements,
        connections,
    })
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_to_f32(value: &Value) -> Option<f32> {
    match value {
        Value::Number(n) => n.as_f64().map(|v| v as f32),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
