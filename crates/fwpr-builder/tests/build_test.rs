use fwpr_builder::{
    BuildOutcome, ErrorCode, build, editor,
    model::{Model, RawConnection, RawElement},
};
use std::collections::HashMap;

use fwpr_core::descriptor::{NodeKind, ProcedureDescriptor};
use proptest::prelude::*;

fn init() -> RawElement {
    RawElement::new("s1", "init").with_rect(0.0, 0.0, 20.0, 20.0)
}

fn fin() -> RawElement {
    RawElement::new("s9", "final").with_rect(0.0, 400.0, 20.0, 20.0)
}

fn action(id: &str, name: &str, y: f32) -> RawElement {
    RawElement::new(id, "state")
        .with_identifier(name)
        .with_description(format!("do {name}"))
        .with_rect(0.0, y, 100.0, 50.0)
}

fn edge(from: &str, to: &str, order: u32) -> RawConnection {
    RawConnection::new(from, to)
        .with_id(format!("{from}-{to}"))
        .with_order(order.to_string())
}

fn build_ok(model: &Model) -> ProcedureDescriptor {
    build(model)
        .expect("Failed to build")
        .into_procedure()
        .expect("Expected a procedure")
}

fn build_err_codes(model: &Model) -> Vec<ErrorCode> {
    build(model)
        .expect_err("Expected build to fail")
        .diagnostics()
        .iter()
        .filter_map(|d| d.code())
        .collect()
}

fn linear() -> Model {
    Model::procedure("Linear")
        .with_element(init())
        .with_element(action("s2", "N1", 100.0))
        .with_element(fin())
        .with_connection(edge("s1", "s2", 1))
        .with_connection(edge("s2", "s9", 1))
}

#[test]
fn test_linear_procedure() {
    let descriptor = build_ok(&linear());

    assert_eq!(descriptor.name(), "Linear");
    assert_eq!(descriptor.nodes().len(), 3);
    assert_eq!(descriptor.edges().len(), 2);

    let n1 = descriptor.node_by_name("N1").expect("N1 exists");
    assert_eq!(descriptor.node(n1).kind(), NodeKind::Action);
    assert_eq!(descriptor.node(n1).description(), "do N1");
    assert!(descriptor.node_by_name("Initial").is_some());
    assert!(descriptor.node_by_name("Final").is_some());
}

#[test]
fn test_non_procedure_document_is_not_applicable() {
    let model = Model {
        document_kind: "Sm".to_string(),
        ..linear()
    };
    match build(&model).expect("Failed to build") {
        BuildOutcome::NotApplicable { document_kind } => assert_eq!(document_kind, "Sm"),
        BuildOutcome::Procedure(_) => panic!("Expected NotApplicable"),
    }
}

#[test]
fn test_missing_name_defaults() {
    let model = Model {
        name: None,
        ..linear()
    };
    assert_eq!(build_ok(&model).name(), "Unnamed");
}

#[test]
fn test_decision_name_is_capitalized() {
    let model = Model::procedure("Branchy")
        .with_element(init())
        .with_element(
            RawElement::new("s2", "choice")
                .with_identifier("ready")
                .with_rect(0.0, 100.0, 40.0, 40.0),
        )
        .with_element(fin())
        .with_connection(edge("s1", "s2", 1))
        .with_connection(edge("s2", "s9", 1).with_guard("isReady"))
        .with_connection(edge("s2", "s9", 2).with_guard("else").with_id("c-else"));

    let descriptor = build_ok(&model);
    let decision = descriptor.node_by_name("Ready").expect("Ready exists");
    let branches = descriptor.outgoing_by_order(decision);
    assert_eq!(branches.len(), 2);
    assert_eq!(branches[0].guard(), "isReady");
    assert!(branches[1].is_default_guard());
}

#[test]
fn test_duplicate_names_are_reported() {
    let model = linear().with_element(action("s3", "N1", 200.0));
    let error = build(&model).expect_err("Expected build to fail");
    assert!(error.has_code(ErrorCode::E100));

    let diagnostic = &error.diagnostics()[0];
    let elements: Vec<&str> = diagnostic.elements().collect();
    assert_eq!(elements, vec!["s3", "s2"]);
}

#[test]
fn test_resolution_errors_are_collected() {
    let model = linear()
        .with_element(RawElement::new("s4", "fork").with_rect(0.0, 0.0, 1.0, 1.0))
        .with_element(action("s5", "9lives", 300.0))
        .with_element(action("s6", "Execute", 300.0))
        .with_connection(edge("s2", "ghost", 1))
        .with_connection(RawConnection::new("s2", "s9").with_id("bad").with_order("two"));

    let codes = build_err_codes(&model);
    assert!(codes.contains(&ErrorCode::E002));
    assert!(codes.contains(&ErrorCode::E004));
    assert!(codes.contains(&ErrorCode::E005));
    assert!(codes.contains(&ErrorCode::E101));
    assert!(codes.contains(&ErrorCode::E003));
}

#[test]
fn test_connections_to_rejected_elements_are_skipped() {
    let model = linear()
        .with_element(RawElement::new("s4", "fork").with_rect(0.0, 0.0, 1.0, 1.0))
        .with_connection(edge("s2", "s4", 2));

    assert_eq!(build_err_codes(&model), vec![ErrorCode::E002]);
}

#[test]
fn test_edges_into_initial_and_out_of_final() {
    let model = linear()
        .with_connection(edge("s2", "s1", 2))
        .with_connection(edge("s9", "s2", 1));

    let codes = build_err_codes(&model);
    assert!(codes.contains(&ErrorCode::E102));
    assert!(codes.contains(&ErrorCode::E103));
}

#[test]
fn test_duplicate_element_id() {
    let model = linear().with_element(action("s2", "Other", 200.0));
    assert_eq!(build_err_codes(&model), vec![ErrorCode::E104]);
}

#[test]
fn test_structural_errors_follow_resolution() {
    let model = Model::procedure("Broken")
        .with_element(action("s2", "A", 0.0))
        .with_element(fin())
        .with_connection(edge("s2", "s9", 1));

    assert_eq!(build_err_codes(&model), vec![ErrorCode::E200]);
}

#[test]
fn test_notes_attach_through_anchors() {
    let model = linear()
        .with_element(action("s3", "N2", 200.0))
        .with_element(
            RawElement::new("n1", "note")
                .with_note("Explains\nboth")
                .with_rect(300.0, 100.0, 80.0, 40.0),
        )
        .with_element(RawElement::new("a1", "notedot").with_point(50.0, 125.0))
        .with_element(RawElement::new("a2", "notedot").with_point(50.0, 225.0))
        .with_element(RawElement::new("a3", "notedot").with_point(500.0, 500.0))
        .with_connection(RawConnection::new("n1", "a1").with_id("l1"))
        .with_connection(RawConnection::new("n1", "a2").with_id("l2"))
        .with_connection(RawConnection::new("n1", "a3").with_id("l3"));
    let model = Model {
        connections: model
            .connections
            .into_iter()
            .filter(|c| c.id.as_deref() != Some("s2-s9"))
            .chain([edge("s2", "s3", 1), edge("s3", "s9", 1)])
            .collect(),
        ..model
    };

    let descriptor = build_ok(&model);
    let note = &descriptor.notes()[0];
    assert_eq!(note.text(), "Explains both");
    assert_eq!(note.nodes().len(), 2);

    for name in ["N1", "N2"] {
        let idx = descriptor.node_by_name(name).expect("node exists");
        assert_eq!(descriptor.node(idx).notes().len(), 1);
    }
}

#[test]
fn test_build_from_editor_json() {
    let source = r#"{
        "globals": { "fwprop": { "editorType": "Pr", "smName": "Json" } },
        "states": [
            { "id": 1, "fwprop": { "type": "init" },
              "attrs": { "x": 0, "y": 0, "width": 20, "height": 20 } },
            { "id": 2, "fwprop": { "type": "state", "identifier": "Work", "entryDesc": "doWork" },
              "attrs": { "x": 0, "y": 100, "width": 100, "height": 50 } },
            { "id": 3, "fwprop": { "type": "final" },
              "attrs": { "x": 0, "y": 200, "width": 20, "height": 20 } }
        ],
        "connections": [
            { "id": 10, "stateFromID": 1, "stateToID": 2, "fwprop": { "guardDesc": "", "order": 1 } },
            { "id": 11, "stateFromID": 2, "stateToID": 3, "fwprop": { "guardDesc": "", "order": "1" } }
        ]
    }"#;

    let model = editor::from_json(source).expect("Failed to read JSON");
    let descriptor = build_ok(&model);
    assert_eq!(descriptor.name(), "Json");
    assert!(descriptor.node_by_name("Work").is_some());
    assert!(descriptor.node_by_id("2").is_some());
}

/// Initial -> step 1 -> ... -> step n -> Final.
///
/// Each step is `(is_decision, has_note)`. An action step leaves through a
/// guarded transition; a decision step branches to Final on a guard and to
/// the next step otherwise. A step with a note gets a note and an anchor
/// placed inside the step's node.
fn chain_model(steps: &[(bool, bool)]) -> Model {
    let final_id = "s_end";
    let mut model = Model::procedure("Chain")
        .with_element(RawElement::new("s0", "init").with_rect(0.0, 0.0, 20.0, 20.0));
    let mut connections = vec![("s0".to_string(), "s1".to_string(), None, 1)];

    for (i, (is_decision, has_note)) in steps.iter().enumerate() {
        let id = format!("s{}", i + 1);
        let next = if i + 1 == steps.len() {
            final_id.to_string()
        } else {
            format!("s{}", i + 2)
        };
        let y = (i + 1) as f32 * 100.0;
        let kind = if *is_decision { "choice" } else { "state" };
        model = model.with_element(
            RawElement::new(id.as_str(), kind)
                .with_identifier(format!("N{}", i + 1))
                .with_rect(0.0, y, 100.0, 50.0),
        );

        if *is_decision {
            connections.push((id.clone(), final_id.to_string(), Some(format!("g{i}")), 1));
            connections.push((id.clone(), next, Some("Else".to_string()), 2));
        } else {
            connections.push((id.clone(), next, Some(format!("g{i}")), 1));
        }

        if *has_note {
            let note = format!("n{}", i + 1);
            let anchor = format!("d{}", i + 1);
            model = model
                .with_element(
                    RawElement::new(note.as_str(), "note")
                        .with_note(format!("about N{}", i + 1))
                        .with_rect(500.0, y, 80.0, 30.0),
                )
                .with_element(RawElement::new(anchor.as_str(), "notedot").with_point(50.0, y + 25.0))
                .with_connection(RawConnection::new(note, anchor).with_id(format!("l{}", i + 1)));
        }
    }
    if steps.is_empty() {
        connections[0].1 = final_id.to_string();
    }

    model = model.with_element(
        RawElement::new(final_id, "final").with_rect(0.0, (steps.len() + 1) as f32 * 100.0, 20.0, 20.0),
    );
    for (k, (from, to, guard, order)) in connections.into_iter().enumerate() {
        let mut connection = RawConnection::new(from, to)
            .with_id(format!("c{k}"))
            .with_order(order.to_string());
        if let Some(guard) = guard {
            connection = connection.with_guard(guard);
        }
        model = model.with_connection(connection);
    }
    model
}

/// Node kinds declared by the model, notes and anchors left out.
fn declared_node_kinds(model: &Model) -> HashMap<NodeKind, usize> {
    let mut kinds = HashMap::new();
    for element in &model.elements {
        let kind = match element.kind.as_deref() {
            Some("init") => NodeKind::Initial,
            Some("final") => NodeKind::Final,
            Some("state") => NodeKind::Action,
            Some("choice") => NodeKind::Decision,
            _ => continue,
        };
        *kinds.entry(kind).or_default() += 1;
    }
    kinds
}

fn check_lookup_maps_match_model(steps: &[(bool, bool)]) -> Result<(), TestCaseError> {
    let model = chain_model(steps);
    let declared = declared_node_kinds(&model);
    let node_count: usize = declared.values().sum();

    let descriptor = build_ok(&model);

    prop_assert_eq!(descriptor.names().len(), node_count);
    prop_assert_eq!(descriptor.ids().len(), node_count);

    let mut by_name: HashMap<NodeKind, usize> = HashMap::new();
    for idx in descriptor.names().values() {
        *by_name.entry(descriptor.node(*idx).kind()).or_default() += 1;
    }
    let mut by_id: HashMap<NodeKind, usize> = HashMap::new();
    for idx in descriptor.ids().values() {
        *by_id.entry(descriptor.node(*idx).kind()).or_default() += 1;
    }
    prop_assert_eq!(&by_name, &declared);
    prop_assert_eq!(&by_id, &declared);

    let notes = steps.iter().filter(|(_, has_note)| *has_note).count();
    prop_assert_eq!(descriptor.notes().len(), notes);
    Ok(())
}

#[test]
fn test_lookup_maps_ignore_notes_and_anchors() {
    let steps = [(false, true), (true, true), (false, false)];
    check_lookup_maps_match_model(&steps).unwrap();

    let descriptor = build_ok(&chain_model(&steps));
    assert!(descriptor.node_by_id("n1").is_none());
    assert!(descriptor.node_by_id("d2").is_none());
    let n2 = descriptor.node_by_name("N2").expect("N2 exists");
    assert_eq!(descriptor.node(n2).notes().len(), 1);
}

proptest! {
    #[test]
    fn lookup_maps_match_model(
        steps in prop::collection::vec((any::<bool>(), any::<bool>()), 0..6),
    ) {
        check_lookup_maps_match_model(&steps)?;
    }
}
