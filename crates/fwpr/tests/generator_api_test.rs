//! Integration tests for the ProcedureGenerator API

use std::collections::HashMap;

use fwpr::{
    ErrorCode, FwprError, ProcedureGenerator,
    config::{AppConfig, CodegenConfig, NamingConfig},
    model::{Model, RawConnection, RawElement},
    runtime::{CurrentNode, ProcedureHooks, ProcedureRuntime},
    synthesis::{ActionCall, GuardCall},
};

/// Initial -> Heat [isWarm] -> Check -> { isHot: Cool -> Final, else: Idle -> Final }
///
/// A note is anchored inside `Heat`; `Idle` does nothing.
const THERMO: &str = r#"{
    "globals": { "fwprop": { "editorType": "Pr", "smName": "Thermo" } },
    "states": [
        { "id": "s1", "fwprop": { "type": "init" },
          "attrs": { "x": 0, "y": 0, "width": 20, "height": 20 } },
        { "id": "s2", "fwprop": { "type": "state", "identifier": "Heat", "entryDesc": "Switch the heater on" },
          "attrs": { "x": 0, "y": 100, "width": 120, "height": 60 } },
        { "id": "s3", "fwprop": { "type": "choice", "identifier": "check" },
          "attrs": { "x": 0, "y": 200, "width": 40, "height": 40 } },
        { "id": "s4", "fwprop": { "type": "state", "identifier": "Cool", "entryDesc": "Open the vent" },
          "attrs": { "x": -150, "y": 300, "width": 120, "height": 60 } },
        { "id": "s5", "fwprop": { "type": "state", "identifier": "Idle", "entryDesc": "Do nothing" },
          "attrs": { "x": 150, "y": 300, "width": 120, "height": 60 } },
        { "id": "s6", "fwprop": { "type": "final" },
          "attrs": { "x": 0, "y": 400, "width": 20, "height": 20 } },
        { "id": "n1", "fwprop": { "type": "note", "note": "Heater relay\non port B" },
          "attrs": { "x": 300, "y": 100, "width": 100, "height": 40 } },
        { "id": "d1", "fwprop": { "type": "notedot" },
          "attrs": { "x": 60, "y": 130 } }
    ],
    "connections": [
        { "id": "c1", "stateFromID": "s1", "stateToID": "s2", "fwprop": { "guardDesc": "", "order": 1 } },
        { "id": "c2", "stateFromID": "s2", "stateToID": "s3", "fwprop": { "guardDesc": "isWarm", "order": 1 } },
        { "id": "c3", "stateFromID": "s3", "stateToID": "s4", "fwprop": { "guardDesc": "isHot", "order": 1 } },
        { "id": "c4", "stateFromID": "s3", "stateToID": "s5", "fwprop": { "guardDesc": "Else", "order": 2 } },
        { "id": "c5", "stateFromID": "s4", "stateToID": "s6", "fwprop": { "guardDesc": "", "order": 1 } },
        { "id": "c6", "stateFromID": "s5", "stateToID": "s6", "fwprop": { "guardDesc": "", "order": 1 } },
        { "id": "c7", "stateFromID": "n1", "stateToID": "d1", "fwprop": {} }
    ]
}"#;

#[derive(Default)]
struct Recorder {
    guards: HashMap<String, bool>,
    calls: Vec<String>,
}

impl ProcedureHooks for Recorder {
    fn run_action(&mut self, call: &ActionCall) {
        self.calls.push(call.function().to_string());
    }

    fn check_guard(&mut self, call: &GuardCall) -> bool {
        self.calls.push(format!("{}?", call.function()));
        self.guards.get(call.function()).copied().unwrap_or(false)
    }
}

fn build(generator: &ProcedureGenerator, source: &str) -> fwpr::Procedure {
    let model = generator.ingest(source).expect("Failed to ingest");
    generator
        .build(&model)
        .expect("Failed to build")
        .expect("Expected a procedure")
}

#[test]
fn test_generator_default_config() {
    let generator = ProcedureGenerator::default();
    assert_eq!(generator.config().naming().file_prefix(), "FwPr");
}

#[test]
fn test_generate_artifacts() {
    let generator = ProcedureGenerator::default();
    let procedure = build(&generator, THERMO);
    let artifacts = generator.generate(&procedure).expect("Failed to generate");

    let names: Vec<&str> = artifacts.iter().map(|a| a.file_name()).collect();
    assert_eq!(
        names,
        vec![
            "FwPrThermo.h",
            "FwPrThermoUser.h",
            "FwPrThermo.c",
            "FwPrThermoUser.c"
        ]
    );
    assert!(artifacts.iter().all(|a| !a.description().is_empty()));

    let header = artifacts[0].content();
    assert!(header.contains("#ifndef FWPRTHERMO_H_"));
    assert!(header.contains("eThermoStopped = 0,"));
    assert!(header.contains("eThermoInitial = 1,"));
    assert!(header.contains("eThermoHeat = 2\n"));
    assert!(header.contains("} FwPrThermoNodes_t;"));
    assert!(header.contains("void FwPrThermoExecute(void);"));
    assert!(header.contains("FwPrThermoNodes_t FwPrThermoGetCurNode(void);"));
    assert!(!header.contains("GetPrExecCnt"));

    let user = artifacts[1].content();
    assert!(user.contains("void FwPrThermoHeat(void);"));
    assert!(user.contains("void FwPrThermoCool(void);"));
    assert!(!user.contains("FwPrThermoIdle"));
    assert!(user.contains("int FwPrThermoHeatToCheck(void);"));
    assert!(user.contains("int FwPrThermoCheckToCool(void);"));
    assert!(user.contains("Switch the heater on"));
    assert!(user.contains("Heater relay on port B"));

    let body = artifacts[2].content();
    assert!(body.contains("#include \"FwPrThermoUser.h\""));
    assert!(body.contains("static FwPrThermoNodes_t curNode = eThermoStopped;"));
    assert!(body.contains("while (1) {"));
    assert!(body.contains("case eThermoHeat:"));
    assert!(body.contains("if (!FwPrThermoHeatToCheck()) {"));
    assert!(body.contains("if (FwPrThermoCheckToCool()) {"));
    assert!(!body.contains("FwPrThermoIdle"));
    assert!(!body.contains("prExecCnt"));

    let stub = artifacts[3].content();
    assert!(stub.contains("int FwPrThermoCheckToCool(void)\n{"));
    assert!(stub.contains("return 1;"));
}

#[test]
fn test_generation_is_deterministic() {
    let generator = ProcedureGenerator::default();
    let first = generator.generate(&build(&generator, THERMO)).unwrap();
    let second = generator.generate(&build(&generator, THERMO)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_custom_naming_and_counters() {
    let config = AppConfig::new(
        NamingConfig::new("Pr", "Ctl", "k", "Impl"),
        CodegenConfig::new(2, true, 80, false),
    );
    let generator = ProcedureGenerator::new(config);
    let artifacts = generator
        .generate(&build(&generator, THERMO))
        .expect("Failed to generate");

    let names: Vec<&str> = artifacts.iter().map(|a| a.file_name()).collect();
    assert_eq!(names, vec!["PrThermo.h", "PrThermoImpl.h", "PrThermo.c"]);

    assert!(artifacts[0].content().contains("kThermoStopped = 0,"));
    assert!(
        artifacts[0]
            .content()
            .contains("unsigned int CtlThermoGetNodeExecCnt(void);")
    );
    let body = artifacts[2].content();
    assert!(body.contains("void CtlThermoStart(void)\n{\n  if (curNode != kThermoStopped) {"));
    assert!(body.contains("prExecCnt++;"));
    assert!(body.contains("nodeExecCnt = 0;"));
}

#[test]
fn test_unusable_config_is_export_error() {
    let config = AppConfig::new(NamingConfig::default(), CodegenConfig::new(4, false, 5, true));
    let generator = ProcedureGenerator::new(config);
    let procedure = build(&generator, THERMO);
    assert!(matches!(
        generator.generate(&procedure),
        Err(FwprError::Export(_))
    ));
}

#[test]
fn test_runtime_follows_plan() {
    let generator = ProcedureGenerator::default();
    let procedure = build(&generator, THERMO);
    let mut runtime = ProcedureRuntime::new(procedure.plan());
    let mut hooks = Recorder::default();

    runtime.start();
    runtime.execute(&mut hooks);
    assert_eq!(runtime.current_node(), CurrentNode::Resident("Heat"));

    hooks
        .guards
        .insert("FwPrThermoHeatToCheck".to_string(), true);
    hooks.calls.clear();
    runtime.execute(&mut hooks);
    assert_eq!(
        hooks.calls,
        vec![
            "FwPrThermoHeatToCheck?",
            "FwPrThermoHeat",
            "FwPrThermoCheckToCool?",
        ]
    );
    assert_eq!(runtime.current_node(), CurrentNode::Stopped);
}

#[test]
fn test_non_procedure_document_is_skipped() {
    let source = THERMO.replace(r#""editorType": "Pr""#, r#""editorType": "Sm""#);
    let generator = ProcedureGenerator::default();
    let model = generator.ingest(&source).expect("Failed to ingest");
    assert!(generator.build(&model).expect("Failed to build").is_none());
}

#[test]
fn test_malformed_json_is_ingest_error() {
    let generator = ProcedureGenerator::default();
    assert!(matches!(
        generator.ingest("{ not json"),
        Err(FwprError::Ingest(_))
    ));
}

#[test]
fn test_model_errors_are_build_errors() {
    let model = Model::procedure("Loop")
        .with_element(RawElement::new("s1", "init").with_rect(0.0, 0.0, 10.0, 10.0))
        .with_element(RawElement::new("s2", "state").with_identifier("A").with_rect(0.0, 50.0, 10.0, 10.0))
        .with_element(RawElement::new("s3", "choice").with_identifier("d").with_rect(0.0, 100.0, 10.0, 10.0))
        .with_element(RawElement::new("s4", "final").with_rect(0.0, 150.0, 10.0, 10.0))
        .with_connection(RawConnection::new("s1", "s2").with_order("1"))
        .with_connection(RawConnection::new("s2", "s3").with_order("1"))
        .with_connection(RawConnection::new("s3", "s4").with_guard("done").with_order("1"))
        .with_connection(RawConnection::new("s3", "s2").with_guard("else").with_order("2"));

    match ProcedureGenerator::default().build(&model) {
        Err(FwprError::Build { err, model }) => {
            assert_eq!(model, "Loop");
            assert!(err.has_code(ErrorCode::E207));
        }
        other => panic!("Expected a build error, got {other:?}"),
    }
}
