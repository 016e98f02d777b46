//! fwpr - Step-driven control-flow code from graphical procedure models.
//!
//! A procedure model is a graph of action, decision, initial and final nodes
//! joined by guarded transitions. fwpr validates the model, decides at which
//! nodes the procedure may pause between two executions, and generates code
//! that a host drives one `Execute` call at a time.

pub mod classify;
pub mod config;
pub mod export;
pub mod runtime;
pub mod synthesis;

mod error;

pub use fwpr_builder::{BuildOutcome, Diagnostic, ErrorCode, editor, model};
pub use fwpr_core::descriptor;

pub use error::FwprError;

use log::{debug, info, trace};

use fwpr_builder::model::Model;
use fwpr_core::descriptor::ProcedureDescriptor;

use classify::Classification;
use config::AppConfig;
use export::{Artifact, Exporter, c::CExporter};
use synthesis::ExecutionPlan;

/// A validated procedure together with its synthesized control flow.
#[derive(Debug, Clone)]
pub struct Procedure {
    descriptor: ProcedureDescriptor,
    classification: Classification,
    plan: ExecutionPlan,
}

impl Procedure {
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn descriptor(&self) -> &ProcedureDescriptor {
        &self.descriptor
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    pub fn plan(&self) -> &ExecutionPlan {
        &self.plan
    }
}

/// Generator turning procedure models into C sources.
///
/// # Examples
///
/// ```rust,no_run
/// use fwpr::{ProcedureGenerator, config::AppConfig};
///
/// let source = std::fs::read_to_string("Blink.json").expect("Failed to read");
///
/// let generator = ProcedureGenerator::new(AppConfig::default());
/// let model = generator.ingest(&source).expect("Failed to read model");
///
/// if let Some(procedure) = generator.build(&model).expect("Failed to build") {
///     for artifact in generator.generate(&procedure).expect("Failed to generate") {
///         println!("{}: {}", artifact.file_name(), artifact.description());
///     }
/// }
/// ```
#[derive(Default)]
pub struct ProcedureGenerator {
    config: AppConfig,
}

impl ProcedureGenerator {
    /// Create a new generator with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Read an editor JSON document into a raw model.
    ///
    /// # Errors
    ///
    /// Returns [`FwprError::Ingest`] if `source` is not an editor document.
    pub fn ingest(&self, source: &str) -> Result<Model, FwprError> {
        info!("Reading editor document");
        let model = editor::from_json(source)?;
        debug!(
            elements = model.elements.len(),
            connections = model.connections.len();
            "Editor document read"
        );
        Ok(model)
    }

    /// Build, validate and synthesize a procedure.
    ///
    /// Returns `Ok(None)` when the model is some other kind of editor
    /// document, in which case there is nothing to generate.
    ///
    /// # Errors
    ///
    /// Returns [`FwprError::Build`] holding every defect of the model, or
    /// [`FwprError::Invariant`] for an internal defect.
    pub fn build(&self, model: &Model) -> Result<Option<Procedure>, FwprError> {
        let model_name = model.name.clone().unwrap_or_default();
        let descriptor = match fwpr_builder::build(model)
            .map_err(|err| FwprError::new_build_error(err, model_name.as_str()))?
        {
            BuildOutcome::Procedure(descriptor) => descriptor,
            BuildOutcome::NotApplicable { document_kind } => {
                info!(document_kind = document_kind.as_str(); "Not a procedure, skipping");
                return Ok(None);
            }
        };

        info!(procedure = descriptor.name(); "Classifying nodes");
        let classification = Classification::classify(&descriptor)
            .map_err(|err| FwprError::new_build_error(err, model_name.as_str()))?;
        debug!(residents = classification.residents().len(); "Nodes classified");

        let plan = ExecutionPlan::synthesize(&descriptor, &classification, self.config.naming())?;
        trace!(plan:?; "Execution plan");

        Ok(Some(Procedure {
            descriptor,
            classification,
            plan,
        }))
    }

    /// Generate the C artifacts of a procedure.
    ///
    /// # Errors
    ///
    /// Returns [`FwprError::Export`] if the codegen configuration is unusable.
    pub fn generate(&self, procedure: &Procedure) -> Result<Vec<Artifact>, FwprError> {
        let artifacts = CExporter::new(&self.config).export(procedure)?;
        info!(
            procedure = procedure.name(),
            artifacts = artifacts.len();
            "Artifacts generated"
        );
        Ok(artifacts)
    }
}
