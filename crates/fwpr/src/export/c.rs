//! C backend.
//!
//! Produces a control header, a header declaring the user callbacks, the
//! body implementing the control surface and, optionally, a template body
//! for the callbacks. The generated code is C99 and uses no library beyond
//! the language itself.

use log::{debug, info};

use fwpr_core::{descriptor::ProcedureDescriptor, text::is_c_identifier};

use super::{Artifact, Error, Exporter, doxygen};
use crate::{
    Procedure,
    config::AppConfig,
    synthesis::{ExecutionPlan, Flow},
};

const MIN_COMMENT_WIDTH: usize = 20;
const MAX_INDENT_WIDTH: usize = 16;
const GENERATED_NOTICE: &str = "Generated by fwpr. Do not edit.";

/// Exporter for C source files.
pub struct CExporter<'a> {
    config: &'a AppConfig,
}

impl<'a> CExporter<'a> {
    pub fn new(config: &'a AppConfig) -> Self {
        Self { config }
    }

    fn check_config(&self) -> Result<(), Error> {
        let codegen = self.config.codegen();
        if codegen.max_comment_width() < MIN_COMMENT_WIDTH {
            return Err(Error::InvalidConfig(format!(
                "max_comment_width must be at least {MIN_COMMENT_WIDTH}, got {}",
                codegen.max_comment_width()
            )));
        }
        if codegen.indent_width() == 0 || codegen.indent_width() > MAX_INDENT_WIDTH {
            return Err(Error::InvalidConfig(format!(
                "indent_width must be between 1 and {MAX_INDENT_WIDTH}, got {}",
                codegen.indent_width()
            )));
        }

        let naming = self.config.naming();
        // Prefixes start identifiers; the other parts are spliced in after them.
        for (key, prefix) in [
            ("function_prefix", naming.function_prefix()),
            ("enum_prefix", naming.enum_prefix()),
        ] {
            if !prefix.is_empty() && !is_c_identifier(prefix) {
                return Err(Error::InvalidConfig(format!(
                    "{key} `{prefix}` is not a valid C identifier prefix"
                )));
            }
        }
        for (key, fragment) in [
            ("file_prefix", naming.file_prefix()),
            ("user_suffix", naming.user_suffix()),
        ] {
            if !is_identifier_fragment(fragment) {
                return Err(Error::InvalidConfig(format!(
                    "{key} `{fragment}` may only contain ASCII letters, digits and underscores"
                )));
            }
        }
        Ok(())
    }
}

impl Exporter for CExporter<'_> {
    fn export(&self, procedure: &Procedure) -> Result<Vec<Artifact>, Error> {
        self.check_config()?;

        let plan = procedure.plan();
        info!(procedure = plan.procedure(); "Exporting C sources");

        let writer = SourceWriter {
            config: self.config,
            names: Names::new(self.config, plan.procedure()),
            descriptor: procedure.descriptor(),
            plan,
        };

        let mut artifacts = vec![
            writer.control_header(),
            writer.user_header(),
            writer.body(),
        ];
        if self.config.codegen().user_stub() {
            artifacts.push(writer.user_body());
        }

        for artifact in &artifacts {
            debug!(
                file = artifact.file_name(),
                bytes = artifact.content().len();
                "Artifact generated"
            );
        }
        Ok(artifacts)
    }
}

/// Generated identifiers of one procedure.
struct Names {
    file: String,
    user_file: String,
    function: String,
    enumerator: String,
}

impl Names {
    fn new(config: &AppConfig, procedure: &str) -> Self {
        let naming = config.naming();
        let file = format!("{}{procedure}", naming.file_prefix());
        Self {
            user_file: format!("{file}{}", naming.user_suffix()),
            file,
            function: format!("{}{procedure}", naming.function_prefix()),
            enumerator: format!("{}{procedure}", naming.enum_prefix()),
        }
    }

    fn control(&self, operation: &str) -> String {
        format!("{}{operation}", self.function)
    }

    fn nodes_type(&self) -> String {
        self.control("Nodes_t")
    }

    fn enumerator(&self, node: &str) -> String {
        format!("{}{node}", self.enumerator)
    }

    fn stopped(&self) -> String {
        self.enumerator("Stopped")
    }
}

struct SourceWriter<'a> {
    config: &'a AppConfig,
    names: Names,
    descriptor: &'a ProcedureDescriptor,
    plan: &'a ExecutionPlan,
}

impl SourceWriter<'_> {
    fn writer(&self) -> CodeWriter {
        CodeWriter::new(
            self.config.codegen().indent_width(),
            self.config.codegen().max_comment_width(),
        )
    }

    fn counters(&self) -> bool {
        self.config.codegen().exec_counters()
    }

    fn case_enumerator(&self, pos: usize) -> String {
        self.names.enumerator(self.plan.cases()[pos].name())
    }

    fn control_header(&self) -> Artifact {
        let file_name = format!("{}.h", self.names.file);
        let description = format!(
            "Control interface of procedure {}.",
            self.plan.procedure()
        );
        let guard = include_guard(&file_name);
        let names = &self.names;

        let mut w = self.writer();
        let file_doc = format!("@file {file_name}");
        w.comment(&[file_doc.as_str(), description.as_str(), GENERATED_NOTICE]);
        w.blank();
        w.line(format!("#ifndef {guard}"));
        w.line(format!("#define {guard}"));
        w.blank();

        w.comment(&[
            "Nodes at which the procedure can be parked between two executions.",
            "The procedure is stopped when it is at none of them.",
        ]);
        w.line("typedef enum {");
        w.indent();
        let cases = self.plan.cases();
        w.line(format!(
            "{} = 0{}",
            names.stopped(),
            if cases.is_empty() { "" } else { "," }
        ));
        for (pos, case) in cases.iter().enumerate() {
            let separator = if pos + 1 < cases.len() { "," } else { "" };
            w.line(format!(
                "{} = {}{separator}",
                names.enumerator(case.name()),
                pos + 1
            ));
        }
        w.dedent();
        w.line(format!("}} {};", names.nodes_type()));
        w.blank();

        let mut prototypes = vec![
            (
                "Starts the procedure at its initial node. Does nothing if the procedure is already started.",
                format!("void {}(void);", names.control("Start")),
            ),
            (
                "Stops the procedure. Does nothing if the procedure is already stopped.",
                format!("void {}(void);", names.control("Stop")),
            ),
            (
                "Executes the procedure. Starting at the current node, guards are evaluated and actions run until a guard is false or the final node is reached. Does nothing if the procedure is stopped.",
                format!("void {}(void);", names.control("Execute")),
            ),
            (
                "Returns 1 if the procedure is started, 0 otherwise.",
                format!("int {}(void);", names.control("IsStarted")),
            ),
            (
                "Returns the node at which the procedure is parked, or the stopped value.",
                format!("{} {}(void);", names.nodes_type(), names.control("GetCurNode")),
            ),
        ];
        if self.counters() {
            prototypes.push((
                "Returns the number of executions since the procedure was started.",
                format!("unsigned int {}(void);", names.control("GetPrExecCnt")),
            ));
            prototypes.push((
                "Returns the number of executions since the current node was entered.",
                format!("unsigned int {}(void);", names.control("GetNodeExecCnt")),
            ));
        }
        for (doc, prototype) in prototypes {
            w.comment(&[doc]);
            w.line(prototype);
            w.blank();
        }

        w.line(format!("#endif /* {guard} */"));
        Artifact::new(file_name, description, w.finish())
    }

    fn user_header(&self) -> Artifact {
        let file_name = format!("{}.h", self.names.user_file);
        let description = format!(
            "Actions and guards of procedure {}, implemented by the user.",
            self.plan.procedure()
        );
        let guard = include_guard(&file_name);

        let mut w = self.writer();
        let file_doc = format!("@file {file_name}");
        w.comment(&[file_doc.as_str(), description.as_str(), GENERATED_NOTICE]);
        w.blank();
        w.line(format!("#ifndef {guard}"));
        w.line(format!("#define {guard}"));
        w.blank();

        for call in self.plan.actions() {
            let node = self.descriptor.node(call.node());
            let mut paragraphs = vec![format!("Action of node {}.", node.name())];
            paragraphs.push(node.description().to_string());
            paragraphs.extend(
                node.notes()
                    .iter()
                    .map(|note| self.descriptor.note(*note).text().to_string()),
            );
            let paragraphs: Vec<&str> = paragraphs.iter().map(String::as_str).collect();
            w.comment(&paragraphs);
            w.line(format!("void {}(void);", call.function()));
            w.blank();
        }

        for call in self.plan.guards() {
            let edge = self.descriptor.edge(call.edge());
            let from = self.descriptor.node(edge.source()).name();
            let to = self.descriptor.node(edge.target()).name();
            let summary = format!("Guard of the transition from {from} to {to}.");
            w.comment(&[
                summary.as_str(),
                edge.guard(),
                "@return 1 if the guard holds, 0 otherwise.",
            ]);
            w.line(format!("int {}(void);", call.function()));
            w.blank();
        }

        w.line(format!("#endif /* {guard} */"));
        Artifact::new(file_name, description, w.finish())
    }

    fn body(&self) -> Artifact {
        let file_name = format!("{}.c", self.names.file);
        let description = format!(
            "Implementation of the control interface of procedure {}.",
            self.plan.procedure()
        );
        let names = &self.names;
        let stopped = names.stopped();
        let counters = self.counters();

        let mut w = self.writer();
        let file_doc = format!("@file {file_name}");
        w.comment(&[file_doc.as_str(), description.as_str(), GENERATED_NOTICE]);
        w.blank();
        w.line(format!("#include \"{}.h\"", names.file));
        w.line(format!("#include \"{}.h\"", names.user_file));
        w.blank();
        w.comment(&["Node at which the procedure is parked."]);
        w.line(format!("static {} curNode = {stopped};", names.nodes_type()));
        if counters {
            w.comment(&["Number of executions since the procedure was started."]);
            w.line("static unsigned int prExecCnt = 0;");
            w.comment(&["Number of executions since the current node was entered."]);
            w.line("static unsigned int nodeExecCnt = 0;");
        }
        w.blank();

        w.open(format!("void {}(void)", names.control("Start")));
        w.open_block(format!("if (curNode != {stopped})"));
        w.line("return;");
        w.close_block();
        match self.plan.cases().first() {
            Some(initial) => w.line(format!("curNode = {};", names.enumerator(initial.name()))),
            None => w.line(format!("curNode = {stopped};")),
        }
        if counters {
            w.line("prExecCnt = 0;");
            w.line("nodeExecCnt = 0;");
        }
        w.close();
        w.blank();

        w.open(format!("void {}(void)", names.control("Stop")));
        w.line(format!("curNode = {stopped};"));
        w.close();
        w.blank();

        w.open(format!("int {}(void)", names.control("IsStarted")));
        w.line(format!("return (curNode != {stopped});"));
        w.close();
        w.blank();

        w.open(format!(
            "{} {}(void)",
            names.nodes_type(),
            names.control("GetCurNode")
        ));
        w.line("return curNode;");
        w.close();
        w.blank();

        if counters {
            w.open(format!("unsigned int {}(void)", names.control("GetPrExecCnt")));
            w.line("return prExecCnt;");
            w.close();
            w.blank();
            w.open(format!("unsigned int {}(void)", names.control("GetNodeExecCnt")));
            w.line("return nodeExecCnt;");
            w.close();
            w.blank();
        }

        self.write_execute(&mut w);

        Artifact::new(file_name, description, w.finish())
    }

    fn write_execute(&self, w: &mut CodeWriter) {
        let stopped = self.names.stopped();

        w.open(format!("void {}(void)", self.names.control("Execute")));
        w.open_block(format!("if (curNode == {stopped})"));
        w.line("return;");
        w.close_block();
        if self.counters() {
            w.line("prExecCnt++;");
            w.line("nodeExecCnt++;");
        }
        w.open_block("while (1)");
        w.open_block("switch (curNode)");
        for (pos, case) in self.plan.cases().iter().enumerate() {
            w.line(format!("case {}:", self.case_enumerator(pos)));
            w.indent();
            if let Some(guard) = case.guard() {
                w.open_block(format!("if (!{}())", guard.function()));
                w.line("return;");
                w.close_block();
            }
            if let Some(action) = case.action() {
                w.line(format!("{}();", action.function()));
            }
            self.write_flow(w, case.flow(), pos);
            w.dedent();
        }
        w.line("default:");
        w.indent();
        w.line("return;");
        w.dedent();
        w.close_block();
        w.close_block();
        w.close();
    }

    /// Writes `flow`; every path ends in `return` (stopped) or `break`
    /// (parked, dispatch continues with the new node).
    fn write_flow(&self, w: &mut CodeWriter, flow: &Flow, from: usize) {
        match flow {
            Flow::Stop => {
                w.line(format!("curNode = {};", self.names.stopped()));
                w.line("return;");
            }
            Flow::Park(pos) => {
                if self.counters() && *pos != from {
                    w.line("nodeExecCnt = 0;");
                }
                w.line(format!("curNode = {};", self.case_enumerator(*pos)));
                w.line("break;");
            }
            Flow::Action { call, then } => {
                w.line(format!("{}();", call.function()));
                self.write_flow(w, then, from);
            }
            Flow::Branch { arms, default } => {
                if arms.is_empty() {
                    self.write_flow(w, default, from);
                    return;
                }
                for (i, arm) in arms.iter().enumerate() {
                    let condition = format!("if ({}())", arm.guard.function());
                    if i == 0 {
                        w.open_block(condition);
                    } else {
                        w.reopen_block(format!("else {condition}"));
                    }
                    self.write_flow(w, &arm.flow, from);
                }
                w.reopen_block("else");
                self.write_flow(w, default, from);
                w.close_block();
            }
        }
    }

    fn user_body(&self) -> Artifact {
        let file_name = format!("{}.c", self.names.user_file);
        let description = format!(
            "Template implementation of the actions and guards of procedure {}.",
            self.plan.procedure()
        );

        let mut w = self.writer();
        let file_doc = format!("@file {file_name}");
        w.comment(&[
            file_doc.as_str(),
            description.as_str(),
            "Generated by fwpr as a starting point. Replace the bodies with the real actions and guards.",
        ]);
        w.blank();
        w.line(format!("#include \"{}.h\"", self.names.user_file));
        w.blank();

        for call in self.plan.actions() {
            let node = self.descriptor.node(call.node());
            w.open(format!("void {}(void)", call.function()));
            w.line(format!("/* {} */", doxygen::sanitize(node.description())));
            w.close();
            w.blank();
        }

        for call in self.plan.guards() {
            let edge = self.descriptor.edge(call.edge());
            w.open(format!("int {}(void)", call.function()));
            w.line(format!("/* {} */", doxygen::sanitize(edge.guard())));
            w.line("return 1;");
            w.close();
            w.blank();
        }

        Artifact::new(file_name, description, w.finish())
    }
}

fn is_identifier_fragment(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Include guard macro of a header, e.g. `FWPRBLINK_H_` for `FwPrBlink.h`.
fn include_guard(file_name: &str) -> String {
    let mut guard: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    guard.push('_');
    guard
}

/// Line-oriented source text with indentation tracking.
struct CodeWriter {
    out: String,
    level: usize,
    indent_width: usize,
    comment_width: usize,
}

impl CodeWriter {
    fn new(indent_width: usize, comment_width: usize) -> Self {
        Self {
            out: String::new(),
            level: 0,
            indent_width,
            comment_width,
        }
    }

    fn current_indent(&self) -> String {
        " ".repeat(self.level * self.indent_width)
    }

    fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            self.out.push_str(&self.current_indent());
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn comment(&mut self, paragraphs: &[&str]) {
        let block = doxygen::comment_block(paragraphs, &self.current_indent(), self.comment_width);
        for line in block {
            self.out.push_str(&line);
            self.out.push('\n');
        }
    }

    fn indent(&mut self) {
        self.level += 1;
    }

    fn dedent(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    /// Opens a function body, brace on its own line.
    fn open(&mut self, signature: impl AsRef<str>) {
        self.line(signature);
        self.line("{");
        self.indent();
    }

    fn close(&mut self) {
        self.dedent();
        self.line("}");
    }

    /// Opens a statement block, brace on the statement's line.
    fn open_block(&mut self, statement: impl AsRef<str>) {
        self.line(format!("{} {{", statement.as_ref()));
        self.indent();
    }

    /// Closes the current block and opens a continuation such as `else`.
    fn reopen_block(&mut self, statement: impl AsRef<str>) {
        self.dedent();
        self.line(format!("}} {} {{", statement.as_ref()));
        self.indent();
    }

    fn close_block(&mut self) {
        self.close();
    }

    fn finish(self) -> String {
        self.out
    }
}
