//! Runs a whole compilation: validate, parse, then emit every operation.

use std::fmt;

use tracing::{error, info, warn};

use crate::config::GeneratorConfig;
use crate::document::{Document, HttpMethod};
use crate::emitter::{EmitOutcome, ScaffoldArtifact, ScaffoldEmitter};
use crate::error::{Result, ScaffoldError};
use crate::parser::{decode, parse_document, read_source, SourceFormat};
use crate::schema::{synthesize, Degradation};
use crate::validator::{validate_strict, validate_structure};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validating,
    Parsing,
    Emitting,
    Completed,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Validating => "validating",
            Stage::Parsing => "parsing",
            Stage::Emitting => "emitting",
            Stage::Completed => "completed",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A degradation recorded for one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationNote {
    pub method: HttpMethod,
    pub path: String,
    pub degradation: Degradation,
}

/// Summary of a completed run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub artifacts: Vec<ScaffoldArtifact>,
    pub written: usize,
    pub skipped: usize,
    pub overwritten: usize,
    pub notes: Vec<OperationNote>,
}

impl RunReport {
    fn record(&mut self, artifact: ScaffoldArtifact, outcome: EmitOutcome) {
        match outcome {
            EmitOutcome::Written => self.written += 1,
            EmitOutcome::Skipped => self.skipped += 1,
            EmitOutcome::Overwritten => self.overwritten += 1,
        }
        self.artifacts.push(artifact);
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} written, {} skipped, {} overwritten",
            self.written, self.skipped, self.overwritten
        )?;
        if !self.notes.is_empty() {
            write!(f, ", {} schema gaps", self.notes.len())?;
        }
        Ok(())
    }
}

/// Drives one compiler run through its stages.
#[derive(Debug)]
pub struct Compiler {
    config: GeneratorConfig,
    stage: Stage,
}

impl Compiler {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            stage: Stage::Validating,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn run(&mut self) -> Result<RunReport> {
        let result = self.advance();
        if let Err(err) = &result {
            error!(stage = %self.stage, category = err.category(), "{err}");
            self.stage = Stage::Failed;
        }
        result
    }

    fn advance(&mut self) -> Result<RunReport> {
        let source = self.config.source.clone();
        info!(source = %source.display(), "parsing");
        if !source.exists() {
            return Err(ScaffoldError::SourceNotFound(source));
        }

        self.stage = Stage::Validating;
        let contents = read_source(&source)?;
        let tree = decode(&contents, SourceFormat::detect(&source))?;
        let api = validate_structure(&tree)?;
        if self.config.strict {
            validate_strict(&tree, &api)?;
        }
        info!(title = %api.info.title, version = %api.info.version, "document is valid");

        self.stage = Stage::Parsing;
        let document = parse_document(&tree)?;

        self.stage = Stage::Emitting;
        let report = self.emit(&document)?;

        self.stage = Stage::Completed;
        info!(%report, "parsing complete");
        Ok(report)
    }

    fn emit(&self, document: &Document) -> Result<RunReport> {
        let destination = &self.config.destination;
        if !destination.exists() {
            info!(destination = %destination.display(), "creating destination");
        }
        std::fs::create_dir_all(destination).map_err(ScaffoldError::filesystem(destination))?;

        let emitter = ScaffoldEmitter::new(
            destination,
            self.config.module_style,
            self.config.write_policy,
        )?;
        let mut report = RunReport::default();

        for (template, item) in &document.paths {
            let route = emitter.prepare_route(template)?;
            for (&method, operation) in &item.operations {
                info!("{method} {}", route.mapped);
                let synthesized = synthesize(operation, &document.components);
                for degradation in &synthesized.notes {
                    warn!(%method, path = %template, "{degradation}");
                    report.notes.push(OperationNote {
                        method,
                        path: template.clone(),
                        degradation: degradation.clone(),
                    });
                }
                let artifact = emitter.artifact(&route, method, synthesized);
                let outcome = emitter.emit(&artifact)?;
                report.record(artifact, outcome);
            }
        }
        Ok(report)
    }
}

/// Convenience wrapper running a fresh [`Compiler`].
pub fn compile(config: GeneratorConfig) -> Result<RunReport> {
    Compiler::new(config).run()
}
