pub mod cli;
pub mod config;
pub mod output;

use crate::analysis::loader::DocumentLoader;
use crate::analysis::{ModelBuild, ModelBuilder};
use crate::error::Diagnostics;
use crate::generators::base::file_writer::{FileWriter, WriteOptions};
use crate::generators::model_export::export_model;
use crate::generators::renderer::Renderer;
use crate::generators::template_set::{TemplateSet, TemplateSource};
use crate::introspect::{introspect, IntrospectionReport};
use crate::overlay::ConfigOverlay;
use std::path::PathBuf;

pub use cli::Cli;
pub use config::{ConfigError, GenerateConfig};
pub use output::{LogLevel, Logger, ProgressReporter};

/// Result of one generation run
#[derive(Debug, Default)]
pub struct GenerationReport {
    /// Relative to the codegen root
    pub written: Vec<PathBuf>,
    /// Left in place because of `no_overwrite`
    pub skipped: Vec<PathBuf>,
    pub exported: Vec<PathBuf>,
    pub errors: Diagnostics,
    pub warnings: Vec<String>,
}

impl GenerationReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Result of an introspection run; nothing is written
#[derive(Debug, Default)]
pub struct IntrospectionRun {
    pub report: IntrospectionReport,
    pub errors: Diagnostics,
    pub warnings: Vec<String>,
}

impl IntrospectionRun {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Run the whole pipeline: load, merge, export, bind, render and write.
///
/// `Err` means the invocation could not start (bad options, unreadable
/// overlay, broken template set). Everything that goes wrong once documents
/// are being processed is collected into [`GenerationReport::errors`].
/// Rendering only happens when loading and merging produced no errors.
pub fn generate_from_config(config: &GenerateConfig) -> crate::Result<GenerationReport> {
    config.validate()?;
    let logger = Logger::new(config.is_verbose(), false);

    let overlay = ConfigOverlay::load(config.config.as_deref())?;
    let loader = DocumentLoader::new(&config.pattern)?;
    let templates = match config.codegen {
        Some(_) => {
            let source = TemplateSource::from_options(
                config.templates.as_deref(),
                &config.internal_templates,
            );
            let templates = TemplateSet::load(&source)?;
            let engine = templates.build_engine()?;
            logger.verbose(&format!("Using templates from {}", templates.description()));
            Some((templates, engine))
        }
        None => None,
    };

    let total_steps = 1
        + usize::from(config.output_model.is_some())
        + if templates.is_some() { 3 } else { 0 };
    let mut reporter = ProgressReporter::new(logger.clone(), total_steps);

    reporter.start_step("Loading documents");
    let ModelBuild {
        model,
        diagnostics,
        warnings,
        document_count,
    } = ModelBuilder::new(loader, &overlay).build(&config.rom, &config.deprom);
    for warning in &warnings {
        logger.warning(warning);
    }
    let build_clean = diagnostics.is_empty();
    let mut report = GenerationReport {
        errors: diagnostics,
        warnings,
        ..Default::default()
    };

    let Some(model) = model else {
        reporter.fail_step(&format!("{} error(s)", report.errors.len()));
        return Ok(report);
    };
    reporter.complete_step(Some(&format!(
        "{} documents, {} local modules",
        document_count,
        model.local_modules().count()
    )));

    if let Some(dir) = &config.output_model {
        reporter.start_step("Exporting model");
        match export_model(&model, dir) {
            Ok(paths) => {
                reporter.complete_step(Some(&format!("{} documents", paths.len())));
                report.exported = paths;
            }
            Err(errors) => {
                reporter.fail_step(&format!("{} error(s)", errors.len()));
                report.errors.extend(errors);
            }
        }
    }

    let (Some((templates, engine)), Some(codegen)) = (templates, &config.codegen) else {
        reporter.finish();
        return Ok(report);
    };
    if !build_clean {
        reporter.finish();
        logger.warning("Nothing generated: the model has errors");
        return Ok(report);
    }

    reporter.start_step("Binding templates");
    let binding = match templates.bind(&model) {
        Ok(binding) => binding,
        Err(errors) => {
            reporter.fail_step(&format!("{} error(s)", errors.len()));
            report.errors.extend(errors);
            return Ok(report);
        }
    };
    reporter.complete_step(None);

    reporter.start_step("Rendering");
    let rendered = Renderer::new(engine, binding, &model, &overlay).render(&logger);
    reporter.complete_step(Some(&format!("{} files", rendered.files.len())));
    report.errors.extend(rendered.diagnostics);

    reporter.start_step("Writing files");
    let options = WriteOptions {
        delete: config.delete,
        no_overwrite: config.no_overwrite,
    };
    let outcome = FileWriter::new(codegen, options).write_all(&rendered.files);
    for path in &outcome.skipped {
        logger.verbose(&format!("Kept existing {}", path.display()));
    }
    reporter.complete_step(Some(&format!(
        "{} written, {} skipped",
        outcome.written.len(),
        outcome.skipped.len()
    )));
    reporter.finish();

    report.written = outcome.written;
    report.skipped = outcome.skipped;
    report.errors.extend(outcome.diagnostics);
    Ok(report)
}

/// Load and merge, then evaluate `config.show_values` for every local module.
///
/// Never renders, writes or exports.
pub fn introspect_from_config(config: &GenerateConfig) -> crate::Result<IntrospectionRun> {
    config.validate()?;
    let overlay = ConfigOverlay::load(config.config.as_deref())?;
    let loader = DocumentLoader::new(&config.pattern)?;

    let build = ModelBuilder::new(loader, &overlay).build(&config.rom, &config.deprom);
    let report = build
        .model
        .as_ref()
        .map(|model| introspect(model, &overlay, &config.show_values))
        .unwrap_or_default();

    Ok(IntrospectionRun {
        report,
        errors: build.diagnostics,
        warnings: build.warnings,
    })
}
