use super::base::template_context::{EventContext, ModuleContext, TypeContext};
use super::base::templates::{describe_tera_error, register_model_helpers, GlobalContext};
use super::template_set::TemplateBinding;
use crate::error::{Diagnostics, GenerationError};
use crate::interface::output::Logger;
use crate::models::{EntityKind, MergedModel};
use crate::overlay::{module_value_space, ConfigOverlay};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use tera::{Context, Tera};

/// One rendered output file, not yet written
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    /// Relative to the codegen root
    pub path: PathBuf,
    pub content: String,
    pub template: String,
    pub entity: String,
}

#[derive(Debug, Default)]
pub struct RenderOutcome {
    /// In job order: modules by dependency, then their types and events by name
    pub files: Vec<GeneratedFile>,
    pub diagnostics: Diagnostics,
}

struct RenderJob {
    template: String,
    entity: String,
    context: Context,
}

/// Evaluates bound templates for every `local` entity of a model
pub struct Renderer<'a> {
    tera: Tera,
    binding: TemplateBinding,
    model: &'a MergedModel,
    overlay: &'a ConfigOverlay,
}

impl<'a> Renderer<'a> {
    /// `tera` comes from [`TemplateSet::build_engine`](super::template_set::TemplateSet::build_engine); the model helpers are added here.
    pub fn new(
        mut tera: Tera,
        binding: TemplateBinding,
        model: &'a MergedModel,
        overlay: &'a ConfigOverlay,
    ) -> Self {
        register_model_helpers(&mut tera, model, overlay);
        Self {
            tera,
            binding,
            model,
            overlay,
        }
    }

    /// Render every (entity, template) pair.
    ///
    /// Failures are recorded per pair; the other pairs still render.
    pub fn render(&self, logger: &Logger) -> RenderOutcome {
        let jobs = self.jobs();
        logger.debug(&format!("Rendering {} template instances", jobs.len()));

        let results: Vec<Result<Option<GeneratedFile>, GenerationError>> =
            jobs.par_iter().map(|job| self.render_job(job)).collect();

        let mut outcome = RenderOutcome::default();
        let mut produced_by: BTreeMap<PathBuf, (String, String)> = BTreeMap::new();
        for (job, result) in jobs.iter().zip(results) {
            match result {
                Ok(Some(file)) => {
                    if let Some((template, entity)) = produced_by.get(&file.path) {
                        outcome.diagnostics.push(GenerationError::Render {
                            template: file.template,
                            entity: file.entity,
                            message: format!(
                                "destination '{}' is already produced by '{}' for {}",
                                file.path.display(),
                                template,
                                entity
                            ),
                        });
                        continue;
                    }
                    logger.verbose(&format!(
                        "  📄 {} ← {} ({})",
                        file.path.display(),
                        file.template,
                        file.entity
                    ));
                    produced_by.insert(
                        file.path.clone(),
                        (file.template.clone(), file.entity.clone()),
                    );
                    outcome.files.push(file);
                }
                Ok(None) => logger.verbose(&format!(
                    "  ⏭️  {} produced no file for {}",
                    job.template, job.entity
                )),
                Err(e) => outcome.diagnostics.push(e),
            }
        }
        outcome
    }

    fn jobs(&self) -> Vec<RenderJob> {
        let model_value = to_context_value(self.model);
        let generator = GlobalContext::new();
        let mut jobs = Vec::new();

        for module in self.model.local_modules() {
            let module_context = ModuleContext::from_module(module);
            let config = self
                .overlay
                .resolve(&module.name, &module_value_space(module));

            let mut base = Context::new();
            base.insert("module", &module_context);
            base.insert("model", &model_value);
            base.insert("config", &config);
            base.insert("generator", &generator);

            let mut push = |kind: EntityKind, entity: String, value: Value| {
                for template in self.binding.templates_for(kind) {
                    let mut context = base.clone();
                    context.insert("entity", &value);
                    context.insert(kind.template_prefix(), &value);
                    jobs.push(RenderJob {
                        template: template.clone(),
                        entity: entity.clone(),
                        context,
                    });
                }
            };

            push(
                EntityKind::Module,
                format!("module '{}'", module.name),
                to_context_value(&module_context),
            );
            for def in module.types.values().filter(|def| def.origin.is_local()) {
                let kind = def.entity_kind();
                push(
                    kind,
                    format!("{} '{}'", kind, def.key()),
                    to_context_value(&TypeContext::from_type_def(def)),
                );
            }
            for event in module.events().filter(|event| event.origin.is_local()) {
                push(
                    EntityKind::Event,
                    format!("event '{}.{}'", event.owner, event.name),
                    to_context_value(&EventContext::from_event(event)),
                );
            }
        }

        jobs
    }

    fn render_job(&self, job: &RenderJob) -> Result<Option<GeneratedFile>, GenerationError> {
        let render_error = |message: String| GenerationError::Render {
            template: job.template.clone(),
            entity: job.entity.clone(),
            message,
        };

        let rendered = self
            .tera
            .render(&job.template, &job.context)
            .map_err(|e| render_error(describe_tera_error(&e)))?;

        let (first_line, content) = rendered.split_once('\n').unwrap_or((rendered.as_str(), ""));
        let destination = first_line.trim();
        if destination.is_empty() {
            return Ok(None);
        }

        let path = relative_destination(destination).map_err(render_error)?;
        Ok(Some(GeneratedFile {
            path,
            content: content.to_string(),
            template: job.template.clone(),
            entity: job.entity.clone(),
        }))
    }
}

fn to_context_value<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or_default()
}

/// Normalize a rendered destination; it must stay inside the codegen root.
fn relative_destination(destination: &str) -> Result<PathBuf, String> {
    let path = Path::new(destination);
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(format!(
                    "destination '{}' must not contain '..'",
                    destination
                ))
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(format!("destination '{}' must be a relative path", destination))
            }
        }
    }
    if normalized.as_os_str().is_empty() {
        return Err(format!("destination '{}' names no file", destination));
    }
    Ok(normalized)
}
