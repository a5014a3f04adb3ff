pub mod conflict;
pub mod dependency_graph;
pub mod document;
pub mod loader;
pub mod merger;
pub mod type_resolver;
pub mod validator;

use crate::error::{Diagnostics, GenerationError};
use crate::models::MergedModel;
use crate::overlay::ConfigOverlay;
use std::path::PathBuf;

use loader::DocumentLoader;
use merger::ModelMerger;

/// Outcome of the load and merge stages.
///
/// `model` is present whenever the documents that could be read merged
/// cleanly, even if others failed to load; `diagnostics` then still carries
/// the load failures and the run as a whole is unsuccessful.
#[derive(Debug, Default)]
pub struct ModelBuild {
    pub model: Option<MergedModel>,
    pub diagnostics: Diagnostics,
    pub warnings: Vec<String>,
    /// Documents parsed successfully
    pub document_count: usize,
}

impl ModelBuild {
    pub fn is_success(&self) -> bool {
        self.model.is_some() && self.diagnostics.is_empty()
    }
}

/// Orchestrates loading and merging into a [`MergedModel`]
pub struct ModelBuilder<'a> {
    loader: DocumentLoader,
    overlay: &'a ConfigOverlay,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(loader: DocumentLoader, overlay: &'a ConfigOverlay) -> Self {
        Self { loader, overlay }
    }

    pub fn build(&self, primary: &[PathBuf], dependencies: &[PathBuf]) -> ModelBuild {
        let outcome = self.loader.load(primary, dependencies);
        let mut diagnostics = outcome.diagnostics;

        let nothing_to_generate = diagnostics
            .iter()
            .any(|e| matches!(e, GenerationError::NoDocuments { .. }));
        if nothing_to_generate {
            return ModelBuild {
                model: None,
                diagnostics,
                warnings: outcome.warnings,
                document_count: outcome.documents.len(),
            };
        }

        let model = match ModelMerger::new(self.overlay).merge(&outcome.documents) {
            Ok(model) => Some(model),
            Err(errors) => {
                diagnostics.extend(errors);
                None
            }
        };

        ModelBuild {
            model,
            diagnostics,
            warnings: outcome.warnings,
            document_count: outcome.documents.len(),
        }
    }
}
