use super::document::InterfaceDocument;
use crate::error::{Diagnostics, Error, GenerationError};
use crate::models::Origin;
use glob::Pattern;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File-name pattern used when the caller supplies none
pub const DEFAULT_PATTERN: &str = "*.kmd.json";

/// A parsed document tagged with the input set it came from
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    pub path: PathBuf,
    pub origin: Origin,
    pub document: InterfaceDocument,
}

/// Everything the loader could read, plus what it could not.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Primary documents first, each set in path order
    pub documents: Vec<LoadedDocument>,
    pub diagnostics: Diagnostics,
    /// Non-fatal findings, such as an empty dependency set
    pub warnings: Vec<String>,
}

/// Discovers and parses interface documents under primary and dependency locations.
#[derive(Debug, Clone)]
pub struct DocumentLoader {
    pattern: Pattern,
}

impl DocumentLoader {
    pub fn new(pattern: &str) -> crate::Result<Self> {
        let pattern = Pattern::new(pattern).map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { pattern })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.pattern.matches(name))
    }

    /// Find document files under `locations`, sorted and de-duplicated.
    ///
    /// Directories are walked recursively and filtered by the file-name
    /// pattern; a location naming a file is taken as is.
    pub fn discover(&self, locations: &[PathBuf]) -> (BTreeSet<PathBuf>, Diagnostics) {
        let mut found = BTreeSet::new();
        let mut diagnostics = Diagnostics::new();

        for location in locations {
            if location.is_file() {
                found.insert(location.clone());
                continue;
            }
            if !location.is_dir() {
                diagnostics.push(GenerationError::Input {
                    path: location.clone(),
                    message: "no such file or directory".to_string(),
                });
                continue;
            }

            for entry in WalkDir::new(location).follow_links(true) {
                match entry {
                    Ok(entry) => {
                        let path = entry.path();
                        if entry.file_type().is_file() && self.matches(path) {
                            found.insert(path.to_path_buf());
                        }
                    }
                    Err(e) => diagnostics.push(GenerationError::Input {
                        path: e
                            .path()
                            .map(Path::to_path_buf)
                            .unwrap_or_else(|| location.clone()),
                        message: e.to_string(),
                    }),
                }
            }
        }

        (found, diagnostics)
    }

    /// Load both input sets.
    ///
    /// A file reachable from both sets is primary. Unreadable or malformed
    /// files are reported and skipped so the rest can still be merged;
    /// finding no primary document at all is an error of its own.
    pub fn load(&self, primary: &[PathBuf], dependencies: &[PathBuf]) -> LoadOutcome {
        let (primary_paths, mut diagnostics) = self.discover(primary);
        let (dependency_paths, dependency_diagnostics) = self.discover(dependencies);
        diagnostics.extend(dependency_diagnostics);

        if primary_paths.is_empty() {
            diagnostics.push(GenerationError::NoDocuments {
                locations: primary
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        let mut warnings = Vec::new();
        if !dependencies.is_empty() && dependency_paths.is_empty() {
            warnings.push(format!(
                "No dependency documents found in paths: {}",
                dependencies
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
        }

        let tagged: Vec<(PathBuf, Origin)> = primary_paths
            .iter()
            .map(|path| (path.clone(), Origin::Local))
            .chain(
                dependency_paths
                    .difference(&primary_paths)
                    .map(|path| (path.clone(), Origin::Imported)),
            )
            .collect();

        let results: Vec<Result<LoadedDocument, GenerationError>> = tagged
            .par_iter()
            .map(|(path, origin)| parse_document(path, *origin))
            .collect();

        let mut documents = Vec::with_capacity(results.len());
        for result in results {
            match result {
                Ok(document) => documents.push(document),
                Err(e) => diagnostics.push(e),
            }
        }

        LoadOutcome {
            documents,
            diagnostics,
            warnings,
        }
    }
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self {
            pattern: Pattern::new(DEFAULT_PATTERN).unwrap_or_default(),
        }
    }
}

/// Read and parse a single document.
pub fn parse_document(path: &Path, origin: Origin) -> Result<LoadedDocument, GenerationError> {
    let content = std::fs::read_to_string(path).map_err(|e| GenerationError::Input {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let document: InterfaceDocument =
        serde_json::from_str(&content).map_err(|e| GenerationError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(LoadedDocument {
        path: path.to_path_buf(),
        origin,
        document,
    })
}
