use crate::models::EntityKind;
use serde::{ser::Serializer, Serialize};
use std::fmt;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors: the invocation itself is unusable and the pipeline never starts.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] crate::interface::config::ConfigError),

    #[error("Invalid document pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Template set unavailable: {0}")]
    TemplateSet(String),
}

impl Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}

/// A single recoverable failure recorded by one of the pipeline stages.
///
/// Stages never stop at the first of these; they collect every occurrence into
/// [`Diagnostics`] so a document author sees the whole list in one run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    #[error("Cannot read '{}': {message}", path.display())]
    Input { path: PathBuf, message: String },

    #[error("Failed to parse '{}': {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("No interface documents found in paths: {locations}")]
    NoDocuments { locations: String },

    #[error("Invalid definition in module '{module}': {message}")]
    InvalidDefinition { module: String, message: String },

    #[error(
        "Conflicting definitions of '{module}.{name}' in '{}' and '{}'",
        first.display(),
        second.display()
    )]
    DuplicateDefinition {
        module: String,
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("Module '{module}' is declared with version '{first}' and '{second}'")]
    VersionConflict {
        module: String,
        first: String,
        second: String,
    },

    #[error("Module '{module}' imports unknown module '{import}'")]
    UnknownImport { module: String, import: String },

    #[error("Unresolved reference '{reference}' in {location}")]
    UnresolvedReference { location: String, reference: String },

    #[error(
        "Ambiguous reference '{reference}' in {location}: candidates are {}",
        candidates.join(", ")
    )]
    AmbiguousReference {
        location: String,
        reference: String,
        candidates: Vec<String>,
    },

    #[error("Reference '{reference}' in {location} names module '{target}', which '{module}' does not import")]
    UnimportedModule {
        module: String,
        location: String,
        reference: String,
        target: String,
    },

    #[error("Reference '{reference}' in {location} must name a {expected}")]
    KindMismatch {
        location: String,
        reference: String,
        expected: String,
    },

    #[error("Import cycle detected: {}", format_cycle(modules))]
    ImportCycle { modules: Vec<String> },

    #[error("Inheritance cycle detected: {}", format_cycle(types))]
    InheritanceCycle { types: Vec<String> },

    #[error("No template bound for {kind} entities")]
    MissingTemplate { kind: EntityKind },

    #[error("Template '{template}' does not start with a known entity kind")]
    UnknownTemplateKind { template: String },

    #[error("Failed to render '{template}' for {entity}: {message}")]
    Render {
        template: String,
        entity: String,
        message: String,
    },

    #[error("Failed to write '{}': {message}", path.display())]
    Write { path: PathBuf, message: String },

    #[error("Failed to export model to '{}': {message}", path.display())]
    Export { path: PathBuf, message: String },
}

fn format_cycle(members: &[String]) -> String {
    match members.first() {
        Some(first) => format!("{} -> {}", members.join(" -> "), first),
        None => String::new(),
    }
}

impl Serialize for GenerationError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}

/// Ordered batch of [`GenerationError`]s.
///
/// Used as the error side of every stage result, in which case it is never empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics(Vec<GenerationError>);

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: GenerationError) {
        self.0.push(error);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.0.extend(other.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GenerationError> {
        self.0.iter()
    }

    /// `Ok(value)` when nothing was recorded, otherwise every recorded error.
    pub fn into_result<T>(self, value: T) -> std::result::Result<T, Diagnostics> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl From<GenerationError> for Diagnostics {
    fn from(error: GenerationError) -> Self {
        Self(vec![error])
    }
}

impl From<Vec<GenerationError>> for Diagnostics {
    fn from(errors: Vec<GenerationError>) -> Self {
        Self(errors)
    }
}

impl IntoIterator for Diagnostics {
    type Item = GenerationError;
    type IntoIter = std::vec::IntoIter<GenerationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a GenerationError;
    type IntoIter = std::slice::Iter<'a, GenerationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}
