use crate::analysis::loader::DEFAULT_PATTERN;
use crate::generators::template_set::DEFAULT_BUILTIN;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Config file not found: {0}")]
    MissingFile(PathBuf),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Every input and switch of one run.
///
/// Built from the command line or a JSON file and passed explicitly to each
/// stage.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct GenerateConfig {
    /// Primary document locations (files or directories); their content is generated
    #[serde(default)]
    pub rom: Vec<PathBuf>,

    /// Dependency document locations; referenced but never generated
    #[serde(default)]
    pub deprom: Vec<PathBuf>,

    /// User template directory, takes precedence over the built-in set
    #[serde(default)]
    pub templates: Option<PathBuf>,

    /// Name of the built-in template set
    #[serde(default = "default_internal_templates")]
    pub internal_templates: String,

    /// Root directory for generated files
    #[serde(default)]
    pub codegen: Option<PathBuf>,

    /// Remove the contents of the codegen root before writing
    #[serde(default)]
    pub delete: bool,

    /// Keep files that already exist instead of replacing them
    #[serde(default)]
    pub no_overwrite: bool,

    /// Print every written file
    #[serde(default)]
    pub list_generated_files: bool,

    /// Config overlay document
    #[serde(default)]
    pub config: Option<PathBuf>,

    /// Keys to introspect; when non-empty nothing is generated
    #[serde(default)]
    pub show_values: Vec<String>,

    /// Directory receiving the merged model as documents
    #[serde(default)]
    pub output_model: Option<PathBuf>,

    /// File-name pattern for discovered documents
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: Option<bool>,
}

fn default_internal_templates() -> String {
    DEFAULT_BUILTIN.to_string()
}

fn default_pattern() -> String {
    DEFAULT_PATTERN.to_string()
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            rom: Vec::new(),
            deprom: Vec::new(),
            templates: None,
            internal_templates: default_internal_templates(),
            codegen: None,
            delete: false,
            no_overwrite: false,
            list_generated_files: false,
            config: None,
            show_values: Vec::new(),
            output_model: None,
            pattern: default_pattern(),
            verbose: Some(false),
        }
    }
}

impl GenerateConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file.
    ///
    /// Not validated yet: command-line values may still be merged over it.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Reject invocations that cannot run at all.
    ///
    /// Problems inside the documents are not checked here; those are
    /// reported by the pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rom.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "At least one primary document location (--rom) is required".to_string(),
            ));
        }

        if let Some(templates) = &self.templates {
            if !templates.is_dir() {
                return Err(ConfigError::InvalidConfig(format!(
                    "Template directory does not exist: {}",
                    templates.display()
                )));
            }
        }

        if let Some(config) = &self.config {
            if !config.is_file() {
                return Err(ConfigError::MissingFile(config.clone()));
            }
        }

        if self.codegen.is_none() && !self.is_introspection() && self.output_model.is_none() {
            return Err(ConfigError::InvalidConfig(
                "An output directory (--codegen) is required unless --show-values or --output-model is given"
                    .to_string(),
            ));
        }

        for dir in self.codegen.iter().chain(self.output_model.iter()) {
            validate_output_dir(dir)?;
        }
        if let Some(model) = &self.output_model {
            validate_creatable(model)?;
        }

        glob::Pattern::new(&self.pattern).map_err(|e| {
            ConfigError::InvalidConfig(format!("Invalid document pattern '{}': {}", self.pattern, e))
        })?;

        Ok(())
    }

    /// Merge with another configuration, with other taking precedence
    pub fn merge(&mut self, other: &GenerateConfig) {
        if !other.rom.is_empty() {
            self.rom = other.rom.clone();
        }
        if !other.deprom.is_empty() {
            self.deprom = other.deprom.clone();
        }
        if other.templates.is_some() {
            self.templates = other.templates.clone();
        }
        if other.internal_templates != default_internal_templates() {
            self.internal_templates = other.internal_templates.clone();
        }
        if other.codegen.is_some() {
            self.codegen = other.codegen.clone();
        }
        self.delete |= other.delete;
        self.no_overwrite |= other.no_overwrite;
        self.list_generated_files |= other.list_generated_files;
        if other.config.is_some() {
            self.config = other.config.clone();
        }
        if !other.show_values.is_empty() {
            self.show_values = other.show_values.clone();
        }
        if other.output_model.is_some() {
            self.output_model = other.output_model.clone();
        }
        if other.pattern != default_pattern() {
            self.pattern = other.pattern.clone();
        }
        if other.verbose.is_some() {
            self.verbose = other.verbose;
        }
    }

    /// Get effective verbose setting
    pub fn is_verbose(&self) -> bool {
        self.verbose.unwrap_or(false)
    }

    /// Introspection runs replace generation entirely
    pub fn is_introspection(&self) -> bool {
        !self.show_values.is_empty()
    }
}

/// The nearest existing ancestor of `dir` must be a writable directory.
///
/// Nothing is created here; introspection runs validate too.
fn validate_creatable(dir: &Path) -> Result<(), ConfigError> {
    let Some(existing) = dir
        .ancestors()
        .map(|p| if p.as_os_str().is_empty() { Path::new(".") } else { p })
        .find(|p| p.exists())
    else {
        return Ok(());
    };
    let creatable = existing.is_dir() && !fs::metadata(existing)?.permissions().readonly();
    if !creatable {
        return Err(ConfigError::InvalidConfig(format!(
            "Output model directory cannot be created: {}",
            dir.display()
        )));
    }
    Ok(())
}

fn validate_output_dir(dir: &Path) -> Result<(), ConfigError> {
    if !dir.exists() {
        return Ok(());
    }
    if !dir.is_dir() {
        return Err(ConfigError::InvalidConfig(format!(
            "Output path is not a directory: {}",
            dir.display()
        )));
    }
    if fs::metadata(dir)?.permissions().readonly() {
        return Err(ConfigError::InvalidConfig(format!(
            "Output directory is not writable: {}",
            dir.display()
        )));
    }
    Ok(())
}
