//! Template sets and their binding to entity kinds.
//!
//! A template set is a flat list of `*.tera` sources named by their path
//! relative to the set root. The file-name prefix before the first `_` or `.`
//! names the entity kind the template renders; files under `partials/` or
//! starting with `_` are helpers for `include`/`import` and are never bound.

use super::base::templates::{describe_tera_error, register_common_filters};
use crate::error::{Diagnostics, Error, GenerationError};
use crate::models::{EntityKind, MergedModel};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tera::Tera;
use walkdir::WalkDir;

/// Built-in set used when neither a directory nor a name is given
pub const DEFAULT_BUILTIN: &str = "rust";

const TEMPLATE_EXTENSION: &str = "tera";
const PARTIALS_DIR: &str = "partials";

macro_rules! embedded {
    ($set:literal: $($file:literal),+ $(,)?) => {
        &[$(($file, include_str!(concat!("templates/", $set, "/", $file)))),+]
    };
}

const RUST_TEMPLATES: &[(&str, &str)] = embedded!("rust":
    "module.tera",
    "remoteClass.tera",
    "complexType.tera",
    "enumType.tera",
    "alias.tera",
    "event.tera",
    "partials/header.tera",
    "partials/fields.tera",
);

const TYPESCRIPT_TEMPLATES: &[(&str, &str)] = embedded!("typescript":
    "module_index.tera",
    "remoteClass.tera",
    "remoteClass_factory.tera",
    "complexType.tera",
    "enumType.tera",
    "alias.tera",
    "event.tera",
    "partials/header.tera",
);

/// Names accepted by `--internal-templates`
pub const BUILTIN_SETS: [&str; 2] = ["rust", "typescript"];

/// Where the active template set comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// User-supplied directory; takes precedence over any built-in
    Directory(PathBuf),
    BuiltIn(String),
}

impl TemplateSource {
    pub fn from_options(directory: Option<&Path>, builtin: &str) -> Self {
        match directory {
            Some(dir) => TemplateSource::Directory(dir.to_path_buf()),
            None => TemplateSource::BuiltIn(builtin.to_string()),
        }
    }
}

impl Default for TemplateSource {
    fn default() -> Self {
        TemplateSource::BuiltIn(DEFAULT_BUILTIN.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    /// Path relative to the set root, `/`-separated
    pub name: String,
    pub content: String,
}

impl TemplateFile {
    fn file_name(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Helpers are included by other templates, never rendered on their own
    pub fn is_partial(&self) -> bool {
        self.file_name().starts_with('_') || self.name.split('/').any(|part| part == PARTIALS_DIR)
    }

    /// The entity-kind prefix: everything before the first `_` or `.`
    pub fn kind_prefix(&self) -> &str {
        let file_name = self.file_name();
        file_name
            .split(['_', '.'])
            .next()
            .unwrap_or(file_name)
    }
}

/// The loaded template sources of one set, sorted by name
#[derive(Debug, Clone)]
pub struct TemplateSet {
    description: String,
    files: Vec<TemplateFile>,
}

impl TemplateSet {
    pub fn load(source: &TemplateSource) -> crate::Result<Self> {
        match source {
            TemplateSource::Directory(dir) => Self::from_directory(dir),
            TemplateSource::BuiltIn(name) => Self::builtin(name),
        }
    }

    pub fn builtin(name: &str) -> crate::Result<Self> {
        let sources = match name {
            "rust" => RUST_TEMPLATES,
            "typescript" | "ts" => TYPESCRIPT_TEMPLATES,
            other => {
                return Err(Error::TemplateSet(format!(
                    "unknown built-in template set '{}' (available: {})",
                    other,
                    BUILTIN_SETS.join(", ")
                )))
            }
        };
        let files = sources
            .iter()
            .map(|(name, content)| TemplateFile {
                name: name.to_string(),
                content: content.to_string(),
            })
            .collect();
        Ok(Self::from_files(format!("built-in '{}'", name), files))
    }

    pub fn from_directory(dir: &Path) -> crate::Result<Self> {
        if !dir.is_dir() {
            return Err(Error::TemplateSet(format!(
                "template directory '{}' does not exist",
                dir.display()
            )));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = entry.map_err(|e| Error::TemplateSet(e.to_string()))?;
            let path = entry.path();
            let is_template = entry.file_type().is_file()
                && path.extension().and_then(|ext| ext.to_str()) == Some(TEMPLATE_EXTENSION);
            if !is_template {
                continue;
            }

            let relative = path.strip_prefix(dir).unwrap_or(path);
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let content = fs::read_to_string(path).map_err(|e| {
                Error::TemplateSet(format!("cannot read '{}': {}", path.display(), e))
            })?;
            files.push(TemplateFile { name, content });
        }

        Ok(Self::from_files(dir.display().to_string(), files))
    }

    pub fn from_files(description: impl Into<String>, mut files: Vec<TemplateFile>) -> Self {
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Self {
            description: description.into(),
            files,
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn files(&self) -> &[TemplateFile] {
        &self.files
    }

    /// Bind every non-partial template to its entity kind.
    ///
    /// Fails with every unknown prefix, plus a `MissingTemplate` for each kind
    /// that has local entities but no template. Kinds with nothing to render
    /// may stay unbound.
    pub fn bind(&self, model: &MergedModel) -> Result<TemplateBinding, Diagnostics> {
        let mut diagnostics = Diagnostics::new();
        let mut templates: BTreeMap<EntityKind, Vec<String>> = BTreeMap::new();

        for file in self.files.iter().filter(|f| !f.is_partial()) {
            match EntityKind::from_prefix(file.kind_prefix()) {
                Some(kind) => templates.entry(kind).or_default().push(file.name.clone()),
                None => diagnostics.push(GenerationError::UnknownTemplateKind {
                    template: file.name.clone(),
                }),
            }
        }

        for kind in EntityKind::ALL {
            if !templates.contains_key(&kind) && model.local_count(kind) > 0 {
                diagnostics.push(GenerationError::MissingTemplate { kind });
            }
        }

        diagnostics.into_result(TemplateBinding { templates })
    }

    /// A tera engine holding every template of the set with the common filters registered.
    ///
    /// A syntax error in any template makes the whole set unusable.
    pub fn build_engine(&self) -> crate::Result<Tera> {
        let mut tera = Tera::default();
        tera.add_raw_templates(
            self.files
                .iter()
                .map(|file| (file.name.as_str(), file.content.as_str())),
        )
        .map_err(|e| {
            Error::TemplateSet(format!("{}: {}", self.description, describe_tera_error(&e)))
        })?;
        register_common_filters(&mut tera);
        Ok(tera)
    }
}

/// Templates bound to each entity kind, in name order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateBinding {
    templates: BTreeMap<EntityKind, Vec<String>>,
}

impl TemplateBinding {
    pub fn templates_for(&self, kind: EntityKind) -> &[String] {
        self.templates.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ModuleDef, Origin, TypeDef, TypeDefKind};
    use serde_json::json;
    use tempfile::TempDir;

    fn file(name: &str) -> TemplateFile {
        TemplateFile {
            name: name.to_string(),
            content: String::new(),
        }
    }

    fn model_with_enum() -> MergedModel {
        let def = TypeDef {
            name: "Color".to_string(),
            module: "core".to_string(),
            origin: Origin::Local,
            doc: None,
            kind: TypeDefKind::Enum {
                values: vec!["RED".to_string()],
            },
        };
        let module = ModuleDef {
            name: "core".to_string(),
            version: "1.0.0".to_string(),
            doc: None,
            origin: Origin::Local,
            imports: vec![],
            code: json!({}),
            types: BTreeMap::from([("Color".to_string(), def)]),
            documents: vec![],
        };
        MergedModel::new(
            BTreeMap::from([("core".to_string(), module)]),
            vec!["core".to_string()],
        )
    }

    mod naming {
        use super::*;

        #[test]
        fn test_kind_prefix() {
            assert_eq!(file("module.tera").kind_prefix(), "module");
            assert_eq!(file("remoteClass_factory.ts.tera").kind_prefix(), "remoteClass");
            assert_eq!(file("nested/enumType.rs.tera").kind_prefix(), "enumType");
        }

        #[test]
        fn test_partials() {
            assert!(file("partials/header.tera").is_partial());
            assert!(file("_macros.tera").is_partial());
            assert!(file("nested/_macros.tera").is_partial());
            assert!(!file("module_index.tera").is_partial());
        }
    }

    mod builtin {
        use super::*;

        #[test]
        fn test_builtin_sets_compile() {
            for name in BUILTIN_SETS {
                let set = TemplateSet::builtin(name).unwrap();
                assert!(set.build_engine().is_ok(), "{} failed to compile", name);
            }
        }

        #[test]
        fn test_unknown_builtin_is_fatal() {
            let result = TemplateSet::builtin("cobol");
            assert!(matches!(result, Err(Error::TemplateSet(message)) if message.contains("cobol")));
        }

        #[test]
        fn test_directory_takes_precedence() {
            let source = TemplateSource::from_options(Some(Path::new("tpl")), "typescript");
            assert_eq!(source, TemplateSource::Directory(PathBuf::from("tpl")));
            assert_eq!(
                TemplateSource::from_options(None, "typescript"),
                TemplateSource::BuiltIn("typescript".to_string())
            );
        }
    }

    mod directory {
        use super::*;

        #[test]
        fn test_loads_tera_files_recursively() {
            let temp = TempDir::new().unwrap();
            fs::create_dir_all(temp.path().join("partials")).unwrap();
            fs::write(temp.path().join("module.tera"), "{{ module.name }}.txt\n").unwrap();
            fs::write(temp.path().join("partials/head.tera"), "head").unwrap();
            fs::write(temp.path().join("README.md"), "not a template").unwrap();

            let set = TemplateSet::from_directory(temp.path()).unwrap();
            let names: Vec<&str> = set.files().iter().map(|f| f.name.as_str()).collect();
            assert_eq!(names, vec!["module.tera", "partials/head.tera"]);
        }

        #[test]
        fn test_missing_directory_is_fatal() {
            let temp = TempDir::new().unwrap();
            let result = TemplateSet::from_directory(&temp.path().join("nope"));
            assert!(matches!(result, Err(Error::TemplateSet(_))));
        }

        #[test]
        fn test_syntax_error_is_fatal() {
            let set = TemplateSet::from_files("test", vec![TemplateFile {
                name: "module.tera".to_string(),
                content: "{% if %}".to_string(),
            }]);
            assert!(matches!(set.build_engine(), Err(Error::TemplateSet(_))));
        }
    }

    mod binding {
        use super::*;

        #[test]
        fn test_binds_by_prefix() {
            let set = TemplateSet::from_files(
                "test",
                vec![
                    file("enumType.tera"),
                    file("enumType_docs.tera"),
                    file("module.tera"),
                    file("partials/x.tera"),
                ],
            );
            let binding = set.bind(&model_with_enum()).unwrap();
            assert_eq!(
                binding.templates_for(EntityKind::EnumType),
                ["enumType.tera", "enumType_docs.tera"]
            );
            assert!(binding.templates_for(EntityKind::RemoteClass).is_empty());
        }

        #[test]
        fn test_missing_template_for_used_kind() {
            let set = TemplateSet::from_files("test", vec![file("module.tera")]);
            let errors = set.bind(&model_with_enum()).unwrap_err();
            assert_eq!(errors.len(), 1);
            assert_eq!(
                errors.iter().next(),
                Some(&GenerationError::MissingTemplate {
                    kind: EntityKind::EnumType
                })
            );
        }

        #[test]
        fn test_unused_kind_needs_no_template() {
            let set = TemplateSet::from_files("test", vec![file("module.tera"), file("enumType.tera")]);
            assert!(set.bind(&model_with_enum()).is_ok());
        }

        #[test]
        fn test_unknown_prefix() {
            let set = TemplateSet::from_files(
                "test",
                vec![file("module.tera"), file("enumType.tera"), file("widget.tera")],
            );
            let errors = set.bind(&model_with_enum()).unwrap_err();
            assert_eq!(
                errors.iter().next(),
                Some(&GenerationError::UnknownTemplateKind {
                    template: "widget.tera".to_string()
                })
            );
        }
    }
}
