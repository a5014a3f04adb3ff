//! Writes the merged model back out in document form.
//!
//! Every module, local or imported, becomes one `<module>.kmd.json` with its
//! references fully qualified and its `origin` recorded, so the export can be
//! loaded again as input to a later run.

use crate::analysis::document::{
    AliasDecl, ComplexTypeDecl, ConstructorDecl, EventDecl, FieldDecl, ImportDecl,
    InterfaceDocument, MethodDecl, RemoteClassDecl, ReturnDecl, TypeFormat,
};
use crate::error::{Diagnostics, GenerationError};
use crate::models::{Field, MergedModel, ModuleDef, Primitive, TypeDefKind, TypeStructure};
use std::fs;
use std::path::{Path, PathBuf};

pub const EXPORT_EXTENSION: &str = "kmd.json";

/// Export every module into `dir`, creating it if needed.
///
/// Returns the written paths; a failed module is recorded and the rest are still written.
pub fn export_model(model: &MergedModel, dir: &Path) -> Result<Vec<PathBuf>, Diagnostics> {
    fs::create_dir_all(dir).map_err(|e| GenerationError::Export {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut written = Vec::new();
    let mut diagnostics = Diagnostics::new();
    for module in model.modules() {
        let path = dir.join(format!("{}.{}", module.name, EXPORT_EXTENSION));
        let result = serde_json::to_string_pretty(&to_document(module))
            .map_err(|e| e.to_string())
            .and_then(|json| fs::write(&path, json + "\n").map_err(|e| e.to_string()));
        match result {
            Ok(()) => written.push(path),
            Err(message) => diagnostics.push(GenerationError::Export { path, message }),
        }
    }

    diagnostics.into_result(written)
}

/// Document form of a merged module
pub fn to_document(module: &ModuleDef) -> InterfaceDocument {
    let mut document = InterfaceDocument {
        name: module.name.clone(),
        version: module.version.clone(),
        doc: module.doc.clone(),
        imports: module
            .imports
            .iter()
            .map(|import| ImportDecl {
                name: import.name.clone(),
                version: import.version.clone(),
            })
            .collect(),
        code: module.code.clone(),
        origin: Some(module.origin),
        ..InterfaceDocument::default()
    };

    for def in module.types.values() {
        match &def.kind {
            TypeDefKind::Alias { target } => document.aliases.push(AliasDecl {
                name: def.name.clone(),
                doc: def.doc.clone(),
                ty: target.to_string(),
            }),
            TypeDefKind::Enum { values } => document.complex_types.push(ComplexTypeDecl {
                name: def.name.clone(),
                doc: def.doc.clone(),
                type_format: TypeFormat::Enum,
                extends: None,
                properties: vec![],
                values: values.clone(),
            }),
            TypeDefKind::Complex {
                extends,
                properties,
            } => document.complex_types.push(ComplexTypeDecl {
                name: def.name.clone(),
                doc: def.doc.clone(),
                type_format: TypeFormat::Register,
                extends: extends.as_ref().map(ToString::to_string),
                properties: to_fields(properties),
                values: vec![],
            }),
            TypeDefKind::Remote {
                extends,
                is_abstract,
                constructor,
                methods,
                events,
            } => document.remote_classes.push(RemoteClassDecl {
                name: def.name.clone(),
                doc: def.doc.clone(),
                extends: extends.as_ref().map(ToString::to_string),
                is_abstract: *is_abstract,
                constructor: constructor.as_ref().map(|c| ConstructorDecl {
                    doc: c.doc.clone(),
                    params: to_fields(&c.params),
                }),
                methods: methods
                    .iter()
                    .map(|method| MethodDecl {
                        name: method.name.clone(),
                        doc: method.doc.clone(),
                        params: to_fields(&method.params),
                        returns: to_return(method.return_type.as_ref(), &method.return_doc),
                    })
                    .collect(),
                events: events
                    .iter()
                    .map(|event| EventDecl {
                        name: event.name.clone(),
                        doc: event.doc.clone(),
                        properties: to_fields(&event.properties),
                    })
                    .collect(),
            }),
        }
    }

    document
}

fn to_fields(fields: &[Field]) -> Vec<FieldDecl> {
    fields
        .iter()
        .map(|field| FieldDecl {
            name: field.name.clone(),
            doc: field.doc.clone(),
            ty: field.data_type.spelling(),
            optional: field.optional,
            default_value: field.default_value.clone(),
        })
        .collect()
}

/// A documented void return keeps its `return` entry so the doc survives.
fn to_return(ty: Option<&TypeStructure>, doc: &Option<String>) -> Option<ReturnDecl> {
    match (ty, doc) {
        (Some(ty), _) => Some(ReturnDecl {
            ty: ty.spelling(),
            doc: doc.clone(),
        }),
        (None, Some(_)) => Some(ReturnDecl {
            ty: Primitive::Void.to_string(),
            doc: doc.clone(),
        }),
        (None, None) => None,
    }
}
