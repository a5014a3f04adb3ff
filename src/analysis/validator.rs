//! Structural checks on a single document, run before anything is merged.
//!
//! These need no knowledge of other modules: identifier syntax, duplicate
//! members within one owner, non-empty enums and alias targets.

use super::document::{FieldDecl, InterfaceDocument, TypeDecl, TypeFormat};
use super::type_resolver::{is_identifier, is_module_name};
use crate::error::GenerationError;
use crate::models::Primitive;
use std::collections::BTreeSet;

/// Module-level checks: name, version, imports and the `code` section.
pub fn validate_header(document: &InterfaceDocument) -> Vec<GenerationError> {
    let module = document.name.as_str();
    let mut problems = Vec::new();

    if !is_module_name(module) {
        problems.push(format!("'{}' is not a valid module name", module));
    }
    if document.version.trim().is_empty() {
        problems.push("module version is empty".to_string());
    }
    for import in &document.imports {
        if !is_module_name(&import.name) {
            problems.push(format!("import '{}' is not a valid module name", import.name));
        }
        if import.name == document.name {
            problems.push("module imports itself".to_string());
        }
    }
    if !document.code.is_null() && !document.code.is_object() {
        problems.push("'code' must be an object".to_string());
    }

    problems
        .into_iter()
        .map(|message| GenerationError::InvalidDefinition {
            module: module.to_string(),
            message,
        })
        .collect()
}

/// Problems with one declaration, as messages; empty when it is well formed.
pub fn check_declaration(decl: &TypeDecl) -> Vec<String> {
    let mut problems = Vec::new();
    let owner = decl.name();
    if !is_identifier(owner) {
        problems.push(format!("'{}' is not a valid type name", owner));
    }

    match decl {
        TypeDecl::Alias(alias) => match Primitive::from_name(alias.ty.trim()) {
            Some(Primitive::Void) | None => problems.push(format!(
                "alias '{}' must name a primitive type other than void, found '{}'",
                owner, alias.ty
            )),
            Some(_) => {}
        },
        TypeDecl::Complex(complex) => match complex.type_format {
            TypeFormat::Enum => {
                if complex.values.is_empty() {
                    problems.push(format!("enum '{}' declares no values", owner));
                }
                if !complex.properties.is_empty() || complex.extends.is_some() {
                    problems.push(format!(
                        "enum '{}' cannot declare properties or a parent",
                        owner
                    ));
                }
                check_names(
                    complex.values.iter().map(String::as_str),
                    &format!("enum '{}' value", owner),
                    &mut problems,
                );
            }
            TypeFormat::Register => {
                if !complex.values.is_empty() {
                    problems.push(format!("structured type '{}' cannot declare values", owner));
                }
                check_fields(&complex.properties, &format!("'{}' property", owner), &mut problems);
            }
        },
        TypeDecl::Remote(remote) => {
            if let Some(constructor) = &remote.constructor {
                check_fields(
                    &constructor.params,
                    &format!("'{}' constructor parameter", owner),
                    &mut problems,
                );
            }
            check_names(
                remote.methods.iter().map(|m| m.name.as_str()),
                &format!("'{}' method", owner),
                &mut problems,
            );
            for method in &remote.methods {
                check_fields(
                    &method.params,
                    &format!("'{}.{}' parameter", owner, method.name),
                    &mut problems,
                );
            }
            check_names(
                remote.events.iter().map(|e| e.name.as_str()),
                &format!("'{}' event", owner),
                &mut problems,
            );
            for event in &remote.events {
                check_fields(
                    &event.properties,
                    &format!("'{}.{}' property", owner, event.name),
                    &mut problems,
                );
            }
        }
    }

    problems
}

fn check_fields(fields: &[FieldDecl], what: &str, problems: &mut Vec<String>) {
    check_names(fields.iter().map(|f| f.name.as_str()), what, problems);
}

fn check_names<'a>(names: impl Iterator<Item = &'a str>, what: &str, problems: &mut Vec<String>) {
    let mut seen = BTreeSet::new();
    for name in names {
        if !is_identifier(name) {
            problems.push(format!("{} '{}' is not a valid identifier", what, name));
        }
        if !seen.insert(name) {
            problems.push(format!("{} '{}' is declared more than once", what, name));
        }
    }
}
