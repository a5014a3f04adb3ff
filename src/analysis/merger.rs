use super::conflict::{definitions_conflict, versions_conflict};
use super::dependency_graph::DependencyGraph;
use super::document::{FieldDecl, TypeDecl, TypeFormat};
use super::loader::LoadedDocument;
use super::type_resolver::{DeclKind, TypeResolver};
use super::validator::{check_declaration, validate_header};
use crate::error::{Diagnostics, GenerationError};
use crate::models::{
    Constructor, Event, Field, Import, MergedModel, ModuleDef, Operation, Origin, Primitive,
    TypeDef, TypeDefKind, TypeKey,
};
use crate::overlay::ConfigOverlay;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One declaration as collected from the documents, before resolution
#[derive(Debug)]
struct DeclDraft {
    decl: TypeDecl,
    path: PathBuf,
    origin: Origin,
    /// Structurally broken declarations keep their name in the namespace
    /// but are not built
    well_formed: bool,
}

#[derive(Debug)]
struct ModuleDraft {
    version: String,
    doc: Option<String>,
    origin: Origin,
    imports: BTreeMap<String, Import>,
    code: Value,
    types: BTreeMap<String, DeclDraft>,
    documents: Vec<PathBuf>,
}

fn decl_kind(decl: &TypeDecl) -> DeclKind {
    match decl {
        TypeDecl::Alias(_) => DeclKind::Alias,
        TypeDecl::Complex(complex) if complex.type_format == TypeFormat::Enum => DeclKind::Enum,
        TypeDecl::Complex(_) => DeclKind::Register,
        TypeDecl::Remote(_) => DeclKind::Remote,
    }
}

/// Combines loaded documents into one validated [`MergedModel`].
///
/// Every problem found along the way is collected; the result is either the
/// model or the complete error list.
pub struct ModelMerger<'a> {
    overlay: &'a ConfigOverlay,
}

impl<'a> ModelMerger<'a> {
    pub fn new(overlay: &'a ConfigOverlay) -> Self {
        Self { overlay }
    }

    pub fn merge(&self, documents: &[LoadedDocument]) -> Result<MergedModel, Diagnostics> {
        let mut diagnostics = Diagnostics::new();

        let mut ordered: Vec<&LoadedDocument> = documents.iter().collect();
        ordered.sort_by(|a, b| a.path.cmp(&b.path).then(a.origin.cmp(&b.origin)));

        let mut drafts: BTreeMap<String, ModuleDraft> = BTreeMap::new();
        for loaded in ordered {
            self.absorb(&mut drafts, loaded, &mut diagnostics);
        }

        let mut graph = DependencyGraph::new();
        for (name, draft) in &drafts {
            graph.add_node(name);
            // Self-imports are already rejected by the header check.
            for import in draft.imports.keys().filter(|import| *import != name) {
                if drafts.contains_key(import) {
                    graph.add_dependency(name, import);
                } else {
                    diagnostics.push(GenerationError::UnknownImport {
                        module: name.clone(),
                        import: import.clone(),
                    });
                }
            }
        }
        for modules in graph.find_cycles() {
            diagnostics.push(GenerationError::ImportCycle { modules });
        }

        let resolver = TypeResolver::new(
            drafts
                .iter()
                .map(|(name, draft)| {
                    let kinds = draft
                        .types
                        .iter()
                        .map(|(type_name, d)| (type_name.clone(), decl_kind(&d.decl)))
                        .collect();
                    (name.clone(), kinds)
                })
                .collect(),
            drafts
                .keys()
                .map(|name| (name.clone(), graph.closure(name)))
                .collect(),
        );

        let mut inheritance = DependencyGraph::new();
        let mut modules = BTreeMap::new();
        for (name, draft) in drafts {
            let mut types = BTreeMap::new();
            for (type_name, decl) in draft.types.iter().filter(|(_, d)| d.well_formed) {
                match build_type(&resolver, &name, decl) {
                    Ok(def) => {
                        if let Some(parent) = def.extends() {
                            inheritance.add_dependency(&def.key().to_string(), &parent.to_string());
                        }
                        types.insert(type_name.clone(), def);
                    }
                    Err(errors) => diagnostics.extend(errors),
                }
            }

            let code = self.overlay.resolve(&name, &draft.code);
            modules.insert(
                name.clone(),
                ModuleDef {
                    name,
                    version: draft.version,
                    doc: draft.doc,
                    origin: draft.origin,
                    imports: draft.imports.into_values().collect(),
                    code,
                    types,
                    documents: draft.documents,
                },
            );
        }
        for types in inheritance.find_cycles() {
            diagnostics.push(GenerationError::InheritanceCycle { types });
        }

        let module_order = graph.topological_order();
        diagnostics
            .into_result(())
            .map(|()| MergedModel::new(modules, module_order))
    }

    /// Fold one document into the per-module drafts.
    fn absorb(
        &self,
        drafts: &mut BTreeMap<String, ModuleDraft>,
        loaded: &LoadedDocument,
        diagnostics: &mut Diagnostics,
    ) {
        let document = &loaded.document;
        diagnostics.extend(validate_header(document).into());

        let draft = drafts
            .entry(document.name.clone())
            .or_insert_with(|| ModuleDraft {
                version: document.version.clone(),
                doc: None,
                origin: loaded.origin,
                imports: BTreeMap::new(),
                code: Value::Object(Default::default()),
                types: BTreeMap::new(),
                documents: Vec::new(),
            });

        if versions_conflict(&draft.version, &document.version) {
            diagnostics.push(GenerationError::VersionConflict {
                module: document.name.clone(),
                first: draft.version.clone(),
                second: document.version.clone(),
            });
        }
        if draft.doc.is_none() {
            draft.doc = document.doc.clone();
        }
        draft.origin = draft.origin.combine(loaded.origin);
        for import in &document.imports {
            draft
                .imports
                .entry(import.name.clone())
                .or_insert_with(|| Import {
                    name: import.name.clone(),
                    version: import.version.clone(),
                });
        }
        if document.code.is_object() {
            crate::overlay::deep_merge(&mut draft.code, &document.code);
        }
        draft.documents.push(loaded.path.clone());

        for decl in document.type_decls() {
            let problems = check_declaration(&decl);
            for message in &problems {
                diagnostics.push(GenerationError::InvalidDefinition {
                    module: document.name.clone(),
                    message: message.clone(),
                });
            }

            match draft.types.get_mut(decl.name()) {
                Some(existing) => {
                    if definitions_conflict(&existing.decl, &decl) {
                        diagnostics.push(GenerationError::DuplicateDefinition {
                            module: document.name.clone(),
                            name: decl.name().to_string(),
                            first: existing.path.clone(),
                            second: loaded.path.clone(),
                        });
                    } else {
                        existing.origin = existing.origin.combine(loaded.origin);
                    }
                }
                None => {
                    draft.types.insert(
                        decl.name().to_string(),
                        DeclDraft {
                            decl,
                            path: loaded.path.clone(),
                            origin: loaded.origin,
                            well_formed: problems.is_empty(),
                        },
                    );
                }
            }
        }
    }
}

/// Resolve every reference of one declaration into a TypeDef.
fn build_type(
    resolver: &TypeResolver,
    module: &str,
    draft: &DeclDraft,
) -> Result<TypeDef, Diagnostics> {
    let mut errors = Diagnostics::new();
    let owner = format!("{}.{}", module, draft.decl.name());

    let (doc, kind) = match &draft.decl {
        TypeDecl::Alias(alias) => {
            let target = Primitive::from_name(alias.ty.trim()).unwrap_or(Primitive::String);
            (alias.doc.clone(), TypeDefKind::Alias { target })
        }
        TypeDecl::Complex(complex) if complex.type_format == TypeFormat::Enum => (
            complex.doc.clone(),
            TypeDefKind::Enum {
                values: complex.values.clone(),
            },
        ),
        TypeDecl::Complex(complex) => {
            let extends = complex.extends.as_deref().and_then(|parent| {
                resolver
                    .resolve_parent(module, parent, &owner, DeclKind::Register)
                    .map_err(|e| errors.push(e))
                    .ok()
            });
            let properties = resolve_fields(resolver, module, &owner, &complex.properties, &mut errors);
            (
                complex.doc.clone(),
                TypeDefKind::Complex {
                    extends,
                    properties,
                },
            )
        }
        TypeDecl::Remote(remote) => {
            let extends = remote.extends.as_deref().and_then(|parent| {
                resolver
                    .resolve_parent(module, parent, &owner, DeclKind::Remote)
                    .map_err(|e| errors.push(e))
                    .ok()
            });
            let constructor = remote.constructor.as_ref().map(|ctor| Constructor {
                doc: ctor.doc.clone(),
                params: resolve_fields(
                    resolver,
                    module,
                    &format!("{} constructor", owner),
                    &ctor.params,
                    &mut errors,
                ),
            });

            let mut methods = Vec::with_capacity(remote.methods.len());
            for method in &remote.methods {
                let location = format!("{}.{}", owner, method.name);
                let params = resolve_fields(resolver, module, &location, &method.params, &mut errors);
                let return_type = match &method.returns {
                    Some(ret) => match resolver.resolve_spelling(
                        module,
                        &ret.ty,
                        &format!("{} return", location),
                    ) {
                        Ok(ty) if ty.is_void() => None,
                        Ok(ty) => Some(ty),
                        Err(e) => {
                            errors.push(e);
                            None
                        }
                    },
                    None => None,
                };
                methods.push(Operation {
                    name: method.name.clone(),
                    doc: method.doc.clone(),
                    params,
                    return_type,
                    return_doc: method.returns.as_ref().and_then(|ret| ret.doc.clone()),
                });
            }

            let key = TypeKey::new(module, remote.name.clone());
            let events = remote
                .events
                .iter()
                .map(|event| Event {
                    name: event.name.clone(),
                    doc: event.doc.clone(),
                    owner: key.clone(),
                    origin: draft.origin,
                    properties: resolve_fields(
                        resolver,
                        module,
                        &format!("{}.{}", owner, event.name),
                        &event.properties,
                        &mut errors,
                    ),
                })
                .collect();

            (
                remote.doc.clone(),
                TypeDefKind::Remote {
                    extends,
                    is_abstract: remote.is_abstract,
                    constructor,
                    methods,
                    events,
                },
            )
        }
    };

    errors.into_result(TypeDef {
        name: draft.decl.name().to_string(),
        module: module.to_string(),
        origin: draft.origin,
        doc,
        kind,
    })
}

fn resolve_fields(
    resolver: &TypeResolver,
    module: &str,
    owner: &str,
    fields: &[FieldDecl],
    errors: &mut Diagnostics,
) -> Vec<Field> {
    let mut resolved = Vec::with_capacity(fields.len());
    for field in fields {
        let location = format!("{}.{}", owner, field.name);
        match resolver.resolve_spelling(module, &field.ty, &location) {
            Ok(ty) if ty.is_void() => errors.push(GenerationError::InvalidDefinition {
                module: module.to_string(),
                message: format!("{} cannot be void", location),
            }),
            Ok(data_type) => resolved.push(Field {
                name: field.name.clone(),
                doc: field.doc.clone(),
                data_type,
                optional: field.optional,
                default_value: field.default_value.clone(),
            }),
            Err(e) => errors.push(e),
        }
    }
    resolved
}
