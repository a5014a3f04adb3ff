use crate::models::{EntityKind, Event, Import, ModuleDef, Origin, TypeDef};
use heck::ToUpperCamelCase;
use serde::Serialize;
use serde_json::Value;

/// Template context wrapper for TypeDef with computed naming fields
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeContext {
    #[serde(flatten)]
    pub def: TypeDef,
    pub qualified_name: String, // Computed field
    pub class_name: String,     // Computed field
}

impl TypeContext {
    pub fn from_type_def(def: &TypeDef) -> Self {
        Self {
            qualified_name: def.key().to_string(),
            class_name: def.name.to_upper_camel_case(),
            def: def.clone(),
        }
    }
}

/// Template context wrapper for Event; events are rendered on their own
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventContext {
    #[serde(flatten)]
    pub event: Event,
    pub qualified_name: String, // Computed field
    pub owner_name: String,     // Computed field
}

impl EventContext {
    pub fn from_event(event: &Event) -> Self {
        Self {
            qualified_name: event.qualified_name(),
            owner_name: event.owner.name.to_upper_camel_case(),
            event: event.clone(),
        }
    }
}

/// Template context for a module: its header plus its definitions grouped by kind.
///
/// Groups list only `local` definitions; imported ones remain reachable
/// through `model` and `lookup_type`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleContext {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    pub origin: Origin,
    pub imports: Vec<Import>,
    pub code: Value,
    pub remote_classes: Vec<TypeContext>,
    pub complex_types: Vec<TypeContext>,
    pub enum_types: Vec<TypeContext>,
    pub aliases: Vec<TypeContext>,
    pub events: Vec<EventContext>,
}

impl ModuleContext {
    pub fn from_module(module: &ModuleDef) -> Self {
        let local_of = |kind: EntityKind| -> Vec<TypeContext> {
            module
                .types_of(kind)
                .filter(|def| def.origin.is_local())
                .map(TypeContext::from_type_def)
                .collect()
        };

        Self {
            name: module.name.clone(),
            version: module.version.clone(),
            doc: module.doc.clone(),
            origin: module.origin,
            imports: module.imports.clone(),
            code: module.code.clone(),
            remote_classes: local_of(EntityKind::RemoteClass),
            complex_types: local_of(EntityKind::ComplexType),
            enum_types: local_of(EntityKind::EnumType),
            aliases: local_of(EntityKind::Alias),
            events: module
                .events()
                .filter(|event| event.origin.is_local())
                .map(EventContext::from_event)
                .collect(),
        }
    }
}
