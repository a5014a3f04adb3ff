use heck::ToUpperCamelCase;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Whether a definition is generated (`local`) or only referenced (`imported`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Local,
    Imported,
}

impl Origin {
    pub fn is_local(self) -> bool {
        self == Origin::Local
    }

    /// Local wins: a definition seen in any primary document is generated.
    pub fn combine(self, other: Origin) -> Origin {
        if self.is_local() || other.is_local() {
            Origin::Local
        } else {
            Origin::Imported
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Primitive {
    #[serde(rename = "boolean")]
    Boolean,
    #[serde(rename = "int")]
    Int,
    #[serde(rename = "int64")]
    Int64,
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "double")]
    Double,
    #[serde(rename = "String")]
    String,
    #[serde(rename = "void")]
    Void,
}

impl Primitive {
    pub const ALL: [Primitive; 7] = [
        Primitive::Boolean,
        Primitive::Int,
        Primitive::Int64,
        Primitive::Float,
        Primitive::Double,
        Primitive::String,
        Primitive::Void,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Int => "int",
            Primitive::Int64 => "int64",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::String => "String",
            Primitive::Void => "void",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a TypeDef inside the merged namespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TypeKey {
    pub module: String,
    pub name: String,
}

impl TypeKey {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
        }
    }

    /// Parse `module.Name`; the module part may itself contain dots.
    pub fn parse(qualified: &str) -> Option<Self> {
        let (module, name) = qualified.rsplit_once('.')?;
        if module.is_empty() || name.is_empty() {
            return None;
        }
        Some(Self::new(module, name))
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.name)
    }
}

/// A type expression as written in a document, before name resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Primitive(Primitive),
    Named {
        module: Option<String>,
        name: String,
    },
    Sequence(Box<TypeExpr>),
    Set(Box<TypeExpr>),
    Map(Box<TypeExpr>),
}

/// A fully resolved type: every named part is bound to exactly one TypeDef.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeStructure {
    Primitive { name: Primitive },
    Reference(TypeKey),
    Sequence { of: Box<TypeStructure> },
    Set { of: Box<TypeStructure> },
    /// String-keyed map
    Map { of: Box<TypeStructure> },
}

impl TypeStructure {
    /// Document spelling with every reference qualified, e.g. `core.Point[]`.
    pub fn spelling(&self) -> String {
        match self {
            TypeStructure::Primitive { name } => name.to_string(),
            TypeStructure::Reference(key) => key.to_string(),
            TypeStructure::Sequence { of } => format!("{}[]", of.spelling()),
            TypeStructure::Set { of } => format!("{}{{}}", of.spelling()),
            TypeStructure::Map { of } => format!("{}<>", of.spelling()),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(
            self,
            TypeStructure::Primitive {
                name: Primitive::Void
            }
        )
    }
}

/// The template-binding unit: every rendered entity has exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Module,
    RemoteClass,
    ComplexType,
    EnumType,
    Alias,
    Event,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Module,
        EntityKind::RemoteClass,
        EntityKind::ComplexType,
        EntityKind::EnumType,
        EntityKind::Alias,
        EntityKind::Event,
    ];

    /// File-name prefix that binds a template to this kind; also the context key.
    pub fn template_prefix(&self) -> &'static str {
        match self {
            EntityKind::Module => "module",
            EntityKind::RemoteClass => "remoteClass",
            EntityKind::ComplexType => "complexType",
            EntityKind::EnumType => "enumType",
            EntityKind::Alias => "alias",
            EntityKind::Event => "event",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.template_prefix() == prefix)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.template_prefix())
    }
}

/// Structured-type property, event payload field or operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    pub data_type: TypeStructure,
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    pub params: Vec<Field>,
    /// `None` for operations returning nothing
    pub return_type: Option<TypeStructure>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_doc: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Constructor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    pub params: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Remote type emitting this event
    pub owner: TypeKey,
    pub origin: Origin,
    pub properties: Vec<Field>,
}

impl Event {
    /// `{Owner}{Event}`, e.g. `PlayerEndOfStream`
    pub fn qualified_name(&self) -> String {
        format!(
            "{}{}",
            self.owner.name.to_upper_camel_case(),
            self.name.to_upper_camel_case()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TypeDefKind {
    #[serde(rename_all = "camelCase")]
    Alias { target: Primitive },
    #[serde(rename_all = "camelCase")]
    Enum { values: Vec<String> },
    #[serde(rename_all = "camelCase")]
    Complex {
        extends: Option<TypeKey>,
        properties: Vec<Field>,
    },
    #[serde(rename_all = "camelCase")]
    Remote {
        extends: Option<TypeKey>,
        is_abstract: bool,
        constructor: Option<Constructor>,
        methods: Vec<Operation>,
        events: Vec<Event>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDef {
    pub name: String,
    pub module: String,
    pub origin: Origin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    #[serde(flatten)]
    pub kind: TypeDefKind,
}

impl TypeDef {
    pub fn key(&self) -> TypeKey {
        TypeKey::new(&self.module, &self.name)
    }

    pub fn entity_kind(&self) -> EntityKind {
        match self.kind {
            TypeDefKind::Alias { .. } => EntityKind::Alias,
            TypeDefKind::Enum { .. } => EntityKind::EnumType,
            TypeDefKind::Complex { .. } => EntityKind::ComplexType,
            TypeDefKind::Remote { .. } => EntityKind::RemoteClass,
        }
    }

    pub fn extends(&self) -> Option<&TypeKey> {
        match &self.kind {
            TypeDefKind::Complex { extends, .. } | TypeDefKind::Remote { extends, .. } => {
                extends.as_ref()
            }
            _ => None,
        }
    }

    pub fn events(&self) -> &[Event] {
        match &self.kind {
            TypeDefKind::Remote { events, .. } => events,
            _ => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Import {
    pub name: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDef {
    pub name: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    pub origin: Origin,
    pub imports: Vec<Import>,
    /// Per-module generation parameters with the config overlay already applied
    pub code: Value,
    pub types: BTreeMap<String, TypeDef>,
    /// Source documents, sorted
    #[serde(skip)]
    pub documents: Vec<PathBuf>,
}

impl ModuleDef {
    pub fn types_of(&self, kind: EntityKind) -> impl Iterator<Item = &TypeDef> {
        self.types
            .values()
            .filter(move |def| def.entity_kind() == kind)
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.types.values().flat_map(|def| def.events().iter())
    }
}

/// The validated, immutable union of every loaded module.
///
/// Only the merger constructs it; everything downstream reads it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedModel {
    modules: BTreeMap<String, ModuleDef>,
    /// Dependencies before dependents
    module_order: Vec<String>,
}

impl MergedModel {
    pub(crate) fn new(modules: BTreeMap<String, ModuleDef>, module_order: Vec<String>) -> Self {
        Self {
            modules,
            module_order,
        }
    }

    pub fn modules(&self) -> impl Iterator<Item = &ModuleDef> {
        self.modules.values()
    }

    pub fn module(&self, name: &str) -> Option<&ModuleDef> {
        self.modules.get(name)
    }

    /// Module names in dependency order
    pub fn module_order(&self) -> &[String] {
        &self.module_order
    }

    pub fn local_modules(&self) -> impl Iterator<Item = &ModuleDef> {
        self.module_order
            .iter()
            .filter_map(|name| self.modules.get(name))
            .filter(|module| module.origin.is_local())
    }

    pub fn lookup(&self, key: &TypeKey) -> Option<&TypeDef> {
        self.modules.get(&key.module)?.types.get(&key.name)
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.modules.values().flat_map(|module| module.types.values())
    }

    pub fn local_types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types().filter(|def| def.origin.is_local())
    }

    /// Number of `local` entities of a kind; modules and events count too.
    pub fn local_count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Module => self.local_modules().count(),
            EntityKind::Event => self
                .local_types()
                .map(|def| def.events().len())
                .sum(),
            other => self
                .local_types()
                .filter(|def| def.entity_kind() == other)
                .count(),
        }
    }
}
