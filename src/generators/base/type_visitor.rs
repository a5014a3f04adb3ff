use crate::models::{Primitive, TypeKey, TypeStructure};
use heck::ToUpperCamelCase;
use std::collections::BTreeMap;

/// Visitor pattern for converting resolved types to target-language spellings
pub trait TypeVisitor {
    /// Convert a TypeStructure to the target language's type string
    fn visit_type(&self, structure: &TypeStructure) -> String {
        match structure {
            TypeStructure::Primitive { name } => self.visit_primitive(*name),
            TypeStructure::Reference(key) => self.visit_reference(key),
            TypeStructure::Sequence { of } => self.visit_sequence(of),
            TypeStructure::Set { of } => self.visit_set(of),
            TypeStructure::Map { of } => self.visit_map(of),
        }
    }

    /// Spelling of "returns nothing"
    fn visit_void(&self) -> String {
        self.visit_primitive(Primitive::Void)
    }

    fn visit_primitive(&self, primitive: Primitive) -> String;

    fn visit_reference(&self, key: &TypeKey) -> String {
        key.name.to_upper_camel_case()
    }

    fn visit_sequence(&self, inner: &TypeStructure) -> String;

    fn visit_set(&self, inner: &TypeStructure) -> String;

    /// String-keyed map
    fn visit_map(&self, inner: &TypeStructure) -> String;
}

/// Rust spellings: `Vec`, `BTreeSet` and `BTreeMap<String, _>` containers
#[derive(Debug, Clone, Default)]
pub struct RustVisitor {
    mappings: BTreeMap<String, String>,
}

impl RustVisitor {
    pub fn new(mappings: BTreeMap<String, String>) -> Self {
        Self { mappings }
    }
}

impl TypeVisitor for RustVisitor {
    fn visit_primitive(&self, primitive: Primitive) -> String {
        if let Some(mapped) = self.mappings.get(primitive.as_str()) {
            return mapped.clone();
        }
        match primitive {
            Primitive::Boolean => "bool",
            Primitive::Int => "i32",
            Primitive::Int64 => "i64",
            Primitive::Float => "f32",
            Primitive::Double => "f64",
            Primitive::String => "String",
            Primitive::Void => "()",
        }
        .to_string()
    }

    fn visit_sequence(&self, inner: &TypeStructure) -> String {
        format!("Vec<{}>", self.visit_type(inner))
    }

    fn visit_set(&self, inner: &TypeStructure) -> String {
        format!("BTreeSet<{}>", self.visit_type(inner))
    }

    fn visit_map(&self, inner: &TypeStructure) -> String {
        format!("BTreeMap<String, {}>", self.visit_type(inner))
    }
}

/// TypeScript type visitor
#[derive(Debug, Clone, Default)]
pub struct TypeScriptVisitor {
    mappings: BTreeMap<String, String>,
}

impl TypeScriptVisitor {
    pub fn new(mappings: BTreeMap<String, String>) -> Self {
        Self { mappings }
    }
}

impl TypeVisitor for TypeScriptVisitor {
    fn visit_primitive(&self, primitive: Primitive) -> String {
        if let Some(mapped) = self.mappings.get(primitive.as_str()) {
            return mapped.clone();
        }
        match primitive {
            Primitive::Boolean => "boolean",
            Primitive::Int | Primitive::Int64 | Primitive::Float | Primitive::Double => "number",
            Primitive::String => "string",
            Primitive::Void => "void",
        }
        .to_string()
    }

    fn visit_sequence(&self, inner: &TypeStructure) -> String {
        format!("{}[]", self.visit_type(inner))
    }

    fn visit_set(&self, inner: &TypeStructure) -> String {
        format!("Set<{}>", self.visit_type(inner))
    }

    fn visit_map(&self, inner: &TypeStructure) -> String {
        format!("Record<string, {}>", self.visit_type(inner))
    }
}

/// Languages the `type_name` template filter can spell
pub const LANGUAGES: [&str; 2] = ["rust", "typescript"];

/// Visitor for a language name, with primitive overrides applied.
pub fn visitor_for(
    language: &str,
    mappings: BTreeMap<String, String>,
) -> Option<Box<dyn TypeVisitor + Send + Sync>> {
    match language {
        "rust" => Some(Box::new(RustVisitor::new(mappings))),
        "typescript" | "ts" => Some(Box::new(TypeScriptVisitor::new(mappings))),
        _ => None,
    }
}
