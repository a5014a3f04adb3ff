use crate::error::GenerationError;
use crate::models::{Primitive, TypeExpr, TypeKey, TypeStructure};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

/// Variant of a declared type, as far as reference checking cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Alias,
    Enum,
    Register,
    Remote,
}

impl DeclKind {
    pub fn describe(&self) -> &'static str {
        match self {
            DeclKind::Alias => "primitive alias",
            DeclKind::Enum => "enum type",
            DeclKind::Register => "structured type",
            DeclKind::Remote => "remote class",
        }
    }
}

fn identifier_regex() -> &'static Regex {
    static IDENTIFIER: OnceLock<Regex> = OnceLock::new();
    IDENTIFIER.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Failed to compile identifier regex")
    })
}

/// Type, member and constant names
pub fn is_identifier(name: &str) -> bool {
    identifier_regex().is_match(name)
}

/// Module names are dot-separated identifiers
pub fn is_module_name(name: &str) -> bool {
    !name.is_empty() && name.split('.').all(is_identifier)
}

/// Parse a type expression as written in a document.
///
/// Container suffixes apply innermost first, so `int[]<>` is a map of
/// integer sequences. `void` is only accepted on its own; a container of
/// `void` is rejected here and callers reject a bare `void` where a value
/// is required.
pub fn parse_type_expr(spelling: &str) -> Result<TypeExpr, String> {
    parse_inner(spelling.trim())
}

fn parse_inner(spelling: &str) -> Result<TypeExpr, String> {
    let containers: [(&str, fn(Box<TypeExpr>) -> TypeExpr); 3] = [
        ("[]", TypeExpr::Sequence),
        ("{}", TypeExpr::Set),
        ("<>", TypeExpr::Map),
    ];
    for (suffix, wrap) in containers {
        if let Some(inner) = spelling.strip_suffix(suffix) {
            let element = parse_inner(inner.trim_end())?;
            if element == TypeExpr::Primitive(Primitive::Void) {
                return Err("containers of 'void' are not allowed".to_string());
            }
            return Ok(wrap(Box::new(element)));
        }
    }

    if spelling.is_empty() {
        return Err("empty type expression".to_string());
    }
    if let Some(primitive) = Primitive::from_name(spelling) {
        return Ok(TypeExpr::Primitive(primitive));
    }

    match spelling.rsplit_once('.') {
        Some((module, name)) => {
            if !is_module_name(module) || !is_identifier(name) {
                return Err(format!("'{}' is not a valid type name", spelling));
            }
            Ok(TypeExpr::Named {
                module: Some(module.to_string()),
                name: name.to_string(),
            })
        }
        None => {
            if !is_identifier(spelling) {
                return Err(format!("'{}' is not a valid type name", spelling));
            }
            Ok(TypeExpr::Named {
                module: None,
                name: spelling.to_string(),
            })
        }
    }
}

/// Binds references to TypeDefs across the merged namespace.
#[derive(Debug, Default)]
pub struct TypeResolver {
    /// Declared types per module
    namespace: BTreeMap<String, BTreeMap<String, DeclKind>>,
    /// Transitive import closure per module
    closures: BTreeMap<String, BTreeSet<String>>,
}

impl TypeResolver {
    pub fn new(
        namespace: BTreeMap<String, BTreeMap<String, DeclKind>>,
        closures: BTreeMap<String, BTreeSet<String>>,
    ) -> Self {
        Self {
            namespace,
            closures,
        }
    }

    pub fn kind_of(&self, key: &TypeKey) -> Option<DeclKind> {
        self.namespace.get(&key.module)?.get(&key.name).copied()
    }

    fn visible(&self, module: &str, target: &str) -> bool {
        module == target
            || self
                .closures
                .get(module)
                .is_some_and(|closure| closure.contains(target))
    }

    /// Parse and resolve `spelling` as seen from `module`.
    pub fn resolve_spelling(
        &self,
        module: &str,
        spelling: &str,
        location: &str,
    ) -> Result<TypeStructure, GenerationError> {
        let expr = parse_type_expr(spelling).map_err(|message| {
            GenerationError::InvalidDefinition {
                module: module.to_string(),
                message: format!("{}: {}", location, message),
            }
        })?;
        self.resolve(module, &expr, spelling, location)
    }

    pub fn resolve(
        &self,
        module: &str,
        expr: &TypeExpr,
        spelling: &str,
        location: &str,
    ) -> Result<TypeStructure, GenerationError> {
        match expr {
            TypeExpr::Primitive(primitive) => Ok(TypeStructure::Primitive { name: *primitive }),
            TypeExpr::Named {
                module: qualifier,
                name,
            } => self
                .resolve_named(module, qualifier.as_deref(), name, spelling, location)
                .map(TypeStructure::Reference),
            TypeExpr::Sequence(inner) => Ok(TypeStructure::Sequence {
                of: Box::new(self.resolve(module, inner, spelling, location)?),
            }),
            TypeExpr::Set(inner) => Ok(TypeStructure::Set {
                of: Box::new(self.resolve(module, inner, spelling, location)?),
            }),
            TypeExpr::Map(inner) => Ok(TypeStructure::Map {
                of: Box::new(self.resolve(module, inner, spelling, location)?),
            }),
        }
    }

    /// Resolve an `extends` reference, which must name a type of `expected` kind.
    pub fn resolve_parent(
        &self,
        module: &str,
        reference: &str,
        location: &str,
        expected: DeclKind,
    ) -> Result<TypeKey, GenerationError> {
        let key = match self.resolve_spelling(module, reference, location)? {
            TypeStructure::Reference(key) => key,
            _ => {
                return Err(GenerationError::KindMismatch {
                    location: location.to_string(),
                    reference: reference.to_string(),
                    expected: expected.describe().to_string(),
                })
            }
        };

        if self.kind_of(&key) != Some(expected) {
            return Err(GenerationError::KindMismatch {
                location: location.to_string(),
                reference: reference.to_string(),
                expected: expected.describe().to_string(),
            });
        }
        Ok(key)
    }

    fn resolve_named(
        &self,
        module: &str,
        qualifier: Option<&str>,
        name: &str,
        reference: &str,
        location: &str,
    ) -> Result<TypeKey, GenerationError> {
        let unresolved = || GenerationError::UnresolvedReference {
            location: location.to_string(),
            reference: reference.to_string(),
        };

        if let Some(target) = qualifier {
            if !self.visible(module, target) {
                return Err(if self.namespace.contains_key(target) {
                    GenerationError::UnimportedModule {
                        module: module.to_string(),
                        location: location.to_string(),
                        reference: reference.to_string(),
                        target: target.to_string(),
                    }
                } else {
                    unresolved()
                });
            }
            let key = TypeKey::new(target, name);
            return match self.kind_of(&key) {
                Some(_) => Ok(key),
                None => Err(unresolved()),
            };
        }

        let own = TypeKey::new(module, name);
        if self.kind_of(&own).is_some() {
            return Ok(own);
        }

        let mut candidates: Vec<TypeKey> = self
            .closures
            .get(module)
            .into_iter()
            .flatten()
            .filter(|target| target.as_str() != module)
            .map(|target| TypeKey::new(target.as_str(), name))
            .filter(|key| self.kind_of(key).is_some())
            .collect();

        if candidates.len() > 1 {
            return Err(GenerationError::AmbiguousReference {
                location: location.to_string(),
                reference: reference.to_string(),
                candidates: candidates.iter().map(TypeKey::to_string).collect(),
            });
        }
        candidates.pop().ok_or_else(unresolved)
    }
}
