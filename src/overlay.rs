//! Config overlay: values supplied at invocation time that take precedence
//! over what the documents declare.
//!
//! The overlay is a JSON object. Top-level keys form the global overlay;
//! `modules` holds module-scoped overlays keyed by module name and
//! `typeMappings` holds per-language primitive spellings. A lookup reads the
//! module's own value space deep-merged with the global overlay and then the
//! module-scoped overlay, so scalars follow that precedence and objects carry
//! keys from every layer.

use crate::interface::config::ConfigError;
use crate::models::ModuleDef;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const MODULES_KEY: &str = "modules";
const TYPE_MAPPINGS_KEY: &str = "typeMappings";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverlay {
    global: Map<String, Value>,
    modules: Map<String, Value>,
    type_mappings: Map<String, Value>,
}

impl ConfigOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// An absent path yields an empty overlay; a given path must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::MissingFile(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let Value::Object(mut global) = value else {
            return Err(ConfigError::InvalidConfig(
                "config overlay must be a JSON object".to_string(),
            ));
        };

        let modules = match global.remove(MODULES_KEY) {
            None => Map::new(),
            Some(Value::Object(modules)) => modules,
            Some(_) => {
                return Err(ConfigError::InvalidConfig(format!(
                    "'{}' must map module names to objects",
                    MODULES_KEY
                )))
            }
        };
        if let Some((name, _)) = modules.iter().find(|(_, scope)| !scope.is_object()) {
            return Err(ConfigError::InvalidConfig(format!(
                "overlay for module '{}' must be an object",
                name
            )));
        }

        let type_mappings = match global.remove(TYPE_MAPPINGS_KEY) {
            None => Map::new(),
            Some(Value::Object(mappings)) => mappings,
            Some(_) => {
                return Err(ConfigError::InvalidConfig(format!(
                    "'{}' must be an object",
                    TYPE_MAPPINGS_KEY
                )))
            }
        };

        Ok(Self {
            global,
            modules,
            type_mappings,
        })
    }

    fn module_scope(&self, module: &str) -> Option<&Value> {
        self.modules.get(module)
    }

    /// Value at a dotted `key` for `module`, or `None` when no layer defines it.
    ///
    /// Read from the [`resolve`](Self::resolve)d tree, so an object-valued key
    /// carries every layer's entries, the same as templates see under `config`.
    pub fn lookup(&self, module: &str, key: &str, defaults: &Value) -> Option<Value> {
        value_at_path(&self.resolve(module, defaults), key).cloned()
    }

    /// `defaults` with the global and then the module-scoped overlay merged over it.
    pub fn resolve(&self, module: &str, defaults: &Value) -> Value {
        let mut resolved = defaults.clone();
        deep_merge(&mut resolved, &Value::Object(self.global.clone()));
        if let Some(scope) = self.module_scope(module) {
            deep_merge(&mut resolved, scope);
        }
        resolved
    }

    /// Primitive spellings for `language`, e.g. `{"int64": "i64"}`.
    pub fn type_mappings(&self, language: &str) -> BTreeMap<String, String> {
        self.type_mappings
            .get(language)
            .and_then(Value::as_object)
            .map(|mappings| {
                mappings
                    .iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// The values a module exposes to lookups and templates.
///
/// Entries of the module's `code` object sit at the top level; the other
/// serialized module fields (`name`, `version`, `imports`, `types`, ...) fill
/// in whatever `code` does not define.
pub fn module_value_space(module: &ModuleDef) -> Value {
    let mut space = match &module.code {
        Value::Object(code) => code.clone(),
        _ => Map::new(),
    };
    if let Ok(Value::Object(fields)) = serde_json::to_value(module) {
        for (key, value) in fields {
            space.entry(key).or_insert(value);
        }
    }
    Value::Object(space)
}

/// Follow a dotted path through objects and arrays.
///
/// An array segment is either a numeric index or the `name` of one of the
/// elements, so `types.Player.doc` works on the serialized model.
pub fn value_at_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.trim();
    if path.is_empty() {
        return Some(value);
    }
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => match segment.parse::<usize>() {
            Ok(index) => items.get(index),
            Err(_) => items
                .iter()
                .find(|item| item.get("name").and_then(Value::as_str) == Some(segment)),
        },
        _ => None,
    })
}

/// Merge `overlay` into `base`: objects merge key by key, anything else replaces.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}
