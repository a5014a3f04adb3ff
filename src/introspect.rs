//! Read-only evaluation of dotted keys against each local module.

use crate::models::MergedModel;
use crate::overlay::{module_value_space, ConfigOverlay};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Printed in place of a key no layer defines
pub const UNDEFINED: &str = "<undefined>";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntrospectionEntry {
    pub module: String,
    pub key: String,
    pub value: Option<Value>,
}

impl fmt::Display for IntrospectionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}: {} = {}", self.module, self.key, value),
            None => write!(f, "{}: {} = {}", self.module, self.key, UNDEFINED),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IntrospectionReport {
    pub entries: Vec<IntrospectionEntry>,
}

impl IntrospectionReport {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for IntrospectionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}

/// Evaluate every key for every local module, modules in dependency order.
///
/// Precedence per key: module-scoped overlay, global overlay, then the
/// module's own values (its `code` entries and serialized fields).
pub fn introspect(model: &MergedModel, overlay: &ConfigOverlay, keys: &[String]) -> IntrospectionReport {
    let mut entries = Vec::new();
    for module in model.local_modules() {
        let space = module_value_space(module);
        for key in keys {
            entries.push(IntrospectionEntry {
                module: module.name.clone(),
                key: key.clone(),
                value: overlay.lookup(&module.name, key, &space),
            });
        }
    }
    IntrospectionReport { entries }
}
