use super::type_visitor::{visitor_for, TypeVisitor, LANGUAGES};
use crate::models::{MergedModel, Primitive, TypeKey, TypeStructure};
use crate::overlay::ConfigOverlay;
use heck::{ToLowerCamelCase, ToShoutySnakeCase, ToSnakeCase, ToUpperCamelCase};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tera::{Tera, Value};

/// Language used by `type_name` when the template does not pass `lang`
pub const DEFAULT_LANGUAGE: &str = "rust";

/// Global context available to all templates as `generator`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalContext {
    pub name: String,
    pub version: String,
}

impl GlobalContext {
    pub fn new() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl Default for GlobalContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Register the case-conversion filters
pub fn register_common_filters(tera: &mut Tera) {
    tera.register_filter("camel_case", camel_case_filter);
    tera.register_filter("pascal_case", pascal_case_filter);
    tera.register_filter("snake_case", snake_case_filter);
    tera.register_filter("screaming_snake_case", screaming_snake_case_filter);
}

/// Register the helpers that need the model: `type_name` and `lookup_type`.
pub fn register_model_helpers(tera: &mut Tera, model: &MergedModel, overlay: &ConfigOverlay) {
    let visitors: BTreeMap<&'static str, Box<dyn TypeVisitor + Send + Sync>> = LANGUAGES
        .iter()
        .filter_map(|lang| visitor_for(lang, overlay.type_mappings(lang)).map(|v| (*lang, v)))
        .collect();

    tera.register_filter(
        "type_name",
        move |value: &Value, args: &HashMap<String, Value>| -> tera::Result<Value> {
            let lang = match args.get("lang") {
                Some(Value::String(lang)) => lang.as_str(),
                Some(_) => return Err("type_name: 'lang' must be a string".into()),
                None => DEFAULT_LANGUAGE,
            };
            let lang = if lang == "ts" { "typescript" } else { lang };
            let visitor = visitors
                .get(lang)
                .ok_or_else(|| tera::Error::msg(format!("type_name: unknown language '{}'", lang)))?;

            match value {
                Value::Null => return Ok(Value::String(visitor.visit_void())),
                // Alias targets are bare primitive names
                Value::String(name) => {
                    let primitive = Primitive::from_name(name).ok_or_else(|| {
                        tera::Error::msg(format!("type_name: '{}' is not a primitive", name))
                    })?;
                    return Ok(Value::String(visitor.visit_primitive(primitive)));
                }
                _ => {}
            }
            let structure: TypeStructure = serde_json::from_value(value.clone()).map_err(|e| {
                tera::Error::msg(format!("type_name expects a resolved type: {}", e))
            })?;
            Ok(Value::String(visitor.visit_type(&structure)))
        },
    );

    let types: BTreeMap<String, Value> = model
        .types()
        .filter_map(|def| {
            serde_json::to_value(def)
                .ok()
                .map(|value| (def.key().to_string(), value))
        })
        .collect();

    tera.register_function(
        "lookup_type",
        move |args: &HashMap<String, Value>| -> tera::Result<Value> {
            let key = match args.get("key") {
                Some(Value::String(qualified)) => TypeKey::parse(qualified),
                Some(value @ Value::Object(_)) => serde_json::from_value::<TypeKey>(value.clone()).ok(),
                _ => None,
            }
            .ok_or_else(|| {
                tera::Error::msg("lookup_type expects 'key' as \"module.Name\" or {module, name}")
            })?;

            types
                .get(&key.to_string())
                .cloned()
                .ok_or_else(|| tera::Error::msg(format!("lookup_type: no type '{}'", key)))
        },
    );
}

// === Common Filters ===

fn string_arg<'a>(value: &'a Value, filter: &str) -> tera::Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| tera::Error::msg(format!("{} filter expects a string", filter)))
}

fn camel_case_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(string_arg(value, "camel_case")?.to_lower_camel_case()))
}

fn pascal_case_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(string_arg(value, "pascal_case")?.to_upper_camel_case()))
}

fn snake_case_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    Ok(Value::String(string_arg(value, "snake_case")?.to_snake_case()))
}

fn screaming_snake_case_filter(
    value: &Value,
    _args: &HashMap<String, Value>,
) -> tera::Result<Value> {
    Ok(Value::String(
        string_arg(value, "screaming_snake_case")?.to_shouty_snake_case(),
    ))
}

/// Flatten a tera error and its sources into one line
pub fn describe_tera_error(error: &tera::Error) -> String {
    let mut message = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
