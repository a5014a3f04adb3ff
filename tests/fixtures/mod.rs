#![allow(dead_code)]
//! Interface documents shared by the integration suites

pub const CORE: &str = r#"{
    "name": "core",
    "version": "1.0.0",
    "doc": "Basic media types",
    "code": { "api": { "lang": "document" } },
    "aliases": [{ "name": "Uri", "type": "String" }],
    "complexTypes": [
        { "name": "State", "typeFormat": "ENUM", "values": ["IDLE", "PLAYING"] },
        {
            "name": "Point",
            "doc": "A position",
            "properties": [
                { "name": "x", "type": "int" },
                { "name": "y", "type": "int", "optional": true }
            ]
        }
    ],
    "remoteClasses": [{
        "name": "MediaObject",
        "abstract": true,
        "methods": [{ "name": "release" }]
    }]
}"#;

pub const ELEMENTS: &str = r#"{
    "name": "elements",
    "version": "2.1.0",
    "imports": [{ "name": "core", "version": "1.0.0" }],
    "remoteClasses": [{
        "name": "Player",
        "extends": "MediaObject",
        "constructor": { "params": [{ "name": "uri", "type": "Uri" }] },
        "methods": [
            { "name": "play" },
            { "name": "position", "return": { "type": "Point" } },
            { "name": "states", "return": { "type": "State[]" } }
        ],
        "events": [{ "name": "EndOfStream", "properties": [{ "name": "at", "type": "int64" }] }]
    }]
}"#;

/// Document whose only type references `Missing`
pub const UNRESOLVED: &str = r#"{
    "name": "broken",
    "version": "1.0.0",
    "complexTypes": [{ "name": "Holder", "properties": [{ "name": "value", "type": "Missing" }] }]
}"#;

/// `name` importing `import`, with no types
pub fn importing(name: &str, import: &str) -> String {
    format!(
        r#"{{ "name": "{}", "version": "1.0.0", "imports": [{{ "name": "{}", "version": "1.0.0" }}] }}"#,
        name, import
    )
}

/// `name` with a single complex type `type_name` holding one `field_type` field
pub fn with_type(name: &str, type_name: &str, field_type: &str) -> String {
    format!(
        r#"{{ "name": "{}", "version": "1.0.0", "complexTypes": [{{ "name": "{}", "properties": [{{ "name": "value", "type": "{}" }}] }}] }}"#,
        name, type_name, field_type
    )
}
