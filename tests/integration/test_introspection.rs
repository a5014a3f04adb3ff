use crate::common::TestProject;
use crate::fixtures::{CORE, ELEMENTS};
use kmd_codegen::{introspect_from_config, GenerateConfig};
use serde_json::json;

fn config(project: &TestProject, keys: &[&str]) -> GenerateConfig {
    GenerateConfig {
        show_values: keys.iter().map(|k| k.to_string()).collect(),
        output_model: Some(project.path("model")),
        ..project.config()
    }
}

#[test]
fn test_introspection_writes_nothing() {
    let project = TestProject::new();
    project.primary("core", CORE);

    let run = introspect_from_config(&config(&project, &["version"])).unwrap();

    assert!(run.is_success(), "{}", run.errors);
    assert_eq!(run.report.to_string(), "core: version = \"1.0.0\"\n");
    assert!(!project.path("out").exists());
    assert!(!project.path("model").exists());
}

#[test]
fn test_values_per_local_module_in_dependency_order() {
    let project = TestProject::new();
    project.primary("elements", ELEMENTS).primary("core", CORE);
    project.write_file(
        "overlay.json",
        r#"{ "modules": { "elements": { "api": { "lang": "rust" } } } }"#,
    );
    let config = GenerateConfig {
        config: Some(project.path("overlay.json")),
        ..config(&project, &["api.lang", "types.Point.doc"])
    };

    let run = introspect_from_config(&config).unwrap();

    let lines: Vec<String> = run.report.entries.iter().map(|e| e.to_string()).collect();
    assert_eq!(
        lines,
        vec![
            "core: api.lang = \"document\"",
            "core: types.Point.doc = \"A position\"",
            "elements: api.lang = \"rust\"",
            "elements: types.Point.doc = <undefined>",
        ]
    );
    assert_eq!(run.report.entries[0].value, Some(json!("document")));
}

#[test]
fn test_dependency_modules_are_not_reported() {
    let project = TestProject::new();
    project.primary("elements", ELEMENTS).dependency("core", CORE);

    let run = introspect_from_config(&config(&project, &["name"])).unwrap();

    assert!(run.is_success(), "{}", run.errors);
    assert_eq!(run.report.to_string(), "elements: name = \"elements\"\n");
}

#[test]
fn test_object_value_merges_every_layer() {
    let project = TestProject::new();
    project.primary("core", CORE);
    project.write_file(
        "overlay.json",
        r#"{ "api": { "crate": "kmd" }, "modules": { "core": { "api": { "target": "rust" } } } }"#,
    );
    let config = GenerateConfig {
        config: Some(project.path("overlay.json")),
        ..config(&project, &["api"])
    };

    let run = introspect_from_config(&config).unwrap();

    assert!(run.is_success(), "{}", run.errors);
    assert_eq!(
        run.report.entries[0].value,
        Some(json!({ "lang": "document", "crate": "kmd", "target": "rust" }))
    );
}
