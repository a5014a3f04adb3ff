//! User-supplied template directories

use crate::common::{as_strings, TestProject};
use crate::fixtures::CORE;
use kmd_codegen::{generate_from_config, EntityKind, Error, GenerateConfig, GenerationError};

const SIMPLE: &str = r#"{
    "name": "simple",
    "version": "0.3.0",
    "complexTypes": [
        { "name": "Alpha", "properties": [{ "name": "n", "type": "int" }] },
        { "name": "Beta", "properties": [{ "name": "s", "type": "String[]" }] }
    ]
}"#;

fn project(templates: &[(&str, &str)]) -> TestProject {
    let project = TestProject::new();
    project.primary("simple", SIMPLE);
    for (name, content) in templates {
        project.write_file(&format!("templates/{}", name), content);
    }
    project
}

fn config(project: &TestProject) -> GenerateConfig {
    GenerateConfig {
        templates: Some(project.path("templates")),
        ..project.config()
    }
}

#[test]
fn test_user_templates_take_precedence() {
    let project = project(&[
        ("module.tera", "{{ module.name }}.txt\n{{ module.name }} {{ module.version }}"),
        (
            "complexType.tera",
            "types/{{ entity.name }}.txt\n{% for f in entity.properties %}{{ f.name }}: {{ f.dataType | type_name(lang=\"ts\") }}{% endfor %}",
        ),
    ]);

    let report = generate_from_config(&config(&project)).unwrap();

    assert!(report.is_success(), "{}", report.errors);
    assert_eq!(
        as_strings(&report.written),
        vec!["simple.txt", "types/Alpha.txt", "types/Beta.txt"]
    );
    assert_eq!(project.read_output("simple.txt"), "simple 0.3.0");
    assert_eq!(project.read_output("types/Beta.txt"), "s: string[]");
}

#[test]
fn test_partials_and_extra_templates_per_kind() {
    let project = project(&[
        ("partials/banner.tera", "// {{ module.name }}"),
        ("module.tera", "\n"),
        ("complexType.tera", "{{ entity.name }}.rs\n{% include \"partials/banner.tera\" %}"),
        ("complexType_test.tera", "{{ entity.name }}_test.rs\n"),
    ]);

    let report = generate_from_config(&config(&project)).unwrap();

    assert!(report.is_success(), "{}", report.errors);
    assert_eq!(
        as_strings(&report.written),
        vec!["Alpha.rs", "Alpha_test.rs", "Beta.rs", "Beta_test.rs"]
    );
    assert_eq!(project.read_output("Alpha.rs"), "// simple");
}

#[test]
fn test_missing_template_for_present_kind() {
    let project = project(&[("module.tera", "m.txt\n")]);

    let report = generate_from_config(&config(&project)).unwrap();

    assert!(!report.is_success());
    assert!(report.errors.iter().any(|e| matches!(
        e,
        GenerationError::MissingTemplate { kind } if *kind == EntityKind::ComplexType
    )));
    assert!(project.output_files().is_empty());
}

#[test]
fn test_unknown_template_kind() {
    let project = project(&[
        ("module.tera", "m.txt\n"),
        ("complexType.tera", "\n"),
        ("widget.tera", "w.txt\n"),
    ]);

    let report = generate_from_config(&config(&project)).unwrap();

    assert!(report
        .errors
        .iter()
        .any(|e| matches!(e, GenerationError::UnknownTemplateKind { template } if template == "widget.tera")));
}

#[test]
fn test_render_failure_keeps_other_files() {
    let project = project(&[
        ("module.tera", "m.txt\nok"),
        (
            "complexType.tera",
            "{{ entity.name }}.txt\n{% if entity.name == \"Beta\" %}{{ missing.value }}{% endif %}fine",
        ),
    ]);

    let report = generate_from_config(&config(&project)).unwrap();

    assert!(!report.is_success());
    assert_eq!(report.errors.len(), 1);
    assert!(matches!(
        report.errors.iter().next(),
        Some(GenerationError::Render { .. })
    ));
    assert_eq!(as_strings(&report.written), vec!["Alpha.txt", "m.txt"]);
}

#[test]
fn test_template_syntax_error_is_fatal() {
    let project = project(&[("module.tera", "m.txt\n{% if %}")]);

    let result = generate_from_config(&config(&project));

    assert!(matches!(result, Err(Error::TemplateSet(_))));
    assert!(!project.path("out").exists());
}

#[test]
fn test_unknown_builtin_is_fatal() {
    let project = TestProject::new();
    project.primary("core", CORE);
    let config = GenerateConfig {
        internal_templates: "cobol".to_string(),
        ..project.config()
    };

    assert!(matches!(
        generate_from_config(&config),
        Err(Error::TemplateSet(_))
    ));
}
