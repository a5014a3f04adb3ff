//! Generation with the built-in template sets

use crate::common::{as_strings, TestProject};
use crate::fixtures::{CORE, ELEMENTS};
use kmd_codegen::{generate_from_config, GenerateConfig};

fn project() -> TestProject {
    let project = TestProject::new();
    project.primary("core", CORE).primary("elements", ELEMENTS);
    project
}

#[test]
fn test_rust_generation_writes_every_local_entity() {
    let project = project();
    let report = generate_from_config(&project.config()).unwrap();

    assert!(report.is_success(), "{}", report.errors);
    assert_eq!(
        as_strings(&report.written),
        vec![
            "src/core/media_object.rs",
            "src/core/mod.rs",
            "src/core/point.rs",
            "src/core/state.rs",
            "src/core/uri.rs",
            "src/elements/events/player_end_of_stream.rs",
            "src/elements/mod.rs",
            "src/elements/player.rs",
        ]
    );
    assert_eq!(project.output_files(), as_strings(&report.written));

    let player = project.read_output("src/elements/player.rs");
    assert!(player.contains("pub trait Player: MediaObject {"));
    assert!(player.contains("fn position(&self) -> Point;"));
    assert!(player.contains("fn states(&self) -> Vec<State>;"));
    assert!(player.contains("fn play(&self);"));

    let point = project.read_output("src/core/point.rs");
    assert!(point.contains("/// A position"));
    assert!(point.contains("pub y: Option<i32>,"));

    let module = project.read_output("src/elements/mod.rs");
    assert!(module.contains("pub(crate) use crate::core::*;"));
    assert!(module.contains("pub use player_end_of_stream::PlayerEndOfStream;"));
}

#[test]
fn test_typescript_generation() {
    let project = project();
    let config = GenerateConfig {
        internal_templates: "typescript".to_string(),
        ..project.config()
    };
    let report = generate_from_config(&config).unwrap();

    assert!(report.is_success(), "{}", report.errors);
    let written = as_strings(&report.written);
    assert!(written.contains(&"core/index.ts".to_string()));
    assert!(written.contains(&"elements/Player.ts".to_string()));
    assert!(written.contains(&"elements/createPlayer.ts".to_string()));
    // abstract classes get no factory
    assert!(!written.contains(&"core/createMediaObject.ts".to_string()));

    let player = project.read_output("elements/Player.ts");
    assert!(player.contains("position(): Promise<Point>;"));
}

#[test]
fn test_generation_is_deterministic() {
    let project = project();
    let first = GenerateConfig {
        codegen: Some(project.path("first")),
        ..project.config()
    };
    let second = GenerateConfig {
        codegen: Some(project.path("second")),
        ..project.config()
    };

    generate_from_config(&first).unwrap();
    generate_from_config(&second).unwrap();

    let files = crate::common::files_under(&project.path("first"));
    assert_eq!(files, crate::common::files_under(&project.path("second")));
    for file in files {
        let a = std::fs::read(project.path("first").join(&file)).unwrap();
        let b = std::fs::read(project.path("second").join(&file)).unwrap();
        assert_eq!(a, b, "{} differs between runs", file);
    }
}

#[test]
fn test_dependency_types_are_not_generated() {
    let project = TestProject::new();
    project.primary("elements", ELEMENTS).dependency("core", CORE);

    let report = generate_from_config(&project.config()).unwrap();

    assert!(report.is_success(), "{}", report.errors);
    assert!(as_strings(&report.written)
        .iter()
        .all(|path| path.starts_with("src/elements/")));
}

#[test]
fn test_overlay_reaches_templates() {
    let project = project();
    project.write_file("overlay.json", r#"{ "license": "Apache-2.0" }"#);
    let config = GenerateConfig {
        config: Some(project.path("overlay.json")),
        ..project.config()
    };

    let report = generate_from_config(&config).unwrap();

    assert!(report.is_success(), "{}", report.errors);
    assert!(project
        .read_output("src/core/point.rs")
        .contains("// License: Apache-2.0"));
}

#[test]
fn test_model_errors_prevent_rendering() {
    let project = TestProject::new();
    project.primary("elements", ELEMENTS);

    let report = generate_from_config(&project.config()).unwrap();

    assert!(!report.is_success());
    assert!(report.written.is_empty());
    assert!(project.output_files().is_empty());
}
