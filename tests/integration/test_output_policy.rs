//! Overwrite, delete and export behavior of repeated runs

use crate::common::{as_strings, files_under, TestProject};
use crate::fixtures::{CORE, ELEMENTS};
use kmd_codegen::analysis::loader::parse_document;
use kmd_codegen::{generate_from_config, GenerateConfig, Origin};
use std::fs;

fn project() -> TestProject {
    let project = TestProject::new();
    project.primary("core", CORE).primary("elements", ELEMENTS);
    project
}

mod overwrite {
    use super::*;

    #[test]
    fn test_no_overwrite_second_run_writes_nothing() {
        let project = project();
        let config = GenerateConfig {
            no_overwrite: true,
            ..project.config()
        };

        let first = generate_from_config(&config).unwrap();
        let second = generate_from_config(&config).unwrap();

        assert!(first.is_success() && second.is_success());
        assert!(!first.written.is_empty());
        assert!(first.skipped.is_empty());
        assert!(second.written.is_empty());
        assert_eq!(as_strings(&second.skipped), as_strings(&first.written));
    }

    #[test]
    fn test_no_overwrite_keeps_hand_edits() {
        let project = project();
        let config = GenerateConfig {
            no_overwrite: true,
            ..project.config()
        };
        generate_from_config(&config).unwrap();
        project.write_file("out/src/core/point.rs", "// edited by hand\n");

        generate_from_config(&config).unwrap();

        assert_eq!(project.read_output("src/core/point.rs"), "// edited by hand\n");
    }

    #[test]
    fn test_overwrite_is_byte_identical() {
        let project = project();
        let config = project.config();

        generate_from_config(&config).unwrap();
        let before: Vec<Vec<u8>> = project
            .output_files()
            .iter()
            .map(|f| fs::read(project.path("out").join(f)).unwrap())
            .collect();

        let second = generate_from_config(&config).unwrap();
        let after: Vec<Vec<u8>> = project
            .output_files()
            .iter()
            .map(|f| fs::read(project.path("out").join(f)).unwrap())
            .collect();

        assert_eq!(before, after);
        assert_eq!(second.written.len(), before.len());
    }

    #[test]
    fn test_overwrite_replaces_hand_edits() {
        let project = project();
        let config = project.config();
        generate_from_config(&config).unwrap();
        project.write_file("out/src/core/point.rs", "// edited by hand\n");

        generate_from_config(&config).unwrap();

        assert!(project
            .read_output("src/core/point.rs")
            .contains("pub struct Point {"));
    }
}

mod delete {
    use super::*;

    #[test]
    fn test_delete_removes_stale_files() {
        let project = project();
        project.write_file("out/stale/old.rs", "old");
        let config = GenerateConfig {
            delete: true,
            ..project.config()
        };

        let report = generate_from_config(&config).unwrap();

        assert!(report.is_success(), "{}", report.errors);
        assert!(!project.path("out/stale").exists());
        assert!(project.path("out").is_dir());
        assert_eq!(project.output_files(), as_strings(&report.written));
    }

    #[test]
    fn test_delete_then_no_overwrite_writes_everything() {
        let project = project();
        generate_from_config(&project.config()).unwrap();
        let config = GenerateConfig {
            delete: true,
            no_overwrite: true,
            ..project.config()
        };

        let report = generate_from_config(&config).unwrap();

        assert!(report.skipped.is_empty());
        assert_eq!(project.output_files(), as_strings(&report.written));
    }

    #[test]
    fn test_nothing_is_deleted_when_the_model_fails() {
        let project = project();
        project.primary("garbage", "{ not json");
        project.write_file("out/keep.rs", "keep");
        let config = GenerateConfig {
            delete: true,
            ..project.config()
        };

        let report = generate_from_config(&config).unwrap();

        assert!(!report.is_success());
        assert_eq!(project.output_files(), vec!["keep.rs"]);
    }
}

mod export {
    use super::*;

    #[test]
    fn test_export_without_codegen() {
        let project = TestProject::new();
        project.primary("elements", ELEMENTS).dependency("core", CORE);
        let config = GenerateConfig {
            codegen: None,
            output_model: Some(project.path("model")),
            ..project.config()
        };

        let report = generate_from_config(&config).unwrap();

        assert!(report.is_success(), "{}", report.errors);
        assert!(report.written.is_empty());
        assert_eq!(
            files_under(&project.path("model")),
            vec!["core.kmd.json", "elements.kmd.json"]
        );

        let core = parse_document(&project.path("model/core.kmd.json"), Origin::Imported).unwrap();
        assert_eq!(core.document.origin, Some(Origin::Imported));
    }

    #[test]
    fn test_export_feeds_a_later_run() {
        let project = project();
        let config = GenerateConfig {
            output_model: Some(project.path("model")),
            ..project.config()
        };
        let first = generate_from_config(&config).unwrap();
        assert_eq!(first.exported.len(), 2);

        let again = GenerateConfig {
            rom: vec![project.path("model")],
            codegen: Some(project.path("again")),
            output_model: None,
            ..project.config()
        };
        let second = generate_from_config(&again).unwrap();

        assert!(second.is_success(), "{}", second.errors);
        assert_eq!(
            files_under(&project.path("again")),
            project.output_files()
        );
    }
}
