//! Loading and merging through the public pipeline

use crate::common::TestProject;
use crate::fixtures::{importing, with_type, CORE, ELEMENTS, UNRESOLVED};
use kmd_codegen::analysis::loader::DocumentLoader;
use kmd_codegen::analysis::ModelBuilder;
use kmd_codegen::{generate_from_config, ConfigOverlay, GenerationError, Origin, TypeKey};

fn build(project: &TestProject) -> kmd_codegen::analysis::ModelBuild {
    let overlay = ConfigOverlay::new();
    let config = project.config();
    ModelBuilder::new(DocumentLoader::default(), &overlay).build(&config.rom, &config.deprom)
}

mod duplicates {
    use super::*;

    #[test]
    fn test_identical_duplicate_is_deduplicated() {
        let project = TestProject::new();
        project
            .primary("core", CORE)
            .write_file("idl/copy/core.kmd.json", CORE);

        let build = build(&project);

        assert!(build.is_success(), "{}", build.diagnostics);
        let model = build.model.unwrap();
        assert_eq!(model.modules().count(), 1);
        assert!(model.lookup(&TypeKey::new("core", "Point")).is_some());
    }

    #[test]
    fn test_conflicting_duplicate_is_reported() {
        let project = TestProject::new();
        project
            .primary("a", &with_type("shared", "Thing", "int"))
            .primary("b", &with_type("shared", "Thing", "String"));

        let build = build(&project);

        assert!(build.model.is_none());
        assert!(build
            .diagnostics
            .iter()
            .any(|e| matches!(e, GenerationError::DuplicateDefinition { .. })));
    }

    #[test]
    fn test_same_document_in_both_sets_is_local() {
        let project = TestProject::new();
        project.primary("core", CORE).dependency("core", CORE);

        let build = build(&project);

        assert!(build.is_success(), "{}", build.diagnostics);
        assert_eq!(
            build.model.unwrap().module("core").unwrap().origin,
            Origin::Local
        );
    }
}

mod cycles {
    use super::*;

    #[test]
    fn test_import_cycle_names_every_member() {
        let project = TestProject::new();
        project
            .primary("a", &importing("a", "b"))
            .primary("b", &importing("b", "c"))
            .primary("c", &importing("c", "a"));

        let build = build(&project);

        let mut members = build
            .diagnostics
            .iter()
            .find_map(|e| match e {
                GenerationError::ImportCycle { modules } => Some(modules.clone()),
                _ => None,
            })
            .expect("cycle reported");
        members.sort();
        assert_eq!(members, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_import_chain_is_valid() {
        let project = TestProject::new();
        project
            .primary("a", &importing("a", "b"))
            .primary("b", &importing("b", "c"))
            .primary("c", r#"{ "name": "c", "version": "1.0.0" }"#);

        let build = build(&project);

        assert!(build.is_success(), "{}", build.diagnostics);
        let order: Vec<String> = build
            .model
            .unwrap()
            .local_modules()
            .map(|m| m.name.clone())
            .collect();
        assert_eq!(order, vec!["c", "b", "a"]);
    }
}

mod references {
    use super::*;

    #[test]
    fn test_undeclared_reference_is_reported() {
        let project = TestProject::new();
        project.primary("broken", UNRESOLVED);

        let build = build(&project);

        assert!(build.diagnostics.iter().any(|e| matches!(
            e,
            GenerationError::UnresolvedReference { reference, .. } if reference == "Missing"
        )));
    }

    #[test]
    fn test_dependency_type_resolves_and_is_imported() {
        let project = TestProject::new();
        project.primary("elements", ELEMENTS).dependency("core", CORE);

        let build = build(&project);

        assert!(build.is_success(), "{}", build.diagnostics);
        let model = build.model.unwrap();
        let point = model.lookup(&TypeKey::new("core", "Point")).unwrap();
        assert_eq!(point.origin, Origin::Imported);
        let player = model.lookup(&TypeKey::new("elements", "Player")).unwrap();
        assert_eq!(player.origin, Origin::Local);
        assert_eq!(player.extends(), Some(&TypeKey::new("core", "MediaObject")));
    }

    #[test]
    fn test_every_error_is_reported_in_one_run() {
        let project = TestProject::new();
        project
            .primary("broken", UNRESOLVED)
            .primary("other", &with_type("other", "Box", "Nowhere"));

        let build = build(&project);

        let unresolved = build
            .diagnostics
            .iter()
            .filter(|e| matches!(e, GenerationError::UnresolvedReference { .. }))
            .count();
        assert_eq!(unresolved, 2);
    }
}

mod partial_failure {
    use super::*;

    #[test]
    fn test_one_malformed_document_is_reported_once() {
        let project = TestProject::new();
        project
            .primary("core", CORE)
            .primary("elements", ELEMENTS)
            .primary("garbage", "{ not json");

        let build = build(&project);

        assert_eq!(build.diagnostics.len(), 1);
        assert!(matches!(
            build.diagnostics.iter().next(),
            Some(GenerationError::Parse { .. })
        ));
        assert_eq!(build.document_count, 2);
        assert_eq!(build.model.unwrap().modules().count(), 2);
    }

    #[test]
    fn test_pipeline_reports_failure_without_writing() {
        let project = TestProject::new();
        project.primary("core", CORE).primary("garbage", "{ not json");

        let report = generate_from_config(&project.config()).unwrap();

        assert!(!report.is_success());
        assert_eq!(report.errors.len(), 1);
        assert!(report.written.is_empty());
    }

    #[test]
    fn test_empty_dependency_set_is_a_warning() {
        let project = TestProject::new();
        project.primary("core", CORE);
        std::fs::create_dir_all(project.path("deps")).unwrap();

        let report = generate_from_config(&project.config()).unwrap();

        assert!(report.is_success(), "{}", report.errors);
        assert_eq!(report.warnings.len(), 1);
    }
}
