#![allow(dead_code)]
/// Common test utilities and helpers
use kmd_codegen::GenerateConfig;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// A scratch workspace with `idl/` (primary), `deps/` (dependency) and `out/` (codegen) directories
pub struct TestProject {
    pub temp_dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.temp_dir.path().join(relative)
    }

    /// Write a file relative to the workspace root, creating parent directories
    pub fn write_file(&self, relative: &str, content: &str) -> &Self {
        let file_path = self.path(relative);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(file_path, content).unwrap();
        self
    }

    /// Write a primary document as `idl/<name>.kmd.json`
    pub fn primary(&self, name: &str, content: &str) -> &Self {
        self.write_file(&format!("idl/{}.kmd.json", name), content)
    }

    /// Write a dependency document as `deps/<name>.kmd.json`
    pub fn dependency(&self, name: &str, content: &str) -> &Self {
        self.write_file(&format!("deps/{}.kmd.json", name), content)
    }

    /// Generation into `out/` from `idl/`, plus `deps/` when it exists
    pub fn config(&self) -> GenerateConfig {
        let deps = self.path("deps");
        GenerateConfig {
            rom: vec![self.path("idl")],
            deprom: if deps.is_dir() { vec![deps] } else { vec![] },
            codegen: Some(self.path("out")),
            ..Default::default()
        }
    }

    pub fn read_output(&self, relative: &str) -> String {
        fs::read_to_string(self.path("out").join(relative)).unwrap()
    }

    /// Every file under `out/`, relative and sorted
    pub fn output_files(&self) -> Vec<String> {
        files_under(&self.path("out"))
    }
}

/// Every file under `dir`, relative to it, with `/` separators, sorted
pub fn files_under(dir: &Path) -> Vec<String> {
    if !dir.exists() {
        return vec![];
    }
    let mut files: Vec<String> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            entry
                .path()
                .strip_prefix(dir)
                .unwrap()
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect();
    files.sort();
    files
}

/// Relative paths as `/`-joined strings, for comparing with [`files_under`]
pub fn as_strings(paths: &[PathBuf]) -> Vec<String> {
    let mut strings: Vec<String> = paths
        .iter()
        .map(|p| {
            p.components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect();
    strings.sort();
    strings
}
