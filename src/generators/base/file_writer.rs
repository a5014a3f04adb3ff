use crate::error::{Diagnostics, GenerationError};
use crate::generators::renderer::GeneratedFile;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Switches controlling how rendered files reach the destination tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Remove the root's previous contents before writing
    pub delete: bool,
    /// Leave files that already exist untouched
    pub no_overwrite: bool,
}

/// What the writer did, with paths relative to the destination root
#[derive(Debug, Default)]
pub struct WriteOutcome {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub diagnostics: Diagnostics,
}

/// Writes generated files under a destination root
pub struct FileWriter {
    root: PathBuf,
    options: WriteOptions,
}

impl FileWriter {
    pub fn new<P: AsRef<Path>>(root: P, options: WriteOptions) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            options,
        }
    }

    /// Apply the delete, skip and write steps in order.
    ///
    /// A failure on one file is recorded and the remaining files are still attempted.
    pub fn write_all(&self, files: &[GeneratedFile]) -> WriteOutcome {
        let mut outcome = WriteOutcome::default();

        if self.options.delete {
            outcome.diagnostics.extend(self.clear_root());
        }

        for file in files {
            let destination = self.root.join(&file.path);
            if self.options.no_overwrite && destination.exists() {
                outcome.skipped.push(file.path.clone());
                continue;
            }
            match write_atomically(&destination, &file.content) {
                Ok(()) => outcome.written.push(file.path.clone()),
                Err(e) => outcome.diagnostics.push(GenerationError::Write {
                    path: destination,
                    message: e.to_string(),
                }),
            }
        }

        outcome
    }

    /// Remove everything under the root, keeping the root itself
    pub fn clear_root(&self) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return diagnostics,
            Err(e) => {
                diagnostics.push(GenerationError::Write {
                    path: self.root.clone(),
                    message: e.to_string(),
                });
                return diagnostics;
            }
        };

        for entry in entries {
            let result = entry.and_then(|entry| {
                let path = entry.path();
                let removed = if entry.file_type()?.is_dir() {
                    fs::remove_dir_all(&path)
                } else {
                    fs::remove_file(&path)
                };
                removed.map_err(|e| io::Error::new(e.kind(), format!("{}: {}", path.display(), e)))
            });
            if let Err(e) = result {
                diagnostics.push(GenerationError::Write {
                    path: self.root.clone(),
                    message: e.to_string(),
                });
            }
        }

        diagnostics
    }
}

/// Write to a sibling temp file, then rename over the destination
fn write_atomically(destination: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = destination.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let temp_path = temp_path_for(destination);
    fs::write(&temp_path, content)?;
    if let Err(e) = fs::rename(&temp_path, destination) {
        fs::remove_file(&temp_path).ok();
        return Err(e);
    }
    Ok(())
}

fn temp_path_for(destination: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(destination.file_name().unwrap_or_default());
    name.push(".kmd-tmp");
    destination.with_file_name(name)
}
