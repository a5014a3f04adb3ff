//! # KMD Codegen
//!
//! Generate source code from declarative interface-description documents.
//!
//! Each document (`*.kmd.json`) describes one versioned module: its remote
//! classes, complex types, enums, aliases and events. Primary documents are
//! merged with the dependency documents they import into a single validated
//! model, which then drives a set of Tera templates.
//!
//! ## Features
//!
//! - 📂 **Document discovery**: files or directories, filtered by a file-name pattern
//! - 🔗 **Cross-module resolution**: references into imported modules, with
//!   cycle, conflict and ambiguity detection reported in one pass
//! - ⚙️ **Config overlay**: global and per-module values layered over each module's own `code` section
//! - 🧩 **Template sets**: built-in `rust` and `typescript` sets, or your own directory
//! - ♻️ **Safe regeneration**: deterministic output, atomic writes, `--no-overwrite` and `--delete`
//! - 🔍 **Introspection**: print configuration values per module without generating
//!
//! ## Quick Start
//!
//! ```bash
//! kmd-codegen --rom ./idl --deprom ./deps --codegen ./generated --no-overwrite
//! kmd-codegen --rom ./idl --show-values version code.api.lang
//! ```
//!
//! ### Programmatic Usage
//!
//! ```rust,no_run
//! use kmd_codegen::{generate_from_config, GenerateConfig};
//! use std::path::PathBuf;
//!
//! let config = GenerateConfig {
//!     rom: vec![PathBuf::from("./idl")],
//!     codegen: Some(PathBuf::from("./generated")),
//!     internal_templates: "typescript".to_string(),
//!     ..Default::default()
//! };
//!
//! let report = generate_from_config(&config)?;
//! for path in &report.written {
//!     println!("{}", path.display());
//! }
//! # Ok::<(), kmd_codegen::Error>(())
//! ```
//!
//! ## Document Example
//!
//! ```json
//! {
//!   "name": "elements",
//!   "version": "1.2.0",
//!   "imports": [{ "name": "core", "version": "1.0.0" }],
//!   "remoteClasses": [{
//!     "name": "Player",
//!     "extends": "core.MediaElement",
//!     "constructor": { "params": [{ "name": "uri", "type": "String" }] },
//!     "methods": [{ "name": "play" }],
//!     "events": [{ "name": "EndOfStream", "properties": [] }]
//!   }]
//! }
//! ```

pub mod analysis;
mod error;
pub mod generators;
pub mod interface;
pub mod introspect;
pub mod models;
pub mod overlay;

pub use error::{Diagnostics, Error, GenerationError, Result};
pub use models::*;

// Convenience re-exports for common use cases
pub use interface::config::GenerateConfig;
pub use interface::output::{Logger, ProgressReporter};
pub use interface::{generate_from_config, introspect_from_config, GenerationReport};
pub use overlay::ConfigOverlay;
