//! Equality rules applied when the same name is declared more than once.
//!
//! Every merge decision about duplicates goes through these two functions.

use super::document::TypeDecl;

/// Two declarations of the same (module, name) conflict unless they are
/// identical as written: kind, docs, member order, type spellings, optional
/// flags, defaults, enum constants and events all take part.
pub fn definitions_conflict(first: &TypeDecl, second: &TypeDecl) -> bool {
    first != second
}

/// Module versions are compared as written, ignoring surrounding whitespace.
pub fn versions_conflict(first: &str, second: &str) -> bool {
    first.trim() != second.trim()
}
