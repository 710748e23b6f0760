//! Shared test utilities for the infopath-reader test suite.
//!
//! Every fixture is built from the extracted form in
//! `fixtures/feedback-form/`, so tests agree on one set of fields:
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut archive = fixture_archive();
//! let manifest = fixture_manifest(&mut archive);
//! let table = read_schema(&mut archive, &manifest, &SchemaConfig::default()).unwrap();
//! assert_eq!(find_field(&table, "feedback").option_type(), Some(OptionType::Checkbox));
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::archive::{Archive, DirectoryArchive, MemoryArchive};
use crate::manifest::Manifest;
use crate::types::{FieldDescriptor, FieldTable};

// =========================================================================
// Fixture setup
// =========================================================================

/// Path of the checked-in extracted form.
pub fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/feedback-form")
}

/// Copy `fixtures/feedback-form/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    copy_dir_recursive(&fixture_dir(), tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// The fixture form loaded into memory.
pub fn fixture_archive() -> MemoryArchive {
    let mut dir = DirectoryArchive::new(&fixture_dir());
    MemoryArchive::copy_from(&mut dir).unwrap()
}

/// The fixture form with one member removed.
pub fn fixture_archive_without(member: &str) -> MemoryArchive {
    fixture_archive().without_member(member)
}

/// Parse the manifest of an archive. Panics on failure.
pub fn fixture_manifest(archive: &mut dyn Archive) -> Manifest {
    Manifest::read(archive).unwrap_or_else(|e| panic!("fixture manifest: {e}"))
}

// =========================================================================
// Field lookups: panics with a clear message on miss
// =========================================================================

/// Find a field by name. Panics if not found.
pub fn find_field<'a>(table: &'a FieldTable, name: &str) -> &'a FieldDescriptor {
    table.get(name).unwrap_or_else(|| {
        let names: Vec<&str> = table.names().collect();
        panic!("field '{name}' not found. Available: {names:?}")
    })
}

/// `(key, label)` pairs of a field's option set. Panics if the field has none.
pub fn option_pairs<'a>(table: &'a FieldTable, name: &str) -> Vec<(&'a str, &'a str)> {
    find_field(table, name)
        .options()
        .unwrap_or_else(|| panic!("field '{name}' has no options"))
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect()
}
