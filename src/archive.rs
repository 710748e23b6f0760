//! Access to the files inside an InfoPath form.
//!
//! A published form (`.xsn`) is a CAB archive. Designers can also "Save as
//! Source Files", which writes the same members into a plain directory. Both
//! are read through the [`Archive`] trait so nothing downstream cares which
//! one it got.
//!
//! | Back-end | Source |
//! |---|---|
//! | [`CabArchive`] | `.xsn` file (or any `Read + Seek` over CAB bytes) |
//! | [`DirectoryArchive`] | extracted source folder |
//! | [`MemoryArchive`] | in-memory member map |

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek};
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("{archive}: member '{member}' not found")]
    MemberMissing { archive: String, member: String },
    #[error("{archive}: {source}")]
    Io {
        archive: String,
        #[source]
        source: io::Error,
    },
}

impl ArchiveError {
    fn io(archive: &str, source: io::Error) -> Self {
        Self::Io {
            archive: archive.to_string(),
            source,
        }
    }

    fn missing(archive: &str, member: &str) -> Self {
        Self::MemberMissing {
            archive: archive.to_string(),
            member: member.to_string(),
        }
    }
}

/// A container of named members.
pub trait Archive {
    /// Human-readable name used in error messages (usually the path).
    fn label(&self) -> &str;

    /// Read a member's raw bytes. Fails with
    /// [`ArchiveError::MemberMissing`] when the member does not exist.
    fn read_member(&mut self, name: &str) -> Result<Vec<u8>, ArchiveError>;

    /// Names of all members.
    fn members(&mut self) -> Result<Vec<String>, ArchiveError>;
}

impl<A: Archive + ?Sized> Archive for Box<A> {
    fn label(&self) -> &str {
        (**self).label()
    }

    fn read_member(&mut self, name: &str) -> Result<Vec<u8>, ArchiveError> {
        (**self).read_member(name)
    }

    fn members(&mut self) -> Result<Vec<String>, ArchiveError> {
        (**self).members()
    }
}

/// Open a form from disk: a directory is read as extracted source files,
/// anything else as a CAB archive.
pub fn open_archive(path: &Path) -> Result<Box<dyn Archive>, ArchiveError> {
    if path.is_dir() {
        Ok(Box::new(DirectoryArchive::new(path)))
    } else {
        Ok(Box::new(CabArchive::open(path)?))
    }
}

/// Pick the member matching `wanted`: exact name first, then ignoring ASCII
/// case. InfoPath is not consistent about member casing across versions.
fn match_member<'a>(names: &'a [String], wanted: &str) -> Option<&'a str> {
    names
        .iter()
        .find(|n| *n == wanted)
        .or_else(|| names.iter().find(|n| n.eq_ignore_ascii_case(wanted)))
        .map(String::as_str)
}

// ============================================================================
// CAB
// ============================================================================

/// A `.xsn` form: CAB-compressed members.
pub struct CabArchive<R: Read + Seek> {
    label: String,
    cabinet: cab::Cabinet<R>,
}

impl CabArchive<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let label = path.display().to_string();
        let file = File::open(path).map_err(|e| ArchiveError::io(&label, e))?;
        Self::new(label, BufReader::new(file))
    }
}

impl<R: Read + Seek> CabArchive<R> {
    pub fn new(label: impl Into<String>, reader: R) -> Result<Self, ArchiveError> {
        let label = label.into();
        let cabinet = cab::Cabinet::new(reader).map_err(|e| ArchiveError::io(&label, e))?;
        Ok(Self { label, cabinet })
    }
}

impl<R: Read + Seek> Archive for CabArchive<R> {
    fn label(&self) -> &str {
        &self.label
    }

    fn read_member(&mut self, name: &str) -> Result<Vec<u8>, ArchiveError> {
        let names = self.members()?;
        let Some(member) = match_member(&names, name) else {
            return Err(ArchiveError::missing(&self.label, name));
        };
        debug!(archive = %self.label, member, "reading cab member");
        let mut reader = self
            .cabinet
            .read_file(member)
            .map_err(|e| ArchiveError::io(&self.label, e))?;
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| ArchiveError::io(&self.label, e))?;
        Ok(bytes)
    }

    fn members(&mut self) -> Result<Vec<String>, ArchiveError> {
        Ok(self
            .cabinet
            .folder_entries()
            .flat_map(|folder| folder.file_entries())
            .map(|file| file.name().to_string())
            .collect())
    }
}

// ============================================================================
// Extracted directory
// ============================================================================

/// A form saved as source files.
pub struct DirectoryArchive {
    label: String,
    root: PathBuf,
}

impl DirectoryArchive {
    pub fn new(root: &Path) -> Self {
        Self {
            label: root.display().to_string(),
            root: root.to_path_buf(),
        }
    }
}

/// Member names come from the manifest. Only plain relative paths stay
/// inside the form folder.
fn is_relative_member(name: &str) -> bool {
    !name.is_empty()
        && Path::new(name)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

impl Archive for DirectoryArchive {
    fn label(&self) -> &str {
        &self.label
    }

    fn read_member(&mut self, name: &str) -> Result<Vec<u8>, ArchiveError> {
        if !is_relative_member(name) {
            return Err(ArchiveError::missing(&self.label, name));
        }
        let direct = self.root.join(name);
        if direct.is_file() {
            return fs::read(&direct).map_err(|e| ArchiveError::io(&self.label, e));
        }
        let names = self.members()?;
        match match_member(&names, name) {
            Some(member) => {
                fs::read(self.root.join(member)).map_err(|e| ArchiveError::io(&self.label, e))
            }
            None => Err(ArchiveError::missing(&self.label, name)),
        }
    }

    fn members(&mut self) -> Result<Vec<String>, ArchiveError> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| ArchiveError::io(&self.label, e.into()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(relative) = entry.path().strip_prefix(&self.root) {
                names.push(relative.to_string_lossy().replace('\\', "/"));
            }
        }
        Ok(names)
    }
}

// ============================================================================
// In memory
// ============================================================================

/// Members held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    label: String,
    members: BTreeMap<String, Vec<u8>>,
}

impl MemoryArchive {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            members: BTreeMap::new(),
        }
    }

    /// Add or replace a member.
    pub fn with_member(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.members.insert(name.into(), bytes.into());
        self
    }

    /// Drop a member (exact name).
    pub fn without_member(mut self, name: &str) -> Self {
        self.members.remove(name);
        self
    }

    /// Load every member of another archive.
    pub fn copy_from(archive: &mut dyn Archive) -> Result<Self, ArchiveError> {
        let mut copy = Self::new(archive.label());
        for name in archive.members()? {
            let bytes = archive.read_member(&name)?;
            copy.members.insert(name, bytes);
        }
        Ok(copy)
    }
}

impl Archive for MemoryArchive {
    fn label(&self) -> &str {
        &self.label
    }

    fn read_member(&mut self, name: &str) -> Result<Vec<u8>, ArchiveError> {
        let names: Vec<String> = self.members.keys().cloned().collect();
        match_member(&names, name)
            .and_then(|member| self.members.get(member))
            .cloned()
            .ok_or_else(|| ArchiveError::missing(&self.label, name))
    }

    fn members(&mut self) -> Result<Vec<String>, ArchiveError> {
        Ok(self.members.keys().cloned().collect())
    }
}
