//! # Document Handle
//!
//! The canonical markup of one page and its persistence.
//!
//! A Document is always a string. Trees are parsed from it on demand by the
//! [`Pipeline`](crate::Pipeline) and discarded after each edit. Documents
//! can be:
//! - **Memory-backed**: the caller persists the source itself
//! - **File-backed**: tracks unsaved changes and writes on [`Document::save`]

use std::path::{Path, PathBuf};

use pagewright_markup::{parse, Dom};

use crate::EditorError;

/// Editable page document
#[derive(Debug, Clone)]
pub struct Document {
    /// Path to source file (if any)
    pub path: Option<PathBuf>,

    /// Current version number (increments on each change)
    pub version: u64,

    /// Backing storage strategy
    storage: DocumentStorage,
}

/// Storage backend for document
#[derive(Debug, Clone)]
pub enum DocumentStorage {
    /// In-memory only
    Memory { source: String },

    /// File-backed
    File { source: String, dirty: bool },
}

impl Document {
    /// Create document from source text (memory-backed)
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            path: None,
            version: 0,
            storage: DocumentStorage::Memory {
                source: source.into(),
            },
        }
    }

    /// Load document from file (file-backed)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EditorError> {
        let path = path.as_ref().to_path_buf();
        let source = std::fs::read_to_string(&path)?;

        Ok(Self {
            path: Some(path),
            version: 0,
            storage: DocumentStorage::File {
                source,
                dirty: false,
            },
        })
    }

    pub fn source(&self) -> &str {
        match &self.storage {
            DocumentStorage::Memory { source } | DocumentStorage::File { source, .. } => source,
        }
    }

    /// Fresh tree of the current source
    pub fn dom(&self) -> Dom {
        parse(self.source())
    }

    /// Replace the source, bumping the version
    pub fn replace(&mut self, next: String) -> u64 {
        match &mut self.storage {
            DocumentStorage::Memory { source } => *source = next,
            DocumentStorage::File { source, dirty } => {
                *source = next;
                *dirty = true;
            }
        }
        self.version += 1;
        self.version
    }

    /// Check if document has unsaved changes
    pub fn is_dirty(&self) -> bool {
        match &self.storage {
            DocumentStorage::File { dirty, .. } => *dirty,
            DocumentStorage::Memory { .. } => false,
        }
    }

    pub fn is_file_backed(&self) -> bool {
        matches!(self.storage, DocumentStorage::File { .. })
    }

    /// Save document to disk (if file-backed)
    pub fn save(&mut self) -> Result<(), EditorError> {
        match (&mut self.storage, &self.path) {
            (DocumentStorage::File { source, dirty }, Some(path)) => {
                std::fs::write(path, source.as_bytes())?;
                *dirty = false;
                Ok(())
            }
            _ => Err(EditorError::NotFileBacked),
        }
    }

    /// Write to a new path; the document becomes file-backed there
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<(), EditorError> {
        let path = path.as_ref().to_path_buf();
        std::fs::write(&path, self.source().as_bytes())?;
        let source = self.source().to_string();
        self.storage = DocumentStorage::File {
            source,
            dirty: false,
        };
        self.path = Some(path);
        Ok(())
    }
}
