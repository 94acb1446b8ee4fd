//! Local object store
//!
//! Documents live at `<root>/<orgID>/<type>-<id>.json`. A patched document
//! gets an empty `<type>-<id>.touched` marker next to it until it has been
//! pushed back.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use migrate_model::{Document, DocumentKind};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::StoreError;
use crate::object::{parse_object_file_name, FileExt, ObjectRef};

#[cfg(unix)]
const FILE_MODE: u32 = 0o660;
#[cfg(unix)]
const DIR_MODE: u32 = 0o770;

/// A JSON document found in the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Path of the document
    pub path: PathBuf,
    /// Document kind, from the file name
    pub kind: DocumentKind,
}

/// Result of walking the store
///
/// Files that could not be read or named are collected in `failures`
/// instead of aborting the walk.
#[derive(Debug)]
pub struct Listing<T> {
    /// Entries found
    pub entries: Vec<T>,
    /// Per-path failures
    pub failures: Vec<(PathBuf, StoreError)>,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            failures: Vec::new(),
        }
    }
}

struct WalkedFile {
    folder: String,
    name: String,
    path: PathBuf,
}

/// Object store rooted at a directory
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store root
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of an object's JSON document
    #[must_use]
    pub fn path_for(&self, object: &ObjectRef) -> PathBuf {
        self.root.join(object.relative_path())
    }

    /// Path of the touched marker belonging to a JSON document
    #[must_use]
    pub fn touched_path_for(json_path: &Path) -> PathBuf {
        json_path.with_extension(&FileExt::Touched.as_str()[1..])
    }

    /// Create the folders of the given organisations
    ///
    /// # Errors
    /// Returns the first folder that could not be created
    pub async fn ensure_org_dirs(&self, org_ids: impl IntoIterator<Item = i64>) -> Result<(), StoreError> {
        for org_id in org_ids {
            let dir = self.root.join(org_id.to_string());
            let mut builder = tokio::fs::DirBuilder::new();
            builder.recursive(true);
            #[cfg(unix)]
            builder.mode(DIR_MODE);
            builder
                .create(&dir)
                .await
                .map_err(|e| StoreError::io_error(&dir, e))?;
        }
        Ok(())
    }

    /// Whether the object has a local document
    pub async fn exists(&self, object: &ObjectRef) -> bool {
        tokio::fs::metadata(self.path_for(object)).await.is_ok()
    }

    /// Read and decode a document
    ///
    /// # Errors
    /// Returns error if the file cannot be read or decoded
    pub async fn read_document<D: Document>(&self, path: &Path) -> Result<D, StoreError> {
        let content = tokio::fs::read(path)
            .await
            .map_err(|e| StoreError::io_error(path, e))?;
        Ok(D::from_json_slice(&content)?)
    }

    /// Encode and write a document, replacing any previous content
    ///
    /// # Errors
    /// Returns error if encoding or writing fails
    pub async fn write_document<D: Document>(&self, path: &Path, document: &D) -> Result<(), StoreError> {
        let content = document.to_json_pretty()?;
        write_file(path, content.as_bytes()).await?;
        debug!(path = %path.display(), kind = %D::KIND, "Wrote document");
        Ok(())
    }

    /// Write the touched marker next to a JSON document
    ///
    /// # Errors
    /// Returns error if the marker cannot be written
    pub async fn mark_touched(&self, json_path: &Path) -> Result<PathBuf, StoreError> {
        let touched = Self::touched_path_for(json_path);
        write_file(&touched, &[]).await?;
        Ok(touched)
    }

    /// Remove the touched marker of a JSON document, if any
    ///
    /// # Errors
    /// Returns error if the marker exists but cannot be removed
    pub async fn clear_touched(&self, json_path: &Path) -> Result<(), StoreError> {
        let touched = Self::touched_path_for(json_path);
        match tokio::fs::remove_file(&touched).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io_error(touched, e)),
        }
    }

    /// All JSON documents in the store
    ///
    /// Markers are skipped. Files whose name does not parse, or whose type
    /// is unknown, are reported as failures.
    ///
    /// # Errors
    /// Returns error only if the root itself cannot be read
    pub async fn list_objects(&self) -> Result<Listing<StoredObject>, StoreError> {
        let (files, failures) = self.walk().await?;
        let mut listing = Listing {
            entries: Vec::new(),
            failures,
        };

        for file in files {
            let parsed = parse_object_file_name(&file.name)
                .and_then(|name| Ok((name.ext, name.kind.parse::<DocumentKind>()?)));
            match parsed {
                Ok((FileExt::Json, kind)) => listing.entries.push(StoredObject { path: file.path, kind }),
                Ok((FileExt::Touched, _)) => {}
                Err(e) => listing.failures.push((file.path, e)),
            }
        }
        Ok(listing)
    }

    /// Objects to push back, with the path of their JSON document
    ///
    /// Only objects with a touched marker are returned unless `all` is set.
    /// Each object appears once, ordered by reference.
    ///
    /// # Errors
    /// Returns error only if the root itself cannot be read
    pub async fn touched_objects(&self, all: bool) -> Result<Listing<(ObjectRef, PathBuf)>, StoreError> {
        let (files, failures) = self.walk().await?;
        let mut found = BTreeMap::new();
        let mut listing = Listing {
            entries: Vec::new(),
            failures,
        };

        for file in files {
            let is_touched = Path::new(&file.name)
                .extension()
                .is_some_and(|ext| ext == &FileExt::Touched.as_str()[1..]);
            if !all && !is_touched {
                continue;
            }

            match ObjectRef::from_file(&file.folder, &file.name) {
                Ok(object) => {
                    found.entry(object).or_insert_with_key(|object| {
                        let name = object.relative_path();
                        let name = name.file_name().map(PathBuf::from).unwrap_or_default();
                        file.path.with_file_name(name)
                    });
                }
                Err(e) => listing.failures.push((file.path, e)),
            }
        }

        listing.entries = found.into_iter().collect();
        Ok(listing)
    }

    async fn walk(&self) -> Result<(Vec<WalkedFile>, Vec<(PathBuf, StoreError)>), StoreError> {
        let mut files = Vec::new();
        let mut failures = Vec::new();
        let mut pending = vec![self.root.clone()];
        let mut is_root = true;

        while let Some(dir) = pending.pop() {
            let entries = match read_dir_sorted(&dir).await {
                Ok(entries) => entries,
                Err(e) if is_root => return Err(e),
                Err(e) => {
                    failures.push((dir, e));
                    continue;
                }
            };
            is_root = false;

            let folder = dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();

            for (path, file_type) in entries {
                if file_type.is_dir() {
                    pending.push(path);
                } else if file_type.is_file() {
                    let name = path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    files.push(WalkedFile {
                        folder: folder.clone(),
                        name,
                        path,
                    });
                }
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok((files, failures))
    }
}

async fn read_dir_sorted(dir: &Path) -> Result<Vec<(PathBuf, std::fs::FileType)>, StoreError> {
    let mut read = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| StoreError::io_error(dir, e))?;
    let mut entries = Vec::new();
    while let Some(entry) = read
        .next_entry()
        .await
        .map_err(|e| StoreError::io_error(dir, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| StoreError::io_error(entry.path(), e))?;
        entries.push((entry.path(), file_type));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

async fn write_file(path: &Path, content: &[u8]) -> Result<(), StoreError> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(FILE_MODE);

    let mut file = options
        .open(path)
        .await
        .map_err(|e| StoreError::io_error(path, e))?;
    file.write_all(content)
        .await
        .map_err(|e| StoreError::io_error(path, e))?;
    file.flush().await.map_err(|e| StoreError::io_error(path, e))
}
