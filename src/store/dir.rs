//! Directory-backed object store
//!
//! Objects live at `<root>/<plural-kind>/<namespace>/<name>.yaml`:
//!
//! ```text
//! <root>/
//!   bundles/operators/etcd.yaml
//!   pods/operators/unpack-etcd.yaml
//!   configmaps/operators/bundle-object-etcd-1a2b3c4d.yaml
//! ```
//!
//! Chunk creation writes a temp file in the target directory and persists
//! it without clobbering, so a create either lands whole or not at all and
//! never replaces an existing chunk.

use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::domain::bundle::{BUNDLE_KIND, POD_KIND};
use crate::domain::chunk::CHUNK_KIND;
use crate::domain::{Bundle, Chunk, ObjectKey, Pod};
use crate::error::StoreError;
use crate::error::store::{already_exists, decode_failed, io_failed, not_found};

use super::{ObjectStore, is_owned_by};

/// Subdirectory holding bundles
pub const BUNDLES_DIR: &str = "bundles";

/// Subdirectory holding pods
pub const PODS_DIR: &str = "pods";

/// Subdirectory holding chunks
pub const CONFIGMAPS_DIR: &str = "configmaps";

const OBJECT_EXT: &str = "yaml";

/// Longest object name whose `<name>.yaml` file fits a 255-byte file name
const MAX_FILE_STEM_LEN: usize = 255 - OBJECT_EXT.len() - 1;

/// Object store rooted at a directory
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write a bundle, replacing any previous version
    pub fn put_bundle(&self, bundle: &Bundle) -> Result<(), StoreError> {
        let path = self.object_path(BUNDLES_DIR, &bundle.key())?;
        write_replace(&path, bundle)
    }

    /// Write a pod, replacing any previous version
    pub fn put_pod(&self, pod: &Pod) -> Result<(), StoreError> {
        let path = self.object_path(PODS_DIR, &pod.metadata.key())?;
        write_replace(&path, pod)
    }

    fn object_path(&self, kind_dir: &str, key: &ObjectKey) -> Result<PathBuf, StoreError> {
        validate_segment(&key.namespace)?;
        validate_segment(&key.name)?;
        Ok(self
            .root
            .join(kind_dir)
            .join(&key.namespace)
            .join(format!("{}.{OBJECT_EXT}", key.name)))
    }

    fn read_object<T: DeserializeOwned>(
        &self,
        kind_dir: &str,
        key: &ObjectKey,
    ) -> Result<Option<T>, StoreError> {
        let path = self.object_path(kind_dir, key)?;
        read_yaml(&path)
    }

    fn read_chunks(&self, namespace: &str) -> Result<Vec<Chunk>, StoreError> {
        validate_segment(namespace)?;
        let dir = self.root.join(CONFIGMAPS_DIR).join(namespace);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_failed(dir.display().to_string(), e)),
        };

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| io_failed(dir.display().to_string(), e))?;
            let path = entry.path();
            let is_object = path.extension().is_some_and(|ext| ext == OBJECT_EXT)
                && !entry.file_name().to_string_lossy().starts_with('.');
            if !is_object {
                continue;
            }
            let is_file = entry
                .file_type()
                .map_err(|e| io_failed(path.display().to_string(), e))?
                .is_file();
            if is_file {
                paths.push(path);
            } else {
                debug!(path = %path.display(), "skipping non-file entry");
            }
        }
        paths.sort();

        let mut chunks = Vec::with_capacity(paths.len());
        for path in paths {
            // A chunk deleted between read_dir and read is simply gone.
            if let Some(chunk) = read_yaml::<Chunk>(&path)? {
                chunks.push(chunk);
            }
        }
        Ok(chunks)
    }
}

impl ObjectStore for DirStore {
    fn get_bundle(&self, key: &ObjectKey) -> Result<Option<Bundle>, StoreError> {
        self.read_object(BUNDLES_DIR, key)
    }

    fn get_pod(&self, key: &ObjectKey) -> Result<Option<Pod>, StoreError> {
        self.read_object(PODS_DIR, key)
    }

    fn list_chunks(
        &self,
        selector: &BTreeMap<String, String>,
        namespace: &str,
    ) -> Result<Vec<Chunk>, StoreError> {
        Ok(self
            .read_chunks(namespace)?
            .into_iter()
            .filter(|c| c.metadata.matches_labels(selector))
            .collect())
    }

    fn create_chunk(&self, chunk: &Chunk) -> Result<(), StoreError> {
        let key = chunk.key();
        let path = self.object_path(CONFIGMAPS_DIR, &key)?;
        let parent = parent_dir(&path)?;
        fs::create_dir_all(parent).map_err(|e| io_failed(parent.display().to_string(), e))?;

        let yaml = serde_yaml::to_string(chunk)
            .map_err(|e| io_failed(path.display().to_string(), e))?;
        let mut temp = NamedTempFile::new_in(parent)
            .map_err(|e| io_failed(parent.display().to_string(), e))?;
        temp.write_all(yaml.as_bytes())
            .map_err(|e| io_failed(temp.path().display().to_string(), e))?;

        match temp.persist_noclobber(&path) {
            Ok(_) => {
                debug!(chunk = %key, "created chunk");
                Ok(())
            }
            Err(e) if e.error.kind() == ErrorKind::AlreadyExists => {
                Err(already_exists(CHUNK_KIND, &key))
            }
            Err(e) => Err(io_failed(path.display().to_string(), e.error)),
        }
    }

    fn delete_chunk(&self, key: &ObjectKey) -> Result<(), StoreError> {
        let path = self.object_path(CONFIGMAPS_DIR, key)?;
        remove(&path, CHUNK_KIND, key)?;
        debug!(chunk = %key, "deleted chunk");
        Ok(())
    }

    fn delete_bundle(&self, key: &ObjectKey) -> Result<usize, StoreError> {
        let bundle: Bundle = self
            .read_object(BUNDLES_DIR, key)?
            .ok_or_else(|| not_found(BUNDLE_KIND, key))?;

        // The bundle goes last, so a failed cascade can be retried.
        let mut removed = 0;
        for chunk in self.read_chunks(&key.namespace)? {
            if !is_owned_by(&chunk, &bundle.metadata.uid) {
                continue;
            }
            match self.delete_chunk(&chunk.key()) {
                Ok(()) => removed += 1,
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e),
            }
        }

        let path = self.object_path(BUNDLES_DIR, key)?;
        remove(&path, BUNDLE_KIND, key)?;
        debug!(bundle = %key, removed, "deleted bundle and its dependents");
        Ok(removed)
    }
}

fn validate_segment(segment: &str) -> Result<(), StoreError> {
    let valid = !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\']);
    if !valid {
        return Err(StoreError::Conflict {
            message: format!("invalid object name or namespace '{segment}'"),
        });
    }
    if segment.len() > MAX_FILE_STEM_LEN {
        return Err(StoreError::Conflict {
            message: format!(
                "object name '{segment}' is longer than the {MAX_FILE_STEM_LEN} bytes the directory store can hold"
            ),
        });
    }
    Ok(())
}

fn parent_dir(path: &Path) -> Result<&Path, StoreError> {
    path.parent()
        .ok_or_else(|| io_failed(path.display().to_string(), "object path has no parent"))
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(io_failed(path.display().to_string(), e)),
    };
    serde_yaml::from_str(&content)
        .map(Some)
        .map_err(|e| decode_failed(path.display().to_string(), e))
}

fn write_replace<T: Serialize>(path: &Path, object: &T) -> Result<(), StoreError> {
    let parent = parent_dir(path)?;
    fs::create_dir_all(parent).map_err(|e| io_failed(parent.display().to_string(), e))?;
    let yaml =
        serde_yaml::to_string(object).map_err(|e| io_failed(path.display().to_string(), e))?;
    let mut temp =
        NamedTempFile::new_in(parent).map_err(|e| io_failed(parent.display().to_string(), e))?;
    temp.write_all(yaml.as_bytes())
        .map_err(|e| io_failed(temp.path().display().to_string(), e))?;
    temp.persist(path)
        .map_err(|e| io_failed(path.display().to_string(), e.error))?;
    Ok(())
}

fn remove(path: &Path, kind: &str, key: &ObjectKey) -> Result<(), StoreError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(not_found(kind, key)),
        Err(e) => Err(io_failed(path.display().to_string(), e)),
    }
}
