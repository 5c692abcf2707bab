//! Declarative object store interface
//!
//! The unpacker never talks to a concrete store directly; it is handed an
//! [`ObjectStore`]. [`dir::DirStore`] keeps objects as YAML files under a
//! root directory. [`memory::MemoryStore`] backs the unit tests.

pub mod dir;
#[cfg(test)]
pub mod memory;

use std::collections::BTreeMap;

use crate::domain::{Bundle, Chunk, ObjectKey, Pod};
use crate::error::StoreError;

pub use dir::DirStore;

/// Operations the unpacker needs from the object store.
///
/// `delete_chunk` on an absent key returns [`StoreError::NotFound`];
/// `create_chunk` on a present key returns [`StoreError::AlreadyExists`].
pub trait ObjectStore {
    /// Fetch a bundle. Returns `None` if not found.
    fn get_bundle(&self, key: &ObjectKey) -> Result<Option<Bundle>, StoreError>;

    /// Fetch a pod. Returns `None` if not found.
    fn get_pod(&self, key: &ObjectKey) -> Result<Option<Pod>, StoreError>;

    /// List the chunks in `namespace` whose labels match every selector entry
    fn list_chunks(
        &self,
        selector: &BTreeMap<String, String>,
        namespace: &str,
    ) -> Result<Vec<Chunk>, StoreError>;

    /// Create a chunk. Never overwrites.
    fn create_chunk(&self, chunk: &Chunk) -> Result<(), StoreError>;

    /// Delete the chunk at `key`
    fn delete_chunk(&self, key: &ObjectKey) -> Result<(), StoreError>;

    /// Delete a bundle together with every chunk it controls.
    ///
    /// Returns the number of dependent chunks removed.
    fn delete_bundle(&self, key: &ObjectKey) -> Result<usize, StoreError>;

    /// Tie the chunk's lifecycle to `owner`, so that deleting the owner
    /// removes the chunk.
    fn link_lifecycle(&self, owner: &Bundle, chunk: &mut Chunk) -> Result<(), StoreError> {
        set_controller_reference(owner, chunk)
    }
}

/// Attach `owner` as the controller of `chunk`.
///
/// Replaces an existing reference to the same owner. Fails when the chunk
/// is already controlled by a different object or lives in another
/// namespace than the owner.
pub fn set_controller_reference(owner: &Bundle, chunk: &mut Chunk) -> Result<(), StoreError> {
    if !owner.namespace().is_empty() && owner.namespace() != chunk.namespace() {
        return Err(StoreError::Conflict {
            message: format!(
                "cross-namespace owner references are disallowed: owner {} cannot control {}",
                owner.key(),
                chunk.key()
            ),
        });
    }

    let reference = owner.controller_reference();
    if let Some(existing) = chunk.metadata.controller() {
        if existing.uid != reference.uid || existing.kind != reference.kind {
            return Err(StoreError::Conflict {
                message: format!(
                    "{} is already controlled by {} '{}'",
                    chunk.key(),
                    existing.kind,
                    existing.name
                ),
            });
        }
    }

    let refs = &mut chunk.metadata.owner_references;
    refs.retain(|r| !(r.uid == reference.uid && r.kind == reference.kind));
    refs.push(reference);
    Ok(())
}

/// Whether `chunk` is controlled by the bundle with `uid`
pub fn is_owned_by(chunk: &Chunk, uid: &str) -> bool {
    chunk
        .metadata
        .owner_references
        .iter()
        .any(|r| r.uid == uid)
}
