//! In-memory object store for tests.
//!
//! Records every successful mutation in a journal so tests can assert on
//! the exact operation sequence, and can be told to fail a given operation
//! on a given key.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::domain::bundle::BUNDLE_KIND;
use crate::domain::chunk::CHUNK_KIND;
use crate::domain::{Bundle, Chunk, ObjectKey, Pod};
use crate::error::StoreError;
use crate::error::store::{already_exists, not_found};

use super::{ObjectStore, is_owned_by};

/// Store operation kinds, for the journal and fault injection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Get,
    List,
    Create,
    Delete,
}

/// One applied mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Create(ObjectKey),
    Delete(ObjectKey),
}

#[derive(Debug, Default)]
struct State {
    bundles: BTreeMap<ObjectKey, Bundle>,
    pods: BTreeMap<ObjectKey, Pod>,
    chunks: BTreeMap<ObjectKey, Chunk>,
    journal: Vec<Op>,
    faults: Vec<(OpKind, Option<ObjectKey>, StoreError)>,
    calls: usize,
}

/// In-memory store backed by a `RwLock<State>`
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_bundle(&self, bundle: Bundle) {
        let mut state = self.state.write().expect("lock poisoned");
        state.bundles.insert(bundle.key(), bundle);
    }

    pub fn put_pod(&self, pod: Pod) {
        let mut state = self.state.write().expect("lock poisoned");
        state.pods.insert(pod.metadata.key(), pod);
    }

    /// Seed a chunk without journaling it
    pub fn seed_chunk(&self, chunk: Chunk) {
        let mut state = self.state.write().expect("lock poisoned");
        state.chunks.insert(chunk.key(), chunk);
    }

    /// Fail the next `op` on `key` (any key when `None`) with `error`
    pub fn fail_on(&self, op: OpKind, key: Option<ObjectKey>, error: StoreError) {
        let mut state = self.state.write().expect("lock poisoned");
        state.faults.push((op, key, error));
    }

    pub fn chunks(&self) -> Vec<Chunk> {
        let state = self.state.read().expect("lock poisoned");
        state.chunks.values().cloned().collect()
    }

    pub fn journal(&self) -> Vec<Op> {
        let state = self.state.read().expect("lock poisoned");
        state.journal.clone()
    }

    pub fn clear_journal(&self) {
        let mut state = self.state.write().expect("lock poisoned");
        state.journal.clear();
    }

    /// Number of store calls made so far
    pub fn calls(&self) -> usize {
        let state = self.state.read().expect("lock poisoned");
        state.calls
    }

    fn check_fault(state: &mut State, op: OpKind, key: Option<&ObjectKey>) -> Result<(), StoreError> {
        state.calls += 1;
        let hit = state.faults.iter().position(|(fault_op, fault_key, _)| {
            *fault_op == op && (fault_key.is_none() || fault_key.as_ref() == key)
        });
        match hit {
            Some(index) => Err(state.faults.remove(index).2),
            None => Ok(()),
        }
    }
}

impl ObjectStore for MemoryStore {
    fn get_bundle(&self, key: &ObjectKey) -> Result<Option<Bundle>, StoreError> {
        let mut state = self.state.write().expect("lock poisoned");
        Self::check_fault(&mut state, OpKind::Get, Some(key))?;
        Ok(state.bundles.get(key).cloned())
    }

    fn get_pod(&self, key: &ObjectKey) -> Result<Option<Pod>, StoreError> {
        let mut state = self.state.write().expect("lock poisoned");
        Self::check_fault(&mut state, OpKind::Get, Some(key))?;
        Ok(state.pods.get(key).cloned())
    }

    fn list_chunks(
        &self,
        selector: &BTreeMap<String, String>,
        namespace: &str,
    ) -> Result<Vec<Chunk>, StoreError> {
        let mut state = self.state.write().expect("lock poisoned");
        Self::check_fault(&mut state, OpKind::List, None)?;
        Ok(state
            .chunks
            .values()
            .filter(|c| c.namespace() == namespace && c.metadata.matches_labels(selector))
            .cloned()
            .collect())
    }

    fn create_chunk(&self, chunk: &Chunk) -> Result<(), StoreError> {
        let key = chunk.key();
        let mut state = self.state.write().expect("lock poisoned");
        Self::check_fault(&mut state, OpKind::Create, Some(&key))?;
        if state.chunks.contains_key(&key) {
            return Err(already_exists(CHUNK_KIND, &key));
        }
        state.chunks.insert(key.clone(), chunk.clone());
        state.journal.push(Op::Create(key));
        Ok(())
    }

    fn delete_chunk(&self, key: &ObjectKey) -> Result<(), StoreError> {
        let mut state = self.state.write().expect("lock poisoned");
        Self::check_fault(&mut state, OpKind::Delete, Some(key))?;
        if state.chunks.remove(key).is_none() {
            return Err(not_found(CHUNK_KIND, key));
        }
        state.journal.push(Op::Delete(key.clone()));
        Ok(())
    }

    fn delete_bundle(&self, key: &ObjectKey) -> Result<usize, StoreError> {
        let mut state = self.state.write().expect("lock poisoned");
        Self::check_fault(&mut state, OpKind::Delete, Some(key))?;
        let uid = state
            .bundles
            .get(key)
            .map(|b| b.metadata.uid.clone())
            .ok_or_else(|| not_found(BUNDLE_KIND, key))?;
        let owned: Vec<ObjectKey> = state
            .chunks
            .values()
            .filter(|c| is_owned_by(c, &uid))
            .map(Chunk::key)
            .collect();

        for chunk_key in &owned {
            Self::check_fault(&mut state, OpKind::Delete, Some(chunk_key))?;
            state.chunks.remove(chunk_key);
            state.journal.push(Op::Delete(chunk_key.clone()));
        }
        state.bundles.remove(key);
        Ok(owned.len())
    }
}
