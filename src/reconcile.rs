//! Reconciler: converge the stored chunk set to the desired chunk set
//!
//! Reconciliation runs in two steps. [`plan`] is pure: it diffs the desired
//! set against the actual set and returns the actions needed. [`Reconciler::apply`]
//! executes those actions against the store, one at a time.
//!
//! The run is not transactional. If a step fails, earlier steps stay
//! applied and the error is returned; running the whole reconciliation again
//! recomputes the diff from whatever state resulted and converges further.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info};

use crate::domain::{Chunk, ChunkSet, ObjectKey};
use crate::error::{Result, StoreError, UnpackError};
use crate::store::ObjectStore;

/// Cooperative cancellation flag, checked before every store call
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// One step towards the desired state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The stored chunk already matches
    Keep(ObjectKey),
    /// No chunk is stored at the key
    Create(Chunk),
    /// A chunk with different content is stored at the key. The stale chunk
    /// is deleted before the desired one is created.
    Replace { stale: ObjectKey, desired: Chunk },
    /// The stored chunk is no longer desired
    Delete(ObjectKey),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Keep(key) => write!(f, "keep {key}"),
            Action::Create(chunk) => write!(f, "create {}", chunk.key()),
            Action::Replace { stale, .. } => write!(f, "replace {stale}"),
            Action::Delete(key) => write!(f, "delete {key}"),
        }
    }
}

/// Ordered list of actions produced by [`plan`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub actions: Vec<Action>,
}

impl Plan {
    /// Whether applying the plan would change nothing
    pub fn is_noop(&self) -> bool {
        self.actions.iter().all(|a| matches!(a, Action::Keep(_)))
    }

    /// Number of creates the plan will issue
    pub fn creates(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, Action::Create(_) | Action::Replace { .. }))
            .count()
    }

    /// Number of deletes the plan will issue
    pub fn deletes(&self) -> usize {
        self.actions
            .iter()
            .filter(|a| matches!(a, Action::Delete(_) | Action::Replace { .. }))
            .count()
    }
}

/// Outcome of a successful reconciliation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: usize,
    pub deleted: usize,
    pub unchanged: usize,
}

/// Diff `desired` against `actual`.
///
/// Desired chunks are visited in key order, followed by the garbage
/// collection sweep over stale keys, also in key order.
pub fn plan(desired: &ChunkSet, actual: &ChunkSet) -> Plan {
    let mut remaining: BTreeMap<&ObjectKey, &Chunk> =
        actual.keys().zip(actual.iter()).collect();
    let mut actions = Vec::with_capacity(desired.len() + remaining.len());

    for chunk in desired.iter() {
        let key = chunk.key();
        match remaining.remove(&key) {
            Some(existing) if existing.content_eq(chunk) => actions.push(Action::Keep(key)),
            Some(_) => actions.push(Action::Replace {
                stale: key,
                desired: chunk.clone(),
            }),
            None => actions.push(Action::Create(chunk.clone())),
        }
    }

    actions.extend(remaining.into_keys().map(|key| Action::Delete(key.clone())));
    Plan { actions }
}

/// Applies plans against an injected store
pub struct Reconciler<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
    cancel: CancelToken,
}

impl<'a, S: ObjectStore + ?Sized> Reconciler<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Plan and apply in one go
    pub fn reconcile(&self, desired: &ChunkSet, actual: &ChunkSet) -> Result<ReconcileReport> {
        let plan = plan(desired, actual);
        info!(
            creates = plan.creates(),
            deletes = plan.deletes(),
            total = plan.actions.len(),
            "planned reconciliation"
        );
        self.apply(&plan)
    }

    /// Execute `plan` step by step, stopping at the first failure
    pub fn apply(&self, plan: &Plan) -> Result<ReconcileReport> {
        let mut run = Run {
            store: self.store,
            cancel: &self.cancel,
            report: ReconcileReport::default(),
            applied: 0,
        };

        for action in &plan.actions {
            match action {
                Action::Keep(key) => {
                    debug!(chunk = %key, "chunk up to date");
                    run.report.unchanged += 1;
                }
                Action::Create(chunk) => run.create(chunk)?,
                Action::Replace { stale, desired } => {
                    run.delete(stale)?;
                    run.create(desired)?;
                }
                Action::Delete(key) => run.delete(key)?,
            }
        }

        Ok(run.report)
    }
}

struct Run<'r, S: ObjectStore + ?Sized> {
    store: &'r S,
    cancel: &'r CancelToken,
    report: ReconcileReport,
    applied: usize,
}

impl<S: ObjectStore + ?Sized> Run<'_, S> {
    fn checkpoint(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(UnpackError::Cancelled {
                applied: self.applied,
            });
        }
        Ok(())
    }

    fn create(&mut self, chunk: &Chunk) -> Result<()> {
        self.checkpoint()?;
        let key = chunk.key();
        self.store
            .create_chunk(chunk)
            .map_err(|e| self.failure("create chunk", &key, e))?;
        debug!(chunk = %key, "created chunk");
        self.applied += 1;
        self.report.created += 1;
        Ok(())
    }

    fn delete(&mut self, key: &ObjectKey) -> Result<()> {
        self.checkpoint()?;
        match self.store.delete_chunk(key) {
            Ok(()) => {
                debug!(chunk = %key, "deleted chunk");
                self.applied += 1;
                self.report.deleted += 1;
            }
            // Already at the desired state; nothing was removed.
            Err(e) if e.is_not_found() => debug!(chunk = %key, "chunk already gone"),
            Err(e) => return Err(self.failure("delete chunk", key, e)),
        }
        Ok(())
    }

    fn failure(&self, operation: &str, key: &ObjectKey, source: StoreError) -> UnpackError {
        UnpackError::Reconcile {
            operation: operation.to_string(),
            key: key.to_string(),
            applied: self.applied,
            source,
        }
    }
}
