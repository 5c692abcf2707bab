//! Unpack pipeline
//!
//! One invocation unpacks one bundle: fetch the Bundle and the pod that
//! pulled its image, resolve the image digest, load the manifests, build the
//! desired chunk set and reconcile the stored chunks against it.

use std::path::PathBuf;

use tracing::info;

use crate::desired::build_desired;
use crate::domain::{ChunkSet, ObjectKey};
use crate::domain::chunk::bundle_selector;
use crate::error::{Result, UnpackError};
use crate::error::bundle::{not_found, pod_not_found};
use crate::error::store::operation_failed;
use crate::manifest::load_manifests;
use crate::reconcile::{CancelToken, ReconcileReport, Reconciler};
use crate::resolve::resolve_image_digest;
use crate::store::ObjectStore;

/// What to unpack
#[derive(Debug, Clone)]
pub struct UnpackRequest {
    pub namespace: String,
    pub pod_name: String,
    pub bundle_name: String,
    pub manifests_dir: PathBuf,
}

/// Runs the pipeline against an injected store
pub struct Unpacker<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
    cancel: CancelToken,
}

impl<'a, S: ObjectStore + ?Sized> Unpacker<'a, S> {
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

    /// Nothing has been applied before reconciliation starts.
    fn checkpoint(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(UnpackError::Cancelled { applied: 0 });
        }
        Ok(())
    }

    /// Unpack the bundle described by `request`.
    ///
    /// Every failure before reconciliation happens without touching any
    /// chunk.
    pub fn run(&self, request: &UnpackRequest) -> Result<ReconcileReport> {
        let namespace = request.namespace.as_str();

        info!(namespace, bundle = %request.bundle_name, "getting bundle");
        let bundle_key = ObjectKey::new(namespace, &request.bundle_name);
        self.checkpoint()?;
        let bundle = self
            .store
            .get_bundle(&bundle_key)
            .map_err(|e| operation_failed("get bundle", &bundle_key, e))?
            .ok_or_else(|| not_found(namespace, &request.bundle_name))?;

        info!(namespace, pod = %request.pod_name, image = bundle.image(), "getting image digest");
        let pod_key = ObjectKey::new(namespace, &request.pod_name);
        self.checkpoint()?;
        let pod = self
            .store
            .get_pod(&pod_key)
            .map_err(|e| operation_failed("get pod", &pod_key, e))?
            .ok_or_else(|| pod_not_found(namespace, &request.pod_name))?;
        let resolved_image = resolve_image_digest(&pod, bundle.image())?;

        info!(dir = %request.manifests_dir.display(), "loading manifests");
        let objects = load_manifests(&request.manifests_dir)?;

        info!(objects = objects.len(), image = %resolved_image, "building desired chunks");
        self.checkpoint()?;
        let desired = build_desired(self.store, &bundle, &resolved_image, &objects)?;

        info!(namespace, bundle = bundle.name(), "listing actual chunks");
        self.checkpoint()?;
        let actual: ChunkSet = self
            .store
            .list_chunks(&bundle_selector(bundle.name()), namespace)
            .map_err(|e| operation_failed("list chunks of", &bundle_key, e))?
            .into_iter()
            .collect();

        info!(desired = desired.len(), "reconciling");
        let report = Reconciler::new(self.store)
            .with_cancel(self.cancel.clone())
            .reconcile(&desired, &actual)?;

        info!(
            bundle = %bundle_key,
            created = report.created,
            deleted = report.deleted,
            unchanged = report.unchanged,
            "bundle unpacked"
        );
        Ok(report)
    }
}
