//! Command helper utilities

use std::path::PathBuf;

use tracing::debug;

use crate::cli::BundleTarget;
use crate::config::{store_dir, validate_bundle_name, validate_name};
use crate::domain::ObjectKey;
use crate::error::Result;
use crate::store::DirStore;

/// Open the directory store rooted at `explicit`, or at the default root
pub fn open_store(explicit: Option<PathBuf>) -> Result<DirStore> {
    let root = store_dir(explicit)?;
    debug!(root = %root.display(), "opening store");
    Ok(DirStore::new(root))
}

/// Validate the bundle target and return the bundle's key
pub fn bundle_key(target: &BundleTarget) -> Result<ObjectKey> {
    validate_name("namespace", &target.namespace)?;
    validate_bundle_name(&target.bundle_name)?;
    Ok(ObjectKey::new(&target.namespace, &target.bundle_name))
}
