//! Delete command implementation
//!
//! Removes a bundle from the store together with every chunk it controls.

use std::path::PathBuf;

use console::Style;
use tracing::info;

use crate::cli::DeleteArgs;
use crate::commands::helpers::{bundle_key, open_store};
use crate::domain::ObjectKey;
use crate::error::Result;
use crate::error::bundle::not_found;
use crate::error::store::operation_failed;
use crate::store::ObjectStore;

/// Run delete command
pub fn run(store_dir: Option<PathBuf>, args: DeleteArgs) -> Result<()> {
    let key = bundle_key(&args.target)?;
    let store = open_store(store_dir)?;

    let removed = delete_bundle(&store, &key)?;
    println!(
        "{} bundle {} and {} chunk(s)",
        Style::new().bold().green().apply_to("Deleted"),
        Style::new().bold().yellow().apply_to(&key),
        removed
    );
    Ok(())
}

/// Delete the bundle at `key` and its chunks, returning how many chunks went
pub fn delete_bundle<S: ObjectStore + ?Sized>(store: &S, key: &ObjectKey) -> Result<usize> {
    info!(bundle = %key, "deleting bundle");
    match store.delete_bundle(key) {
        Ok(removed) => {
            info!(bundle = %key, chunks = removed, "bundle deleted");
            Ok(removed)
        }
        Err(e) if e.is_not_found() => Err(not_found(&key.namespace, &key.name)),
        Err(e) => Err(operation_failed("delete bundle", key, e)),
    }
}
