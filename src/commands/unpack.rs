//! Unpack command implementation

use std::path::PathBuf;

use console::Style;

use crate::cli::UnpackArgs;
use crate::commands::helpers::{bundle_key, open_store};
use crate::config::{validate_manifests_dir, validate_name};
use crate::error::Result;
use crate::unpack::{UnpackRequest, Unpacker};

/// Run unpack command
pub fn run(store_dir: Option<PathBuf>, args: UnpackArgs) -> Result<()> {
    let key = bundle_key(&args.target)?;
    validate_name("pod name", &args.pod_name)?;
    validate_manifests_dir(&args.manifests_dir)?;

    let store = open_store(store_dir)?;
    let request = UnpackRequest {
        namespace: args.target.namespace,
        pod_name: args.pod_name,
        bundle_name: args.target.bundle_name,
        manifests_dir: args.manifests_dir,
    };
    let report = Unpacker::new(&store).run(&request)?;

    println!(
        "{} bundle {} ({} created, {} deleted, {} unchanged)",
        Style::new().bold().green().apply_to("Unpacked"),
        Style::new().bold().yellow().apply_to(&key),
        report.created,
        report.deleted,
        report.unchanged
    );
    Ok(())
}
