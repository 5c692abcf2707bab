//! List command implementation
//!
//! This command lists the chunks stored for a bundle, with the object each
//! chunk holds and its content hash. With `--verify` every payload is
//! decompressed and re-hashed.

use std::path::PathBuf;

use console::Style;
use serde::Serialize;
use tracing::warn;

use crate::cli::ListArgs;
use crate::commands::helpers::{bundle_key, open_store};
use crate::domain::chunk::{
    CHUNK_HASH_PREFIX_LEN, DATA_OBJECT_KIND, DATA_OBJECT_NAME, DATA_OBJECT_NAMESPACE,
    bundle_selector,
};
use crate::domain::{Chunk, ObjectKey};
use crate::encoding::{decompress, sha256_hex};
use crate::error::store::operation_failed;
use crate::error::{Result, UnpackError};
use crate::store::ObjectStore;

/// One listed chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkEntry {
    pub name: String,
    pub kind: String,
    pub object_name: String,
    pub object_namespace: String,
    pub sha256: String,
    pub compressed_bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
}

/// Run list command
pub fn run(store_dir: Option<PathBuf>, args: ListArgs) -> Result<()> {
    let key = bundle_key(&args.target)?;
    let store = open_store(store_dir)?;
    let entries = list_entries(&store, &key, args.verify)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        display_entries(&key, &entries);
    }

    let failed = entries.iter().filter(|e| e.verified == Some(false)).count();
    if failed > 0 {
        return Err(UnpackError::VerifyFailed { count: failed });
    }
    Ok(())
}

/// Collect the chunks labeled with the bundle's name, in name order
pub fn list_entries<S: ObjectStore + ?Sized>(
    store: &S,
    bundle: &ObjectKey,
    verify: bool,
) -> Result<Vec<ChunkEntry>> {
    let mut chunks = store
        .list_chunks(&bundle_selector(&bundle.name), &bundle.namespace)
        .map_err(|e| operation_failed("list chunks of", bundle, e))?;
    chunks.sort_by(|a, b| a.name().cmp(b.name()));

    Ok(chunks
        .iter()
        .map(|chunk| {
            let mut entry = entry_for(chunk);
            if verify {
                entry.verified = Some(verify_payload(chunk));
            }
            entry
        })
        .collect())
}

fn entry_for(chunk: &Chunk) -> ChunkEntry {
    let field = |key: &str| chunk.data.get(key).cloned().unwrap_or_default();
    ChunkEntry {
        name: chunk.name().to_string(),
        kind: field(DATA_OBJECT_KIND),
        object_name: field(DATA_OBJECT_NAME),
        object_namespace: field(DATA_OBJECT_NAMESPACE),
        sha256: chunk.sha256().unwrap_or_default().to_string(),
        compressed_bytes: chunk.payload().map_or(0, <[u8]>::len),
        verified: None,
    }
}

/// Whether the payload decompresses to bytes hashing to the recorded digest
fn verify_payload(chunk: &Chunk) -> bool {
    let (Some(payload), Some(expected)) = (chunk.payload(), chunk.sha256()) else {
        warn!(chunk = %chunk.key(), "chunk has no payload or recorded hash");
        return false;
    };
    match decompress(payload) {
        Ok(bytes) if sha256_hex(&bytes) == expected => true,
        Ok(_) => {
            warn!(chunk = %chunk.key(), "payload hash does not match");
            false
        }
        Err(e) => {
            warn!(chunk = %chunk.key(), error = %e, "payload does not decompress");
            false
        }
    }
}

fn display_entries(bundle: &ObjectKey, entries: &[ChunkEntry]) {
    if entries.is_empty() {
        println!("No chunks stored for bundle {bundle}.");
        return;
    }

    println!("Chunks of bundle {} ({}):", bundle, entries.len());
    println!();
    for entry in entries {
        let object = if entry.object_namespace.is_empty() {
            entry.object_name.clone()
        } else {
            format!("{}/{}", entry.object_namespace, entry.object_name)
        };
        let hash_prefix = entry.sha256.get(..CHUNK_HASH_PREFIX_LEN).unwrap_or(&entry.sha256);
        let status = match entry.verified {
            Some(true) => Style::new().green().apply_to(" ok").to_string(),
            Some(false) => Style::new().red().bold().apply_to(" MISMATCH").to_string(),
            None => String::new(),
        };

        println!("  {}{}", Style::new().bold().yellow().apply_to(&entry.name), status);
        println!(
            "    {} {} {}",
            Style::new().bold().apply_to("Object:"),
            Style::new().cyan().apply_to(&entry.kind),
            object
        );
        println!(
            "    {} {} {}",
            Style::new().bold().apply_to("Hash:"),
            hash_prefix,
            Style::new().dim().apply_to(format!("({} bytes compressed)", entry.compressed_bytes))
        );
    }
}
