//! Desired-state builder
//!
//! Turns a bundle, its resolved image and the loaded manifest objects into
//! the set of chunks that should exist: one chunk per object, named after
//! the bundle and a prefix of the object's content hash.

use tracing::debug;

use crate::domain::chunk::{
    BINARY_OBJECT, BUNDLE_NAME_LABEL, DATA_BUNDLE_IMAGE, DATA_OBJECT_API_VERSION,
    DATA_OBJECT_KIND, DATA_OBJECT_NAME, DATA_OBJECT_NAMESPACE, DATA_OBJECT_SHA256, chunk_name,
};
use crate::domain::{Bundle, Chunk, ChunkSet};
use crate::encoding::{EncodedObject, encode};
use crate::error::store::operation_failed;
use crate::error::{Result, UnpackError};
use crate::manifest::ManifestObject;
use crate::store::ObjectStore;

/// Build the desired chunk set.
///
/// Two objects landing on the same chunk name abort the build: a
/// [`UnpackError::DuplicateObject`] when they are identical, a
/// [`UnpackError::NameCollision`] when only their hash prefixes match.
pub fn build_desired<S: ObjectStore + ?Sized>(
    store: &S,
    bundle: &Bundle,
    resolved_image: &str,
    objects: &[ManifestObject],
) -> Result<ChunkSet> {
    let mut desired = ChunkSet::new();

    for object in objects {
        let encoded = encode(object)?;
        let mut chunk = build_chunk(bundle, resolved_image, object, &encoded);
        store
            .link_lifecycle(bundle, &mut chunk)
            .map_err(|e| operation_failed("link lifecycle of", chunk.key(), e))?;

        debug!(
            chunk = %chunk.key(),
            kind = object.kind(),
            object = object.name(),
            "built desired chunk"
        );

        insert_unique(&mut desired, chunk, object)?;
    }

    Ok(desired)
}

/// Insert `chunk`, failing if its key is already taken
fn insert_unique(desired: &mut ChunkSet, chunk: Chunk, object: &ManifestObject) -> Result<()> {
    let key = chunk.key();
    let sha256 = chunk.sha256().unwrap_or_default().to_string();
    let Some(previous) = desired.insert(chunk) else {
        return Ok(());
    };

    let previous_sha256 = previous.sha256().unwrap_or_default().to_string();
    if previous_sha256 == sha256 {
        Err(UnpackError::DuplicateObject {
            name: key.name,
            kind: object.kind().to_string(),
            object_name: object.name().to_string(),
        })
    } else {
        Err(UnpackError::NameCollision {
            name: key.name,
            first_sha256: previous_sha256,
            second_sha256: sha256,
        })
    }
}

fn build_chunk(
    bundle: &Bundle,
    resolved_image: &str,
    object: &ManifestObject,
    encoded: &EncodedObject,
) -> Chunk {
    let mut chunk = Chunk::new(bundle.namespace(), chunk_name(bundle.name(), &encoded.sha256));
    chunk
        .metadata
        .labels
        .insert(BUNDLE_NAME_LABEL.to_string(), bundle.name().to_string());

    let data = [
        (DATA_BUNDLE_IMAGE, resolved_image),
        (DATA_OBJECT_SHA256, encoded.sha256.as_str()),
        (DATA_OBJECT_KIND, object.kind()),
        (DATA_OBJECT_API_VERSION, object.api_version()),
        (DATA_OBJECT_NAME, object.name()),
        (DATA_OBJECT_NAMESPACE, object.namespace()),
    ];
    for (key, value) in data {
        chunk.data.insert(key.to_string(), value.to_string());
    }

    chunk
        .binary_data
        .insert(BINARY_OBJECT.to_string(), encoded.compressed.clone());
    chunk
}
