//! Canonical encoding, SHA-256 content hashing and gzip compression
//!
//! The canonical form of a manifest object is its value tree with every
//! mapping's keys sorted, serialized as YAML. The same logical object always
//! yields the same bytes, whatever the key order or format of its source.

use std::cmp::Ordering;
use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serde_yaml::{Mapping, Value};
use sha2::{Digest, Sha256};

use crate::error::Result;
use crate::error::manifest::encode_failed;
use crate::manifest::ManifestObject;

/// A manifest object in stored form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedObject {
    /// Canonical YAML bytes
    pub canonical: Vec<u8>,
    /// Lowercase hex SHA-256 of `canonical`
    pub sha256: String,
    /// Gzip-compressed `canonical`
    pub compressed: Vec<u8>,
}

/// Encode one object: canonical bytes, hash, compressed copy
pub fn encode(object: &ManifestObject) -> Result<EncodedObject> {
    let canonical = canonical_bytes(object.value())
        .map_err(|e| encode_failed(object.kind(), object.name(), e.to_string()))?;
    let sha256 = sha256_hex(&canonical);
    let compressed = compress(&canonical)
        .map_err(|e| encode_failed(object.kind(), object.name(), e.to_string()))?;
    Ok(EncodedObject {
        canonical,
        sha256,
        compressed,
    })
}

/// Serialize a value with recursively sorted mapping keys
pub fn canonical_bytes(value: &Value) -> std::result::Result<Vec<u8>, serde_yaml::Error> {
    let mut sorted = value.clone();
    sort_value(&mut sorted);
    Ok(serde_yaml::to_string(&sorted)?.into_bytes())
}

/// Lowercase hex SHA-256 of `bytes`
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Gzip `bytes`. The header carries no file name and a zero mtime, so the
/// output depends only on the input.
pub fn compress(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes)?;
    encoder.finish()
}

/// Inverse of [`compress`]
pub fn decompress(bytes: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut decoded = Vec::new();
    GzDecoder::new(bytes).read_to_end(&mut decoded)?;
    Ok(decoded)
}

fn sort_value(value: &mut Value) {
    match value {
        Value::Mapping(map) => {
            let mut entries: Vec<(Value, Value)> = std::mem::take(map).into_iter().collect();
            entries.sort_by(|a, b| compare_keys(&a.0, &b.0));
            let mut sorted = Mapping::with_capacity(entries.len());
            for (k, mut v) in entries {
                sort_value(&mut v);
                sorted.insert(k, v);
            }
            *map = sorted;
        }
        Value::Sequence(items) => {
            for item in items {
                sort_value(item);
            }
        }
        Value::Tagged(tagged) => sort_value(&mut tagged.value),
        _ => {}
    }
}

/// String keys sort lexicographically ahead of any other key; other keys
/// sort by their YAML rendering.
fn compare_keys(a: &Value, b: &Value) -> Ordering {
    match (a.as_str(), b.as_str()) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => render_key(a).cmp(&render_key(b)),
    }
}

fn render_key(key: &Value) -> String {
    serde_yaml::to_string(key).unwrap_or_default()
}
