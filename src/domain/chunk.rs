//! Chunks: immutable, content-addressed storage units
//!
//! A [`Chunk`] holds one compressed manifest object in the wire shape of a
//! ConfigMap. Chunks are never updated in place; a changed object is
//! represented by deleting the old chunk and creating a new one.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::meta::{ObjectKey, ObjectMeta};

/// API version of chunks
pub const CHUNK_API_VERSION: &str = "v1";

/// Kind name of chunks
pub const CHUNK_KIND: &str = "ConfigMap";

/// Label identifying the bundle a chunk belongs to
pub const BUNDLE_NAME_LABEL: &str = "kuberpak.io/bundle-name";

/// Prefix of every chunk name
pub const CHUNK_NAME_PREFIX: &str = "bundle-object-";

/// Number of hash hex characters carried in a chunk name
pub const CHUNK_HASH_PREFIX_LEN: usize = 8;

/// Data keys
pub const DATA_BUNDLE_IMAGE: &str = "bundle-image";
pub const DATA_OBJECT_SHA256: &str = "object-sha256";
pub const DATA_OBJECT_KIND: &str = "object-kind";
pub const DATA_OBJECT_API_VERSION: &str = "object-apiversion";
pub const DATA_OBJECT_NAME: &str = "object-name";
pub const DATA_OBJECT_NAMESPACE: &str = "object-namespace";

/// Binary data key holding the compressed canonical object
pub const BINARY_OBJECT: &str = "object";

/// One stored manifest object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_kind")]
    pub kind: String,

    pub metadata: ObjectMeta,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub immutable: Option<bool>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, String>,

    #[serde(
        default,
        skip_serializing_if = "BTreeMap::is_empty",
        with = "base64_map"
    )]
    pub binary_data: BTreeMap<String, Vec<u8>>,
}

fn default_api_version() -> String {
    CHUNK_API_VERSION.to_string()
}

fn default_kind() -> String {
    CHUNK_KIND.to_string()
}

impl Chunk {
    /// An empty, immutable chunk at `namespace/name`
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            api_version: default_api_version(),
            kind: default_kind(),
            metadata: ObjectMeta {
                name: name.into(),
                namespace: namespace.into(),
                ..ObjectMeta::default()
            },
            immutable: Some(true),
            data: BTreeMap::new(),
            binary_data: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    pub fn key(&self) -> ObjectKey {
        self.metadata.key()
    }

    /// Content hash recorded in the chunk's data
    pub fn sha256(&self) -> Option<&str> {
        self.data.get(DATA_OBJECT_SHA256).map(String::as_str)
    }

    /// Compressed canonical object bytes
    pub fn payload(&self) -> Option<&[u8]> {
        self.binary_data.get(BINARY_OBJECT).map(Vec::as_slice)
    }

    /// Structural equality over the content that decides whether a stored
    /// chunk can be kept: labels, annotations, data and binary data.
    ///
    /// Name, namespace, owner references and the immutable flag are not
    /// compared; the key is already equal when this is asked, and the
    /// remaining fields are not content.
    pub fn content_eq(&self, other: &Chunk) -> bool {
        maps_equal(&self.metadata.labels, &other.metadata.labels)
            && maps_equal(&self.metadata.annotations, &other.metadata.annotations)
            && maps_equal(&self.data, &other.data)
            && maps_equal(&self.binary_data, &other.binary_data)
    }
}

fn maps_equal<V: PartialEq>(a: &BTreeMap<String, V>, b: &BTreeMap<String, V>) -> bool {
    a.len() == b.len() && a.iter().all(|(k, va)| b.get(k).is_some_and(|vb| va == vb))
}

/// Builds the chunk name for a bundle and a full content hash
pub fn chunk_name(bundle_name: &str, sha256_hex: &str) -> String {
    let prefix_len = CHUNK_HASH_PREFIX_LEN.min(sha256_hex.len());
    format!(
        "{}{}-{}",
        CHUNK_NAME_PREFIX,
        bundle_name,
        &sha256_hex[..prefix_len]
    )
}

/// Label selector matching every chunk of a bundle
pub fn bundle_selector(bundle_name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(BUNDLE_NAME_LABEL.to_string(), bundle_name.to_string())])
}

/// A set of chunks keyed by `(namespace, name)`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkSet {
    chunks: BTreeMap<ObjectKey, Chunk>,
}

impl ChunkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a chunk, returning the chunk previously stored at its key
    pub fn insert(&mut self, chunk: Chunk) -> Option<Chunk> {
        self.chunks.insert(chunk.key(), chunk)
    }

    pub fn get(&self, key: &ObjectKey) -> Option<&Chunk> {
        self.chunks.get(key)
    }

    pub fn contains(&self, key: &ObjectKey) -> bool {
        self.chunks.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ObjectKey> {
        self.chunks.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    /// Per-key content equality with another set
    pub fn content_eq(&self, other: &ChunkSet) -> bool {
        self.len() == other.len()
            && self
                .chunks
                .iter()
                .all(|(k, c)| other.get(k).is_some_and(|o| c.content_eq(o)))
    }
}

impl FromIterator<Chunk> for ChunkSet {
    fn from_iter<I: IntoIterator<Item = Chunk>>(iter: I) -> Self {
        let mut set = ChunkSet::new();
        for chunk in iter {
            set.insert(chunk);
        }
        set
    }
}

impl IntoIterator for ChunkSet {
    type Item = Chunk;
    type IntoIter = std::collections::btree_map::IntoValues<ObjectKey, Chunk>;

    fn into_iter(self) -> Self::IntoIter {
        self.chunks.into_values()
    }
}

/// Binary data travels as standard base64 strings
mod base64_map {
    use std::collections::BTreeMap;

    use base64::prelude::{BASE64_STANDARD, Engine as _};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(map: &BTreeMap<String, Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(map.iter().map(|(k, v)| (k, BASE64_STANDARD.encode(v))))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = BTreeMap::<String, String>::deserialize(deserializer)?;
        encoded
            .into_iter()
            .map(|(k, v)| {
                BASE64_STANDARD
                    .decode(v.as_bytes())
                    .map(|bytes| (k, bytes))
                    .map_err(D::Error::custom)
            })
            .collect()
    }
}
