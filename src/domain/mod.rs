//! Domain models for kuberpak-unpack
//!
//! This module contains pure domain objects: the bundle being unpacked, the
//! pod reporting its image digest, and the chunks that store its manifests.

pub mod bundle;
pub mod chunk;
pub mod meta;

pub use bundle::{Bundle, ContainerStatus, Pod};
pub use chunk::{Chunk, ChunkSet};
pub use meta::{ObjectKey, ObjectMeta, OwnerReference};
