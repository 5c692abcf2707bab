//! Test fixtures shared by the unit tests.
//!
//! ```ignore
//! use crate::test_fixtures::{create_temp_dir, sample_bundle, sample_pod};
//!
//! let dir = create_temp_dir();
//! write_manifest(dir.path(), "service.yaml", "kind: Service\n");
//! store.put_bundle(sample_bundle());
//! store.put_pod(sample_pod(BUNDLE_IMAGE, RESOLVED_IMAGE));
//! ```

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::domain::bundle::{ContainerStatus, PodStatus};
use crate::domain::{Bundle, ObjectMeta, Pod};

/// Image reference the sample bundle points at
pub const BUNDLE_IMAGE: &str = "quay.io/example/etcd-bundle:v0.9.4";

/// Digest reference the sample pod reports for [`BUNDLE_IMAGE`]
pub const RESOLVED_IMAGE: &str =
    "quay.io/example/etcd-bundle@sha256:3f5c1a9e0b7d2c4e6f8a0b1c3d5e7f9a1b3c5d7e9f0a2b4c6d8e0f1a3b5c7d9e";

/// Create a temp directory.
///
/// # Panics
///
/// Panics if the temp directory cannot be created.
#[must_use]
pub fn create_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Write a manifest file into `dir`, replacing any previous content.
///
/// # Panics
///
/// Panics if the file cannot be written.
pub fn write_manifest(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write manifest");
    path
}

/// Bundle `olm/etcd` pointing at [`BUNDLE_IMAGE`]
#[must_use]
pub fn sample_bundle() -> Bundle {
    Bundle::new("olm", "etcd", "6a1c0f52-etcd", BUNDLE_IMAGE)
}

/// Pod `olm/etcd-unpack` whose only container ran `image` as `image_id`
#[must_use]
pub fn sample_pod(image: &str, image_id: &str) -> Pod {
    Pod {
        metadata: ObjectMeta {
            name: "etcd-unpack".into(),
            namespace: "olm".into(),
            ..ObjectMeta::default()
        },
        status: PodStatus {
            init_container_statuses: vec![],
            container_statuses: vec![ContainerStatus {
                name: "bundle".into(),
                image: image.into(),
                image_id: image_id.into(),
            }],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_temp_dir() {
        let temp = create_temp_dir();
        assert!(temp.path().exists());
    }

    #[test]
    fn test_write_manifest_overwrites() {
        let temp = create_temp_dir();
        write_manifest(temp.path(), "a.yaml", "kind: A\n");
        let path = write_manifest(temp.path(), "a.yaml", "kind: B\n");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "kind: B\n");
    }

    #[test]
    fn test_sample_pod_reports_digest() {
        let pod = sample_pod(BUNDLE_IMAGE, RESOLVED_IMAGE);
        assert_eq!(pod.status.container_statuses[0].image_id, RESOLVED_IMAGE);
        assert_eq!(sample_bundle().image(), BUNDLE_IMAGE);
    }
}
