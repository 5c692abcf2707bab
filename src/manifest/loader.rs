//! Manifest loading from a flat directory
//!
//! Each regular file in the directory holds a stream of zero or more YAML or
//! JSON documents. Files are read in name order, documents in stream order.
//! Subdirectories are skipped. The first malformed document aborts the load.

use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::Result;
use crate::error::manifest::{decode_failed, read_failed};

use super::ManifestObject;

/// Load every manifest object found directly under `dir`
pub fn load_manifests(dir: &Path) -> Result<Vec<ManifestObject>> {
    let mut objects = Vec::new();

    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry = entry.map_err(|e| read_failed(dir.display().to_string(), e.to_string()))?;
        if entry.file_type().is_dir() {
            debug!(path = %entry.path().display(), "skipping directory");
            continue;
        }

        let path = entry.path();
        let content = std::fs::read(path)
            .map_err(|e| read_failed(path.display().to_string(), e.to_string()))?;

        let decoded = decode_stream(&path.display().to_string(), &content)?;
        debug!(path = %path.display(), documents = decoded.len(), "decoded manifest file");
        objects.extend(decoded);
    }

    Ok(objects)
}

/// Decode a YAML-or-JSON document stream from one file
pub fn decode_stream(path: &str, content: &[u8]) -> Result<Vec<ManifestObject>> {
    let values = if looks_like_json(content) {
        decode_json_stream(path, content)?
    } else {
        decode_yaml_stream(path, content)?
    };

    let mut objects = Vec::with_capacity(values.len());
    for (index, value) in values {
        if value.is_null() {
            continue;
        }
        let object =
            ManifestObject::from_value(value).map_err(|reason| decode_failed(path, index, reason))?;
        objects.push(object);
    }
    Ok(objects)
}

fn looks_like_json(content: &[u8]) -> bool {
    content
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| *b == b'{' || *b == b'[')
}

fn decode_yaml_stream(path: &str, content: &[u8]) -> Result<Vec<(usize, Value)>> {
    let mut values = Vec::new();
    for (index, document) in serde_yaml::Deserializer::from_slice(content).enumerate() {
        let value = Value::deserialize(document).map_err(|e| decode_failed(path, index, e.to_string()))?;
        values.push((index, value));
    }
    Ok(values)
}

fn decode_json_stream(path: &str, content: &[u8]) -> Result<Vec<(usize, Value)>> {
    let mut values = Vec::new();
    let stream = serde_json::Deserializer::from_slice(content).into_iter::<serde_json::Value>();
    for (index, document) in stream.enumerate() {
        let json = document.map_err(|e| decode_failed(path, index, e.to_string()))?;
        let value =
            serde_yaml::to_value(json).map_err(|e| decode_failed(path, index, e.to_string()))?;
        values.push((index, value));
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UnpackError;
    use crate::test_fixtures::create_temp_dir;

    const DEPLOYMENT_AND_SERVICE: &str = r"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: etcd-operator
  namespace: operators
---
apiVersion: v1
kind: Service
metadata:
  name: etcd-operator
  namespace: operators
";

    #[test]
    fn test_load_two_documents_from_one_file() {
        let temp = create_temp_dir();
        std::fs::write(temp.path().join("manifests.yaml"), DEPLOYMENT_AND_SERVICE).unwrap();

        let objects = load_manifests(temp.path()).unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].kind(), "Deployment");
        assert_eq!(objects[1].kind(), "Service");
    }

    #[test]
    fn test_files_are_read_in_name_order() {
        let temp = create_temp_dir();
        std::fs::write(temp.path().join("b.yaml"), "kind: B\n").unwrap();
        std::fs::write(temp.path().join("a.yaml"), "kind: A1\n---\nkind: A2\n").unwrap();
        std::fs::write(temp.path().join("c.json"), r#"{"kind": "C"}"#).unwrap();

        let kinds: Vec<String> = load_manifests(temp.path())
            .unwrap()
            .iter()
            .map(|o| o.kind().to_string())
            .collect();
        assert_eq!(kinds, vec!["A1", "A2", "B", "C"]);
    }

    #[test]
    fn test_directories_are_skipped() {
        let temp = create_temp_dir();
        std::fs::create_dir(temp.path().join("nested")).unwrap();
        std::fs::write(temp.path().join("nested/ignored.yaml"), "kind: Ignored\n").unwrap();
        std::fs::write(temp.path().join("top.yaml"), "kind: Top\n").unwrap();

        let objects = load_manifests(temp.path()).unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].kind(), "Top");
    }

    #[test]
    fn test_empty_directory_and_empty_files() {
        let temp = create_temp_dir();
        assert!(load_manifests(temp.path()).unwrap().is_empty());

        std::fs::write(temp.path().join("empty.yaml"), "").unwrap();
        std::fs::write(temp.path().join("separators.yaml"), "---\n---\n").unwrap();
        assert!(load_manifests(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_json_stream_of_objects() {
        let objects = decode_stream(
            "objs.json",
            br#"{"kind": "A", "apiVersion": "v1"} {"kind": "B"}"#,
        )
        .unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].api_version(), "v1");
        assert_eq!(objects[1].kind(), "B");
    }

    #[test]
    fn test_json_array_is_a_decode_error() {
        let err = decode_stream("list.json", br#"[{"kind": "A"}]"#).unwrap_err();
        assert!(matches!(err, UnpackError::ManifestDecode { index: 0, .. }));
    }

    #[test]
    fn test_malformed_document_fails_fast_with_path_and_index() {
        let temp = create_temp_dir();
        std::fs::write(
            temp.path().join("broken.yaml"),
            "kind: Good\n---\nkind: [unclosed\n---\nkind: NeverSeen\n",
        )
        .unwrap();

        let err = load_manifests(temp.path()).unwrap_err();
        match err {
            UnpackError::ManifestDecode { path, index, .. } => {
                assert!(path.ends_with("broken.yaml"));
                assert_eq!(index, 1);
            }
            other => panic!("expected ManifestDecode, got {other:?}"),
        }
    }

    #[test]
    fn test_document_without_kind_is_rejected() {
        let err = decode_stream("x.yaml", b"apiVersion: v1\nmetadata:\n  name: x\n").unwrap_err();
        assert!(err.to_string().contains("'kind' is missing"));
    }

    #[test]
    fn test_missing_directory_is_a_read_error() {
        let temp = create_temp_dir();
        let err = load_manifests(&temp.path().join("absent")).unwrap_err();
        assert!(matches!(err, UnpackError::ManifestRead { .. }));
    }
}
