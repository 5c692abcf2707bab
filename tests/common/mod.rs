//! Common test utilities for kuberpak-unpack integration tests

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

pub const NAMESPACE: &str = "olm";
pub const BUNDLE: &str = "etcd";
pub const POD: &str = "etcd-unpack";
pub const BUNDLE_IMAGE: &str = "quay.io/example/etcd-bundle:v0.9.4";
pub const RESOLVED_IMAGE: &str = "quay.io/example/etcd-bundle@sha256:8d4b8c2e6a1f0b3c5d7e9f1a2b4c6d8e0f1a3b5c7d9e1f2a4b6c8d0e2f4a6b8c";

pub const DEPLOYMENT: &str = "apiVersion: apps/v1
kind: Deployment
metadata:
  name: etcd-operator
  namespace: olm
spec:
  replicas: 1
";

pub const SERVICE: &str = "apiVersion: v1
kind: Service
metadata:
  name: etcd
  namespace: olm
";

/// A store directory and a manifests directory, both temporary
pub struct TestEnv {
    #[allow(dead_code)]
    pub temp: TempDir,
    pub store: PathBuf,
    pub manifests: PathBuf,
}

impl TestEnv {
    /// Create the directories and seed the sample bundle and its pod
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let store = temp.path().join("store");
        let manifests = temp.path().join("manifests");
        std::fs::create_dir_all(&manifests).expect("Failed to create manifests directory");

        let env = Self {
            temp,
            store,
            manifests,
        };
        env.put_bundle(BUNDLE, "a3f1c2d4-etcd", BUNDLE_IMAGE);
        env.put_pod(POD, BUNDLE_IMAGE, RESOLVED_IMAGE);
        env
    }

    pub fn put_bundle(&self, name: &str, uid: &str, image: &str) {
        self.write_object(
            "bundles",
            name,
            &format!(
                "apiVersion: kuberpak.io/v1alpha1\nkind: Bundle\nmetadata:\n  name: {name}\n  \
                 namespace: {NAMESPACE}\n  uid: {uid}\nspec:\n  image: {image}\n"
            ),
        );
    }

    pub fn put_pod(&self, name: &str, image: &str, image_id: &str) {
        self.write_object(
            "pods",
            name,
            &format!(
                "apiVersion: v1\nkind: Pod\nmetadata:\n  name: {name}\n  namespace: {NAMESPACE}\n\
                 status:\n  containerStatuses:\n  - name: bundle\n    image: {image}\n    \
                 imageID: \"{image_id}\"\n"
            ),
        );
    }

    fn write_object(&self, kind_dir: &str, name: &str, yaml: &str) {
        let dir = self.store.join(kind_dir).join(NAMESPACE);
        std::fs::create_dir_all(&dir).expect("Failed to create store directory");
        std::fs::write(dir.join(format!("{name}.yaml")), yaml).expect("Failed to write object");
    }

    /// Write a manifest file, replacing any previous content
    pub fn write_manifest(&self, name: &str, content: &str) {
        std::fs::write(self.manifests.join(name), content).expect("Failed to write manifest");
    }

    pub fn remove_manifest(&self, name: &str) {
        std::fs::remove_file(self.manifests.join(name)).expect("Failed to remove manifest");
    }

    /// Directory holding the chunk files
    pub fn chunk_dir(&self) -> PathBuf {
        self.store.join("configmaps").join(NAMESPACE)
    }

    /// Sorted chunk file names, without extension
    pub fn chunk_names(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.chunk_dir()) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "yaml"))
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect();
        names.sort();
        names
    }

    pub fn read_chunk(&self, name: &str) -> String {
        std::fs::read_to_string(self.chunk_dir().join(format!("{name}.yaml")))
            .expect("Failed to read chunk")
    }

    /// The binary with the store directory and bundle target preset
    pub fn cmd(&self, subcommand: &str) -> Command {
        let mut cmd = kuberpak_cmd();
        cmd.arg(subcommand)
            .arg("--store-dir")
            .arg(&self.store)
            .args(["--namespace", NAMESPACE, "--bundle-name", BUNDLE]);
        cmd
    }

    /// `unpack` with every flag set
    pub fn unpack(&self) -> Command {
        let mut cmd = self.cmd("unpack");
        cmd.args(["--pod-name", POD]).arg("--manifests-dir").arg(&self.manifests);
        cmd
    }
}

/// The binary with every `KUBERPAK_*` variable cleared
#[allow(deprecated)]
pub fn kuberpak_cmd() -> Command {
    let mut cmd = Command::cargo_bin("kuberpak-unpack").expect("binary should be built");
    for var in [
        "KUBERPAK_NAMESPACE",
        "KUBERPAK_POD_NAME",
        "KUBERPAK_BUNDLE_NAME",
        "KUBERPAK_MANIFESTS_DIR",
        "KUBERPAK_STORE_DIR",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}
