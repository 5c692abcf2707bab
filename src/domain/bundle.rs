//! Bundle and pod domain types
//!
//! A [`Bundle`] names the image whose manifests are unpacked. The [`Pod`]
//! running that image reports the resolved image digest in its status.

use serde::{Deserialize, Serialize};

use super::meta::{ObjectKey, ObjectMeta, OwnerReference};

/// API version of the Bundle kind
pub const BUNDLE_API_VERSION: &str = "kuberpak.io/v1alpha1";

/// Kind name of bundles
pub const BUNDLE_KIND: &str = "Bundle";

/// Kind name of pods
pub const POD_KIND: &str = "Pod";

/// A logical package to unpack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    #[serde(default = "default_bundle_api_version")]
    pub api_version: String,

    #[serde(default = "default_bundle_kind")]
    pub kind: String,

    pub metadata: ObjectMeta,

    pub spec: BundleSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleSpec {
    /// Image reference the bundle is delivered in
    pub image: String,
}

fn default_bundle_api_version() -> String {
    BUNDLE_API_VERSION.to_string()
}

fn default_bundle_kind() -> String {
    BUNDLE_KIND.to_string()
}

impl Bundle {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        uid: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            api_version: default_bundle_api_version(),
            kind: default_bundle_kind(),
            metadata: ObjectMeta {
                name: name.into(),
                namespace: namespace.into(),
                uid: uid.into(),
                ..ObjectMeta::default()
            },
            spec: BundleSpec {
                image: image.into(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn namespace(&self) -> &str {
        &self.metadata.namespace
    }

    pub fn image(&self) -> &str {
        &self.spec.image
    }

    pub fn key(&self) -> ObjectKey {
        self.metadata.key()
    }

    /// Controller owner reference pointing at this bundle
    pub fn controller_reference(&self) -> OwnerReference {
        OwnerReference {
            api_version: self.api_version.clone(),
            kind: self.kind.clone(),
            name: self.metadata.name.clone(),
            uid: self.metadata.uid.clone(),
            controller: Some(true),
            block_owner_deletion: Some(true),
        }
    }
}

/// The workload that pulled the bundle image
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pod {
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub status: PodStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodStatus {
    #[serde(default)]
    pub init_container_statuses: Vec<ContainerStatus>,

    #[serde(default)]
    pub container_statuses: Vec<ContainerStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerStatus {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub image: String,

    /// Resolved digest; empty until the kubelet reports it
    #[serde(default, rename = "imageID")]
    pub image_id: String,
}
