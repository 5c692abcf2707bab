use clap::Parser;
use std::path::PathBuf;

use super::BundleTarget;

/// Arguments for the unpack command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Unpack a bundle:\n    kuberpak-unpack unpack -n olm --pod-name etcd-unpack \\\n      \
                  --bundle-name etcd --manifests-dir /manifests\n\n\
                  Use environment variables:\n    KUBERPAK_NAMESPACE=olm KUBERPAK_POD_NAME=etcd-unpack \\\n      \
                  KUBERPAK_BUNDLE_NAME=etcd KUBERPAK_MANIFESTS_DIR=/manifests kuberpak-unpack unpack")]
pub struct UnpackArgs {
    #[command(flatten)]
    pub target: BundleTarget,

    /// Name of the pod that pulled the bundle image
    #[arg(long, env = "KUBERPAK_POD_NAME")]
    pub pod_name: String,

    /// Directory holding the bundle's manifest files
    #[arg(long, env = "KUBERPAK_MANIFESTS_DIR")]
    pub manifests_dir: PathBuf,
}
