use clap::Parser;

use super::BundleTarget;

/// Arguments for the delete command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Delete a bundle and its chunks:\n    kuberpak-unpack delete -n olm --bundle-name etcd")]
pub struct DeleteArgs {
    #[command(flatten)]
    pub target: BundleTarget,
}
