use clap::Parser;

use super::BundleTarget;

/// Arguments for the list command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  List a bundle's chunks:\n    kuberpak-unpack list -n olm --bundle-name etcd\n\n\
                  Emit JSON:\n    kuberpak-unpack list -n olm --bundle-name etcd --json\n\n\
                  Check every stored payload against its hash:\n    kuberpak-unpack list -n olm --bundle-name etcd --verify")]
pub struct ListArgs {
    #[command(flatten)]
    pub target: BundleTarget,

    /// Print machine-readable JSON
    #[arg(long)]
    pub json: bool,

    /// Decompress each payload and check it against the recorded hash
    #[arg(long)]
    pub verify: bool,
}
