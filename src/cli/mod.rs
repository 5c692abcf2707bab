//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - unpack: Unpack command arguments
//! - list: List command arguments
//! - delete: Delete command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod completions;
pub mod delete;
pub mod list;
pub mod unpack;

pub use completions::CompletionsArgs;
pub use delete::DeleteArgs;
pub use list::ListArgs;
pub use unpack::UnpackArgs;

/// kuberpak-unpack - bundle manifest unpacker
///
/// Stores every manifest object of a bundle image as an immutable,
/// content-addressed chunk owned by the bundle.
#[derive(Parser, Debug)]
#[command(
    name = "kuberpak-unpack",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Unpack bundle manifests into content-addressed chunks",
    long_about = "kuberpak-unpack reads the manifests a bundle image ships, stores each object \
                  as an immutable, gzip-compressed chunk named after its content hash, and \
                  removes chunks the bundle no longer needs.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  kuberpak-unpack unpack -n olm --pod-name etcd-unpack --bundle-name etcd --manifests-dir /manifests\n   \
                  kuberpak-unpack list -n olm --bundle-name etcd --verify   \x1b[90m# Check stored payloads\x1b[0m\n   \
                  kuberpak-unpack delete -n olm --bundle-name etcd          \x1b[90m# Delete bundle and its chunks\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Object store root directory
    #[arg(long, global = true, env = "KUBERPAK_STORE_DIR")]
    pub store_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Unpack a bundle's manifests into chunks
    Unpack(UnpackArgs),

    /// List a bundle's chunks
    List(ListArgs),

    /// Delete a bundle and every chunk it owns
    Delete(DeleteArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Namespace and bundle name shared by the bundle commands
#[derive(Args, Debug, Clone)]
pub struct BundleTarget {
    /// Namespace of the bundle and its chunks
    #[arg(long, short = 'n', env = "KUBERPAK_NAMESPACE")]
    pub namespace: String,

    /// Name of the bundle
    #[arg(long, env = "KUBERPAK_BUNDLE_NAME")]
    pub bundle_name: String,
}
