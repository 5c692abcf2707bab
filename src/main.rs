//! kuberpak-unpack - bundle manifest unpacker
//!
//! Reads the manifests shipped in a bundle image and stores every object as
//! an immutable, gzip-compressed, content-addressed chunk owned by the
//! bundle. Re-running the unpack converges the stored chunks to the current
//! manifests: unchanged objects are left alone, new ones are created and
//! chunks no longer backed by a manifest are removed.

use clap::Parser;
use miette::Diagnostic;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod desired;
mod domain;
mod encoding;
mod error;
mod manifest;
mod reconcile;
mod resolve;
mod store;
mod unpack;

#[cfg(test)]
mod test_fixtures;

use cli::{Cli, Commands};
use error::UnpackError;

/// Log filter for a `-v` count; `RUST_LOG` takes precedence when set
fn log_filter(verbose: u8) -> EnvFilter {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("kuberpak_unpack={level}")))
}

fn init_tracing(verbose: u8) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn report(err: &UnpackError) {
    eprintln!("Error: {err}");
    if let Some(help) = err.help() {
        eprintln!("  help: {help}");
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Unpack(args) => commands::unpack::run(cli.store_dir, args),
        Commands::List(args) => commands::list::run(cli.store_dir, args),
        Commands::Delete(args) => commands::delete::run(cli.store_dir, args),
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        report(&e);
        std::process::exit(1);
    }
}
