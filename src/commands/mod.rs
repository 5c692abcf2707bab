//! Command implementations for the kuberpak-unpack CLI

pub mod completions;
pub mod delete;
pub mod helpers;
pub mod list;
pub mod unpack;
pub mod version;
