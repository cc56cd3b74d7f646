//! CLI subcommands.

pub mod batch;
pub mod classify;
pub mod config;
pub mod output;
pub mod process;
pub mod source;
pub mod suppliers;
