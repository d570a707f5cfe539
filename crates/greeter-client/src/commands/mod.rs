//! Subcommand implementations.

pub mod config;
pub mod hello;
pub mod serve;
