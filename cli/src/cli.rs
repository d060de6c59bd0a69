//! Command-line options and subcommands.

use crate::{run::RunCommand, shape::ShapeCommand};

#[derive(clap::Parser, Debug)]
/// Replays operations on persistent sequences and reports on their shape.
#[command(author, about, long_about = None, version)]
pub struct Options {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Parser, Debug)]
pub struct GlobalOptions {
    /// Output format of reports
    #[arg(long, global = true, value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Replays a JSON operation script and prints the requested reports
    Run(RunCommand),
    /// Builds a sequence and prints statistics about its tree
    Shape(ShapeCommand),
}
