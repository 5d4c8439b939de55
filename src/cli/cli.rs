use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::application::data::LogLevel;

/// Records and inspects the local history of a project tree.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    #[clap(long, short, default_value = "warn", value_enum, global = true)]
    pub log_level: LogLevel,

    /// The root directory of the project
    #[clap(long, short, default_value = ".", global = true)]
    pub root: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Record the change sets of a YAML history script
    Apply { script: PathBuf },
    /// Print the tree, or the tree as it was before change set N of `log`
    Tree {
        #[clap(long)]
        before: Option<usize>,
    },
    /// List change sets, newest first, optionally only those touching a path
    Log { path: Option<String> },
    /// Print the current content of a file
    Cat { path: String },
    /// Forget change sets older than a timestamp (ms)
    Purge {
        #[clap(allow_negative_numbers = true)]
        timestamp: i64,
    },
}
