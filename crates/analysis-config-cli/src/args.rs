use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "anacfg")]
#[command(about = "Assemble and inspect HEP analysis configurations")]
#[command(version)]
pub struct Cli {
    /// Analysis file (default: ./analysis.toml)
    #[arg(short, long, global = true, env = "ANACFG_FILE")]
    pub file: Option<PathBuf>,

    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a commented analysis file template
    Init,

    /// Build the config and print its category hierarchy
    Categories {
        /// Print one line per category instead of a tree
        #[arg(long)]
        flat: bool,
    },

    /// Print the deterministic id of a category name
    Id {
        /// Category name
        name: String,

        /// Number of hex digits taken from the hash
        #[arg(long, default_value_t = analysis_config_core::DEFAULT_HASH_LEN)]
        hash_len: usize,

        /// Salt to move away from a colliding id
        #[arg(long)]
        salt: Option<String>,
    },

    /// Print the root process trees of the campaign
    Processes,

    /// Check that all dataset processes are registered in the config
    Verify {
        /// Print a warning instead of failing
        #[arg(short, long)]
        warn: bool,
    },

    /// Print up and down shifts of the given sources with their aliases
    Shifts {
        /// Shift sources (e.g. pdf, jec)
        #[arg(required = true)]
        sources: Vec<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
