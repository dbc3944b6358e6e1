//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Orbment build solver: find quartz assignments that unlock desired arts
#[derive(Parser, Debug)]
#[command(name = "orbment")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase debug output (repeat for more: -d, -d -d, -d -d -d)
    #[arg(short = 'd', long = "debug", action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search for valid builds
    Solve {
        /// Character name
        #[arg(short, long)]
        character: Option<String>,

        /// Quartz in the available pool (repeatable)
        #[arg(short, long = "quartz")]
        quartz: Vec<String>,

        /// Desired arts every build must unlock (repeatable)
        #[arg(short, long = "art")]
        arts: Vec<String>,

        /// Quartz that must appear in every build (repeatable)
        #[arg(short = 'r', long = "require")]
        required: Vec<String>,

        /// Quartz tried first by the ordering (repeatable)
        #[arg(short = 'p', long = "prioritize")]
        prioritized: Vec<String>,

        /// Also require every prioritized quartz to appear
        #[arg(long, requires = "prioritized")]
        strict_priority: bool,

        /// Maximum number of builds to collect
        #[arg(short, long)]
        max_builds: Option<usize>,

        /// Split the search across CPU cores
        #[arg(long)]
        parallel: bool,

        /// Skip the result cache
        #[arg(long)]
        no_cache: bool,

        /// Load character/pool/arts from a saved session
        #[arg(short, long)]
        session: Option<String>,

        /// Save the effective configuration as a session
        #[arg(long, value_name = "NAME")]
        save_session: Option<String>,
    },

    /// Show a character's orbment tree
    Tree {
        /// Character name
        character: String,
    },

    /// List catalog contents
    List {
        #[command(subcommand)]
        command: ListCommands,
    },

    /// Manage saved sessions
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },

    /// Manage the result cache
    Cache {
        #[command(subcommand)]
        command: CacheCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
    /// All characters with their line layout
    Characters,
    /// All quartz with family, type and elements
    Quartz,
    /// All arts with their requirements
    Arts,
}

#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// Names of all saved sessions
    List,
    /// Print one session
    Show { name: String },
    /// Delete one session
    Delete { name: String },
}

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Cache location and entry count
    Info,
    /// Delete all cached results
    Clear,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective settings
    Show,
    /// Write a default config file
    Init,
}
