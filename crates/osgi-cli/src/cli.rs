//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// osgi-deps - Resolve OSGi bundle dependencies of a project
#[derive(Parser, Debug)]
#[command(name = "osgi-deps")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Project description file
    #[arg(
        short,
        long,
        global = true,
        env = "OSGI_DEPS_PROJECT",
        default_value = "osgi-project.toml"
    )]
    pub project: PathBuf,

    /// Index configuration file [default: osgi-index.toml next to the project file]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show the modules and libraries a module depends on
    Resolve {
        /// Module name as written in the project file
        module: String,
    },

    /// Show the bundles exporting a package
    Provides {
        /// Fully qualified package name
        package: String,
    },

    /// List every indexed bundle
    Bundles,

    /// Report dependencies that cannot be resolved
    ///
    /// Exits with status 1 if any mandatory dependency is missing.
    Check,
}
