use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "snapdiff")]
#[command(about = "Snapshot files and the diff tools that review them", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the diff tools found on this machine, in priority order
    Tools,
    /// Resolve an executable path template (env vars and `*` directory wildcards)
    Find { pattern: String },
    /// Open a diff tool for a received/verified pair
    Launch {
        temp: PathBuf,
        target: PathBuf,
        /// Use this tool instead of the one picked by extension
        #[arg(long)]
        tool: Option<String>,
    },
    /// Close the diff tool opened for a pair
    Kill { temp: PathBuf, target: PathBuf },
    /// Move every received file under a directory onto its verified file
    Accept { dir: PathBuf },
    /// Delete every received file under a directory
    Clean {
        dir: PathBuf,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Show build server and disabled detection
    Ci,
    /// Print configuration values
    PrintConfig,
}
