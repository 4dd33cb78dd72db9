use crate::commands::{DEFAULT_COMMIT_MESSAGE, DEFAULT_SEGMENT};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Bump every Version and AssemblyVersion element in a single file
    File {
        /// Project file; defaults to csproj-test.xml in the current directory
        path: Option<PathBuf>,
        /// 1-based segment to increment
        #[arg(default_value_t = DEFAULT_SEGMENT)]
        segment: usize,
        /// Anything past the segment; its presence prints usage instead
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, hide = true)]
        extra: Vec<String>,
    },
    /// Bump and commit every solution under a directory
    Solution {
        #[arg(long, short, default_value = ".")]
        root: PathBuf,
        #[arg(long, short, default_value_t = DEFAULT_SEGMENT)]
        segment: usize,
        #[arg(long, short, default_value = DEFAULT_COMMIT_MESSAGE)]
        message: String,
        /// Exit immediately instead of waiting for Enter when a tree is dirty
        #[arg(long)]
        no_pause: bool,
    },
    /// List package references that lag behind the sibling project they name
    Outdated {
        #[arg(long, short, default_value = ".")]
        root: PathBuf,
        /// Rewrite stale references to the sibling's current version
        #[arg(long)]
        fix: bool,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Solution {
            root: PathBuf::from("."),
            segment: DEFAULT_SEGMENT,
            message: DEFAULT_COMMIT_MESSAGE.to_string(),
            no_pause: false,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about, bin_name = "bv")]
pub struct Arguments {
    #[arg(long, short, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// The subcommand to run; no subcommand means `solution` with defaults.
    pub fn subcommand(&self) -> Command {
        self.command.clone().unwrap_or_default()
    }
}
