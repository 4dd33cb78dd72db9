use anyhow::{Context, Result};
use bump_version::{
    arguments::{Arguments, Command},
    commands::{self, SolutionOutcome},
    git::GitCli,
};
use clap::{CommandFactory, Parser};
use log::{LevelFilter, warn};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Arguments::parse();
    pretty_env_logger::env_logger::builder()
        .filter_level(if args.verbose { LevelFilter::Debug } else { LevelFilter::Info })
        .parse_default_env()
        .format_timestamp(None)
        .init();

    match args.subcommand() {
        Command::File {
            path,
            segment,
            extra,
        } => bump_file(path, segment, &extra),
        Command::Solution {
            root,
            segment,
            message,
            no_pause,
        } => bump_solutions(&root, segment, &message, no_pause).await,
        Command::Outdated { root, fix } => outdated(&root, fix),
    }
}

fn bump_file(path: Option<PathBuf>, segment: usize, extra: &[String]) -> Result<()> {
    let Some(path) = commands::resolve_project_file(path, extra, Path::new(".")) else {
        let mut command = Arguments::command();
        if let Some(file) = command.find_subcommand_mut("file") {
            file.print_help()?;
        }
        return Ok(());
    };

    let bumped = commands::bump_file(&path, segment)
        .with_context(|| format!("Failed to bump '{}'", path.display()))?;
    for field in bumped {
        println!("{field}");
    }
    Ok(())
}

async fn bump_solutions(root: &Path, segment: usize, message: &str, no_pause: bool) -> Result<()> {
    let git = GitCli::default();
    let outcome = commands::bump_solutions(root, segment, message, &git)
        .await
        .with_context(|| format!("Failed to bump solutions under '{}'", root.display()))?;

    match outcome {
        SolutionOutcome::Aborted { dirty } => {
            warn!(
                "Uncommitted changes in {}; commit or stash them first. Nothing was bumped.",
                dirty.join(", ")
            );
            if !no_pause {
                println!("Press Enter to exit");
                let mut line = String::new();
                BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
            }
        }
        SolutionOutcome::Bumped(bumped) => {
            for solution in bumped {
                println!("{solution}");
            }
        }
    }
    Ok(())
}

fn outdated(root: &Path, fix: bool) -> Result<()> {
    let stale = commands::find_outdated(root, fix)
        .with_context(|| format!("Failed to check dependencies under '{}'", root.display()))?;

    if stale.is_empty() {
        println!("All sibling references are up to date");
    }
    for dependency in &stale {
        println!("{dependency}");
    }
    if fix && !stale.is_empty() {
        println!("Updated {} reference(s)", stale.len());
    }
    Ok(())
}
