use crate::error::{BumpError, Result};
use log::{debug, info};
use std::future::Future;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// The version-control operations a solution needs.
pub trait VersionControl {
    /// Porcelain status output for the working tree at `dir`.
    fn status(&self, dir: &Path) -> impl Future<Output = Result<String>> + Send;

    /// Stages every change in `dir`.
    fn stage_all(&self, dir: &Path) -> impl Future<Output = Result<()>> + Send;

    fn commit(&self, dir: &Path, message: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Runs the `git` command-line tool.
#[derive(Debug, Clone)]
pub struct GitCli {
    pub program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        GitCli {
            program: "git".to_string(),
        }
    }
}

impl GitCli {
    pub fn new(program: impl Into<String>) -> Self {
        GitCli {
            program: program.into(),
        }
    }

    /// Runs the tool in `dir` and returns its stdout.
    ///
    /// stdout and stderr are drained together while the child runs. A
    /// non-zero exit becomes `ToolFailed` carrying stderr.
    async fn run(&self, dir: &Path, args: &[&str]) -> Result<String> {
        if !dir.is_dir() {
            return Err(BumpError::NotFound(dir.to_path_buf()));
        }

        let joined = args.join(" ");
        debug!("Running `{} {}` in {:?}", self.program, joined, dir);

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => BumpError::ToolNotFound {
                    program: self.program.clone(),
                },
                _ => BumpError::Io(e),
            })?;

        if !output.status.success() {
            return Err(BumpError::ToolFailed {
                program: self.program.clone(),
                args: joined,
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl VersionControl for GitCli {
    async fn status(&self, dir: &Path) -> Result<String> {
        self.run(dir, &["status", "--porcelain"]).await
    }

    async fn stage_all(&self, dir: &Path) -> Result<()> {
        self.run(dir, &["add", "."]).await?;
        debug!("Staged all changes");
        Ok(())
    }

    async fn commit(&self, dir: &Path, message: &str) -> Result<()> {
        info!("Creating commit: {}", message);
        self.run(dir, &["commit", "-m", message]).await?;
        Ok(())
    }
}
