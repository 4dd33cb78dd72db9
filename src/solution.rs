use crate::error::{BumpError, Result};
use crate::git::VersionControl;
use crate::project::Project;
use log::{debug, info};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const PROJECT_EXTENSION: &str = "csproj";

/// A checkout directory holding exactly one project.
#[derive(Debug, Clone)]
pub struct Solution {
    path: PathBuf,
    name: String,
    project: Project,
}

impl Solution {
    pub fn new(path: impl Into<PathBuf>, project: Project) -> Self {
        let path = path.into();
        let name = directory_name(&path);
        Solution { path, name, project }
    }

    /// Loads the solution's project from its expected location.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let project = Project::load(Self::expected_project_path(path))?;
        Ok(Solution::new(path, project))
    }

    /// `<dir>/<name>/<name>.csproj`, where `<name>` is the last component of `dir`.
    pub fn expected_project_path(path: impl AsRef<Path>) -> PathBuf {
        let path = path.as_ref();
        let name = directory_name(path);
        path.join(&name).join(format!("{name}.{PROJECT_EXTENSION}"))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn project_mut(&mut self) -> &mut Project {
        &mut self.project
    }

    pub fn into_project(self) -> Project {
        self.project
    }

    /// True when the status query prints anything other than whitespace.
    pub async fn has_uncommitted_changes<V: VersionControl>(&self, vcs: &V) -> Result<bool> {
        let status = vcs.status(&self.path).await?;
        let dirty = !status.trim().is_empty();
        debug!("Solution '{}' dirty: {}", self.name, dirty);
        Ok(dirty)
    }

    /// Stages everything in the solution directory, then commits it.
    pub async fn commit<V: VersionControl>(&self, vcs: &V, message: &str) -> Result<()> {
        vcs.stage_all(&self.path).await?;
        vcs.commit(&self.path, message).await?;
        info!("Committed solution '{}'", self.name);
        Ok(())
    }
}

/// Solutions directly under `root` whose expected project file exists.
///
/// Falls back to `root` itself when no subdirectory qualifies; that fails with
/// `NotFound` if `root` has no project either.
pub fn discover_solutions(root: impl AsRef<Path>) -> Result<Vec<Solution>> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(BumpError::NotFound(root.to_path_buf()));
    }
    let root = std::fs::canonicalize(root)?;

    let mut solutions = Vec::new();
    let walker = WalkDir::new(&root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name();
    for entry in walker {
        let entry = entry.map_err(|e| {
            e.into_io_error()
                .map(BumpError::Io)
                .unwrap_or_else(|| BumpError::NotFound(root.clone()))
        })?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let candidate = Solution::expected_project_path(entry.path());
        if Project::exists(&candidate) {
            debug!("Found solution at {:?}", entry.path());
            solutions.push(Solution::open(entry.path())?);
        }
    }

    if solutions.is_empty() {
        debug!("No solutions below {:?}, treating it as a solution", root);
        solutions.push(Solution::open(&root)?);
    }

    Ok(solutions)
}

fn directory_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .or_else(|| {
            std::fs::canonicalize(path)
                .ok()
                .and_then(|p| p.file_name().map(|name| name.to_string_lossy().to_string()))
        })
        .unwrap_or_default()
}
