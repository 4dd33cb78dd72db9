//! What each subcommand does, independent of argument parsing and printing.

use crate::document::Document;
use crate::error::Result;
use crate::git::VersionControl;
use crate::project::{ASSEMBLY_VERSION_ELEMENT, Project, VERSION_ELEMENT};
use crate::solution::{Solution, discover_solutions};
use crate::version::Version;
use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_PROJECT_FILE: &str = "csproj-test.xml";
pub const DEFAULT_SEGMENT: usize = 3;
pub const DEFAULT_COMMIT_MESSAGE: &str = "Bumped version";

/// One element rewritten by [`bump_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BumpedField {
    pub element: String,
    pub old: Version,
    pub new: Version,
}

impl fmt::Display for BumpedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} became {}", self.element, self.old, self.new)
    }
}

/// `path` if given, else the default project file when it exists in `dir`.
///
/// `None` means usage should be printed: no file could be chosen, or more
/// arguments were given than a path and a segment.
pub fn resolve_project_file(path: Option<PathBuf>, extra: &[String], dir: &Path) -> Option<PathBuf> {
    if !extra.is_empty() {
        return None;
    }
    path.or_else(|| {
        let fallback = dir.join(DEFAULT_PROJECT_FILE);
        fallback.is_file().then_some(fallback)
    })
}

/// Bumps every `AssemblyVersion` and `Version` element anywhere in the file.
///
/// All new values are computed before anything is written; the file is
/// saved only if every element bumped cleanly.
pub fn bump_file(path: impl AsRef<Path>, segment: usize) -> Result<Vec<BumpedField>> {
    let path = path.as_ref();
    let mut document = Document::load(path)?;

    let mut planned = Vec::new();
    for name in [ASSEMBLY_VERSION_ELEMENT, VERSION_ELEMENT] {
        for element in document.elements(name)? {
            let old = Version::parse(&document.text(&element))?;
            let new = old.bump(segment)?;
            planned.push((element, old, new));
        }
    }

    // set_text relocates by name and ordinal, so the planned elements stay valid.
    let mut bumped = Vec::with_capacity(planned.len());
    for (element, old, new) in planned {
        document.set_text(&element, &new.to_string())?;
        bumped.push(BumpedField {
            element: element.name().to_string(),
            old,
            new,
        });
    }

    document.save(path)?;
    info!("Updated {} element(s) in '{}'", bumped.len(), path.display());
    Ok(bumped)
}

/// A solution whose project was bumped and committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionBump {
    pub solution: String,
    pub old: Version,
    pub new: Version,
}

impl fmt::Display for SolutionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} became {}", self.solution, self.old, self.new)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolutionOutcome {
    /// Nothing was written because these solutions have uncommitted changes.
    Aborted { dirty: Vec<String> },
    Bumped(Vec<SolutionBump>),
}

/// Bumps and commits every solution under `root`.
///
/// Every solution's working tree is checked first. If any is dirty, no file
/// is written and nothing is committed.
pub async fn bump_solutions<V: VersionControl>(
    root: impl AsRef<Path>,
    segment: usize,
    message: &str,
    vcs: &V,
) -> Result<SolutionOutcome> {
    let mut solutions = discover_solutions(root)?;

    let mut dirty = Vec::new();
    for solution in &solutions {
        if solution.has_uncommitted_changes(vcs).await? {
            warn!("Solution '{}' has uncommitted changes", solution.name());
            dirty.push(solution.name().to_string());
        }
    }
    if !dirty.is_empty() {
        return Ok(SolutionOutcome::Aborted { dirty });
    }

    let mut bumped = Vec::with_capacity(solutions.len());
    for solution in &mut solutions {
        let (old, new) = solution.project_mut().bump(segment)?;
        solution.project().save()?;
        solution.commit(vcs, message).await?;
        bumped.push(SolutionBump {
            solution: solution.name().to_string(),
            old,
            new,
        });
    }

    Ok(SolutionOutcome::Bumped(bumped))
}

/// A reference to a sibling project at an older version than the sibling's own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleDependency {
    pub project: String,
    pub dependency: String,
    pub referenced: Version,
    pub current: Version,
}

impl fmt::Display for StaleDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} references {} {} but {} is at {}",
            self.project, self.dependency, self.referenced, self.dependency, self.current
        )
    }
}

/// Finds stale references between the solutions under `root`.
///
/// With `fix`, each stale reference is rewritten to the sibling's current
/// version and the referencing project is saved.
pub fn find_outdated(root: impl AsRef<Path>, fix: bool) -> Result<Vec<StaleDependency>> {
    let mut projects: Vec<Project> = discover_solutions(root)?
        .into_iter()
        .map(Solution::into_project)
        .collect();

    let mut stale = Vec::new();
    let mut updates: Vec<(usize, usize, Version)> = Vec::new();
    for (index, project) in projects.iter().enumerate() {
        for dependency in project.get_old_dependencies(&projects)? {
            let Some(sibling) = dependency.project(&projects)? else {
                continue;
            };
            let current = sibling.version()?;
            stale.push(StaleDependency {
                project: project.name().to_string(),
                dependency: dependency.name()?,
                referenced: dependency.version()?,
                current: current.clone(),
            });
            updates.push((index, dependency.ordinal(), current));
        }
    }

    if fix {
        let mut touched = BTreeSet::new();
        for (index, ordinal, version) in updates {
            let project = &mut projects[index];
            project.dependency_mut(ordinal)?.set_version(&version)?;
            debug!("Updated reference #{} of '{}' to {}", ordinal, project.name(), version);
            touched.insert(index);
        }
        for index in touched {
            let project = &projects[index];
            project.save()?;
            info!("Saved '{}'", project.path().display());
        }
    }

    Ok(stale)
}
