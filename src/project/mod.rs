use crate::document::Document;
use crate::error::{BumpError, Result};
use crate::version::Version;
use log::{debug, info};
use std::path::{Path, PathBuf};

pub mod dependency;

pub use dependency::{Dependency, DependencyMut};

pub const VERSION_ELEMENT: &str = "Version";
pub const ASSEMBLY_VERSION_ELEMENT: &str = "AssemblyVersion";
pub const PACKAGE_REFERENCE_ELEMENT: &str = "PackageReference";

/// One project file and its parsed document.
#[derive(Debug, Clone)]
pub struct Project {
    path: PathBuf,
    name: String,
    document: Document,
}

impl Project {
    /// Checks for the project file without loading it.
    pub fn exists(path: impl AsRef<Path>) -> bool {
        path.as_ref().is_file()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let document = Document::load(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        debug!("Loaded project '{}' from '{}'", name, path.display());
        Ok(Project {
            path: path.to_path_buf(),
            name,
            document,
        })
    }

    /// The identifier package references use for this project: the file stem.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn version(&self) -> Result<Version> {
        self.read_version(VERSION_ELEMENT)
    }

    pub fn set_version(&mut self, version: &Version) -> Result<()> {
        self.write_version(VERSION_ELEMENT, version)
    }

    pub fn assembly_version(&self) -> Result<Version> {
        self.read_version(ASSEMBLY_VERSION_ELEMENT)
    }

    pub fn set_assembly_version(&mut self, version: &Version) -> Result<()> {
        self.write_version(ASSEMBLY_VERSION_ELEMENT, version)
    }

    /// Bumps the same segment of `Version` and `AssemblyVersion`.
    ///
    /// Both new values are computed before either is written, so a failure
    /// leaves the document untouched. Returns the old and new `Version`.
    pub fn bump(&mut self, segment: usize) -> Result<(Version, Version)> {
        let version = self.version()?;
        let assembly_version = self.assembly_version()?;
        let new_version = version.bump(segment)?;
        let new_assembly_version = assembly_version.bump(segment)?;

        self.set_version(&new_version)?;
        self.set_assembly_version(&new_assembly_version)?;

        info!(
            "Bumped '{}': Version {} -> {}, AssemblyVersion {} -> {}",
            self.name, version, new_version, assembly_version, new_assembly_version
        );
        Ok((version, new_version))
    }

    pub fn save(&self) -> Result<()> {
        self.document.save(&self.path)
    }

    /// Every `PackageReference` in document order.
    pub fn dependencies(&self) -> Result<Vec<Dependency<'_>>> {
        Ok(self
            .document
            .elements(PACKAGE_REFERENCE_ELEMENT)?
            .into_iter()
            .map(|element| Dependency::new(&self.document, element))
            .collect())
    }

    /// Mutable view over the `ordinal`-th `PackageReference`.
    pub fn dependency_mut(&mut self, ordinal: usize) -> Result<DependencyMut<'_>> {
        let element = self
            .document
            .elements(PACKAGE_REFERENCE_ELEMENT)?
            .into_iter()
            .nth(ordinal)
            .ok_or_else(|| BumpError::missing_field(PACKAGE_REFERENCE_ELEMENT))?;
        Ok(DependencyMut::new(&mut self.document, element))
    }

    /// Dependencies on sibling projects that are older than the sibling's
    /// current `Version`. References to projects not in `projects` are skipped.
    pub fn get_old_dependencies<'a>(&'a self, projects: &[Project]) -> Result<Vec<Dependency<'a>>> {
        let mut old = Vec::new();
        for dependency in self.dependencies()? {
            let Some(project) = dependency.project(projects)? else {
                continue;
            };
            let current = project.version()?;
            let referenced = dependency.version()?;
            if referenced < current {
                debug!(
                    "'{}' references '{}' at {} but it is at {}",
                    self.name,
                    project.name(),
                    referenced,
                    current
                );
                old.push(dependency);
            }
        }
        Ok(old)
    }

    fn read_version(&self, element: &str) -> Result<Version> {
        let node = self.document.first(element)?;
        Version::parse(&self.document.text(&node))
    }

    fn write_version(&mut self, element: &str, version: &Version) -> Result<()> {
        let node = self.document.first(element)?;
        self.document.set_text(&node, &version.to_string())
    }
}
