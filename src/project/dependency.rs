//! `PackageReference` records.
//!
//! References store a 3-segment version (`1.2.3`) while project versions are
//! compared as 4 segments. Reading a 3-segment reference appends a `0`
//! segment; writing a 4-segment version drops the last segment again.

use crate::document::{Document, Element};
use crate::error::{BumpError, Result};
use crate::project::Project;
use crate::version::Version;

const NAME_ATTRIBUTE: &str = "Include";
const VERSION_ATTRIBUTE: &str = "Version";

fn read_version(document: &Document, element: &Element) -> Result<Version> {
    let stored = document
        .attribute(element, VERSION_ATTRIBUTE)
        .ok_or_else(|| BumpError::missing_field(format!("{} {}", element.name(), VERSION_ATTRIBUTE)))?;
    let version = Version::parse(&stored)?;
    Ok(if version.segment_count() == 3 {
        version.with_segment(0)
    } else {
        version
    })
}

fn read_name(document: &Document, element: &Element) -> Result<String> {
    document
        .attribute(element, NAME_ATTRIBUTE)
        .ok_or_else(|| BumpError::missing_field(format!("{} {}", element.name(), NAME_ATTRIBUTE)))
}

/// Read-only view over one `PackageReference`.
#[derive(Debug, Clone)]
pub struct Dependency<'a> {
    document: &'a Document,
    element: Element,
}

impl<'a> Dependency<'a> {
    pub(crate) fn new(document: &'a Document, element: Element) -> Self {
        Dependency { document, element }
    }

    /// Position among the project's references; pass to `Project::dependency_mut`.
    pub fn ordinal(&self) -> usize {
        self.element.ordinal()
    }

    pub fn name(&self) -> Result<String> {
        read_name(self.document, &self.element)
    }

    pub fn version(&self) -> Result<Version> {
        read_version(self.document, &self.element)
    }

    /// The project whose name matches this reference, if any.
    pub fn project<'p>(&self, projects: &'p [Project]) -> Result<Option<&'p Project>> {
        let name = self.name()?;
        let mut matches = projects.iter().filter(|project| project.name() == name);
        let found = matches.next();
        if matches.next().is_some() {
            return Err(BumpError::AmbiguousName(name));
        }
        Ok(found)
    }
}

/// Mutable view over one `PackageReference`; writes go straight to the document.
#[derive(Debug)]
pub struct DependencyMut<'a> {
    document: &'a mut Document,
    element: Element,
}

impl<'a> DependencyMut<'a> {
    pub(crate) fn new(document: &'a mut Document, element: Element) -> Self {
        DependencyMut { document, element }
    }

    pub fn name(&self) -> Result<String> {
        read_name(self.document, &self.element)
    }

    pub fn set_name(&mut self, name: &str) -> Result<()> {
        self.document.set_attribute(&self.element, NAME_ATTRIBUTE, name)?;
        self.refresh()
    }

    pub fn version(&self) -> Result<Version> {
        read_version(self.document, &self.element)
    }

    pub fn set_version(&mut self, version: &Version) -> Result<()> {
        let stored = if version.segment_count() == 4 {
            version.without_last_segment()
        } else {
            version.clone()
        };
        self.document
            .set_attribute(&self.element, VERSION_ATTRIBUTE, &stored.to_string())?;
        self.refresh()
    }

    // Spans shift after a write, so re-query by ordinal.
    fn refresh(&mut self) -> Result<()> {
        self.element = self
            .document
            .elements(self.element.name())?
            .into_iter()
            .nth(self.element.ordinal())
            .ok_or_else(|| BumpError::missing_field(self.element.name()))?;
        Ok(())
    }
}
