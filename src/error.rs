use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading, bumping and committing project versions
#[derive(Debug, Error)]
pub enum BumpError {
    #[error("Invalid version '{value}': {reason}")]
    Format { value: String, reason: String },

    #[error("Segment {segment} is out of range for version {version} ({count} segments)")]
    Index {
        segment: usize,
        version: String,
        count: usize,
    },

    #[error("Required element <{element}> not found")]
    MissingField { element: String },

    #[error("Element <{element}> contains child elements instead of text")]
    NotText { element: String },

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("More than one project is named '{0}'")]
    AmbiguousName(String),

    #[error("'{program}' could not be found on the PATH")]
    ToolNotFound { program: String },

    #[error("`{program} {args}` failed with exit code {code}: {stderr}")]
    ToolFailed {
        program: String,
        args: String,
        code: i32,
        stderr: String,
    },

    #[error(transparent)]
    Regex(#[from] regex::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BumpError>;

impl BumpError {
    pub fn format(value: impl Into<String>, reason: impl Into<String>) -> Self {
        BumpError::Format {
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn missing_field(element: impl Into<String>) -> Self {
        BumpError::MissingField {
            element: element.into(),
        }
    }
}
