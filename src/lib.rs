pub mod arguments;
pub mod commands;
pub mod document;
pub mod error;
pub mod git;
pub mod project;
pub mod solution;
pub mod version;
