//! Core of texdeps: dependency collection for LaTeX projects.
//!
//! This crate walks a LaTeX document tree starting from a root document:
//! - Extracting file references (`\input`, `\include`, `\includegraphics`,
//!   `\bibliography`, `\addbibresource`, `\usepackage`, `\documentclass`)
//! - Resolving them against LaTeX's extension-optional, relative-path conventions
//! - Following LaTeX sources recursively while cutting cycles
//! - Producing a dependency tree plus a flat, deduplicated file listing
//!
//! ```no_run
//! # fn main() -> Result<(), texdeps_core::CollectError> {
//! let collection = texdeps_core::collect("thesis/main.tex")?;
//! for record in collection.missing() {
//!     println!("missing: {}", record.path.display());
//! }
//! # Ok(())
//! # }
//! ```

mod collector;
mod config;
mod constants;
mod error;
mod parser;
mod resolver;
mod types;

// Re-export public API
pub use collector::{Collector, collect};
pub use config::{CollectorConfig, find_config_file, load_config};
pub use constants::{
    BIBLIOGRAPHY_EXTENSION, CLASS_EXTENSION, CONFIG_FILE_NAME, DOCUMENT_EXTENSION,
    GRAPHICS_EXTENSIONS, PACKAGE_EXTENSION,
};
pub use error::CollectError;
pub use parser::extract;
pub use resolver::PathResolver;
pub use types::{
    CollectWarning, Collection, Command, Dependency, DependencyKind, DependencyNode,
    DependencyRecord,
};
