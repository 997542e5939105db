//! Default extensions used when a reference omits one.
//!
//! LaTeX lets authors leave off the extension of most referenced files; the
//! engine (or the package handling the command) appends a fixed one. These
//! are the defaults mirrored here, all of them overridable through
//! [`CollectorConfig`](crate::CollectorConfig).

/// Appended to `\input` and `\include` references
pub const DOCUMENT_EXTENSION: &str = "tex";

/// Appended to `\bibliography` and `\addbibresource` references
pub const BIBLIOGRAPHY_EXTENSION: &str = "bib";

/// Appended to `\usepackage` references
pub const PACKAGE_EXTENSION: &str = "sty";

/// Appended to `\documentclass` references
pub const CLASS_EXTENSION: &str = "cls";

/// Extensions tried, in priority order, for `\includegraphics` references
pub const GRAPHICS_EXTENSIONS: &[&str] = &["pdf", "png", "jpg", "eps"];

/// Name of the per-project config file looked up from the root document upwards
pub const CONFIG_FILE_NAME: &str = ".texdeps.json";
