//! Reporting for LaTeX dependency collections.
//!
//! This crate drives `texdeps_core` over one or more root documents and
//! renders the results as a colored tree, a summary, or an export in JSON,
//! CSV, plain-table or HTML form.
//!
//! # Examples
//!
//! ```no_run
//! use std::io::{BufWriter, Write};
//! use texdeps_report::{Config, ExportFormat, Exporter, run_collection};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut cfg = Config {
//!     roots: vec!["thesis/main.tex".into()],
//!     config: None,
//!     strict: false,
//!     graphics_extensions: None,
//!     collector: Default::default(),
//! };
//!
//! let collections = run_collection(&mut cfg)?;
//!
//! let mut stdout = BufWriter::new(std::io::stdout());
//! for collection in &collections {
//!     texdeps_report::print_tree(&mut stdout, collection)?;
//! }
//! ExportFormat::Csv.exporter().export(
//!     &collections[0].root,
//!     &collections[0].files,
//!     &mut stdout,
//! )?;
//! stdout.flush()?;
//! # Ok(())
//! # }
//! ```

mod config;
mod exporter;
mod graph;
mod reporter;
mod runner;

// Re-export public API
pub use config::Config;
pub use exporter::{
    CsvExporter, ExportFormat, Exporter, HtmlExporter, JsonExporter, TableExporter,
};
pub use graph::{Edge, GraphSummary, edges, summarize, unique_edges};
pub use reporter::{print_status, print_summary, print_tree, print_warnings};
pub use runner::{discover_roots, run_collection};
