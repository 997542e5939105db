use anyhow::{Context, Result};
use ignore::WalkBuilder;
use log::{debug, info, trace};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};

use texdeps_core::{Collection, Collector, Command, DOCUMENT_EXTENSION, extract};

use crate::config::Config;

/// Find every LaTeX document under `dir` that declares a `\documentclass`.
///
/// Respects `.gitignore` and friends. Results are sorted so the first root
/// is stable between runs.
pub fn discover_roots(dir: &Path) -> Result<Vec<PathBuf>> {
    debug!("Walking directory tree from: {}", dir.display());
    let walker = WalkBuilder::new(dir).hidden(false).ignore(true).git_ignore(true).build();

    let mut roots = Vec::new();
    for res in walker {
        let dent = res?;
        let p = dent.path();
        if !p.is_file() || p.extension().and_then(|e| e.to_str()) != Some(DOCUMENT_EXTENSION) {
            continue;
        }

        let Ok(bytes) = fs::read(p) else {
            trace!("Skipping unreadable file: {}", p.display());
            continue;
        };
        let contents = String::from_utf8_lossy(&bytes);
        if extract(&contents).iter().any(|d| d.command == Command::DocumentClass) {
            trace!("Found root document: {}", p.display());
            roots.push(p.to_path_buf());
        }
    }

    roots.sort();
    debug!("Discovered {} root documents", roots.len());
    Ok(roots)
}

/// Collect the dependencies of every configured root.
///
/// Roots are processed in parallel, each with its own collection state and
/// the config file nearest to it.
/// Results keep the order of `cfg.roots`.
pub fn run_collection(cfg: &mut Config) -> Result<Vec<Collection>> {
    info!("Starting dependency collection");
    cfg.initialize()?;

    let cfg = &*cfg;
    info!("Collecting {} root documents", cfg.roots.len());

    cfg.roots
        .par_iter()
        .map(|root| {
            let collector = Collector::new(cfg.collector_for(root)?);
            collector
                .collect(root)
                .with_context(|| format!("Failed to collect dependencies of {}", root.display()))
        })
        .collect()
}
