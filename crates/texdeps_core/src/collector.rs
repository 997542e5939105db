use indexmap::IndexMap;
use log::{debug, info, trace, warn};
use std::{
    collections::{BTreeSet, HashSet},
    fs, io,
    path::{Path, PathBuf},
};

use crate::{
    config::CollectorConfig,
    error::CollectError,
    parser::extract,
    resolver::PathResolver,
    types::{Collection, CollectWarning, DependencyKind, DependencyNode, DependencyRecord},
};

/// Builds the dependency tree of a LaTeX document.
///
/// A `Collector` holds configuration only; every call to
/// [`collect`](Self::collect) starts from fresh state, so one collector can
/// be shared between threads collecting different roots.
#[derive(Debug, Clone, Default)]
pub struct Collector {
    config: CollectorConfig,
}

impl Collector {
    pub fn new(config: CollectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    /// Recursively collect every file `root_file` depends on.
    ///
    /// Missing references become nodes with `exists == false`, and a file
    /// that re-appears among its own ancestors becomes a `cycle` leaf; neither
    /// is an error. A referenced file that exists but cannot be read is
    /// recorded as a [`CollectWarning`] and left unexpanded, unless
    /// [`CollectorConfig::strict`] is set, in which case the whole call fails
    /// with [`CollectError::Unreadable`].
    ///
    /// # Errors
    /// Fails when the root itself is missing, is not a regular file, or
    /// cannot be read.
    pub fn collect(&self, root_file: impl AsRef<Path>) -> Result<Collection, CollectError> {
        let root_file = root_file.as_ref();
        info!("Collecting dependencies of {}", root_file.display());

        let root = root_file.canonicalize().map_err(|e| CollectError::io(root_file, e))?;
        if !root.is_file() {
            return Err(CollectError::NotAFile { path: root });
        }
        let contents = read_source(&root)
            .map_err(|source| CollectError::Unreadable { path: root.clone(), source })?;

        let mut ctx = CollectContext::new(&self.config);
        ctx.records.insert(
            root.clone(),
            DependencyRecord {
                path: root.clone(),
                kind: DependencyKind::Document,
                parents: BTreeSet::new(),
                exists: true,
            },
        );

        let mut node = DependencyNode::root(root);
        node.children = ctx.expand(&node.path, &contents)?;

        let collection = Collection {
            root: node,
            files: ctx.records.into_values().collect(),
            warnings: ctx.warnings,
        };
        info!(
            "Collected {} files ({} missing, {} unresolved) from {}",
            collection.files.len(),
            collection.missing().count(),
            collection.unresolved().count(),
            collection.root.path.display()
        );
        Ok(collection)
    }
}

/// Collect with the default configuration.
pub fn collect(root_file: impl AsRef<Path>) -> Result<Collection, CollectError> {
    Collector::default().collect(root_file)
}

/// State of a single collection run.
struct CollectContext<'a> {
    resolver: PathResolver<'a>,
    strict: bool,
    /// Files open on the current recursion branch
    ancestors: HashSet<PathBuf>,
    records: IndexMap<PathBuf, DependencyRecord>,
    warnings: Vec<CollectWarning>,
}

impl<'a> CollectContext<'a> {
    fn new(config: &'a CollectorConfig) -> Self {
        Self {
            resolver: PathResolver::new(config),
            strict: config.strict,
            ancestors: HashSet::new(),
            records: IndexMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Build the child nodes of `file`, whose text is `contents`.
    fn expand(&mut self, file: &Path, contents: &str) -> Result<Vec<DependencyNode>, CollectError> {
        trace!("Expanding {}", file.display());
        self.ancestors.insert(file.to_path_buf());

        let deps = extract(contents);
        debug!("Found {} references in {}", deps.len(), file.display());

        let mut children = Vec::with_capacity(deps.len());
        for dep in &deps {
            let path = self.resolver.resolve(&dep.raw, file, dep.command);
            let exists = path.is_file();
            self.record(file, &path, dep.kind(), exists);

            let mut child = DependencyNode::reference(path, dep, exists);
            if dep.kind().is_recursable() {
                self.visit_document(&mut child)?;
            } else if !exists {
                debug!("Missing {} referenced from {}", child.path.display(), file.display());
            }
            children.push(child);
        }

        self.ancestors.remove(file);
        Ok(children)
    }

    fn visit_document(&mut self, node: &mut DependencyNode) -> Result<(), CollectError> {
        if self.ancestors.contains(&node.path) {
            debug!("Cycle detected at {}", node.path.display());
            node.cycle = true;
            return Ok(());
        }
        if !node.exists {
            debug!("Missing document {}", node.path.display());
            return Ok(());
        }

        match read_source(&node.path) {
            Ok(contents) => {
                node.children = self.expand(&node.path, &contents)?;
                Ok(())
            }
            Err(e) => self.read_failed(&node.path, e),
        }
    }

    /// Apply the unreadable-file policy to an existing document that could
    /// not be read. The node stays in the tree without children.
    fn read_failed(&mut self, path: &Path, err: io::Error) -> Result<(), CollectError> {
        if self.strict {
            return Err(CollectError::Unreadable { path: path.to_path_buf(), source: err });
        }
        warn!("Could not read {}: {}", path.display(), err);
        self.warnings.push(CollectWarning::Unreadable {
            path: path.to_path_buf(),
            message: err.to_string(),
        });
        Ok(())
    }

    fn record(&mut self, parent: &Path, path: &Path, kind: DependencyKind, exists: bool) {
        self.records
            .entry(path.to_path_buf())
            .or_insert_with(|| DependencyRecord {
                path: path.to_path_buf(),
                kind,
                parents: BTreeSet::new(),
                exists,
            })
            .parents
            .insert(parent.to_path_buf());
    }
}

/// Read a source file in one go. Invalid UTF-8 is replaced, not rejected.
fn read_source(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
