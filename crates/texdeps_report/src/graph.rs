use log::{debug, trace};
use serde::Serialize;
use std::{
    collections::{BTreeMap, HashSet},
    path::PathBuf,
};

use texdeps_core::{Collection, Command, DependencyKind, DependencyNode};

/// A reference from one file to another, as found in the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub parent: PathBuf,
    pub child: PathBuf,
    pub command: Command,
    pub line: usize,
    /// The edge closes a cycle
    pub cycle: bool,
}

/// Every (parent, child) reference in the tree, in pre-order.
///
/// A file referenced from several places yields one edge per reference.
pub fn edges(root: &DependencyNode) -> Vec<Edge> {
    let mut out = Vec::new();
    collect_edges(root, &mut out);
    trace!("Derived {} edges from {}", out.len(), root.path.display());
    out
}

fn collect_edges(node: &DependencyNode, out: &mut Vec<Edge>) {
    for child in &node.children {
        if let (Some(command), Some(line)) = (child.command, child.line) {
            out.push(Edge {
                parent: node.path.clone(),
                child: child.path.clone(),
                command,
                line,
                cycle: child.cycle,
            });
        }
        collect_edges(child, out);
    }
}

/// Edges with duplicate (parent, child) pairs removed, first occurrence kept.
pub fn unique_edges(root: &DependencyNode) -> Vec<Edge> {
    let mut seen = HashSet::new();
    edges(root)
        .into_iter()
        .filter(|e| seen.insert((e.parent.clone(), e.child.clone())))
        .collect()
}

/// Statistics about one collected graph.
#[derive(Debug, Clone, Serialize)]
pub struct GraphSummary {
    pub root: PathBuf,
    /// Distinct files, root included
    pub files: usize,
    /// Distinct (parent, child) references
    pub references: usize,
    /// Longest chain of references below the root
    pub max_depth: usize,
    pub by_kind: BTreeMap<DependencyKind, usize>,
    pub by_command: BTreeMap<Command, usize>,
    /// Project files that do not exist
    pub missing: Vec<PathBuf>,
    /// Packages and classes not found in the project
    pub unresolved: Vec<PathBuf>,
    /// References that point back to a file on their own branch
    pub cycles: Vec<Edge>,
    /// Files that reference nothing
    pub leaves: Vec<PathBuf>,
}

impl GraphSummary {
    pub fn is_acyclic(&self) -> bool {
        self.cycles.is_empty()
    }
}

pub fn summarize(collection: &Collection) -> GraphSummary {
    let edges = unique_edges(&collection.root);

    let mut by_kind = BTreeMap::new();
    for record in &collection.files {
        *by_kind.entry(record.kind).or_insert(0) += 1;
    }

    let mut by_command = BTreeMap::new();
    for edge in &edges {
        *by_command.entry(edge.command).or_insert(0) += 1;
    }

    let parents: HashSet<&PathBuf> = edges.iter().map(|e| &e.parent).collect();
    let leaves = collection
        .files
        .iter()
        .filter(|r| !parents.contains(&r.path))
        .map(|r| r.path.clone())
        .collect();

    let summary = GraphSummary {
        root: collection.root.path.clone(),
        files: collection.files.len(),
        references: edges.len(),
        max_depth: collection.root.depth(),
        by_kind,
        by_command,
        missing: collection.missing().map(|r| r.path.clone()).collect(),
        unresolved: collection.unresolved().map(|r| r.path.clone()).collect(),
        cycles: edges.iter().filter(|e| e.cycle).cloned().collect(),
        leaves,
    };
    debug!(
        "Summary for {}: {} files, {} references",
        summary.root.display(),
        summary.files,
        summary.references
    );
    summary
}
