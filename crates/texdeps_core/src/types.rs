use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeSet,
    fmt,
    path::{Path, PathBuf},
};

/// Classification of a referenced file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    /// LaTeX source that can itself reference other files
    Document,
    Bibliography,
    Graphic,
    /// Packages, classes and anything else that is not followed
    Other,
}

impl DependencyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencyKind::Document => "document",
            DependencyKind::Bibliography => "bibliography",
            DependencyKind::Graphic => "graphic",
            DependencyKind::Other => "other",
        }
    }

    /// Only LaTeX sources are scanned for further dependencies.
    pub fn is_recursable(&self) -> bool {
        matches!(self, DependencyKind::Document)
    }

    /// Packages and classes normally come from the TeX installation, so a
    /// local miss is not a broken reference.
    pub fn is_project_file(&self) -> bool {
        !matches!(self, DependencyKind::Other)
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The LaTeX command a reference was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Input,
    Include,
    IncludeGraphics,
    Bibliography,
    AddBibResource,
    UsePackage,
    DocumentClass,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Input => "input",
            Command::Include => "include",
            Command::IncludeGraphics => "includegraphics",
            Command::Bibliography => "bibliography",
            Command::AddBibResource => "addbibresource",
            Command::UsePackage => "usepackage",
            Command::DocumentClass => "documentclass",
        }
    }

    pub fn kind(&self) -> DependencyKind {
        match self {
            Command::Input | Command::Include => DependencyKind::Document,
            Command::Bibliography | Command::AddBibResource => DependencyKind::Bibliography,
            Command::IncludeGraphics => DependencyKind::Graphic,
            Command::UsePackage | Command::DocumentClass => DependencyKind::Other,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\\{}", self.name())
    }
}

/// A single reference extracted from a file, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub command: Command,
    /// The argument exactly as written, trimmed
    pub raw: String,
    /// 1-based line of the command in the source file
    pub line: usize,
}

impl Dependency {
    pub fn kind(&self) -> DependencyKind {
        self.command.kind()
    }
}

/// One file in the dependency tree.
///
/// The same file may appear as several nodes when it is referenced from
/// several places; [`DependencyRecord`] is the deduplicated view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyNode {
    pub path: PathBuf,
    pub kind: DependencyKind,
    /// Command that referenced this file, `None` for the root
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Command>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub exists: bool,
    /// Set when the file is already open higher up on the same branch.
    /// Cycle leaves are never expanded.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub cycle: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DependencyNode>,
}

impl DependencyNode {
    pub fn root(path: PathBuf) -> Self {
        Self {
            path,
            kind: DependencyKind::Document,
            command: None,
            line: None,
            exists: true,
            cycle: false,
            children: Vec::new(),
        }
    }

    pub fn reference(path: PathBuf, dependency: &Dependency, exists: bool) -> Self {
        Self {
            path,
            kind: dependency.kind(),
            command: Some(dependency.command),
            line: Some(dependency.line),
            exists,
            cycle: false,
            children: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.command.is_none()
    }

    /// Pre-order iterator over this node and all of its descendants.
    pub fn iter(&self) -> impl Iterator<Item = &DependencyNode> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            stack.extend(node.children.iter().rev());
            Some(node)
        })
    }

    /// Number of edges on the longest path down from this node.
    pub fn depth(&self) -> usize {
        self.children.iter().map(|c| 1 + c.depth()).max().unwrap_or(0)
    }
}

/// Entry of the flat, path-deduplicated file listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyRecord {
    pub path: PathBuf,
    pub kind: DependencyKind,
    /// Every file that references this one. Empty for the root.
    pub parents: BTreeSet<PathBuf>,
    pub exists: bool,
}

/// Non-fatal problems met while collecting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CollectWarning {
    Unreadable { path: PathBuf, message: String },
}

impl fmt::Display for CollectWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectWarning::Unreadable { path, message } => {
                write!(f, "could not read {}: {}", path.display(), message)
            }
        }
    }
}

/// Result of one collection run.
#[derive(Debug, Clone, Serialize)]
pub struct Collection {
    pub root: DependencyNode,
    /// One record per distinct path, in first-encounter order
    pub files: Vec<DependencyRecord>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<CollectWarning>,
}

impl Collection {
    pub fn record(&self, path: &Path) -> Option<&DependencyRecord> {
        self.files.iter().find(|r| r.path == path)
    }

    /// Project files that are referenced but do not exist.
    pub fn missing(&self) -> impl Iterator<Item = &DependencyRecord> {
        self.files.iter().filter(|r| !r.exists && r.kind.is_project_file())
    }

    /// Packages and classes not found next to the referencing file.
    pub fn unresolved(&self) -> impl Iterator<Item = &DependencyRecord> {
        self.files.iter().filter(|r| !r.exists && !r.kind.is_project_file())
    }

    pub fn has_cycles(&self) -> bool {
        self.root.iter().any(|n| n.cycle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dep(command: Command, raw: &str, line: usize) -> Dependency {
        Dependency { command, raw: raw.to_string(), line }
    }

    #[test]
    fn test_command_kinds() {
        assert_eq!(Command::Input.kind(), DependencyKind::Document);
        assert_eq!(Command::Include.kind(), DependencyKind::Document);
        assert_eq!(Command::IncludeGraphics.kind(), DependencyKind::Graphic);
        assert_eq!(Command::Bibliography.kind(), DependencyKind::Bibliography);
        assert_eq!(Command::AddBibResource.kind(), DependencyKind::Bibliography);
        assert_eq!(Command::UsePackage.kind(), DependencyKind::Other);
        assert_eq!(Command::DocumentClass.kind(), DependencyKind::Other);
    }

    #[test]
    fn test_only_documents_recurse() {
        assert!(DependencyKind::Document.is_recursable());
        assert!(!DependencyKind::Bibliography.is_recursable());
        assert!(!DependencyKind::Graphic.is_recursable());
        assert!(!DependencyKind::Other.is_recursable());
    }

    #[test]
    fn test_command_display() {
        assert_eq!(Command::IncludeGraphics.to_string(), "\\includegraphics");
    }

    #[test]
    fn test_iter_is_preorder() {
        let mut root = DependencyNode::root(PathBuf::from("/p/main.tex"));
        let mut a = DependencyNode::reference(
            PathBuf::from("/p/a.tex"),
            &dep(Command::Input, "a", 1),
            true,
        );
        a.children.push(DependencyNode::reference(
            PathBuf::from("/p/a1.tex"),
            &dep(Command::Input, "a1", 1),
            true,
        ));
        let b = DependencyNode::reference(
            PathBuf::from("/p/b.png"),
            &dep(Command::IncludeGraphics, "b", 2),
            false,
        );
        root.children.push(a);
        root.children.push(b);

        let order: Vec<_> =
            root.iter().map(|n| n.path.to_string_lossy().to_string()).collect();
        assert_eq!(order, vec!["/p/main.tex", "/p/a.tex", "/p/a1.tex", "/p/b.png"]);
        assert_eq!(root.depth(), 2);
        assert!(root.is_root());
        assert!(!root.children[0].is_root());
    }

    #[test]
    fn test_node_json_omits_empty_fields() {
        let node = DependencyNode::root(PathBuf::from("/p/main.tex"));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "document");
        assert!(json.get("children").is_none());
        assert!(json.get("cycle").is_none());
        assert!(json.get("command").is_none());
    }
}
