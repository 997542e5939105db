use std::{
    io::{self, Write},
    path::{Component, Path, PathBuf},
};

use colored::{ColoredString, Colorize};
use log::{debug, trace};

use texdeps_core::{CollectWarning, Collection, DependencyKind, DependencyNode};

use crate::graph::GraphSummary;

/// Show `path` relative to `base` when they share a root, as-is otherwise.
pub(crate) fn display_path(base: &Path, path: &Path) -> String {
    match make_relative(path, base) {
        Some(rel) => rel.to_string_lossy().to_string(),
        None => {
            trace!("Could not relativize {} to {}", path.display(), base.display());
            path.to_string_lossy().to_string()
        }
    }
}

/// Create a relative path from `base` to `target`
fn make_relative(target: &Path, base: &Path) -> Option<PathBuf> {
    let target: Vec<Component> = target.components().collect();
    let base: Vec<Component> = base.components().collect();

    let common = target.iter().zip(&base).take_while(|(t, b)| t == b).count();
    if common == 0 {
        return None;
    }

    let mut result: PathBuf = base[common..]
        .iter()
        .map(|_| Component::ParentDir)
        .chain(target[common..].iter().copied())
        .collect();
    if result.as_os_str().is_empty() {
        result.push(".");
    }
    Some(result)
}

fn base_dir(root: &Path) -> &Path {
    root.parent().unwrap_or(root)
}

fn colorize(node: &DependencyNode, text: String) -> ColoredString {
    match node.kind {
        DependencyKind::Document => text.blue(),
        DependencyKind::Bibliography => text.magenta(),
        DependencyKind::Graphic => text.cyan(),
        DependencyKind::Other => text.normal(),
    }
}

fn describe(node: &DependencyNode, base: &Path) -> String {
    let mut label = colorize(node, display_path(base, &node.path)).to_string();
    if let (Some(command), Some(line)) = (node.command, node.line) {
        label.push_str(&format!("  {}", format!("{}:{}", command, line).dimmed()));
    }
    if node.cycle {
        label.push_str(&format!(" {}", "(cycle)".yellow()));
    } else if !node.exists && node.kind.is_project_file() {
        label.push_str(&format!(" {}", "(missing)".red().bold()));
    } else if !node.exists {
        label.push_str(&format!(" {}", "(not local)".dimmed()));
    }
    label
}

fn print_children<W: Write>(
    writer: &mut W,
    node: &DependencyNode,
    base: &Path,
    prefix: &str,
) -> io::Result<()> {
    for (idx, child) in node.children.iter().enumerate() {
        let is_last = idx == node.children.len() - 1;
        let (branch, indent) = if is_last { ("└──", "    ") } else { ("├──", "│   ") };
        writeln!(writer, "{}{} {}", prefix.dimmed(), branch.dimmed(), describe(child, base))?;
        print_children(writer, child, base, &format!("{}{}", prefix, indent))?;
    }
    Ok(())
}

/// Print the dependency tree, paths relative to the root document.
pub fn print_tree<W: Write>(writer: &mut W, collection: &Collection) -> io::Result<()> {
    let root = &collection.root;
    debug!("Printing tree for {}", root.path.display());
    let base = base_dir(&root.path);

    writeln!(writer, "{}", display_path(base, &root.path).bright_white().bold())?;
    print_children(writer, root, base, "")?;
    writeln!(writer)?;
    print_warnings(writer, &collection.warnings)?;
    writer.flush()?;
    Ok(())
}

pub fn print_warnings<W: Write>(writer: &mut W, warnings: &[CollectWarning]) -> io::Result<()> {
    for warning in warnings {
        writeln!(writer, "{} {}", "⚠".yellow().bold(), warning)?;
    }
    Ok(())
}

/// Verdict on missing project files, in the style of a lint result.
///
/// Packages and classes that are not in the project get their own line and
/// never count as missing.
pub fn print_status<W: Write>(writer: &mut W, collection: &Collection) -> io::Result<()> {
    let missing = collection.missing().count();
    let project_files = collection.files.iter().filter(|r| r.kind.is_project_file()).count();
    if missing == 0 {
        writeln!(
            writer,
            "{} All {} project files exist.",
            "✓".green().bold(),
            project_files
        )?;
    } else {
        writeln!(
            writer,
            "{} {} of {} project files are missing.",
            "⚠".yellow().bold(),
            missing.to_string().red().bold(),
            project_files
        )?;
    }

    let unresolved = collection.unresolved().count();
    if unresolved > 0 {
        writeln!(
            writer,
            "{} {} packages or classes not found locally, left to the TeX installation.",
            "ℹ".bright_blue(),
            unresolved
        )?;
    }
    writer.flush()?;
    Ok(())
}

pub fn print_summary<W: Write>(writer: &mut W, summary: &GraphSummary) -> io::Result<()> {
    debug!("Printing summary for {}", summary.root.display());
    let base = base_dir(&summary.root);

    writeln!(writer, "{}", "LaTeX Dependency Graph".bold())?;
    writeln!(writer, "{}", "─".repeat(60).dimmed())?;
    writeln!(writer, "  Root file: {}", display_path(base, &summary.root).blue())?;
    writeln!(writer, "  Files: {}", summary.files.to_string().cyan())?;
    writeln!(writer, "  References: {}", summary.references.to_string().cyan())?;
    writeln!(writer, "  Max depth: {}", summary.max_depth.to_string().cyan())?;

    writeln!(writer, "\n  Files by kind:")?;
    for (kind, count) in &summary.by_kind {
        writeln!(writer, "    {}: {}", kind, count)?;
    }

    writeln!(writer, "\n  References by command:")?;
    for (command, count) in &summary.by_command {
        writeln!(writer, "    {}: {}", command, count)?;
    }

    if summary.is_acyclic() {
        writeln!(writer, "\n  Acyclic: {}", "yes".green())?;
    } else {
        writeln!(
            writer,
            "\n  Acyclic: {} ({} cycles)",
            "no".yellow().bold(),
            summary.cycles.len()
        )?;
        for edge in &summary.cycles {
            writeln!(
                writer,
                "    {} -> {}  {}",
                display_path(base, &edge.parent),
                display_path(base, &edge.child),
                format!("{}:{}", edge.command, edge.line).dimmed()
            )?;
        }
    }

    if !summary.missing.is_empty() {
        writeln!(writer, "\n  Missing files ({}):", summary.missing.len().to_string().red().bold())?;
        for path in &summary.missing {
            writeln!(writer, "    {}", display_path(base, path).red())?;
        }
    }

    if !summary.unresolved.is_empty() {
        writeln!(writer, "\n  Not found locally ({}):", summary.unresolved.len())?;
        for path in &summary.unresolved {
            writeln!(writer, "    {}", display_path(base, path).dimmed())?;
        }
    }

    writeln!(writer, "\n  Leaf files: {}", summary.leaves.len())?;
    writer.flush()?;
    Ok(())
}
