//! Serializers for a collected dependency graph.
//!
//! The core crate knows nothing about output formats; a caller picks an
//! [`Exporter`] (usually through [`ExportFormat`]) and hands it the tree and
//! the flat listing.

use anyhow::Result;
use clap::ValueEnum;
use log::debug;
use serde::Serialize;
use serde_json::json;
use std::{
    collections::HashMap,
    io::Write,
    path::{Path, PathBuf},
};

use texdeps_core::{DependencyKind, DependencyNode, DependencyRecord};

use crate::{graph::unique_edges, reporter::display_path};

pub trait Exporter {
    fn export(
        &self,
        root: &DependencyNode,
        files: &[DependencyRecord],
        writer: &mut dyn Write,
    ) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// Tree and file listing as JSON
    Json,
    /// File listing as CSV
    Csv,
    /// File listing as an aligned text table
    Table,
    /// Standalone HTML page with an interactive graph
    Html,
}

impl ExportFormat {
    pub fn exporter(self) -> Box<dyn Exporter> {
        match self {
            ExportFormat::Json => Box::new(JsonExporter),
            ExportFormat::Csv => Box::new(CsvExporter),
            ExportFormat::Table => Box::new(TableExporter),
            ExportFormat::Html => Box::new(HtmlExporter),
        }
    }
}

fn joined_parents(record: &DependencyRecord) -> String {
    record.parents.iter().map(|p| p.to_string_lossy()).collect::<Vec<_>>().join(";")
}

fn base_dir(root: &DependencyNode) -> &Path {
    root.path.parent().unwrap_or(&root.path)
}

pub struct JsonExporter;

#[derive(Serialize)]
struct JsonDocument<'a> {
    root: &'a DependencyNode,
    files: &'a [DependencyRecord],
}

impl Exporter for JsonExporter {
    fn export(
        &self,
        root: &DependencyNode,
        files: &[DependencyRecord],
        writer: &mut dyn Write,
    ) -> Result<()> {
        debug!("Exporting {} files as JSON", files.len());
        serde_json::to_writer_pretty(&mut *writer, &JsonDocument { root, files })?;
        writeln!(writer)?;
        Ok(())
    }
}

pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn export(
        &self,
        _root: &DependencyNode,
        files: &[DependencyRecord],
        writer: &mut dyn Write,
    ) -> Result<()> {
        debug!("Exporting {} files as CSV", files.len());
        let mut csv_writer = csv::Writer::from_writer(writer);
        csv_writer.write_record(["path", "kind", "parents", "exists"])?;
        for record in files {
            let path = record.path.to_string_lossy();
            let parents = joined_parents(record);
            csv_writer.write_record([
                &*path,
                record.kind.as_str(),
                parents.as_str(),
                if record.exists { "true" } else { "false" },
            ])?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Plain-text table with paths shown relative to the root document.
pub struct TableExporter;

impl Exporter for TableExporter {
    fn export(
        &self,
        root: &DependencyNode,
        files: &[DependencyRecord],
        writer: &mut dyn Write,
    ) -> Result<()> {
        debug!("Exporting {} files as a table", files.len());
        let base = base_dir(root);
        let headers = ["path", "kind", "parents", "exists"];
        let rows: Vec<[String; 4]> = files
            .iter()
            .map(|r| {
                let parents = r
                    .parents
                    .iter()
                    .map(|p| display_path(base, p))
                    .collect::<Vec<_>>()
                    .join(", ");
                [display_path(base, &r.path), r.kind.to_string(), parents, r.exists.to_string()]
            })
            .collect();

        let mut widths = headers.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let header_line = headers
            .iter()
            .zip(widths)
            .map(|(h, w)| format!("{:<w$}", h))
            .collect::<Vec<_>>()
            .join(" | ");
        writeln!(writer, "{}", header_line.trim_end())?;
        writeln!(writer, "{}", "-".repeat(header_line.trim_end().len()))?;
        for row in &rows {
            let line = row
                .iter()
                .zip(widths)
                .map(|(cell, w)| format!("{:<w$}", cell))
                .collect::<Vec<_>>()
                .join(" | ");
            writeln!(writer, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

/// Standalone HTML page rendering the graph with vis-network.
pub struct HtmlExporter;

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>LaTeX Dependency Graph - {{TITLE}}</title>
    <script src="https://unpkg.com/vis-network/standalone/umd/vis-network.min.js"></script>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 20px; background-color: #f5f5f5; }
        .container { max-width: 1200px; margin: 0 auto; background: white; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); padding: 20px; }
        h1 { color: #333; text-align: center; margin-bottom: 10px; }
        .subtitle { text-align: center; color: #666; margin-bottom: 30px; }
        #graph { width: 100%; height: 800px; }
        .legend { display: flex; justify-content: center; gap: 20px; margin: 20px 0; flex-wrap: wrap; }
        .legend-item { display: flex; align-items: center; gap: 5px; }
        .legend-color { width: 16px; height: 16px; border-radius: 50%; display: inline-block; }
    </style>
</head>
<body>
    <div class="container">
        <h1>LaTeX Dependency Graph</h1>
        <p class="subtitle">{{FILES}} files, {{REFERENCES}} references from {{TITLE}}</p>
        <div class="legend">
            <div class="legend-item"><span class="legend-color" style="background-color: #FF6B6B;"></span><span>Root File</span></div>
            <div class="legend-item"><span class="legend-color" style="background-color: #4ECDC4;"></span><span>TeX Files</span></div>
            <div class="legend-item"><span class="legend-color" style="background-color: #45B7D1;"></span><span>Other Files</span></div>
            <div class="legend-item"><span class="legend-color" style="background-color: #95A5A6;"></span><span>Missing Files</span></div>
        </div>
        <div id="graph"></div>
    </div>
    <script type="application/json" id="graph-data">
{{DATA}}
    </script>
    <script>
        const graph = JSON.parse(document.getElementById('graph-data').textContent);
        const nodes = new vis.DataSet(graph.nodes);
        const edges = new vis.DataSet(graph.edges);
        new vis.Network(document.getElementById('graph'), { nodes, edges }, {
            edges: { arrows: 'to', smooth: { type: 'cubicBezier' } },
            layout: { hierarchical: { direction: 'UD', sortMethod: 'directed' } },
            physics: false
        });
    </script>
</body>
</html>
"#;

impl HtmlExporter {
    fn color(record: &DependencyRecord, is_root: bool) -> &'static str {
        if is_root {
            "#FF6B6B"
        } else if !record.exists {
            "#95A5A6"
        } else if record.kind == DependencyKind::Document {
            "#4ECDC4"
        } else {
            "#45B7D1"
        }
    }

    fn graph_data(root: &DependencyNode, files: &[DependencyRecord]) -> serde_json::Value {
        let base = base_dir(root);
        let ids: HashMap<&PathBuf, usize> =
            files.iter().enumerate().map(|(idx, r)| (&r.path, idx)).collect();

        let nodes: Vec<_> = files
            .iter()
            .enumerate()
            .map(|(idx, r)| {
                let label = r
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| r.path.to_string_lossy().to_string());
                json!({
                    "id": idx,
                    "label": label,
                    "title": format!(
                        "{}\nkind: {}\nexists: {}",
                        display_path(base, &r.path),
                        r.kind,
                        r.exists
                    ),
                    "color": Self::color(r, r.path == root.path),
                    "shape": "dot",
                })
            })
            .collect();

        let edges: Vec<_> = unique_edges(root)
            .iter()
            .filter_map(|e| {
                let from = ids.get(&e.parent)?;
                let to = ids.get(&e.child)?;
                Some(json!({
                    "from": from,
                    "to": to,
                    "title": format!("{} (line {})", e.command, e.line),
                    "dashes": e.cycle,
                }))
            })
            .collect();

        json!({ "nodes": nodes, "edges": edges })
    }
}

impl Exporter for HtmlExporter {
    fn export(
        &self,
        root: &DependencyNode,
        files: &[DependencyRecord],
        writer: &mut dyn Write,
    ) -> Result<()> {
        debug!("Exporting {} files as HTML", files.len());
        let data = Self::graph_data(root, files);
        let references = data["edges"].as_array().map_or(0, Vec::len);
        // A literal "</script>" inside the JSON would end the data block early.
        let data = serde_json::to_string_pretty(&data)?.replace("</", "<\\/");
        let title = root
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let title = escape_html(&title);
        let file_count = files.len().to_string();
        let references = references.to_string();
        let page = fill_template(
            HTML_TEMPLATE,
            &[
                ("TITLE", title.as_str()),
                ("FILES", file_count.as_str()),
                ("REFERENCES", references.as_str()),
                ("DATA", data.as_str()),
            ],
        );
        writer.write_all(page.as_bytes())?;
        Ok(())
    }
}

/// Substitute `{{NAME}}` slots in one pass. Inserted values are not scanned
/// again, and unknown slots are left as they are.
fn fill_template(template: &str, slots: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let slot = after.find("}}").and_then(|end| {
            slots.iter().find(|(name, _)| *name == &after[..end]).map(|(_, value)| (end, *value))
        });
        match slot {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}
