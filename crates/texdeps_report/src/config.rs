use anyhow::{Result, anyhow};
use clap::Parser;
use log::{debug, info};
use std::{
    env,
    path::{Path, PathBuf},
};

use texdeps_core::{CollectorConfig, load_config};

use crate::runner::discover_roots;

#[derive(Debug, Clone, Parser)]
#[command(name = "collect")]
#[command(about = "Collect the file dependencies of LaTeX documents")]
pub struct Config {
    /// Root documents (defaults to every file with a \documentclass under the current directory)
    pub roots: Vec<PathBuf>,

    /// JSON config file applied to every root (defaults to the nearest .texdeps.json above each root)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Fail when a referenced file exists but cannot be read
    #[arg(long)]
    pub strict: bool,

    /// Extensions tried, in order, for \includegraphics references without one
    #[arg(long, value_delimiter = ',')]
    pub graphics_extensions: Option<Vec<String>>,

    #[clap(skip)]
    pub collector: CollectorConfig,
}

impl Config {
    /// Discover roots when none were given and build the collector settings
    /// from the config file and command-line overrides.
    pub fn initialize(&mut self) -> Result<()> {
        if self.roots.is_empty() {
            let cwd = env::current_dir()?;
            debug!("No roots provided, searching for documents under {}", cwd.display());
            self.roots = discover_roots(&cwd)?;
            if self.roots.is_empty() {
                return Err(anyhow!("No root documents found under {}", cwd.display()));
            }
            info!("Found {} root documents", self.roots.len());
        }

        let collector = match &self.config {
            Some(path) => {
                debug!("Using provided config file: {:?}", path);
                CollectorConfig::from_file(path)?
            }
            None => load_config(&self.project_dir())?,
        };
        self.collector = self.apply_overrides(collector);
        debug!("Collector config: {:?}", self.collector);
        Ok(())
    }

    /// Collector settings for one root. Without `--config`, each root reads
    /// the nearest config file above its own directory.
    pub fn collector_for(&self, root: &Path) -> Result<CollectorConfig> {
        if self.config.is_some() {
            return Ok(self.collector.clone());
        }
        let collector = load_config(&dir_of(root))?;
        Ok(self.apply_overrides(collector))
    }

    fn apply_overrides(&self, mut collector: CollectorConfig) -> CollectorConfig {
        if self.strict {
            collector.strict = true;
        }
        if let Some(exts) = &self.graphics_extensions {
            collector.graphics_extensions = exts.clone();
        }
        collector
    }

    /// Directory of the first root, used to find the config file and to
    /// shorten displayed paths.
    pub fn project_dir(&self) -> PathBuf {
        self.roots.first().map_or_else(|| dir_of(Path::new("")), |root| dir_of(root))
    }
}

/// Canonical directory containing `file`; a bare file name lives in `.`.
fn dir_of(file: &Path) -> PathBuf {
    let dir = file
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_for(roots: Vec<PathBuf>) -> Config {
        Config {
            roots,
            config: None,
            strict: false,
            graphics_extensions: None,
            collector: CollectorConfig::default(),
        }
    }

    #[test]
    fn test_cli_parsing() {
        let cfg = Config::try_parse_from([
            "collect",
            "main.tex",
            "--strict",
            "--graphics-extensions",
            "svg,png",
        ])
        .unwrap();
        assert_eq!(cfg.roots, vec![PathBuf::from("main.tex")]);
        assert!(cfg.strict);
        assert_eq!(cfg.graphics_extensions, Some(vec!["svg".to_string(), "png".to_string()]));
    }

    #[test]
    fn test_initialize_applies_file_then_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("main.tex"), "").unwrap();
        fs::write(
            root.join(".texdeps.json"),
            r#"{ "graphics_extensions": ["eps"], "bibliography_extension": "bibtex" }"#,
        )
        .unwrap();

        let mut cfg = config_for(vec![root.join("main.tex")]);
        cfg.strict = true;
        cfg.graphics_extensions = Some(vec!["svg".to_string()]);
        cfg.initialize().unwrap();

        assert!(cfg.collector.strict);
        assert_eq!(cfg.collector.graphics_extensions, vec!["svg"]);
        assert_eq!(cfg.collector.bibliography_extension, "bibtex");
    }

    #[test]
    fn test_initialize_with_explicit_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("main.tex"), "").unwrap();
        let config_path = root.join("custom.json");
        fs::write(&config_path, r#"{ "document_extension": "ltx" }"#).unwrap();

        let mut cfg = config_for(vec![root.join("main.tex")]);
        cfg.config = Some(config_path);
        cfg.initialize().unwrap();
        assert_eq!(cfg.collector.document_extension, "ltx");
    }

    #[test]
    fn test_collector_for_reads_config_next_to_each_root() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("paper")).unwrap();
        fs::create_dir_all(root.join("talk")).unwrap();
        fs::write(root.join("paper/.texdeps.json"), r#"{ "document_extension": "ltx" }"#).unwrap();

        let mut cfg = config_for(vec![root.join("paper/main.tex"), root.join("talk/main.tex")]);
        cfg.strict = true;

        let paper = cfg.collector_for(&root.join("paper/main.tex")).unwrap();
        let talk = cfg.collector_for(&root.join("talk/main.tex")).unwrap();
        assert_eq!(paper.document_extension, "ltx");
        assert_eq!(talk.document_extension, "tex");
        assert!(paper.strict && talk.strict);
    }

    #[test]
    fn test_collector_for_uses_explicit_config_everywhere() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("talk")).unwrap();
        fs::write(root.join("main.tex"), "").unwrap();
        fs::write(root.join("talk/.texdeps.json"), r#"{ "document_extension": "ltx" }"#).unwrap();
        let config_path = root.join("shared.json");
        fs::write(&config_path, r#"{ "bibliography_extension": "bibtex" }"#).unwrap();

        let mut cfg = config_for(vec![root.join("main.tex"), root.join("talk/main.tex")]);
        cfg.config = Some(config_path);
        cfg.initialize().unwrap();

        let talk = cfg.collector_for(&root.join("talk/main.tex")).unwrap();
        assert_eq!(talk.document_extension, "tex");
        assert_eq!(talk.bibliography_extension, "bibtex");
    }

    #[test]
    fn test_project_dir_of_bare_file_name() {
        let cfg = config_for(vec![PathBuf::from("main.tex")]);
        assert_eq!(cfg.project_dir(), Path::new(".").canonicalize().unwrap());
    }
}
