use log::trace;
use path_clean::clean;
use std::path::{Path, PathBuf};

use crate::{config::CollectorConfig, types::Command};

/// Turns the raw argument of a dependency command into a path.
///
/// Resolution is purely lexical except for graphics, where LaTeX picks the
/// first existing file among several extensions. Whether the result exists
/// is left to the caller.
pub struct PathResolver<'a> {
    config: &'a CollectorConfig,
}

impl<'a> PathResolver<'a> {
    pub fn new(config: &'a CollectorConfig) -> Self {
        Self { config }
    }

    /// Resolve `raw` as referenced by `command` inside `from_file`.
    ///
    /// Relative references are taken relative to the directory of
    /// `from_file`, so the result is absolute whenever `from_file` is.
    pub fn resolve(&self, raw: &str, from_file: &Path, command: Command) -> PathBuf {
        let base = from_file.parent().unwrap_or_else(|| Path::new(""));
        // Joining an absolute path replaces the base entirely.
        let candidate = clean(base.join(raw));

        if candidate.extension().is_some() {
            trace!("Resolved '{}' from {} to {}", raw, from_file.display(), candidate.display());
            return candidate;
        }

        let resolved = match self.config.default_extension(command) {
            Some(ext) => append_extension(&candidate, ext),
            None => self.probe_graphics(&candidate),
        };
        trace!("Resolved '{}' from {} to {}", raw, from_file.display(), resolved.display());
        resolved
    }

    fn probe_graphics(&self, candidate: &Path) -> PathBuf {
        for ext in &self.config.graphics_extensions {
            let probe = append_extension(candidate, ext.trim_start_matches('.'));
            if probe.is_file() {
                return probe;
            }
            trace!("Graphics candidate does not exist: {}", probe.display());
        }
        candidate.to_path_buf()
    }
}

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut s = path.as_os_str().to_os_string();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    #[test]
    fn test_document_gets_tex_extension() {
        let cfg = CollectorConfig::default();
        let resolver = PathResolver::new(&cfg);
        let resolved = resolver.resolve("sub", Path::new("/project/main.tex"), Command::Input);
        assert_eq!(resolved, PathBuf::from("/project/sub.tex"));
    }

    #[test]
    fn test_explicit_extension_is_kept() {
        let cfg = CollectorConfig::default();
        let resolver = PathResolver::new(&cfg);
        let resolved =
            resolver.resolve("chapters/ch01.tex", Path::new("/project/main.tex"), Command::Include);
        assert_eq!(resolved, PathBuf::from("/project/chapters/ch01.tex"));
    }

    #[test]
    fn test_relative_to_referencing_file() {
        let cfg = CollectorConfig::default();
        let resolver = PathResolver::new(&cfg);
        let resolved = resolver.resolve(
            "../appendix/a",
            Path::new("/project/chapters/ch01.tex"),
            Command::Input,
        );
        assert_eq!(resolved, PathBuf::from("/project/appendix/a.tex"));
    }

    #[test]
    fn test_absolute_reference() {
        let cfg = CollectorConfig::default();
        let resolver = PathResolver::new(&cfg);
        let resolved =
            resolver.resolve("/shared/macros", Path::new("/project/main.tex"), Command::Input);
        assert_eq!(resolved, PathBuf::from("/shared/macros.tex"));
    }

    #[test]
    fn test_bibliography_and_package_extensions() {
        let cfg = CollectorConfig::default();
        let resolver = PathResolver::new(&cfg);
        let from = Path::new("/project/main.tex");
        assert_eq!(
            resolver.resolve("refs", from, Command::Bibliography),
            PathBuf::from("/project/refs.bib")
        );
        assert_eq!(
            resolver.resolve("mystyle", from, Command::UsePackage),
            PathBuf::from("/project/mystyle.sty")
        );
        assert_eq!(
            resolver.resolve("thesis", from, Command::DocumentClass),
            PathBuf::from("/project/thesis.cls")
        );
    }

    #[test]
    fn test_graphics_probe_picks_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let main = create_test_file(root, "main.tex", "");
        create_test_file(root, "figures/figure.png", "png");

        let cfg = CollectorConfig::default();
        let resolver = PathResolver::new(&cfg);
        let resolved = resolver.resolve("figures/figure", &main, Command::IncludeGraphics);
        assert_eq!(resolved, root.join("figures/figure.png"));
    }

    #[test]
    fn test_graphics_probe_respects_priority() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let main = create_test_file(root, "main.tex", "");
        create_test_file(root, "plot.eps", "eps");
        create_test_file(root, "plot.pdf", "pdf");

        let cfg = CollectorConfig::default();
        let resolver = PathResolver::new(&cfg);
        let resolved = resolver.resolve("plot", &main, Command::IncludeGraphics);
        assert_eq!(resolved, root.join("plot.pdf"));
    }

    #[test]
    fn test_graphics_probe_falls_back_to_bare_name() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let main = create_test_file(root, "main.tex", "");

        let cfg = CollectorConfig::default();
        let resolver = PathResolver::new(&cfg);
        let resolved = resolver.resolve("missing", &main, Command::IncludeGraphics);
        assert_eq!(resolved, root.join("missing"));
    }

    #[test]
    fn test_graphics_custom_extensions() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let main = create_test_file(root, "main.tex", "");
        create_test_file(root, "logo.svg", "svg");
        create_test_file(root, "logo.png", "png");

        let cfg = CollectorConfig {
            graphics_extensions: vec![".svg".to_string(), "png".to_string()],
            ..Default::default()
        };
        let resolver = PathResolver::new(&cfg);
        let resolved = resolver.resolve("logo", &main, Command::IncludeGraphics);
        assert_eq!(resolved, root.join("logo.svg"));
    }
}
