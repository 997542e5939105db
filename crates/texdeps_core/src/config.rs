use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    constants::{
        BIBLIOGRAPHY_EXTENSION, CLASS_EXTENSION, CONFIG_FILE_NAME, DOCUMENT_EXTENSION,
        GRAPHICS_EXTENSIONS, PACKAGE_EXTENSION,
    },
    error::CollectError,
    types::Command,
};

/// Settings of a collection run.
///
/// Every field is optional in the JSON config file; missing ones keep their
/// default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollectorConfig {
    pub document_extension: String,
    pub bibliography_extension: String,
    pub package_extension: String,
    pub class_extension: String,
    /// Tried in order for graphics references without an extension
    pub graphics_extensions: Vec<String>,
    /// Fail the whole run when a referenced file exists but cannot be read,
    /// instead of recording a warning and continuing
    pub strict: bool,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            document_extension: DOCUMENT_EXTENSION.to_string(),
            bibliography_extension: BIBLIOGRAPHY_EXTENSION.to_string(),
            package_extension: PACKAGE_EXTENSION.to_string(),
            class_extension: CLASS_EXTENSION.to_string(),
            graphics_extensions: GRAPHICS_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            strict: false,
        }
    }
}

impl CollectorConfig {
    pub fn from_file(path: &Path) -> Result<Self, CollectError> {
        debug!("Reading config from {}", path.display());
        let content = fs::read_to_string(path).map_err(|source| CollectError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|e| CollectError::InvalidConfig {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Extension appended to an extension-less reference made by `command`.
    /// `None` for graphics, which are probed against
    /// [`graphics_extensions`](Self::graphics_extensions) instead.
    pub fn default_extension(&self, command: Command) -> Option<&str> {
        let ext = match command {
            Command::Input | Command::Include => &self.document_extension,
            Command::Bibliography | Command::AddBibResource => &self.bibliography_extension,
            Command::UsePackage => &self.package_extension,
            Command::DocumentClass => &self.class_extension,
            Command::IncludeGraphics => return None,
        };
        Some(ext.trim_start_matches('.'))
    }
}

/// Look for the config file in `start` and each of its parents.
pub fn find_config_file(start: &Path) -> Option<PathBuf> {
    let start = start.canonicalize().unwrap_or_else(|_| start.to_path_buf());
    trace!("Searching for {} from {}", CONFIG_FILE_NAME, start.display());

    for dir in start.ancestors() {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            debug!("Found config file at {}", candidate.display());
            return Some(candidate);
        }
    }

    debug!("No {} found above {}", CONFIG_FILE_NAME, start.display());
    None
}

/// Load the nearest config file above `start`, or the defaults when there is none.
pub fn load_config(start: &Path) -> Result<CollectorConfig, CollectError> {
    match find_config_file(start) {
        Some(path) => CollectorConfig::from_file(&path),
        None => Ok(CollectorConfig::default()),
    }
}
