//! Project settings stored in `buildstamp.toml`
//!
//! Every section is optional; a missing file yields the defaults, which
//! match the layout of a setuptools project with a `version` file and a
//! `setup.cfg` at its root.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{GenerateError, Result};

pub const SETTINGS_FILE: &str = "buildstamp.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Project root every relative path is resolved against
    #[serde(skip)]
    pub project_root: PathBuf,
    #[serde(default)]
    pub paths: PathsSection,
    #[serde(default)]
    pub revision: RevisionSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsSection {
    /// Plain-text file holding the version string
    #[serde(default = "default_version_file")]
    pub version_file: PathBuf,
    /// Declarative project config with a `[metadata]` section
    #[serde(default = "default_project_config")]
    pub project_config: PathBuf,
    /// Generated entry-point file
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_version_file() -> PathBuf {
    PathBuf::from("version")
}
fn default_project_config() -> PathBuf {
    PathBuf::from("setup.cfg")
}
fn default_output() -> PathBuf {
    PathBuf::from("psychopy").join("__init__.py")
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            version_file: default_version_file(),
            project_config: default_project_config(),
            output: default_output(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevisionSection {
    /// Upper bound on the source-control query
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Directory the query runs in, relative to the project root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for RevisionSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            working_dir: None,
        }
    }
}

impl Settings {
    /// Default settings rooted at `project_root`
    pub fn for_root(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            ..Default::default()
        }
    }

    /// Load `buildstamp.toml` from the project root, falling back to defaults
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join(SETTINGS_FILE);

        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::for_root(project_root));
        }

        let contents = fs::read_to_string(&path).map_err(|e| GenerateError::Settings {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let mut settings: Settings =
            toml::from_str(&contents).map_err(|e| GenerateError::Settings {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        settings.project_root = project_root.to_path_buf();

        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn version_file(&self) -> PathBuf {
        self.project_root.join(&self.paths.version_file)
    }

    pub fn project_config(&self) -> PathBuf {
        self.project_root.join(&self.paths.project_config)
    }

    pub fn output(&self) -> PathBuf {
        self.project_root.join(&self.paths.output)
    }

    /// Directory the revision query runs in
    pub fn revision_dir(&self) -> PathBuf {
        match &self.revision.working_dir {
            Some(dir) => self.project_root.join(dir),
            None => self.project_root.clone(),
        }
    }

    pub fn revision_timeout(&self) -> Duration {
        Duration::from_secs(self.revision.timeout_secs)
    }
}
