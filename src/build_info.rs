//! Build metadata written into the generated entry-point file.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker for a value that was unavailable or not requested.
pub const NOT_AVAILABLE: &str = "n/a";

/// How much environment probing a generation run performs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DistMode {
    /// Version only
    #[default]
    None,
    /// Source distribution: adds the git revision
    #[value(alias = "source-dist")]
    Sdist,
    /// Binary distribution: adds the git revision and the build platform
    #[value(alias = "binary-dist")]
    Bdist,
}

impl DistMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistMode::None => "none",
            DistMode::Sdist => "sdist",
            DistMode::Bdist => "bdist",
        }
    }

    /// Whether the revision lookup runs in this mode
    pub fn wants_revision(&self) -> bool {
        !matches!(self, DistMode::None)
    }

    /// Whether the platform lookup runs in this mode
    pub fn wants_platform(&self) -> bool {
        matches!(self, DistMode::Bdist)
    }
}

impl fmt::Display for DistMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project metadata copied verbatim from the project configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub author: String,
    pub author_email: String,
    pub maintainer_email: String,
    pub url: String,
    pub download_url: String,
    pub license: String,
}

/// Every value interpolated into the entry-point template.
///
/// Built once per generation run and discarded after rendering. All fields
/// are plain strings; unavailable lookups hold [`NOT_AVAILABLE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub version: String,
    pub author: String,
    pub author_email: String,
    pub maintainer_email: String,
    pub url: String,
    pub download_url: String,
    pub license: String,
    pub revision: String,
    pub platform: String,
}

/// Assignment names in the generated file, paired with their template placeholder.
pub const ASSIGNMENTS: [(&str, &str); 9] = [
    ("__version__", "version"),
    ("__license__", "license"),
    ("__author__", "author"),
    ("__author_email__", "author_email"),
    ("__maintainer_email__", "maintainer_email"),
    ("__url__", "url"),
    ("__download_url__", "download_url"),
    ("__git_sha__", "revision"),
    ("__build_platform__", "platform"),
];

impl BuildInfo {
    pub fn new(
        version: impl Into<String>,
        metadata: ProjectMetadata,
        revision: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            author: metadata.author,
            author_email: metadata.author_email,
            maintainer_email: metadata.maintainer_email,
            url: metadata.url,
            download_url: metadata.download_url,
            license: metadata.license,
            revision: revision.into(),
            platform: platform.into(),
        }
    }

    /// Look up a field by its template placeholder name
    pub fn field(&self, placeholder: &str) -> Option<&str> {
        let value = match placeholder {
            "version" => &self.version,
            "license" => &self.license,
            "author" => &self.author,
            "author_email" => &self.author_email,
            "maintainer_email" => &self.maintainer_email,
            "url" => &self.url,
            "download_url" => &self.download_url,
            "revision" => &self.revision,
            "platform" => &self.platform,
            _ => return None,
        };
        Some(value.as_str())
    }

    fn field_mut(&mut self, placeholder: &str) -> Option<&mut String> {
        match placeholder {
            "version" => Some(&mut self.version),
            "license" => Some(&mut self.license),
            "author" => Some(&mut self.author),
            "author_email" => Some(&mut self.author_email),
            "maintainer_email" => Some(&mut self.maintainer_email),
            "url" => Some(&mut self.url),
            "download_url" => Some(&mut self.download_url),
            "revision" => Some(&mut self.revision),
            "platform" => Some(&mut self.platform),
            _ => None,
        }
    }

    /// Recover the assignment values from a generated entry-point file.
    ///
    /// Only top-level `__name__ = '...'` lines are considered; the first
    /// occurrence of each name wins. Returns `None` unless all nine
    /// assignments are present.
    pub fn parse(text: &str) -> Option<Self> {
        let mut info = BuildInfo {
            version: String::new(),
            author: String::new(),
            author_email: String::new(),
            maintainer_email: String::new(),
            url: String::new(),
            download_url: String::new(),
            license: String::new(),
            revision: String::new(),
            platform: String::new(),
        };
        let mut seen = [false; ASSIGNMENTS.len()];

        for line in text.lines() {
            let Some((name, value)) = parse_assignment(line) else {
                continue;
            };
            let Some(idx) = ASSIGNMENTS.iter().position(|(n, _)| *n == name) else {
                continue;
            };
            if seen[idx] {
                continue;
            }
            seen[idx] = true;
            if let Some(slot) = info.field_mut(ASSIGNMENTS[idx].1) {
                *slot = value.to_string();
            }
        }

        seen.iter().all(|s| *s).then_some(info)
    }
}

/// Split `__name__ = 'value'` into its name and unquoted value
fn parse_assignment(line: &str) -> Option<(&str, &str)> {
    let (name, rest) = line.split_once(" = ")?;
    if !name.starts_with("__") || !name.ends_with("__") {
        return None;
    }
    let value = rest.strip_prefix('\'')?.strip_suffix('\'')?;
    Some((name, value))
}
