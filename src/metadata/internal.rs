//! Internal implementation for metadata module

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use ini::{Ini, ParseOption};

use crate::build_info::ProjectMetadata;
use crate::error::{GenerateError, Result};

const METADATA_SECTION: &str = "metadata";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// setuptools `setup.cfg` style
    Cfg,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Cfg,
        }
    }
}

pub fn load(path: &Path) -> Result<ProjectMetadata> {
    let contents = fs::read_to_string(path).map_err(|e| GenerateError::ConfigRead {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    from_str(&contents, ConfigFormat::from_path(path), path)
}

pub fn from_str(contents: &str, format: ConfigFormat, path: &Path) -> Result<ProjectMetadata> {
    let section = match format {
        ConfigFormat::Cfg => cfg_section(contents, METADATA_SECTION, path)?,
        ConfigFormat::Toml => toml_section(contents, METADATA_SECTION, path)?,
    };

    let take = |key: &str| -> Result<String> {
        section
            .get(key)
            .cloned()
            .ok_or_else(|| GenerateError::MissingMetadataField {
                key: key.to_string(),
                path: path.to_path_buf(),
            })
    };

    Ok(ProjectMetadata {
        author: take("author")?,
        author_email: take("author_email")?,
        maintainer_email: take("maintainer_email")?,
        // setuptools accepts `home_page` as an alias of `url`
        url: take("url").or_else(|err| section.get("home_page").cloned().ok_or(err))?,
        download_url: take("download_url")?,
        license: take("license")?,
    })
}

// =============================================================================
// setup.cfg
// =============================================================================

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('-', "_")
}

/// Collect the key/value pairs of one section of a setuptools config.
///
/// Section names match exactly; indented lines continue the previous value.
/// Values are kept verbatim, without quote or escape processing.
fn cfg_section(contents: &str, wanted: &str, path: &Path) -> Result<HashMap<String, String>> {
    let options = ParseOption {
        enabled_quote: false,
        enabled_escape: false,
        enabled_indented_mutiline_value: true,
        ..ParseOption::default()
    };
    let ini = Ini::load_from_str_opt(contents, options).map_err(|e| GenerateError::ConfigRead {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut values: HashMap<String, String> = HashMap::new();
    if let Some(section) = ini.section(Some(wanted)) {
        for (key, value) in section.iter() {
            values.insert(normalize_key(key), value.trim().to_string());
        }
    }
    Ok(values)
}

// =============================================================================
// TOML
// =============================================================================

fn toml_section(contents: &str, wanted: &str, path: &Path) -> Result<HashMap<String, String>> {
    let doc: toml::Table = contents.parse().map_err(|e: toml::de::Error| {
        GenerateError::ConfigRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    let mut values: HashMap<String, String> = HashMap::new();
    if let Some(table) = doc.get(wanted).and_then(|v| v.as_table()) {
        for (key, value) in table {
            if let Some(s) = value.as_str() {
                values.insert(normalize_key(key), s.to_string());
            }
        }
    }
    Ok(values)
}
