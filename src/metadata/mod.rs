//! Project metadata loading
//!
//! Reads the `[metadata]` section of the project's declarative config.
//! Two formats are understood, picked by file extension:
//!
//! - `setup.cfg` / `.ini`: setuptools declarative config, read with rust-ini
//! - `.toml`: a `[metadata]` table of strings
//!
//! # Example
//!
//! ```no_run
//! use buildstamp::metadata;
//! use std::path::Path;
//!
//! let meta = metadata::load(Path::new("setup.cfg"))?;
//! println!("{} <{}>", meta.author, meta.author_email);
//! # Ok::<(), buildstamp::GenerateError>(())
//! ```

mod internal;

use std::path::Path;

use crate::build_info::ProjectMetadata;
use crate::error::Result;

pub use internal::ConfigFormat;

/// Load the required metadata fields from a project config file
pub fn load(path: &Path) -> Result<ProjectMetadata> {
    internal::load(path)
}
