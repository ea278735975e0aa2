use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use buildstamp::{BuildInfo, Settings};

pub fn execute(root: &Path, path: Option<PathBuf>, json: bool) -> Result<()> {
    let path = match path {
        Some(path) => root.join(path),
        None => Settings::load(root)?.output(),
    };

    let contents = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let info = BuildInfo::parse(&contents)
        .with_context(|| format!("{} is not a generated entry-point file", path.display()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("version:          {}", info.version);
    println!("license:          {}", info.license);
    println!("author:           {} <{}>", info.author, info.author_email);
    println!("maintainer email: {}", info.maintainer_email);
    println!("url:              {}", info.url);
    println!("download url:     {}", info.download_url);
    println!("git revision:     {}", info.revision);
    println!("build platform:   {}", info.platform);
    Ok(())
}
