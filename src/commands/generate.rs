use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use buildstamp::{InitFileGenerator, Settings};

use crate::GenerateArgs;

/// Load settings for `root` and apply command-line overrides
pub fn settings(root: &Path, args: &GenerateArgs) -> Result<Settings> {
    let mut settings = Settings::load(root)?;

    if let Some(output) = &args.output {
        settings.paths.output = output.clone();
    }
    if let Some(config) = &args.config {
        settings.paths.project_config = config.clone();
    }
    if let Some(version_file) = &args.version_file {
        settings.paths.version_file = version_file.clone();
    }

    Ok(settings)
}

pub fn execute(root: &Path, args: &GenerateArgs) -> Result<()> {
    let generator = InitFileGenerator::new(settings(root, args)?);

    let info = generator.build_info(args.dist, args.version.as_deref(), args.sha.as_deref())?;
    generator.write(&info)?;

    println!(
        "{} wrote init for {} {}",
        "✓".green(),
        info.version.bold(),
        info.revision
    );
    println!("  {}", generator.settings().output().display());
    Ok(())
}

pub fn render(root: &Path, args: &GenerateArgs) -> Result<()> {
    let generator = InitFileGenerator::new(settings(root, args)?);
    let text = generator.render(args.dist, args.version.as_deref(), args.sha.as_deref())?;
    print!("{text}");
    Ok(())
}
