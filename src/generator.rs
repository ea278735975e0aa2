//! Entry-point file generation
//!
//! Pipeline: version file + project metadata → revision → platform →
//! template → output file. Fatal errors (version, metadata, write) are
//! returned before anything touches the output path; revision and platform
//! lookups only ever degrade to `"n/a"`.

use std::fs;

use crate::build_info::{BuildInfo, DistMode};
use crate::error::{GenerateError, Result};
use crate::metadata;
use crate::platform::{HostOs, PlatformDescriber};
use crate::revision::RevisionResolver;
use crate::settings::Settings;
use crate::template::Template;

#[derive(Debug, Clone)]
pub struct InitFileGenerator {
    settings: Settings,
    template: Template,
    revision: RevisionResolver,
    platform: PlatformDescriber,
}

impl InitFileGenerator {
    /// Generator using the bundled template and the running host. The host
    /// is only inspected once a binary distribution needs its platform.
    pub fn new(settings: Settings) -> Self {
        let revision = RevisionResolver::new(settings.revision_dir(), settings.revision_timeout());
        Self {
            settings,
            template: Template::bundled(),
            revision,
            platform: PlatformDescriber::detect(),
        }
    }

    pub fn with_template(mut self, template: Template) -> Self {
        self.template = template;
        self
    }

    pub fn with_host(mut self, host: HostOs) -> Self {
        self.platform = PlatformDescriber::new(host);
        self
    }

    pub fn with_revision_resolver(mut self, revision: RevisionResolver) -> Self {
        self.revision = revision;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn platform(&self) -> &PlatformDescriber {
        &self.platform
    }

    /// Read and trim the version file
    pub fn read_version(&self) -> Result<String> {
        let path = self.settings.version_file();
        if !path.is_file() {
            return Err(GenerateError::MissingVersionFile { path });
        }

        let version = fs::read_to_string(&path)
            .map_err(|source| GenerateError::VersionRead {
                path: path.clone(),
                source,
            })?
            .trim()
            .to_string();

        if version.is_empty() {
            return Err(GenerateError::MissingVersionFile { path });
        }
        Ok(version)
    }

    /// Gather every value for the template
    pub fn build_info(
        &self,
        mode: DistMode,
        version: Option<&str>,
        revision: Option<&str>,
    ) -> Result<BuildInfo> {
        let version = match version {
            Some(v) => v.to_string(),
            None => self.read_version()?,
        };
        let metadata = metadata::load(&self.settings.project_config())?;

        let revision = match revision {
            Some(sha) => sha.to_string(),
            None => self.revision.resolve(mode),
        };
        let platform = self.platform.describe(mode);

        Ok(BuildInfo::new(version, metadata, revision, platform))
    }

    /// Render the entry-point file without writing it
    pub fn render(
        &self,
        mode: DistMode,
        version: Option<&str>,
        revision: Option<&str>,
    ) -> Result<String> {
        let info = self.build_info(mode, version, revision)?;
        Ok(self.template.render(&info))
    }

    /// Render the entry-point file and overwrite the output path with it.
    /// Returns the rendered text.
    pub fn generate(
        &self,
        mode: DistMode,
        version: Option<&str>,
        revision: Option<&str>,
    ) -> Result<String> {
        let info = self.build_info(mode, version, revision)?;
        self.write(&info)
    }

    /// Render `info` and overwrite the output path, no backup
    pub fn write(&self, info: &BuildInfo) -> Result<String> {
        let text = self.template.render(info);

        let path = self.settings.output();
        fs::write(&path, &text).map_err(|source| GenerateError::WriteFailure {
            path: path.clone(),
            source,
        })?;

        tracing::info!(
            version = %info.version,
            revision = %info.revision,
            platform = %info.platform,
            path = %path.display(),
            "wrote init for {} {}",
            info.version,
            info.revision
        );
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_info::NOT_AVAILABLE;
    use std::path::Path;
    use tempfile::TempDir;

    const SETUP_CFG: &str = "\
[metadata]
author = Open Science Tools Ltd
author_email = support@opensciencetools.org
maintainer_email = support@opensciencetools.org
url = https://www.psychopy.org/
download_url = https://github.com/psychopy/psychopy/releases/
license = GPL v3
";

    fn project(version: Option<&str>) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("setup.cfg"), SETUP_CFG).unwrap();
        fs::create_dir_all(root.join("psychopy")).unwrap();
        if let Some(v) = version {
            fs::write(root.join("version"), v).unwrap();
        }
        temp_dir
    }

    fn generator(root: &Path) -> InitFileGenerator {
        InitFileGenerator::new(Settings::for_root(root))
            .with_revision_resolver(
                RevisionResolver::new(root, std::time::Duration::from_secs(5))
                    .with_program("definitely-not-a-real-git-binary"),
            )
            .with_host(HostOs::MacOs {
                version: "10.5".to_string(),
                arch: "x86_64".to_string(),
            })
    }

    #[test]
    fn test_version_file_is_trimmed() {
        let temp_dir = project(Some("  2023.2.3\n"));
        assert_eq!(generator(temp_dir.path()).read_version().unwrap(), "2023.2.3");
    }

    #[test]
    fn test_blank_version_file_is_missing() {
        let temp_dir = project(Some("\n"));
        let err = generator(temp_dir.path()).read_version().unwrap_err();
        assert!(matches!(err, GenerateError::MissingVersionFile { .. }));
    }

    #[test]
    fn test_build_info_modes() {
        let temp_dir = project(Some("1.0.0"));
        let builder = generator(temp_dir.path());

        let none = builder.build_info(DistMode::None, None, None).unwrap();
        assert_eq!(none.revision, NOT_AVAILABLE);
        assert_eq!(none.platform, NOT_AVAILABLE);

        let sdist = builder.build_info(DistMode::Sdist, None, Some("abc1234")).unwrap();
        assert_eq!(sdist.revision, "abc1234");
        assert_eq!(sdist.platform, NOT_AVAILABLE);

        let bdist = builder.build_info(DistMode::Bdist, None, None).unwrap();
        assert_eq!(bdist.revision, NOT_AVAILABLE);
        assert_eq!(bdist.platform, "OSX_10.5_x86_64");
    }

    #[test]
    fn test_source_builds_leave_host_undetected() {
        let temp_dir = project(Some("1.0.0"));
        let builder = InitFileGenerator::new(Settings::for_root(temp_dir.path()))
            .with_revision_resolver(
                RevisionResolver::new(temp_dir.path(), std::time::Duration::from_secs(5))
                    .with_program("definitely-not-a-real-git-binary"),
            );

        builder.generate(DistMode::None, None, None).unwrap();
        builder.generate(DistMode::Sdist, None, None).unwrap();
        assert!(builder.platform().known_host().is_none());
    }

    #[test]
    fn test_explicit_version_skips_version_file() {
        let temp_dir = project(None);
        let info = generator(temp_dir.path())
            .build_info(DistMode::None, Some("9.9.9"), None)
            .unwrap();
        assert_eq!(info.version, "9.9.9");
        assert_eq!(info.license, "GPL v3");
    }

    #[test]
    fn test_render_does_not_write() {
        let temp_dir = project(Some("1.0.0"));
        let text = generator(temp_dir.path())
            .render(DistMode::None, None, None)
            .unwrap();
        assert!(text.contains("__version__ = '1.0.0'"));
        assert!(!temp_dir.path().join("psychopy/__init__.py").exists());
    }

    #[test]
    fn test_custom_template() {
        let temp_dir = project(Some("1.0.0"));
        let text = generator(temp_dir.path())
            .with_template(Template::new("VERSION = \"{version}\"\n"))
            .generate(DistMode::None, None, None)
            .unwrap();
        assert_eq!(text, "VERSION = \"1.0.0\"\n");
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("psychopy/__init__.py")).unwrap(),
            text
        );
    }

    #[test]
    fn test_missing_package_dir_is_write_failure() {
        let temp_dir = project(Some("1.0.0"));
        fs::remove_dir_all(temp_dir.path().join("psychopy")).unwrap();

        let err = generator(temp_dir.path())
            .generate(DistMode::None, None, None)
            .unwrap_err();
        assert!(matches!(err, GenerateError::WriteFailure { .. }));
    }
}
