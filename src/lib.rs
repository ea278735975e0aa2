pub mod build_info;
pub mod error;
pub mod generator;
pub mod metadata;
pub mod platform;
pub mod revision;
pub mod settings;
pub mod template;

// Re-export commonly used types
pub use build_info::{BuildInfo, DistMode, ProjectMetadata, NOT_AVAILABLE};
pub use error::{GenerateError, LookupError};
pub use generator::InitFileGenerator;
pub use platform::{HostOs, PlatformDescriber};
pub use revision::RevisionResolver;
pub use settings::Settings;
pub use template::Template;
