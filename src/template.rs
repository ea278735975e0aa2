//! Entry-point file template
//!
//! The bundled template is the data-driven header followed by a fixed
//! epilogue. The epilogue is an opaque asset: it is emitted byte-for-byte
//! and bumps [`EPILOGUE_VERSION`] whenever its text changes.

use std::borrow::Cow;

use crate::build_info::BuildInfo;

/// Version of the bundled epilogue asset
pub const EPILOGUE_VERSION: u32 = 1;

/// Fixed text emitted after the assignments
pub const EPILOGUE: &str = include_str!("../assets/init_epilogue.v1.py");

/// Header plus epilogue, with `{placeholder}` markers for every field
pub const BUNDLED: &str = concat!(
    include_str!("../assets/init_header.py.tmpl"),
    include_str!("../assets/init_epilogue.v1.py"),
);

#[derive(Debug, Clone)]
pub struct Template {
    text: Cow<'static, str>,
}

impl Default for Template {
    fn default() -> Self {
        Self::bundled()
    }
}

impl Template {
    pub fn new(text: impl Into<Cow<'static, str>>) -> Self {
        Self { text: text.into() }
    }

    pub fn bundled() -> Self {
        Self::new(BUNDLED)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Substitute every known `{placeholder}` with the matching field.
    ///
    /// Single pass: substituted values are never rescanned, and braces that
    /// don't name a field are copied through untouched.
    pub fn render(&self, info: &BuildInfo) -> String {
        let text = self.text.as_ref();
        let mut out = String::with_capacity(text.len() + 256);
        let mut rest = text;

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];

            let value = after
                .find('}')
                .and_then(|close| info.field(&after[..close]).map(|v| (close, v)));

            match value {
                Some((close, v)) => {
                    out.push_str(v);
                    rest = &after[close + 1..];
                }
                None => {
                    out.push('{');
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }

    /// Placeholder names present in the template, in order of appearance
    pub fn placeholders(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut rest = self.text.as_ref();
        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) if is_identifier(&after[..close]) => {
                    names.push(&after[..close]);
                    rest = &after[close + 1..];
                }
                _ => rest = after,
            }
        }
        names
    }
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build_info::{ProjectMetadata, ASSIGNMENTS, NOT_AVAILABLE};

    fn info() -> BuildInfo {
        BuildInfo::new(
            "1.2.3",
            ProjectMetadata {
                author: "A. Author".to_string(),
                author_email: "a@example.org".to_string(),
                maintainer_email: "m@example.org".to_string(),
                url: "https://example.org".to_string(),
                download_url: "https://example.org/download".to_string(),
                license: "GPL v3".to_string(),
            },
            NOT_AVAILABLE,
            NOT_AVAILABLE,
        )
    }

    #[test]
    fn test_bundled_placeholders_cover_every_field() {
        let template = Template::bundled();
        let names = template.placeholders();
        assert_eq!(names.len(), ASSIGNMENTS.len());
        for (_, placeholder) in ASSIGNMENTS {
            assert!(names.contains(&placeholder), "missing {placeholder}");
        }
    }

    #[test]
    fn test_bundled_ends_with_epilogue() {
        assert!(BUNDLED.ends_with(EPILOGUE));
        assert!(!EPILOGUE.contains('{'));
    }

    #[test]
    fn test_render_substitutes_fields() {
        let out = Template::new("v={version} sha={revision}\n").render(&info());
        assert_eq!(out, "v=1.2.3 sha=n/a\n");
    }

    #[test]
    fn test_render_leaves_unknown_braces() {
        let out = Template::new("{shaStr} {} {version").render(&info());
        assert_eq!(out, "{shaStr} {} {version");
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let mut info = info();
        info.author = "{license}".to_string();
        let out = Template::new("{author}/{license}").render(&info);
        assert_eq!(out, "{license}/GPL v3");
    }

    #[test]
    fn test_render_handles_multibyte_text() {
        let out = Template::new("é{version}ü").render(&info());
        assert_eq!(out, "é1.2.3ü");
    }
}
