//! Skill document frontmatter.
//!
//! Bundled skill documents open with an optional YAML frontmatter block
//! between `---` fences carrying a declared name and version. Absent or
//! unparseable frontmatter is a first-class outcome (all fields `None`),
//! never an error: a malformed document degrades to "unversioned" instead
//! of aborting the surrounding audit.

use semver::Version;
use serde::Deserialize;

/// Declared metadata from a skill document's header. All fields optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SkillFrontmatter {
    pub name: Option<String>,
    pub version: Option<String>,
}

/// Extract frontmatter from a skill document.
///
/// The block must start on the first non-blank line with `---` and end at
/// the next `---` line. Unknown keys are ignored; a missing or malformed
/// block yields the default (all-`None`) value.
#[must_use]
pub fn parse_frontmatter(document: &str) -> SkillFrontmatter {
    let mut lines = document.lines();

    loop {
        match lines.next() {
            Some(line) if line.trim().is_empty() => continue,
            Some(line) if line.trim() == "---" => break,
            _ => return SkillFrontmatter::default(),
        }
    }

    let mut block = String::new();
    for line in lines {
        if line.trim() == "---" {
            return serde_yaml::from_str(&block).unwrap_or_default();
        }
        block.push_str(line);
        block.push('\n');
    }

    // Unterminated fence: not a frontmatter block.
    SkillFrontmatter::default()
}

/// Lenient semantic-version parse: trims whitespace, strips a leading `v`.
/// Non-semantic text (`latest`, `1.2`, empty) is `None`.
#[must_use]
pub fn parse_version(raw: &str) -> Option<Version> {
    let trimmed = raw.trim();
    let stripped = trimmed.strip_prefix('v').unwrap_or(trimmed);
    Version::parse(stripped).ok()
}
