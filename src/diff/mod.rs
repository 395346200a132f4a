//! Structural diffing of skill documents.
//!
//! A skill document is split into sections at its second- and third-level
//! headings; the diff reports which sections were added, removed, or had
//! their body text changed between two versions. Sections are
//! non-overlapping: because an H3 is itself a boundary, it also closes the
//! enclosing H2's body, so every line belongs to exactly one section (H1
//! and H4+ lines are plain body content). A coarse magnitude label
//! (major/minor/patch) is layered on top for display, supplied by a
//! [`ChangeClassifier`] so the rule can be swapped without touching the
//! diff itself.

use std::collections::BTreeMap;

use serde::Serialize;

pub mod resolve;

/// One extracted section: original-case heading plus the verbatim body text
/// up to the next section boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

/// Structural difference between two skill documents.
///
/// Headings are reported in original case, taken from the document they
/// appear in (old for `removed`, new for `added`/`modified`). A renamed
/// section shows up as one removal plus one addition; rename detection is
/// deliberately not attempted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkillDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub modified: Vec<String>,
}

impl SkillDiff {
    /// True when the two documents have identical section structure and
    /// section bodies. A valid, expected outcome, not an error.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }
}

/// Coarse magnitude of a change, used purely for display labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeMagnitude {
    Major,
    Minor,
    Patch,
}

impl std::fmt::Display for ChangeMagnitude {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeMagnitude::Major => write!(f, "major"),
            ChangeMagnitude::Minor => write!(f, "minor"),
            ChangeMagnitude::Patch => write!(f, "patch"),
        }
    }
}

/// Classifies the magnitude of a change between two full document bodies.
pub trait ChangeClassifier {
    fn classify(&self, old: &str, new: &str) -> ChangeMagnitude;
}

/// Default rule: any removed section is major; added sections with no
/// removals are minor; body-only changes (or no change at all) are patch.
#[derive(Debug, Default)]
pub struct DefaultClassifier;

impl ChangeClassifier for DefaultClassifier {
    fn classify(&self, old: &str, new: &str) -> ChangeMagnitude {
        let diff = diff_skills(old, new);
        if !diff.removed.is_empty() {
            ChangeMagnitude::Major
        } else if !diff.added.is_empty() {
            ChangeMagnitude::Minor
        } else {
            ChangeMagnitude::Patch
        }
    }
}

/// Whether a line is a section boundary (H2 or H3 heading).
fn heading_text(line: &str) -> Option<&str> {
    for prefix in ["## ", "### "] {
        if let Some(rest) = line.strip_prefix(prefix) {
            return Some(rest.trim());
        }
    }
    // Bare "##"/"###" markers with no text are not boundaries.
    None
}

/// Split a document into sections keyed by normalized (case-folded,
/// trimmed) heading text.
///
/// Only H2 and H3 headings open a section; H1, H4+, and everything else is
/// body content belonging to the nearest preceding section. Content before
/// the first section heading is not part of any section.
#[must_use]
pub fn extract_sections(document: &str) -> BTreeMap<String, Section> {
    let mut sections = BTreeMap::new();
    let mut current: Option<(String, Section)> = None;

    for line in document.lines() {
        if let Some(text) = heading_text(line) {
            if let Some((key, section)) = current.take() {
                sections.insert(key, section);
            }
            current = Some((
                text.to_lowercase(),
                Section {
                    heading: text.to_string(),
                    body: String::new(),
                },
            ));
        } else if let Some((_, section)) = current.as_mut() {
            section.body.push_str(line);
            section.body.push('\n');
        }
    }
    if let Some((key, section)) = current.take() {
        sections.insert(key, section);
    }

    sections
}

/// Diff two skill documents at section granularity.
#[must_use]
pub fn diff_skills(old: &str, new: &str) -> SkillDiff {
    let old_sections = extract_sections(old);
    let new_sections = extract_sections(new);

    let mut diff = SkillDiff::default();

    for (key, section) in &old_sections {
        if !new_sections.contains_key(key) {
            diff.removed.push(section.heading.clone());
        }
    }
    for (key, section) in &new_sections {
        match old_sections.get(key) {
            None => diff.added.push(section.heading.clone()),
            Some(old_section) => {
                if old_section.body.trim() != section.body.trim() {
                    diff.modified.push(section.heading.clone());
                }
            }
        }
    }

    diff
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
# Formatter

Intro text.

## Usage

Run the formatter.

### Options

- `--fast`

## Notes

Be careful.
";

    #[test]
    fn extract_sections_splits_on_h2_and_h3() {
        let sections = extract_sections(DOC);
        assert_eq!(sections.len(), 3);
        assert!(sections.contains_key("usage"));
        assert!(sections.contains_key("options"));
        assert!(sections.contains_key("notes"));
        assert_eq!(sections["usage"].heading, "Usage");
        assert!(sections["usage"].body.contains("Run the formatter."));
        // H3 opens its own section, so its text is not in the H2 body.
        assert!(!sections["usage"].body.contains("--fast"));
    }

    #[test]
    fn extract_sections_ignores_preamble_and_h1() {
        let sections = extract_sections(DOC);
        assert!(!sections.contains_key("formatter"));
        for section in sections.values() {
            assert!(!section.body.contains("Intro text."));
        }
    }

    #[test]
    fn extract_sections_normalizes_key_case() {
        let sections = extract_sections("##   USAGE  \n\nbody\n");
        assert_eq!(sections["usage"].heading, "USAGE");
    }

    #[test]
    fn diff_identical_documents_is_empty() {
        let diff = diff_skills(DOC, DOC);
        assert!(diff.is_empty());
    }

    #[test]
    fn diff_body_only_change_is_modified() {
        let new = DOC.replace("Be careful.", "Be very careful.");
        let diff = diff_skills(DOC, &new);
        assert!(diff.added.is_empty());
        assert!(diff.removed.is_empty());
        assert_eq!(diff.modified, vec!["Notes".to_string()]);
    }

    #[test]
    fn diff_rename_is_add_plus_remove() {
        let new = DOC.replace("## Usage", "## How To Use");
        let diff = diff_skills(DOC, &new);
        assert_eq!(diff.removed, vec!["Usage".to_string()]);
        assert_eq!(diff.added, vec!["How To Use".to_string()]);
        assert!(!diff.modified.contains(&"Usage".to_string()));
        assert!(!diff.modified.contains(&"How To Use".to_string()));
    }

    #[test]
    fn diff_whitespace_only_body_change_is_not_modified() {
        let new = DOC.replace("Be careful.\n", "Be careful.\n\n\n");
        let diff = diff_skills(DOC, &new);
        assert!(diff.is_empty());
    }

    #[test]
    fn default_classifier_rules() {
        let c = DefaultClassifier;
        // Removal dominates.
        let removed = DOC.replace("## Notes\n\nBe careful.\n", "");
        assert_eq!(c.classify(DOC, &removed), ChangeMagnitude::Major);
        // Pure addition.
        let added = format!("{DOC}\n## Extra\n\nmore\n");
        assert_eq!(c.classify(DOC, &added), ChangeMagnitude::Minor);
        // Body-only.
        let patched = DOC.replace("Be careful.", "Take care.");
        assert_eq!(c.classify(DOC, &patched), ChangeMagnitude::Patch);
        // No change at all still labels patch; display relies on
        // SkillDiff::is_empty, not the classifier.
        assert_eq!(c.classify(DOC, DOC), ChangeMagnitude::Patch);
    }
}
