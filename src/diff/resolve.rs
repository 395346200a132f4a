//! Content resolution for `sg diff`.
//!
//! The "new" side of a diff defaults to the latest payload from the skill's
//! declared source. Web-hosted repository URLs are translated into
//! raw-content URLs before fetching; sources that cannot be resolved to a
//! raw-content host are rejected outright rather than attempted. File-path
//! overrides bypass all of this and never touch the network.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tracing::debug;

use crate::error::{Result, SgError};

/// Default document filename fetched when a source points at a repository
/// or directory rather than a file.
pub const SKILL_DOCUMENT: &str = "SKILL.md";

static GITHUB_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:www\.)?github\.com/([^/\s]+)/([^/\s]+?)(?:\.git)?(?:/(blob|tree)/([^/\s]+)(?:/(.+?))?)?/?$",
    )
    .expect("static regex")
});

/// Translate a skill source into a fetchable raw-content URL.
///
/// Accepted forms:
/// - `https://raw.githubusercontent.com/...` — passed through unchanged.
/// - `https://github.com/<owner>/<repo>/blob/<branch>/<path>` — the file
///   itself, translated to its raw URL.
/// - `https://github.com/<owner>/<repo>/tree/<branch>[/<path>]` — a branch
///   or directory; the skill document is assumed at `<path>/SKILL.md`.
/// - `https://github.com/<owner>/<repo>` — repository root, default branch
///   `main`, document at `SKILL.md`.
///
/// Anything else is a [`SgError::Resolution`] naming the rejected source.
pub fn resolve_raw_url(source: &str) -> Result<String> {
    let source = source.trim();

    if source.starts_with("https://raw.githubusercontent.com/") {
        return Ok(source.to_string());
    }

    let Some(caps) = GITHUB_URL.captures(source) else {
        return Err(SgError::Resolution(format!(
            "source {source:?} is not a raw-content or github.com URL; \
             pass an explicit file with --new-file"
        )));
    };

    let owner = &caps[1];
    let repo = &caps[2];
    let (branch, path) = match (caps.get(3), caps.get(4), caps.get(5)) {
        (Some(kind), Some(branch), path) => {
            let path = path.map(|m| m.as_str()).unwrap_or_default();
            if kind.as_str() == "blob" {
                if path.is_empty() {
                    return Err(SgError::Resolution(format!(
                        "blob URL {source:?} has no file path"
                    )));
                }
                (branch.as_str().to_string(), path.to_string())
            } else if path.is_empty() {
                (branch.as_str().to_string(), SKILL_DOCUMENT.to_string())
            } else {
                (
                    branch.as_str().to_string(),
                    format!("{path}/{SKILL_DOCUMENT}"),
                )
            }
        }
        _ => ("main".to_string(), SKILL_DOCUMENT.to_string()),
    };

    Ok(format!(
        "https://raw.githubusercontent.com/{owner}/{repo}/{branch}/{path}"
    ))
}

/// Fetch raw document text from a resolved URL.
///
/// Single attempt, explicit timeout, no retries; any failure (transport or
/// non-success status) is surfaced immediately with the attempted URL.
pub fn fetch_content(url: &str, timeout: Duration) -> Result<String> {
    debug!(url, "fetching skill content");

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| SgError::Resolution(format!("build http client: {e}")))?;

    let response = client
        .get(url)
        .send()
        .map_err(|e| SgError::Resolution(format!("fetch {url}: {e}")))?;

    if !response.status().is_success() {
        return Err(SgError::Resolution(format!(
            "fetch {url}: HTTP {}",
            response.status()
        )));
    }

    response
        .text()
        .map_err(|e| SgError::Resolution(format!("read body from {url}: {e}")))
}

/// Resolve a source and fetch its latest content in one step.
pub fn fetch_latest(source: &str, timeout: Duration) -> Result<String> {
    let url = resolve_raw_url(source)?;
    fetch_content(&url, timeout)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_url_passes_through() {
        let url = "https://raw.githubusercontent.com/acme/skills/main/fmt/SKILL.md";
        assert_eq!(resolve_raw_url(url).unwrap(), url);
    }

    #[test]
    fn blob_url_translates_to_raw() {
        let url = "https://github.com/acme/skills/blob/main/fmt/SKILL.md";
        assert_eq!(
            resolve_raw_url(url).unwrap(),
            "https://raw.githubusercontent.com/acme/skills/main/fmt/SKILL.md"
        );
    }

    #[test]
    fn tree_url_appends_skill_document() {
        let url = "https://github.com/acme/skills/tree/dev/fmt";
        assert_eq!(
            resolve_raw_url(url).unwrap(),
            "https://raw.githubusercontent.com/acme/skills/dev/fmt/SKILL.md"
        );
    }

    #[test]
    fn branch_only_tree_url_uses_document_at_root() {
        let url = "https://github.com/acme/skills/tree/dev";
        assert_eq!(
            resolve_raw_url(url).unwrap(),
            "https://raw.githubusercontent.com/acme/skills/dev/SKILL.md"
        );
    }

    #[test]
    fn bare_repo_url_defaults_to_main() {
        let url = "https://github.com/acme/skills";
        assert_eq!(
            resolve_raw_url(url).unwrap(),
            "https://raw.githubusercontent.com/acme/skills/main/SKILL.md"
        );
    }

    #[test]
    fn non_github_source_is_rejected() {
        let err = resolve_raw_url("https://gitlab.com/acme/skills").unwrap_err();
        assert!(matches!(err, SgError::Resolution(_)));
        let err = resolve_raw_url("acme/fmt").unwrap_err();
        assert!(matches!(err, SgError::Resolution(_)));
    }

    #[test]
    fn trailing_slash_and_git_suffix_tolerated() {
        assert_eq!(
            resolve_raw_url("https://github.com/acme/skills/").unwrap(),
            "https://raw.githubusercontent.com/acme/skills/main/SKILL.md"
        );
        assert_eq!(
            resolve_raw_url("https://github.com/acme/skills.git").unwrap(),
            "https://raw.githubusercontent.com/acme/skills/main/SKILL.md"
        );
    }

    use httpmock::prelude::*;

    #[test]
    fn fetch_returns_body_on_success() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/acme/skills/main/SKILL.md");
            then.status(200).body("# Skill\n\n## Usage\n\nrun\n");
        });

        let body = fetch_content(
            &server.url("/acme/skills/main/SKILL.md"),
            Duration::from_secs(5),
        )
        .unwrap();

        mock.assert();
        assert!(body.contains("## Usage"));
    }

    #[test]
    fn fetch_non_success_status_is_a_resolution_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing.md");
            then.status(404).body("not found");
        });

        let url = server.url("/missing.md");
        let err = fetch_content(&url, Duration::from_secs(5)).unwrap_err();
        match err {
            SgError::Resolution(msg) => {
                assert!(msg.contains("404"));
                assert!(msg.contains(&url));
            }
            other => panic!("expected Resolution error, got {other:?}"),
        }
    }

    #[test]
    fn fetch_exceeding_timeout_fails_instead_of_hanging() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/slow.md");
            then.status(200)
                .body("too late")
                .delay(Duration::from_millis(500));
        });

        let start = std::time::Instant::now();
        let err = fetch_content(&server.url("/slow.md"), Duration::from_millis(100)).unwrap_err();
        assert!(matches!(err, SgError::Resolution(_)));
        // Failed within the budget, well before the server would respond.
        assert!(start.elapsed() < Duration::from_millis(450));
    }
}
