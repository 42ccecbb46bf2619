//! Checks manifest: the ordered list of per-check sources the aggregator
//! consumes. Order in the manifest is the report order.

use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Deserialize)]
/// Top-level manifest file (`[[check]]` tables).
pub struct Manifest {
    #[serde(default, rename = "check")]
    pub checks: Vec<CheckSpec>,
}

#[derive(Debug, Clone, Deserialize)]
/// One configured check source.
pub struct CheckSpec {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    /// Checkstyle output file for this check, relative to the results directory.
    pub file: String,
    #[serde(default = "default_weight", rename = "errorweight")]
    pub error_weight: u32,
    #[serde(default = "default_weight", rename = "warningweight")]
    pub warning_weight: u32,
    /// When false this check's problems survive patchset filtering untouched.
    #[serde(default = "default_true", rename = "filterable")]
    pub filterable: bool,
    /// When false, problem `file` values are commit hashes, not paths: no
    /// code-root trimming, commit-template deep links.
    #[serde(default = "default_true", rename = "usecodedir")]
    pub use_codedir: bool,
}

fn default_weight() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

/// The built-in check set, in the deliberate report order. Checks whose
/// findings must always surface (syntax errors, third-party edits, unbuilt
/// artifacts, commit messages keyed by hash) are marked non-filterable.
pub fn default_checks() -> Vec<CheckSpec> {
    let check = |id: &str, title: &str, description: &str, file: &str| CheckSpec {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        url: String::new(),
        file: file.to_string(),
        error_weight: 1,
        warning_weight: 1,
        filterable: true,
        use_codedir: true,
    };
    vec![
        CheckSpec {
            error_weight: 50,
            warning_weight: 10,
            filterable: false,
            ..check(
                "lint",
                "Lint problems",
                "This section shows the syntax problems detected in the code by the lint pass",
                "lint.xml",
            )
        },
        CheckSpec {
            error_weight: 5,
            warning_weight: 1,
            ..check(
                "style",
                "Coding style problems",
                "This section shows the coding style problems detected in the code",
                "cs.xml",
            )
        },
        CheckSpec {
            error_weight: 3,
            warning_weight: 1,
            ..check(
                "docs",
                "Documentation style problems",
                "This section shows the documentation problems detected in the code",
                "docs.xml",
            )
        },
        CheckSpec {
            error_weight: 3,
            warning_weight: 1,
            filterable: false,
            use_codedir: false,
            ..check(
                "commits",
                "Commit messages problems",
                "This section shows the problems detected in the commit messages",
                "commits.xml",
            )
        },
        CheckSpec {
            error_weight: 50,
            warning_weight: 10,
            ..check(
                "savepoints",
                "Upgrade savepoints problems",
                "This section shows problems detected with the handling of upgrade savepoints",
                "savepoints.xml",
            )
        },
        CheckSpec {
            filterable: false,
            ..check(
                "thirdparty",
                "Third party library modifications",
                "This section shows modifications to third party libraries without the matching metadata update",
                "thirdparty.xml",
            )
        },
        CheckSpec {
            error_weight: 5,
            warning_weight: 1,
            filterable: false,
            ..check(
                "grunt",
                "Unbuilt grunt changes",
                "This section shows source changes whose built artifacts were not regenerated",
                "grunt.xml",
            )
        },
    ]
}

/// Load an alternative manifest from a TOML file. An empty check list is a
/// configuration error: the caller asked for a manifest that defines nothing.
pub fn load_manifest(path: &Path) -> Result<Vec<CheckSpec>, String> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("cannot read manifest {}: {}", path.display(), e))?;
    let manifest: Manifest = toml::from_str(&text)
        .map_err(|e| format!("invalid manifest {}: {}", path.display(), e))?;
    if manifest.checks.is_empty() {
        return Err(format!("manifest {} defines no checks", path.display()));
    }
    Ok(manifest.checks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_checks_order_and_flags() {
        let checks = default_checks();
        let ids: Vec<&str> = checks.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["lint", "style", "docs", "commits", "savepoints", "thirdparty", "grunt"]
        );
        let by_id = |id: &str| checks.iter().find(|c| c.id == id).unwrap();
        assert!(!by_id("lint").filterable);
        assert!(by_id("style").filterable);
        assert!(!by_id("commits").use_codedir);
        assert!(!by_id("commits").filterable);
        assert_eq!(by_id("savepoints").error_weight, 50);
        assert_eq!(by_id("style").error_weight, 5);
    }

    #[test]
    fn test_load_manifest_with_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("checks.toml");
        let mut f = fs::File::create(&path).unwrap();
        writeln!(
            f,
            "{}",
            r#"
[[check]]
id = "style"
title = "Coding style problems"
file = "cs.xml"
errorweight = 5

[[check]]
id = "commits"
title = "Commit messages problems"
file = "commits.xml"
usecodedir = false
filterable = false
"#
        )
        .unwrap();

        let checks = load_manifest(&path).unwrap();
        assert_eq!(checks.len(), 2);
        assert_eq!(checks[0].id, "style");
        assert_eq!(checks[0].error_weight, 5);
        // Unspecified fields fall back to serde defaults.
        assert_eq!(checks[0].warning_weight, 1);
        assert!(checks[0].filterable);
        assert!(!checks[1].use_codedir);
    }

    #[test]
    fn test_load_manifest_rejects_empty_and_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.toml");
        fs::write(&path, "# nothing here\n").unwrap();
        assert!(load_manifest(&path).is_err());
        assert!(load_manifest(&dir.path().join("absent.toml")).is_err());
    }
}
