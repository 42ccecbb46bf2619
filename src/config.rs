//! Configuration discovery and effective settings resolution.
//!
//! smurf reads `smurf.toml|yaml|yml` from the current directory (or closest
//! ancestor) and merges it with CLI flags. Defaults:
//! - `format`: `xml`
//! - `branch`: `main`
//! - `repository`, `codedir`, `manifest`: unset
//!
//! Overrides precedence: CLI > config file > defaults.
//!
//! The repository URL, when it points at a recognized hosting provider,
//! yields the deep-link templates used to decorate problems. Templates keep
//! the `{FILE}`/`{LINENO}`/`{COMMIT}` placeholders until decoration time.

use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `smurf.toml|yaml`.
pub struct SmurfConfig {
    pub format: Option<String>,
    pub repository: Option<String>,
    pub branch: Option<String>,
    pub codedir: Option<String>,
    pub manifest: Option<String>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by the report command.
pub struct Effective {
    pub format: String,
    pub repository: Option<String>,
    pub branch: String,
    pub codedir: Option<String>,
    pub manifest: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Deep-link templates derived from a recognized repository host.
pub struct UrlTemplates {
    pub diff: Option<String>,
    pub commit: Option<String>,
}

/// Walk upward from `start` until a smurf config or a `.git` directory is
/// found; the start directory itself is the fallback.
pub fn detect_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if cur.join("smurf.toml").exists()
            || cur.join("smurf.yaml").exists()
            || cur.join("smurf.yml").exists()
        {
            return cur.to_path_buf();
        }
        if cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(parent) => cur = parent,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `SmurfConfig` from `smurf.toml` or `smurf.yaml|yml` if present.
pub fn load_config(root: &Path) -> Option<SmurfConfig> {
    let toml_path = root.join("smurf.toml");
    if toml_path.exists() {
        let text = fs::read_to_string(&toml_path).ok()?;
        let cfg: SmurfConfig = toml::from_str(&text).ok()?;
        return Some(cfg);
    }
    for yml in ["smurf.yaml", "smurf.yml"] {
        let path = root.join(yml);
        if path.exists() {
            let text = fs::read_to_string(&path).ok()?;
            let cfg: SmurfConfig = serde_yaml::from_str(&text).ok()?;
            return Some(cfg);
        }
    }
    None
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(
    start: &Path,
    cli_format: Option<&str>,
    cli_repository: Option<&str>,
    cli_branch: Option<&str>,
    cli_codedir: Option<&str>,
    cli_manifest: Option<&str>,
) -> Effective {
    let root = detect_root(start);
    let cfg = load_config(&root).unwrap_or_default();

    Effective {
        format: cli_format
            .map(|s| s.to_string())
            .or(cfg.format)
            .unwrap_or_else(|| "xml".to_string()),
        repository: cli_repository.map(|s| s.to_string()).or(cfg.repository),
        branch: cli_branch
            .map(|s| s.to_string())
            .or(cfg.branch)
            .unwrap_or_else(|| "main".to_string()),
        codedir: cli_codedir.map(|s| s.to_string()).or(cfg.codedir),
        manifest: cli_manifest.map(|s| s.to_string()).or(cfg.manifest),
    }
}

/// Derive deep-link templates from a repository URL. Unrecognized hosts
/// produce empty templates: problems simply go undecorated.
pub fn url_templates(repository: &str, branch: &str) -> UrlTemplates {
    let Some((host, owner, repo)) = split_repo_url(repository) else {
        return UrlTemplates::default();
    };
    match host.as_str() {
        "github.com" => UrlTemplates {
            diff: Some(format!(
                "https://github.com/{}/{}/blob/{}/{{FILE}}#L{{LINENO}}",
                owner, repo, branch
            )),
            commit: Some(format!(
                "https://github.com/{}/{}/commit/{{COMMIT}}",
                owner, repo
            )),
        },
        "bitbucket.org" => UrlTemplates {
            diff: Some(format!(
                "https://bitbucket.org/{}/{}/src/{}/{{FILE}}#lines-{{LINENO}}",
                owner, repo, branch
            )),
            commit: Some(format!(
                "https://bitbucket.org/{}/{}/commits/{{COMMIT}}",
                owner, repo
            )),
        },
        "gitorious.org" => UrlTemplates {
            diff: Some(format!(
                "https://gitorious.org/{}/{}/blobs/{}/{{FILE}}#line{{LINENO}}",
                owner, repo, branch
            )),
            commit: Some(format!(
                "https://gitorious.org/{}/{}/commit/{{COMMIT}}",
                owner, repo
            )),
        },
        _ => UrlTemplates::default(),
    }
}

/// Accepts `https://host/owner/repo[.git]`, `git://host/owner/repo[.git]`
/// and the scp-like `git@host:owner/repo[.git]` form.
fn split_repo_url(url: &str) -> Option<(String, String, String)> {
    let re = Regex::new(r"^(?:https?://|git://|git@)([^/:]+)[:/]([^/]+)/(.+?)(?:\.git)?/?$")
        .expect("valid pattern");
    let caps = re.captures(url.trim())?;
    Some((
        caps[1].to_string(),
        caps[2].to_string(),
        caps[3].to_string(),
    ))
}
