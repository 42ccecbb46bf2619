//! Shared data models for the smurf report tree and its summary.

pub mod manifest;

/// Schema version stamped on every generated smurf report.
pub const SMURF_VERSION: &str = "0.9.0";

/// Rule-set assigned when a checkstyle `source` carries no dotted prefix.
pub const DEFAULT_RULESET: &str = "other";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Severity tiers. `Info` is displayed but contributes to no count.
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Parse a producer's severity token. Unknown tokens yield `None` so the
    /// caller can skip the record instead of failing the stream.
    pub fn parse(token: &str) -> Option<Severity> {
        match token {
            "error" => Some(Severity::Error),
            "warning" | "warn" => Some(Severity::Warning),
            "info" => Some(Severity::Info),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

#[derive(Debug, Clone)]
/// One finding. `file` is relative to the configured code root, or holds a
/// commit hash for commit-keyed checks. `None` lines mean the producer gave
/// no line attribute at all; `Some(0)` means "no specific line".
pub struct Problem {
    pub file: String,
    pub line_from: Option<u32>,
    pub line_to: Option<u32>,
    pub severity: Severity,
    pub rule_set: String,
    pub rule: String,
    pub message: String,
    pub weight: u32,
    pub diff_url: Option<String>,
}

impl Problem {
    /// Split a checkstyle `source` into `(rule_set, rule)` on the first dot.
    /// Sources without a dot keep the whole value as the rule under the
    /// default rule-set.
    pub fn split_source(source: &str) -> (String, String) {
        match source.split_once('.') {
            Some((set, rule)) => (set.to_string(), rule.to_string()),
            None => (DEFAULT_RULESET.to_string(), source.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Status of a check (or the whole report), derived from its counts.
pub enum CheckStatus {
    Error,
    Warning,
    #[default]
    Success,
}

impl CheckStatus {
    /// Errors dominate warnings; success only when both counts are zero.
    pub fn from_counts(errors: usize, warnings: usize) -> CheckStatus {
        if errors > 0 {
            CheckStatus::Error
        } else if warnings > 0 {
            CheckStatus::Warning
        } else {
            CheckStatus::Success
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Error => "error",
            CheckStatus::Warning => "warning",
            CheckStatus::Success => "success",
        }
    }
}

#[derive(Debug, Clone)]
/// One category of findings plus its presentation metadata. Counts are
/// recomputed by the totals pass after any filtering; problems keep
/// insertion order.
pub struct Check {
    pub id: String,
    pub title: String,
    pub description: String,
    pub url: String,
    pub error_weight: u32,
    pub warning_weight: u32,
    /// When false, this check's problems are exempt from patchset filtering.
    pub allow_filtering: bool,
    /// When true, `file` holds a commit hash and deep links use the commit
    /// template instead of the file/line template.
    pub commit_keyed: bool,
    pub problems: Vec<Problem>,
    pub num_errors: usize,
    pub num_warnings: usize,
}

impl Check {
    /// Recompute counts from the current problem list. Info problems are a
    /// non-counted tier.
    pub fn recount(&mut self) {
        self.num_errors = self
            .problems
            .iter()
            .filter(|p| p.severity == Severity::Error)
            .count();
        self.num_warnings = self
            .problems
            .iter()
            .filter(|p| p.severity == Severity::Warning)
            .count();
    }

    pub fn status(&self) -> CheckStatus {
        CheckStatus::from_counts(self.num_errors, self.num_warnings)
    }
}

#[derive(Debug, Clone, Default)]
/// Aggregated report summary, including the condensed single-line form.
pub struct Summary {
    pub status: CheckStatus,
    pub num_errors: usize,
    pub num_warnings: usize,
    pub condensed: String,
}

#[derive(Debug, Clone)]
/// The root aggregate owning all checks and their problems.
pub struct Report {
    pub version: String,
    pub checks: Vec<Check>,
    pub summary: Summary,
    pub diff_url_template: Option<String>,
    pub commit_url_template: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_parse_tokens() {
        assert_eq!(Severity::parse("error"), Some(Severity::Error));
        assert_eq!(Severity::parse("warning"), Some(Severity::Warning));
        assert_eq!(Severity::parse("warn"), Some(Severity::Warning));
        assert_eq!(Severity::parse("info"), Some(Severity::Info));
        assert_eq!(Severity::parse("fatal"), None);
        assert_eq!(Severity::parse(""), None);
    }

    #[test]
    fn test_split_source_on_first_dot() {
        let (set, rule) = Problem::split_source("moodle.ForbiddenFunction");
        assert_eq!(set, "moodle");
        assert_eq!(rule, "ForbiddenFunction");
        // Only the first dot splits; the rest stays in the rule.
        let (set, rule) = Problem::split_source("a.b.c");
        assert_eq!(set, "a");
        assert_eq!(rule, "b.c");
    }

    #[test]
    fn test_split_source_without_dot_uses_default_ruleset() {
        let (set, rule) = Problem::split_source("Generic");
        assert_eq!(set, DEFAULT_RULESET);
        assert_eq!(rule, "Generic");
    }

    #[test]
    fn test_status_errors_dominate() {
        assert_eq!(CheckStatus::from_counts(1, 0), CheckStatus::Error);
        assert_eq!(CheckStatus::from_counts(3, 7), CheckStatus::Error);
        assert_eq!(CheckStatus::from_counts(0, 2), CheckStatus::Warning);
        assert_eq!(CheckStatus::from_counts(0, 0), CheckStatus::Success);
    }

    #[test]
    fn test_recount_ignores_info() {
        let problem = |severity| Problem {
            file: "f.php".into(),
            line_from: Some(1),
            line_to: Some(1),
            severity,
            rule_set: String::new(),
            rule: String::new(),
            message: String::new(),
            weight: 0,
            diff_url: None,
        };
        let mut check = Check {
            id: "style".into(),
            title: String::new(),
            description: String::new(),
            url: String::new(),
            error_weight: 5,
            warning_weight: 1,
            allow_filtering: true,
            commit_keyed: false,
            problems: vec![
                problem(Severity::Error),
                problem(Severity::Warning),
                problem(Severity::Warning),
                problem(Severity::Info),
            ],
            num_errors: 0,
            num_warnings: 0,
        };
        check.recount();
        assert_eq!(check.num_errors, 1);
        assert_eq!(check.num_warnings, 2);
        assert_eq!(check.status(), CheckStatus::Error);
    }
}
