//! Report aggregation: merge per-check results into one report, filter by
//! patchset, compute totals and summary, decorate deep links.
//!
//! Pass order is fixed (filter, then totals, then summary, then URL
//! decoration) since each pass depends on the previous one's output. A
//! missing, empty or malformed per-check source skips that check and the run
//! continues; the skip reasons are returned alongside the report for the
//! caller to surface.

use crate::config::UrlTemplates;
use crate::models::manifest::CheckSpec;
use crate::models::{Check, CheckStatus, Report, Summary, SMURF_VERSION};
use crate::normalize;
use crate::patchset::PatchsetIndex;
use std::fs;
use std::path::Path;

/// Build the full report from the configured check sources.
///
/// `directory` holds one result file per manifest entry. Checks without a
/// usable source are omitted, never fatal. The second return value carries
/// one note per skipped check.
pub fn run_report(
    directory: &Path,
    specs: &[CheckSpec],
    codedir: Option<&str>,
    patchset: Option<&PatchsetIndex>,
    urls: &UrlTemplates,
) -> (Report, Vec<String>) {
    let mut checks = Vec::new();
    let mut notes = Vec::new();
    for spec in specs {
        let path = directory.join(&spec.file);
        let xml = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(_) => {
                notes.push(format!("check '{}' skipped: no readable {}", spec.id, spec.file));
                continue;
            }
        };
        if xml.trim().is_empty() {
            notes.push(format!("check '{}' skipped: {} is empty", spec.id, spec.file));
            continue;
        }
        let problems = match normalize::parse_checkstyle(&xml, spec, codedir) {
            Ok(problems) => problems,
            Err(e) => {
                notes.push(format!("check '{}' skipped: {}", spec.id, e));
                continue;
            }
        };
        checks.push(Check {
            id: spec.id.clone(),
            title: spec.title.clone(),
            description: spec.description.clone(),
            url: spec.url.clone(),
            error_weight: spec.error_weight,
            warning_weight: spec.warning_weight,
            allow_filtering: spec.filterable,
            commit_keyed: !spec.use_codedir,
            problems,
            num_errors: 0,
            num_warnings: 0,
        });
    }

    let mut report = Report {
        version: SMURF_VERSION.to_string(),
        checks,
        summary: Summary::default(),
        diff_url_template: urls.diff.clone(),
        commit_url_template: urls.commit.clone(),
    };

    if let Some(index) = patchset {
        filter_problems(&mut report, index);
    }
    for check in &mut report.checks {
        check.recount();
    }
    report.summary = build_summary(&report.checks);
    decorate_urls(&mut report);

    (report, notes)
}

/// Drop problems outside the patchset. Checks with filtering disabled keep
/// every problem untouched.
fn filter_problems(report: &mut Report, index: &PatchsetIndex) {
    for check in &mut report.checks {
        if !check.allow_filtering {
            continue;
        }
        check.problems.retain(|p| index.matches(p));
    }
}

/// Summed counts, derived status and the condensed one-line form:
/// `smurf,<status>,<errs>,<warns>:<id>,<status>,<errs>,<warns>;...`
pub fn build_summary(checks: &[Check]) -> Summary {
    let num_errors = checks.iter().map(|c| c.num_errors).sum();
    let num_warnings = checks.iter().map(|c| c.num_warnings).sum();
    let status = CheckStatus::from_counts(num_errors, num_warnings);

    let mut parts = vec![format!(
        "smurf,{},{},{}",
        status.as_str(),
        num_errors,
        num_warnings
    )];
    if !checks.is_empty() {
        let per_check: Vec<String> = checks
            .iter()
            .map(|c| {
                format!(
                    "{},{},{},{}",
                    c.id,
                    c.status().as_str(),
                    c.num_errors,
                    c.num_warnings
                )
            })
            .collect();
        parts.push(per_check.join(";"));
    }

    Summary {
        status,
        num_errors,
        num_warnings,
        condensed: parts.join(":"),
    }
}

/// Attach deep links. Commit-keyed checks substitute the commit template
/// with the problem's hash; everything else needs a file and a concrete
/// line for the file/line template.
fn decorate_urls(report: &mut Report) {
    let diff_template = report.diff_url_template.clone();
    let commit_template = report.commit_url_template.clone();
    for check in &mut report.checks {
        for problem in &mut check.problems {
            problem.diff_url = if check.commit_keyed {
                match &commit_template {
                    Some(template) if !problem.file.is_empty() => {
                        Some(template.replace("{COMMIT}", &problem.file))
                    }
                    _ => None,
                }
            } else {
                match (&diff_template, problem.line_from) {
                    (Some(template), Some(line)) if line > 0 && !problem.file.is_empty() => Some(
                        template
                            .replace("{FILE}", &problem.file)
                            .replace("{LINENO}", &line.to_string()),
                    ),
                    _ => None,
                }
            };
        }
    }
}
