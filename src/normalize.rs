//! Checkstyle normalization and the per-convention converters.
//!
//! Two directions live here:
//! - `parse_checkstyle` turns a checkstyle-like XML document into problems
//!   for one check (rule split, severity tolerance, code-root trimming).
//! - `convert` turns a tool's raw textual/JSON output into checkstyle XML,
//!   one parser per known convention. Records that do not match the
//!   convention's pattern are skipped silently; upstream tool output drifts
//!   across versions and a noisy line must not fail the stream.

use crate::models::manifest::CheckSpec;
use crate::models::{Problem, Severity};
use crate::render::xml_escape;
use regex::Regex;
use serde::Deserialize;
use std::fmt::Write;
use std::io::{BufRead, Read};
use std::path::Path;

/// Parse one checkstyle document into problems for `spec`.
///
/// Severity tokens outside error/warning/info skip the record. A `line`
/// attribute populates both ends of the problem's range; a missing attribute
/// leaves them unset. Returns `Err` only for malformed XML so the caller can
/// skip the whole check.
pub fn parse_checkstyle(
    xml: &str,
    spec: &CheckSpec,
    codedir: Option<&str>,
) -> Result<Vec<Problem>, String> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| format!("invalid checkstyle xml: {}", e))?;
    let mut problems = Vec::new();
    for file in doc
        .root_element()
        .children()
        .filter(|n| n.has_tag_name("file"))
    {
        let name = file.attribute("name").unwrap_or("");
        let name = if spec.use_codedir {
            relative_to_codedir(name, codedir)
        } else {
            name.to_string()
        };
        for record in file.children().filter(|n| n.has_tag_name("error")) {
            let Some(severity) = record
                .attribute("severity")
                .and_then(Severity::parse)
            else {
                continue;
            };
            let line = record.attribute("line").and_then(|v| v.parse::<u32>().ok());
            let (rule_set, rule) = match record.attribute("source") {
                Some(source) => Problem::split_source(source),
                None => (String::new(), String::new()),
            };
            let weight = match severity {
                Severity::Error => spec.error_weight,
                Severity::Warning => spec.warning_weight,
                Severity::Info => 0,
            };
            problems.push(Problem {
                file: name.clone(),
                line_from: line,
                line_to: line,
                severity,
                rule_set,
                rule,
                message: record.attribute("message").unwrap_or("").trim().to_string(),
                weight,
                diff_url: None,
            });
        }
    }
    Ok(problems)
}

/// Make a reported path relative to the code root. Paths outside the root
/// (or when no root is configured) are kept as-is.
fn relative_to_codedir(file: &str, codedir: Option<&str>) -> String {
    let Some(root) = codedir else {
        return file.to_string();
    };
    match pathdiff::diff_paths(file, root) {
        Some(rel) if !rel.starts_with(Path::new("..")) && !rel.as_os_str().is_empty() => {
            rel.to_string_lossy().replace('\\', "/")
        }
        _ => file.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Known raw-output conventions for the `convert` subcommand. The closed set
/// is validated before any input is read.
pub enum ConvertFormat {
    Phplint,
    Gruntdiff,
    Thirdparty,
    Commits,
    Eslint,
}

impl ConvertFormat {
    pub const NAMES: [&'static str; 5] =
        ["phplint", "gruntdiff", "thirdparty", "commits", "eslint"];

    pub fn parse(name: &str) -> Option<ConvertFormat> {
        match name {
            "phplint" => Some(ConvertFormat::Phplint),
            "gruntdiff" => Some(ConvertFormat::Gruntdiff),
            "thirdparty" => Some(ConvertFormat::Thirdparty),
            "commits" => Some(ConvertFormat::Commits),
            "eslint" => Some(ConvertFormat::Eslint),
            _ => None,
        }
    }
}

/// One normalized record headed for checkstyle output.
struct Record {
    file: String,
    line: u32,
    severity: Severity,
    source: Option<String>,
    message: String,
}

/// Convert a tool's raw output into a checkstyle document.
pub fn convert<R: BufRead>(format: ConvertFormat, mut input: R) -> Result<String, String> {
    let records = match format {
        ConvertFormat::Eslint => {
            let mut text = String::new();
            input
                .read_to_string(&mut text)
                .map_err(|e| format!("error reading input: {}", e))?;
            parse_eslint(&text)?
        }
        _ => {
            let parser = LineParser::new(format);
            let mut records = Vec::new();
            for line in input.lines() {
                let line = line.map_err(|e| format!("error reading input: {}", e))?;
                if let Some(record) = parser.parse_line(&line) {
                    records.push(record);
                }
            }
            records
        }
    };
    Ok(records_to_checkstyle(&records))
}

/// Line-oriented grammars. One compiled pattern set per run.
struct LineParser {
    format: ConvertFormat,
    line_re: Regex,
    on_line_re: Regex,
}

impl LineParser {
    fn new(format: ConvertFormat) -> LineParser {
        let pattern = match format {
            ConvertFormat::Phplint => r"^(\S+) - ERROR: (.*)",
            ConvertFormat::Gruntdiff => r"^GRUNT-CHANGE: (\S+)$",
            ConvertFormat::Thirdparty => r"^(\S+) - WARN: (.*)",
            ConvertFormat::Commits => {
                r"^([0-9a-f]{7,16}|.*\.\.\..*)\*(info|error|warning)\*(.*)$"
            }
            ConvertFormat::Eslint => unreachable!("eslint input is not line-oriented"),
        };
        LineParser {
            format,
            line_re: Regex::new(pattern).expect("valid pattern"),
            on_line_re: Regex::new(r"on line (\d+)").expect("valid pattern"),
        }
    }

    fn parse_line(&self, line: &str) -> Option<Record> {
        match self.format {
            ConvertFormat::Phplint => {
                let caps = self.line_re.captures(line)?;
                let message = caps[2].to_string();
                // Only trust a line number when the message names exactly one;
                // several mentions mean the trace is ambiguous.
                let mut mentions = self.on_line_re.captures_iter(&message);
                let line_no = match (mentions.next(), mentions.next()) {
                    (Some(only), None) => only[1].parse().unwrap_or(0),
                    _ => 0,
                };
                Some(Record {
                    file: caps[1].to_string(),
                    line: line_no,
                    severity: Severity::Error,
                    source: None,
                    message,
                })
            }
            ConvertFormat::Gruntdiff => {
                let caps = self.line_re.captures(line)?;
                Some(Record {
                    file: caps[1].to_string(),
                    line: 0,
                    severity: Severity::Error,
                    source: None,
                    message: "Un-built change detected.".to_string(),
                })
            }
            ConvertFormat::Thirdparty => {
                let caps = self.line_re.captures(line)?;
                Some(Record {
                    file: caps[1].to_string(),
                    line: 0,
                    severity: Severity::Warning,
                    source: None,
                    message: caps[2].to_string(),
                })
            }
            ConvertFormat::Commits => {
                let caps = self.line_re.captures(line.trim())?;
                Some(Record {
                    file: caps[1].to_string(),
                    line: 0,
                    severity: Severity::parse(&caps[2])?,
                    source: None,
                    message: caps[3].to_string(),
                })
            }
            ConvertFormat::Eslint => None,
        }
    }
}

#[derive(Deserialize)]
struct EslintFile {
    #[serde(rename = "filePath")]
    file_path: String,
    #[serde(default)]
    errors: Vec<EslintEntry>,
}

#[derive(Deserialize)]
struct EslintEntry {
    #[serde(default)]
    line: u32,
    #[serde(default)]
    rule: String,
    message: String,
}

/// Structured lint output: a JSON array of files, each with its errors.
fn parse_eslint(text: &str) -> Result<Vec<Record>, String> {
    let files: Vec<EslintFile> =
        serde_json::from_str(text).map_err(|e| format!("invalid lint json: {}", e))?;
    let mut records = Vec::new();
    for file in files {
        for entry in file.errors {
            records.push(Record {
                file: file.file_path.clone(),
                line: entry.line,
                severity: Severity::Error,
                source: if entry.rule.is_empty() {
                    None
                } else {
                    Some(entry.rule)
                },
                message: entry.message,
            });
        }
    }
    Ok(records)
}

/// Emit the checkstyle container. Consecutive records for the same file share
/// one `<file>` element (the commits convention relies on this grouping).
fn records_to_checkstyle(records: &[Record]) -> String {
    let mut out =
        String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<checkstyle version=\"1.3.2\">\n");
    let mut open: Option<&str> = None;
    for record in records {
        if open != Some(record.file.as_str()) {
            if open.is_some() {
                out.push_str("  </file>\n");
            }
            let _ = writeln!(out, "  <file name=\"{}\">", xml_escape(&record.file));
            open = Some(record.file.as_str());
        }
        let source = match &record.source {
            Some(source) => format!(" source=\"{}\"", xml_escape(source)),
            None => String::new(),
        };
        let _ = writeln!(
            out,
            "    <error line=\"{}\" column=\"0\" severity=\"{}\"{} message=\"{}\"/>",
            record.line,
            record.severity.as_str(),
            source,
            xml_escape(&record.message)
        );
    }
    if open.is_some() {
        out.push_str("  </file>\n");
    }
    out.push_str("</checkstyle>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::manifest::default_checks;
    use std::io::Cursor;

    fn spec(id: &str) -> CheckSpec {
        default_checks().into_iter().find(|c| c.id == id).unwrap()
    }

    #[test]
    fn test_parse_checkstyle_basic() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<checkstyle version="1.3.2">
  <file name="lib/foo.php">
    <error line="12" column="4" severity="error" source="moodle.ForbiddenFunction" message="Forbidden call"/>
    <error line="30" column="0" severity="warning" source="Generic" message="Trailing whitespace"/>
  </file>
</checkstyle>"#;
        let problems = parse_checkstyle(xml, &spec("style"), None).unwrap();
        assert_eq!(problems.len(), 2);
        assert_eq!(problems[0].file, "lib/foo.php");
        assert_eq!(problems[0].line_from, Some(12));
        assert_eq!(problems[0].line_to, Some(12));
        assert_eq!(problems[0].rule_set, "moodle");
        assert_eq!(problems[0].rule, "ForbiddenFunction");
        assert_eq!(problems[0].weight, 5);
        assert_eq!(problems[1].rule_set, "other");
        assert_eq!(problems[1].rule, "Generic");
        assert_eq!(problems[1].weight, 1);
    }

    #[test]
    fn test_parse_checkstyle_skips_unknown_severity() {
        let xml = r#"<checkstyle><file name="a.php">
  <error line="1" severity="fatal" message="boom"/>
  <error line="2" severity="info" message="note"/>
</file></checkstyle>"#;
        let problems = parse_checkstyle(xml, &spec("style"), None).unwrap();
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].severity, Severity::Info);
        // Info carries no weight.
        assert_eq!(problems[0].weight, 0);
    }

    #[test]
    fn test_parse_checkstyle_missing_line_attribute() {
        let xml = r#"<checkstyle><file name="a.php">
  <error severity="error" message="whole file"/>
</file></checkstyle>"#;
        let problems = parse_checkstyle(xml, &spec("style"), None).unwrap();
        assert_eq!(problems[0].line_from, None);
        assert_eq!(problems[0].line_to, None);
    }

    #[test]
    fn test_parse_checkstyle_malformed_is_error() {
        assert!(parse_checkstyle("<checkstyle><file", &spec("style"), None).is_err());
    }

    #[test]
    fn test_parse_checkstyle_trims_codedir() {
        let xml = r#"<checkstyle><file name="/work/repo/lib/foo.php">
  <error line="3" severity="error" message="m"/>
</file></checkstyle>"#;
        let problems = parse_checkstyle(xml, &spec("style"), Some("/work/repo")).unwrap();
        assert_eq!(problems[0].file, "lib/foo.php");
        // Paths outside the root stay untouched.
        let xml = r#"<checkstyle><file name="/elsewhere/foo.php">
  <error line="3" severity="error" message="m"/>
</file></checkstyle>"#;
        let problems = parse_checkstyle(xml, &spec("style"), Some("/work/repo")).unwrap();
        assert_eq!(problems[0].file, "/elsewhere/foo.php");
    }

    #[test]
    fn test_parse_checkstyle_commit_keyed_skips_codedir() {
        let xml = r#"<checkstyle><file name="abc1234def">
  <error line="0" severity="error" message="m"/>
</file></checkstyle>"#;
        let problems = parse_checkstyle(xml, &spec("commits"), Some("/work/repo")).unwrap();
        assert_eq!(problems[0].file, "abc1234def");
    }

    fn convert_str(format: ConvertFormat, input: &str) -> String {
        convert(format, Cursor::new(input)).unwrap()
    }

    #[test]
    fn test_phplint_line_and_message() {
        let out = convert_str(
            ConvertFormat::Phplint,
            "/path/install.php - ERROR: PHP Parse error: unexpected '}' in /install.php on line 44\n\
             /path/lib/ok.php - OK\n",
        );
        assert!(out.contains("<file name=\"/path/install.php\">"));
        assert!(out.contains("line=\"44\""));
        assert!(out.contains("severity=\"error\""));
        // The OK line produces nothing.
        assert!(!out.contains("ok.php"));
    }

    #[test]
    fn test_phplint_ambiguous_line_mentions_default_to_zero() {
        let out = convert_str(
            ConvertFormat::Phplint,
            "/p/a.php - ERROR: thing on line 10 wrapped from thing on line 20\n",
        );
        assert!(out.contains("line=\"0\""));
    }

    #[test]
    fn test_gruntdiff_fixed_message() {
        let out = convert_str(
            ConvertFormat::Gruntdiff,
            "GRUNT-CHANGE: /path/theme/style/moodle.css\nnoise line\n",
        );
        assert!(out.contains("<file name=\"/path/theme/style/moodle.css\">"));
        assert!(out.contains("message=\"Un-built change detected.\""));
        assert!(out.contains("severity=\"error\""));
    }

    #[test]
    fn test_thirdparty_is_warning() {
        let out = convert_str(
            ConvertFormat::Thirdparty,
            "/p/lib/markdown/Markdown.php - WARN: modification to third party library\n",
        );
        assert!(out.contains("severity=\"warning\""));
        assert!(out.contains("line=\"0\""));
    }

    #[test]
    fn test_commits_groups_consecutive_hashes() {
        let out = convert_str(
            ConvertFormat::Commits,
            "abc1234*error*subject too long\n\
             abc1234*warning*body missing\n\
             def5678*info*looks fine\n",
        );
        assert_eq!(out.matches("<file name=\"abc1234\">").count(), 1);
        assert!(out.contains("<file name=\"def5678\">"));
        assert!(out.contains("severity=\"info\""));
        // Two records under the first commit element.
        let first = out.split("<file name=\"def5678\">").next().unwrap();
        assert_eq!(first.matches("<error ").count(), 2);
    }

    #[test]
    fn test_commits_skips_unmatched_lines() {
        let out = convert_str(ConvertFormat::Commits, "not a commit line\n\n");
        assert!(!out.contains("<file"));
        assert!(out.contains("<checkstyle version=\"1.3.2\">"));
    }

    #[test]
    fn test_eslint_json_array() {
        let out = convert_str(
            ConvertFormat::Eslint,
            r#"[{"filePath": "lib/amd/src/thing.js",
                "errors": [{"line": 7, "rule": "no-unused-vars", "message": "x is unused"}]},
               {"filePath": "lib/amd/src/clean.js", "errors": []}]"#,
        );
        assert!(out.contains("<file name=\"lib/amd/src/thing.js\">"));
        assert!(out.contains("source=\"no-unused-vars\""));
        assert!(out.contains("line=\"7\""));
        assert!(!out.contains("clean.js"));
    }

    #[test]
    fn test_eslint_invalid_json_is_error() {
        assert!(convert(ConvertFormat::Eslint, Cursor::new("not json")).is_err());
    }

    #[test]
    fn test_converter_output_round_trips_through_checkstyle_parser() {
        let out = convert_str(
            ConvertFormat::Phplint,
            "/p/a.php - ERROR: syntax error <unexpected> on line 3\n",
        );
        let problems = parse_checkstyle(&out, &spec("lint"), None).unwrap();
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].line_from, Some(3));
        assert_eq!(problems[0].message, "syntax error <unexpected> on line 3");
    }
}
