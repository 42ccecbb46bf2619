//! Report rendering: smurf XML, a standalone HTML page, and a human text
//! form. Rendering is a pure serialization of a finished report; counts and
//! filtering are never recomputed here.

use crate::models::{Report, Severity};
use owo_colors::OwoColorize;
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Supported output formats, validated before aggregation begins.
pub enum RenderFormat {
    Xml,
    Html,
    Txt,
}

impl RenderFormat {
    pub const NAMES: [&'static str; 3] = ["xml", "html", "txt"];

    pub fn parse(name: &str) -> Option<RenderFormat> {
        match name {
            "xml" => Some(RenderFormat::Xml),
            "html" => Some(RenderFormat::Html),
            "txt" => Some(RenderFormat::Txt),
            _ => None,
        }
    }
}

/// Escape text for embedding in XML/HTML attribute or element content.
pub fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn render(report: &Report, format: RenderFormat) -> String {
    match format {
        RenderFormat::Xml => render_xml(report),
        RenderFormat::Html => render_html(report),
        RenderFormat::Txt => render_txt(report),
    }
}

/// The smurf schema: `smurf` root, `summary`, then `check` elements each
/// wrapping its problems in a `mess` element.
fn render_xml(report: &Report) -> String {
    let summary = &report.summary;
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        out,
        "<smurf version=\"{}\" numerrors=\"{}\" numwarnings=\"{}\">",
        report.version, summary.num_errors, summary.num_warnings
    );
    let _ = writeln!(
        out,
        "  <summary status=\"{}\" numerrors=\"{}\" numwarnings=\"{}\" condensedresult=\"{}\"/>",
        summary.status.as_str(),
        summary.num_errors,
        summary.num_warnings,
        xml_escape(&summary.condensed)
    );
    for check in &report.checks {
        let _ = writeln!(
            out,
            "  <check id=\"{}\" title=\"{}\" description=\"{}\" url=\"{}\" numerrors=\"{}\" numwarnings=\"{}\">",
            xml_escape(&check.id),
            xml_escape(&check.title),
            xml_escape(&check.description),
            xml_escape(&check.url),
            check.num_errors,
            check.num_warnings
        );
        out.push_str("    <mess>\n");
        for problem in &check.problems {
            let line_from = problem.line_from.map(|v| v.to_string()).unwrap_or_default();
            let line_to = problem.line_to.map(|v| v.to_string()).unwrap_or_default();
            let _ = writeln!(
                out,
                "      <problem file=\"{}\" linefrom=\"{}\" lineto=\"{}\" rule=\"{}\" ruleset=\"{}\" weight=\"{}\" message=\"{}\" diffurl=\"{}\"/>",
                xml_escape(&problem.file),
                line_from,
                line_to,
                xml_escape(&problem.rule),
                xml_escape(&problem.rule_set),
                problem.weight,
                xml_escape(&problem.message),
                xml_escape(problem.diff_url.as_deref().unwrap_or(""))
            );
        }
        out.push_str("    </mess>\n");
        out.push_str("  </check>\n");
    }
    out.push_str("</smurf>\n");
    out
}

/// A standalone page derived from the same tree as the XML form.
fn render_html(report: &Report) -> String {
    let summary = &report.summary;
    let mut out = String::from(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>smurf report</title>\n\
         <style>\n\
         body { font-family: sans-serif; margin: 2em; }\n\
         .error { color: #b00020; }\n\
         .warning { color: #9a6700; }\n\
         .success { color: #1a7f37; }\n\
         .info { color: #57606a; }\n\
         li { margin: 0.2em 0; }\n\
         </style>\n</head>\n<body>\n",
    );
    let _ = writeln!(
        out,
        "<h1 class=\"{}\">Report: {} ({} errors, {} warnings)</h1>",
        summary.status.as_str(),
        summary.status.as_str(),
        summary.num_errors,
        summary.num_warnings
    );
    for check in &report.checks {
        let _ = writeln!(
            out,
            "<h2 class=\"{}\">{} ({} errors, {} warnings)</h2>",
            check.status().as_str(),
            xml_escape(&check.title),
            check.num_errors,
            check.num_warnings
        );
        if !check.description.is_empty() {
            let _ = writeln!(out, "<p>{}</p>", xml_escape(&check.description));
        }
        if check.problems.is_empty() {
            continue;
        }
        out.push_str("<ul>\n");
        for problem in &check.problems {
            let location = match (problem.file.is_empty(), problem.line_from) {
                (true, _) => String::new(),
                (false, Some(line)) if line > 0 => format!("{}:{}", problem.file, line),
                (false, _) => problem.file.clone(),
            };
            let location = match &problem.diff_url {
                Some(url) => format!(
                    "<a href=\"{}\">{}</a>",
                    xml_escape(url),
                    xml_escape(&location)
                ),
                None => xml_escape(&location),
            };
            let rule = if problem.rule.is_empty() {
                String::new()
            } else {
                format!(" [{}.{}]", xml_escape(&problem.rule_set), xml_escape(&problem.rule))
            };
            let _ = writeln!(
                out,
                "<li class=\"{}\">{} {}{} — {}</li>",
                problem.severity.as_str(),
                problem.severity.as_str(),
                location,
                rule,
                xml_escape(&problem.message)
            );
        }
        out.push_str("</ul>\n");
    }
    out.push_str("</body>\n</html>\n");
    out
}

fn use_colors() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Human form: one line per problem plus a closing summary line.
fn render_txt(report: &Report) -> String {
    let color = use_colors();
    let mut out = String::new();
    for check in &report.checks {
        for problem in &check.problems {
            let (icon, tag) = match problem.severity {
                Severity::Error => {
                    if color {
                        ("✖".red().to_string(), "⟦error⟧".red().bold().to_string())
                    } else {
                        ("✖".to_string(), "⟦error⟧".to_string())
                    }
                }
                Severity::Warning => {
                    if color {
                        ("▲".yellow().to_string(), "⟦warn⟧".yellow().bold().to_string())
                    } else {
                        ("▲".to_string(), "⟦warn⟧".to_string())
                    }
                }
                Severity::Info => {
                    if color {
                        ("◆".blue().to_string(), "⟦info⟧".blue().bold().to_string())
                    } else {
                        ("◆".to_string(), "⟦info⟧".to_string())
                    }
                }
            };
            let location = match problem.line_from {
                Some(line) if line > 0 && !problem.file.is_empty() => {
                    format!("{}:{}", problem.file, line)
                }
                _ => problem.file.clone(),
            };
            let location = if color {
                location.bold().to_string()
            } else {
                location
            };
            let _ = writeln!(
                out,
                "{} {} {} ❲{}❳ — {}",
                icon, tag, location, check.id, problem.message
            );
        }
    }
    let summary = format!(
        "— Summary — status={} errors={} warnings={}",
        report.summary.status.as_str(),
        report.summary.num_errors,
        report.summary.num_warnings
    );
    if color {
        let _ = writeln!(out, "{}", summary.bold());
    } else {
        let _ = writeln!(out, "{}", summary);
    }
    let _ = writeln!(out, "{}", report.summary.condensed);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Check, Problem};

    fn sample_report() -> Report {
        let mut check = Check {
            id: "style".into(),
            title: "Coding style problems".into(),
            description: "Style findings".into(),
            url: String::new(),
            error_weight: 5,
            warning_weight: 1,
            allow_filtering: true,
            commit_keyed: false,
            problems: vec![Problem {
                file: "lib/foo.php".into(),
                line_from: Some(12),
                line_to: Some(12),
                severity: Severity::Error,
                rule_set: "moodle".into(),
                rule: "ForbiddenFunction".into(),
                message: "Calls to \"eval\" <forbidden> & flagged".into(),
                weight: 5,
                diff_url: Some("https://example.test/blob/main/lib/foo.php#L12".into()),
            }],
            num_errors: 0,
            num_warnings: 0,
        };
        check.recount();
        let summary = crate::aggregate::build_summary(std::slice::from_ref(&check));
        Report {
            version: crate::models::SMURF_VERSION.to_string(),
            checks: vec![check],
            summary,
            diff_url_template: None,
            commit_url_template: None,
        }
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(RenderFormat::parse("xml"), Some(RenderFormat::Xml));
        assert_eq!(RenderFormat::parse("html"), Some(RenderFormat::Html));
        assert_eq!(RenderFormat::parse("txt"), Some(RenderFormat::Txt));
        assert_eq!(RenderFormat::parse("markdown"), None);
        assert_eq!(RenderFormat::parse(""), None);
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(
            xml_escape(r#"a & b < c > "d" 'e'"#),
            "a &amp; b &lt; c &gt; &quot;d&quot; &#39;e&#39;"
        );
        assert_eq!(xml_escape("plain"), "plain");
    }

    #[test]
    fn test_xml_shape() {
        let xml = render(&sample_report(), RenderFormat::Xml);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<smurf version=\"0.9.0\" numerrors=\"1\" numwarnings=\"0\">"));
        assert!(xml.contains(
            "<summary status=\"error\" numerrors=\"1\" numwarnings=\"0\" condensedresult=\"smurf,error,1,0:style,error,1,0\"/>"
        ));
        assert!(xml.contains("<check id=\"style\""));
        assert!(xml.contains("<mess>"));
        assert!(xml.contains(
            "<problem file=\"lib/foo.php\" linefrom=\"12\" lineto=\"12\" rule=\"ForbiddenFunction\" ruleset=\"moodle\" weight=\"5\""
        ));
        // Message content is escaped for attribute embedding.
        assert!(xml.contains("Calls to &quot;eval&quot; &lt;forbidden&gt; &amp; flagged"));
        assert!(xml.contains("</smurf>"));
    }

    #[test]
    fn test_xml_empty_lines_render_as_empty_attributes() {
        let mut report = sample_report();
        report.checks[0].problems[0].line_from = None;
        report.checks[0].problems[0].line_to = None;
        let xml = render(&report, RenderFormat::Xml);
        assert!(xml.contains("linefrom=\"\" lineto=\"\""));
    }

    #[test]
    fn test_html_contains_sections_and_links() {
        let html = render(&sample_report(), RenderFormat::Html);
        assert!(html.contains("<h1 class=\"error\">"));
        assert!(html.contains("<h2 class=\"error\">Coding style problems (1 errors, 0 warnings)</h2>"));
        assert!(html.contains("<a href=\"https://example.test/blob/main/lib/foo.php#L12\">lib/foo.php:12</a>"));
        assert!(html.contains("[moodle.ForbiddenFunction]"));
    }

    #[test]
    fn test_txt_lists_problems_and_condensed() {
        let txt = render(&sample_report(), RenderFormat::Txt);
        assert!(txt.contains("lib/foo.php:12"));
        assert!(txt.contains("❲style❳"));
        assert!(txt.contains("errors=1 warnings=0"));
        assert!(txt.contains("smurf,error,1,0:style,error,1,0"));
    }

    #[test]
    fn test_rendering_is_pure() {
        let report = sample_report();
        assert_eq!(
            render(&report, RenderFormat::Xml),
            render(&report, RenderFormat::Xml)
        );
    }
}
