//! Unified-diff change extraction: one pass over the diff, emitting the
//! inclusive line intervals of added lines per file.
//!
//! Only `+` lines count; deleted lines do not exist in the new file and do
//! not move the cursor. Context lines close the currently open interval.
//! Output feeds the patchset index, either as XML or the compact text form.

use regex::Regex;
use std::fmt::Write;
use std::io::BufRead;

/// Version stamp emitted on the `<diffchanges>` root element.
pub const DIFFCHANGES_VERSION: &str = "20120120";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Added-line intervals for one file section of the diff.
pub struct FileChanges {
    pub name: String,
    pub intervals: Vec<(u32, u32)>,
}

/// Scan a unified diff line by line and collect added-line intervals.
///
/// Hunk headers reset the cursor to one line before the new-file start; the
/// length field after the comma is optional. Lines that are neither headers
/// nor `+`/`-`/context are ignored, which keeps the scanner tolerant of
/// `diff`/`index`/mode lines and other tool noise.
pub fn extract_changes<R: BufRead>(input: R) -> Result<Vec<FileChanges>, String> {
    let file_re = Regex::new(r"^\+\+\+ (?:b/)?(.*)").expect("valid pattern");
    let hunk_re = Regex::new(r"^@@ [^+]*\+(\d+)").expect("valid pattern");

    let mut files: Vec<FileChanges> = Vec::new();
    let mut cursor: u32 = 0;
    let mut open: Option<(u32, u32)> = None;

    for line in input.lines() {
        let line = line.map_err(|e| format!("error reading diff: {}", e))?;

        if line.starts_with("diff") || line.starts_with("index") || line.starts_with("--- ") {
            continue;
        }

        if let Some(caps) = file_re.captures(&line) {
            close_interval(&mut files, &mut open);
            files.push(FileChanges {
                name: caps[1].to_string(),
                intervals: Vec::new(),
            });
            cursor = 0;
            continue;
        }

        if let Some(caps) = hunk_re.captures(&line) {
            close_interval(&mut files, &mut open);
            let start: u32 = caps[1]
                .parse()
                .map_err(|_| format!("bad hunk header: {}", line))?;
            cursor = start.saturating_sub(1);
            continue;
        }

        match line.chars().next() {
            // Deleted line: gone from the new file, cursor stays put.
            Some('-') => {}
            Some(' ') => {
                cursor += 1;
                close_interval(&mut files, &mut open);
            }
            Some('+') => {
                cursor += 1;
                match open {
                    Some((_, ref mut to)) => *to = cursor,
                    None => open = Some((cursor, cursor)),
                }
            }
            _ => {}
        }
    }
    close_interval(&mut files, &mut open);
    Ok(files)
}

fn close_interval(files: &mut [FileChanges], open: &mut Option<(u32, u32)>) {
    if let Some(interval) = open.take() {
        if let Some(file) = files.last_mut() {
            file.intervals.push(interval);
        }
    }
}

/// Text form: one `PATH:N1-N2;N3-N4;` line per file.
pub fn render_txt(changes: &[FileChanges]) -> String {
    let mut out = String::new();
    for file in changes {
        let _ = write!(out, "{}:", file.name);
        for (from, to) in &file.intervals {
            let _ = write!(out, "{}-{};", from, to);
        }
        out.push('\n');
    }
    out
}

/// XML form, directly consumable as patchset input.
pub fn render_xml(changes: &[FileChanges]) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n");
    let _ = writeln!(out, "<diffchanges version=\"{}\">", DIFFCHANGES_VERSION);
    for file in changes {
        let _ = writeln!(out, "  <file name=\"{}\">", crate::render::xml_escape(&file.name));
        for (from, to) in &file.intervals {
            let _ = writeln!(out, "    <lines from=\"{}\" to=\"{}\" />", from, to);
        }
        out.push_str("  </file>\n");
    }
    out.push_str("</diffchanges>\n");
    out
}
