//! Patchset index: changed-line intervals per file, and the matching
//! algorithm used to decide whether a problem touches the patch.
//!
//! The index is built once per run from a `<patchset>` (or `<diffchanges>`)
//! XML description and read-only thereafter. Intervals are kept exactly as
//! supplied; no merging or normalization is performed.

use crate::models::Problem;
use std::collections::HashMap;

/// Inclusive `(from, to)` interval of lines added or changed by a patch.
pub type LineInterval = (u32, u32);

#[derive(Debug, Default)]
pub struct PatchsetIndex {
    files: HashMap<String, Vec<LineInterval>>,
}

impl PatchsetIndex {
    /// Parse a patchset XML document into the index. The root element name is
    /// not checked so the diff extractor's `<diffchanges>` output feeds the
    /// index directly.
    pub fn parse(xml: &str) -> Result<PatchsetIndex, String> {
        let doc = roxmltree::Document::parse(xml)
            .map_err(|e| format!("invalid patchset xml: {}", e))?;
        let mut files: HashMap<String, Vec<LineInterval>> = HashMap::new();
        for file in doc
            .root_element()
            .children()
            .filter(|n| n.has_tag_name("file"))
        {
            let Some(name) = file.attribute("name") else {
                continue;
            };
            let mut intervals = Vec::new();
            for lines in file.children().filter(|n| n.has_tag_name("lines")) {
                let from = lines.attribute("from").and_then(|v| v.parse::<u32>().ok());
                let to = lines.attribute("to").and_then(|v| v.parse::<u32>().ok());
                if let (Some(from), Some(to)) = (from, to) {
                    intervals.push((from, to));
                }
            }
            files.insert(name.to_string(), intervals);
        }
        Ok(PatchsetIndex { files })
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn intervals(&self, file: &str) -> Option<&[LineInterval]> {
        self.files.get(file).map(Vec::as_slice)
    }

    /// Decide whether a problem falls inside the patch. Gate order is fixed:
    /// problems without file/line attributes never match, then the file must
    /// be part of the patchset, then line 0/0 counts as a whole-file match,
    /// otherwise either boundary line must sit inside some interval.
    pub fn matches(&self, problem: &Problem) -> bool {
        let (Some(from), Some(to)) = (problem.line_from, problem.line_to) else {
            return false;
        };
        if problem.file.is_empty() {
            return false;
        }
        let Some(intervals) = self.files.get(&problem.file) else {
            return false;
        };
        if from == 0 && to == 0 {
            return true;
        }
        intervals
            .iter()
            .any(|&(lo, hi)| (lo <= from && from <= hi) || (lo <= to && to <= hi))
    }
}
