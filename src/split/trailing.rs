//! Last-field splitting
//!
//! Each record names its own category in its final field:
//! `name url [...] Category`. Records need at least three fields. The trimmed
//! record is written unchanged. `#` lines are comments.

use std::io::BufRead;

use super::sink::CategoryFiles;
use super::{Category, Line, ManifestLines, SplitReport, Warning};
use crate::core::error::SplitError;

/// Minimum number of fields for a record to carry a category
pub const MIN_FIELDS: usize = 3;

/// Category named by the last field, if the record has enough fields.
pub fn trailing_category(record: &str) -> Option<Category> {
    let fields: Vec<&str> = record.split_whitespace().collect();
    if fields.len() < MIN_FIELDS {
        return None;
    }
    fields.last().map(|last| Category::new(*last))
}

pub(crate) fn run<R: BufRead>(
    lines: ManifestLines<R>,
    files: &mut CategoryFiles,
    report: &mut SplitReport,
) -> Result<(), SplitError> {
    for item in lines {
        let (line_no, raw) = item?;
        let record = match Line::classify(&raw) {
            Line::Record(record) => record.trim(),
            Line::Blank | Line::Marker(_) => continue,
        };

        match trailing_category(record) {
            Some(category) => files.write_line(&category, record)?,
            None => report.warn(Warning::Malformed {
                line_no,
                line: record.to_string(),
            }),
        }
    }
    Ok(())
}
