//! Marker-driven splitting
//!
//! ```text
//! NoCategory --"# Name"--> InCategory(Name) --"# Other"--> InCategory(Other)
//! ```
//!
//! A marker closes the open section and opens the file for the new one.
//! Records are copied verbatim into the open section; records with no open
//! section are orphans.

use std::io::BufRead;

use super::sink::CategoryFiles;
use super::{Category, Line, ManifestLines, SplitReport, Warning, field_count};
use crate::core::error::SplitError;

/// Where the scan is.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MarkerState {
    #[default]
    NoCategory,
    InCategory(Category),
}

/// What to do with one line, given the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action<'a> {
    Ignore,
    Write(&'a Category, &'a str),
    Warn(Warning),
}

impl MarkerState {
    /// State after a marker line. An empty name leaves no category open.
    pub fn on_marker(name: &str) -> Self {
        if name.is_empty() {
            MarkerState::NoCategory
        } else {
            MarkerState::InCategory(Category::new(name))
        }
    }

    /// Decide what to do with a non-marker line. Does not change state.
    pub fn on_line<'a>(&'a self, line_no: usize, line: Line<'a>) -> Action<'a> {
        let record = match line {
            Line::Record(record) => record,
            Line::Blank | Line::Marker(_) => return Action::Ignore,
        };

        match self {
            MarkerState::NoCategory => Action::Warn(Warning::Orphan {
                line_no,
                line: record.to_string(),
            }),
            MarkerState::InCategory(_) if field_count(record) < 2 => Action::Warn(Warning::Malformed {
                line_no,
                line: record.to_string(),
            }),
            MarkerState::InCategory(category) => Action::Write(category, record),
        }
    }

    pub fn category(&self) -> Option<&Category> {
        match self {
            MarkerState::NoCategory => None,
            MarkerState::InCategory(category) => Some(category),
        }
    }
}

pub(crate) fn run<R: BufRead>(
    lines: ManifestLines<R>,
    files: &mut CategoryFiles,
    report: &mut SplitReport,
) -> Result<(), SplitError> {
    let mut state = MarkerState::NoCategory;

    for item in lines {
        let (line_no, raw) = item?;
        let line = Line::classify(&raw);

        if let Line::Marker(name) = line {
            if let Some(open) = state.category() {
                files.close(open)?;
            }
            state = MarkerState::on_marker(name);
            match state.category() {
                Some(category) => files.open(category)?,
                None => report.warn(Warning::EmptyMarker { line_no }),
            }
            continue;
        }

        match state.on_line(line_no, line) {
            Action::Ignore => {}
            Action::Write(category, record) => files.write_line(category, record)?,
            Action::Warn(warning) => report.warn(warning),
        }
    }

    if let Some(open) = state.category() {
        files.close(open)?;
    }
    Ok(())
}
