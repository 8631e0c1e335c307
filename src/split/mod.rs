//! Tool manifest splitting
//!
//! A manifest is a text file of `name url [dest_subfolder]` records, one per
//! line. Splitting partitions the records into one `<Category>.txt` file per
//! category inside an output directory. Three strategies decide the category:
//!
//! - [`Strategy::Markers`]: `# Category` lines in the manifest open a section
//! - [`Strategy::Keywords`]: the tool name is looked up in a [`KeywordTable`]
//! - [`Strategy::Trailing`]: the last field of the record is the category
//!
//! Missing input and unwritable output are fatal. Every per-line problem is a
//! [`Warning`]: printed, collected in the [`SplitReport`], and skipped.

pub mod keywords;
mod markers;
mod sink;
mod trailing;

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::core::error::SplitError;
use crate::core::output;

pub use keywords::KeywordTable;
pub use markers::{Action as MarkerAction, MarkerState};
pub use sink::CategoryFiles;

/// Default manifest path
pub const DEFAULT_INPUT: &str = "tools.txt";

/// Default output directory
pub const DEFAULT_OUTPUT_DIR: &str = "tools";

/// Prefix on tool names that are cloned rather than downloaded
pub const GIT_PREFIX: &str = "git:";

/// One manifest record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolEntry {
    pub name: String,
    pub url: String,
    pub dest_subfolder: Option<String>,
}

impl ToolEntry {
    /// Parse `name url [rest...]`. Everything after the URL is the destination
    /// subfolder. Returns `None` for fewer than two fields.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        let (name, rest) = split_field(line)?;
        let (url, rest) = split_field(rest)?;
        let rest = rest.trim();

        Some(Self {
            name: name.to_string(),
            url: url.to_string(),
            dest_subfolder: (!rest.is_empty()).then(|| rest.to_string()),
        })
    }

    /// Tool name without any `git:` prefix.
    pub fn bare_name(&self) -> &str {
        self.name.strip_prefix(GIT_PREFIX).unwrap_or(&self.name)
    }

    /// Explicit destination subfolder, or the bare name.
    pub fn dest_or_default(&self) -> &str {
        self.dest_subfolder.as_deref().unwrap_or_else(|| self.bare_name())
    }

    /// `name url dest_subfolder`, with the default subfolder filled in.
    pub fn to_line(&self) -> String {
        format!("{} {} {}", self.name, self.url, self.dest_or_default())
    }
}

fn split_field(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(idx) => Some((&s[..idx], &s[idx..])),
        None => Some((s, "")),
    }
}

/// Number of whitespace-separated fields in a record line.
pub fn field_count(line: &str) -> usize {
    line.split_whitespace().count()
}

/// A named output grouping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Category(String);

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// File name for this category: every character other than a letter,
    /// digit, `_` or `-` becomes `-`, then `.txt` is appended.
    pub fn file_name(&self) -> String {
        format!("{}.txt", sanitize(&self.0))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Make a category name safe to use as a file name.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '-' })
        .collect()
}

/// What a raw manifest line is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    Blank,
    /// `#` line; holds the trimmed text after the `#`.
    Marker(&'a str),
    /// Anything else, with the line ending removed.
    Record(&'a str),
}

impl<'a> Line<'a> {
    pub fn classify(raw: &'a str) -> Self {
        let line = raw.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            Line::Blank
        } else if let Some(marker) = line.strip_prefix('#') {
            Line::Marker(marker.trim())
        } else {
            Line::Record(line)
        }
    }
}

/// A recoverable per-line problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// Too few fields for the strategy in use.
    Malformed { line_no: usize, line: String },
    /// Record before any category marker.
    Orphan { line_no: usize, line: String },
    /// `#` marker with no category name.
    EmptyMarker { line_no: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::Malformed { line_no, line } => {
                write!(f, "line {}: invalid line '{}', skipping", line_no, line)
            }
            Warning::Orphan { line_no, line } => {
                write!(f, "line {}: '{}' ignored (no category defined)", line_no, line)
            }
            Warning::EmptyMarker { line_no } => {
                write!(f, "line {}: category marker without a name", line_no)
            }
        }
    }
}

/// Outcome of a split run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SplitReport {
    /// Records written, keyed by category file name.
    pub written: BTreeMap<String, usize>,
    pub warnings: Vec<Warning>,
}

impl SplitReport {
    pub fn total_written(&self) -> usize {
        self.written.values().sum()
    }

    fn warn(&mut self, warning: Warning) {
        output::warning(&warning.to_string());
        self.warnings.push(warning);
    }
}

/// Whether a run starts category files from scratch or adds to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    #[default]
    Truncate,
    Append,
}

/// How records are assigned to categories.
#[derive(Debug, Clone)]
pub enum Strategy {
    Markers,
    Keywords(KeywordTable),
    Trailing,
}

#[derive(Debug, Clone)]
pub struct SplitOptions {
    pub strategy: Strategy,
    pub write_mode: WriteMode,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::Markers,
            write_mode: WriteMode::Truncate,
        }
    }
}

/// Split `input` into per-category files under `output_dir`.
pub fn split(input: &Path, output_dir: &Path, options: &SplitOptions) -> Result<SplitReport, SplitError> {
    if !input.is_file() {
        return Err(SplitError::MissingInput(input.to_path_buf()));
    }
    let file = File::open(input).map_err(|source| SplitError::Read {
        path: input.to_path_buf(),
        source,
    })?;

    std::fs::create_dir_all(output_dir).map_err(|source| SplitError::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    let lines = ManifestLines::new(BufReader::new(file), input.to_path_buf());
    let mut files = CategoryFiles::new(output_dir, options.write_mode);
    let mut report = SplitReport::default();

    match &options.strategy {
        Strategy::Markers => markers::run(lines, &mut files, &mut report)?,
        Strategy::Keywords(table) => keywords::run(lines, table, &mut files, &mut report)?,
        Strategy::Trailing => trailing::run(lines, &mut files, &mut report)?,
    }

    report.written = files.finish()?;
    Ok(report)
}

/// Numbered lines of a manifest, with read errors mapped to [`SplitError`].
///
/// Bytes that are not valid UTF-8 are replaced with U+FFFD so one badly
/// encoded line cannot stop the run.
pub(crate) struct ManifestLines<R> {
    reader: R,
    path: PathBuf,
    line_no: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> ManifestLines<R> {
    pub(crate) fn new(reader: R, path: PathBuf) -> Self {
        Self {
            reader,
            path,
            line_no: 0,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for ManifestLines<R> {
    type Item = Result<(usize, String), SplitError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.ends_with(b"\n") {
                    self.buf.pop();
                    if self.buf.ends_with(b"\r") {
                        self.buf.pop();
                    }
                }
                self.line_no += 1;
                let line = String::from_utf8_lossy(&self.buf).into_owned();
                Some(Ok((self.line_no, line)))
            }
            Err(source) => Some(Err(SplitError::Read {
                path: self.path.clone(),
                source,
            })),
        }
    }
}
