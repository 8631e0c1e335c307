//! Category file handles
//!
//! One buffered handle per category, opened lazily and flushed when closed.
//! The first open of a category in a run follows the [`WriteMode`]; reopening
//! the same category later in the run always appends, so nothing written
//! earlier in the run is lost.

use std::collections::{BTreeMap, HashSet};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use super::{Category, WriteMode};
use crate::core::error::SplitError;

pub struct CategoryFiles {
    dir: PathBuf,
    mode: WriteMode,
    handles: BTreeMap<String, BufWriter<File>>,
    seen: HashSet<String>,
    written: BTreeMap<String, usize>,
}

impl CategoryFiles {
    pub fn new(dir: &Path, mode: WriteMode) -> Self {
        Self {
            dir: dir.to_path_buf(),
            mode,
            handles: BTreeMap::new(),
            seen: HashSet::new(),
            written: BTreeMap::new(),
        }
    }

    /// Open the file for `category` unless it is already open.
    pub fn open(&mut self, category: &Category) -> Result<(), SplitError> {
        let key = category.file_name();
        if self.handles.contains_key(&key) {
            return Ok(());
        }

        let path = self.dir.join(&key);
        let truncate = self.mode == WriteMode::Truncate && !self.seen.contains(&key);
        let mut options = OpenOptions::new();
        if truncate {
            options.write(true).create(true).truncate(true);
        } else {
            options.append(true).create(true);
        }

        let file = options
            .open(&path)
            .map_err(|source| SplitError::Write { path, source })?;

        self.seen.insert(key.clone());
        self.written.entry(key.clone()).or_insert(0);
        self.handles.insert(key, BufWriter::new(file));
        Ok(())
    }

    /// Write one record to `category`, opening its file on first use.
    pub fn write_line(&mut self, category: &Category, line: &str) -> Result<(), SplitError> {
        self.open(category)?;
        let key = category.file_name();
        let path = self.dir.join(&key);

        if let Some(writer) = self.handles.get_mut(&key) {
            writer
                .write_all(line.as_bytes())
                .and_then(|_| writer.write_all(b"\n"))
                .map_err(|source| SplitError::Write { path, source })?;
            *self.written.entry(key).or_insert(0) += 1;
        }
        Ok(())
    }

    /// Flush and release the handle for `category`, if open.
    pub fn close(&mut self, category: &Category) -> Result<(), SplitError> {
        let key = category.file_name();
        match self.handles.remove(&key) {
            Some(writer) => flush(writer, self.dir.join(&key)),
            None => Ok(()),
        }
    }

    /// Flush and release every handle. Returns records written per file name.
    pub fn finish(mut self) -> Result<BTreeMap<String, usize>, SplitError> {
        let handles = std::mem::take(&mut self.handles);
        for (key, writer) in handles {
            flush(writer, self.dir.join(&key))?;
        }
        Ok(std::mem::take(&mut self.written))
    }
}

fn flush(writer: BufWriter<File>, path: PathBuf) -> Result<(), SplitError> {
    writer
        .into_inner()
        .map_err(|e| e.into_error())
        .and_then(|file| file.sync_all())
        .map_err(|source| SplitError::Write { path, source })
}
