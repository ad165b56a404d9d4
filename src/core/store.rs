//! Purpose: Append-only JSON-lines persistence for palette records.
//! Exports: `Store`.
//! Role: The concrete record store behind the catalog services; one file, one collection.
//! Invariants: Appends hold an exclusive lock and write exactly one line; scans hold a
//! Invariants: shared lock and either parse every line or fail. A missing file scans as
//! Invariants: an empty catalog and is created on first append.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::core::error::{Error, ErrorKind};
use crate::core::palette::{bounds_error, Palette};

pub struct Store {
    path: PathBuf,
}

impl Store {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, palette: &Palette) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| io_error(err, parent))?;
        }

        let mut line = serde_json::to_string(palette).map_err(|err| {
            Error::new(ErrorKind::Internal)
                .with_message("palette record failed to serialize")
                .with_source(err)
        })?;
        line.push('\n');

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| io_error(err, &self.path))?;
        let _lock = AppendLock::acquire(&file, &self.path)?;

        (&file)
            .write_all(line.as_bytes())
            .map_err(|err| io_error(err, &self.path))?;
        file.sync_all().map_err(|err| io_error(err, &self.path))?;
        Ok(())
    }

    /// Reads every record in append order. Any unreadable or out-of-bounds
    /// line fails the whole scan; partial results are never returned.
    pub fn scan(&self) -> Result<Vec<Palette>, Error> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(io_error(err, &self.path)),
        };

        file.lock_shared()
            .map_err(|err| lock_error(err, &self.path))?;
        let mut contents = String::new();
        let read = (&file).read_to_string(&mut contents);
        let _ = file.unlock();
        read.map_err(|err| io_error(err, &self.path))?;

        let mut palettes = Vec::new();
        for (index, line) in contents.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let line_no = index as u64 + 1;
            let palette: Palette = serde_json::from_str(line).map_err(|err| {
                Error::new(ErrorKind::Corrupt)
                    .with_message("unreadable palette record")
                    .with_path(&self.path)
                    .with_line(line_no)
                    .with_source(err)
            })?;
            if let Some(message) = bounds_error(palette.colors.len(), palette.tags.len()) {
                return Err(Error::new(ErrorKind::Corrupt)
                    .with_message(message)
                    .with_path(&self.path)
                    .with_line(line_no));
            }
            palettes.push(palette);
        }
        Ok(palettes)
    }
}

struct AppendLock<'a> {
    file: &'a File,
}

impl<'a> AppendLock<'a> {
    fn acquire(file: &'a File, path: &Path) -> Result<Self, Error> {
        file.lock_exclusive()
            .map_err(|err| lock_error(err, path))?;
        Ok(Self { file })
    }
}

impl Drop for AppendLock<'_> {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

fn io_error(err: io::Error, path: &Path) -> Error {
    let kind = if err.kind() == io::ErrorKind::PermissionDenied {
        ErrorKind::Permission
    } else {
        ErrorKind::Io
    };
    Error::new(kind).with_path(path).with_source(err)
}

fn lock_error(err: io::Error, path: &Path) -> Error {
    io_error(err, path).with_message("could not lock palette store")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::palette::PaletteDraft;
    use std::fs;

    fn sample(tags: &[&str]) -> Palette {
        let draft = PaletteDraft::new(
            vec![
                "#101010".to_string(),
                "#202020".to_string(),
                "#303030".to_string(),
            ],
            tags.iter().map(|t| t.to_string()).collect(),
        );
        let (colors, tags) = draft.validate().expect("fixture draft");
        Palette::create(colors, tags).expect("fixture palette")
    }

    #[test]
    fn append_then_scan_round_trips_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::open(dir.path().join("palettes.jsonl"));

        let first = sample(&["warm"]);
        let second = sample(&["cool"]);
        store.append(&first).expect("append first");
        store.append(&second).expect("append second");

        let records = store.scan().expect("scan");
        assert_eq!(records, vec![first, second]);
    }

    #[test]
    fn missing_file_scans_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::open(dir.path().join("absent.jsonl"));
        assert!(store.scan().expect("scan").is_empty());
    }

    #[test]
    fn append_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = Store::open(dir.path().join("nested/deeper/palettes.jsonl"));
        store.append(&sample(&[])).expect("append");
        assert_eq!(store.scan().expect("scan").len(), 1);
    }

    #[test]
    fn corrupt_line_fails_the_scan_with_its_line_number() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("palettes.jsonl");
        let store = Store::open(&path);
        store.append(&sample(&["warm"])).expect("append");

        let mut contents = fs::read_to_string(&path).expect("read");
        contents.push_str("{not json\n");
        fs::write(&path, contents).expect("write");

        let err = store.scan().expect_err("corrupt scan");
        assert_eq!(err.kind(), ErrorKind::Corrupt);
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn stored_record_outside_bounds_is_corrupt() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("palettes.jsonl");
        fs::write(
            &path,
            "{\"id\":\"aaaaaaaaaaaaaaaaaaaaaaaa\",\"colors\":[\"#101010\",\"#202020\"],\
\"tags\":[],\"createdAt\":\"2026-01-05T10:00:00Z\"}\n",
        )
        .expect("write");

        let err = Store::open(&path).scan().expect_err("bounds");
        assert_eq!(err.kind(), ErrorKind::Corrupt);
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn blank_lines_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("palettes.jsonl");
        let store = Store::open(&path);
        store.append(&sample(&["warm"])).expect("append");

        let mut contents = fs::read_to_string(&path).expect("read");
        contents.push('\n');
        fs::write(&path, contents).expect("write");

        assert_eq!(store.scan().expect("scan").len(), 1);
    }
}
