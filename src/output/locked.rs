//! Output files shared by every worker thread.

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::error::Error;

/// A buffered file whose writes are serialized by a mutex.
///
/// Each [`LockedFile::write_block`] call lands as one contiguous block, so
/// lines from different genes never interleave.
pub struct LockedFile {
    writer: Mutex<BufWriter<File>>,
}

impl LockedFile {
    pub fn create(path: &Path) -> Result<Self, Error> {
        let file = File::create(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    pub fn write_block(&self, block: &str) -> Result<(), Error> {
        let mut writer = self.writer.lock();
        writer.write_all(block.as_bytes())?;
        Ok(())
    }

    pub fn flush(&self) -> Result<(), Error> {
        self.writer.lock().flush()?;
        Ok(())
    }

    fn into_file(self) -> Result<File, Error> {
        self.writer
            .into_inner()
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }
}

/// An output written to `<path>.unfinished` and renamed to `<path>` only when
/// the run completes, so a crashed run never leaves a plausible final file.
pub struct UnfinishedOutput {
    final_path: PathBuf,
    unfinished_path: PathBuf,
    file: LockedFile,
}

impl UnfinishedOutput {
    pub fn create(final_path: &Path) -> Result<Self, Error> {
        let unfinished_path = unfinished_path(final_path);
        let file = LockedFile::create(&unfinished_path)?;
        Ok(Self {
            final_path: final_path.to_path_buf(),
            unfinished_path,
            file,
        })
    }

    #[must_use]
    pub fn file(&self) -> &LockedFile {
        &self.file
    }

    #[must_use]
    pub fn unfinished_path(&self) -> &Path {
        &self.unfinished_path
    }

    /// Flush, close and move the file to its final name.
    pub fn finish(self) -> Result<PathBuf, Error> {
        let file = self.file.into_file()?;
        file.sync_all()?;
        drop(file);
        std::fs::rename(&self.unfinished_path, &self.final_path)?;
        Ok(self.final_path)
    }
}

#[must_use]
pub fn unfinished_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".unfinished");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn blocks_do_not_interleave() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blocks.txt");
        let file = Arc::new(LockedFile::create(&path).unwrap());

        std::thread::scope(|s| {
            for t in 0..4 {
                let file = Arc::clone(&file);
                s.spawn(move || {
                    for _ in 0..50 {
                        let block = format!("{t}a\n{t}b\n{t}c\n");
                        file.write_block(&block).unwrap();
                    }
                });
            }
        });
        file.flush().unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 600);
        for block in lines.chunks(3) {
            let t = &block[0][..1];
            assert_eq!(block, [format!("{t}a"), format!("{t}b"), format!("{t}c")]);
        }
    }

    #[test]
    fn finish_renames_unfinished_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.gtf");
        let output = UnfinishedOutput::create(&path).unwrap();
        assert_eq!(output.unfinished_path(), dir.path().join("out.gtf.unfinished"));
        output.file().write_block("hello\n").unwrap();
        assert!(!path.exists());

        let final_path = output.finish().unwrap();
        assert_eq!(final_path, path);
        assert!(!dir.path().join("out.gtf.unfinished").exists());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn dropped_output_stays_unfinished() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.tracking");
        {
            let output = UnfinishedOutput::create(&path).unwrap();
            output.file().write_block("partial\n").unwrap();
        }
        assert!(!path.exists());
        assert!(dir.path().join("out.tracking.unfinished").exists());
    }
}
