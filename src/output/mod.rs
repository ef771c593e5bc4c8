//! Run outputs: the shared GTF and tracking files plus per-gene blobs.

pub mod blob;
pub mod gtf;
pub mod locked;
pub mod tracking;

mod binary_io;

use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::transcript::Gene;

pub use locked::{LockedFile, UnfinishedOutput};

/// The GTF and tracking outputs of one run, written under `.unfinished` names
/// until [`RunOutputs::finish`].
pub struct RunOutputs {
    gtf: UnfinishedOutput,
    tracking: UnfinishedOutput,
    fix_for_ucsc: bool,
}

impl RunOutputs {
    /// Create both files and write their header lines.
    pub fn create(gtf_path: &Path, tracking_path: &Path, fix_for_ucsc: bool) -> Result<Self, Error> {
        let gtf = UnfinishedOutput::create(gtf_path)?;
        gtf.file().write_block(&gtf::track_header(gtf_path))?;
        let tracking = UnfinishedOutput::create(tracking_path)?;
        tracking.file().write_block(&tracking::header())?;
        Ok(Self {
            gtf,
            tracking,
            fix_for_ucsc,
        })
    }

    /// Append a gene's lines to both files, one locked block per file.
    pub fn write_gene(&self, gene: &Gene) -> Result<(), Error> {
        self.gtf
            .file()
            .write_block(&gtf::render_gene(gene, self.fix_for_ucsc))?;
        self.tracking
            .file()
            .write_block(&tracking::render_gene(gene, self.fix_for_ucsc))?;
        Ok(())
    }

    /// Returns the final (GTF, tracking) paths.
    pub fn finish(self) -> Result<(PathBuf, PathBuf), Error> {
        let gtf = self.gtf.finish()?;
        let tracking = self.tracking.finish()?;
        Ok((gtf, tracking))
    }
}
