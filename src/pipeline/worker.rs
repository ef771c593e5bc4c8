//! Per-gene assembly and writing, and the consumer loop.

use std::backtrace::Backtrace;
use std::path::PathBuf;
use std::thread;

use crossbeam_channel::Sender;
use log::{debug, error, warn};

use crate::config::BuildConfig;
use crate::elements::GeneElements;
use crate::error::Error;
use crate::output::RunOutputs;
use crate::output::blob::write_gene_file;
use crate::transcript::GeneAssembler;

use super::queue::{WorkItem, WorkQueue};

/// One successfully built and written gene.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRecord {
    pub gene_id: String,
    pub num_transcripts: usize,
    /// Serialized gene, readable with [`crate::output::blob::read_gene_file`].
    pub path: PathBuf,
}

/// What happened to one gene bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneOutcome {
    Built(CompletionRecord),
    /// The locus produced no transcripts.
    Empty,
    TooManyCandidates,
    Failed,
}

/// Everything a worker needs to turn a bundle into written output.
pub struct WorkerContext<'a> {
    assembler: GeneAssembler<'a>,
    outputs: &'a RunOutputs,
    config: &'a BuildConfig,
    completions: Sender<CompletionRecord>,
}

impl<'a> WorkerContext<'a> {
    pub fn new(
        assembler: GeneAssembler<'a>,
        outputs: &'a RunOutputs,
        config: &'a BuildConfig,
        completions: Sender<CompletionRecord>,
    ) -> Self {
        Self {
            assembler,
            outputs,
            config,
            completions,
        }
    }

    #[must_use]
    pub fn config(&self) -> &BuildConfig {
        self.config
    }

    /// Assemble and write one gene. Failures are logged and the gene skipped.
    pub fn build_and_write_gene(&self, elements: &GeneElements) -> GeneOutcome {
        debug!(
            "Building transcripts and ORFs for {}",
            elements.describe()
        );
        match self.try_build_and_write(elements) {
            Ok(Some(record)) => {
                debug!("FINISHED building transcripts and ORFs for gene {}", record.gene_id);
                // the parent holds the receiver until every worker has joined
                let _ = self.completions.send(record.clone());
                GeneOutcome::Built(record)
            }
            Ok(None) => GeneOutcome::Empty,
            Err(e @ Error::TooManyCandidates { .. }) => {
                warn!("Too many candidate transcripts in {}: {e}", elements.describe());
                GeneOutcome::TooManyCandidates
            }
            Err(e) => {
                for line in self.failure_report(elements, &e) {
                    error!("{line}");
                }
                GeneOutcome::Failed
            }
        }
    }

    /// Log lines for a failed gene. Verbose mode adds the error's debug form
    /// and the stack of the worker reporting it; errors carry no trace of
    /// their own origin.
    fn failure_report(&self, elements: &GeneElements, e: &Error) -> Vec<String> {
        let mut lines = vec![format!(
            "ERROR building transcript in {}: {e}",
            elements.describe()
        )];
        if self.config.verbose_errors {
            lines.push(format!("{e:?}"));
            lines.push(format!(
                "stack of worker {} reporting the failure:\n{}",
                thread::current().name().unwrap_or("<unnamed>"),
                Backtrace::force_capture()
            ));
        }
        lines
    }

    fn try_build_and_write(&self, elements: &GeneElements) -> Result<Option<CompletionRecord>, Error> {
        let Some(gene) = self.assembler.build_gene(elements)? else {
            return Ok(None);
        };
        let path = self.config.gene_tmp_path(&gene.id);
        write_gene_file(&path, &gene)?;
        self.outputs.write_gene(&gene)?;
        Ok(Some(CompletionRecord {
            gene_id: gene.id,
            num_transcripts: gene.transcripts.len(),
            path,
        }))
    }

    /// Pull bundles until a sentinel arrives.
    pub fn run_consumer(&self, queue: &WorkQueue) {
        loop {
            debug!("Waiting for gene to process. ({})", queue.len());
            match queue.recv() {
                WorkItem::Finished => return,
                WorkItem::Gene(elements) => {
                    self.build_and_write_gene(&elements);
                }
            }
        }
    }
}
