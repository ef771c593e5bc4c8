//! Parallel transcript building: producers cluster elements into genes,
//! consumers assemble and write them.
//!
//! ```text
//!  groups ──► args channel ──► producers ──try_enqueue──► work queue ──► consumers
//!                                 │  (timeout: build inline)                 │
//!                                 └──────────► completions ◄─────────────────┘
//! ```
//!
//! Each producer becomes a consumer once its groups are exhausted. A monitor
//! broadcasts `threads + 1` sentinels when the last producer finishes.
//!
//! A panicking worker aborts the queue so the rest of the pool and the
//! monitor wind down, and the first panic is re-raised to the caller.

pub mod counters;
pub mod distributor;
pub mod queue;
pub mod worker;

use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::thread;

use crossbeam_channel::unbounded;
use log::{error, info};
use parking_lot::Mutex;

use crate::config::BuildConfig;
use crate::elements::GroupedElements;
use crate::error::Error;
use crate::output::RunOutputs;
use crate::transcript::GeneAssembler;

use counters::{GeneIdCounter, RemainingProducers};
use distributor::{ProducerTask, run_monitor, run_producer};
use queue::WorkQueue;

pub use worker::{CompletionRecord, GeneOutcome, WorkerContext};

/// Build transcripts for every gene locus in `groups`, writing the GTF and
/// tracking files and one blob per gene.
///
/// Genes that fail are logged and skipped, so the returned records may be
/// fewer than the loci. The output files only appear under their final names
/// if the whole run succeeds.
///
/// # Panics
///
/// If a splice graph is cyclic, or if the same gene id is recorded twice.
pub fn build_transcripts(
    groups: &GroupedElements,
    gtf_path: &Path,
    tracking_path: &Path,
    config: &BuildConfig,
    assembler: GeneAssembler<'_>,
) -> Result<Vec<CompletionRecord>, Error> {
    let outputs = RunOutputs::create(gtf_path, tracking_path, config.fix_chrm_names_for_ucsc)?;

    info!("Building Transcripts");
    let threads = config.threads.max(1);
    let num_producers = groups.len().min(threads);
    let num_consumers = threads.saturating_sub(groups.len());

    let queue = WorkQueue::new(config.queue_capacity().max(1));
    let ids = GeneIdCounter::new();
    let remaining = RemainingProducers::new(num_producers);
    let (done_tx, done_rx) = unbounded();
    let ctx = WorkerContext::new(assembler, &outputs, config, done_tx);

    let (task_tx, task_rx) = unbounded();
    for ((contig, strand), group) in groups {
        let _ = task_tx.send(ProducerTask::Group {
            contig: contig.as_str(),
            strand: *strand,
            group,
        });
    }
    for _ in 0..threads {
        let _ = task_tx.send(ProducerTask::Finished);
    }

    let first_panic: Mutex<Option<Box<dyn Any + Send>>> = Mutex::new(None);
    let spawned = {
        let (queue, ctx, ids, remaining, task_rx, first_panic) =
            (&queue, &ctx, &ids, &remaining, &task_rx, &first_panic);
        thread::scope(move |s| -> Result<(), Error> {
            let spawn_all = move || -> std::io::Result<()> {
                for i in 0..num_consumers {
                    thread::Builder::new()
                        .name(format!("consumer-{i}"))
                        .spawn_scoped(s, move || {
                            run_guarded(queue, first_panic, || ctx.run_consumer(queue));
                        })?;
                }
                for i in 0..num_producers {
                    thread::Builder::new()
                        .name(format!("producer-{i}"))
                        .spawn_scoped(s, move || {
                            run_guarded(queue, first_panic, || {
                                run_producer(ctx, queue, task_rx, ids, remaining);
                            });
                        })?;
                }
                Ok(())
            };
            if let Err(e) = spawn_all() {
                error!("Failed to start worker thread: {e}");
                queue.abort();
                return Err(e.into());
            }
            run_monitor(queue, remaining, threads + 1, config.monitor_poll_interval());
            Ok(())
        })
    };
    if let Some(payload) = first_panic.into_inner() {
        panic::resume_unwind(payload);
    }
    spawned?;
    drop(ctx);

    let mut records = Vec::new();
    while let Ok(record) = done_rx.try_recv() {
        records.push(record);
    }
    let unique: HashSet<&str> = records.iter().map(|r| r.gene_id.as_str()).collect();
    assert_eq!(unique.len(), records.len(), "duplicate gene ids in completion records");
    info!("Finished building transcripts");

    outputs.finish()?;
    Ok(records)
}

/// Run one worker body. A panic aborts the queue and is kept, first one
/// wins, for `build_transcripts` to re-raise once every thread has joined.
fn run_guarded(
    queue: &WorkQueue,
    first_panic: &Mutex<Option<Box<dyn Any + Send>>>,
    body: impl FnOnce(),
) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(body)) {
        error!(
            "Worker {} panicked, aborting run",
            thread::current().name().unwrap_or("<unnamed>")
        );
        queue.abort();
        let mut slot = first_panic.lock();
        if slot.is_none() {
            *slot = Some(payload);
        }
    }
}
