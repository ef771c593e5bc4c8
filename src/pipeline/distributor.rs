//! Producers that cluster elements into genes and feed the work queue, and
//! the monitor that broadcasts shutdown once they are done.

use std::thread;
use std::time::Duration;

use crossbeam_channel::Receiver;
use log::{info, warn};

use crate::elements::ElementGroup;
use crate::strand::Strand;

use super::counters::{GeneIdCounter, RemainingProducers};
use super::queue::WorkQueue;
use super::worker::WorkerContext;

/// Work handed to a producer through the args channel.
pub enum ProducerTask<'g> {
    Group {
        contig: &'g str,
        strand: Strand,
        group: &'g ElementGroup,
    },
    /// No more groups for this producer.
    Finished,
}

/// Mint ids for every assemblable locus of one contig/strand group and
/// enqueue them, assembling inline whenever the queue stays full.
///
/// Returns the number of gene bundles produced.
pub fn add_elements_for_group(
    ctx: &WorkerContext<'_>,
    queue: &WorkQueue,
    ids: &GeneIdCounter,
    contig: &str,
    strand: Strand,
    group: &ElementGroup,
) -> usize {
    info!("Clustering elements into genes for {contig}:{strand}");
    let timeout = ctx.config().enqueue_timeout();
    let mut produced = 0;
    for locus in group.iter_loci() {
        if queue.is_aborted() {
            warn!("Run aborted, no more genes from {contig}:{strand}");
            return produced;
        }
        if !locus.is_assemblable() {
            continue;
        }
        let elements = locus.into_gene_elements(ids.next_gene_id(), contig, strand);
        produced += 1;
        if let Err(elements) = queue.try_enqueue(elements, timeout) {
            ctx.build_and_write_gene(&elements);
        }
    }
    info!("FINISHED clustering elements into genes for {contig}:{strand}");
    produced
}

/// Take groups until a `Finished` task, then drain the work queue as a consumer.
pub fn run_producer<'g>(
    ctx: &WorkerContext<'_>,
    queue: &WorkQueue,
    tasks: &Receiver<ProducerTask<'g>>,
    ids: &GeneIdCounter,
    remaining: &RemainingProducers,
) {
    {
        let _guard = remaining.guard();
        while let Ok(ProducerTask::Group {
            contig,
            strand,
            group,
        }) = tasks.recv()
        {
            add_elements_for_group(ctx, queue, ids, contig, strand, group);
        }
    }
    ctx.run_consumer(queue);
}

/// Poll until every producer is done, then enqueue `sentinels` sentinels.
///
/// Returns early if the queue is aborted, since a dead worker may leave it
/// full with nobody draining it.
pub fn run_monitor(
    queue: &WorkQueue,
    remaining: &RemainingProducers,
    sentinels: usize,
    poll: Duration,
) {
    while remaining.get() > 0 {
        if queue.is_aborted() {
            return;
        }
        thread::sleep(poll);
    }
    info!("Finished adding elements");
    for _ in 0..sentinels {
        while !queue.send_finished(poll) {
            if queue.is_aborted() {
                warn!("Run aborted before every consumer was signalled");
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildConfig;
    use crate::elements::ElementCategory;
    use crate::interval::Interval;
    use crate::output::RunOutputs;
    use crate::pipeline::queue::WorkItem;
    use crate::transcript::GeneAssembler;
    use crossbeam_channel::unbounded;
    use tempfile::TempDir;

    fn group() -> ElementGroup {
        let mut g = ElementGroup::default();
        for base in [0, 1000, 2000] {
            g.push(ElementCategory::Gene, Interval::new(base, base + 600));
            g.push(ElementCategory::SingleExonGene, Interval::new(base + 10, base + 500));
        }
        // no TES exon and no single-exon transcript: skipped without an id
        g.push(ElementCategory::Gene, Interval::new(5000, 5600));
        g.push(ElementCategory::TssExon, Interval::new(5000, 5050));
        g.sort();
        g
    }

    #[test]
    fn full_queue_falls_back_to_inline_assembly() {
        let dir = TempDir::new().unwrap();
        let config = BuildConfig {
            tmp_dir: dir.path().to_path_buf(),
            enqueue_timeout_ms: 1,
            ..BuildConfig::default()
        };
        let outputs = RunOutputs::create(
            &dir.path().join("g.gtf"),
            &dir.path().join("g.tracking"),
            false,
        )
        .unwrap();
        let (tx, rx) = unbounded();
        let ctx = WorkerContext::new(GeneAssembler::new(&config), &outputs, &config, tx);
        let queue = WorkQueue::new(1);
        let ids = GeneIdCounter::new();

        let produced = add_elements_for_group(&ctx, &queue, &ids, "chr1", Strand::Forward, &group());
        assert_eq!(produced, 3);
        assert_eq!(ids.minted(), 3);
        // one bundle fits in the queue, the other two were built inline
        assert_eq!(queue.len(), 1);
        let inline: Vec<String> = rx.try_iter().map(|r| r.gene_id).collect();
        assert_eq!(inline, ["XLOC_1", "XLOC_2"]);
        assert!(matches!(queue.recv(), WorkItem::Gene(e) if e.id == "XLOC_0"));
    }

    #[test]
    fn monitor_waits_for_producers() {
        let queue = WorkQueue::new(8);
        let remaining = RemainingProducers::new(1);
        thread::scope(|s| {
            s.spawn(|| run_monitor(&queue, &remaining, 3, Duration::from_millis(1)));
            thread::sleep(Duration::from_millis(20));
            assert!(queue.is_empty());
            drop(remaining.guard());
        });
        assert_eq!(queue.len(), 3);
        for _ in 0..3 {
            assert!(matches!(queue.recv(), WorkItem::Finished));
        }
    }

    #[test]
    fn monitor_gives_up_on_full_queue_after_abort() {
        let queue = WorkQueue::new(1);
        let remaining = RemainingProducers::new(0);
        assert!(queue.send_finished(Duration::from_millis(1)));
        thread::scope(|s| {
            let monitor = s.spawn(|| run_monitor(&queue, &remaining, 2, Duration::from_millis(1)));
            thread::sleep(Duration::from_millis(20));
            assert!(!monitor.is_finished());
            queue.abort();
            monitor.join().unwrap();
        });
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn aborted_queue_stops_production() {
        let dir = TempDir::new().unwrap();
        let config = BuildConfig {
            tmp_dir: dir.path().to_path_buf(),
            ..BuildConfig::default()
        };
        let outputs = RunOutputs::create(
            &dir.path().join("g.gtf"),
            &dir.path().join("g.tracking"),
            false,
        )
        .unwrap();
        let (tx, _rx) = unbounded();
        let ctx = WorkerContext::new(GeneAssembler::new(&config), &outputs, &config, tx);
        let queue = WorkQueue::new(8);
        queue.abort();
        let ids = GeneIdCounter::new();
        assert_eq!(add_elements_for_group(&ctx, &queue, &ids, "chr1", Strand::Forward, &group()), 0);
        assert_eq!(ids.minted(), 0);
    }
}
