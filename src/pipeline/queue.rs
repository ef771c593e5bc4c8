//! Bounded work queue between producers and consumers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, SendTimeoutError, Sender, bounded};

use crate::elements::GeneElements;

/// One item on the work queue.
#[derive(Debug)]
pub enum WorkItem {
    Gene(Box<GeneElements>),
    /// No more work; the consumer that pulls this exits.
    Finished,
}

/// How often a blocked consumer rechecks the abort flag.
const ABORT_POLL: Duration = Duration::from_millis(50);

pub struct WorkQueue {
    tx: Sender<WorkItem>,
    rx: Receiver<WorkItem>,
    aborted: AtomicBool,
}

impl WorkQueue {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        Self {
            tx,
            rx,
            aborted: AtomicBool::new(false),
        }
    }

    /// Stop the run: consumers see a sentinel on their next receive and
    /// producers stop adding genes.
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    /// Enqueue with a bounded wait; a full queue hands the bundle back so the
    /// caller can assemble it itself.
    pub fn try_enqueue(&self, elements: GeneElements, timeout: Duration) -> Result<(), GeneElements> {
        match self.tx.send_timeout(WorkItem::Gene(Box::new(elements)), timeout) {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Timeout(item) | SendTimeoutError::Disconnected(item)) => {
                match item {
                    WorkItem::Gene(elements) => Err(*elements),
                    WorkItem::Finished => unreachable!("only genes are enqueued with a timeout"),
                }
            }
        }
    }

    /// Send one sentinel, waiting at most `timeout` for room. Returns
    /// whether it was enqueued.
    pub fn send_finished(&self, timeout: Duration) -> bool {
        self.tx.send_timeout(WorkItem::Finished, timeout).is_ok()
    }

    /// Blocks until an item is available. An aborted queue yields
    /// `Finished` without draining what is left.
    #[must_use]
    pub fn recv(&self) -> WorkItem {
        loop {
            if self.is_aborted() {
                return WorkItem::Finished;
            }
            match self.rx.recv_timeout(ABORT_POLL) {
                Ok(item) => return item,
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return WorkItem::Finished,
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        self.tx.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strand::Strand;
    use std::collections::BTreeSet;

    fn elements(id: &str) -> GeneElements {
        GeneElements {
            id: id.to_string(),
            contig: "chr1".to_string(),
            strand: Strand::Forward,
            tss_exons: BTreeSet::new(),
            internal_exons: BTreeSet::new(),
            tes_exons: BTreeSet::new(),
            se_transcripts: BTreeSet::new(),
            promoters: BTreeSet::new(),
            polyas: BTreeSet::new(),
            introns: BTreeSet::new(),
        }
    }

    #[test]
    fn full_queue_returns_bundle() {
        let queue = WorkQueue::new(1);
        assert_eq!(queue.capacity(), Some(1));
        queue
            .try_enqueue(elements("XLOC_0"), Duration::from_millis(1))
            .unwrap();
        let rejected = queue
            .try_enqueue(elements("XLOC_1"), Duration::from_millis(1))
            .unwrap_err();
        assert_eq!(rejected.id, "XLOC_1");
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn items_then_sentinel() {
        let queue = WorkQueue::new(4);
        queue
            .try_enqueue(elements("XLOC_0"), Duration::from_millis(1))
            .unwrap();
        assert!(queue.send_finished(Duration::from_millis(1)));
        assert!(matches!(queue.recv(), WorkItem::Gene(e) if e.id == "XLOC_0"));
        assert!(matches!(queue.recv(), WorkItem::Finished));
        assert!(queue.is_empty());
    }

    #[test]
    fn sentinel_into_full_queue_times_out() {
        let queue = WorkQueue::new(1);
        queue
            .try_enqueue(elements("XLOC_0"), Duration::from_millis(1))
            .unwrap();
        assert!(!queue.send_finished(Duration::from_millis(1)));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn abort_releases_blocked_consumer() {
        let queue = WorkQueue::new(2);
        std::thread::scope(|s| {
            let consumer = s.spawn(|| queue.recv());
            std::thread::sleep(Duration::from_millis(20));
            queue.abort();
            assert!(matches!(consumer.join().unwrap(), WorkItem::Finished));
        });

        // pending work is abandoned once aborted
        queue
            .try_enqueue(elements("XLOC_1"), Duration::from_millis(1))
            .unwrap();
        assert!(matches!(queue.recv(), WorkItem::Finished));
    }
}
