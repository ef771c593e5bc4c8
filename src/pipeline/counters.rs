//! Counters shared by producer threads.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use log::info;

/// Mints run-unique gene ids `XLOC_0`, `XLOC_1`, ...
#[derive(Debug, Default)]
pub struct GeneIdCounter {
    next: AtomicU64,
}

impl GeneIdCounter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_gene_id(&self) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("XLOC_{n}")
    }

    #[must_use]
    pub fn minted(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

/// Number of producers still adding elements to the work queue.
#[derive(Debug)]
pub struct RemainingProducers {
    remaining: AtomicUsize,
}

impl RemainingProducers {
    #[must_use]
    pub fn new(producers: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(producers),
        }
    }

    #[must_use]
    pub fn get(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    /// Held by a producer while it adds elements; dropping it (also on
    /// unwind) counts the producer as finished.
    #[must_use]
    pub fn guard(&self) -> ProducerGuard<'_> {
        ProducerGuard { counter: self }
    }
}

pub struct ProducerGuard<'a> {
    counter: &'a RemainingProducers,
}

impl Drop for ProducerGuard<'_> {
    fn drop(&mut self) {
        let left = self.counter.remaining.fetch_sub(1, Ordering::AcqRel) - 1;
        info!("Finished adding elements ({left} left)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn gene_ids_unique_across_threads() {
        let counter = GeneIdCounter::new();
        let ids: Vec<String> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| (0..500).map(|_| counter.next_gene_id()).collect::<Vec<_>>()))
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });
        let unique: HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), 4000);
        assert!(unique.contains(&"XLOC_0".to_string()));
        assert!(unique.contains(&"XLOC_3999".to_string()));
        assert_eq!(counter.minted(), 4000);
    }

    #[test]
    fn guard_decrements_on_drop() {
        let remaining = RemainingProducers::new(2);
        {
            let _guard = remaining.guard();
            assert_eq!(remaining.get(), 2);
        }
        assert_eq!(remaining.get(), 1);
    }

    #[test]
    fn guard_decrements_on_panic() {
        let remaining = RemainingProducers::new(1);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = remaining.guard();
            panic!("producer failed");
        }));
        assert!(result.is_err());
        assert_eq!(remaining.get(), 0);
    }
}
