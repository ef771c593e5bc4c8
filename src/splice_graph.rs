//! Splice graph construction and candidate transcript enumeration.
//!
//! A gene's exons become the nodes of a directed graph; each junction that
//! splices one exon onto another becomes an edge pointing in transcription
//! direction. Candidate transcripts are the maximal TSS→TES paths through
//! that graph. Both enumerators walk the graph with an explicit stack, so
//! long intron chains never recurse and the candidate ceiling can be checked
//! after every yielded path.

use std::collections::BTreeSet;

use petgraph::algo::is_cyclic_directed;
use petgraph::graphmap::DiGraphMap;

use crate::elements::{GeneElements, find_jn_connected_exons};
use crate::error::Error;
use crate::interval::{Exon, Interval, total_length};
use crate::strand::Strand;

/// How candidate transcripts are enumerated for a gene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumerationMode {
    /// Every full TSS→TES path.
    Exhaustive,
    /// Overlapping fragments whose length is capped at `max_length` bases.
    Fragments { max_length: u64 },
}

impl EnumerationMode {
    #[must_use]
    pub fn from_max_fragment_length(max_length: Option<u64>) -> Self {
        match max_length {
            Some(max_length) => Self::Fragments { max_length },
            None => Self::Exhaustive,
        }
    }
}

/// Directed acyclic graph of exons connected by junctions.
#[derive(Debug, Clone)]
pub struct SpliceGraph {
    graph: DiGraphMap<Exon, Interval>,
    tss_exons: BTreeSet<Exon>,
    tes_exons: BTreeSet<Exon>,
}

impl SpliceGraph {
    /// Builds the graph for one locus.
    ///
    /// # Panics
    ///
    /// Panics if the junctions produce a cycle. That can only come from
    /// malformed clustering upstream, and enumerating a cyclic graph would
    /// never terminate.
    #[must_use]
    pub fn build(
        tss_exons: &BTreeSet<Exon>,
        internal_exons: &BTreeSet<Exon>,
        tes_exons: &BTreeSet<Exon>,
        introns: &BTreeSet<Interval>,
        strand: Strand,
    ) -> Self {
        let all_exons: BTreeSet<Exon> = tss_exons
            .iter()
            .chain(internal_exons)
            .chain(tes_exons)
            .copied()
            .collect();

        let mut graph = DiGraphMap::with_capacity(all_exons.len(), introns.len());
        for &exon in &all_exons {
            graph.add_node(exon);
        }
        for edge in find_jn_connected_exons(&all_exons, introns, strand) {
            graph.add_edge(edge.from, edge.to, edge.intron);
        }

        assert!(
            !is_cyclic_directed(&graph),
            "splice graph contains a cycle ({} exons, {} junctions)",
            graph.node_count(),
            graph.edge_count()
        );

        Self {
            graph,
            tss_exons: tss_exons.clone(),
            tes_exons: tes_exons.clone(),
        }
    }

    #[must_use]
    pub fn from_elements(elements: &GeneElements) -> Self {
        Self::build(
            &elements.tss_exons,
            &elements.internal_exons,
            &elements.tes_exons,
            &elements.introns,
            elements.strand,
        )
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn successors(&self, exon: Exon) -> impl Iterator<Item = Exon> + '_ {
        self.graph.neighbors(exon)
    }

    #[must_use]
    pub fn is_tes(&self, exon: &Exon) -> bool {
        self.tes_exons.contains(exon)
    }

    /// Every TSS→TES path, each yielded exactly once, in traversal order.
    #[must_use]
    pub fn iter_transcripts(&self) -> TranscriptPaths<'_> {
        TranscriptPaths {
            graph: self,
            stack: self.tss_exons.iter().map(|&e| vec![e]).collect(),
            ready: Vec::new(),
        }
    }

    /// Length-capped fragments; see [`TranscriptFragments`].
    #[must_use]
    pub fn iter_fragments(&self, max_length: u64) -> TranscriptFragments<'_> {
        TranscriptFragments {
            graph: self,
            max_length,
            stack: self.tss_exons.iter().map(|&e| vec![e]).collect(),
            ready: Vec::new(),
            next_wave: BTreeSet::new(),
            seeded: self.tss_exons.clone(),
        }
    }
}

/// Depth-first enumeration of complete transcripts.
///
/// A path stops at the first TES exon it reaches, even if that exon has
/// further successors.
pub struct TranscriptPaths<'a> {
    graph: &'a SpliceGraph,
    stack: Vec<Vec<Exon>>,
    ready: Vec<Vec<Exon>>,
}

impl Iterator for TranscriptPaths<'_> {
    type Item = Vec<Exon>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(path) = self.ready.pop() {
                return Some(path);
            }
            let path = self.stack.pop()?;
            let last = *path.last()?;
            for child in self.graph.successors(last) {
                let mut extended = Vec::with_capacity(path.len() + 1);
                extended.extend_from_slice(&path);
                extended.push(child);
                if self.graph.is_tes(&child) {
                    self.ready.push(extended);
                } else {
                    self.stack.push(extended);
                }
            }
        }
    }
}

/// Wave-based enumeration of length-capped transcript fragments.
///
/// Within a wave, traversal is the same as [`TranscriptPaths`], except that a
/// path whose total exon length exceeds the cap is yielded immediately and
/// its second exon is seeded as a start exon for the next wave. An exon is
/// seeded at most once per enumeration, and every seeded exon lies strictly
/// downstream of a previous start, so the waves terminate on any DAG.
pub struct TranscriptFragments<'a> {
    graph: &'a SpliceGraph,
    max_length: u64,
    stack: Vec<Vec<Exon>>,
    ready: Vec<Vec<Exon>>,
    next_wave: BTreeSet<Exon>,
    seeded: BTreeSet<Exon>,
}

impl Iterator for TranscriptFragments<'_> {
    type Item = Vec<Exon>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(path) = self.ready.pop() {
                return Some(path);
            }
            let Some(path) = self.stack.pop() else {
                if self.next_wave.is_empty() {
                    return None;
                }
                let wave = std::mem::take(&mut self.next_wave);
                self.stack = wave.into_iter().map(|e| vec![e]).collect();
                continue;
            };
            let last = *path.last()?;
            for child in self.graph.successors(last) {
                let mut extended = Vec::with_capacity(path.len() + 1);
                extended.extend_from_slice(&path);
                extended.push(child);
                if self.graph.is_tes(&child) {
                    self.ready.push(extended);
                } else if total_length(&extended) > self.max_length {
                    // at least two exons: the start and `child`
                    let restart = extended[1];
                    if self.seeded.insert(restart) {
                        self.next_wave.insert(restart);
                    }
                    self.ready.push(extended);
                } else {
                    self.stack.push(extended);
                }
            }
        }
    }
}

/// Enumerates every candidate exon chain for a gene, sorted by position.
///
/// Single-exon transcripts come first, one per element, without touching
/// the graph.
///
/// # Errors
///
/// Returns [`Error::TooManyCandidates`] as soon as the running count exceeds
/// `max_candidates`; no partial list is returned.
pub fn enumerate_candidates(
    elements: &GeneElements,
    mode: EnumerationMode,
    max_candidates: usize,
) -> Result<Vec<Vec<Exon>>, Error> {
    let graph = SpliceGraph::from_elements(elements);
    let mut transcripts: Vec<Vec<Exon>> =
        elements.se_transcripts.iter().map(|&e| vec![e]).collect();
    check_ceiling(transcripts.len(), max_candidates)?;

    let paths: Box<dyn Iterator<Item = Vec<Exon>> + '_> = match mode {
        EnumerationMode::Exhaustive => Box::new(graph.iter_transcripts()),
        EnumerationMode::Fragments { max_length } => Box::new(graph.iter_fragments(max_length)),
    };
    for mut path in paths {
        path.sort_unstable();
        transcripts.push(path);
        check_ceiling(transcripts.len(), max_candidates)?;
    }
    Ok(transcripts)
}

fn check_ceiling(count: usize, limit: usize) -> Result<(), Error> {
    if count > limit {
        return Err(Error::TooManyCandidates { count, limit });
    }
    Ok(())
}
