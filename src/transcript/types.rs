//! Assembled transcript and gene records.

use crate::interval::{Exon, Interval, introns_between, total_length};
use crate::strand::Strand;

/// Genomic extent of the coding sequence, stop codon included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodingRegion {
    pub start: i32,
    pub stop: i32,
}

/// A candidate transcript: a position-sorted, non-overlapping exon chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub id: String,
    pub gene_id: String,
    pub contig: String,
    pub strand: Strand,
    pub exons: Vec<Exon>,
    pub promoter: Option<Interval>,
    pub polya_region: Option<Interval>,
    pub coding_region: Option<CodingRegion>,
    /// Reference gene id of the best-matching reference transcript.
    pub ref_gene: Option<String>,
    pub ref_trans: Option<String>,
    pub class_code: Option<char>,
    pub gene_name: Option<String>,
}

impl Transcript {
    /// A bare transcript; `exons` must already be sorted by position.
    #[must_use]
    pub fn new(id: String, gene_id: &str, contig: &str, strand: Strand, exons: Vec<Exon>) -> Self {
        debug_assert!(exons.windows(2).all(|w| w[0] < w[1]));
        Self {
            id,
            gene_id: gene_id.to_string(),
            contig: contig.to_string(),
            strand,
            exons,
            promoter: None,
            polya_region: None,
            coding_region: None,
            ref_gene: None,
            ref_trans: None,
            class_code: None,
            gene_name: None,
        }
    }

    #[must_use]
    pub fn start(&self) -> i32 {
        self.exons.first().map_or(0, |e| e.start)
    }

    #[must_use]
    pub fn stop(&self) -> i32 {
        self.exons.last().map_or(0, |e| e.stop)
    }

    /// Spliced length in bases.
    #[must_use]
    pub fn length(&self) -> u64 {
        total_length(&self.exons)
    }

    #[must_use]
    pub fn introns(&self) -> Vec<Interval> {
        introns_between(&self.exons)
    }

    /// First exon in transcription order.
    #[must_use]
    pub fn tss_exon(&self) -> Option<Exon> {
        if self.strand.is_reverse() {
            self.exons.last().copied()
        } else {
            self.exons.first().copied()
        }
    }

    /// Last exon in transcription order.
    #[must_use]
    pub fn tes_exon(&self) -> Option<Exon> {
        if self.strand.is_reverse() {
            self.exons.first().copied()
        } else {
            self.exons.last().copied()
        }
    }
}

/// An assembled gene locus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gene {
    pub id: String,
    /// Display name; set from matched reference genes.
    pub name: Option<String>,
    pub contig: String,
    pub strand: Strand,
    pub start: i32,
    pub stop: i32,
    pub transcripts: Vec<Transcript>,
}
