//! Coding-region annotation from the longest open reading frame.

use log::debug;

use crate::codon::{CodonTable, reverse_complement};
use crate::error::Error;
use crate::fasta::SequenceSource;
use crate::interval::Exon;
use crate::strand::Strand;
use crate::transcript::{CodingRegion, Gene, Transcript};

/// Annotates the transcripts of an assembled gene with coding regions.
pub trait CodingRegionFinder: Send + Sync {
    fn find_coding_regions(&self, gene: &mut Gene) -> Result<(), Error>;
}

/// Marks the longest ATG-initiated ORF of each transcript as its CDS.
pub struct LongestOrfFinder<S> {
    source: S,
    table: CodonTable,
    min_orf_aas: usize,
}

impl<S: SequenceSource> LongestOrfFinder<S> {
    pub fn new(source: S, min_orf_aas: usize) -> Self {
        Self {
            source,
            table: CodonTable::standard(),
            min_orf_aas,
        }
    }

    /// Spliced sequence of a transcript in transcription order.
    fn mrna(&self, transcript: &Transcript) -> Result<Vec<u8>, Error> {
        let mut seq = Vec::with_capacity(transcript.length() as usize);
        for exon in &transcript.exons {
            seq.extend(self.source.fetch(&transcript.contig, exon.start, exon.stop)?);
        }
        if transcript.strand.is_reverse() {
            seq = reverse_complement(&seq);
        }
        Ok(seq)
    }

    fn coding_region(&self, transcript: &Transcript) -> Result<Option<CodingRegion>, Error> {
        let mrna = self.mrna(transcript)?;
        let Some((first, last)) = longest_orf(&mrna, &self.table, self.min_orf_aas) else {
            return Ok(None);
        };
        let a = mrna_to_genomic(&transcript.exons, transcript.strand, first);
        let b = mrna_to_genomic(&transcript.exons, transcript.strand, last);
        Ok(a.zip(b).map(|(a, b)| CodingRegion {
            start: a.min(b),
            stop: a.max(b),
        }))
    }
}

impl<S: SequenceSource> CodingRegionFinder for LongestOrfFinder<S> {
    fn find_coding_regions(&self, gene: &mut Gene) -> Result<(), Error> {
        let mut coding = 0usize;
        for transcript in &mut gene.transcripts {
            transcript.coding_region = self.coding_region(transcript)?;
            coding += usize::from(transcript.coding_region.is_some());
        }
        debug!(
            "{}: {coding}/{} transcripts have an ORF of at least {} codons",
            gene.id,
            gene.transcripts.len(),
            self.min_orf_aas
        );
        Ok(())
    }
}

/// Closed mRNA range of the longest ORF, stop codon included.
///
/// An ORF opens at the first ATG after the previous stop in its frame. It must
/// have at least `min_aas` codons before the stop; ties keep the earlier frame.
#[must_use]
pub fn longest_orf(mrna: &[u8], table: &CodonTable, min_aas: usize) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize)> = None;
    for frame in 0..3 {
        let mut open: Option<usize> = None;
        let mut pos = frame;
        while pos + 3 <= mrna.len() {
            let codon = &mrna[pos..pos + 3];
            match open {
                None if CodonTable::is_start(codon) => open = Some(pos),
                Some(start) if table.is_stop(codon) => {
                    let aas = (pos - start) / 3;
                    let longer = best.is_none_or(|(s, e)| pos + 2 - start > e - s);
                    if aas >= min_aas && longer {
                        best = Some((start, pos + 2));
                    }
                    open = None;
                }
                _ => {}
            }
            pos += 3;
        }
    }
    best
}

/// Genomic coordinate of an mRNA offset, walking exons in transcription order.
#[must_use]
pub fn mrna_to_genomic(exons: &[Exon], strand: Strand, offset: usize) -> Option<i32> {
    let mut remaining = offset as u64;
    let mut visit = |exon: &Exon| {
        let len = exon.len();
        if remaining < len {
            let delta = remaining as i32;
            Some(match strand {
                Strand::Forward => exon.start + delta,
                Strand::Reverse => exon.stop - delta,
            })
        } else {
            remaining -= len;
            None
        }
    };
    match strand {
        Strand::Forward => exons.iter().find_map(&mut visit),
        Strand::Reverse => exons.iter().rev().find_map(&mut visit),
    }
}
