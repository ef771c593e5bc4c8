//! Gene assembly: enumerated exon chains become transcripts with promoter,
//! poly-A, coding and reference annotations.

use crate::config::BuildConfig;
use crate::elements::GeneElements;
use crate::error::Error;
use crate::interval::Interval;
use crate::orf::CodingRegionFinder;
use crate::reference::ReferenceIndex;
use crate::splice_graph::{EnumerationMode, enumerate_candidates};
use crate::strand::Strand;

use super::types::{Gene, Transcript};

/// Builds [`Gene`] records from element bundles.
///
/// Holds the enumeration settings and the optional collaborators; one
/// assembler is shared by every worker of a run.
#[derive(Clone, Copy)]
pub struct GeneAssembler<'a> {
    mode: EnumerationMode,
    max_candidates: usize,
    coding_finder: Option<&'a dyn CodingRegionFinder>,
    reference: Option<&'a ReferenceIndex>,
}

impl<'a> GeneAssembler<'a> {
    #[must_use]
    pub fn new(config: &BuildConfig) -> Self {
        Self {
            mode: EnumerationMode::from_max_fragment_length(config.max_fragment_length),
            max_candidates: config.max_candidate_transcripts,
            coding_finder: None,
            reference: None,
        }
    }

    #[must_use]
    pub fn with_coding_finder(mut self, finder: &'a dyn CodingRegionFinder) -> Self {
        self.coding_finder = Some(finder);
        self
    }

    #[must_use]
    pub fn with_reference(mut self, reference: &'a ReferenceIndex) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Assemble one locus. `Ok(None)` means the locus produced no transcripts.
    ///
    /// # Errors
    ///
    /// [`Error::TooManyCandidates`] when enumeration exceeds the ceiling, or
    /// any error raised by the coding-region finder.
    pub fn build_gene(&self, elements: &GeneElements) -> Result<Option<Gene>, Error> {
        let chains = enumerate_candidates(elements, self.mode, self.max_candidates)?;
        if chains.is_empty() {
            return Ok(None);
        }

        let transcripts: Vec<Transcript> = chains
            .into_iter()
            .enumerate()
            .map(|(i, exons)| {
                let mut transcript = Transcript::new(
                    format!("{}_{i}", elements.id),
                    &elements.id,
                    &elements.contig,
                    elements.strand,
                    exons,
                );
                transcript.promoter = find_matching_promoter(&transcript, &elements.promoters);
                transcript.polya_region = find_matching_polya(&transcript, &elements.polyas);
                transcript
            })
            .collect();

        let (start, stop) = gene_bounds(elements);
        let mut gene = Gene {
            id: elements.id.clone(),
            name: None,
            contig: elements.contig.clone(),
            strand: elements.strand,
            start,
            stop,
            transcripts,
        };

        if let Some(finder) = self.coding_finder {
            finder.find_coding_regions(&mut gene)?;
        }
        if let Some(reference) = self.reference {
            reference.rename_transcripts(&mut gene);
        }
        Ok(Some(gene))
    }
}

/// Min/max over TSS, TES and single-exon-transcript coordinates.
fn gene_bounds(elements: &GeneElements) -> (i32, i32) {
    elements
        .tss_exons
        .iter()
        .chain(&elements.tes_exons)
        .chain(&elements.se_transcripts)
        .fold((i32::MAX, i32::MIN), |(lo, hi), e| {
            (lo.min(e.start), hi.max(e.stop))
        })
}

/// The promoter whose proximal boundary coincides with the transcript's first
/// exon, truncated so it does not extend past that exon.
///
/// Promoters are visited in position order; the last match wins.
#[must_use]
pub fn find_matching_promoter<'p, I>(transcript: &Transcript, promoters: I) -> Option<Interval>
where
    I: IntoIterator<Item = &'p Interval>,
{
    let tss_exon = transcript.tss_exon()?;
    let mut matching = None;
    for promoter in promoters {
        match transcript.strand {
            Strand::Forward if promoter.start == tss_exon.start => {
                matching = Some(Interval::new(
                    promoter.start,
                    promoter.stop.min(tss_exon.stop),
                ));
            }
            Strand::Reverse if promoter.stop == tss_exon.stop => {
                matching = Some(Interval::new(
                    promoter.start.max(tss_exon.start),
                    promoter.stop,
                ));
            }
            _ => {}
        }
    }
    matching
}

/// The poly-A region ending where the transcript's last exon ends, truncated
/// to that exon.
#[must_use]
pub fn find_matching_polya<'p, I>(transcript: &Transcript, polyas: I) -> Option<Interval>
where
    I: IntoIterator<Item = &'p Interval>,
{
    let tes_exon = transcript.tes_exon()?;
    let mut matching = None;
    for polya in polyas {
        match transcript.strand {
            Strand::Forward if polya.stop == tes_exon.stop => {
                matching = Some(Interval::new(polya.start.max(tes_exon.start), polya.stop));
            }
            Strand::Reverse if polya.start == tes_exon.start => {
                matching = Some(Interval::new(polya.start, polya.stop.min(tes_exon.stop)));
            }
            _ => {}
        }
    }
    matching
}
