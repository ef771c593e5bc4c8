//! Reference annotation index and class-code assignment for assembled transcripts.

pub mod gtf;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use log::info;

use crate::error::Error;
use crate::interval::{Interval, introns_between};
use crate::strand::Strand;
use crate::transcript::Gene;

use gtf::ParsedLine;

/// Score of the initial "no match" candidate; any overlapping reference beats it.
const NO_MATCH_DISTANCE: i64 = -1_000_000_000;

/// A reference transcript with its intron set precomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefTranscript {
    pub id: String,
    pub gene_id: String,
    pub gene_name: Option<String>,
    pub exons: Vec<Interval>,
    pub introns: BTreeSet<Interval>,
}

impl RefTranscript {
    #[must_use]
    pub fn start(&self) -> i32 {
        self.exons.first().map_or(0, |e| e.start)
    }

    #[must_use]
    pub fn stop(&self) -> i32 {
        self.exons.last().map_or(0, |e| e.stop)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefGene {
    pub id: String,
    pub start: i32,
    pub stop: i32,
    pub transcripts: Vec<RefTranscript>,
}

/// Reference genes grouped by `(contig, strand)` and sorted by start.
#[derive(Debug, Default)]
pub struct ReferenceIndex {
    genes: HashMap<(String, Strand), Vec<RefGene>>,
}

type TranscriptKey = (String, Strand, String, String);

impl ReferenceIndex {
    /// Load a plain or gzip-compressed (`.gz`) GTF file.
    pub fn from_path(path: &Path) -> Result<Self, Error> {
        let file = File::open(path)?;
        let index = if path.extension().is_some_and(|ext| ext == "gz") {
            Self::from_gtf(BufReader::new(MultiGzDecoder::new(file)))?
        } else {
            Self::from_gtf(BufReader::new(file))?
        };
        info!(
            "Loaded {} reference genes from {}",
            index.num_genes(),
            path.display()
        );
        Ok(index)
    }

    /// Build the index from the `exon` lines of a GTF stream.
    pub fn from_gtf<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut transcripts: BTreeMap<TranscriptKey, (Option<String>, Vec<Interval>)> =
            BTreeMap::new();

        for (line_num, line) in reader.lines().enumerate() {
            let line_num = line_num + 1;
            let line = line?;
            let parsed = gtf::parse_line(&line)
                .map_err(|e| Error::Parse(format!("{e} (line {line_num}: {line})")))?;
            let ParsedLine::Exon(exon) = parsed else {
                continue;
            };
            let exon = *exon;
            let entry = transcripts
                .entry((exon.contig, exon.strand, exon.gene_id, exon.transcript_id))
                .or_default();
            if entry.0.is_none() {
                entry.0 = exon.gene_name;
            }
            entry.1.push(exon.interval);
        }

        let mut by_gene: BTreeMap<(String, Strand, String), Vec<RefTranscript>> = BTreeMap::new();
        for ((contig, strand, gene_id, transcript_id), (gene_name, mut exons)) in transcripts {
            exons.sort_unstable();
            exons.dedup();
            let introns = introns_between(&exons).into_iter().collect();
            by_gene
                .entry((contig, strand, gene_id.clone()))
                .or_default()
                .push(RefTranscript {
                    id: transcript_id,
                    gene_id,
                    gene_name,
                    exons,
                    introns,
                });
        }

        let mut genes: HashMap<(String, Strand), Vec<RefGene>> = HashMap::new();
        for ((contig, strand, gene_id), transcripts) in by_gene {
            let start = transcripts.iter().map(RefTranscript::start).min().unwrap_or(0);
            let stop = transcripts.iter().map(RefTranscript::stop).max().unwrap_or(0);
            genes.entry((contig, strand)).or_default().push(RefGene {
                id: gene_id,
                start,
                stop,
                transcripts,
            });
        }
        for group in genes.values_mut() {
            group.sort_by_key(|g| (g.start, g.stop));
        }
        Ok(Self { genes })
    }

    #[must_use]
    pub fn num_genes(&self) -> usize {
        self.genes.values().map(Vec::len).sum()
    }

    /// Reference genes on `contig`/`strand` whose span intersects `[start, stop]`.
    #[must_use]
    pub fn overlapping(&self, contig: &str, strand: Strand, start: i32, stop: i32) -> Vec<&RefGene> {
        let Some(group) = self.genes.get(&(contig.to_string(), strand)) else {
            return Vec::new();
        };
        let end = group.partition_point(|g| g.start <= stop);
        group[..end].iter().filter(|g| g.stop >= start).collect()
    }

    /// Attach the best-matching reference transcript and a class code to every
    /// transcript of `gene`, then name the gene after the matched reference genes.
    ///
    /// Matches are ranked by shared introns, then by the summed distance of the
    /// transcript ends.
    pub fn rename_transcripts(&self, gene: &mut Gene) {
        let candidates = self.overlapping(&gene.contig, gene.strand, gene.start, gene.stop);
        if candidates.is_empty() {
            return;
        }

        for t in &mut gene.transcripts {
            let introns: BTreeSet<Interval> = t.introns().into_iter().collect();
            let mut best: Option<&RefTranscript> = None;
            let mut best_score = (0usize, NO_MATCH_DISTANCE);
            for ref_t in candidates.iter().flat_map(|g| &g.transcripts) {
                let shared = introns.intersection(&ref_t.introns).count();
                let distance = i64::from((ref_t.start() - t.start()).abs())
                    + i64::from((ref_t.stop() - t.stop()).abs());
                let score = (shared, -distance);
                if score > best_score {
                    best_score = score;
                    best = Some(ref_t);
                }
            }
            let Some(best) = best else {
                continue;
            };

            let shared = best_score.0;
            t.class_code = Some(if introns.len() == best.introns.len() && introns.len() == shared {
                '='
            } else if introns.len() == shared && best.introns.len() > shared {
                'c'
            } else if shared > 0 {
                'j'
            } else {
                'o'
            });
            t.ref_gene = Some(best.gene_id.clone());
            t.ref_trans = Some(best.id.clone());
            t.gene_name = Some(best.gene_name.clone().unwrap_or_else(|| best.gene_id.clone()));
        }

        let names: BTreeSet<&str> = gene
            .transcripts
            .iter()
            .filter_map(|t| t.ref_gene.as_deref())
            .collect();
        if !names.is_empty() {
            gene.name = Some(names.into_iter().collect::<Vec<_>>().join("\\"));
        }
    }
}
