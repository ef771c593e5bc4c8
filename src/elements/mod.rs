//! Clustered genomic elements and their partitioning into gene loci.

pub mod junctions;
pub mod loader;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::interval::{Exon, Interval};
use crate::strand::Strand;

pub use junctions::find_jn_connected_exons;
pub use loader::{GroupedElements, load_elements, load_elements_path};

/// Category of a clustered element, taken from the BED `name` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementCategory {
    Gene,
    TssExon,
    InternalExon,
    TesExon,
    SingleExonGene,
    Promoter,
    Polya,
    Intron,
}

impl ElementCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gene => "gene",
            Self::TssExon => "tss_exon",
            Self::InternalExon => "internal_exon",
            Self::TesExon => "tes_exon",
            Self::SingleExonGene => "single_exon_gene",
            Self::Promoter => "promoter",
            Self::Polya => "polya",
            Self::Intron => "intron",
        }
    }
}

impl FromStr for ElementCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gene" => Ok(Self::Gene),
            "tss_exon" => Ok(Self::TssExon),
            "internal_exon" => Ok(Self::InternalExon),
            "tes_exon" => Ok(Self::TesExon),
            "single_exon_gene" => Ok(Self::SingleExonGene),
            "promoter" => Ok(Self::Promoter),
            "polya" => Ok(Self::Polya),
            "intron" => Ok(Self::Intron),
            _ => Err(Error::Parse(format!("unknown element category: '{s}'"))),
        }
    }
}

impl fmt::Display for ElementCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All elements of one contig/strand, bucketed by category.
#[derive(Debug, Clone, Default)]
pub struct ElementGroup {
    by_category: BTreeMap<ElementCategory, Vec<Interval>>,
}

impl ElementGroup {
    pub fn push(&mut self, category: ElementCategory, interval: Interval) {
        self.by_category.entry(category).or_default().push(interval);
    }

    #[must_use]
    pub fn get(&self, category: ElementCategory) -> &[Interval] {
        self.by_category.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Sort every category by position so loci can be sliced by range.
    pub fn sort(&mut self) {
        for intervals in self.by_category.values_mut() {
            intervals.sort_unstable();
        }
    }

    #[must_use]
    pub fn num_genes(&self) -> usize {
        self.get(ElementCategory::Gene).len()
    }

    /// Yields, for every `gene` interval, the elements it fully contains.
    /// Requires [`ElementGroup::sort`] to have been called.
    pub fn iter_loci(&self) -> impl Iterator<Item = LocusElements> + '_ {
        self.get(ElementCategory::Gene)
            .iter()
            .map(move |gene| LocusElements {
                tss_exons: self.contained(ElementCategory::TssExon, gene),
                internal_exons: self.contained(ElementCategory::InternalExon, gene),
                tes_exons: self.contained(ElementCategory::TesExon, gene),
                se_transcripts: self.contained(ElementCategory::SingleExonGene, gene),
                promoters: self.contained(ElementCategory::Promoter, gene),
                polyas: self.contained(ElementCategory::Polya, gene),
                introns: self.contained(ElementCategory::Intron, gene),
            })
    }

    fn contained(&self, category: ElementCategory, gene: &Interval) -> BTreeSet<Interval> {
        let intervals = self.get(category);
        let first = intervals.partition_point(|i| i.start < gene.start);
        intervals[first..]
            .iter()
            .take_while(|i| i.start <= gene.stop)
            .filter(|i| i.stop <= gene.stop)
            .copied()
            .collect()
    }
}

/// Elements of one gene locus before a gene id has been minted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocusElements {
    pub tss_exons: BTreeSet<Exon>,
    pub internal_exons: BTreeSet<Exon>,
    pub tes_exons: BTreeSet<Exon>,
    pub se_transcripts: BTreeSet<Exon>,
    pub promoters: BTreeSet<Interval>,
    pub polyas: BTreeSet<Interval>,
    pub introns: BTreeSet<Interval>,
}

impl LocusElements {
    /// A locus can only produce transcripts with single-exon transcripts or
    /// with both start and end exons.
    #[must_use]
    pub fn is_assemblable(&self) -> bool {
        !self.se_transcripts.is_empty()
            || (!self.tss_exons.is_empty() && !self.tes_exons.is_empty())
    }

    #[must_use]
    pub fn into_gene_elements(self, id: String, contig: &str, strand: Strand) -> GeneElements {
        GeneElements {
            id,
            contig: contig.to_string(),
            strand,
            tss_exons: self.tss_exons,
            internal_exons: self.internal_exons,
            tes_exons: self.tes_exons,
            se_transcripts: self.se_transcripts,
            promoters: self.promoters,
            polyas: self.polyas,
            introns: self.introns,
        }
    }
}

/// Immutable bundle describing one candidate gene locus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneElements {
    pub id: String,
    pub contig: String,
    pub strand: Strand,
    pub tss_exons: BTreeSet<Exon>,
    pub internal_exons: BTreeSet<Exon>,
    pub tes_exons: BTreeSet<Exon>,
    pub se_transcripts: BTreeSet<Exon>,
    pub promoters: BTreeSet<Interval>,
    pub polyas: BTreeSet<Interval>,
    pub introns: BTreeSet<Interval>,
}

impl GeneElements {
    /// Span used in log messages: boundary exons plus promoter and poly-A regions.
    #[must_use]
    pub fn log_span(&self) -> Option<Interval> {
        let all = self
            .tss_exons
            .iter()
            .chain(&self.tes_exons)
            .chain(&self.se_transcripts)
            .chain(&self.promoters)
            .chain(&self.polyas);
        let (mut start, mut stop) = (i32::MAX, i32::MIN);
        for i in all {
            start = start.min(i.start);
            stop = stop.max(i.stop);
        }
        (start <= stop).then_some(Interval::new(start, stop))
    }

    /// `id(contig:strand:start-stop)` for log lines.
    #[must_use]
    pub fn describe(&self) -> String {
        match self.log_span() {
            Some(span) => format!(
                "{}({}:{}:{}-{})",
                self.id, self.contig, self.strand, span.start, span.stop
            ),
            None => format!("{}({}:{})", self.id, self.contig, self.strand),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group() -> ElementGroup {
        let mut g = ElementGroup::default();
        g.push(ElementCategory::Gene, Interval::new(100, 600));
        g.push(ElementCategory::Gene, Interval::new(1000, 1500));
        g.push(ElementCategory::TssExon, Interval::new(100, 150));
        g.push(ElementCategory::TesExon, Interval::new(500, 550));
        g.push(ElementCategory::Intron, Interval::new(151, 499));
        // straddles both loci: belongs to neither
        g.push(ElementCategory::InternalExon, Interval::new(550, 1100));
        g.push(ElementCategory::SingleExonGene, Interval::new(1200, 1400));
        g.push(ElementCategory::Promoter, Interval::new(1200, 1230));
        g.sort();
        g
    }

    #[test]
    fn parse_categories() {
        for name in [
            "gene",
            "tss_exon",
            "internal_exon",
            "tes_exon",
            "single_exon_gene",
            "promoter",
            "polya",
            "intron",
        ] {
            let category: ElementCategory = name.parse().unwrap();
            assert_eq!(category.as_str(), name);
        }
        assert!("exon".parse::<ElementCategory>().is_err());
    }

    #[test]
    fn loci_take_contained_elements_only() {
        let g = group();
        let loci: Vec<LocusElements> = g.iter_loci().collect();
        assert_eq!(loci.len(), 2);

        assert_eq!(loci[0].tss_exons.len(), 1);
        assert_eq!(loci[0].tes_exons.len(), 1);
        assert_eq!(loci[0].introns.len(), 1);
        assert!(loci[0].internal_exons.is_empty());
        assert!(loci[0].is_assemblable());

        assert!(loci[1].internal_exons.is_empty());
        assert_eq!(loci[1].se_transcripts.len(), 1);
        assert_eq!(loci[1].promoters.len(), 1);
        assert!(loci[1].is_assemblable());
    }

    #[test]
    fn locus_without_ends_is_not_assemblable() {
        let locus = LocusElements {
            tss_exons: [Interval::new(1, 10)].into(),
            ..Default::default()
        };
        assert!(!locus.is_assemblable());
    }

    #[test]
    fn describe_uses_element_span() {
        let elements = LocusElements {
            tss_exons: [Interval::new(100, 150)].into(),
            tes_exons: [Interval::new(500, 550)].into(),
            promoters: [Interval::new(90, 120)].into(),
            ..Default::default()
        }
        .into_gene_elements("XLOC_3".to_string(), "chr2", Strand::Reverse);
        assert_eq!(elements.describe(), "XLOC_3(chr2:-:90-550)");
    }
}
