use std::collections::BTreeSet;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use trellis::elements::GeneElements;
use trellis::interval::Interval;
use trellis::splice_graph::{EnumerationMode, enumerate_candidates};
use trellis::strand::Strand;

/// `rungs` positions with two alternative exons each, every exon joined to
/// both exons of the next rung: 2^rungs start-to-end paths.
fn ladder(rungs: i32) -> GeneElements {
    let mut tss_exons = BTreeSet::new();
    let mut internal_exons = BTreeSet::new();
    let mut tes_exons = BTreeSet::new();
    let mut introns = BTreeSet::new();
    for rung in 0..rungs {
        let start = rung * 100;
        for stop in [start + 40, start + 50] {
            let exon = Interval::new(start, stop);
            if rung == 0 {
                tss_exons.insert(exon);
            } else if rung == rungs - 1 {
                tes_exons.insert(exon);
            } else {
                internal_exons.insert(exon);
            }
            if rung < rungs - 1 {
                introns.insert(Interval::new(stop + 1, start + 99));
            }
        }
    }
    GeneElements {
        id: "XLOC_0".to_string(),
        contig: "chr1".to_string(),
        strand: Strand::Forward,
        tss_exons,
        internal_exons,
        tes_exons,
        se_transcripts: BTreeSet::new(),
        promoters: BTreeSet::new(),
        polyas: BTreeSet::new(),
        introns,
    }
}

fn bench_exhaustive(c: &mut Criterion) {
    let mut group = c.benchmark_group("exhaustive");
    for rungs in [8, 12, 14] {
        let elements = ladder(rungs);
        group.bench_with_input(BenchmarkId::from_parameter(rungs), &elements, |b, e| {
            b.iter(|| {
                let paths = enumerate_candidates(e, EnumerationMode::Exhaustive, usize::MAX).unwrap();
                assert_eq!(paths.len(), 1 << rungs);
            });
        });
    }
    group.finish();
}

fn bench_fragments(c: &mut Criterion) {
    let elements = ladder(14);
    c.bench_function("fragments (14 rungs, 600 bp)", |b| {
        b.iter(|| {
            let mode = EnumerationMode::Fragments { max_length: 600 };
            let paths = enumerate_candidates(&elements, mode, usize::MAX).unwrap();
            assert!(!paths.is_empty());
        });
    });
}

criterion_group!(benches, bench_exhaustive, bench_fragments);
criterion_main!(benches);
