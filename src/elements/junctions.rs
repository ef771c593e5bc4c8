//! Resolution of junctions (introns) to the exon pairs they connect.

use std::collections::HashMap;

use crate::interval::{Exon, Interval};
use crate::strand::Strand;

/// A junction together with the exons it splices, in transcription order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JunctionEdge {
    pub intron: Interval,
    pub from: Exon,
    pub to: Exon,
}

/// Pairs every intron with each exon ending one base before it and each exon
/// starting one base after it.
///
/// Edges follow transcription direction: upstream→downstream on the forward
/// strand and downstream→upstream on the reverse strand, so walking the graph
/// always goes from TSS exons towards TES exons.
#[must_use]
pub fn find_jn_connected_exons<'a, I, J>(exons: I, introns: J, strand: Strand) -> Vec<JunctionEdge>
where
    I: IntoIterator<Item = &'a Exon>,
    J: IntoIterator<Item = &'a Interval>,
{
    let mut by_stop: HashMap<i32, Vec<Exon>> = HashMap::new();
    let mut by_start: HashMap<i32, Vec<Exon>> = HashMap::new();
    for exon in exons {
        by_stop.entry(exon.stop).or_default().push(*exon);
        by_start.entry(exon.start).or_default().push(*exon);
    }

    let mut edges = Vec::new();
    for intron in introns {
        let (Some(upstream), Some(downstream)) = (
            by_stop.get(&(intron.start - 1)),
            by_start.get(&(intron.stop + 1)),
        ) else {
            continue;
        };
        for &left in upstream {
            for &right in downstream {
                let (from, to) = if strand.is_reverse() {
                    (right, left)
                } else {
                    (left, right)
                };
                edges.push(JunctionEdge {
                    intron: *intron,
                    from,
                    to,
                });
            }
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_edges_run_downstream() {
        let exons = [Interval::new(100, 150), Interval::new(300, 350)];
        let introns = [Interval::new(151, 299)];
        let edges = find_jn_connected_exons(&exons, &introns, Strand::Forward);
        assert_eq!(
            edges,
            vec![JunctionEdge {
                intron: introns[0],
                from: exons[0],
                to: exons[1],
            }]
        );
    }

    #[test]
    fn reverse_edges_run_upstream() {
        let exons = [Interval::new(100, 150), Interval::new(300, 350)];
        let introns = [Interval::new(151, 299)];
        let edges = find_jn_connected_exons(&exons, &introns, Strand::Reverse);
        assert_eq!(edges[0].from, exons[1]);
        assert_eq!(edges[0].to, exons[0]);
    }

    #[test]
    fn shared_boundaries_fan_out() {
        // two donors ending at 150, two acceptors starting at 300
        let exons = [
            Interval::new(100, 150),
            Interval::new(120, 150),
            Interval::new(300, 350),
            Interval::new(300, 360),
        ];
        let introns = [Interval::new(151, 299)];
        let edges = find_jn_connected_exons(&exons, &introns, Strand::Forward);
        assert_eq!(edges.len(), 4);
    }

    #[test]
    fn unmatched_intron_ignored() {
        let exons = [Interval::new(100, 150), Interval::new(300, 350)];
        let introns = [Interval::new(152, 299)];
        assert!(find_jn_connected_exons(&exons, &introns, Strand::Forward).is_empty());
    }
}
