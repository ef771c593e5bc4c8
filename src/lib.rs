//! Trellis: splice-graph transcript assembly from clustered gene elements.

pub mod error;

pub mod cli;
pub mod codon;
pub mod config;
pub mod contig;
pub mod elements;
pub mod fasta;
pub mod interval;
pub mod orf;
pub mod output;
pub mod perf;
pub mod pipeline;
pub mod reference;
pub mod splice_graph;
pub mod strand;
pub mod transcript;
