pub mod construction;
pub mod types;

pub use construction::{GeneAssembler, find_matching_polya, find_matching_promoter};
pub use types::{CodingRegion, Gene, Transcript};
