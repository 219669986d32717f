pub mod merger;

pub use merger::AggregationMerger;
