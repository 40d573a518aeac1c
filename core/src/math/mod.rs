pub mod stats;

pub use stats::NondarkStats;
