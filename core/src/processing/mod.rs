pub mod filter;
pub mod normalize;
pub mod reshape;

pub use filter::FilterStage;
pub use normalize::NormalizeStage;
pub use reshape::ReshapeStage;
