//! Core filtering and normalization pipeline for fluorosequencing radiometry.
//!
//! The modules mirror the legacy radmat conversion flow while providing
//! explicit axis semantics, well-defined processing stages, and recoverable
//! per-trace filtering.

pub mod export;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod radmat;
pub mod telemetry;

pub use prelude::{PipelineConfig, ProcessingStage, StageInput, StageOutput};
