pub mod layout;
pub mod npy;

pub use layout::{CycleSample, RadmatLayout, NUM_FEATURES};
pub use npy::load_radmat;
