//! Recording domain module

mod duration;

pub use duration::{Duration, DEFAULT_DURATION_SECS, DEFAULT_MAX_DURATION_SECS};
