//! Audio capture adapters

mod cpal_recorder;
pub mod pcm;

pub use cpal_recorder::CpalRecorder;
