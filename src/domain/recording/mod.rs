//! Recording domain: durations and encoded clips

pub mod clip;
pub mod duration;

pub use clip::{AudioClip, CLIP_FILE_NAME, CLIP_MIME};
pub use duration::Duration;
