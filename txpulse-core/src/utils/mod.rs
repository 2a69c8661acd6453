pub mod pacing;
pub mod timestamp;
