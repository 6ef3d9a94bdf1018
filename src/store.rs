//! Persistence of the current folder, its cached track list and the resume point.

mod file;
mod record;

pub use file::PlaybackStore;
pub use record::ResumePoint;
