//! Folder listing: the track model and the filesystem lister.

mod model;
mod scan;

pub use model::*;
pub use scan::FsLister;

#[cfg(test)]
pub(crate) mod doubles;

#[cfg(test)]
mod tests;
