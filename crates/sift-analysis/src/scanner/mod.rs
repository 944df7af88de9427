//! File discovery: language detection and the parallel directory walker.

pub mod language_detect;
pub mod walker;

pub use language_detect::Language;
pub use walker::{walk_directory, DiscoveredFile, DEFAULT_IGNORES};
