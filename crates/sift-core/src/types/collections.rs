//! Hash collections used throughout Sift.

pub use rustc_hash::{FxHashMap, FxHashSet};
