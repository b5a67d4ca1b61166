//! Music-folder scanning.
//!
//! `embed` and `clean` both operate on a flat folder of downloaded tracks
//! and their cover images; this module owns the enumeration and the
//! stem-based matching between the two.

pub mod scan;

pub use scan::{FolderScan, COVER_EXTENSIONS, IMAGE_EXTENSIONS};
