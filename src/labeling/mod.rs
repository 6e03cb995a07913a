//! Connected-component labeling and per-component statistics.
//!
//! The labeler performs the classic two-scan 8-connectivity algorithm with an
//! equivalence table resolved by union-find. The label domain is capped at
//! 255 provisional labels; a scan that would exceed the cap aborts the whole
//! extraction (the caller reports `ok = false`). After the scan, equivalence
//! classes are collapsed and the map is rewritten with dense ids `1..=K`.
//!
//! The collector then walks the dense map once, accumulating bounding box,
//! centroid sums, and area per component, and applies the relative-size
//! filters that discard debris next to real fingerprints.

mod collector;
mod labeler;

pub use collector::{collect_components, filter_components, ComponentStats};
pub use labeler::{label_components, LabelOutcome, MAX_LABELS};
