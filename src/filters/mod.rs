//! Grayscale filter passes feeding the labeler.
//!
//! All three passes read one flat `W·H` byte slice and write another; the
//! segmenter's workspace supplies the double buffering so no pass ever reads
//! a neighborhood it is concurrently overwriting.
//!
//! Border conventions differ on purpose:
//! - the min filter clips its window to the valid domain (morphological
//!   erosion over whatever pixels exist);
//! - the denoiser reads out-of-image neighbors as 255, modeling the white
//!   page surrounding a scanned card.

mod binarize;
mod denoise;
mod minimum;

pub use binarize::{binarize, histogram, otsu_level};
pub use denoise::denoise_step;
pub use minimum::min_filter;
