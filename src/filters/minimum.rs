/// Square-neighborhood minimum (grayscale erosion).
///
/// Each output pixel is the minimum of the `(2r+1)²` window around it,
/// clipped to the image bounds; out-of-range samples are skipped, not read
/// as white. Darkens and slightly dilates the inked regions so faint ridge
/// endings survive binarization.
pub fn min_filter(src: &[u8], dst: &mut [u8], width: usize, height: usize, radius: usize) {
    debug_assert_eq!(src.len(), width * height);
    debug_assert_eq!(dst.len(), width * height);
    for y in 0..height {
        let y0 = y.saturating_sub(radius);
        let y1 = (y + radius).min(height - 1);
        for x in 0..width {
            let x0 = x.saturating_sub(radius);
            let x1 = (x + radius).min(width - 1);
            let mut m = u8::MAX;
            for yy in y0..=y1 {
                let row = &src[yy * width..yy * width + width];
                for &v in &row[x0..=x1] {
                    if v < m {
                        m = v;
                    }
                }
            }
            dst[y * width + x] = m;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_filter_spreads_dark_pixel() {
        let mut src = vec![200u8; 25];
        src[2 * 5 + 2] = 10;
        let mut dst = vec![0u8; 25];
        min_filter(&src, &mut dst, 5, 5, 1);
        for y in 0..5 {
            for x in 0..5 {
                let expected = if (1..=3).contains(&x) && (1..=3).contains(&y) {
                    10
                } else {
                    200
                };
                assert_eq!(dst[y * 5 + x], expected, "at ({x}, {y})");
            }
        }
    }

    #[test]
    fn min_filter_clips_window_at_borders() {
        // A bright corner stays bright: nothing outside the image is sampled.
        let src = vec![90u8; 9];
        let mut dst = vec![0u8; 9];
        min_filter(&src, &mut dst, 3, 3, 1);
        assert!(dst.iter().all(|&v| v == 90));
    }

    #[test]
    fn min_filter_radius_covers_whole_image() {
        let mut src = vec![255u8; 16];
        src[5] = 7;
        let mut dst = vec![0u8; 16];
        min_filter(&src, &mut dst, 4, 4, 4);
        assert!(dst.iter().all(|&v| v == 7));
    }
}
