/// One smoothing iteration: each pixel becomes the average of its eight
/// neighbors, the center itself contributing nothing. Neighbors outside the
/// image read as 255 (white page border). The weighted sum is rounded up.
pub fn denoise_step(src: &[u8], dst: &mut [u8], width: usize, height: usize) {
    debug_assert_eq!(src.len(), width * height);
    debug_assert_eq!(dst.len(), width * height);
    for y in 0..height {
        for x in 0..width {
            let mut sum = 0u16;
            for dy in -1i32..=1 {
                for dx in -1i32..=1 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let nx = x as i32 + dx;
                    let ny = y as i32 + dy;
                    let v = if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                        u8::MAX
                    } else {
                        src[ny as usize * width + nx as usize]
                    };
                    sum += v as u16;
                }
            }
            // ceil(sum / 8); the sum of eight bytes fits u16 with room to spare
            dst[y * width + x] = ((sum + 7) / 8) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_average_ignores_center() {
        let mut src = vec![0u8; 9];
        src[4] = 255; // center value must not contribute to itself
        let mut dst = vec![0u8; 9];
        denoise_step(&src, &mut dst, 3, 3);
        // Center neighbors are the 8 zeros around it.
        assert_eq!(dst[4], 0);
    }

    #[test]
    fn border_neighbors_read_as_white() {
        let src = vec![0u8; 9];
        let mut dst = vec![0u8; 9];
        denoise_step(&src, &mut dst, 3, 3);
        // Corner: 5 outside neighbors at 255, 3 inside at 0 -> ceil(1275/8).
        assert_eq!(dst[0], 160);
        // Edge midpoint: 3 outside neighbors -> ceil(765/8).
        assert_eq!(dst[1], 96);
        // Interior pixel has no outside neighbors.
        assert_eq!(dst[4], 0);
    }

    #[test]
    fn rounding_is_ceiling() {
        // One neighbor at 1, the rest at 0: 1/8 rounds up to 1.
        let mut src = vec![0u8; 9];
        src[0] = 1;
        let mut dst = vec![0u8; 9];
        denoise_step(&src, &mut dst, 3, 3);
        assert_eq!(dst[4], 1);
    }

    #[test]
    fn all_white_is_a_fixed_point() {
        let src = vec![255u8; 16];
        let mut dst = vec![0u8; 16];
        denoise_step(&src, &mut dst, 4, 4);
        assert!(dst.iter().all(|&v| v == 255));
    }
}
