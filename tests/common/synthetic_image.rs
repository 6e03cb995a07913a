/// Generates a uniform grayscale buffer.
pub fn uniform(width: usize, height: usize, value: u8) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    vec![value; width * height]
}

/// Paints a filled axis-aligned rectangle of ink (value 0) centered at
/// (cx, cy) onto a white page.
pub fn rectangle(
    width: usize,
    height: usize,
    cx: usize,
    cy: usize,
    rect_w: usize,
    rect_h: usize,
) -> Vec<u8> {
    let mut img = uniform(width, height, 255);
    let x0 = cx - rect_w / 2;
    let y0 = cy - rect_h / 2;
    for y in y0..y0 + rect_h {
        for x in x0..x0 + rect_w {
            img[y * width + x] = 0;
        }
    }
    img
}

/// Paints a filled rectangle whose long axis points along `axis_deg`
/// (degrees from the x axis), centered at (cx, cy).
pub fn oriented_rectangle(
    width: usize,
    height: usize,
    cx: f64,
    cy: f64,
    short: f64,
    long: f64,
    axis_deg: f64,
) -> Vec<u8> {
    let mut img = uniform(width, height, 255);
    let (sin, cos) = axis_deg.to_radians().sin_cos();
    for y in 0..height {
        for x in 0..width {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            let along = dx * cos + dy * sin;
            let across = -dx * sin + dy * cos;
            if along.abs() <= long / 2.0 && across.abs() <= short / 2.0 {
                img[y * width + x] = 0;
            }
        }
    }
    img
}

/// Paints a filled ink disk onto an existing buffer.
pub fn paint_disk(img: &mut [u8], width: usize, cx: f64, cy: f64, radius: f64) {
    let height = img.len() / width;
    for y in 0..height {
        for x in 0..width {
            let dx = x as f64 - cx;
            let dy = y as f64 - cy;
            if dx * dx + dy * dy <= radius * radius {
                img[y * width + x] = 0;
            }
        }
    }
}

/// Covers the page with disjoint ink blocks: `block` ink pixels followed by
/// `gap` white pixels, repeating along both axes.
pub fn block_grid(width: usize, height: usize, block: usize, gap: usize) -> Vec<u8> {
    let mut img = uniform(width, height, 255);
    let period = block + gap;
    for y in 0..height {
        for x in 0..width {
            if x % period < block && y % period < block {
                img[y * width + x] = 0;
            }
        }
    }
    img
}
