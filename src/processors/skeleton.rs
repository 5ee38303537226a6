//! Guo-Hall thinning of binary maps.
//!
//! Reduces every foreground blob of a thresholded heat map to a one pixel
//! wide, 8-connected skeleton while preserving its topology. Strokes of even
//! width running at 45 degrees and small square blobs keep at least one
//! pixel. Foreground is any non-zero pixel; the output uses 255 for skeleton
//! pixels.

use image::{GrayImage, Luma};

/// Thins a binary image with the Guo-Hall algorithm.
///
/// Pixels outside the image are treated as background.
pub fn thin(binary: &GrayImage) -> GrayImage {
    let (width, height) = binary.dimensions();
    let (w, h) = (width as usize, height as usize);
    let mut grid: Vec<bool> = binary.pixels().map(|p| p[0] > 0).collect();

    let mut marked: Vec<usize> = Vec::new();
    loop {
        let mut changed = false;
        for step in 0..2 {
            marked.clear();
            for y in 0..h {
                for x in 0..w {
                    if !grid[y * w + x] {
                        continue;
                    }
                    let n = neighbours(&grid, w, h, x, y);
                    if should_remove(&n, step) {
                        marked.push(y * w + x);
                    }
                }
            }
            if !marked.is_empty() {
                changed = true;
                for &idx in &marked {
                    grid[idx] = false;
                }
            }
        }
        if !changed {
            break;
        }
    }

    to_image(&grid, width, height)
}

/// Neighbours P2..P9 clockwise starting north.
fn neighbours(grid: &[bool], w: usize, h: usize, x: usize, y: usize) -> [bool; 8] {
    let at = |dx: isize, dy: isize| -> bool {
        let nx = x as isize + dx;
        let ny = y as isize + dy;
        if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
            return false;
        }
        grid[ny as usize * w + nx as usize]
    };
    [
        at(0, -1),
        at(1, -1),
        at(1, 0),
        at(1, 1),
        at(0, 1),
        at(-1, 1),
        at(-1, 0),
        at(-1, -1),
    ]
}

fn should_remove(n: &[bool; 8], step: usize) -> bool {
    let [p2, p3, p4, p5, p6, p7, p8, p9] = *n;
    let bit = |v: bool| v as u8;

    // 8-connectivity number, 1 for simple border pixels
    let connectivity = bit(!p2 && (p3 || p4))
        + bit(!p4 && (p5 || p6))
        + bit(!p6 && (p7 || p8))
        + bit(!p8 && (p9 || p2));
    if connectivity != 1 {
        return false;
    }

    let n1 = bit(p9 || p2) + bit(p3 || p4) + bit(p5 || p6) + bit(p7 || p8);
    let n2 = bit(p2 || p3) + bit(p4 || p5) + bit(p6 || p7) + bit(p8 || p9);
    if !(2..=3).contains(&n1.min(n2)) {
        return false;
    }

    let guard = if step == 0 {
        (p6 || p7 || !p9) && p8
    } else {
        (p2 || p3 || !p5) && p4
    };
    !guard
}

fn to_image(grid: &[bool], width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        if grid[(y * width + x) as usize] {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(width: u32, height: u32, x0: u32, x1: u32, y0: u32, y1: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            if (x0..x1).contains(&x) && (y0..y1).contains(&y) {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    /// 45 degree stroke, each row a run of `thickness` pixels shifted by one.
    fn diagonal(size: u32, thickness: u32) -> GrayImage {
        GrayImage::from_fn(size, size, |x, y| {
            if (5..size - 15).contains(&y) && (y..y + thickness).contains(&x) {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    fn count(image: &GrayImage) -> usize {
        image.pixels().filter(|p| p[0] > 0).count()
    }

    #[test]
    fn test_thick_bar_becomes_single_pixel_line() {
        let skeleton = thin(&bar(40, 20, 5, 35, 8, 13));
        for x in 10..30 {
            let column: u32 = (0..20).map(|y| (skeleton.get_pixel(x, y)[0] > 0) as u32).sum();
            assert_eq!(column, 1, "column {x} should hold exactly one skeleton pixel");
        }
    }

    #[test]
    fn test_thin_line_is_stable() {
        let line = bar(30, 10, 2, 28, 5, 6);
        let skeleton = thin(&line);
        assert!(count(&skeleton) >= 24);
    }

    #[test]
    fn test_empty_map_stays_empty() {
        let skeleton = thin(&GrayImage::new(16, 16));
        assert_eq!(count(&skeleton), 0);
    }

    #[test]
    fn test_even_width_diagonals_survive() {
        // 60 rows of stroke
        for thickness in [1, 2, 3, 4] {
            let skeleton = thin(&diagonal(80, thickness));
            let kept = count(&skeleton);
            assert!(
                (58..=66).contains(&kept),
                "{thickness} px diagonal thinned to {kept} pixels"
            );
            for y in 10..65 {
                let row = (0..80).filter(|&x| skeleton.get_pixel(x, y)[0] > 0).count();
                assert!(row <= 2, "row {y} of {thickness} px diagonal keeps {row} pixels");
            }
        }
    }

    #[test]
    fn test_square_blob_keeps_one_pixel() {
        let skeleton = thin(&bar(6, 6, 2, 4, 2, 4));
        assert_eq!(count(&skeleton), 1);
    }
}
