//! Polygon regions: bounding rectangle with one pixel of padding plus a filled mask.
//!
//! The padding ring stays `false` in the mask, so the destination pixels around
//! the polygon become the fixed boundary values of the Poisson system.

use crate::image::{InputError, Mask};

/// Integer pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Rect {
    /// Inclusive bounding box of non-negative points; `None` for an empty slice.
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut max_x, mut min_y, mut max_y) = (first.x, first.x, first.y, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            max_x = max_x.max(p.x);
            min_y = min_y.min(p.y);
            max_y = max_y.max(p.y);
        }
        if min_x < 0 || min_y < 0 {
            return None;
        }
        Some(Self {
            x: min_x as usize,
            y: min_y as usize,
            width: (max_x - min_x) as usize + 1,
            height: (max_y - min_y) as usize + 1,
        })
    }

    pub fn right(&self) -> usize {
        self.x + self.width
    }

    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    /// Grow by one pixel on each side that stays within `width x height`.
    pub fn padded(&self, width: usize, height: usize) -> Self {
        let left = self.x.saturating_sub(1);
        let top = self.y.saturating_sub(1);
        let right = if self.right() < width {
            self.right() + 1
        } else {
            self.right()
        };
        let bottom = if self.bottom() < height {
            self.bottom() + 1
        } else {
            self.bottom()
        };
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }
}

/// Region of interest in image coordinates and its mask in ROI coordinates.
#[derive(Debug, Clone)]
pub struct Region {
    rect: Rect,
    mask: Mask,
}

impl Region {
    /// Rasterize a closed polygon (outline and interior) inside an image.
    pub fn from_polygon(
        contour: &[Point],
        image_width: usize,
        image_height: usize,
    ) -> Result<Self, InputError> {
        if contour.is_empty() {
            return Err(InputError::EmptyContour);
        }
        if image_width == 0 || image_height == 0 {
            return Err(InputError::EmptyImage);
        }
        for p in contour {
            if p.x < 0 || p.y < 0 || p.x as usize >= image_width || p.y as usize >= image_height {
                return Err(InputError::ContourOutOfBounds {
                    x: p.x,
                    y: p.y,
                    width: image_width,
                    height: image_height,
                });
            }
        }
        let bounds = Rect::bounding(contour).ok_or(InputError::EmptyContour)?;
        let rect = bounds.padded(image_width, image_height);

        let offset = Point::new(rect.x as i32, rect.y as i32);
        let local: Vec<Point> = contour
            .iter()
            .map(|p| Point::new(p.x - offset.x, p.y - offset.y))
            .collect();

        let mut mask = Mask::new(rect.width, rect.height);
        fill_polygon(&mut mask, &local);
        for (i, &a) in local.iter().enumerate() {
            let b = local[(i + 1) % local.len()];
            draw_line(&mut mask, a, b);
        }
        log::debug!(
            "region {}x{} at ({}, {}) with {} unknowns",
            rect.width,
            rect.height,
            rect.x,
            rect.y,
            mask.count()
        );
        Ok(Self { rect, mask })
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn into_mask(self) -> Mask {
        self.mask
    }
}

// Even-odd fill sampled at pixel centres on integer coordinates.
fn fill_polygon(mask: &mut Mask, poly: &[Point]) {
    let n = poly.len();
    if n < 3 {
        return;
    }
    let mut crossings: Vec<f64> = Vec::with_capacity(n);
    for y in 0..mask.height() {
        let yf = y as f64;
        crossings.clear();
        for i in 0..n {
            let a = poly[i];
            let b = poly[(i + 1) % n];
            let (ay, by) = (a.y as f64, b.y as f64);
            if (ay > yf) != (by > yf) {
                let t = (yf - ay) / (by - ay);
                crossings.push(a.x as f64 + t * (b.x as f64 - a.x as f64));
            }
        }
        crossings.sort_by(|l, r| l.total_cmp(r));
        for span in crossings.chunks_exact(2) {
            let start = span[0].ceil().max(0.0) as usize;
            let end = span[1].floor();
            if end < 0.0 {
                continue;
            }
            let end = (end as usize).min(mask.width() - 1);
            for x in start..=end {
                mask.set(x, y, true);
            }
        }
    }
}

// Bresenham, 8-connected.
fn draw_line(mask: &mut Mask, a: Point, b: Point) {
    let dx = (b.x - a.x).abs();
    let dy = -(b.y - a.y).abs();
    let sx = if a.x < b.x { 1 } else { -1 };
    let sy = if a.y < b.y { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (a.x, a.y);
    loop {
        if x >= 0 && y >= 0 && (x as usize) < mask.width() && (y as usize) < mask.height() {
            mask.set(x as usize, y as usize, true);
        }
        if x == b.x && y == b.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rectangle(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<Point> {
        vec![
            Point::new(x0, y0),
            Point::new(x0, y1),
            Point::new(x1, y1),
            Point::new(x1, y0),
        ]
    }

    #[test]
    fn rectangle_gets_one_pixel_padding() {
        let region = Region::from_polygon(&rectangle(4, 3, 8, 6), 20, 20).unwrap();
        assert_eq!(
            region.rect(),
            Rect {
                x: 3,
                y: 2,
                width: 7,
                height: 6
            }
        );
        let mask = region.mask();
        for y in 0..mask.height() {
            for x in 0..mask.width() {
                let inside = (1..=5).contains(&x) && (1..=4).contains(&y);
                assert_eq!(mask.get(x, y), inside, "pixel ({x}, {y})");
            }
        }
        assert_eq!(mask.count(), 5 * 4);
    }

    #[test]
    fn padding_clipped_at_image_border() {
        let region = Region::from_polygon(&rectangle(0, 0, 3, 2), 4, 10).unwrap();
        assert_eq!(
            region.rect(),
            Rect {
                x: 0,
                y: 0,
                width: 4,
                height: 4
            }
        );
        assert!(region.mask().get(0, 0));
        assert!(region.mask().get(3, 2));
        assert!(!region.mask().get(0, 3));
    }

    #[test]
    fn triangle_contains_outline_and_interior() {
        let tri = [Point::new(2, 2), Point::new(10, 2), Point::new(2, 10)];
        let region = Region::from_polygon(&tri, 16, 16).unwrap();
        let mask = region.mask();
        // Vertices and a point near the hypotenuse, in ROI coordinates.
        assert!(mask.get(1, 1));
        assert!(mask.get(9, 1));
        assert!(mask.get(1, 9));
        assert!(mask.get(5, 5));
        assert!(mask.get(3, 3));
        assert!(!mask.get(8, 8));
    }

    #[test]
    fn rejects_bad_contours() {
        assert_eq!(
            Region::from_polygon(&[], 8, 8).unwrap_err(),
            InputError::EmptyContour
        );
        assert!(matches!(
            Region::from_polygon(&[Point::new(8, 1)], 8, 8),
            Err(InputError::ContourOutOfBounds { x: 8, y: 1, .. })
        ));
    }
}
