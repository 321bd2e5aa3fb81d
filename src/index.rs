use crate::image::{ensure_size, InputError, Mask};

/// Dense row-major numbering of the unknown pixels of a mask.
///
/// Cells outside the mask hold `None`; their value comes from the destination image.
#[derive(Debug, Clone)]
pub struct IndexGrid {
    width: usize,
    height: usize,
    cells: Vec<Option<usize>>,
    count: usize,
}

impl IndexGrid {
    pub fn new(mask: &Mask) -> Result<Self, InputError> {
        if mask.is_empty() {
            return Err(InputError::EmptyMask);
        }
        let (width, height) = mask.size();
        let mut cells = Vec::with_capacity(width * height);
        let mut count = 0;
        for y in 0..height {
            for x in 0..width {
                if mask.get(x, y) {
                    cells.push(Some(count));
                    count += 1;
                } else {
                    cells.push(None);
                }
            }
        }
        Ok(Self {
            width,
            height,
            cells,
            count,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Number of unknowns.
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<usize> {
        self.cells[y * self.width + x]
    }

    /// Check that exactly the `true` cells of `mask` are numbered.
    ///
    /// Reports the first disagreeing pixel in scan order.
    pub fn check_mask(&self, mask: &Mask) -> Result<(), InputError> {
        ensure_size(self.size(), mask.size())?;
        for y in 0..self.height {
            for x in 0..self.width {
                if mask.get(x, y) != self.get(x, y).is_some() {
                    return Err(InputError::IndexMismatch { x, y });
                }
            }
        }
        Ok(())
    }
}
