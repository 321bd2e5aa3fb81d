//! Discrete Poisson system for guided-gradient blending.
//!
//! One equation per unknown pixel `k` with in-bounds 4-neighbours `N(k)`:
//!
//! ```text
//! |N(k)| x[k] - sum_{n in N(k), n unknown} x[n]
//!     = sum_{n in N(k)} (src[k] - src[n]) + sum_{n in N(k), n fixed} dst[n]
//! ```
//!
//! The left side is the graph Laplacian of the mask, the first sum on the right
//! carries the source gradients and the second anchors the solution to the
//! destination pixels around the region.

use crate::blend::BlendError;
use crate::image::{ensure_size, GrayView, InputError, Mask};
use crate::index::IndexGrid;
use crate::matrix::RowMatrix;

/// Most neighbours a pixel has on the 4-connected grid.
pub const MAX_DEGREE: usize = 4;

/// Entry slots per row: the neighbours plus the diagonal.
pub const ROW_CAPACITY: usize = MAX_DEGREE + 1;

/// Assembled `A x = b` for one channel, with `x` warm-started from the destination.
#[derive(Debug, Clone, Default)]
pub struct PoissonSystem {
    pub matrix: RowMatrix,
    pub b: Vec<f64>,
    pub x: Vec<f64>,
}

impl PoissonSystem {
    pub fn unknowns(&self) -> usize {
        self.matrix.rows()
    }
}

/// Build the Poisson system for one channel.
pub fn assemble(
    src: &GrayView<'_>,
    dst: &GrayView<'_>,
    mask: &Mask,
    index: &IndexGrid,
) -> Result<PoissonSystem, BlendError> {
    let mut system = PoissonSystem::default();
    assemble_into(&mut system, src, dst, mask, index)?;
    Ok(system)
}

/// Like [`assemble`] but reuses the storage of an existing system.
pub fn assemble_into(
    system: &mut PoissonSystem,
    src: &GrayView<'_>,
    dst: &GrayView<'_>,
    mask: &Mask,
    index: &IndexGrid,
) -> Result<(), BlendError> {
    if mask.is_empty() {
        return Err(InputError::EmptyMask.into());
    }
    let size = mask.size();
    index.check_mask(mask)?;
    ensure_size(size, src.size())?;
    ensure_size(size, dst.size())?;

    let unknowns = index.count();
    system.matrix.create(unknowns, ROW_CAPACITY)?;
    system.b.clear();
    system.b.resize(unknowns, 0.0);
    system.x.clear();
    system.x.resize(unknowns, 0.0);

    let (width, height) = size;
    for i in 0..height {
        for j in 0..width {
            if !mask.get(j, i) {
                continue;
            }
            let k = index.get(j, i).ok_or(InputError::IndexMismatch { x: j, y: i })?;
            let center = f64::from(src.get(j, i));
            let mut degree = 0u32;
            let mut b_val = 0.0;

            let neighbours = [
                (i > 0).then(|| (j, i - 1)),
                (i + 1 < height).then(|| (j, i + 1)),
                (j > 0).then(|| (j - 1, i)),
                (j + 1 < width).then(|| (j + 1, i)),
            ];
            for (nx, ny) in neighbours.into_iter().flatten() {
                degree += 1;
                b_val += center - f64::from(src.get(nx, ny));
                if mask.get(nx, ny) {
                    let n = index
                        .get(nx, ny)
                        .ok_or(InputError::IndexMismatch { x: nx, y: ny })?;
                    system.matrix.insert(k, n, -1.0)?;
                } else {
                    b_val += f64::from(dst.get(nx, ny));
                }
            }

            system.matrix.insert(k, k, f64::from(degree))?;
            system.b[k] = b_val;
            system.x[k] = f64::from(dst.get(j, i));
        }
    }

    log::debug!(
        "assembled {} unknowns, {} non-zeros",
        unknowns,
        system.matrix.nnz()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::Entry;

    fn flat(width: usize, height: usize, value: u8) -> Vec<u8> {
        vec![value; width * height]
    }

    fn build(mask: &Mask, src: &[u8], dst: &[u8]) -> (IndexGrid, PoissonSystem) {
        let (w, h) = mask.size();
        let index = IndexGrid::new(mask).unwrap();
        let src = GrayView::from_slice(w, h, src).unwrap();
        let dst = GrayView::from_slice(w, h, dst).unwrap();
        let system = assemble(&src, &dst, mask, &index).unwrap();
        (index, system)
    }

    #[test]
    fn interior_pixel_has_full_laplacian_row() {
        let mask = Mask::from_fn(5, 5, |x, y| (1..4).contains(&x) && (1..4).contains(&y));
        let (index, system) = build(&mask, &flat(5, 5, 10), &flat(5, 5, 20));
        let k = index.get(2, 2).unwrap();
        let row = system.matrix.row(k);
        assert_eq!(row.len(), 5);
        let off: Vec<&Entry> = row.iter().filter(|e| e.col != k).collect();
        assert_eq!(off.len(), 4);
        assert!(off.iter().all(|e| e.value == -1.0));
        let split = system.matrix.calc_split();
        assert_eq!(row[split.get(k).unwrap()].value, 4.0);
        assert_eq!(system.b[k], 0.0);
        assert_eq!(system.x[k], 20.0);
    }

    #[test]
    fn corner_pixel_has_degree_two() {
        // Only the top-left corner is unknown; both neighbours are fixed.
        let mask = Mask::from_fn(3, 3, |x, y| x == 0 && y == 0);
        let mut src = flat(3, 3, 0);
        src[0] = 9;
        src[1] = 4;
        src[3] = 7;
        let mut dst = flat(3, 3, 0);
        dst[1] = 50;
        dst[3] = 60;
        let (_, system) = build(&mask, &src, &dst);
        assert_eq!(system.unknowns(), 1);
        assert_eq!(
            system.matrix.row(0),
            &[Entry {
                col: 0,
                value: 2.0
            }]
        );
        // (9 - 4) + (9 - 7) + 50 + 60
        assert_eq!(system.b[0], 117.0);
    }

    #[test]
    fn edge_pixel_mixes_unknown_and_fixed_neighbours() {
        let mask = Mask::from_fn(4, 3, |x, y| y == 0 && x < 2);
        let src: Vec<u8> = (0..12).map(|v| v as u8 * 2).collect();
        let dst = flat(4, 3, 100);
        let (index, system) = build(&mask, &src, &dst);
        let k = index.get(1, 0).unwrap();
        let left = index.get(0, 0).unwrap();
        assert_eq!(
            system.matrix.row(k),
            &[
                Entry {
                    col: left,
                    value: -1.0
                },
                Entry { col: k, value: 3.0 }
            ]
        );
        // src(1,0)=2: bottom 10, left 0, right 4 -> gradients -8 + 2 - 2, fixed bottom and right.
        assert_eq!(system.b[k], -8.0 + 200.0);
    }

    #[test]
    fn rejects_index_with_extra_unknowns() {
        let mask = Mask::from_fn(3, 3, |x, y| x == 1 && y == 1);
        let index = IndexGrid::new(&Mask::from_fn(3, 3, |_, _| true)).unwrap();
        let img = flat(3, 3, 5);
        let view = GrayView::from_slice(3, 3, &img).unwrap();
        let mut system = PoissonSystem::default();
        system.b.push(1.5);
        let err = assemble_into(&mut system, &view, &view, &mask, &index).unwrap_err();
        assert_eq!(err, BlendError::Input(InputError::IndexMismatch { x: 0, y: 0 }));
        assert_eq!(system.b, vec![1.5]);
    }

    #[test]
    fn rejects_mismatched_sizes() {
        let mask = Mask::from_fn(3, 3, |_, _| true);
        let index = IndexGrid::new(&mask).unwrap();
        let small = flat(2, 3, 0);
        let full = flat(3, 3, 0);
        let src = GrayView::from_slice(2, 3, &small).unwrap();
        let dst = GrayView::from_slice(3, 3, &full).unwrap();
        let err = assemble(&src, &dst, &mask, &index).unwrap_err();
        assert!(matches!(
            err,
            BlendError::Input(InputError::SizeMismatch {
                expected: (3, 3),
                actual: (2, 3)
            })
        ));
    }
}
