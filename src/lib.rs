//! Gradient-domain (Poisson) image blending with a bounded-degree sparse solver.
//!
//! Blending a source patch into a destination image amounts to solving the
//! discrete Poisson equation over the patch: the result keeps the source's local
//! gradients while matching the destination on the pixels around the patch.
//!
//! How it works (high level):
//! - Number the masked pixels row by row (`IndexGrid`).
//! - Emit one equation per unknown into a fixed-capacity sparse row matrix
//!   (`RowMatrix`, at most 4 neighbours plus the diagonal per row).
//! - Solve with Gauss-Seidel sweeps, warm-started from the destination.
//! - Round, saturate and write the solution back into the destination.
//!
//! Calling it:
//! - Build a `Mask` directly, or rasterize a polygon with `Region::from_polygon`.
//! - Create a `PoissonBlender` from the mask (the index grid is shared by all channels).
//! - Call `PoissonBlender::blend` once per channel with views cut to the region.
//!
//! Example:
//! ```rust
//! use poisson_blend_rs::{GrayView, GrayViewMut, Point, PoissonBlender, Region, SolverOptions};
//!
//! let (w, h) = (32usize, 32usize);
//! let src = vec![180u8; w * h];
//! let mut dst = vec![40u8; w * h];
//!
//! let contour = [Point::new(8, 8), Point::new(8, 20), Point::new(20, 20), Point::new(20, 8)];
//! let region = Region::from_polygon(&contour, w, h).unwrap();
//! let rect = region.rect();
//!
//! let src_full = GrayView::from_slice(w, h, &src).unwrap();
//! let mut dst_full = GrayViewMut::from_slice(w, h, &mut dst).unwrap();
//! let src_roi = src_full.sub_view(rect).unwrap();
//! let mut dst_roi = dst_full.sub_view_mut(rect).unwrap();
//!
//! let mut blender = PoissonBlender::new(region.into_mask()).unwrap();
//! let stats = blender
//!     .blend(&src_roi, &mut dst_roi, &SolverOptions::default(), None)
//!     .unwrap();
//! assert!(stats.converged());
//! ```

mod assemble;
mod blend;
mod image;
mod index;
mod matrix;
mod region;
mod report;
mod scatter;
mod solver;

pub use assemble::{assemble, assemble_into, PoissonSystem, MAX_DEGREE, ROW_CAPACITY};
pub use blend::{BlendError, PoissonBlender};
pub use image::{GrayView, GrayViewMut, InputError, Mask};
pub use index::IndexGrid;
pub use matrix::{DiagonalSplit, Entry, MatrixError, RowMatrix};
pub use region::{Point, Rect, Region};
pub use report::{Reporter, SolveStatus, SolverStats, StdoutReporter, SweepReport};
pub use scatter::{saturate_u8, scatter};
pub use solver::{solve, SolveError, SolverOptions};
