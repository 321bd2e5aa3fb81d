use core::fmt;

use crate::assemble::{assemble_into, PoissonSystem};
use crate::image::{ensure_size, GrayView, GrayViewMut, InputError, Mask};
use crate::index::IndexGrid;
use crate::matrix::{DiagonalSplit, MatrixError};
use crate::report::{Reporter, SolveStatus, SolverStats};
use crate::scatter::scatter;
use crate::solver::{solve, SolveError, SolverOptions};

/// Errors from building or solving a blend.
#[derive(Debug, Clone, PartialEq)]
pub enum BlendError {
    /// Images, mask or index grid are malformed or disagree in shape.
    Input(InputError),
    /// An equation did not fit its row.
    Matrix(MatrixError),
    /// The assembled system was rejected by the solver.
    Solve(SolveError),
}

impl fmt::Display for BlendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input(err) => write!(f, "invalid input: {err}"),
            Self::Matrix(err) => write!(f, "matrix error: {err}"),
            Self::Solve(err) => write!(f, "solve error: {err}"),
        }
    }
}

impl std::error::Error for BlendError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Input(err) => Some(err),
            Self::Matrix(err) => Some(err),
            Self::Solve(err) => Some(err),
        }
    }
}

/// Seamless cloning of a masked region, one channel at a time.
///
/// The index grid is built once from the mask and shared by every channel;
/// the equation storage is reused between [`PoissonBlender::blend`] calls.
pub struct PoissonBlender {
    mask: Mask,
    index: IndexGrid,
    system: PoissonSystem,
    split: DiagonalSplit,
}

impl PoissonBlender {
    pub fn new(mask: Mask) -> Result<Self, BlendError> {
        let index = IndexGrid::new(&mask)?;
        Ok(Self {
            mask,
            index,
            system: PoissonSystem::default(),
            split: DiagonalSplit::default(),
        })
    }

    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    pub fn index(&self) -> &IndexGrid {
        &self.index
    }

    /// Number of pixels solved for per channel.
    pub fn unknowns(&self) -> usize {
        self.index.count()
    }

    /// Blend `src` into `dst` inside the mask for a single channel.
    ///
    /// `src` and `dst` must have the mask's shape; carve them out of larger
    /// images with `sub_view` / `sub_view_mut`. Only masked pixels of `dst` change.
    pub fn blend(
        &mut self,
        src: &GrayView<'_>,
        dst: &mut GrayViewMut<'_>,
        options: &SolverOptions,
        reporter: Option<&mut dyn Reporter>,
    ) -> Result<SolverStats, BlendError> {
        ensure_size(self.mask.size(), src.size())?;
        ensure_size(self.mask.size(), dst.size())?;
        if self.index.count() == 0 {
            return Ok(SolverStats {
                status: SolveStatus::Converged,
                iterations: 0,
                max_delta: 0.0,
                unknowns: 0,
            });
        }

        assemble_into(
            &mut self.system,
            src,
            &dst.as_view(),
            &self.mask,
            &self.index,
        )?;
        self.system.matrix.calc_split_into(&mut self.split);
        let PoissonSystem { matrix, b, x } = &mut self.system;
        let stats = solve(matrix, &self.split, b, x, options, reporter)?;
        scatter(x, &self.mask, &self.index, dst)?;
        Ok(stats)
    }
}

impl From<InputError> for BlendError {
    fn from(err: InputError) -> Self {
        Self::Input(err)
    }
}

impl From<MatrixError> for BlendError {
    fn from(err: MatrixError) -> Self {
        Self::Matrix(err)
    }
}

impl From<SolveError> for BlendError {
    fn from(err: SolveError) -> Self {
        Self::Solve(err)
    }
}
