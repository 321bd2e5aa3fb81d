use core::fmt;

use std::time::Instant;

use crate::matrix::{DiagonalSplit, Entry, RowMatrix};
use crate::report::{
    emit_line, format_duration, Reporter, SolveStatus, SolverStats, StdoutReporter, SweepReport,
};

/// Errors specific to a solve call. All are detected before `x` is touched.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveError {
    /// `b` or `x` does not have one entry per matrix row.
    DimensionMismatch { expected: usize, actual: usize },
    /// The diagonal table was computed for a different matrix.
    SplitMismatch { expected: usize, actual: usize },
    /// Row has no entry on the diagonal.
    MissingDiagonal { row: usize },
    /// Row's diagonal coefficient is zero.
    ZeroDiagonal { row: usize },
}

impl fmt::Display for SolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch { expected, actual } => {
                write!(f, "vector length {actual} does not match expected {expected}")
            }
            Self::SplitMismatch { expected, actual } => {
                write!(f, "diagonal table has {actual} rows, matrix has {expected}")
            }
            Self::MissingDiagonal { row } => write!(f, "row {row} has no diagonal entry"),
            Self::ZeroDiagonal { row } => write!(f, "row {row} has a zero diagonal"),
        }
    }
}

impl std::error::Error for SolveError {}

/// Options controlling the Gauss-Seidel solve.
#[derive(Debug, Clone)]
pub struct SolverOptions {
    /// Maximum number of sweeps.
    pub max_iters: usize,
    /// Converge when every unknown moves by less than eps in one sweep.
    pub eps: f64,
    /// Report progress every this many sweeps (0 disables periodic reports).
    pub report_every: usize,
    /// Print a sweep table and timing to stdout when no reporter is given.
    pub verbose: bool,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iters: 10_000,
            eps: 0.01,
            report_every: 100,
            verbose: false,
        }
    }
}

enum ReporterSlot<'a> {
    External(&'a mut dyn Reporter),
    Local(StdoutReporter),
    None,
}

impl<'a> ReporterSlot<'a> {
    fn new(reporter: Option<&'a mut dyn Reporter>, verbose: bool) -> Self {
        match reporter {
            Some(r) => Self::External(r),
            None if verbose => Self::Local(StdoutReporter::new()),
            None => Self::None,
        }
    }

    fn as_mut(&mut self) -> Option<&mut dyn Reporter> {
        match self {
            Self::External(r) => Some(*r),
            Self::Local(r) => Some(r),
            Self::None => None,
        }
    }
}

/// Gauss-Seidel solve of `A x = b`, updating `x` in place.
///
/// Each sweep visits rows in index order and uses the freshest values of `x`,
/// including those already updated earlier in the same sweep. Running out of
/// sweeps is not an error: `x` keeps the last iterate and the returned status
/// is [`SolveStatus::MaxIterations`].
pub fn solve(
    matrix: &RowMatrix,
    split: &DiagonalSplit,
    b: &[f64],
    x: &mut [f64],
    options: &SolverOptions,
    reporter: Option<&mut dyn Reporter>,
) -> Result<SolverStats, SolveError> {
    let rows = matrix.rows();
    check_system(matrix, split, b, x)?;

    let start_time = options.verbose.then(Instant::now);
    let mut reporter = ReporterSlot::new(reporter, options.verbose);

    let mut status = SolveStatus::MaxIterations;
    let mut iterations = 0;
    let mut max_delta = 0.0;

    for iter in 0..options.max_iters {
        let mut settled = 0;
        max_delta = 0.0;
        for i in 0..rows {
            let row = matrix.row(i);
            let Some(diag) = split.get(i) else { continue };
            let val = off_diagonal_sum(row, diag, x);
            let next = (b[i] - val) / row[diag].value;
            let delta = (next - x[i]).abs();
            if delta < options.eps {
                settled += 1;
            }
            if delta > max_delta {
                max_delta = delta;
            }
            x[i] = next;
        }

        iterations = iter + 1;
        let converged = settled == rows;
        if converged {
            status = SolveStatus::Converged;
        }
        let periodic = options.report_every > 0 && iterations % options.report_every == 0;
        let last = converged || iterations == options.max_iters;
        if periodic || last {
            if let Some(reporter) = reporter.as_mut() {
                reporter.on_sweep(&SweepReport {
                    iteration: iterations,
                    settled,
                    rows,
                    max_delta,
                    converged,
                });
            }
        }
        if converged {
            break;
        }
    }

    if status == SolveStatus::Converged {
        log::debug!("converged after {iterations} sweeps");
    } else {
        log::warn!(
            "no convergence after {iterations} sweeps (max delta {max_delta:.3e}, eps {})",
            options.eps
        );
    }

    if let Some(reporter) = reporter.as_mut() {
        reporter.on_finish();
    }
    if let Some(start) = start_time {
        emit_line(&format!("time: {}", format_duration(start.elapsed())));
    }

    Ok(SolverStats {
        status,
        iterations,
        max_delta,
        unknowns: rows,
    })
}

fn check_system(
    matrix: &RowMatrix,
    split: &DiagonalSplit,
    b: &[f64],
    x: &[f64],
) -> Result<(), SolveError> {
    let rows = matrix.rows();
    for len in [b.len(), x.len()] {
        if len != rows {
            return Err(SolveError::DimensionMismatch {
                expected: rows,
                actual: len,
            });
        }
    }
    if split.len() != rows {
        return Err(SolveError::SplitMismatch {
            expected: rows,
            actual: split.len(),
        });
    }
    for row in 0..rows {
        let diag = split.get(row).ok_or(SolveError::MissingDiagonal { row })?;
        let entry = matrix
            .row(row)
            .get(diag)
            .filter(|e| e.col == row)
            .ok_or(SolveError::MissingDiagonal { row })?;
        if entry.value == 0.0 {
            return Err(SolveError::ZeroDiagonal { row });
        }
    }
    Ok(())
}

#[inline]
fn off_diagonal_sum(row: &[Entry], diag: usize, x: &[f64]) -> f64 {
    let mut sum = 0.0;
    for e in &row[..diag] {
        sum += e.value * x[e.col];
    }
    for e in &row[diag + 1..] {
        sum += e.value * x[e.col];
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system(entries: &[(usize, usize, f64)], rows: usize) -> (RowMatrix, DiagonalSplit) {
        let mut m = RowMatrix::new(rows, 5).unwrap();
        for &(r, c, v) in entries {
            m.insert(r, c, v).unwrap();
        }
        let split = m.calc_split();
        (m, split)
    }

    #[test]
    fn single_unknown_converges_to_boundary() {
        let (m, split) = system(&[(0, 0, 4.0)], 1);
        let b = [4.0 * 37.0];
        let mut x = [0.0];
        let stats = solve(&m, &split, &b, &mut x, &SolverOptions::default(), None).unwrap();
        assert!(stats.converged());
        assert!((x[0] - 37.0).abs() < 1e-12);
        assert_eq!(stats.iterations, 2);
    }

    #[test]
    fn diagonally_dominant_system() {
        // [[4,-1,0],[-1,4,-1],[0,-1,4]] x = [2, 4, 10] -> x = [1, 2, 3]
        let (m, split) = system(
            &[
                (0, 0, 4.0),
                (0, 1, -1.0),
                (1, 0, -1.0),
                (1, 1, 4.0),
                (1, 2, -1.0),
                (2, 1, -1.0),
                (2, 2, 4.0),
            ],
            3,
        );
        let b = [2.0, 4.0, 10.0];
        let mut x = [0.0; 3];
        let options = SolverOptions {
            eps: 1e-12,
            ..SolverOptions::default()
        };
        let stats = solve(&m, &split, &b, &mut x, &options, None).unwrap();
        assert!(stats.converged());
        for (got, want) in x.iter().zip([1.0, 2.0, 3.0]) {
            assert!((got - want).abs() < 1e-10, "{got} vs {want}");
        }
    }

    #[test]
    fn exhausting_sweeps_is_not_an_error() {
        let (m, split) = system(&[(0, 0, 2.0), (0, 1, -1.0), (1, 0, -1.0), (1, 1, 2.0)], 2);
        let b = [100.0, 100.0];
        let mut x = [0.0; 2];
        let options = SolverOptions {
            max_iters: 3,
            eps: 1e-9,
            ..SolverOptions::default()
        };
        let stats = solve(&m, &split, &b, &mut x, &options, None).unwrap();
        assert_eq!(stats.status, SolveStatus::MaxIterations);
        assert_eq!(stats.iterations, 3);
        assert!(x[0] > 0.0 && x[1] > 0.0);
    }

    #[test]
    fn rejects_bad_systems_without_touching_x() {
        let (m, split) = system(&[(0, 0, 1.0), (1, 0, 1.0)], 2);
        let mut x = [5.0, 6.0];
        let err = solve(&m, &split, &[1.0, 1.0], &mut x, &SolverOptions::default(), None);
        assert_eq!(err.unwrap_err(), SolveError::MissingDiagonal { row: 1 });
        assert_eq!(x, [5.0, 6.0]);

        let (m, split) = system(&[(0, 0, 0.0)], 1);
        let err = solve(&m, &split, &[1.0], &mut [0.0], &SolverOptions::default(), None);
        assert_eq!(err.unwrap_err(), SolveError::ZeroDiagonal { row: 0 });

        let (m, split) = system(&[(0, 0, 1.0)], 1);
        let err = solve(&m, &split, &[1.0, 2.0], &mut [0.0], &SolverOptions::default(), None);
        assert_eq!(
            err.unwrap_err(),
            SolveError::DimensionMismatch {
                expected: 1,
                actual: 2
            }
        );
    }

    struct Recorder(Vec<SweepReport>, usize);

    impl Reporter for Recorder {
        fn on_sweep(&mut self, report: &SweepReport) {
            self.0.push(report.clone());
        }

        fn on_finish(&mut self) {
            self.1 += 1;
        }
    }

    #[test]
    fn reports_periodically_and_at_the_end() {
        let (m, split) = system(&[(0, 0, 2.0), (0, 1, -1.0), (1, 0, -1.0), (1, 1, 2.0)], 2);
        let b = [1.0, 1.0];
        let mut x = [0.0; 2];
        let options = SolverOptions {
            max_iters: 25,
            eps: 0.0,
            report_every: 10,
            ..SolverOptions::default()
        };
        let mut recorder = Recorder(Vec::new(), 0);
        solve(&m, &split, &b, &mut x, &options, Some(&mut recorder)).unwrap();
        let iters: Vec<usize> = recorder.0.iter().map(|r| r.iteration).collect();
        assert_eq!(iters, vec![10, 20, 25]);
        assert_eq!(recorder.1, 1);
        assert!(recorder.0.iter().all(|r| !r.converged));
    }
}
