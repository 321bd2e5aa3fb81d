use std::time::Duration;

use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Every unknown moved by less than `eps` in the last sweep.
    Converged,
    /// `max_iters` sweeps ran without meeting the tolerance.
    MaxIterations,
}

#[derive(Debug, Clone)]
pub struct SolverStats {
    pub status: SolveStatus,
    /// Sweeps performed.
    pub iterations: usize,
    /// Largest absolute change of any unknown in the last sweep.
    pub max_delta: f64,
    pub unknowns: usize,
}

impl SolverStats {
    pub fn converged(&self) -> bool {
        self.status == SolveStatus::Converged
    }
}

#[derive(Debug, Clone)]
pub struct SweepReport {
    /// 1-based sweep number.
    pub iteration: usize,
    /// Unknowns that moved by less than `eps` in this sweep.
    pub settled: usize,
    pub rows: usize,
    pub max_delta: f64,
    pub converged: bool,
}

pub(crate) fn emit_line(line: &str) {
    if log::log_enabled!(log::Level::Info) {
        log::info!("{line}");
    } else {
        println!("{line}");
    }
}

pub(crate) fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs_f64();
    if secs >= 1.0 {
        format!("{:.3} s", secs)
    } else if secs >= 1e-3 {
        format!("{:.3} ms", secs * 1e3)
    } else if secs >= 1e-6 {
        format!("{:.3} us", secs * 1e6)
    } else {
        format!("{:.0} ns", secs * 1e9)
    }
}

/// Progress hook for the Gauss-Seidel solve.
pub trait Reporter {
    fn on_sweep(&mut self, report: &SweepReport);
    fn on_finish(&mut self) {}
}

/// Collects sweep reports and prints them as a table when the solve ends.
pub struct StdoutReporter {
    rows: Vec<SweepReport>,
}

impl StdoutReporter {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }
}

impl Default for StdoutReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for StdoutReporter {
    fn on_sweep(&mut self, report: &SweepReport) {
        self.rows.push(report.clone());
    }

    fn on_finish(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        if !log::log_enabled!(log::Level::Info) {
            println!();
        }
        let mut table = Table::new();
        table.load_preset(presets::UTF8_FULL);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("iter").set_alignment(CellAlignment::Right),
            Cell::new("settled").set_alignment(CellAlignment::Right),
            Cell::new("unknowns").set_alignment(CellAlignment::Right),
            Cell::new("max delta").set_alignment(CellAlignment::Right),
            Cell::new("converged"),
        ]);
        for row in &self.rows {
            table.add_row(vec![
                Cell::new(row.iteration).set_alignment(CellAlignment::Right),
                Cell::new(row.settled).set_alignment(CellAlignment::Right),
                Cell::new(row.rows).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.3e}", row.max_delta)).set_alignment(CellAlignment::Right),
                Cell::new(if row.converged { "yes" } else { "no" }),
            ]);
        }

        for line in table.to_string().lines() {
            emit_line(line);
        }
        self.rows.clear();
    }
}
