use core::fmt;

/// One stored coefficient of a [`RowMatrix`] row.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Entry {
    pub col: usize,
    pub value: f64,
}

/// Errors while building a [`RowMatrix`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    /// Rows must be able to hold at least one entry.
    ZeroCapacity,
    /// Row index is >= rows.
    RowOutOfBounds { row: usize, rows: usize },
    /// The row already holds `capacity` entries.
    RowFull { row: usize, capacity: usize },
}

impl fmt::Display for MatrixError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroCapacity => write!(f, "row capacity must be at least 1"),
            Self::RowOutOfBounds { row, rows } => {
                write!(f, "row {row} out of bounds for {rows} rows")
            }
            Self::RowFull { row, capacity } => {
                write!(f, "row {row} is full ({capacity} entries)")
            }
        }
    }
}

impl std::error::Error for MatrixError {}

/// Sparse matrix with a fixed number of entry slots per row.
///
/// Rows live back to back in one buffer with stride `max_cols`; the first
/// `len[row]` slots of a row are in use and sorted by column. Slots past the
/// used length are never read.
#[derive(Debug, Clone, Default)]
pub struct RowMatrix {
    rows: usize,
    max_cols: usize,
    entries: Vec<Entry>,
    lens: Vec<usize>,
}

impl RowMatrix {
    /// Allocate `rows` empty rows with room for `max_cols` entries each.
    pub fn new(rows: usize, max_cols: usize) -> Result<Self, MatrixError> {
        let mut matrix = Self::default();
        matrix.create(rows, max_cols)?;
        Ok(matrix)
    }

    /// Re-shape to `rows x max_cols`, emptying every row and reusing storage.
    pub fn create(&mut self, rows: usize, max_cols: usize) -> Result<(), MatrixError> {
        if max_cols == 0 {
            return Err(MatrixError::ZeroCapacity);
        }
        self.rows = rows;
        self.max_cols = max_cols;
        self.entries.clear();
        self.entries.resize(rows * max_cols, Entry::default());
        self.lens.clear();
        self.lens.resize(rows, 0);
        Ok(())
    }

    /// Empty every row without touching the shape.
    pub fn clear(&mut self) {
        self.lens.fill(0);
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn max_cols(&self) -> usize {
        self.max_cols
    }

    /// Number of stored entries across all rows.
    pub fn nnz(&self) -> usize {
        self.lens.iter().sum()
    }

    pub fn row_len(&self, row: usize) -> usize {
        self.lens[row]
    }

    /// Used entries of `row`, ascending by column.
    #[inline]
    pub fn row(&self, row: usize) -> &[Entry] {
        let start = row * self.max_cols;
        &self.entries[start..start + self.lens[row]]
    }

    /// Insert `(col, value)` into `row`, keeping the row sorted by column.
    ///
    /// Columns are not de-duplicated: inserting the same column twice stores
    /// two entries, so callers insert each column at most once per row.
    pub fn insert(&mut self, row: usize, col: usize, value: f64) -> Result<(), MatrixError> {
        if row >= self.rows {
            return Err(MatrixError::RowOutOfBounds {
                row,
                rows: self.rows,
            });
        }
        let len = self.lens[row];
        if len == self.max_cols {
            return Err(MatrixError::RowFull {
                row,
                capacity: self.max_cols,
            });
        }
        let start = row * self.max_cols;
        let slots = &mut self.entries[start..start + len + 1];
        let pos = slots[..len].partition_point(|e| e.col < col);
        slots.copy_within(pos..len, pos + 1);
        slots[pos] = Entry { col, value };
        self.lens[row] = len + 1;
        Ok(())
    }

    /// Locate the diagonal entry of every row.
    pub fn calc_split(&self) -> DiagonalSplit {
        let mut split = DiagonalSplit::default();
        self.calc_split_into(&mut split);
        split
    }

    /// Like [`RowMatrix::calc_split`] but reuses the storage of `split`.
    pub fn calc_split_into(&self, split: &mut DiagonalSplit) {
        split.positions.clear();
        split
            .positions
            .extend((0..self.rows).map(|row| self.row(row).iter().position(|e| e.col == row)));
    }
}

/// Position of the diagonal entry within each row, `None` when a row has none.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiagonalSplit {
    positions: Vec<Option<usize>>,
}

impl DiagonalSplit {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn get(&self, row: usize) -> Option<usize> {
        self.positions[row]
    }

    pub fn positions(&self) -> &[Option<usize>] {
        &self.positions
    }
}
