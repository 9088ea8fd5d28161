//! Fixed-size grid of locked blocks

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// 24-bit RGB color of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub const CYAN: Color = Color(0x00bcd4);
    pub const YELLOW: Color = Color(0xffeb3b);
    pub const PURPLE: Color = Color(0x9c27b0);
    pub const GREEN: Color = Color(0x4caf50);
    pub const RED: Color = Color(0xf44336);
    pub const BLUE: Color = Color(0x2196f3);
    pub const ORANGE: Color = Color(0xff9800);

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color((u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b))
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06x}", self.0 & 0x00ff_ffff)
    }
}

/// Single matrix cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    Block(Color),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn color(&self) -> Option<Color> {
        match self {
            Cell::Empty => None,
            Cell::Block(color) => Some(*color),
        }
    }
}

/// Grid of cells, rows top-to-bottom, columns left-to-right
///
/// Every row has the same length for the lifetime of the matrix. Serialized
/// as a list of rows and validated by [`Matrix::from_rows`] on the way back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Cell>>", into = "Vec<Vec<Cell>>")]
pub struct Matrix {
    cols: usize,
    rows: usize,
    cells: Vec<Vec<Cell>>,
}

impl Matrix {
    /// Create an empty `cols` x `rows` matrix
    pub fn new(cols: usize, rows: usize) -> Result<Self> {
        if cols == 0 || rows == 0 {
            return Err(EngineError::InvalidDimensions { cols, rows });
        }
        Ok(Matrix {
            cols,
            rows,
            cells: vec![vec![Cell::Empty; cols]; rows],
        })
    }

    /// Build a matrix from rows of cells, rejecting empty or ragged input
    pub fn from_rows(cells: Vec<Vec<Cell>>) -> Result<Self> {
        let rows = cells.len();
        let cols = cells.first().map_or(0, Vec::len);
        if cols == 0 || rows == 0 {
            return Err(EngineError::InvalidDimensions { cols, rows });
        }
        if let Some((row, line)) = cells.iter().enumerate().find(|(_, line)| line.len() != cols) {
            return Err(EngineError::RaggedMatrix {
                row,
                len: line.len(),
                expected: cols,
            });
        }
        Ok(Matrix { cols, rows, cells })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Cell at (x, y), `None` when outside the grid
    pub fn get(&self, x: isize, y: isize) -> Option<Cell> {
        let (x, y) = self.index(x, y)?;
        Some(self.cells[y][x])
    }

    /// Write a cell; returns false and writes nothing when outside the grid
    pub fn set(&mut self, x: isize, y: isize, cell: Cell) -> bool {
        match self.index(x, y) {
            Some((x, y)) => {
                self.cells[y][x] = cell;
                true
            }
            None => false,
        }
    }

    /// True when (x, y) is inside the grid and empty
    pub fn is_free(&self, x: isize, y: isize) -> bool {
        matches!(self.get(x, y), Some(Cell::Empty))
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        self.cells
            .get(y)
            .is_some_and(|row| row.iter().all(|cell| !cell.is_empty()))
    }

    /// Remove every full row and push empty rows in at the top.
    /// Remaining rows keep their relative order. Returns the number removed.
    pub fn clear_full_rows(&mut self) -> usize {
        let before = self.cells.len();
        self.cells.retain(|row| row.iter().any(Cell::is_empty));
        let cleared = before - self.cells.len();
        if cleared > 0 {
            let cols = self.cols;
            let empty = std::iter::repeat_with(|| vec![Cell::Empty; cols]).take(cleared);
            self.cells.splice(0..0, empty);
        }
        cleared
    }

    /// Rows top-to-bottom
    pub fn lines(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    /// Number of occupied cells
    pub fn occupied(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| !cell.is_empty())
            .count()
    }

    fn index(&self, x: isize, y: isize) -> Option<(usize, usize)> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.cols && y < self.rows).then_some((x, y))
    }
}

impl TryFrom<Vec<Vec<Cell>>> for Matrix {
    type Error = EngineError;

    fn try_from(cells: Vec<Vec<Cell>>) -> Result<Self> {
        Matrix::from_rows(cells)
    }
}

impl From<Matrix> for Vec<Vec<Cell>> {
    fn from(matrix: Matrix) -> Self {
        matrix.cells
    }
}

/// ASCII dump, `#` for blocks and `.` for empty cells
impl std::fmt::Display for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.cells {
            for cell in row {
                f.write_str(if cell.is_empty() { "." } else { "#" })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
