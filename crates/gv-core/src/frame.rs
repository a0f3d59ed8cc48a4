use crate::error::GridError;
use crate::reduce::GridMode;

/// Couleur RGB, un octet par canal.
pub type Rgb = (u8, u8, u8);

/// Buffer de pixels RGB, row-major, 3 bytes par pixel.
///
/// # Example
/// ```
/// use gv_core::frame::Frame;
/// let fb = Frame::new(10, 10);
/// assert_eq!(fb.data.len(), 300);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Pixels RGB, row-major.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Frame {
    /// Crée un buffer noir aux dimensions données.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize * 3],
            width,
            height,
        }
    }

    /// Crée un buffer uniformément rempli avec `color`.
    ///
    /// # Example
    /// ```
    /// use gv_core::frame::Frame;
    /// let fb = Frame::filled(4, 2, (255, 255, 255));
    /// assert!(fb.data.iter().all(|&b| b == 255));
    /// ```
    #[must_use]
    pub fn filled(width: u32, height: u32, color: Rgb) -> Self {
        let mut frame = Self::new(width, height);
        for px in frame.data.chunks_exact_mut(3) {
            px[0] = color.0;
            px[1] = color.1;
            px[2] = color.2;
        }
        frame
    }

    /// Accès au pixel (x, y). Hors limites → noir.
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        if x >= self.width || y >= self.height {
            return (0, 0, 0);
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        (self.data[idx], self.data[idx + 1], self.data[idx + 2])
    }

    /// Écrit le pixel (x, y). Hors limites → ignoré.
    #[inline(always)]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 3;
        self.data[idx] = color.0;
        self.data[idx + 1] = color.1;
        self.data[idx + 2] = color.2;
    }

    /// Fill the half-open rectangle `[x0, x1) × [y0, y1)`, clipped to the frame.
    pub fn fill_rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb) {
        let x1 = x1.min(self.width);
        let y1 = y1.min(self.height);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let stride = self.width as usize * 3;
        for y in y0..y1 {
            let row = y as usize * stride;
            let span = &mut self.data[row + x0 as usize * 3..row + x1 as usize * 3];
            for px in span.chunks_exact_mut(3) {
                px[0] = color.0;
                px[1] = color.1;
                px[2] = color.2;
            }
        }
    }

    /// Remet tous les pixels à noir.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }
}

/// Valeur réduite d'une cellule de grille.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridCell {
    /// 0 = noir, 1 = blanc.
    Binary(u8),
    /// Couleur RGB conservée.
    Color(Rgb),
}

impl GridCell {
    /// Mode that produced this cell.
    #[must_use]
    pub fn mode(self) -> GridMode {
        match self {
            Self::Binary(_) => GridMode::Binary,
            Self::Color(_) => GridMode::Color,
        }
    }
}

/// Dense R×C matrix of cells for one video frame, row-major.
///
/// Cells are addressed directly by `(row, col)`; flat position is
/// `row * cols + col`.
///
/// # Example
/// ```
/// use gv_core::frame::{GridCell, GridMatrix};
/// use gv_core::reduce::GridMode;
/// let mut m = GridMatrix::new(2, 3, GridMode::Binary);
/// m.set(1, 2, GridCell::Binary(1));
/// assert_eq!(m.get(1, 2), Some(GridCell::Binary(1)));
/// assert_eq!(GridMatrix::pos(1, 2, 3), 5);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridMatrix {
    cells: Vec<GridCell>,
    rows: usize,
    cols: usize,
    mode: GridMode,
}

impl GridMatrix {
    /// Matrice remplie de cellules noires.
    #[must_use]
    pub fn new(rows: usize, cols: usize, mode: GridMode) -> Self {
        Self {
            cells: vec![mode.black(); rows * cols],
            rows,
            cols,
            mode,
        }
    }

    /// Build a matrix from row-major cells.
    ///
    /// # Errors
    /// Returns [`GridError::ShapeMismatch`] if `cells.len() != rows * cols`,
    /// and [`GridError::ModeMismatch`] if a cell is not of `mode`.
    pub fn from_cells(
        rows: usize,
        cols: usize,
        mode: GridMode,
        cells: Vec<GridCell>,
    ) -> Result<Self, GridError> {
        if cells.len() != rows * cols {
            return Err(GridError::ShapeMismatch {
                expected_rows: rows,
                expected_cols: cols,
                rows: cells.len() / cols.max(1),
                cols,
            });
        }
        if let Some(bad) = cells.iter().find(|c| c.mode() != mode) {
            return Err(GridError::ModeMismatch {
                expected: mode,
                found: bad.mode(),
            });
        }
        Ok(Self {
            cells,
            rows,
            cols,
            mode,
        })
    }

    /// Row-major flat index of `(row, col)`.
    #[inline(always)]
    #[must_use]
    pub fn pos(row: usize, col: usize, cols: usize) -> usize {
        row * cols + col
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn mode(&self) -> GridMode {
        self.mode
    }

    /// Cellules en ordre row-major.
    #[must_use]
    pub fn cells(&self) -> &[GridCell] {
        &self.cells
    }

    /// Cell at `(row, col)`, `None` outside the matrix.
    #[inline(always)]
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<GridCell> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.cells[Self::pos(row, col, self.cols)])
    }

    /// Écrit la cellule `(row, col)`. Hors limites → ignoré.
    #[inline(always)]
    pub fn set(&mut self, row: usize, col: usize, cell: GridCell) {
        if row < self.rows && col < self.cols {
            self.cells[Self::pos(row, col, self.cols)] = cell;
        }
    }

    /// One slice per grid row, top to bottom.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[GridCell]> {
        self.cells.chunks(self.cols.max(1))
    }
}

/// Ordered list of grid matrices sharing one shape and one mode.
///
/// # Example
/// ```
/// use gv_core::frame::{FrameSequence, GridMatrix};
/// use gv_core::reduce::GridMode;
/// let mut seq = FrameSequence::new(4, 4, GridMode::Binary);
/// seq.push(GridMatrix::new(4, 4, GridMode::Binary)).unwrap();
/// assert_eq!(seq.len(), 1);
/// assert!(seq.push(GridMatrix::new(2, 4, GridMode::Binary)).is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameSequence {
    frames: Vec<GridMatrix>,
    rows: usize,
    cols: usize,
    mode: GridMode,
}

impl FrameSequence {
    #[must_use]
    pub fn new(rows: usize, cols: usize, mode: GridMode) -> Self {
        Self {
            frames: Vec::new(),
            rows,
            cols,
            mode,
        }
    }

    /// Append a matrix in temporal order.
    ///
    /// # Errors
    /// Rejects matrices whose shape or mode differ from the sequence.
    pub fn push(&mut self, matrix: GridMatrix) -> Result<(), GridError> {
        if matrix.rows != self.rows || matrix.cols != self.cols {
            return Err(GridError::ShapeMismatch {
                expected_rows: self.rows,
                expected_cols: self.cols,
                rows: matrix.rows,
                cols: matrix.cols,
            });
        }
        if matrix.mode != self.mode {
            return Err(GridError::ModeMismatch {
                expected: self.mode,
                found: matrix.mode,
            });
        }
        self.frames.push(matrix);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn mode(&self) -> GridMode {
        self.mode
    }

    /// Matrix at temporal index `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&GridMatrix> {
        self.frames.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, GridMatrix> {
        self.frames.iter()
    }

    /// Keep only the first `len` matrices.
    pub fn truncate(&mut self, len: usize) {
        self.frames.truncate(len);
    }
}

impl<'a> IntoIterator for &'a FrameSequence {
    type Item = &'a GridMatrix;
    type IntoIter = std::slice::Iter<'a, GridMatrix>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_rect_is_half_open_and_clipped() {
        let mut f = Frame::new(4, 4);
        f.fill_rect(1, 1, 3, 9, (9, 9, 9));
        assert_eq!(f.pixel(0, 1), (0, 0, 0));
        assert_eq!(f.pixel(1, 1), (9, 9, 9));
        assert_eq!(f.pixel(2, 3), (9, 9, 9));
        assert_eq!(f.pixel(3, 1), (0, 0, 0));
    }

    #[test]
    fn out_of_bounds_pixel_is_black() {
        let f = Frame::filled(2, 2, (1, 1, 1));
        assert_eq!(f.pixel(2, 0), (0, 0, 0));
    }

    #[test]
    fn from_cells_checks_mode() {
        let cells = vec![GridCell::Binary(0), GridCell::Color((1, 2, 3))];
        let err = GridMatrix::from_cells(1, 2, GridMode::Binary, cells).unwrap_err();
        assert!(matches!(err, GridError::ModeMismatch { .. }));
    }

    #[test]
    fn sequence_rejects_other_mode() {
        let mut seq = FrameSequence::new(2, 2, GridMode::Color);
        let err = seq.push(GridMatrix::new(2, 2, GridMode::Binary)).unwrap_err();
        assert!(matches!(err, GridError::ModeMismatch { .. }));
        assert!(seq.is_empty());
    }
}
