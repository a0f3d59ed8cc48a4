/// Géométrie d'une grille R×C posée sur une frame W×H.
///
/// Sampling uses fractional cell sizes so the remainder is spread across
/// cells. Reconstruction uses integer cell sizes; pixels beyond
/// `cols * (W div C)` / `rows * (H div R)` belong to no cell.
///
/// # Example
/// ```
/// use gv_core::geometry::CellGeometry;
/// let g = CellGeometry::new(640, 480, 60, 80);
/// assert_eq!(g.sample_point(0, 0), (4, 4));
/// assert_eq!(g.cell_rect(1, 2), (16, 8, 24, 16));
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellGeometry {
    width: u32,
    height: u32,
    rows: usize,
    cols: usize,
    cell_width: f64,
    cell_height: f64,
}

impl CellGeometry {
    /// Zero rows or columns are treated as 1.
    #[must_use]
    pub fn new(width: u32, height: u32, rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            width,
            height,
            rows,
            cols,
            cell_width: f64::from(width) / cols as f64,
            cell_height: f64::from(height) / rows as f64,
        }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Centre pixel of cell `(row, col)`, clamped inside the frame.
    #[inline(always)]
    #[must_use]
    pub fn sample_point(&self, row: usize, col: usize) -> (u32, u32) {
        let x = ((col as f64 + 0.5) * self.cell_width).floor() as u32;
        let y = ((row as f64 + 0.5) * self.cell_height).floor() as u32;
        (
            x.min(self.width.saturating_sub(1)),
            y.min(self.height.saturating_sub(1)),
        )
    }

    /// Tous les points d'échantillonnage, row-major: `(row, col, x, y)`.
    pub fn sample_points(&self) -> impl Iterator<Item = (usize, usize, u32, u32)> + '_ {
        (0..self.rows).flat_map(move |row| {
            (0..self.cols).map(move |col| {
                let (x, y) = self.sample_point(row, col);
                (row, col, x, y)
            })
        })
    }

    /// Integer cell size used for reconstruction: `(W div C, H div R)`.
    #[must_use]
    pub fn cell_size(&self) -> (u32, u32) {
        (
            self.width / self.cols as u32,
            self.height / self.rows as u32,
        )
    }

    /// Half-open pixel rectangle `(x0, y0, x1, y1)` of cell `(row, col)`.
    #[inline(always)]
    #[must_use]
    pub fn cell_rect(&self, row: usize, col: usize) -> (u32, u32, u32, u32) {
        let (cw, ch) = self.cell_size();
        let x0 = col as u32 * cw;
        let y0 = row as u32 * ch;
        (x0, y0, x0 + cw, y0 + ch)
    }
}
