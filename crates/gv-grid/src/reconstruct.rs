use gv_core::config::GridConfig;
use gv_core::frame::{Frame, GridCell, GridMatrix, Rgb};
use gv_core::geometry::CellGeometry;

/// Couleurs d'affichage des cellules binaires.
///
/// # Example
/// ```
/// use gv_grid::reconstruct::Palette;
/// let p = Palette::default();
/// assert_eq!((p.off, p.on), ((0, 0, 0), (255, 255, 255)));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub off: Rgb,
    pub on: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            off: (0, 0, 0),
            on: (255, 255, 255),
        }
    }
}

impl Palette {
    #[must_use]
    pub fn from_config(config: &GridConfig) -> Self {
        Self {
            off: config.off_color,
            on: config.on_color,
        }
    }

    /// Display colour of one cell.
    #[inline(always)]
    #[must_use]
    pub fn color_of(&self, cell: GridCell) -> Rgb {
        match cell {
            GridCell::Binary(0) => self.off,
            GridCell::Binary(_) => self.on,
            GridCell::Color(rgb) => rgb,
        }
    }
}

/// Reconstruit une frame `width × height` à partir d'une matrice.
///
/// Each cell's integer rectangle is flat-filled with its colour. Pixels
/// outside every rectangle (non-divisible sizes) stay black.
///
/// # Example
/// ```
/// use gv_core::frame::{GridCell, GridMatrix};
/// use gv_core::reduce::GridMode;
/// use gv_grid::reconstruct::{reconstruct, Palette};
///
/// let mut m = GridMatrix::new(1, 2, GridMode::Binary);
/// m.set(0, 1, GridCell::Binary(1));
/// let frame = reconstruct(&m, 4, 2, &Palette::default());
/// assert_eq!(frame.pixel(0, 0), (0, 0, 0));
/// assert_eq!(frame.pixel(3, 1), (255, 255, 255));
/// ```
#[must_use]
pub fn reconstruct(matrix: &GridMatrix, width: u32, height: u32, palette: &Palette) -> Frame {
    let mut frame = Frame::new(width, height);
    reconstruct_into(matrix, matrix.rows(), matrix.cols(), palette, &mut frame);
    frame
}

/// Reconstruit dans un buffer existant, pour une grille déclarée `rows × cols`.
///
/// The declared shape drives the geometry. Cells the matrix does not hold
/// (matrix smaller than declared) render black.
pub fn reconstruct_into(
    matrix: &GridMatrix,
    rows: usize,
    cols: usize,
    palette: &Palette,
    frame: &mut Frame,
) {
    frame.clear();
    let geometry = CellGeometry::new(frame.width, frame.height, rows, cols);
    for row in 0..geometry.rows() {
        for col in 0..geometry.cols() {
            let color = matrix
                .get(row, col)
                .map_or((0, 0, 0), |cell| palette.color_of(cell));
            let (x0, y0, x1, y1) = geometry.cell_rect(row, col);
            frame.fill_rect(x0, y0, x1, y1, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::GridEncoder;
    use gv_core::reduce::GridMode;

    #[test]
    fn white_binary_round_trip() {
        let mut enc = GridEncoder::new(4, 4, GridMode::Binary);
        let m = enc.encode_frame(&Frame::filled(32, 32, (255, 255, 255)));
        assert!(m.cells().iter().all(|c| *c == GridCell::Binary(1)));

        let out = reconstruct(&m, 32, 32, &Palette::default());
        assert_eq!(out, Frame::filled(32, 32, (255, 255, 255)));

        let green = Palette {
            off: (0, 0, 0),
            on: (0, 255, 0),
        };
        let out = reconstruct(&m, 32, 32, &green);
        assert_eq!(out, Frame::filled(32, 32, (0, 255, 0)));
    }

    #[test]
    fn white_color_round_trip() {
        let mut enc = GridEncoder::new(4, 4, GridMode::Color);
        let m = enc.encode_frame(&Frame::filled(16, 8, (255, 255, 255)));
        let out = reconstruct(&m, 16, 8, &Palette::default());
        assert_eq!(out, Frame::filled(16, 8, (255, 255, 255)));
    }

    #[test]
    fn non_divisible_size_leaves_black_border() {
        let m = GridMatrix::from_cells(1, 3, GridMode::Color, vec![GridCell::Color((9, 9, 9)); 3])
            .unwrap();
        let out = reconstruct(&m, 10, 2, &Palette::default());
        assert_eq!(out.pixel(8, 0), (9, 9, 9));
        assert_eq!(out.pixel(9, 0), (0, 0, 0));
        assert_eq!(out.pixel(9, 1), (0, 0, 0));
    }

    #[test]
    fn missing_cells_render_black() {
        let m = GridMatrix::from_cells(1, 1, GridMode::Binary, vec![GridCell::Binary(1)]).unwrap();
        let mut frame = Frame::filled(4, 4, (7, 7, 7));
        reconstruct_into(&m, 2, 2, &Palette::default(), &mut frame);
        assert_eq!(frame.pixel(0, 0), (255, 255, 255));
        assert_eq!(frame.pixel(3, 0), (0, 0, 0));
        assert_eq!(frame.pixel(3, 3), (0, 0, 0));
    }
}
