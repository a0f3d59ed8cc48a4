use gv_core::frame::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;

/// Largest rect inside `area` keeping the frame's aspect ratio, centred.
///
/// One terminal cell holds two vertical pixels (half-block), so the
/// area is `width × 2·height` pixels tall for fitting purposes.
///
/// # Example
/// ```
/// use ratatui::layout::Rect;
/// use gv_render::canvas::fit_area;
/// // 80x60 frame in an 80x20 terminal → 40 px tall → 53 cols wide
/// let r = fit_area(Rect::new(0, 0, 80, 20), 80, 60);
/// assert_eq!((r.width, r.height), (53, 20));
/// ```
#[must_use]
pub fn fit_area(area: Rect, frame_w: u32, frame_h: u32) -> Rect {
    if frame_w == 0 || frame_h == 0 || area.width == 0 || area.height == 0 {
        return Rect::new(area.x, area.y, 0, 0);
    }
    let avail_w = u64::from(area.width);
    let avail_h = u64::from(area.height) * 2;
    let (fw, fh) = (u64::from(frame_w), u64::from(frame_h));

    let (w, h_px) = if avail_w * fh <= avail_h * fw {
        (avail_w, (avail_w * fh / fw).max(1))
    } else {
        ((avail_h * fw / fh).max(1), avail_h)
    };
    let h = h_px.div_ceil(2).min(u64::from(area.height));

    let w = u16::try_from(w).unwrap_or(area.width);
    let h = u16::try_from(h).unwrap_or(area.height);
    Rect::new(
        area.x + (area.width - w) / 2,
        area.y + (area.height - h) / 2,
        w,
        h,
    )
}

/// Écrit une frame en demi-blocs (▄) dans un `ratatui::Buffer`.
///
/// Top pixel → bg, bottom pixel → fg. Nearest-neighbour sampling,
/// letterboxed with [`fit_area`].
pub fn render_frame(buf: &mut Buffer, area: Rect, frame: &Frame) {
    let target = fit_area(area, frame.width, frame.height);
    if target.width == 0 || target.height == 0 {
        return;
    }
    let pixel_w = u32::from(target.width);
    let pixel_h = u32::from(target.height) * 2;
    let max_x = frame.width.saturating_sub(1);
    let max_y = frame.height.saturating_sub(1);

    for cy in 0..target.height {
        for cx in 0..target.width {
            let px = (u32::from(cx) * frame.width / pixel_w).min(max_x);
            let py_top = (u32::from(cy) * 2 * frame.height / pixel_h).min(max_y);
            let py_bot = ((u32::from(cy) * 2 + 1) * frame.height / pixel_h).min(max_y);

            let (tr, tg, tb) = frame.pixel(px, py_top);
            let (br, bg, bb) = frame.pixel(px, py_bot);

            if let Some(cell) = buf.cell_mut((target.x + cx, target.y + cy)) {
                cell.set_char('▄')
                    .set_fg(Color::Rgb(br, bg, bb))
                    .set_bg(Color::Rgb(tr, tg, tb));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_keeps_aspect_and_centres() {
        let r = fit_area(Rect::new(0, 0, 100, 10), 40, 40);
        // 20 px tall → 20 cols wide, centred horizontally
        assert_eq!(r, Rect::new(40, 0, 20, 10));
    }

    #[test]
    fn empty_frame_fits_to_nothing() {
        assert_eq!(fit_area(Rect::new(3, 4, 10, 10), 0, 5).width, 0);
    }

    #[test]
    fn halfblock_top_is_background() {
        // 1x2 frame: top red, bottom blue
        let mut frame = Frame::new(1, 2);
        frame.set_pixel(0, 0, (255, 0, 0));
        frame.set_pixel(0, 1, (0, 0, 255));
        let area = Rect::new(0, 0, 1, 1);
        let mut buf = Buffer::empty(area);
        render_frame(&mut buf, area, &frame);
        let cell = &buf[(0, 0)];
        assert_eq!(cell.symbol(), "▄");
        assert_eq!(cell.bg, Color::Rgb(255, 0, 0));
        assert_eq!(cell.fg, Color::Rgb(0, 0, 255));
    }
}
