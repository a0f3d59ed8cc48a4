use crate::error::GridError;
use crate::frame::Frame;

/// Ordre des canaux d'un buffer externe (source vidéo ou sink d'affichage).
///
/// # Example
/// ```
/// use gv_core::pixel::ChannelOrder;
/// assert_eq!(ChannelOrder::Bgra.bytes_per_pixel(), 4);
/// assert_eq!(ChannelOrder::Rgb.bytes_per_pixel(), 3);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChannelOrder {
    /// R, G, B. The internal order.
    #[default]
    Rgb,
    /// B, G, R (OpenCV-style decoders).
    Bgr,
    /// R, G, B, A (ffmpeg `rgba`, `image` crate).
    Rgba,
    /// B, G, R, A.
    Bgra,
}

impl ChannelOrder {
    /// Octets par pixel.
    #[must_use]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgb | Self::Bgr => 3,
            Self::Rgba | Self::Bgra => 4,
        }
    }

    fn is_reversed(self) -> bool {
        matches!(self, Self::Bgr | Self::Bgra)
    }
}

/// Pixel buffer as exchanged with external collaborators.
#[derive(Clone, Debug)]
pub struct RawFrame {
    /// Packed pixels, row-major, no padding.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Channel layout of `data`.
    pub order: ChannelOrder,
}

/// Converts an external buffer to the internal RGB frame.
///
/// This is the single place where the source channel order is undone;
/// callers invoke it once per ingested frame.
///
/// # Errors
/// Returns [`GridError::InvalidBuffer`] if `raw.data` is shorter than
/// `width × height × bytes_per_pixel`.
///
/// # Example
/// ```
/// use gv_core::pixel::{normalize, ChannelOrder, RawFrame};
/// let raw = RawFrame { data: vec![10, 20, 30], width: 1, height: 1, order: ChannelOrder::Bgr };
/// let frame = normalize(&raw).unwrap();
/// assert_eq!(frame.pixel(0, 0), (30, 20, 10));
/// ```
pub fn normalize(raw: &RawFrame) -> Result<Frame, GridError> {
    let bpp = raw.order.bytes_per_pixel();
    let pixels = raw.width as usize * raw.height as usize;
    if raw.data.len() < pixels * bpp {
        return Err(GridError::InvalidBuffer {
            len: raw.data.len(),
            width: raw.width,
            height: raw.height,
        });
    }

    let mut frame = Frame::new(raw.width, raw.height);
    let reversed = raw.order.is_reversed();
    for (dst, src) in frame
        .data
        .chunks_exact_mut(3)
        .zip(raw.data.chunks_exact(bpp))
    {
        if reversed {
            dst[0] = src[2];
            dst[1] = src[1];
            dst[2] = src[0];
        } else {
            dst.copy_from_slice(&src[..3]);
        }
    }
    Ok(frame)
}

/// Converts an internal RGB frame to the layout a sink expects.
///
/// Invoked once per rendered frame. Alpha, when present, is opaque.
///
/// # Example
/// ```
/// use gv_core::frame::Frame;
/// use gv_core::pixel::{denormalize, ChannelOrder};
/// let mut frame = Frame::new(1, 1);
/// frame.set_pixel(0, 0, (1, 2, 3));
/// let raw = denormalize(&frame, ChannelOrder::Bgra);
/// assert_eq!(raw.data, vec![3, 2, 1, 255]);
/// ```
#[must_use]
pub fn denormalize(frame: &Frame, order: ChannelOrder) -> RawFrame {
    let bpp = order.bytes_per_pixel();
    let mut data = vec![255u8; frame.width as usize * frame.height as usize * bpp];
    let reversed = order.is_reversed();
    for (dst, src) in data.chunks_exact_mut(bpp).zip(frame.data.chunks_exact(3)) {
        if reversed {
            dst[0] = src[2];
            dst[1] = src[1];
            dst[2] = src[0];
        } else {
            dst[..3].copy_from_slice(src);
        }
    }
    RawFrame {
        data,
        width: frame.width,
        height: frame.height,
        order,
    }
}
