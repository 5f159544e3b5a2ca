/*!
    Pixel format types.
*/

/**
    Video pixel formats.

    A subset of the formats commonly produced by decoders. Streams in any
    other format still decode and convert; they are simply reported without
    a named format.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    /// Planar YUV 4:2:0, 12bpp (most common video format)
    Yuv420p,
    /// Planar YUV 4:2:0 with full-range ("JPEG") levels
    Yuvj420p,
    /// Planar YUV 4:2:2, 16bpp
    Yuv422p,
    /// Planar YUV 4:4:4, 24bpp
    Yuv444p,
    /// Planar YUV 4:2:0, 10-bit
    Yuv420p10,
    /// Semi-planar YUV 4:2:0, 12bpp
    Nv12,
    /// Single 8-bit luma plane
    Gray8,
    /// Packed RGB, 24bpp
    Rgb24,
    /// Packed BGR, 24bpp (the output layout of this crate family)
    Bgr24,
    /// Packed RGBA, 32bpp
    Rgba,
    /// Packed BGRA, 32bpp
    Bgra,
}

impl PixelFormat {
    /**
        Returns the number of bytes per pixel for packed formats,
        or `None` for planar ones.
    */
    pub const fn bytes_per_pixel(self) -> Option<usize> {
        match self {
            Self::Gray8 => Some(1),
            Self::Rgb24 | Self::Bgr24 => Some(3),
            Self::Rgba | Self::Bgra => Some(4),
            _ => None,
        }
    }

    /**
        Returns true if this is a planar (or semi-planar) format.
    */
    pub const fn is_planar(self) -> bool {
        match self {
            Self::Yuv420p
            | Self::Yuvj420p
            | Self::Yuv422p
            | Self::Yuv444p
            | Self::Yuv420p10
            | Self::Nv12 => true,
            Self::Gray8 | Self::Rgb24 | Self::Bgr24 | Self::Rgba | Self::Bgra => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_formats_report_pixel_size() {
        assert_eq!(PixelFormat::Bgr24.bytes_per_pixel(), Some(3));
        assert_eq!(PixelFormat::Bgra.bytes_per_pixel(), Some(4));
        assert_eq!(PixelFormat::Gray8.bytes_per_pixel(), Some(1));
        assert_eq!(PixelFormat::Yuv420p.bytes_per_pixel(), None);
    }

    #[test]
    fn pixel_format_is_planar() {
        assert!(PixelFormat::Yuv420p.is_planar());
        assert!(PixelFormat::Nv12.is_planar());
        assert!(!PixelFormat::Bgr24.is_planar());
        assert!(!PixelFormat::Gray8.is_planar());
    }
}
