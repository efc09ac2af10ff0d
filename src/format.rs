//! Pixel formats and the transport-to-renderer format map.
//!
//! The transport pipeline hands frames over in one of a small set of
//! [`PixelFormat`]s. Each of them maps to exactly one [`NativeFormat`]
//! understood by the render backend; the mapping is static data plus a
//! lookup function. The list of formats advertised to the pipeline is
//! derived from the same table, optionally extended with the experimental
//! 10-bit RGB format.

use smallvec::SmallVec;

/// Pixel formats accepted from the transport pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Planar YUV 4:2:0, 8-bit (three planes, chroma subsampled 2x2).
    I420,
    /// Packed YUV 4:2:2, U-Y-V-Y byte order.
    Uyvy,
    /// Packed YUV 4:2:2, Y-U-Y-V byte order.
    Yuyv,
    /// Packed RGB, 24 bits per pixel.
    Rgb24,
    /// Packed BGR, 24 bits per pixel.
    Bgr24,
    /// Packed RGBA, 32 bits per pixel.
    Rgba32,
    /// Packed 10-bit RGB in a 32-bit word (experimental).
    R10k,
}

impl PixelFormat {
    /// Bytes per line of one row of pixels, dense packing.
    pub fn linesize(self, width: u32) -> usize {
        let width = width as usize;
        match self {
            PixelFormat::I420 => width,
            PixelFormat::Uyvy | PixelFormat::Yuyv => width * 2,
            PixelFormat::Rgb24 | PixelFormat::Bgr24 => width * 3,
            PixelFormat::Rgba32 | PixelFormat::R10k => width * 4,
        }
    }

    /// Total bytes of one densely packed frame.
    pub fn frame_size(self, width: u32, height: u32) -> usize {
        let pixels = width as usize * height as usize;
        match self {
            PixelFormat::I420 => pixels * 3 / 2,
            _ => self.linesize(width) * height as usize,
        }
    }

    /// Whether the format stores planes separately rather than interleaved.
    pub fn is_planar(self) -> bool {
        matches!(self, PixelFormat::I420)
    }

    /// Short lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            PixelFormat::I420 => "i420",
            PixelFormat::Uyvy => "uyvy",
            PixelFormat::Yuyv => "yuyv",
            PixelFormat::Rgb24 => "rgb24",
            PixelFormat::Bgr24 => "bgr24",
            PixelFormat::Rgba32 => "rgba32",
            PixelFormat::R10k => "r10k",
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Texture formats understood by the render backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeFormat {
    /// Planar YUV 4:2:0.
    Iyuv,
    /// Packed UYVY.
    Uyvy,
    /// Packed YUYV.
    Yuy2,
    /// Packed 24-bit RGB.
    Rgb24,
    /// Packed 24-bit BGR.
    Bgr24,
    /// Packed 32-bit RGBA.
    Rgba32,
    /// Packed 10-bit RGB in ARGB2101010 layout.
    Argb2101010,
}

/// Transport format to native texture format, one row per supported format.
const FORMAT_MAP: [(PixelFormat, NativeFormat); 6] = [
    (PixelFormat::I420, NativeFormat::Iyuv),
    (PixelFormat::Uyvy, NativeFormat::Uyvy),
    (PixelFormat::Yuyv, NativeFormat::Yuy2),
    (PixelFormat::Rgb24, NativeFormat::Rgb24),
    (PixelFormat::Bgr24, NativeFormat::Bgr24),
    (PixelFormat::Rgba32, NativeFormat::Rgba32),
];

/// Look up the native texture format for a transport pixel format.
///
/// Returns `None` for formats no renderer texture exists for.
pub fn native_format(format: PixelFormat) -> Option<NativeFormat> {
    if format == PixelFormat::R10k {
        return Some(NativeFormat::Argb2101010);
    }
    FORMAT_MAP
        .iter()
        .find(|(pf, _)| *pf == format)
        .map(|(_, native)| *native)
}

/// The pixel formats this consumer accepts.
///
/// `extended` additionally advertises the experimental 10-bit RGB format.
pub fn supported_formats(extended: bool) -> SmallVec<[PixelFormat; 8]> {
    let mut formats: SmallVec<[PixelFormat; 8]> =
        FORMAT_MAP.iter().map(|(pf, _)| *pf).collect();
    if extended {
        formats.push(PixelFormat::R10k);
    }
    formats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_supported_format_maps() {
        for format in supported_formats(true) {
            assert!(native_format(format).is_some(), "{format} has no mapping");
        }
    }

    #[test]
    fn test_r10k_is_opt_in() {
        assert!(!supported_formats(false).contains(&PixelFormat::R10k));
        assert!(supported_formats(true).contains(&PixelFormat::R10k));
    }

    #[test]
    fn test_linesize() {
        assert_eq!(PixelFormat::I420.linesize(1920), 1920);
        assert_eq!(PixelFormat::Uyvy.linesize(1920), 3840);
        assert_eq!(PixelFormat::Rgb24.linesize(1920), 5760);
        assert_eq!(PixelFormat::Rgba32.linesize(1920), 7680);
    }

    #[test]
    fn test_frame_size() {
        assert_eq!(PixelFormat::I420.frame_size(1920, 1080), 1920 * 1080 * 3 / 2);
        assert_eq!(PixelFormat::Yuyv.frame_size(1920, 1080), 1920 * 1080 * 2);
    }

    #[test]
    fn test_only_i420_is_planar() {
        for format in supported_formats(true) {
            assert_eq!(format.is_planar(), format == PixelFormat::I420);
        }
    }
}
