//! In-place linear-blend deinterlacing for byte-packed formats.

use crate::format::PixelFormat;

/// Blend each pair of adjacent lines in place.
///
/// Works on formats whose samples are independent bytes; planar and
/// bit-packed formats are not supported and return `false` so the caller
/// can report and skip the step.
pub(crate) fn deinterlace_in_place(
    format: PixelFormat,
    data: &mut [u8],
    pitch: usize,
    height: usize,
) -> bool {
    match format {
        PixelFormat::Uyvy
        | PixelFormat::Yuyv
        | PixelFormat::Rgb24
        | PixelFormat::Bgr24
        | PixelFormat::Rgba32 => {}
        PixelFormat::I420 | PixelFormat::R10k => return false,
    }
    if pitch == 0 || data.len() < pitch * height {
        return false;
    }

    for pair in data[..pitch * height].chunks_exact_mut(pitch * 2) {
        let (top, bottom) = pair.split_at_mut(pitch);
        for (a, b) in top.iter_mut().zip(bottom.iter_mut()) {
            let blended = ((*a as u16 + *b as u16) / 2) as u8;
            *a = blended;
            *b = blended;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blends_line_pairs() {
        // 2 pixels wide UYVY (4 bytes/line), 4 lines.
        let mut data = vec![
            10, 10, 10, 10, //
            30, 30, 30, 30, //
            0, 0, 0, 0, //
            100, 100, 100, 100,
        ];
        assert!(deinterlace_in_place(PixelFormat::Uyvy, &mut data, 4, 4));
        assert_eq!(&data[..4], &[20, 20, 20, 20]);
        assert_eq!(&data[4..8], &[20, 20, 20, 20]);
        assert_eq!(&data[8..12], &[50, 50, 50, 50]);
        assert_eq!(&data[12..], &[50, 50, 50, 50]);
    }

    #[test]
    fn test_odd_trailing_line_untouched() {
        let mut data = vec![8, 8, 24, 24, 90, 90];
        assert!(deinterlace_in_place(PixelFormat::Rgb24, &mut data, 2, 3));
        assert_eq!(data, vec![16, 16, 16, 16, 90, 90]);
    }

    #[test]
    fn test_unsupported_formats() {
        let mut data = vec![0; 64];
        assert!(!deinterlace_in_place(PixelFormat::I420, &mut data, 8, 8));
        assert!(!deinterlace_in_place(PixelFormat::R10k, &mut data, 8, 2));
    }

    #[test]
    fn test_short_buffer_rejected() {
        let mut data = vec![0; 7];
        assert!(!deinterlace_in_place(PixelFormat::Yuyv, &mut data, 4, 2));
    }
}
