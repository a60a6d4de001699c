//! Frame comparison against reference PNGs
//!
//! Frames are compared in the 15-bit colour space the GBA renders in: each
//! 8-bit channel keeps its top five bits, widened back to eight the way
//! the hardware does. Alpha is ignored.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use cl_engine::Pixel;
use cl_runner::VideoBufferView;

use crate::error::{HarnessError, Result};

/// Result of comparing a frame to a reference image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMatch {
    Match,
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    /// First differing pixel in row-major order
    PixelMismatch { x: u32, y: u32 },
}

impl ImageMatch {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match)
    }
}

/// Reduce a channel to 5 bits and widen it back
pub fn quantize(channel: u8) -> u8 {
    ((((channel as u32 >> 3) << 3) * 0x21) >> 5) as u8
}

/// Buffer pixel as opaque R, G, B, A bytes
pub fn pixel_to_rgba(pixel: Pixel) -> [u8; 4] {
    let [r, g, b, _] = pixel.to_le_bytes();
    [r, g, b, 0xFF]
}

fn same_colour(a: [u8; 4], b: [u8; 4]) -> bool {
    a[..3].iter().zip(&b[..3]).all(|(&a, &b)| quantize(a) == quantize(b))
}

/// Compare the frame to the PNG at `path`.
///
/// Errors if the image cannot be read; a missing file surfaces as
/// [`HarnessError::Io`] with kind `NotFound`.
pub fn compare_frame(path: &Path, frame: VideoBufferView<'_>) -> Result<ImageMatch> {
    let (width, height, expected) = read_rgba(path)?;

    if (width, height) != frame.size() {
        return Ok(ImageMatch::SizeMismatch {
            expected: (width, height),
            actual: frame.size(),
        });
    }

    let mismatch = frame
        .pixels()
        .iter()
        .zip(&expected)
        .position(|(&actual, &expected)| !same_colour(pixel_to_rgba(actual), expected));

    Ok(match mismatch {
        Some(index) => ImageMatch::PixelMismatch {
            x: index as u32 % width,
            y: index as u32 / width,
        },
        None => ImageMatch::Match,
    })
}

/// Save the frame as an RGBA PNG
pub fn write_frame(path: &Path, frame: VideoBufferView<'_>) -> Result<()> {
    let encode_err = |source| HarnessError::Encode {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path)?;
    let w = BufWriter::new(file);
    let mut encoder = png::Encoder::new(w, frame.width(), frame.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().map_err(encode_err)?;

    let rgba: Vec<u8> = frame
        .pixels()
        .iter()
        .flat_map(|&pixel| pixel_to_rgba(pixel))
        .collect();

    writer.write_image_data(&rgba).map_err(encode_err)?;
    writer.finish().map_err(encode_err)?;
    Ok(())
}

fn read_rgba(path: &Path) -> Result<(u32, u32, Vec<[u8; 4]>)> {
    let decode_err = |source| HarnessError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path)?;
    let mut decoder = png::Decoder::new(BufReader::new(file));
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info().map_err(decode_err)?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).map_err(decode_err)?;
    let data = &buf[..info.buffer_size()];

    if info.bit_depth != png::BitDepth::Eight {
        return Err(HarnessError::UnsupportedImage {
            path: path.to_path_buf(),
            detail: format!("bit depth {:?}", info.bit_depth),
        });
    }

    let pixels = match info.color_type {
        png::ColorType::Rgba => data
            .chunks_exact(4)
            .map(|c| [c[0], c[1], c[2], c[3]])
            .collect(),
        png::ColorType::Rgb => data
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2], 0xFF])
            .collect(),
        png::ColorType::GrayscaleAlpha => data
            .chunks_exact(2)
            .map(|c| [c[0], c[0], c[0], c[1]])
            .collect(),
        png::ColorType::Grayscale => data.iter().map(|&g| [g, g, g, 0xFF]).collect(),
        other => {
            return Err(HarnessError::UnsupportedImage {
                path: path.to_path_buf(),
                detail: format!("colour type {:?}", other),
            })
        }
    };

    Ok((info.width, info.height, pixels))
}
