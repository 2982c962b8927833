//! Image header probing.
//!
//! Only the bytes needed to learn the pixel dimensions are read. A file
//! extension picks the decoder to try first; anything else goes through
//! magic-byte sniffing.
use std::{
    fs::File,
    io::{BufRead, BufReader, Seek, SeekFrom},
    path::Path,
};

use image::{ImageFormat, ImageReader};
use log::debug;

use crate::error::{ProbeError, Result};

/// Pixel dimensions of an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageHeader {
    pub width: u32,
    pub height: u32,
}

impl ImageHeader {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Formats recognised from a file extension.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Tiff,
    WebP,
}

impl ImageKind {
    /// Maps an extension (without the dot, any ASCII case) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        const TABLE: &[(&str, ImageKind)] = &[
            ("jpg", ImageKind::Jpeg),
            ("jpeg", ImageKind::Jpeg),
            ("png", ImageKind::Png),
            ("gif", ImageKind::Gif),
            ("bmp", ImageKind::Bmp),
            ("tif", ImageKind::Tiff),
            ("tiff", ImageKind::Tiff),
            ("webp", ImageKind::WebP),
        ];
        TABLE
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(ext))
            .map(|(_, kind)| *kind)
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn format(self) -> ImageFormat {
        match self {
            ImageKind::Jpeg => ImageFormat::Jpeg,
            ImageKind::Png => ImageFormat::Png,
            ImageKind::Gif => ImageFormat::Gif,
            ImageKind::Bmp => ImageFormat::Bmp,
            ImageKind::Tiff => ImageFormat::Tiff,
            ImageKind::WebP => ImageFormat::WebP,
        }
    }
}

/// Reads the dimensions of the image behind `reader`.
///
/// With a `hint` the matching decoder runs first. If there is no hint or that
/// decoder rejects the data, the stream is rewound and the format is guessed
/// from its leading bytes. Fails with [`ProbeError::UnsupportedFormat`] when
/// neither path yields a header.
pub fn read_header<R: BufRead + Seek>(
    mut reader: R,
    hint: Option<ImageKind>,
) -> Result<ImageHeader> {
    let start = reader.stream_position()?;

    if let Some(kind) = hint {
        match ImageReader::with_format(&mut reader, kind.format()).into_dimensions() {
            Ok((width, height)) => return Ok(ImageHeader { width, height }),
            Err(err) => debug!("{kind:?} decoder rejected input ({err}), sniffing format"),
        }
        reader.seek(SeekFrom::Start(start))?;
    }

    let guessed = ImageReader::new(&mut reader).with_guessed_format()?;
    let Some(format) = guessed.format() else {
        return Err(ProbeError::UnsupportedFormat("no known image signature".into()));
    };
    debug!("sniffed format {format:?}");
    let (width, height) = guessed
        .into_dimensions()
        .map_err(|err| ProbeError::UnsupportedFormat(err.to_string()))?;
    Ok(ImageHeader { width, height })
}

/// Opens `path` and reads its image header, using the extension as a hint.
pub fn open_header(path: &Path) -> Result<ImageHeader> {
    let file = File::open(path).map_err(|source| ProbeError::FileOpen {
        path: path.to_path_buf(),
        source,
    })?;
    read_header(BufReader::new(file), ImageKind::from_path(path))
}
