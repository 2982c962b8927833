use std::fmt;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

use cellprobe::{open_header, read_header, ImageHeader};

/// Where an image comes from.
#[derive(Debug, PartialEq)]
pub enum ImageInput {
    File(PathBuf),
    Stdin(Vec<u8>),
}

impl ImageInput {
    pub fn header(&self) -> cellprobe::Result<ImageHeader> {
        match self {
            ImageInput::File(path) => open_header(path),
            ImageInput::Stdin(bytes) => read_header(Cursor::new(bytes), None),
        }
    }

    pub fn is_stdin(&self) -> bool {
        matches!(self, ImageInput::Stdin(_))
    }
}

impl fmt::Display for ImageInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageInput::File(path) => write!(f, "{}", path.display()),
            ImageInput::Stdin(_) => f.write_str("<stdin>"),
        }
    }
}

/// Resolves the command line files into inputs.
///
/// `-` stands for standard input. Without any file, standard input is used if
/// something was piped into it; `None` means there is nothing to read.
pub fn collect<R: Read>(
    files: &[PathBuf],
    stdin: &mut R,
    stdin_is_terminal: bool,
) -> io::Result<Option<Vec<ImageInput>>> {
    if files.is_empty() {
        if stdin_is_terminal {
            return Ok(None);
        }
        let bytes = read_all(stdin)?;
        return Ok((!bytes.is_empty()).then(|| vec![ImageInput::Stdin(bytes)]));
    }

    files
        .iter()
        .map(|path| {
            if path == Path::new("-") {
                read_all(stdin).map(ImageInput::Stdin)
            } else {
                Ok(ImageInput::File(path.clone()))
            }
        })
        .collect::<io::Result<Vec<_>>>()
        .map(Some)
}

fn read_all<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    Ok(buf)
}
