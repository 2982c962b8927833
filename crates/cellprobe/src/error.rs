use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("cannot open {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("not a terminal (tried {0})")]
    NotATerminal(String),
    #[error("terminal size query failed: {0}")]
    IoCtl(#[source] nix::Error),
    #[error("couldn't set up the terminal to listen for its reply: {0}")]
    TerminalSetup(#[source] io::Error),
    #[error("unexpected input from terminal: {0}")]
    TerminalProtocol(#[source] io::Error),
    #[error("malformed cursor position reply: \"{0}\"")]
    MalformedReply(String),
    #[error("couldn't restore the terminal mode ({0}), fix it manually by typing reset")]
    TerminalRestore(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, ProbeError>;
