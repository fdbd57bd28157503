//! Errors returned by the encoder and decoder.
//!
//! BZIP2 has no way to recover from corruption, so every error here is final for the stream
//! that produced it. `Bz2Error::kind()` groups the variants into the broad classes a caller
//! usually cares about.

use std::io;

use thiserror::Error;

/// Broad classification of a `Bz2Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad stream or block magic.
    Format,
    /// Block or stream CRC mismatch.
    Integrity,
    /// A decoded symbol, MTF rank or table value is out of range.
    AlphabetRange,
    /// The source ran dry in the middle of the stream.
    UnexpectedEnd,
    /// Invalid construction parameters.
    Configuration,
    /// Error from the underlying reader or writer.
    Io,
    /// An encoder sanity check failed.
    Internal,
}

#[derive(Debug, Error)]
pub enum Bz2Error {
    #[error("not a bzip2 stream (bad stream header)")]
    BadStreamHeader,
    #[error("bad block header")]
    BadBlockHeader,
    #[error("crc error in block {block}: stored {stored:#010x}, computed {computed:#010x}")]
    BlockCrc {
        block: u32,
        stored: u32,
        computed: u32,
    },
    #[error("stream crc error: stored {stored:#010x}, computed {computed:#010x}")]
    StreamCrc { stored: u32, computed: u32 },
    #[error("bzip data error: {0}")]
    Data(&'static str),
    #[error("unexpected end of compressed stream")]
    UnexpectedEof,
    #[error("invalid block size {0}, must be 1..=9")]
    InvalidBlockSize(u32),
    #[error("invalid work factor {0}, must be 1..=250")]
    InvalidWorkFactor(u32),
    #[error("internal encoder error: {0}")]
    Internal(&'static str),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Bz2Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Bz2Error::BadStreamHeader | Bz2Error::BadBlockHeader => ErrorKind::Format,
            Bz2Error::BlockCrc { .. } | Bz2Error::StreamCrc { .. } => ErrorKind::Integrity,
            Bz2Error::Data(_) => ErrorKind::AlphabetRange,
            Bz2Error::UnexpectedEof => ErrorKind::UnexpectedEnd,
            Bz2Error::InvalidBlockSize(_) | Bz2Error::InvalidWorkFactor(_) => {
                ErrorKind::Configuration
            }
            Bz2Error::Internal(_) => ErrorKind::Internal,
            Bz2Error::Io(_) => ErrorKind::Io,
        }
    }
}

impl From<Bz2Error> for io::Error {
    fn from(e: Bz2Error) -> Self {
        match e {
            Bz2Error::Io(inner) => inner,
            Bz2Error::UnexpectedEof => io::Error::new(io::ErrorKind::UnexpectedEof, e),
            other => io::Error::new(io::ErrorKind::InvalidData, other),
        }
    }
}
