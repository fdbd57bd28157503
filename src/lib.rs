//! Rust version of the standard BZIP2 library.
//!
//! Provides safe, streaming compression and decompression in the bzip2 format. Compression is
//! push driven through `BzEncoder`, which implements `Write`; decompression is pull driven through
//! `BzDecoder`, which implements `Read`.
//!
//! ```no_run
//! use std::io::{Read, Write};
//! use bzstream::{BzDecoder, BzEncoder};
//!
//! let mut enc = BzEncoder::new(Vec::new(), 9)?;
//! enc.write_all(b"hello hello hello")?;
//! let packed = enc.finish()?;
//!
//! let mut text = String::new();
//! BzDecoder::new(&packed[..]).read_to_string(&mut text)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The library logs through the `log` facade and never installs a logger.
//!
#![warn(rust_2018_idioms)]

pub mod bitstream;
pub mod bwt_algorithms;
pub mod compression;
pub mod error;
pub mod huffman_coding;
pub mod tools;

pub use compression::compress::{compress, BzEncoder};
pub use compression::decompress::{decompress, BzDecoder};
pub use error::{Bz2Error, ErrorKind};
