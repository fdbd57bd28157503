//! The tools module provides several helper functions for the Rust version of the standard BZIP2 library.
//!
//! BZIP2 is a block-oriented approach to compress data.
//!
//! The tools are:
//! - cli: Command line interface for BZIP2.
//! - crc: CRC32 checksum for BZIP2, both block and stream versions.
//! - rle1: Run-Length-Encoding phase 1 for BZIP2, both directions.
//! - rle2_mtf: Move-To-Front transform and Run-Length-Encoding phase 2 (integrated for speed) for BZIP2.
//! - rle2_mtf_decode: The inverse of rle2_mtf, fed one symbol at a time.
//! - symbol_map: Encode and decode the symbol map used in BZIP2.
//! - tables: Constants of the format, and the random number table for randomised blocks.
//!
pub mod cli;
pub mod crc;
pub mod rle1;
pub mod rle2_mtf;
pub mod rle2_mtf_decode;
pub mod symbol_map;
pub mod tables;
