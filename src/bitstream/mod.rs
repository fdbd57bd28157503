//! The bitstream module forms the I/O subsystem for the Rust version of the standard BZIP2 library.
//!
//! BZIP2 packs everything most-significant bit first, with no regard for byte boundaries until the
//! very end of the stream. The writer queues bits and hands whole bytes to any `std::io::Write`;
//! the reader pulls bytes from any `std::io::Read` only as bits are requested.
//!
//! This I/O subsystem is designed to efficiently interface with the other modules within BZIP2. It is not intended for
//! more general use.
//!
pub mod bitreader;
pub mod bitwriter;
