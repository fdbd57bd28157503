//! The bwt_algorithms module forms the critical sorting subsystem for the Rust version of the standard BZIP2 library.
//!
//! BZIP2 uses the Burrow-Wheeler Transform (BWT) to prepare data for compression. This transform alters the data in such
//! a way that runs of similar bytes are more likely to occur. This allows for more effective compression.
//!
//! The Burrow-Wheeler Transform requires "computationally expensive" sorting. Blocks under 4000 bytes are shell sorted
//! directly. Larger blocks are radix sorted on their first two bytes, then each bucket is finished with a three-way
//! quicksort, dropping to the shell sort for small or deep partitions. Sorting highly repetitive data this way can take
//! a very long time, so the first attempt runs on a work budget. When the budget runs out the block is randomised and
//! sorted again.
//!
//! Decoding the BWT is far cheaper: a single pass to link each position to its successor, then a walk along the links.
//!
pub mod block_sort;
pub mod bwt_decode;
pub mod main_gtu;
pub mod main_q_sort3;
pub mod main_simple_sort;
pub mod main_sort;
