//! dbin - Compact Bit-Packed Message Codec
//!
//! Prinsip desain:
//! - Bit-Packed: Header 92-bit, field widths non-byte-aligned
//! - Zero-Copy: Payload hasil decode adalah borrow dari input buffer
//! - No-Allocation: Encode/decode langsung ke/dari caller buffer

pub mod network;
pub mod protocol;
