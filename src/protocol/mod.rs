//! Protocol Layer: Bit-Level Binary Encoding
//!
//! Prinsip desain:
//! - Bit-packed header: 92 bits dalam 12 bytes, MSB-first
//! - Fixed field order: encode dan decode membaca field dengan urutan sama
//! - No allocation: semua operasi ke/dari pre-allocated buffer

mod bitio;
mod codec;
mod error;
mod message;

pub use bitio::{BitReader, BitWriter};
pub use codec::{decode, encode, validate};
pub use error::{DbinError, Result};
pub use message::{Message, MessageType, HEADER_BITS, HEADER_SIZE, MAGIC, MAX_ID, MAX_MSG_LEN, VERSION};
