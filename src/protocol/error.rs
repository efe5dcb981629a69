//! Error taxonomy untuk codec dbin
//!
//! Semua kegagalan dikembalikan sebagai value, tidak pernah panic.
//! Validate dan decode hanya melaporkan pelanggaran PERTAMA sesuai
//! urutan check masing-masing.

use thiserror::Error;

/// Closed error set untuk seluruh operasi codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DbinError {
    /// Required input hilang atau tidak masuk akal (mis. payload source
    /// lebih pendek dari msg_len, atau nbits di luar [1, 32]).
    #[error("missing or invalid parameter")]
    InvalidParameter,

    /// Nilai field melebihi lebar bit-nya di wire.
    #[error("field value exceeds its wire width")]
    RangeViolation,

    /// Output buffer terlalu kecil, atau input frame terpotong.
    #[error("buffer too small or frame truncated")]
    BufferInsufficient,

    /// Magic number bukan 0xDB1.
    #[error("bad magic number")]
    MagicMismatch,

    /// Versi protokol tidak didukung.
    #[error("unsupported protocol version")]
    VersionMismatch,

    /// Struktur frame melanggar protokol: reserved bits nonzero, byte
    /// ops pada cursor yang belum aligned, atau payload pada frame
    /// kontrol (ACK/PING/PONG).
    #[error("malformed frame structure")]
    FormatViolation,
}

pub type Result<T> = std::result::Result<T, DbinError>;
