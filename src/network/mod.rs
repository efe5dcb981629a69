//! Network Layer: Framed Transport
//!
//! Satu dbin frame per transport frame, dengan length prefix 2-byte
//! big-endian (max 65535). Codec sendiri tidak tahu apa-apa soal
//! framing ini - layer ini hanya konsumen dari encode/decode.
//!
//! Dua sisi:
//! - [`FramedStream`]: blocking client transport, satu frame penuh
//!   dikirim/diterima per panggilan
//! - [`Server`]: event-driven echo/ack server di atas mio

mod connection;
mod framed;
mod server;

pub use connection::Connection;
pub use framed::{FramedStream, MAX_FRAME_LEN};
pub use server::Server;
