//! Blocking framed transport untuk sisi client
//!
//! Pre-allocated receive buffer, tidak ada alokasi per frame.
//! `read_exact`/`write_all` sudah meng-handle retry pada
//! `ErrorKind::Interrupted`, jadi disiplin EINTR-loop ada di std.

use std::io::{self, Read, Write};
use std::net::TcpStream;

use tracing::trace;

/// Length prefix 2-byte BE membatasi frame ke 65535 bytes.
pub const MAX_FRAME_LEN: usize = 65535;

/// Blocking `TcpStream` wrapper dengan length-prefixed framing.
pub struct FramedStream {
    stream: TcpStream,
    recv_buf: Box<[u8]>,
}

impl FramedStream {
    /// Wrap stream yang sudah terkoneksi.
    pub fn new(stream: TcpStream) -> io::Result<Self> {
        // Nagle off: frame kecil harus langsung jalan
        stream.set_nodelay(true)?;
        Ok(Self {
            stream,
            recv_buf: vec![0u8; MAX_FRAME_LEN].into_boxed_slice(),
        })
    }

    /// Connect lalu wrap.
    pub fn connect(addr: &str) -> io::Result<Self> {
        Self::new(TcpStream::connect(addr)?)
    }

    /// Kirim satu frame utuh: `[len_hi][len_lo][frame bytes...]`.
    pub fn send_frame(&mut self, frame: &[u8]) -> io::Result<()> {
        if frame.len() > MAX_FRAME_LEN {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "frame exceeds 2-byte length prefix",
            ));
        }
        let prefix = (frame.len() as u16).to_be_bytes();
        self.stream.write_all(&prefix)?;
        self.stream.write_all(frame)?;
        trace!(len = frame.len(), "frame sent");
        Ok(())
    }

    /// Terima satu frame utuh. `Ok(None)` saat peer menutup koneksi
    /// dengan bersih (zero-length read di batas frame).
    pub fn recv_frame(&mut self) -> io::Result<Option<&[u8]>> {
        let mut prefix = [0u8; 2];

        // Byte pertama dibaca manual supaya clean close terdeteksi;
        // EOF di tengah frame tetap error.
        let mut first = [0u8; 1];
        loop {
            match self.stream.read(&mut first) {
                Ok(0) => return Ok(None),
                Ok(_) => break,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        prefix[0] = first[0];
        self.stream.read_exact(&mut prefix[1..])?;

        let len = u16::from_be_bytes(prefix) as usize;
        self.stream.read_exact(&mut self.recv_buf[..len])?;
        trace!(len, "frame received");
        Ok(Some(&self.recv_buf[..len]))
    }

    /// Underlying stream (untuk timeout config dsb).
    pub fn stream(&self) -> &TcpStream {
        &self.stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    #[test]
    fn test_send_recv_roundtrip() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let echo = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut conn = FramedStream::new(stream).unwrap();
            while let Some(frame) = conn.recv_frame().unwrap() {
                let frame = frame.to_vec();
                conn.send_frame(&frame).unwrap();
            }
        });

        let mut client = FramedStream::connect(&addr.to_string()).unwrap();
        client.send_frame(b"hello dbin").unwrap();
        assert_eq!(client.recv_frame().unwrap().unwrap(), b"hello dbin");

        // Frame kosong tetap frame yang sah
        client.send_frame(b"").unwrap();
        assert_eq!(client.recv_frame().unwrap().unwrap(), b"");

        drop(client);
        echo.join().unwrap();
    }

    #[test]
    fn test_oversized_frame_rejected() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let mut client = FramedStream::connect(&addr.to_string()).unwrap();

        let big = vec![0u8; MAX_FRAME_LEN + 1];
        let err = client.send_frame(&big).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn test_clean_close_returns_none() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let closer = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            drop(stream);
        });

        let mut client = FramedStream::connect(&addr.to_string()).unwrap();
        closer.join().unwrap();
        assert!(client.recv_frame().unwrap().is_none());
    }
}
