//! Connection handling dengan buffered non-blocking I/O
//!
//! Pre-allocated buffers untuk zero-allocation pada hot path. Dipakai
//! oleh server mio; sisi client yang blocking ada di [`super::framed`].

use std::io::{self, Read, Write};

use mio::net::TcpStream;

use super::framed::MAX_FRAME_LEN;

/// Buffer sizes - cukup untuk beberapa frame dbin maksimum sekaligus
const READ_BUFFER_SIZE: usize = 128 * 1024;
const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// Non-blocking connection wrapper dengan frame extraction.
pub struct Connection {
    stream: TcpStream,
    read_buffer: Box<[u8]>,
    frame_buf: Box<[u8]>,
    write_buffer: Box<[u8]>,
    read_pos: usize,
    read_len: usize,
    write_pos: usize,
}

impl Connection {
    /// Wrap mio `TcpStream` (sudah non-blocking dari accept).
    pub fn new(stream: TcpStream) -> io::Result<Self> {
        // Nagle off untuk frame kecil
        stream.set_nodelay(true)?;

        // Socket buffer tuning untuk throughput.
        // Error diabaikan - tidak semua platform mendukung.
        #[cfg(unix)]
        {
            use std::os::unix::io::AsRawFd;
            let fd = stream.as_raw_fd();
            unsafe {
                let optval: libc::c_int = 256 * 1024;
                libc::setsockopt(
                    fd,
                    libc::SOL_SOCKET,
                    libc::SO_SNDBUF,
                    &optval as *const _ as *const libc::c_void,
                    std::mem::size_of::<libc::c_int>() as libc::socklen_t,
                );
                libc::setsockopt(
                    fd,
                    libc::SOL_SOCKET,
                    libc::SO_RCVBUF,
                    &optval as *const _ as *const libc::c_void,
                    std::mem::size_of::<libc::c_int>() as libc::socklen_t,
                );
            }
        }

        Ok(Self {
            stream,
            read_buffer: vec![0u8; READ_BUFFER_SIZE].into_boxed_slice(),
            frame_buf: vec![0u8; MAX_FRAME_LEN].into_boxed_slice(),
            write_buffer: vec![0u8; WRITE_BUFFER_SIZE].into_boxed_slice(),
            read_pos: 0,
            read_len: 0,
            write_pos: 0,
        })
    }

    /// Baca dari socket ke internal buffer sampai WouldBlock
    /// (mio edge-triggered: harus drain).
    ///
    /// Returns jumlah bytes yang tersedia untuk parsing.
    pub fn fill_read_buffer(&mut self) -> io::Result<usize> {
        // Compact buffer jika perlu
        if self.read_pos > 0 {
            let remaining = self.read_len - self.read_pos;
            if remaining > 0 {
                self.read_buffer.copy_within(self.read_pos..self.read_len, 0);
            }
            self.read_len = remaining;
            self.read_pos = 0;
        }

        loop {
            if self.read_len == self.read_buffer.len() {
                break;
            }
            match self.stream.read(&mut self.read_buffer[self.read_len..]) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::ConnectionReset,
                        "connection closed",
                    ))
                }
                Ok(n) => self.read_len += n,
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        Ok(self.read_len - self.read_pos)
    }

    /// Ambil frame lengkap berikutnya (tanpa length prefix) ke internal
    /// frame buffer. `None` jika belum ada frame utuh.
    pub fn take_frame(&mut self) -> Option<usize> {
        let avail = self.read_len - self.read_pos;
        if avail < 2 {
            return None;
        }
        let p = self.read_pos;
        let n = u16::from_be_bytes([self.read_buffer[p], self.read_buffer[p + 1]]) as usize;
        if avail < 2 + n {
            return None;
        }
        self.frame_buf[..n].copy_from_slice(&self.read_buffer[p + 2..p + 2 + n]);
        self.read_pos += 2 + n;
        Some(n)
    }

    /// Isi frame terakhir dari [`take_frame`].
    #[inline(always)]
    pub fn frame(&self, len: usize) -> &[u8] {
        &self.frame_buf[..len]
    }

    /// Queue data untuk write (copy ke write buffer).
    pub fn queue_write(&mut self, data: &[u8]) -> io::Result<()> {
        if self.write_pos + data.len() > self.write_buffer.len() {
            // Flush dulu jika buffer penuh
            self.flush_write_buffer()?;
        }

        if self.write_pos + data.len() > self.write_buffer.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "write buffer full, peer not draining",
            ));
        }

        self.write_buffer[self.write_pos..self.write_pos + data.len()].copy_from_slice(data);
        self.write_pos += data.len();

        Ok(())
    }

    /// Flush write buffer ke socket. Partial write (WouldBlock)
    /// menyisakan data untuk event writable berikutnya.
    pub fn flush_write_buffer(&mut self) -> io::Result<()> {
        let mut written = 0;
        while written < self.write_pos {
            match self.stream.write(&self.write_buffer[written..self.write_pos]) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "failed to write to socket",
                    ));
                }
                Ok(n) => written += n,
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    if written > 0 {
                        self.write_buffer.copy_within(written..self.write_pos, 0);
                        self.write_pos -= written;
                    }
                    return Ok(());
                }
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        self.write_pos = 0;
        Ok(())
    }

    /// Underlying stream untuk register/deregister ke poll.
    pub fn stream_mut(&mut self) -> &mut TcpStream {
        &mut self.stream
    }

    /// Bytes pending in write buffer
    #[inline(always)]
    pub fn write_pending(&self) -> usize {
        self.write_pos
    }
}
