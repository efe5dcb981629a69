//! dbin server dengan event-driven I/O
//!
//! Poll loop mio di satu thread: accept, extract frame, decode, reply.
//! Semantik reply:
//! - MSG  -> ACK dengan routing dan msg_id yang sama
//! - PING -> PONG
//! - frame malformed -> di-log dan di-skip, koneksi tetap hidup

use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use mio::net::TcpListener;
use mio::{Events, Interest, Poll, Token};
use tracing::{debug, info, warn};

use crate::protocol::{decode, encode, Message, MessageType, HEADER_SIZE};

use super::Connection;

const SERVER_TOKEN: Token = Token(0);
const MAX_CONNECTIONS: usize = 1024;
const EVENTS_CAPACITY: usize = 1024;
const STATS_INTERVAL: Duration = Duration::from_secs(10);

/// Counter sederhana; server single-threaded jadi cukup u64 biasa.
#[derive(Default)]
struct ServerStats {
    frames_in: u64,
    replies_out: u64,
    decode_errors: u64,
    connections_total: u64,
}

/// dbin echo/ack server.
pub struct Server {
    poll: Poll,
    listener: TcpListener,
    connections: HashMap<Token, Connection>,
    next_token: usize,
    stats: ServerStats,
    started: Instant,
    last_stats: Instant,
}

impl Server {
    /// Bind dan siapkan poll registry.
    pub fn bind(addr: SocketAddr) -> io::Result<Self> {
        let poll = Poll::new()?;
        let mut listener = TcpListener::bind(addr)?;

        poll.registry()
            .register(&mut listener, SERVER_TOKEN, Interest::READABLE)?;

        Ok(Self {
            poll,
            listener,
            connections: HashMap::with_capacity(MAX_CONNECTIONS),
            next_token: 1,
            stats: ServerStats::default(),
            started: Instant::now(),
            last_stats: Instant::now(),
        })
    }

    /// Alamat listen aktual (berguna dengan port 0).
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Run server event loop (tidak pernah return kecuali error fatal).
    pub fn run(&mut self) -> io::Result<()> {
        let mut events = Events::with_capacity(EVENTS_CAPACITY);

        info!(addr = %self.listener.local_addr()?, "dbin server listening");

        loop {
            self.poll
                .poll(&mut events, Some(Duration::from_millis(100)))?;

            for event in events.iter() {
                match event.token() {
                    SERVER_TOKEN => self.accept_connections()?,
                    token => {
                        if event.is_readable() {
                            self.handle_read(token);
                        }
                        if event.is_writable() {
                            self.handle_write(token);
                        }
                    }
                }
            }

            if self.last_stats.elapsed() >= STATS_INTERVAL {
                self.log_stats();
                self.last_stats = Instant::now();
            }
        }
    }

    fn accept_connections(&mut self) -> io::Result<()> {
        loop {
            match self.listener.accept() {
                Ok((stream, addr)) => {
                    if self.connections.len() >= MAX_CONNECTIONS {
                        warn!(%addr, "max connections reached, rejecting");
                        continue;
                    }

                    let token = Token(self.next_token);
                    self.next_token += 1;

                    let mut conn = Connection::new(stream)?;
                    self.poll.registry().register(
                        conn.stream_mut(),
                        token,
                        Interest::READABLE | Interest::WRITABLE,
                    )?;

                    self.connections.insert(token, conn);
                    self.stats.connections_total += 1;
                    info!(%addr, token = token.0, "client connected");
                }
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn handle_read(&mut self, token: Token) {
        let conn = match self.connections.get_mut(&token) {
            Some(c) => c,
            None => return,
        };

        match conn.fill_read_buffer() {
            Ok(_) => {}
            Err(e) => {
                debug!(token = token.0, error = %e, "connection closed");
                self.drop_connection(token);
                return;
            }
        }

        while let Some(len) = conn.take_frame() {
            self.stats.frames_in += 1;

            let reply = match decode(conn.frame(len)) {
                Ok(msg) => reply_for(&msg),
                Err(e) => {
                    // Frame rusak: log, lanjut ke frame berikutnya
                    self.stats.decode_errors += 1;
                    warn!(token = token.0, error = %e, "dropping malformed frame");
                    continue;
                }
            };

            let reply = match reply {
                Some(r) => r,
                None => continue,
            };

            // Reply selalu frame kontrol 12-byte: prefix + header
            let mut wire = [0u8; 2 + HEADER_SIZE];
            let n = match encode(&reply, &mut wire[2..]) {
                Ok(n) => n,
                Err(e) => {
                    // Tidak terjadi untuk reply yang kita bentuk sendiri
                    warn!(token = token.0, error = %e, "reply encode failed");
                    continue;
                }
            };
            wire[..2].copy_from_slice(&(n as u16).to_be_bytes());

            if let Err(e) = conn.queue_write(&wire[..2 + n]) {
                debug!(token = token.0, error = %e, "write failed");
                self.drop_connection(token);
                return;
            }
            self.stats.replies_out += 1;
        }

        if let Err(e) = conn.flush_write_buffer() {
            debug!(token = token.0, error = %e, "flush failed");
            self.drop_connection(token);
        }
    }

    fn handle_write(&mut self, token: Token) {
        if let Some(conn) = self.connections.get_mut(&token) {
            if conn.write_pending() > 0 {
                if let Err(e) = conn.flush_write_buffer() {
                    debug!(token = token.0, error = %e, "flush failed");
                    self.drop_connection(token);
                }
            }
        }
    }

    fn drop_connection(&mut self, token: Token) {
        if let Some(mut conn) = self.connections.remove(&token) {
            let _ = self.poll.registry().deregister(conn.stream_mut());
        }
    }

    fn log_stats(&self) {
        info!(
            uptime_s = self.started.elapsed().as_secs(),
            frames_in = self.stats.frames_in,
            replies_out = self.stats.replies_out,
            decode_errors = self.stats.decode_errors,
            connections_active = self.connections.len(),
            connections_total = self.stats.connections_total,
            "server stats"
        );
    }
}

/// Reply untuk satu pesan masuk, atau `None` jika tidak perlu dibalas.
fn reply_for<'a>(msg: &Message<'_>) -> Option<Message<'a>> {
    match MessageType::from_u8(msg.msg_type) {
        Some(MessageType::Msg) => Some(Message::ack_for(msg)),
        Some(MessageType::Ping) => Some(Message::control(
            MessageType::Pong,
            msg.user_id,
            msg.route,
            msg.is_room,
            msg.msg_id,
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_for_msg_is_ack() {
        let m = Message::data(5321, 77, true, 42, b"oi");
        let r = reply_for(&m).unwrap();
        assert_eq!(r.msg_type, MessageType::Ack as u8);
        assert_eq!(r.msg_id, 42);
        assert_eq!(r.msg_len, 0);
    }

    #[test]
    fn test_reply_for_ping_is_pong() {
        let m = Message::control(MessageType::Ping, 1, 2, false, 9);
        let r = reply_for(&m).unwrap();
        assert_eq!(r.msg_type, MessageType::Pong as u8);
        assert_eq!(r.msg_id, 9);
    }

    #[test]
    fn test_no_reply_for_control_acks() {
        let a = Message::control(MessageType::Ack, 1, 2, false, 9);
        assert!(reply_for(&a).is_none());
        let p = Message::control(MessageType::Pong, 1, 2, false, 9);
        assert!(reply_for(&p).is_none());
    }

    #[test]
    fn test_bind_ephemeral() {
        let server = Server::bind("127.0.0.1:0".parse().unwrap()).unwrap();
        assert_ne!(server.local_addr().unwrap().port(), 0);
    }
}
