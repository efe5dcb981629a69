//! dbin RTT Client
//!
//! Kirim MSG berpayload "ping" ke server, tunggu ACK, ukur round-trip
//! time per pesan, lalu laporkan avg/p50/p95/p99.
//!
//! Usage:
//!   cargo run --release --bin dbin_client -- [--host ADDR] [--count N]
//!
//! Options:
//!   --host ADDR   Server address (default: 127.0.0.1:9000)
//!   --count N     Jumlah pesan (default: 1000, max: 20000)

use std::process;
use std::time::Instant;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dbin::network::FramedStream;
use dbin::protocol::{decode, encode, Message, MessageType};

struct ClientConfig {
    host: String,
    count: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1:9000".to_string(),
            count: 1000,
        }
    }
}

fn parse_args() -> ClientConfig {
    let mut config = ClientConfig::default();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--host" => {
                config.host = args.next().unwrap_or_else(|| {
                    eprintln!("--host requires an address");
                    process::exit(1);
                });
            }
            "--count" => {
                let v = args.next().and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--count requires a number");
                    process::exit(1);
                });
                config.count = v;
            }
            "--help" | "-h" => {
                println!("usage: dbin_client [--host ADDR] [--count N]");
                process::exit(0);
            }
            other => {
                eprintln!("unknown argument: {other}");
                process::exit(1);
            }
        }
    }

    config.count = config.count.clamp(1, 20000);
    config
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = parse_args();

    let mut conn = match FramedStream::connect(&config.host) {
        Ok(c) => c,
        Err(e) => {
            error!(host = %config.host, "connect failed: {e}");
            process::exit(1);
        }
    };
    info!(host = %config.host, count = config.count, "connected");

    let payload = b"ping";
    let mut outbuf = [0u8; 64];
    let mut rtts: Vec<u64> = Vec::with_capacity(config.count);

    for i in 0..config.count {
        let msg_id = (i % 65536) as u16;
        let m = Message::data(123, 77, true, msg_id, payload);

        let n = match encode(&m, &mut outbuf) {
            Ok(n) => n,
            Err(e) => {
                error!("encode failed: {e}");
                break;
            }
        };

        let t0 = Instant::now();
        if let Err(e) = conn.send_frame(&outbuf[..n]) {
            error!("send failed: {e}");
            break;
        }

        let frame = match conn.recv_frame() {
            Ok(Some(f)) => f,
            Ok(None) => {
                error!("server closed connection");
                break;
            }
            Err(e) => {
                error!("recv failed: {e}");
                break;
            }
        };

        let ack = match decode(frame) {
            Ok(a) => a,
            Err(e) => {
                error!("decode failed: {e}");
                break;
            }
        };

        if ack.msg_type != MessageType::Ack as u8 || ack.msg_id != msg_id {
            error!(
                msg_type = ack.msg_type,
                msg_id = ack.msg_id,
                "unexpected response"
            );
            break;
        }

        rtts.push(t0.elapsed().as_micros() as u64);
    }

    if rtts.is_empty() {
        error!("no samples collected");
        process::exit(1);
    }

    rtts.sort_unstable();
    let n = rtts.len();
    let sum: u64 = rtts.iter().sum();
    let avg_us = sum as f64 / n as f64;
    let p50 = rtts[n * 50 / 100];
    let p95 = rtts[(n * 95 / 100).min(n - 1)];
    let p99 = rtts[(n * 99 / 100).min(n - 1)];

    println!("\nRTT stats ({n} samples)");
    println!(" avg: {:.2} us ({:.3} ms)", avg_us, avg_us / 1000.0);
    println!(" p50: {} us ({:.3} ms)", p50, p50 as f64 / 1000.0);
    println!(" p95: {} us ({:.3} ms)", p95, p95 as f64 / 1000.0);
    println!(" p99: {} us ({:.3} ms)", p99, p99 as f64 / 1000.0);
}
