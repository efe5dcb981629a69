//! dbin Server Binary
//!
//! Echo/ack server untuk format dbin: balas ACK untuk MSG dan PONG
//! untuk PING, satu event loop mio di satu thread.
//!
//! Usage:
//!   cargo run --release --bin dbin_server -- [--bind ADDR]
//!
//! Options:
//!   --bind ADDR   Listen address (default: 0.0.0.0:9000)
//!
//! Log level diatur lewat RUST_LOG (default info).

use std::net::SocketAddr;
use std::process;

use tracing::error;
use tracing_subscriber::EnvFilter;

use dbin::network::Server;

struct ServerConfig {
    bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:9000".to_string(),
        }
    }
}

fn parse_args() -> ServerConfig {
    let mut config = ServerConfig::default();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--bind" => {
                config.bind_addr = args.next().unwrap_or_else(|| {
                    eprintln!("--bind requires an address");
                    process::exit(1);
                });
            }
            "--help" | "-h" => {
                println!("usage: dbin_server [--bind ADDR]");
                process::exit(0);
            }
            other => {
                eprintln!("unknown argument: {other}");
                process::exit(1);
            }
        }
    }

    config
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = parse_args();

    let addr: SocketAddr = match config.bind_addr.parse() {
        Ok(a) => a,
        Err(e) => {
            error!(addr = %config.bind_addr, "invalid bind address: {e}");
            process::exit(1);
        }
    };

    let mut server = match Server::bind(addr) {
        Ok(s) => s,
        Err(e) => {
            error!(%addr, "bind failed: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        error!("server loop failed: {e}");
        process::exit(1);
    }
}
