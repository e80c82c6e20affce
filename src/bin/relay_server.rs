//! Chat relay server binary
//!
//! Run with: cargo run --bin relay-server [BIND_ADDR]
//!
//! Examples:
//!   relay-server                    # binds to 0.0.0.0:8000
//!   relay-server localhost          # binds to 127.0.0.1:8000
//!   relay-server 127.0.0.1:8001     # binds to 127.0.0.1:8001
//!
//! Connect with any line-oriented TCP client, e.g. `telnet localhost 8000`
//! or `nc localhost 8000`. Everything typed is relayed to the other
//! connected clients, prefixed with the sender's address.

use std::net::SocketAddr;

use relay_rs::{RelayServer, ServerConfig};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

/// Parse bind address from command line argument.
///
/// Accepts formats:
/// - "localhost" -> 127.0.0.1:8000
/// - "localhost:8001" -> 127.0.0.1:8001
/// - "127.0.0.1" -> 127.0.0.1:8000
/// - "0.0.0.0:8001" -> 0.0.0.0:8001
fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    const DEFAULT_PORT: u16 = 8000;

    let normalized = arg.replace("localhost", "127.0.0.1");

    if let Ok(addr) = normalized.parse::<SocketAddr>() {
        return Ok(addr);
    }

    if let Ok(ip) = normalized.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    Err(format!(
        "Invalid bind address: '{}'. Expected format: IP:PORT or IP or 'localhost'",
        arg
    ))
}

fn print_usage() {
    eprintln!("Usage: relay-server [BIND_ADDR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  BIND_ADDR    Address to bind to (default: {})", DEFAULT_BIND_ADDR);
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  relay-server                    # binds to 0.0.0.0:8000");
    eprintln!("  relay-server localhost          # binds to 127.0.0.1:8000");
    eprintln!("  relay-server 127.0.0.1:8001     # binds to 127.0.0.1:8001");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    let bind_addr = match args.get(1) {
        Some(addr_str) => match parse_bind_addr(addr_str) {
            Ok(addr) => addr,
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        },
        None => DEFAULT_BIND_ADDR.parse().unwrap(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("relay_rs=info".parse()?),
        )
        .init();

    let config = ServerConfig::with_addr(bind_addr);
    let server = RelayServer::new(config);

    println!("Chat relay started on {}", bind_addr);
    println!("Connect with: telnet {} {}", bind_addr.ip(), bind_addr.port());

    tokio::select! {
        result = server.run() => {
            // Only a bind/listen fault lands here; per-peer faults are
            // consumed inside the relay.
            if let Err(e) = result {
                eprintln!("Server error: {}", e);
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            println!("\nShutting down...");
        }
    }

    Ok(())
}
