//! Broadcast server binary
//!
//! Run with: cargo run [BIND_ADDR]
//!
//! Examples:
//!   cargo run                        # binds to 0.0.0.0:8081
//!   cargo run -- localhost           # binds to 127.0.0.1:8081
//!   cargo run -- 127.0.0.1:9000      # binds to 127.0.0.1:9000
//!
//! Clients connect a WebSocket to `/register` to receive all messages;
//! anyone can broadcast with `PUT /broadcast?message=<text>`.

use std::net::SocketAddr;

use fanout_rs::{BroadcastServer, ServerConfig};

/// Parse bind address from command line argument.
///
/// Accepts formats:
/// - "localhost" -> 127.0.0.1:8081
/// - "localhost:9000" -> 127.0.0.1:9000
/// - "127.0.0.1" -> 127.0.0.1:8081
/// - "0.0.0.0:8081" -> 0.0.0.0:8081
fn parse_bind_addr(arg: &str) -> Result<SocketAddr, String> {
    const DEFAULT_PORT: u16 = 8081;

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
    eprintln!("Usage: fanout-rs [BIND_ADDR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  BIND_ADDR    Address to bind to (default: 0.0.0.0:8081)");
    eprintln!();
    eprintln!("Endpoints:");
    eprintln!("  PUT /broadcast?message=<text>   broadcast <text> to all clients");
    eprintln!("  GET /register                   WebSocket; receives every broadcast");
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
        None => "0.0.0.0:8081".parse()?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fanout_rs=info".parse().unwrap()),
        )
        .init();

    tracing::info!("Starting broadcast server");

    let config = ServerConfig::with_addr(bind_addr);
    let server = BroadcastServer::new(config);

    tokio::select! {
        result = server.run() => {
            if let Err(e) = result {
                eprintln!("Server error: {}", e);
                std::process::exit(1);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down");
        }
    }

    Ok(())
}
