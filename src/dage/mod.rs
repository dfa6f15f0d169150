//! The line-oriented "Dage" TCP protocol: newline-framed, tab-separated
//! commands delegating to a [`Container`](crate::container::Container).
//!
//! The wire handling (`serve`) is a thin `tokio` server; the command
//! dispatch (`handle_command`) is kept pure and synchronous so it can be
//! unit-tested without opening a socket.

use crate::container::Container;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

const IDLE_TIMEOUT: Duration = Duration::from_secs(600);

pub const PING: &str = "Ping";
pub const PONG: &str = "Pong";
pub const SET: &str = "Set";
pub const GET: &str = "Get";
pub const REMOVE: &str = "Remove";
pub const QUIT: &str = "Quit";
pub const SUCCESS: &str = "Success";
pub const FAILURE: &str = "Failure";

/// The result of dispatching one line of the protocol.
pub enum Outcome {
    /// Write this text back to the client, newline-terminated.
    Reply(String),
    /// Say goodbye and close the connection.
    Quit,
}

/// Dispatches one already-tab-split command line against `container`.
///
/// Returns `None` for an empty or unrecognized command (no reply is sent,
/// matching the source's silent-ignore behavior for unknown verbs).
#[must_use]
pub fn handle_command(container: &Container, cmd: &[&str]) -> Option<Outcome> {
    let (verb, params) = cmd.split_first()?;
    match *verb {
        PING => Some(Outcome::Reply(PONG.to_string())),
        QUIT => Some(Outcome::Quit),
        SET => Some(Outcome::Reply(set_command(container, params))),
        GET => Some(Outcome::Reply(get_command(container, params))),
        REMOVE => Some(Outcome::Reply(remove_command(container, params))),
        other => {
            log::warn!("Dage: unrecognized command {other}");
            None
        }
    }
}

/// `Set\t<bulk>\t<sub>\t<value>\t<ttl_seconds>` → `Success`/`Failure`.
fn set_command(container: &Container, params: &[&str]) -> String {
    let [bulk, sub, value, ttl] = params else {
        return FAILURE.to_string();
    };
    let Ok(ttl_secs) = ttl.parse::<u64>() else {
        return FAILURE.to_string();
    };
    match container.add(bulk, sub.as_bytes(), value.as_bytes().to_vec(), Duration::from_secs(ttl_secs)) {
        Ok(()) => {
            log::info!("Add {} bytes to {bulk}", value.len());
            SUCCESS.to_string()
        }
        Err(e) => {
            log::warn!("Set on {bulk} failed: {e}");
            FAILURE.to_string()
        }
    }
}

/// `Get\t<bulk>` → items joined by double-tab, or empty.
fn get_command(container: &Container, params: &[&str]) -> String {
    let [bulk] = params else {
        return String::new();
    };
    let (items, present) = container.get(bulk);
    if !present {
        log::warn!("Get: bulk {bulk} not found");
        return String::new();
    }
    let bytes: usize = items.iter().map(|(_, item)| item.len()).sum();
    log::info!("From bulk {bulk} got {bytes} bytes");
    items
        .iter()
        .map(|(_, item)| String::from_utf8_lossy(&item.payload).into_owned())
        .collect::<Vec<_>>()
        .join("\t\t")
}

/// `Remove\t<bulk>` → `Success`/`Failure`.
fn remove_command(container: &Container, params: &[&str]) -> String {
    let [bulk] = params else {
        return FAILURE.to_string();
    };
    container.remove(bulk);
    log::info!("Deleted bulk {bulk}");
    SUCCESS.to_string()
}

/// Binds a TCP listener on `port` and serves the Dage protocol until the
/// process exits. Each connection is handled on its own task; idle
/// connections (no line received within [`IDLE_TIMEOUT`]) are closed.
///
/// # Errors
/// Returns an error if the listener cannot be bound.
pub async fn serve(container: Arc<Container>, port: u16) -> std::io::Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    log::info!("Dage listening on :{port}");
    loop {
        let (socket, addr) = listener.accept().await?;
        log::info!("Accepted a Dage client [{addr}]");
        let container = Arc::clone(&container);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(&container, socket).await {
                log::error!("Dage client {addr} error: {e}");
            }
        });
    }
}

async fn handle_connection(
    container: &Container,
    socket: tokio::net::TcpStream,
) -> std::io::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut lines = BufReader::new(reader).lines();
    loop {
        let next_line = tokio::select! {
            line = lines.next_line() => line?,
            () = tokio::time::sleep(IDLE_TIMEOUT) => {
                log::warn!("Dage client timeout");
                writer.shutdown().await?;
                return Ok(());
            }
        };
        let Some(line) = next_line else {
            return Ok(());
        };
        let cmd: Vec<&str> = line.split('\t').collect();
        match handle_command(container, &cmd) {
            Some(Outcome::Quit) => {
                writer.write_all(b"Good luck!\n").await?;
                writer.shutdown().await?;
                return Ok(());
            }
            Some(Outcome::Reply(text)) => {
                writer.write_all(format!("{text}\n").as_bytes()).await?;
            }
            None => {}
        }
    }
}
