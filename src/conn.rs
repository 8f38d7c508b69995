use anyhow::Result;
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dispatcher::dispatch;
use crate::messenger;
use crate::protocol::{self, AUTH_FAILED, PASSWORD_PROMPT, USERNAME_PROMPT, WELCOME};
use crate::session::{Session, SessionId};
use crate::state::ServerState;

enum Handshake {
    Accepted(String),
    Rejected(String),
    Closed,
}

/// Drives one connection from accept to teardown.
pub async fn handle(state: ServerState, socket: TcpStream, peer: SocketAddr) -> Result<()> {
    let (mut reader, mut writer) = socket.into_split();
    let mut buf = vec![0u8; state.config.buffer_size.max(1)];

    let username = match authenticate(&state, &mut reader, &mut writer, &mut buf).await? {
        Handshake::Accepted(username) => username,
        Handshake::Rejected(username) => {
            info!(%peer, user = %username, "authentication failed");
            writer.write_all(AUTH_FAILED.as_bytes()).await?;
            return Ok(());
        }
        Handshake::Closed => {
            debug!(%peer, "closed during handshake");
            return Ok(());
        }
    };

    let session = Session::new(SessionId::next(), username);
    let (tx, rx) = mpsc::channel(state.config.outbox_capacity.max(1));

    // queued before registering so it is the first thing the client sees
    tx.send(WELCOME.to_string()).await?;

    if !state.clients.register(session.id, session.username.clone(), tx) {
        warn!(%peer, user = %session.username, "user already online, rejecting login");
        writer.write_all(AUTH_FAILED.as_bytes()).await?;
        return Ok(());
    }

    info!(%peer, session = %session.id, user = %session.username, "authenticated");

    tokio::spawn(write_loop(writer, rx, session.id));

    messenger::broadcast_except(
        &state.clients,
        Some(session.id),
        protocol::joined_chat(&session.username),
    );

    read_loop(&state, &session, &mut reader, &mut buf).await;

    state.teardown(session.id);

    info!(
        %peer,
        session = %session.id,
        user = %session.username,
        connected_for = ?session.connected_since.elapsed(),
        "disconnected"
    );

    Ok(())
}

async fn authenticate(
    state: &ServerState,
    reader: &mut OwnedReadHalf,
    writer: &mut OwnedWriteHalf,
    buf: &mut [u8],
) -> Result<Handshake> {
    writer.write_all(USERNAME_PROMPT.as_bytes()).await?;
    let Some(username) = read_payload(reader, buf).await else {
        return Ok(Handshake::Closed);
    };

    writer.write_all(PASSWORD_PROMPT.as_bytes()).await?;
    let Some(password) = read_payload(reader, buf).await else {
        return Ok(Handshake::Closed);
    };

    if state.credentials.verify(&username, &password) {
        Ok(Handshake::Accepted(username))
    } else {
        Ok(Handshake::Rejected(username))
    }
}

/// Each read until EOF or error is one command.
async fn read_loop(state: &ServerState, session: &Session, reader: &mut OwnedReadHalf, buf: &mut [u8]) {
    while let Some(payload) = read_payload(reader, buf).await {
        let cmd = protocol::parse_command(&payload);
        debug!(session = %session.id, ?cmd, "command");

        dispatch(state, session, cmd);
    }
}

/// One read is one message: no reassembly of long payloads and no splitting
/// of coalesced ones. `None` on EOF or a read error.
async fn read_payload(reader: &mut OwnedReadHalf, buf: &mut [u8]) -> Option<String> {
    match reader.read(buf).await {
        Ok(0) => None,
        Ok(n) => Some(decode(&buf[..n])),
        Err(err) => {
            debug!(%err, "read failed");
            None
        }
    }
}

fn decode(bytes: &[u8]) -> String {
    let raw = String::from_utf8_lossy(bytes);
    let text = raw.strip_suffix('\n').unwrap_or(&raw);
    let text = text.strip_suffix('\r').unwrap_or(text);

    text.to_string()
}

async fn write_loop(mut writer: OwnedWriteHalf, mut rx: mpsc::Receiver<String>, id: SessionId) {
    while let Some(msg) = rx.recv().await {
        if let Err(err) = writer.write_all(msg.as_bytes()).await {
            debug!(session = %id, %err, "write failed");
            break;
        }
    }

    let _ = writer.shutdown().await;
}
