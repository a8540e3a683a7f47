//! Source RCON client
//!
//! Packet layout (all integers little-endian):
//!
//! ```text
//! ┌──────────┬────────────┬──────────┬───────────────┬──────┐
//! │ size:i32 │ id:i32     │ kind:i32 │ body (ASCII)  │ 0x00 │ 0x00
//! └──────────┴────────────┴──────────┴───────────────┴──────┘
//!            └──────────────────── size bytes ──────────────┘
//! ```

use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};
use futures_util::future::BoxFuture;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use super::console::{Console, ConsoleConnector};
use crate::error::ConsoleError;

/// Server reply to a command
pub const KIND_RESPONSE_VALUE: i32 = 0;
/// Client command, also the server's auth reply
pub const KIND_EXEC_COMMAND: i32 = 2;
pub const KIND_AUTH_RESPONSE: i32 = 2;
/// Client login
pub const KIND_AUTH: i32 = 3;

/// Request id the server answers with when the password is wrong
const AUTH_FAILED_ID: i32 = -1;

/// id + kind + two trailing nulls
const MIN_PACKET_SIZE: usize = 10;

/// Largest reply we accept
const MAX_RESPONSE_SIZE: usize = 64 * 1024;

/// Largest command body the game accepts
pub const MAX_COMMAND_LEN: usize = 1446;

/// A single RCON packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub id: i32,
    pub kind: i32,
    pub body: Vec<u8>,
}

impl Packet {
    pub fn new(id: i32, kind: i32, body: impl Into<Vec<u8>>) -> Self {
        Self {
            id,
            kind,
            body: body.into(),
        }
    }

    /// Serialize including the size prefix
    pub fn encode(&self) -> Bytes {
        let size = 4 + 4 + self.body.len() + 2;
        let mut buf = BytesMut::with_capacity(4 + size);
        buf.put_i32_le(size as i32);
        buf.put_i32_le(self.id);
        buf.put_i32_le(self.kind);
        buf.put_slice(&self.body);
        buf.put_u8(0);
        buf.put_u8(0);
        buf.freeze()
    }
}

/// Read one packet from `reader`
pub async fn read_packet<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Packet, ConsoleError> {
    let size = reader.read_i32_le().await.map_err(map_eof)?;
    let size = usize::try_from(size)
        .map_err(|_| ConsoleError::MalformedPacket(format!("negative size {}", size)))?;

    if size < MIN_PACKET_SIZE {
        return Err(ConsoleError::MalformedPacket(format!("size {} too small", size)));
    }
    if size > MAX_RESPONSE_SIZE {
        return Err(ConsoleError::PacketTooLarge(size));
    }

    let mut buf = vec![0u8; size];
    reader.read_exact(&mut buf).await.map_err(map_eof)?;

    let id = i32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let kind = i32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);

    // Body is terminated by two nulls; tolerate servers that send only one
    let mut body = buf[8..].to_vec();
    while body.last() == Some(&0) {
        body.pop();
    }

    Ok(Packet { id, kind, body })
}

/// Write one packet to `writer`
pub async fn write_packet<W: AsyncWrite + Unpin>(
    writer: &mut W,
    packet: &Packet,
) -> Result<(), ConsoleError> {
    writer.write_all(&packet.encode()).await?;
    writer.flush().await?;
    Ok(())
}

fn map_eof(e: std::io::Error) -> ConsoleError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        ConsoleError::Closed
    } else {
        ConsoleError::Io(e)
    }
}

/// A logged-in RCON connection
pub struct RconConsole<S = TcpStream> {
    stream: S,
    next_id: i32,
    timeout: Duration,
}

impl<S> RconConsole<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Authenticate over an already-open stream
    pub async fn login(stream: S, password: &str, timeout: Duration) -> Result<Self, ConsoleError> {
        let mut console = Self {
            stream,
            next_id: 1,
            timeout,
        };

        let id = console.allocate_id();
        let request = Packet::new(id, KIND_AUTH, password.as_bytes());
        with_timeout(timeout, write_packet(&mut console.stream, &request)).await?;

        loop {
            let reply = with_timeout(timeout, read_packet(&mut console.stream)).await?;

            // Some servers send an empty RESPONSE_VALUE ahead of the auth reply
            if reply.kind != KIND_AUTH_RESPONSE {
                continue;
            }
            if reply.id == AUTH_FAILED_ID {
                return Err(ConsoleError::AuthRejected);
            }
            if reply.id == id {
                return Ok(console);
            }
        }
    }

    /// Run a command and return the response body
    pub async fn execute(&mut self, command: &str) -> Result<String, ConsoleError> {
        if command.len() > MAX_COMMAND_LEN {
            return Err(ConsoleError::PacketTooLarge(command.len()));
        }

        let id = self.allocate_id();
        let request = Packet::new(id, KIND_EXEC_COMMAND, command.as_bytes());
        with_timeout(self.timeout, write_packet(&mut self.stream, &request)).await?;

        loop {
            let reply = with_timeout(self.timeout, read_packet(&mut self.stream)).await?;
            if reply.id == id && reply.kind == KIND_RESPONSE_VALUE {
                return Ok(String::from_utf8_lossy(&reply.body).into_owned());
            }
            tracing::trace!(expected = id, got = reply.id, "Skipping unrelated RCON packet");
        }
    }

    fn allocate_id(&mut self) -> i32 {
        let id = self.next_id;
        // Never hand out the auth failure marker
        self.next_id = self.next_id.checked_add(1).unwrap_or(1);
        id
    }
}

async fn with_timeout<T>(
    timeout: Duration,
    fut: impl std::future::Future<Output = Result<T, ConsoleError>>,
) -> Result<T, ConsoleError> {
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| ConsoleError::Timeout)?
}

impl<S> Console for RconConsole<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    fn command<'a>(&'a mut self, command: &'a str) -> BoxFuture<'a, Result<String, ConsoleError>> {
        Box::pin(self.execute(command))
    }

    fn close(&mut self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if let Err(e) = self.stream.shutdown().await {
                tracing::debug!("RCON shutdown error: {}", e);
            }
        })
    }
}

/// Connects to game servers over TCP
#[derive(Debug, Clone)]
pub struct RconConnector {
    timeout: Duration,
}

impl RconConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl ConsoleConnector for RconConnector {
    fn login<'a>(
        &'a self,
        address: &'a str,
        password: &'a str,
    ) -> BoxFuture<'a, Result<Box<dyn Console>, ConsoleError>> {
        Box::pin(async move {
            let stream = tokio::time::timeout(self.timeout, TcpStream::connect(address))
                .await
                .map_err(|_| ConsoleError::Timeout)?
                .map_err(|e| ConsoleError::ConnectionFailed(format!("{}: {}", address, e)))?;
            stream.set_nodelay(true)?;

            let console = RconConsole::login(stream, password, self.timeout).await?;
            Ok(Box::new(console) as Box<dyn Console>)
        })
    }
}
